use crate::http::PortalState;
use crate::logging::with_client_tag;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CLIENT_COOKIE: &str = "portal_client";
const CLIENT_TOKEN_LIFETIME_DAYS: i64 = 365;

/// Identifies one browser. Its local storage lives under this id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(pub String);

#[derive(Serialize, Deserialize)]
struct ClientClaims {
    sub: String,
    exp: i64,
}

/// Signs and verifies the client cookie.
pub struct ClientKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl ClientKeys {
    pub fn new(secret: &[u8]) -> ClientKeys {
        ClientKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, client_id: &ClientId) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = ClientClaims {
            sub: client_id.0.clone(),
            exp: (Utc::now() + Duration::days(CLIENT_TOKEN_LIFETIME_DAYS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Returns the client of a token that was issued with these keys and did not expire.
    pub fn verify(&self, token: &str) -> Option<ClientId> {
        match decode::<ClientClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Some(ClientId(data.claims.sub)),
            Err(e) => {
                debug!("Ignoring client token: {e}");
                None
            }
        }
    }
}

fn new_client_id() -> ClientId {
    ClientId(format!("{:032x}", rand::random::<u128>()))
}

/// Makes the client of the request known to the handlers and the log.
///
/// Clients without a valid cookie get a new identity.
pub async fn identify_client(
    State(state): State<Arc<PortalState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let known_client = jar
        .get(CLIENT_COOKIE)
        .and_then(|cookie| state.client_keys.verify(cookie.value()));

    let (client_id, jar) = match known_client {
        Some(client_id) => (client_id, None),
        None => {
            let client_id = new_client_id();
            let token = match state.client_keys.issue(&client_id) {
                Ok(token) => token,
                Err(e) => {
                    error!("Failed to sign client token: {e}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            info!("New client {}", client_id.0);

            let cookie = Cookie::build((CLIENT_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .permanent();

            (client_id, Some(jar.add(cookie)))
        }
    };

    request.extensions_mut().insert(client_id.clone());
    let response = with_client_tag(&client_id.0, next.run(request)).await;

    match jar {
        Some(jar) => (jar, response).into_response(),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_identifies_client() {
        let keys = ClientKeys::new(b"secret");
        let client_id = new_client_id();

        let token = keys.issue(&client_id).unwrap();

        assert_eq!(keys.verify(&token), Some(client_id));
    }

    #[test]
    fn token_from_other_secret_is_ignored() {
        let token = ClientKeys::new(b"other").issue(&new_client_id()).unwrap();

        assert_eq!(ClientKeys::new(b"secret").verify(&token), None);
    }

    #[test]
    fn tampered_token_is_ignored() {
        let keys = ClientKeys::new(b"secret");
        let token = keys.issue(&new_client_id()).unwrap();
        let forged_claims = keys.issue(&ClientId("someone-else".to_string())).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_claims.split('.').nth(1).unwrap();

        assert_eq!(keys.verify(&parts.join(".")), None);
    }

    #[test]
    fn expired_token_is_ignored() {
        let keys = ClientKeys::new(b"secret");
        let claims = ClientClaims {
            sub: "abc".to_string(),
            exp: (Utc::now() - Duration::days(1)).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn client_ids_are_unique() {
        assert_ne!(new_client_id(), new_client_id());
    }
}
