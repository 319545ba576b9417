mod actions;
pub mod client;
mod pages;
mod response;

use crate::db::local_storage::SqliteLocalStorage;
use crate::db::SharedConnection;
use crate::http::client::{identify_client, ClientId, ClientKeys};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Router};
use goldportal::portal::{Portal, PortalSettings};
use goldportal::remote::ThreadSafeDataService;
use goldportal::storage::ThreadSafeLocalStorage;
use log::error;
use std::sync::Arc;
use tokio::task::spawn_blocking;

pub struct PortalState {
    pub data_service: Arc<ThreadSafeDataService>,
    pub shared_storage: Arc<ThreadSafeLocalStorage>,
    pub local_storage_db: SharedConnection,
    pub settings: PortalSettings,
    pub client_keys: ClientKeys,
}

impl PortalState {
    pub fn open_portal(&self, client_id: &ClientId) -> Portal {
        let client_storage = Arc::new(SqliteLocalStorage::for_client(
            self.local_storage_db.clone(),
            &client_id.0,
        ));

        Portal::open(
            self.data_service.clone(),
            self.shared_storage.clone(),
            client_storage,
            &self.settings,
        )
    }
}

/// The portal of the client of the request.
pub struct ClientPortal {
    state: Arc<PortalState>,
    client_id: ClientId,
}

impl ClientPortal {
    /// Opens the portal and answers with what `call` makes of it.
    ///
    /// Both run on the blocking pool since the sqlite stores block.
    pub async fn run<F, R>(self, call: F) -> Response
    where
        F: FnOnce(Portal) -> R + Send + 'static,
        R: IntoResponse,
    {
        let ClientPortal { state, client_id } = self;

        let result =
            spawn_blocking(move || call(state.open_portal(&client_id)).into_response()).await;

        match result {
            Ok(response) => response,
            Err(e) => {
                error!("Portal call did not complete: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl FromRequestParts<Arc<PortalState>> for ClientPortal {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<PortalState>,
    ) -> Result<Self, Self::Rejection> {
        let client_id = parts
            .extensions
            .get::<ClientId>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        Ok(ClientPortal {
            state: state.clone(),
            client_id,
        })
    }
}

pub fn create_portal_router(state: Arc<PortalState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/session", get(pages::session))
        .route("/login", get(pages::login).post(actions::login))
        .route("/logout", post(actions::logout))
        .route("/register", get(pages::register).post(actions::register))
        .route("/handshake", post(actions::complete_handshake))
        .route(
            "/forgot-password",
            get(pages::forgot_password).post(actions::request_password_reset),
        )
        .route(
            "/reset-password",
            get(pages::reset_password).post(actions::reset_password),
        )
        .route("/shop-info", get(pages::shop_info))
        .route("/welcome", get(pages::welcome))
        .route("/feedback", get(pages::feedback).post(actions::submit_feedback))
        .route(
            "/appointments",
            get(pages::appointments).post(actions::request_appointment),
        )
        .route(
            "/test-results",
            get(pages::test_results).post(actions::lookup_test_result),
        )
        .route(
            "/test-results/history",
            axum::routing::delete(actions::clear_search_history),
        )
        .route("/daily-gold-updates", get(pages::daily_gold_updates))
        .route("/settings", get(pages::settings).post(actions::update_settings))
        .route("/owner-dashboard", get(pages::owner_dashboard))
        .route(
            "/owner-dashboard/test-results",
            post(actions::save_test_result),
        )
        .route(
            "/owner-dashboard/daily-gold-updates",
            post(actions::post_daily_gold_update),
        )
        .route("/owner-dashboard/content", post(actions::update_content))
        .route(
            "/owner-dashboard/reset-passcodes",
            post(actions::issue_reset_passcode),
        )
        .layer(middleware::from_fn_with_state(state.clone(), identify_client))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local_storage::LOCAL_STORAGE_CHANGELOGS;
    use crate::db::open_in_memory;
    use crate::http::client::CLIENT_COOKIE;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{HeaderValue, Request};
    use goldportal::auth::credential::OwnerCredential;
    use goldportal::remote::InMemoryDataService;
    use goldportal::routing::guard::GuardPolicy;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const COOKIE_SECRET: &[u8] = b"test-secret";

    fn test_router() -> Router {
        let local_storage_db = open_in_memory("local_storage", &LOCAL_STORAGE_CHANGELOGS);

        create_portal_router(Arc::new(PortalState {
            data_service: Arc::new(InMemoryDataService::new()),
            shared_storage: Arc::new(SqliteLocalStorage::shared(local_storage_db.clone())),
            local_storage_db,
            settings: PortalSettings {
                owner_credential: Some(OwnerCredential::new("owner", "owner-pw")),
                guard_policy: GuardPolicy::default(),
            },
            client_keys: ClientKeys::new(COOKIE_SECRET),
        }))
    }

    /// Sends requests the way a browser would, keeping the client cookie.
    struct Browser {
        router: Router,
        cookie: Option<String>,
    }

    impl Browser {
        fn new(router: &Router) -> Browser {
            Browser {
                router: router.clone(),
                cookie: None,
            }
        }

        async fn send(&mut self, mut request: Request<Body>) -> Response {
            if let Some(cookie) = &self.cookie {
                request
                    .headers_mut()
                    .insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
            }

            let response = self.router.clone().oneshot(request).await.unwrap();

            if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }

            response
        }

        async fn get(&mut self, path: &str) -> Response {
            self.send(Request::get(path).body(Body::empty()).unwrap())
                .await
        }

        async fn post(&mut self, path: &str, body: Value) -> Response {
            let request = Request::post(path)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();

            self.send(request).await
        }

        async fn sign_in_customer(&mut self, username: &str) {
            let response = self
                .post(
                    "/register",
                    json!({
                        "username": username,
                        "password": "pw",
                        "confirmPassword": "pw",
                        "mobileNumber": "9998887776",
                    }),
                )
                .await;
            assert_eq!(location(&response), "/login");

            let response = self
                .post("/login", json!({ "username": username, "password": "pw" }))
                .await;
            assert_eq!(location(&response), "/welcome");
        }
    }

    fn location(response: &Response) -> &str {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers()[LOCATION].to_str().unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn new_client_gets_signed_cookie_once() {
        let router = test_router();
        let mut browser = Browser::new(&router);

        let first = browser.get("/login").await;
        assert_eq!(first.status(), StatusCode::OK);
        let cookie = browser.cookie.clone().unwrap();
        let token = cookie.strip_prefix(&format!("{CLIENT_COOKIE}=")).unwrap();
        assert!(ClientKeys::new(COOKIE_SECRET).verify(token).is_some());

        let second = browser.get("/login").await;
        assert!(second.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn guarded_page_without_session_redirects_to_login() {
        let router = test_router();
        let mut browser = Browser::new(&router);

        let response = browser.get("/feedback").await;

        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn signed_in_customer_is_sent_to_welcome() {
        let router = test_router();
        let mut browser = Browser::new(&router);
        browser.sign_in_customer("alice").await;

        let index = browser.get("/").await;
        assert_eq!(location(&index), "/welcome");

        let dashboard = browser.get("/owner-dashboard").await;
        assert_eq!(location(&dashboard), "/welcome");
    }

    #[tokio::test]
    async fn cookie_keeps_the_session() {
        let router = test_router();
        let mut browser = Browser::new(&router);
        browser.sign_in_customer("alice").await;

        let response = browser.get("/feedback").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["customerFirstName"], "alice");

        let mut other_browser = Browser::new(&router);
        let response = other_browser.get("/feedback").await;
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn rejected_action_answers_with_message() {
        let router = test_router();
        let mut browser = Browser::new(&router);

        let response = browser
            .post("/login", json!({ "username": "alice", "password": "nope" }))
            .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["error"],
            "Invalid username or password"
        );
    }
}
