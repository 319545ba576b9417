use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use goldportal::portal::PortalError;
use goldportal::routing::Route;
use log::error;
use serde_json::json;

/// A page action that did not go through, as answered to the client.
pub struct ActionError(pub PortalError);

impl From<PortalError> for ActionError {
    fn from(value: PortalError) -> Self {
        ActionError(value)
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PortalError::RedirectedError { navigation } => {
                return redirect_to(navigation.destination);
            }
            PortalError::InvalidInputError { .. } | PortalError::DeniedError { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PortalError::RemoteCallError { .. } => StatusCode::BAD_GATEWAY,
            PortalError::LocalStorageFailedError { .. } => {
                error!("{}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn redirect_to(route: Route) -> Response {
    Redirect::to(route.path()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use goldportal::remote::DataServiceError;
    use goldportal::routing::guard::Navigation;

    #[test]
    fn redirect_becomes_see_other() {
        let response = ActionError(PortalError::RedirectedError {
            navigation: Navigation {
                requested: Route::OwnerDashboard,
                destination: Route::Welcome,
                redirects: vec![Route::Welcome],
            },
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/welcome");
    }

    #[test]
    fn denied_form_is_unprocessable() {
        let response = ActionError(PortalError::DeniedError {
            message: "Invalid passcode".to_string(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn remote_failure_is_bad_gateway() {
        let response = ActionError(PortalError::RemoteCallError {
            message: "Failed to load feedback: Canister is stopped".to_string(),
            source: DataServiceError::UnavailableError {
                message: "Canister is stopped".to_string(),
            },
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
