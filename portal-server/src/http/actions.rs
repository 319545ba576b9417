use crate::http::response::{redirect_to, ActionError};
use crate::http::ClientPortal;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use goldportal::portal::{
    AppointmentForm, ContentUpdate, DailyGoldUpdateForm, FeedbackRequest, LoginRequest,
    PasscodeRequest, PasswordResetForm, RegistrationRequest, TestResultLookup,
};
use goldportal::remote::model::TestResult;
use goldportal::routing::Route;
use goldportal::storage::password_reset::PasswordResetRequest;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileNumberForm {
    mobile_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialNumberForm {
    serial_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    biometric_lock_enabled: bool,
}

#[derive(Serialize)]
pub struct IssuedPasscode {
    passcode: String,
}

pub async fn login(portal: ClientPortal, Json(request): Json<LoginRequest>) -> Response {
    portal
        .run(move |mut portal| -> Result<Response, ActionError> {
            let route = portal.login(&request)?;

            Ok(redirect_to(route))
        })
        .await
}

pub async fn logout(portal: ClientPortal) -> Response {
    portal
        .run(|mut portal| {
            portal.logout();

            redirect_to(Route::Login)
        })
        .await
}

pub async fn register(portal: ClientPortal, Json(request): Json<RegistrationRequest>) -> Response {
    portal
        .run(move |portal| -> Result<Response, ActionError> {
            let route = portal.register(&request)?;

            Ok(redirect_to(route))
        })
        .await
}

pub async fn complete_handshake(portal: ClientPortal) -> Response {
    portal
        .run(|mut portal| -> Result<StatusCode, ActionError> {
            portal.complete_handshake()?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn request_password_reset(
    portal: ClientPortal,
    Json(form): Json<MobileNumberForm>,
) -> Response {
    portal
        .run(move |portal| -> Result<Json<PasswordResetRequest>, ActionError> {
            Ok(Json(portal.request_password_reset(&form.mobile_number)?))
        })
        .await
}

pub async fn reset_password(portal: ClientPortal, Json(form): Json<PasswordResetForm>) -> Response {
    portal
        .run(move |portal| -> Result<Response, ActionError> {
            let route = portal.reset_password(&form)?;

            Ok(redirect_to(route))
        })
        .await
}

pub async fn submit_feedback(portal: ClientPortal, Json(request): Json<FeedbackRequest>) -> Response {
    portal
        .run(move |portal| -> Result<StatusCode, ActionError> {
            portal.submit_feedback(&request)?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn request_appointment(portal: ClientPortal, Json(form): Json<AppointmentForm>) -> Response {
    portal
        .run(move |portal| -> Result<StatusCode, ActionError> {
            portal.request_appointment(&form)?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn lookup_test_result(portal: ClientPortal, Json(form): Json<SerialNumberForm>) -> Response {
    portal
        .run(move |portal| -> Result<Json<TestResultLookup>, ActionError> {
            Ok(Json(portal.lookup_test_result(&form.serial_number)?))
        })
        .await
}

pub async fn clear_search_history(portal: ClientPortal) -> Response {
    portal
        .run(|portal| -> Result<StatusCode, ActionError> {
            portal.clear_search_history()?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn update_settings(portal: ClientPortal, Json(form): Json<SettingsForm>) -> Response {
    portal
        .run(move |portal| -> Result<StatusCode, ActionError> {
            portal.set_biometric_lock_enabled(form.biometric_lock_enabled)?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn save_test_result(portal: ClientPortal, Json(test_result): Json<TestResult>) -> Response {
    portal
        .run(move |portal| -> Result<StatusCode, ActionError> {
            portal.save_test_result(&test_result)?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn post_daily_gold_update(
    portal: ClientPortal,
    Json(form): Json<DailyGoldUpdateForm>,
) -> Response {
    portal
        .run(move |portal| -> Result<StatusCode, ActionError> {
            portal.post_daily_gold_update(&form)?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn update_content(portal: ClientPortal, Json(update): Json<ContentUpdate>) -> Response {
    portal
        .run(move |portal| -> Result<StatusCode, ActionError> {
            portal.update_content(&update)?;

            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

pub async fn issue_reset_passcode(
    portal: ClientPortal,
    Json(request): Json<PasscodeRequest>,
) -> Response {
    portal
        .run(move |portal| -> Result<Json<IssuedPasscode>, ActionError> {
            let passcode = portal.issue_reset_passcode(&request)?;

            Ok(Json(IssuedPasscode { passcode }))
        })
        .await
}
