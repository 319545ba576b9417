use crate::http::response::{redirect_to, ActionError};
use crate::http::ClientPortal;
use axum::response::{IntoResponse, Response};
use axum::Json;
use goldportal::portal::{Portal, PortalError};
use goldportal::routing::Route;
use serde::Serialize;
use serde_json::json;

/// Answers with the page view, or with the redirect the guard asks for.
fn guarded<T, F>(portal: &Portal, route: Route, view: F) -> Response
where
    T: Serialize,
    F: FnOnce(&Portal) -> Result<T, PortalError>,
{
    let navigation = portal.navigate(route);
    if navigation.was_redirected() {
        return redirect_to(navigation.destination);
    }

    match view(portal) {
        Ok(view) => Json(view).into_response(),
        Err(e) => ActionError(e).into_response(),
    }
}

/// Page without content of its own besides the form.
fn form_page(portal: &Portal, route: Route) -> Response {
    guarded(portal, route, |portal| {
        Ok(json!({ "page": route, "session": portal.session() }))
    })
}

pub async fn index(portal: ClientPortal) -> Response {
    portal
        .run(|portal| {
            let navigation = portal.navigate(Route::Index);
            if navigation.was_redirected() {
                return redirect_to(navigation.destination);
            }

            form_page(&portal, Route::Login)
        })
        .await
}

pub async fn session(portal: ClientPortal) -> Response {
    portal.run(|portal| Json(portal.session().clone())).await
}

pub async fn login(portal: ClientPortal) -> Response {
    portal.run(|portal| form_page(&portal, Route::Login)).await
}

pub async fn register(portal: ClientPortal) -> Response {
    portal.run(|portal| form_page(&portal, Route::Register)).await
}

pub async fn forgot_password(portal: ClientPortal) -> Response {
    portal
        .run(|portal| form_page(&portal, Route::ForgotPassword))
        .await
}

pub async fn reset_password(portal: ClientPortal) -> Response {
    portal
        .run(|portal| form_page(&portal, Route::ResetPassword))
        .await
}

pub async fn shop_info(portal: ClientPortal) -> Response {
    portal
        .run(|portal| guarded(&portal, Route::ShopInfo, |portal| Ok(portal.shop_info())))
        .await
}

pub async fn welcome(portal: ClientPortal) -> Response {
    portal
        .run(|portal| guarded(&portal, Route::Welcome, |portal| Ok(portal.welcome())))
        .await
}

pub async fn feedback(portal: ClientPortal) -> Response {
    portal
        .run(|portal| {
            guarded(&portal, Route::Feedback, |portal| {
                Ok(json!({
                    "page": Route::Feedback,
                    "customerFirstName": portal.session().username(),
                }))
            })
        })
        .await
}

pub async fn appointments(portal: ClientPortal) -> Response {
    portal
        .run(|portal| form_page(&portal, Route::Appointments))
        .await
}

pub async fn test_results(portal: ClientPortal) -> Response {
    portal
        .run(|portal| {
            guarded(&portal, Route::TestResults, |portal| {
                Ok(json!({
                    "page": Route::TestResults,
                    "history": portal.search_history(),
                }))
            })
        })
        .await
}

pub async fn daily_gold_updates(portal: ClientPortal) -> Response {
    portal
        .run(|portal| {
            guarded(&portal, Route::DailyGoldUpdates, |portal| {
                Ok(portal.daily_gold_updates())
            })
        })
        .await
}

pub async fn settings(portal: ClientPortal) -> Response {
    portal
        .run(|portal| {
            guarded(&portal, Route::Settings, |portal| {
                Ok(json!({
                    "page": Route::Settings,
                    "biometricLockEnabled": portal.biometric_lock_enabled(),
                }))
            })
        })
        .await
}

pub async fn owner_dashboard(portal: ClientPortal) -> Response {
    portal
        .run(|portal| guarded(&portal, Route::OwnerDashboard, Portal::owner_dashboard))
        .await
}
