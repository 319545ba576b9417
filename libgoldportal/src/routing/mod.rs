pub mod guard;

use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// What has to hold before a route may be entered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable by anyone.
    Public,
    /// Shows the login page unless already signed in.
    Index,
    Authenticated,
    OwnerOnly,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Index,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    ShopInfo,
    Welcome,
    Feedback,
    Appointments,
    TestResults,
    DailyGoldUpdates,
    OwnerDashboard,
    Settings,
}

impl Route {
    pub const ALL: [Route; 13] = [
        Route::Index,
        Route::Login,
        Route::Register,
        Route::ForgotPassword,
        Route::ResetPassword,
        Route::ShopInfo,
        Route::Welcome,
        Route::Feedback,
        Route::Appointments,
        Route::TestResults,
        Route::DailyGoldUpdates,
        Route::OwnerDashboard,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword => "/reset-password",
            Route::ShopInfo => "/shop-info",
            Route::Welcome => "/welcome",
            Route::Feedback => "/feedback",
            Route::Appointments => "/appointments",
            Route::TestResults => "/test-results",
            Route::DailyGoldUpdates => "/daily-gold-updates",
            Route::OwnerDashboard => "/owner-dashboard",
            Route::Settings => "/settings",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn class(&self) -> RouteClass {
        match self {
            Route::Index => RouteClass::Index,
            Route::Login
            | Route::Register
            | Route::ForgotPassword
            | Route::ResetPassword
            | Route::ShopInfo => RouteClass::Public,
            Route::Welcome
            | Route::Feedback
            | Route::Appointments
            | Route::TestResults
            | Route::DailyGoldUpdates
            | Route::Settings => RouteClass::Authenticated,
            Route::OwnerDashboard => RouteClass::OwnerOnly,
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Route {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_path_resolves_to_its_route() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn unknown_path_has_no_route() {
        assert_eq!(Route::from_path("/admin"), None);
        assert_eq!(Route::from_path("/welcome/"), None);
    }

    #[test]
    fn only_dashboard_is_owner_only() {
        let owner_only: Vec<Route> = Route::ALL
            .into_iter()
            .filter(|r| r.class() == RouteClass::OwnerOnly)
            .collect();

        assert_eq!(owner_only, vec![Route::OwnerDashboard]);
    }
}
