//! Page actions of the portal, one operation per form or page load.
//!
//! A [`Portal`] is opened per client and request. It owns the client's
//! [`SessionStore`], reaches the data service for everything the shop keeps
//! remotely, and the local stores for what stays with the client.

mod account;
mod customer;
mod owner;
mod password_reset;

pub use account::{LoginForm, LoginRequest, RegistrationRequest};
pub use customer::{
    AppointmentForm, FeedbackRequest, ShopInfoView, TestResultLookup, WelcomeView,
};
pub use owner::{ContentUpdate, DailyGoldUpdateForm, DashboardView, LocalCustomerView};
pub use password_reset::{PasscodeRequest, PasswordResetForm};

use crate::auth::credential::OwnerCredential;
use crate::auth::session::Session;
use crate::auth::session_store::SessionStore;
use crate::failure::{describe_failure, error_message};
use crate::remote::{DataServiceError, ThreadSafeDataService};
use crate::routing::guard::{GuardPolicy, Navigation, RouteGuard};
use crate::routing::Route;
use crate::storage::customer_directory::CustomerDirectory;
use crate::storage::{LocalStorageError, ThreadSafeLocalStorage};
use crate::validation::ValidationError;
use log::warn;
use serde::Serialize;
use snafu::Snafu;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct PortalSettings {
    pub owner_credential: Option<OwnerCredential>,
    pub guard_policy: GuardPolicy,
}

/// Why a page action did not go through.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PortalError {
    /// The form input is invalid.
    #[snafu(display("{source}"))]
    InvalidInputError { source: ValidationError },
    /// The input is well formed but does not match what the portal knows.
    #[snafu(display("{message}"))]
    DeniedError { message: String },
    /// The route guard did not let the client perform the action.
    #[snafu(display("Navigation was redirected to {}", navigation.destination))]
    RedirectedError { navigation: Navigation },
    #[snafu(display("{message}"))]
    RemoteCallError {
        message: String,
        source: DataServiceError,
    },
    #[snafu(display("Could not update local storage: {source}"))]
    LocalStorageFailedError { source: LocalStorageError },
}

impl From<ValidationError> for PortalError {
    fn from(source: ValidationError) -> Self {
        PortalError::InvalidInputError { source }
    }
}

/// A part of a page that loads independently of the others.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Section<T> {
    Loaded(T),
    Failed(String),
}

impl<T> Section<T> {
    fn from_call(result: Result<T, DataServiceError>, action: &str, context: &str) -> Section<T> {
        match remote_call(result, action, context) {
            Ok(value) => Section::Loaded(value),
            Err(e) => Section::Failed(e.to_string()),
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Section::Loaded(value) => Some(value),
            Section::Failed(_) => None,
        }
    }
}

pub struct Portal {
    data_service: Arc<ThreadSafeDataService>,
    session_store: SessionStore,
    shared_storage: Arc<ThreadSafeLocalStorage>,
    client_storage: Arc<ThreadSafeLocalStorage>,
    guard: RouteGuard,
}

impl Portal {
    /// Opens the portal for one client.
    ///
    /// `shared_storage` holds what every client of this portal sees (customer
    /// directory, password resets), `client_storage` what belongs to the client
    /// alone (session, search history, settings).
    pub fn open(
        data_service: Arc<ThreadSafeDataService>,
        shared_storage: Arc<ThreadSafeLocalStorage>,
        client_storage: Arc<ThreadSafeLocalStorage>,
        settings: &PortalSettings,
    ) -> Portal {
        let session_store = SessionStore::load(
            client_storage.clone(),
            CustomerDirectory::new(shared_storage.clone()),
            settings.owner_credential.clone(),
        );

        Portal {
            data_service,
            session_store,
            shared_storage,
            client_storage,
            guard: RouteGuard::new(settings.guard_policy),
        }
    }

    pub fn session(&self) -> &Session {
        self.session_store.session()
    }

    pub fn navigate(&self, route: Route) -> Navigation {
        self.guard.navigate(route, self.session())
    }

    /// Fails with the redirect the guard would issue for the route.
    pub fn enter(&self, route: Route) -> Result<(), PortalError> {
        let navigation = self.navigate(route);
        if navigation.was_redirected() {
            return Err(PortalError::RedirectedError { navigation });
        }

        Ok(())
    }
}

fn remote_call<T>(
    result: Result<T, DataServiceError>,
    action: &str,
    context: &str,
) -> Result<T, PortalError> {
    result.map_err(|source| {
        let message = describe_failure(&error_message(&source), action, context);
        warn!("Data service call failed: {message}");

        PortalError::RemoteCallError { message, source }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::remote::InMemoryDataService;
    use crate::storage::InMemoryLocalStorage;

    pub const OWNER_USERNAME: &str = "Bhanuchand";
    pub const OWNER_PASSWORD: &str = "Prataap";

    /// A portal shop with one shared storage that clients can open portals on.
    pub struct TestShop {
        pub data_service: Arc<InMemoryDataService>,
        pub shared_storage: Arc<InMemoryLocalStorage>,
        pub settings: PortalSettings,
    }

    impl TestShop {
        pub fn new() -> TestShop {
            Self::with_data_service(InMemoryDataService::new())
        }

        pub fn with_data_service(data_service: InMemoryDataService) -> TestShop {
            TestShop {
                data_service: Arc::new(data_service),
                shared_storage: Arc::new(InMemoryLocalStorage::new()),
                settings: PortalSettings {
                    owner_credential: Some(OwnerCredential::new(OWNER_USERNAME, OWNER_PASSWORD)),
                    guard_policy: GuardPolicy::default(),
                },
            }
        }

        pub fn client(&self) -> TestClient {
            TestClient {
                storage: Arc::new(InMemoryLocalStorage::new()),
            }
        }

        pub fn open(&self, client: &TestClient) -> Portal {
            Portal::open(
                self.data_service.clone(),
                self.shared_storage.clone(),
                client.storage.clone(),
                &self.settings,
            )
        }

        pub fn signed_in_owner(&self) -> Portal {
            let mut portal = self.open(&self.client());
            portal
                .login(&LoginRequest::new(OWNER_USERNAME, OWNER_PASSWORD, LoginForm::Owner))
                .unwrap();

            portal
        }

        pub fn signed_in_customer(&self, username: &str, mobile_number: &str) -> Portal {
            let mut portal = self.open(&self.client());
            portal
                .register(&RegistrationRequest {
                    username: username.to_string(),
                    password: "pw".to_string(),
                    confirm_password: "pw".to_string(),
                    mobile_number: mobile_number.to_string(),
                    email: String::new(),
                })
                .unwrap();
            portal
                .login(&LoginRequest::new(username, "pw", LoginForm::Customer))
                .unwrap();

            portal
        }
    }

    pub struct TestClient {
        pub storage: Arc<InMemoryLocalStorage>,
    }
}
