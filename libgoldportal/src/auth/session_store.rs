use crate::auth::credential::OwnerCredential;
use crate::auth::session::{Role, Session};
use crate::storage::customer_directory::{CustomerDirectory, CustomerRecord};
use crate::storage::{read_json, write_json, ThreadSafeLocalStorage};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SESSION_STORAGE_KEY: &str = "auth-storage";
const SESSION_STORAGE_VERSION: u32 = 0;

#[derive(Serialize, Deserialize)]
struct PersistedSession {
    state: Session,
    version: u32,
}

/// Single source of truth for the session of one client.
///
/// Every mutation is written through to local storage so the session survives
/// reloads. None of the operations fail: storage problems are logged and the
/// in-memory session stays authoritative until the next load.
pub struct SessionStore {
    session: Session,
    storage: Arc<ThreadSafeLocalStorage>,
    directory: CustomerDirectory,
    owner_credential: Option<OwnerCredential>,
}

impl SessionStore {
    /// Restores the persisted session, falling back to a signed out one.
    pub fn load(
        storage: Arc<ThreadSafeLocalStorage>,
        directory: CustomerDirectory,
        owner_credential: Option<OwnerCredential>,
    ) -> SessionStore {
        let session = match read_json::<PersistedSession>(storage.as_ref(), SESSION_STORAGE_KEY) {
            Ok(Some(persisted)) if persisted.state.is_consistent() => persisted.state,
            Ok(Some(_)) => {
                warn!("Discarding persisted session that has a role without being authenticated");
                Session::default()
            }
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("Discarding unreadable persisted session: {e}");
                Session::default()
            }
        };

        SessionStore {
            session,
            storage,
            directory,
            owner_credential,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn directory(&self) -> &CustomerDirectory {
        &self.directory
    }

    /// Signs in as owner when the credential matches the configured one,
    /// otherwise as the mirrored customer with that username and password.
    ///
    /// A failed attempt leaves the current session untouched.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        let is_owner = self
            .owner_credential
            .as_ref()
            .is_some_and(|owner| owner.matches(username, password));

        if is_owner {
            info!("Owner {username} signed in");
            self.update(Session::signed_in(username, Role::Owner));
            return true;
        }

        if self
            .directory
            .find_by_credentials(username, password)
            .is_some()
        {
            info!("Customer {username} signed in");
            self.update(Session::signed_in(username, Role::Customer));
            return true;
        }

        info!("Rejected sign in attempt for {username}");
        false
    }

    pub fn logout(&mut self) {
        if let Some(username) = self.session.username() {
            info!("{username} signed out");
        }

        self.update(Session::default());
    }

    /// Mirrors a customer into the local directory.
    ///
    /// Returns false when the username is already taken locally or the
    /// directory could not be written.
    pub fn register_customer(&self, username: &str, password: &str, mobile_number: &str) -> bool {
        match self
            .directory
            .add(CustomerRecord::new(username, password, mobile_number))
        {
            Ok(true) => {
                info!("Registered customer {username} locally");
                true
            }
            Ok(false) => {
                info!("Customer {username} is already registered locally");
                false
            }
            Err(e) => {
                warn!("Could not register customer {username} locally: {e}");
                false
            }
        }
    }

    pub fn set_handshake_complete(&mut self, complete: bool) {
        let mut session = self.session.clone();
        session.set_handshake_complete(complete);

        self.update(session);
    }

    pub fn clear_handshake(&mut self) {
        self.set_handshake_complete(false);
    }

    fn update(&mut self, session: Session) {
        self.session = session;

        let persisted = PersistedSession {
            state: self.session.clone(),
            version: SESSION_STORAGE_VERSION,
        };
        if let Err(e) = write_json(self.storage.as_ref(), SESSION_STORAGE_KEY, &persisted) {
            warn!("Could not persist session: {e}");
        }
    }
}
