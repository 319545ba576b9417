use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// The owner's sign-in credential, provided by configuration.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OwnerCredential {
    pub username: String,
    pub password: String,
}

impl OwnerCredential {
    pub fn new(username: &str, password: &str) -> OwnerCredential {
        OwnerCredential {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl Debug for OwnerCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
