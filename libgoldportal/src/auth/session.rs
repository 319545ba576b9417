use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The shop owner, with access to the management dashboard.
    Owner,
    Customer,
}

/// Who is using the portal and with what privileges.
///
/// The role is set exactly when the session is authenticated.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    is_authenticated: bool,
    username: Option<String>,
    role: Option<Role>,
    handshake_complete: bool,
}

impl Session {
    /// A freshly signed in session. The handshake always starts out incomplete.
    pub fn signed_in(username: &str, role: Role) -> Session {
        Session {
            is_authenticated: true,
            username: Some(username.to_string()),
            role: Some(role),
            handshake_complete: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_owner(&self) -> bool {
        self.role == Some(Role::Owner)
    }

    pub fn handshake_complete(&self) -> bool {
        self.handshake_complete
    }

    pub(crate) fn set_handshake_complete(&mut self, complete: bool) {
        self.handshake_complete = complete;
    }

    /// Whether the session upholds its invariants. Sessions restored from
    /// storage may not.
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated == self.role.is_some()
    }
}
