use crate::storage::{read_json, write_json, LocalStorageError, ThreadSafeLocalStorage};
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PASSWORD_RESET_REQUESTS_KEY: &str = "passwordResetRequests";
pub const RESET_PASSCODES_KEY: &str = "resetPasscodes";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub mobile_number: String,
    /// Milliseconds since the unix epoch.
    pub timestamp: i64,
}

/// Queue of password reset requests waiting for the owner to issue a passcode.
pub struct PasswordResetRequests {
    storage: Arc<ThreadSafeLocalStorage>,
}

impl PasswordResetRequests {
    pub fn new(storage: Arc<ThreadSafeLocalStorage>) -> PasswordResetRequests {
        PasswordResetRequests { storage }
    }

    pub fn requests(&self) -> Vec<PasswordResetRequest> {
        match read_json::<Vec<PasswordResetRequest>>(
            self.storage.as_ref(),
            PASSWORD_RESET_REQUESTS_KEY,
        ) {
            Ok(requests) => requests.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read password reset requests: {e}");
                Vec::new()
            }
        }
    }

    pub fn submit(&self, mobile_number: &str) -> Result<PasswordResetRequest, LocalStorageError> {
        let request = PasswordResetRequest {
            mobile_number: mobile_number.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };

        let mut requests = self.requests();
        requests.push(request.clone());
        write_json(
            self.storage.as_ref(),
            PASSWORD_RESET_REQUESTS_KEY,
            &requests,
        )?;

        Ok(request)
    }
}

/// Passcodes the owner handed out, keyed by mobile number.
pub struct ResetPasscodes {
    storage: Arc<ThreadSafeLocalStorage>,
}

impl ResetPasscodes {
    pub fn new(storage: Arc<ThreadSafeLocalStorage>) -> ResetPasscodes {
        ResetPasscodes { storage }
    }

    fn passcodes(&self) -> BTreeMap<String, String> {
        match read_json::<BTreeMap<String, String>>(self.storage.as_ref(), RESET_PASSCODES_KEY) {
            Ok(passcodes) => passcodes.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read reset passcodes: {e}");
                BTreeMap::new()
            }
        }
    }

    pub fn get(&self, mobile_number: &str) -> Option<String> {
        self.passcodes().remove(mobile_number)
    }

    pub fn matches(&self, mobile_number: &str, passcode: &str) -> bool {
        self.get(mobile_number).as_deref() == Some(passcode)
    }

    /// Sets the passcode for the mobile number, replacing an earlier one.
    pub fn set(&self, mobile_number: &str, passcode: &str) -> Result<(), LocalStorageError> {
        let mut passcodes = self.passcodes();
        passcodes.insert(mobile_number.to_string(), passcode.to_string());

        write_json(self.storage.as_ref(), RESET_PASSCODES_KEY, &passcodes)
    }

    pub fn remove(&self, mobile_number: &str) -> Result<(), LocalStorageError> {
        let mut passcodes = self.passcodes();
        if passcodes.remove(mobile_number).is_none() {
            return Ok(());
        }

        write_json(self.storage.as_ref(), RESET_PASSCODES_KEY, &passcodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryLocalStorage;

    #[test]
    fn keeps_requests_in_submission_order() {
        let requests = PasswordResetRequests::new(Arc::new(InMemoryLocalStorage::new()));

        requests.submit("9998887776").unwrap();
        requests.submit("1112223334").unwrap();

        let mobile_numbers: Vec<String> = requests
            .requests()
            .into_iter()
            .map(|r| r.mobile_number)
            .collect();
        assert_eq!(mobile_numbers, vec!["9998887776", "1112223334"]);
    }

    #[test]
    fn later_passcode_replaces_earlier_one() {
        let passcodes = ResetPasscodes::new(Arc::new(InMemoryLocalStorage::new()));

        passcodes.set("9998887776", "1234").unwrap();
        passcodes.set("9998887776", "5678").unwrap();

        assert!(passcodes.matches("9998887776", "5678"));
        assert!(!passcodes.matches("9998887776", "1234"));
    }

    #[test]
    fn removed_passcode_no_longer_matches() {
        let passcodes = ResetPasscodes::new(Arc::new(InMemoryLocalStorage::new()));
        passcodes.set("9998887776", "1234").unwrap();
        passcodes.set("1112223334", "4321").unwrap();

        passcodes.remove("9998887776").unwrap();

        assert_eq!(passcodes.get("9998887776"), None);
        assert!(passcodes.matches("1112223334", "4321"));
    }
}
