use crate::storage::{read_json, write_json, LocalStorageError, ThreadSafeLocalStorage};
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CUSTOMERS_KEY: &str = "customers";

/// A customer as mirrored into local storage after a successful remote registration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub username: String,
    pub password: String,
    pub mobile_number: String,
    /// Milliseconds since the unix epoch.
    pub registration_date: i64,
}

impl CustomerRecord {
    pub fn new(username: &str, password: &str, mobile_number: &str) -> CustomerRecord {
        CustomerRecord {
            username: username.to_string(),
            password: password.to_string(),
            mobile_number: mobile_number.to_string(),
            registration_date: Utc::now().timestamp_millis(),
        }
    }
}

/// Local mirror of the customers registered through this portal.
///
/// The remote data service stays the authority on customers. The mirror only
/// learns about registrations and password resets performed through this
/// portal, so it may lag behind the remote service.
pub struct CustomerDirectory {
    storage: Arc<ThreadSafeLocalStorage>,
}

impl CustomerDirectory {
    pub fn new(storage: Arc<ThreadSafeLocalStorage>) -> CustomerDirectory {
        CustomerDirectory { storage }
    }

    /// All mirrored customers in registration order.
    ///
    /// An unreadable directory is treated as empty.
    pub fn customers(&self) -> Vec<CustomerRecord> {
        match read_json::<Vec<CustomerRecord>>(self.storage.as_ref(), CUSTOMERS_KEY) {
            Ok(customers) => customers.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read customer directory: {e}");
                Vec::new()
            }
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.customers().iter().any(|c| c.username == username)
    }

    pub fn find_by_credentials(&self, username: &str, password: &str) -> Option<CustomerRecord> {
        self.customers()
            .into_iter()
            .find(|c| c.username == username && c.password == password)
    }

    pub fn find_by_mobile_number(&self, mobile_number: &str) -> Option<CustomerRecord> {
        self.customers()
            .into_iter()
            .find(|c| c.mobile_number == mobile_number)
    }

    /// Appends the record unless its username is already taken.
    ///
    /// Returns whether the record was added.
    pub fn add(&self, record: CustomerRecord) -> Result<bool, LocalStorageError> {
        let mut customers = self.customers();
        if customers.iter().any(|c| c.username == record.username) {
            return Ok(false);
        }

        customers.push(record);
        write_json(self.storage.as_ref(), CUSTOMERS_KEY, &customers)?;

        Ok(true)
    }

    /// Replaces the password of the first customer registered with the mobile number.
    ///
    /// Returns whether a customer was found.
    pub fn update_password(
        &self,
        mobile_number: &str,
        new_password: &str,
    ) -> Result<bool, LocalStorageError> {
        let mut customers = self.customers();
        let Some(customer) = customers
            .iter_mut()
            .find(|c| c.mobile_number == mobile_number)
        else {
            return Ok(false);
        };

        customer.password = new_password.to_string();
        write_json(self.storage.as_ref(), CUSTOMERS_KEY, &customers)?;

        Ok(true)
    }
}
