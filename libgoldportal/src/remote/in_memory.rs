use crate::remote::model::{
    AppointmentRequest, CustomerPublicView, DailyGoldUpdate, FeedbackEntry, TestResult,
};
use crate::remote::{DataService, DataServiceError, RejectedSnafu};
use chrono::Utc;
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

struct Customer {
    username: String,
    password: String,
    mobile_number: String,
}

#[derive(Default)]
struct InMemoryState {
    content: HashMap<String, String>,
    customers: Vec<Customer>,
    appointments: Vec<AppointmentRequest>,
    feedback: Vec<FeedbackEntry>,
    test_results: HashMap<String, TestResult>,
    daily_gold_updates: BTreeMap<String, String>,
    reset_passcodes: HashMap<String, String>,
    pending_resets: HashMap<String, String>,
}

/// Data service that keeps everything in process memory.
pub struct InMemoryDataService {
    state: RwLock<InMemoryState>,
    reject_text: Option<String>,
}

impl Default for InMemoryDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDataService {
    pub fn new() -> InMemoryDataService {
        InMemoryDataService {
            state: RwLock::new(InMemoryState::default()),
            reject_text: None,
        }
    }

    /// A service that rejects every call with the given reject text.
    pub fn rejecting(reject_text: &str) -> InMemoryDataService {
        InMemoryDataService {
            state: RwLock::new(InMemoryState::default()),
            reject_text: Some(reject_text.to_string()),
        }
    }

    fn accept(&self) -> Result<(), DataServiceError> {
        match &self.reject_text {
            Some(reject_text) => RejectedSnafu { reject_text }.fail(),
            None => Ok(()),
        }
    }

    /// Password currently registered for the username, if any.
    pub fn customer_password(&self, username: &str) -> Option<String> {
        let state = self.state.read().unwrap();
        state
            .customers
            .iter()
            .find(|c| c.username == username)
            .map(|c| c.password.clone())
    }
}

impl DataService for InMemoryDataService {
    fn add_appointment(
        &self,
        serial_number: &str,
        test_type: &str,
        appointment_date: &str,
    ) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        state.appointments.push(AppointmentRequest {
            serial_number: serial_number.to_string(),
            test_type: test_type.to_string(),
            appointment_date: appointment_date.to_string(),
            request_time: Utc::now().timestamp_millis(),
        });

        Ok(())
    }

    fn add_customer(
        &self,
        username: &str,
        password: &str,
        mobile_number: &str,
        _email: &str,
    ) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        if state.customers.iter().any(|c| c.username == username) {
            return RejectedSnafu {
                reject_text: "Username already exists",
            }
            .fail();
        }

        info!("Adding customer {username}");
        state.customers.push(Customer {
            username: username.to_string(),
            password: password.to_string(),
            mobile_number: mobile_number.to_string(),
        });

        Ok(())
    }

    fn add_feedback_entry(
        &self,
        feedback: &str,
        customer_first_name: &str,
    ) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        state.feedback.push(FeedbackEntry {
            customer_first_name: customer_first_name.to_string(),
            feedback: feedback.to_string(),
        });

        Ok(())
    }

    fn add_reset_passcode(
        &self,
        mobile_number: &str,
        passcode: &str,
    ) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        state
            .reset_passcodes
            .insert(mobile_number.to_string(), passcode.to_string());

        Ok(())
    }

    fn finalize_password_reset(&self, mobile_number: &str) -> Result<bool, DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        let Some(new_password) = state.pending_resets.remove(mobile_number) else {
            return Ok(false);
        };

        state.reset_passcodes.remove(mobile_number);
        let mut updated = false;
        for customer in state
            .customers
            .iter_mut()
            .filter(|c| c.mobile_number == mobile_number)
        {
            customer.password = new_password.clone();
            updated = true;
        }

        Ok(updated)
    }

    fn get_all_customers_public_view(&self) -> Result<Vec<CustomerPublicView>, DataServiceError> {
        self.accept()?;

        let state = self.state.read().unwrap();
        Ok(state
            .customers
            .iter()
            .map(|c| CustomerPublicView {
                username: c.username.clone(),
                mobile_number: c.mobile_number.clone(),
            })
            .collect())
    }

    fn get_all_entries(&self) -> Result<Vec<FeedbackEntry>, DataServiceError> {
        self.accept()?;

        Ok(self.state.read().unwrap().feedback.clone())
    }

    fn get_appointments(&self) -> Result<Vec<AppointmentRequest>, DataServiceError> {
        self.accept()?;

        Ok(self.state.read().unwrap().appointments.clone())
    }

    fn get_content(&self, section: &str) -> Result<String, DataServiceError> {
        self.accept()?;

        let state = self.state.read().unwrap();
        Ok(state.content.get(section).cloned().unwrap_or_default())
    }

    fn get_customer_count(&self) -> Result<u64, DataServiceError> {
        self.accept()?;

        Ok(self.state.read().unwrap().customers.len() as u64)
    }

    fn get_test_result(&self, serial_number: &str) -> Result<Option<TestResult>, DataServiceError> {
        self.accept()?;

        let state = self.state.read().unwrap();
        Ok(state.test_results.get(serial_number).cloned())
    }

    fn request_password_reset(
        &self,
        mobile_number: &str,
        new_password: &str,
    ) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        if !state
            .customers
            .iter()
            .any(|c| c.mobile_number == mobile_number)
        {
            return RejectedSnafu {
                reject_text: "No customer is registered with this mobile number",
            }
            .fail();
        }

        state
            .pending_resets
            .insert(mobile_number.to_string(), new_password.to_string());

        Ok(())
    }

    fn update_content(&self, section: &str, content: &str) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        state
            .content
            .insert(section.to_string(), content.to_string());

        Ok(())
    }

    fn update_test_result(&self, test_result: TestResult) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        state
            .test_results
            .insert(test_result.serial_number.clone(), test_result);

        Ok(())
    }

    fn verify_reset_passcode(
        &self,
        mobile_number: &str,
        passcode: &str,
    ) -> Result<bool, DataServiceError> {
        self.accept()?;

        let state = self.state.read().unwrap();
        Ok(state
            .reset_passcodes
            .get(mobile_number)
            .is_some_and(|p| p == passcode))
    }

    fn get_all_daily_gold_updates(&self) -> Result<Vec<DailyGoldUpdate>, DataServiceError> {
        self.accept()?;

        let state = self.state.read().unwrap();
        Ok(state
            .daily_gold_updates
            .iter()
            .map(|(date, content)| DailyGoldUpdate {
                date: date.clone(),
                content: content.clone(),
            })
            .collect())
    }

    fn set_daily_gold_update(&self, date: &str, content: &str) -> Result<(), DataServiceError> {
        self.accept()?;

        let mut state = self.state.write().unwrap();
        state
            .daily_gold_updates
            .insert(date.to_string(), content.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_customer() {
        let service = InMemoryDataService::new();

        service
            .add_customer("alice", "pw", "9998887776", "")
            .unwrap();
        let err = service
            .add_customer("alice", "pw2", "9998887776", "")
            .unwrap_err();

        assert!(err.to_string().contains("Username already exists"));
        assert_eq!(service.get_customer_count().unwrap(), 1);
    }

    #[test]
    fn finalizing_applies_requested_password() {
        let service = InMemoryDataService::new();
        service
            .add_customer("alice", "pw", "9998887776", "a@example.com")
            .unwrap();
        service.add_reset_passcode("9998887776", "1234").unwrap();

        assert!(service.verify_reset_passcode("9998887776", "1234").unwrap());
        service
            .request_password_reset("9998887776", "new-pw")
            .unwrap();

        assert!(service.finalize_password_reset("9998887776").unwrap());
        assert_eq!(service.customer_password("alice").as_deref(), Some("new-pw"));
        assert!(!service.verify_reset_passcode("9998887776", "1234").unwrap());
        assert!(!service.finalize_password_reset("9998887776").unwrap());
    }

    #[test]
    fn rejecting_service_rejects_reads_and_writes() {
        let service = InMemoryDataService::rejecting("Unauthorized");

        assert!(service.get_appointments().is_err());
        assert!(service.set_daily_gold_update("2026-10-19", "x").is_err());
    }
}
