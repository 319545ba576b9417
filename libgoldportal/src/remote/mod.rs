mod in_memory;
pub mod model;

pub use in_memory::InMemoryDataService;

use crate::remote::model::{
    AppointmentRequest, CustomerPublicView, DailyGoldUpdate, FeedbackEntry, TestResult,
};
use snafu::Snafu;

/// Errors that may occur when calling the data service.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DataServiceError {
    /// The service refused the call, e.g. because the caller is not allowed to make it.
    #[snafu(display("Call was rejected:\nReject text: {reject_text}"))]
    RejectedError { reject_text: String },
    /// The service could not be reached or failed internally.
    #[snafu(display("{message}"))]
    UnavailableError { message: String },
}

pub type ThreadSafeDataService = dyn DataService + Sync + Send;

/// The shop's backend: the authority on content, test results, customers,
/// appointments, feedback, daily updates and password resets.
pub trait DataService {
    fn add_appointment(
        &self,
        serial_number: &str,
        test_type: &str,
        appointment_date: &str,
    ) -> Result<(), DataServiceError>;

    /// Registers a customer. Rejects a username that is already taken.
    fn add_customer(
        &self,
        username: &str,
        password: &str,
        mobile_number: &str,
        email: &str,
    ) -> Result<(), DataServiceError>;

    fn add_feedback_entry(
        &self,
        feedback: &str,
        customer_first_name: &str,
    ) -> Result<(), DataServiceError>;

    /// Stores the passcode the owner issued for the mobile number.
    fn add_reset_passcode(&self, mobile_number: &str, passcode: &str)
        -> Result<(), DataServiceError>;

    /// Applies the pending password reset of the mobile number.
    ///
    /// Returns false when there is no pending reset.
    fn finalize_password_reset(&self, mobile_number: &str) -> Result<bool, DataServiceError>;

    fn get_all_customers_public_view(&self) -> Result<Vec<CustomerPublicView>, DataServiceError>;

    /// All feedback entries in submission order.
    fn get_all_entries(&self) -> Result<Vec<FeedbackEntry>, DataServiceError>;

    fn get_appointments(&self) -> Result<Vec<AppointmentRequest>, DataServiceError>;

    /// Content of a named page section. Unknown sections are empty.
    fn get_content(&self, section: &str) -> Result<String, DataServiceError>;

    fn get_customer_count(&self) -> Result<u64, DataServiceError>;

    fn get_test_result(&self, serial_number: &str) -> Result<Option<TestResult>, DataServiceError>;

    /// Records the password a customer wants after the reset is finalized.
    fn request_password_reset(
        &self,
        mobile_number: &str,
        new_password: &str,
    ) -> Result<(), DataServiceError>;

    fn update_content(&self, section: &str, content: &str) -> Result<(), DataServiceError>;

    /// Creates or replaces the test result with the same serial number.
    fn update_test_result(&self, test_result: TestResult) -> Result<(), DataServiceError>;

    fn verify_reset_passcode(
        &self,
        mobile_number: &str,
        passcode: &str,
    ) -> Result<bool, DataServiceError>;

    fn get_all_daily_gold_updates(&self) -> Result<Vec<DailyGoldUpdate>, DataServiceError>;

    /// Creates or replaces the posting for the date.
    fn set_daily_gold_update(&self, date: &str, content: &str) -> Result<(), DataServiceError>;
}
