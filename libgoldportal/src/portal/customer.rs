use crate::auth::session::Role;
use crate::portal::{remote_call, Portal, PortalError, Section, LocalStorageFailedSnafu};
use crate::remote::model::{DailyGoldUpdate, TestResult};
use crate::routing::Route;
use crate::storage::preferences::Preferences;
use crate::storage::search_history::SearchHistory;
use crate::validation::require;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub const SHOP_INFO_SECTIONS: [&str; 3] = ["address", "contact", "timings"];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeView {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub links: Vec<Route>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Defaults to the signed in username.
    #[serde(default)]
    pub customer_first_name: Option<String>,
    pub feedback: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentForm {
    pub serial_number: String,
    pub test_type: String,
    pub appointment_date: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestResultLookup {
    pub serial_number: String,
    /// Absent when the shop has no result for the serial number yet.
    pub result: Option<TestResult>,
    pub history: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ShopInfoView {
    pub sections: Vec<(String, Section<String>)>,
}

impl Portal {
    pub fn welcome(&self) -> WelcomeView {
        let session = self.session();
        let links = match session.role() {
            Some(Role::Owner) => vec![Route::OwnerDashboard, Route::ShopInfo],
            _ => vec![
                Route::TestResults,
                Route::Appointments,
                Route::Feedback,
                Route::DailyGoldUpdates,
                Route::ShopInfo,
            ],
        };

        WelcomeView {
            username: session.username().map(str::to_string),
            role: session.role(),
            links,
        }
    }

    pub fn submit_feedback(&self, request: &FeedbackRequest) -> Result<(), PortalError> {
        self.enter(Route::Feedback)?;

        let name = request
            .customer_first_name
            .as_deref()
            .or(self.session().username())
            .unwrap_or_default();
        let name = require(name, "name")?;
        let feedback = require(&request.feedback, "feedback")?;

        remote_call(
            self.data_service.add_feedback_entry(feedback, name),
            "submit feedback",
            "Failed to submit feedback",
        )
    }

    pub fn request_appointment(&self, form: &AppointmentForm) -> Result<(), PortalError> {
        self.enter(Route::Appointments)?;

        let serial_number = require(&form.serial_number, "serial number")?;
        let test_type = require(&form.test_type, "test type")?;
        let appointment_date = require(&form.appointment_date, "appointment date")?;

        remote_call(
            self.data_service
                .add_appointment(serial_number, test_type, appointment_date),
            "book an appointment",
            "Failed to submit appointment",
        )
    }

    pub fn search_history(&self) -> Vec<String> {
        SearchHistory::new(self.client_storage.clone()).entries()
    }

    pub fn clear_search_history(&self) -> Result<(), PortalError> {
        SearchHistory::new(self.client_storage.clone())
            .clear()
            .context(LocalStorageFailedSnafu)
    }

    /// Remembers the serial number and fetches its result.
    pub fn lookup_test_result(&self, serial_number: &str) -> Result<TestResultLookup, PortalError> {
        self.enter(Route::TestResults)?;

        let serial_number = require(serial_number, "serial number")?;
        let history = SearchHistory::new(self.client_storage.clone())
            .record(serial_number)
            .context(LocalStorageFailedSnafu)?;

        let result = remote_call(
            self.data_service.get_test_result(serial_number),
            "view test results",
            "Failed to load test result",
        )?;

        Ok(TestResultLookup {
            serial_number: serial_number.to_string(),
            result,
            history,
        })
    }

    /// Daily gold rate postings, newest date first.
    pub fn daily_gold_updates(&self) -> Section<Vec<DailyGoldUpdate>> {
        let mut section = Section::from_call(
            self.data_service.get_all_daily_gold_updates(),
            "view daily gold updates",
            "Failed to load daily gold updates",
        );

        if let Section::Loaded(updates) = &mut section {
            updates.sort_by(|a, b| b.date.cmp(&a.date));
        }

        section
    }

    pub fn shop_info(&self) -> ShopInfoView {
        let sections = SHOP_INFO_SECTIONS
            .iter()
            .map(|section| {
                let content = Section::from_call(
                    self.data_service.get_content(section),
                    "view shop information",
                    "Failed to load shop information",
                );

                (section.to_string(), content)
            })
            .collect();

        ShopInfoView { sections }
    }

    pub fn biometric_lock_enabled(&self) -> bool {
        Preferences::new(self.client_storage.clone()).biometric_lock_enabled()
    }

    pub fn set_biometric_lock_enabled(&self, enabled: bool) -> Result<(), PortalError> {
        self.enter(Route::Settings)?;

        Preferences::new(self.client_storage.clone())
            .set_biometric_lock_enabled(enabled)
            .context(LocalStorageFailedSnafu)
    }
}
