use crate::portal::{remote_call, Portal, PortalError, Section};
use crate::remote::model::{
    AppointmentRequest, CustomerPublicView, DailyGoldUpdate, FeedbackEntry, TestResult,
};
use crate::routing::Route;
use crate::storage::customer_directory::CustomerRecord;
use crate::storage::password_reset::PasswordResetRequest;
use crate::validation::require;
use log::info;
use serde::{Deserialize, Serialize};

/// A mirrored customer as shown to the owner, without the password.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalCustomerView {
    pub username: String,
    pub mobile_number: String,
    pub registration_date: i64,
}

impl From<CustomerRecord> for LocalCustomerView {
    fn from(record: CustomerRecord) -> Self {
        LocalCustomerView {
            username: record.username,
            mobile_number: record.mobile_number,
            registration_date: record.registration_date,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub appointments: Section<Vec<AppointmentRequest>>,
    pub feedback: Section<Vec<FeedbackEntry>>,
    pub customers: Section<Vec<CustomerPublicView>>,
    pub customer_count: Section<u64>,
    pub local_customers: Vec<LocalCustomerView>,
    pub password_reset_requests: Vec<PasswordResetRequest>,
    pub daily_gold_updates: Section<Vec<DailyGoldUpdate>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ContentUpdate {
    pub section: String,
    pub content: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DailyGoldUpdateForm {
    pub date: String,
    pub content: String,
}

impl Portal {
    pub fn owner_dashboard(&self) -> Result<DashboardView, PortalError> {
        self.enter(Route::OwnerDashboard)?;

        let local_customers = self
            .session_store
            .directory()
            .customers()
            .into_iter()
            .map(LocalCustomerView::from)
            .collect();

        Ok(DashboardView {
            appointments: Section::from_call(
                self.data_service.get_appointments(),
                "view appointments",
                "Failed to load appointments",
            ),
            feedback: Section::from_call(
                self.data_service.get_all_entries(),
                "view feedback",
                "Failed to load feedback",
            ),
            customers: Section::from_call(
                self.data_service.get_all_customers_public_view(),
                "view customers",
                "Failed to load customers",
            ),
            customer_count: Section::from_call(
                self.data_service.get_customer_count(),
                "view customers",
                "Failed to load customer count",
            ),
            local_customers,
            password_reset_requests: self.password_reset_requests()?,
            daily_gold_updates: self.daily_gold_updates(),
        })
    }

    pub fn save_test_result(&self, test_result: &TestResult) -> Result<(), PortalError> {
        self.enter(Route::OwnerDashboard)?;

        let serial_number = require(&test_result.serial_number, "serial number")?;
        let test_result = TestResult {
            serial_number: serial_number.to_string(),
            ..test_result.clone()
        };

        remote_call(
            self.data_service.update_test_result(test_result),
            "save test results",
            "Failed to save test result",
        )?;

        info!("Saved test result {serial_number}");
        Ok(())
    }

    pub fn post_daily_gold_update(&self, form: &DailyGoldUpdateForm) -> Result<(), PortalError> {
        self.enter(Route::OwnerDashboard)?;

        let date = require(&form.date, "date")?;
        let content = require(&form.content, "content")?;

        remote_call(
            self.data_service.set_daily_gold_update(date, content),
            "post daily gold updates",
            "Failed to save daily update",
        )
    }

    pub fn update_content(&self, update: &ContentUpdate) -> Result<(), PortalError> {
        self.enter(Route::OwnerDashboard)?;

        let section = require(&update.section, "section")?;

        remote_call(
            self.data_service.update_content(section, &update.content),
            "update shop information",
            "Failed to update content",
        )
    }
}
