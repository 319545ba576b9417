use serde::{Deserialize, Serialize};

/// The itemized lab panel recorded for a tested sample.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TestResult {
    /// Serial number printed on the customer's test paper.
    pub serial_number: String,
    pub serial_number2: String,
    pub cts: u64,
    pub hiv_tests: u64,
    pub plating_tests: u64,
    pub pother_tests: u64,
    pub hepatitis_c: u64,
    pub hepatitis_b: u64,
    pub rns: u64,
    pub coagulase: String,
    pub kb_disc: String,
    pub urine_full_exam: String,
    /// Free-form extra field, only shown when both name and value are set.
    pub additional_field_name: Option<String>,
    pub additional_field_value: Option<String>,
}

impl TestResult {
    pub fn additional_field(&self) -> Option<(&str, &str)> {
        match (
            self.additional_field_name.as_deref(),
            self.additional_field_value.as_deref(),
        ) {
            (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => {
                Some((name, value))
            }
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub serial_number: String,
    pub test_type: String,
    pub appointment_date: String,
    /// Milliseconds since the unix epoch.
    pub request_time: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub customer_first_name: String,
    pub feedback: String,
}

/// What the data service reveals about a customer to the owner.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPublicView {
    pub username: String,
    pub mobile_number: String,
}

/// Gold rate posting for a single day.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DailyGoldUpdate {
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    pub content: String,
}
