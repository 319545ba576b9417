use rand::Rng;
use snafu::{ensure, Snafu};

const MIN_MOBILE_NUMBER_LEN: usize = 10;
const PASSCODE_LEN: usize = 4;

/// Problems with form input. They are shown next to the form and never reach
/// the data service.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("Passwords do not match"))]
    PasswordMismatchError {},
    #[snafu(display("Please enter a valid mobile number"))]
    InvalidMobileNumberError {},
    #[snafu(display("Passcode must be 4 digits"))]
    InvalidPasscodeError {},
    #[snafu(display("Please fill in all fields."))]
    MissingFieldError { field: &'static str },
}

pub fn validate_password_confirmation(
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    ensure!(password == confirm_password, PasswordMismatchSnafu);

    Ok(())
}

pub fn validate_mobile_number(mobile_number: &str) -> Result<(), ValidationError> {
    ensure!(
        mobile_number.chars().count() >= MIN_MOBILE_NUMBER_LEN,
        InvalidMobileNumberSnafu
    );

    Ok(())
}

pub fn validate_passcode(passcode: &str) -> Result<(), ValidationError> {
    ensure!(
        passcode.len() == PASSCODE_LEN && passcode.chars().all(|c| c.is_ascii_digit()),
        InvalidPasscodeSnafu
    );

    Ok(())
}

/// Trims the value and rejects it when nothing is left.
pub fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    ensure!(!value.is_empty(), MissingFieldSnafu { field });

    Ok(value)
}

/// Random passcode for the owner to hand out.
pub fn generate_passcode() -> String {
    rand::rng().random_range(1000..=9999u32).to_string()
}
