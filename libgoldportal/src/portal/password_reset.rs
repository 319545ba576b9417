use crate::portal::{remote_call, LocalStorageFailedSnafu, Portal, PortalError};
use crate::routing::Route;
use crate::storage::password_reset::{PasswordResetRequest, PasswordResetRequests, ResetPasscodes};
use crate::validation::{
    generate_passcode, require, validate_passcode, validate_password_confirmation,
};
use log::info;
use serde::Deserialize;
use snafu::ResultExt;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PasscodeRequest {
    pub mobile_number: String,
    /// A random passcode is generated when none is given.
    #[serde(default)]
    pub passcode: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetForm {
    pub mobile_number: String,
    pub passcode: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn denied(message: &str) -> PortalError {
    PortalError::DeniedError {
        message: message.to_string(),
    }
}

impl Portal {
    /// Queues a reset request for the owner to answer with a passcode.
    pub fn request_password_reset(
        &self,
        mobile_number: &str,
    ) -> Result<PasswordResetRequest, PortalError> {
        let mobile_number = require(mobile_number, "mobile number")?;

        let request = PasswordResetRequests::new(self.shared_storage.clone())
            .submit(mobile_number)
            .context(LocalStorageFailedSnafu)?;

        info!("Password reset requested for {mobile_number}");
        Ok(request)
    }

    pub fn password_reset_requests(&self) -> Result<Vec<PasswordResetRequest>, PortalError> {
        self.enter(Route::OwnerDashboard)?;

        Ok(PasswordResetRequests::new(self.shared_storage.clone()).requests())
    }

    /// Hands out a passcode for the mobile number and returns it.
    pub fn issue_reset_passcode(&self, request: &PasscodeRequest) -> Result<String, PortalError> {
        self.enter(Route::OwnerDashboard)?;

        let mobile_number = require(&request.mobile_number, "mobile number")?;
        let passcode = match &request.passcode {
            Some(passcode) => passcode.trim().to_string(),
            None => generate_passcode(),
        };
        validate_passcode(&passcode)?;

        remote_call(
            self.data_service.add_reset_passcode(mobile_number, &passcode),
            "issue reset passcodes",
            "Failed to set passcode",
        )?;
        ResetPasscodes::new(self.shared_storage.clone())
            .set(mobile_number, &passcode)
            .context(LocalStorageFailedSnafu)?;

        info!("Issued reset passcode for {mobile_number}");
        Ok(passcode)
    }

    /// Sets a new password for the customer holding the passcode.
    ///
    /// The local directory is only changed once the data service applied the
    /// reset. Returns the page to continue on.
    pub fn reset_password(&self, form: &PasswordResetForm) -> Result<Route, PortalError> {
        validate_passcode(&form.passcode)?;
        validate_password_confirmation(&form.new_password, &form.confirm_password)?;
        let mobile_number = require(&form.mobile_number, "mobile number")?;

        let passcodes = ResetPasscodes::new(self.shared_storage.clone());
        if !passcodes.matches(mobile_number, &form.passcode) {
            return Err(denied("Invalid passcode"));
        }

        let directory = self.session_store.directory();
        if directory.find_by_mobile_number(mobile_number).is_none() {
            return Err(denied("Mobile number not found"));
        }

        remote_call(
            self.data_service
                .request_password_reset(mobile_number, &form.new_password),
            "reset your password",
            "Password reset failed",
        )?;
        let applied = remote_call(
            self.data_service.finalize_password_reset(mobile_number),
            "reset your password",
            "Password reset failed",
        )?;
        if !applied {
            return Err(denied("Password reset failed. Please try again."));
        }

        directory
            .update_password(mobile_number, &form.new_password)
            .context(LocalStorageFailedSnafu)?;
        passcodes
            .remove(mobile_number)
            .context(LocalStorageFailedSnafu)?;

        info!("Password reset for {mobile_number}");
        Ok(Route::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::testing::*;
    use crate::portal::{LoginForm, LoginRequest};
    use crate::remote::InMemoryDataService;
    use crate::validation::ValidationError;

    const MOBILE: &str = "9998887776";

    fn reset_form(passcode: &str, new_password: &str) -> PasswordResetForm {
        PasswordResetForm {
            mobile_number: MOBILE.to_string(),
            passcode: passcode.to_string(),
            new_password: new_password.to_string(),
            confirm_password: new_password.to_string(),
        }
    }

    #[test]
    fn full_reset_flow() {
        let shop = TestShop::new();
        shop.signed_in_customer("alice", MOBILE);
        let client = shop.client();
        let mut portal = shop.open(&client);

        portal.request_password_reset(MOBILE).unwrap();
        let passcode = shop
            .signed_in_owner()
            .issue_reset_passcode(&PasscodeRequest {
                mobile_number: MOBILE.to_string(),
                passcode: None,
            })
            .unwrap();

        assert_eq!(
            portal.reset_password(&reset_form(&passcode, "new-pw")).unwrap(),
            Route::Login
        );

        assert_eq!(
            shop.data_service.customer_password("alice").as_deref(),
            Some("new-pw")
        );
        assert!(portal
            .login(&LoginRequest::new("alice", "new-pw", LoginForm::Customer))
            .is_ok());
        assert_eq!(
            ResetPasscodes::new(shop.shared_storage.clone()).get(MOBILE),
            None
        );
    }

    #[test]
    fn owner_chosen_passcode_must_have_four_digits() {
        let shop = TestShop::new();
        let owner = shop.signed_in_owner();

        let err = owner
            .issue_reset_passcode(&PasscodeRequest {
                mobile_number: MOBILE.to_string(),
                passcode: Some("12a4".to_string()),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            PortalError::InvalidInputError {
                source: ValidationError::InvalidPasscodeError {}
            }
        ));
    }

    #[test]
    fn only_owner_issues_passcodes() {
        let shop = TestShop::new();
        let customer = shop.signed_in_customer("alice", MOBILE);

        let err = customer
            .issue_reset_passcode(&PasscodeRequest {
                mobile_number: MOBILE.to_string(),
                passcode: Some("1234".to_string()),
            })
            .unwrap_err();

        assert!(matches!(err, PortalError::RedirectedError { .. }));
        assert!(customer.password_reset_requests().is_err());
    }

    #[test]
    fn wrong_passcode_changes_nothing() {
        let shop = TestShop::new();
        shop.signed_in_customer("alice", MOBILE);
        shop.signed_in_owner()
            .issue_reset_passcode(&PasscodeRequest {
                mobile_number: MOBILE.to_string(),
                passcode: Some("1234".to_string()),
            })
            .unwrap();
        let mut portal = shop.open(&shop.client());

        let err = portal.reset_password(&reset_form("4321", "new-pw")).unwrap_err();

        assert_eq!(err.to_string(), "Invalid passcode");
        assert_eq!(
            shop.data_service.customer_password("alice").as_deref(),
            Some("pw")
        );
        assert!(portal
            .login(&LoginRequest::new("alice", "pw", LoginForm::Customer))
            .is_ok());
    }

    #[test]
    fn unknown_mobile_number_is_reported() {
        let shop = TestShop::new();
        shop.signed_in_owner()
            .issue_reset_passcode(&PasscodeRequest {
                mobile_number: MOBILE.to_string(),
                passcode: Some("1234".to_string()),
            })
            .unwrap();
        let portal = shop.open(&shop.client());

        let err = portal.reset_password(&reset_form("1234", "new-pw")).unwrap_err();

        assert_eq!(err.to_string(), "Mobile number not found");
    }

    #[test]
    fn mismatching_confirmation_is_rejected() {
        let shop = TestShop::new();
        let portal = shop.open(&shop.client());
        let mut form = reset_form("1234", "new-pw");
        form.confirm_password = "other".to_string();

        let err = portal.reset_password(&form).unwrap_err();

        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn remote_failure_keeps_local_password() {
        let shop = TestShop::new();
        shop.signed_in_customer("alice", MOBILE);
        shop.signed_in_owner()
            .issue_reset_passcode(&PasscodeRequest {
                mobile_number: MOBILE.to_string(),
                passcode: Some("1234".to_string()),
            })
            .unwrap();
        // Same local state, but a data service that refuses every call.
        let failing = TestShop {
            data_service: std::sync::Arc::new(InMemoryDataService::rejecting("Canister is stopped")),
            shared_storage: shop.shared_storage.clone(),
            settings: shop.settings.clone(),
        };
        let mut portal = failing.open(&failing.client());

        let err = portal.reset_password(&reset_form("1234", "new-pw")).unwrap_err();

        assert_eq!(err.to_string(), "Password reset failed: Canister is stopped");
        assert!(portal
            .login(&LoginRequest::new("alice", "pw", LoginForm::Customer))
            .is_ok());
        assert_eq!(
            ResetPasscodes::new(shop.shared_storage.clone()).get(MOBILE),
            Some("1234".to_string())
        );
    }
}
