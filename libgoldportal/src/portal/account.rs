use crate::auth::session::Role;
use crate::portal::{remote_call, Portal, PortalError};
use crate::routing::Route;
use crate::validation::{require, validate_mobile_number, validate_password_confirmation};
use log::info;
use serde::Deserialize;

/// Which of the two login forms was submitted.
#[derive(Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoginForm {
    #[default]
    Customer,
    Owner,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub form: LoginForm,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str, form: LoginForm) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            form,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub mobile_number: String,
    #[serde(default)]
    pub email: String,
}

impl Portal {
    /// Signs the client in and returns the page to continue on.
    pub fn login(&mut self, request: &LoginRequest) -> Result<Route, PortalError> {
        if !self
            .session_store
            .login(request.username.trim(), &request.password)
        {
            let message = match request.form {
                LoginForm::Owner => "Invalid owner credentials",
                LoginForm::Customer => "Invalid username or password",
            };

            return Err(PortalError::DeniedError {
                message: message.to_string(),
            });
        }

        match self.session().role() {
            Some(Role::Owner) => Ok(Route::OwnerDashboard),
            _ => Ok(Route::Welcome),
        }
    }

    pub fn logout(&mut self) {
        self.session_store.logout();
    }

    /// Registers the customer with the data service and, once that succeeded,
    /// in the local customer directory.
    ///
    /// Returns the page to continue on.
    pub fn register(&self, request: &RegistrationRequest) -> Result<Route, PortalError> {
        let username = require(&request.username, "username")?;
        require(&request.password, "password")?;
        validate_password_confirmation(&request.password, &request.confirm_password)?;
        validate_mobile_number(&request.mobile_number)?;

        remote_call(
            self.data_service.add_customer(
                username,
                &request.password,
                &request.mobile_number,
                &request.email,
            ),
            "register",
            "Registration failed",
        )?;

        if !self
            .session_store
            .register_customer(username, &request.password, &request.mobile_number)
        {
            return Err(PortalError::DeniedError {
                message: "Username already exists locally".to_string(),
            });
        }

        info!("Customer {username} registered");
        Ok(Route::Login)
    }

    /// Marks the secondary verification of the signed in client as done.
    pub fn complete_handshake(&mut self) -> Result<(), PortalError> {
        if !self.session().is_authenticated() {
            return Err(PortalError::DeniedError {
                message: "Sign in before completing verification".to_string(),
            });
        }

        self.session_store.set_handshake_complete(true);
        Ok(())
    }
}
