use std::fmt;

use thiserror::Error;

use crate::model::profile::Role;
use crate::model::text::{optional_text, required_text};

/// Minimum accepted password length at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("please fill in all required fields")]
    MissingFields,

    #[error("password and confirmation do not match")]
    PasswordMismatch,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("please choose a grade")]
    MissingGrade,

    #[error("please enter your email and password")]
    MissingCredentials,
}

/// Raw sign-up form input.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
    pub grade: String,
}

/// Sign-up input that passed client-side validation.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub grade: Option<String>,
}

impl SignUpForm {
    /// Checks the form before anything is sent to the identity provider.
    ///
    /// A missing role defaults to `Role::Student`.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule, in the order the form presents them.
    pub fn validate(&self) -> Result<NewAccount, AccountError> {
        let full_name = required_text(&self.full_name);
        let email = required_text(&self.email);
        if full_name.is_none()
            || email.is_none()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AccountError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        let role = self.role.unwrap_or(Role::Student);
        let grade = match role {
            Role::Student => Some(optional_text(&self.grade).ok_or(AccountError::MissingGrade)?),
            Role::Teacher => None,
        };

        Ok(NewAccount {
            full_name: full_name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: self.password.clone(),
            role,
            grade,
        })
    }
}

/// Raw sign-in form input.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Email/password pair handed to the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// # Errors
    ///
    /// Returns `AccountError::MissingCredentials` if either field is blank.
    pub fn validate(&self) -> Result<Credentials, AccountError> {
        let email = required_text(&self.email).ok_or(AccountError::MissingCredentials)?;
        if self.password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }
        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

// Passwords never end up in logs.

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("grade", &self.grade)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("grade", &self.grade)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
