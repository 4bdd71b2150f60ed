mod login;
mod register;

pub use login::LoginView;
pub use register::RegisterView;
#[cfg(test)]
pub(crate) use register::RegisteredPanel;

use services::AuthError;

use crate::views::ViewError;
use crate::views::state::sentence;

/// Text shown under an auth form after a failed submit.
fn form_error(err: &AuthError) -> String {
    match err {
        AuthError::Validation(_) | AuthError::InvalidCredentials | AuthError::EmailTaken => {
            sentence(&err.to_string())
        }
        _ => ViewError::Offline.message().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessons_core::model::AccountError;

    #[test]
    fn validation_messages_read_as_sentences() {
        let err = AuthError::Validation(AccountError::PasswordTooShort { min: 6 });
        assert_eq!(form_error(&err), "Password must be at least 6 characters.");
        assert_eq!(
            form_error(&AuthError::InvalidCredentials),
            "Email or password is incorrect."
        );
    }

    #[test]
    fn transport_problems_use_generic_text() {
        assert_eq!(
            form_error(&AuthError::NotSignedIn),
            "Could not reach the server. Please try again."
        );
    }
}
