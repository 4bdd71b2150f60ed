use dioxus::prelude::*;
use dioxus_router::use_navigator;
use services::{AuthError, ContentServiceError, ProgressServiceError};
use storage::StorageError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    Offline,
    NotSignedIn,
    TeachersOnly,
    StudentsOnly,
    NotOwner,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unknown => "Something went wrong. Please try again.",
            ViewError::Offline => "Could not reach the server. Please try again.",
            ViewError::NotSignedIn => "Please sign in to continue.",
            ViewError::TeachersOnly => "This section is for teachers only.",
            ViewError::StudentsOnly => "This section is for students only.",
            ViewError::NotOwner => "You can only change your own lessons.",
        }
    }

    fn from_storage(err: &StorageError) -> Self {
        match err {
            StorageError::Connection(_) => ViewError::Offline,
            StorageError::Unauthorized => ViewError::NotSignedIn,
            _ => ViewError::Unknown,
        }
    }
}

impl From<ContentServiceError> for ViewError {
    fn from(err: ContentServiceError) -> Self {
        match err {
            ContentServiceError::TeachersOnly => ViewError::TeachersOnly,
            ContentServiceError::NotOwner => ViewError::NotOwner,
            ContentServiceError::Storage(e) => ViewError::from_storage(&e),
            _ => ViewError::Unknown,
        }
    }
}

impl From<ProgressServiceError> for ViewError {
    fn from(err: ProgressServiceError) -> Self {
        match err {
            ProgressServiceError::Storage(e) => ViewError::from_storage(&e),
            _ => ViewError::Unknown,
        }
    }
}

impl From<AuthError> for ViewError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotSignedIn => ViewError::NotSignedIn,
            AuthError::Storage(e) => ViewError::from_storage(&e),
            AuthError::Http(_) => ViewError::Offline,
            _ => ViewError::Unknown,
        }
    }
}

/// Capitalises an error's display text and ends it with a period.
pub(crate) fn sentence(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Rendered in place of a record that no longer exists: quietly returns to
/// the previous screen.
#[component]
pub fn GoBack() -> Element {
    let navigator = use_navigator();
    use_effect(move || navigator.go_back());
    rsx! {}
}
