mod account;
mod ids;
mod lesson;
mod profile;
mod progress;
mod text;
mod video;

pub use ids::{LessonId, ParseIdError, ProgressId, UserId, VideoId};

pub use account::{
    AccountError, Credentials, MIN_PASSWORD_LEN, NewAccount, SignInForm, SignUpForm,
};
pub use lesson::{Lesson, LessonDraft, LessonError};
pub use profile::{ParseRoleError, Profile, ProfileError, Role};
pub use progress::{
    LessonProgress, PlaybackPosition, ProgressError, WatchProgress, is_completed,
};
pub use text::optional_text;
pub use video::{Video, VideoDraft, VideoError, embed_url, format_duration, parse_duration_input};
