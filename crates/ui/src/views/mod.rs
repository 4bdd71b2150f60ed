mod auth;
mod home;
mod launch;
mod lesson_detail;
mod lessons;
mod my_lessons;
mod profile;
mod state;
mod teacher;
mod video_player;

pub use auth::{LoginView, RegisterView};
pub use home::HomeView;
pub use launch::LaunchView;
pub use lesson_detail::LessonDetailView;
pub use lessons::LessonsView;
pub use my_lessons::MyLessonsView;
pub use profile::ProfileView;
pub use state::{GoBack, ViewError, ViewState, view_state_from_resource};
pub use teacher::{AddLessonView, AddVideoView, EditLessonView, TeacherDashboardView};
pub use video_player::VideoPlayerView;

#[cfg(test)]
mod test_harness;

#[cfg(test)]
mod view_smoke;
