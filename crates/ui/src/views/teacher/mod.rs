mod add_lesson;
mod add_video;
mod dashboard;
mod edit_lesson;
mod lesson_form;

pub use add_lesson::AddLessonView;
pub use add_video::AddVideoView;
pub use dashboard::TeacherDashboardView;
pub use edit_lesson::EditLessonView;

use services::ContentServiceError;

use crate::views::ViewError;
use crate::views::state::sentence;

/// Text shown under a teacher form after a failed save.
fn save_error(err: ContentServiceError) -> String {
    match err {
        ContentServiceError::Lesson(e) => sentence(&e.to_string()),
        ContentServiceError::Video(e) => sentence(&e.to_string()),
        other => ViewError::from(other).message().to_owned(),
    }
}
