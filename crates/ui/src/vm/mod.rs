mod lesson_vm;
mod profile_vm;
mod time_fmt;

pub use lesson_vm::{
    DashboardVm, LessonCardVm, LessonListVm, ProgressBadge, VideoRowVm, map_lesson_cards,
    map_lesson_list, map_video_rows,
};
pub use profile_vm::{ProfileVm, greeting_for_hour};
pub use time_fmt::{count_label, format_date};
