use lessons_core::model::{LessonId, LessonProgress, Video, VideoId};
use services::{LessonSummary, TeacherDashboard};

use crate::vm::time_fmt::{count_label, format_date};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonCardVm {
    pub id: LessonId,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub videos_label: String,
    pub video_count: u32,
    pub is_published: bool,
    pub created_at_str: String,
}

impl From<&LessonSummary> for LessonCardVm {
    fn from(item: &LessonSummary) -> Self {
        let lesson = &item.lesson;
        Self {
            id: lesson.id(),
            title: lesson.title().to_owned(),
            description: lesson.description().map(str::to_owned),
            cover_image_url: lesson.cover_image_url().map(str::to_owned),
            videos_label: count_label(item.video_count, "video", "videos"),
            video_count: item.video_count,
            is_published: lesson.is_published(),
            created_at_str: format_date(lesson.created_at()),
        }
    }
}

#[must_use]
pub fn map_lesson_cards(items: &[LessonSummary]) -> Vec<LessonCardVm> {
    items.iter().map(LessonCardVm::from).collect()
}

/// Lessons plus the totals shown above a list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonListVm {
    pub cards: Vec<LessonCardVm>,
    pub total_lessons: usize,
    pub total_videos: u32,
}

#[must_use]
pub fn map_lesson_list(items: &[LessonSummary]) -> LessonListVm {
    LessonListVm {
        cards: map_lesson_cards(items),
        total_lessons: items.len(),
        total_videos: items.iter().map(|s| s.video_count).sum(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub cards: Vec<LessonCardVm>,
    pub total_lessons: usize,
    pub total_videos: u32,
    pub student_count: u32,
}

impl From<&TeacherDashboard> for DashboardVm {
    fn from(dashboard: &TeacherDashboard) -> Self {
        Self {
            cards: map_lesson_cards(&dashboard.lessons),
            total_lessons: dashboard.total_lessons(),
            total_videos: dashboard.total_videos,
            student_count: dashboard.student_count,
        }
    }
}

/// Per-video marker on the lesson screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressBadge {
    NotStarted,
    Watched,
    Completed,
}

impl ProgressBadge {
    #[must_use]
    pub fn from_progress(progress: &LessonProgress, video_id: VideoId) -> Self {
        match progress.get(video_id) {
            Some(row) if row.completed() => ProgressBadge::Completed,
            Some(_) => ProgressBadge::Watched,
            None => ProgressBadge::NotStarted,
        }
    }

    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            ProgressBadge::NotStarted => None,
            ProgressBadge::Watched => Some("Watched"),
            ProgressBadge::Completed => Some("Completed"),
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            ProgressBadge::NotStarted => "badge",
            ProgressBadge::Watched => "badge badge-watched",
            ProgressBadge::Completed => "badge badge-completed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRowVm {
    pub id: VideoId,
    pub position: usize,
    pub title: String,
    pub description: Option<String>,
    pub duration_str: String,
    pub thumbnail_url: Option<String>,
    pub badge: ProgressBadge,
}

/// Videos in lesson order, numbered from 1.
#[must_use]
pub fn map_video_rows(videos: &[Video], progress: &LessonProgress) -> Vec<VideoRowVm> {
    videos
        .iter()
        .enumerate()
        .map(|(i, video)| VideoRowVm {
            id: video.id(),
            position: i + 1,
            title: video.title().to_owned(),
            description: video.description().map(str::to_owned),
            duration_str: video.formatted_duration(),
            thumbnail_url: video.thumbnail_url().map(str::to_owned),
            badge: ProgressBadge::from_progress(progress, video.id()),
        })
        .collect()
}
