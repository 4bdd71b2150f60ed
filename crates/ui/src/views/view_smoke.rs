use std::sync::Arc;

use lessons_core::model::{
    Lesson, LessonDraft, LessonId, Profile, Role, UserId, Video, VideoDraft,
};
use storage::repository::{
    InMemoryRepository, LessonOrder, LessonRepository, Storage, StorageError,
    WatchProgressRepository,
};

use super::test_harness::{TestServices, ViewKind};

fn lesson_draft(title: &str, published: bool) -> LessonDraft {
    LessonDraft {
        title: title.to_owned(),
        description: format!("About {title}"),
        is_published: published,
        ..LessonDraft::default()
    }
}

fn video_draft(title: &str, url: &str, duration_seconds: u32) -> VideoDraft {
    VideoDraft {
        title: title.to_owned(),
        video_url: url.to_owned(),
        duration_seconds,
        ..VideoDraft::default()
    }
}

async fn add_lesson(services: &TestServices, teacher: &Profile, title: &str) -> Lesson {
    services
        .services
        .lessons()
        .create_lesson(teacher, &lesson_draft(title, true))
        .await
        .expect("create lesson")
}

async fn add_video(
    services: &TestServices,
    teacher: &Profile,
    lesson: &Lesson,
    title: &str,
    duration_seconds: u32,
) -> Video {
    services
        .services
        .videos()
        .add_video(
            teacher,
            lesson.id(),
            &video_draft(title, "https://youtu.be/abc123", duration_seconds),
        )
        .await
        .expect("add video")
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_greets_and_lists_five_newest_lessons() {
    let services = TestServices::new();
    let teacher = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    for n in 1..=6 {
        let lesson = add_lesson(&services, &teacher, &format!("Lesson {n}")).await;
        add_video(&services, &teacher, &lesson, "Intro", 120).await;
    }

    let mut harness = services.mount(ViewKind::Home);
    let html = harness.render_settled().await;

    // The fixed test clock sits at 22:13 UTC.
    assert!(html.contains("Good evening"), "missing greeting in {html}");
    assert!(html.contains("Tess Teacher"), "missing name in {html}");
    assert!(html.contains("1 video"), "missing video count in {html}");
    assert_eq!(html.matches("lesson-card").count(), 5, "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn catalog_hides_unpublished_lessons() {
    let services = TestServices::new();
    let teacher = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    add_lesson(&services, &teacher, "Fractions").await;
    services
        .services
        .lessons()
        .create_lesson(&teacher, &lesson_draft("Secret draft", false))
        .await
        .expect("create draft");

    let mut harness = services.mount(ViewKind::Lessons);
    let html = harness.render_settled().await;
    assert!(html.contains("Fractions"), "missing lesson in {html}");
    assert!(!html.contains("Secret draft"), "draft leaked into {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn student_sees_teachers_only_notice_on_dashboard() {
    let services = TestServices::new();
    services.sign_in_as(Role::Student, "Sam Student").await;

    let mut harness = services.mount(ViewKind::TeacherDashboard);
    let html = harness.render_settled().await;
    assert!(
        html.contains("This section is for teachers only."),
        "missing notice in {html}"
    );
    assert!(!html.contains("New lesson"), "student got teacher action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn teacher_sees_students_only_notice_on_my_lessons() {
    let services = TestServices::new();
    services.sign_in_as(Role::Teacher, "Tess Teacher").await;

    let mut harness = services.mount(ViewKind::MyLessons);
    let html = harness.render_settled().await;
    assert!(
        html.contains("This section is for students only."),
        "missing notice in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_lists_own_lessons_with_totals() {
    let services = TestServices::new();
    services.sign_in_as(Role::Student, "Sam Student").await;
    let teacher = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    let lesson = add_lesson(&services, &teacher, "Optics").await;
    add_video(&services, &teacher, &lesson, "Lenses", 300).await;
    add_video(&services, &teacher, &lesson, "Mirrors", 200).await;

    let mut harness = services.mount(ViewKind::TeacherDashboard);
    let html = harness.render_settled().await;
    assert!(html.contains("Optics"), "missing lesson in {html}");
    assert!(html.contains("2 videos"), "missing video count in {html}");
    assert!(html.contains("Students"), "missing student stat in {html}");
    assert!(html.contains("New lesson"), "missing create link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_detail_marks_watched_and_completed_videos() {
    let services = TestServices::new();
    let teacher = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    let lesson = add_lesson(&services, &teacher, "Waves").await;
    let first = add_video(&services, &teacher, &lesson, "Sound", 600).await;
    let second = add_video(&services, &teacher, &lesson, "Light", 600).await;
    add_video(&services, &teacher, &lesson, "Radio", 90).await;

    let student = services.sign_in_as(Role::Student, "Sam Student").await;
    let progress = services.services.progress();
    progress
        .record_progress(student.id(), first.id(), 540.0, 600)
        .await
        .expect("progress");
    progress
        .record_progress(student.id(), second.id(), 539.0, 600)
        .await
        .expect("progress");

    let mut harness = services.mount(ViewKind::LessonDetail(lesson.id()));
    let html = harness.render_settled().await;
    assert!(html.contains("Waves"), "missing title in {html}");
    assert_eq!(html.matches("badge-completed").count(), 1, "{html}");
    assert_eq!(html.matches("badge-watched").count(), 1, "{html}");
    assert!(html.contains("1:30"), "missing duration in {html}");
    assert!(html.contains("Started"), "missing started stat in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn player_embeds_youtube_and_marks_video_started() {
    let services = TestServices::new();
    let teacher = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    let lesson = add_lesson(&services, &teacher, "Waves").await;
    let video = add_video(&services, &teacher, &lesson, "Sound", 600).await;
    let student = services.sign_in_as(Role::Student, "Sam Student").await;

    let mut harness = services.mount(ViewKind::VideoPlayer(video.id()));
    let html = harness.render_settled().await;
    assert!(
        html.contains("youtube.com/embed/abc123"),
        "missing embed url in {html}"
    );
    assert!(html.contains("10:00"), "missing duration in {html}");

    let stored = harness
        .storage
        .progress
        .get_progress(student.id(), video.id())
        .await
        .expect("load progress")
        .expect("progress row");
    assert_eq!(stored.last_position_seconds(), 0);
    assert!(!stored.completed());
}

#[tokio::test(flavor = "current_thread")]
async fn player_refuses_videos_of_unpublished_lessons_to_students() {
    let services = TestServices::new();
    let teacher = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    let draft = services
        .services
        .lessons()
        .create_lesson(&teacher, &lesson_draft("Work in progress", false))
        .await
        .expect("create draft");
    let video = add_video(&services, &teacher, &draft, "Rough cut", 120).await;
    let student = services.sign_in_as(Role::Student, "Sam Student").await;

    let mut harness = services.mount(ViewKind::VideoPlayer(video.id()));
    let html = harness.render_settled().await;
    assert!(!html.contains("youtube.com/embed"), "draft video shown in {html}");
    assert!(!html.contains("Rough cut"), "draft title shown in {html}");

    let stored = harness
        .storage
        .progress
        .get_progress(student.id(), video.id())
        .await
        .expect("load progress");
    assert!(stored.is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_shows_role_and_grade() {
    let services = TestServices::new();
    services.sign_in_as(Role::Student, "Sam Student").await;

    let mut harness = services.mount(ViewKind::Profile);
    let html = harness.render_settled().await;
    assert!(html.contains("Sam Student"), "missing name in {html}");
    assert!(html.contains("Student"), "missing role in {html}");
    assert!(html.contains("Grade 9"), "missing grade in {html}");
    assert!(html.contains("Sign out"), "missing sign out in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn edit_screen_refuses_another_teachers_lesson() {
    let services = TestServices::new();
    let owner = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    let lesson = add_lesson(&services, &owner, "Optics").await;
    services.sign_in_as(Role::Teacher, "Olga Other").await;

    let mut harness = services.mount(ViewKind::EditLesson(lesson.id()));
    let html = harness.render_settled().await;
    assert!(
        html.contains("You can only change your own lessons."),
        "missing ownership notice in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn edit_screen_asks_before_deleting_a_video() {
    let services = TestServices::new();
    let teacher = services.sign_in_as(Role::Teacher, "Tess Teacher").await;
    let lesson = add_lesson(&services, &teacher, "Optics").await;
    add_video(&services, &teacher, &lesson, "Lenses", 300).await;
    add_video(&services, &teacher, &lesson, "Mirrors", 200).await;

    let mut harness = services.mount(ViewKind::EditLesson(lesson.id()));
    let html = harness.render_settled().await;
    assert!(html.contains("Lenses"), "missing video in {html}");
    assert_eq!(html.matches(">Delete<").count(), 2, "{html}");
    assert!(!html.contains("Delete &quot;"), "confirmation shown up front in {html}");
    assert!(!html.contains("Cancel"), "confirmation shown up front in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn add_lesson_form_renders_for_teachers() {
    let services = TestServices::new();
    services.sign_in_as(Role::Teacher, "Tess Teacher").await;

    let mut harness = services.mount(ViewKind::AddLesson);
    let html = harness.render_settled().await;
    assert!(html.contains("Create lesson"), "missing submit in {html}");
    assert!(html.contains("Published"), "missing toggle in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn register_form_starts_as_student_with_grade() {
    let services = TestServices::new();

    let mut harness = services.mount(ViewKind::Register);
    let html = harness.render_settled().await;
    assert!(html.contains("Create account"), "missing form in {html}");
    assert!(html.contains("Grade"), "missing grade field in {html}");
    assert!(!html.contains("Registered successfully"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn successful_registration_confirms_before_sign_in() {
    let services = TestServices::new();

    let mut harness = services.mount(ViewKind::Registered);
    let html = harness.render_settled().await;
    assert!(
        html.contains("Registered successfully. You can now sign in."),
        "missing confirmation in {html}"
    );
    assert!(html.contains("Continue to sign in"), "missing next step in {html}");
}

struct OfflineLessons;

#[async_trait::async_trait]
impl LessonRepository for OfflineLessons {
    async fn insert_lesson(&self, _lesson: &Lesson) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn update_lesson(&self, _lesson: &Lesson) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn get_lesson(&self, _id: LessonId) -> Result<Option<Lesson>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn list_published_lessons(
        &self,
        _order: LessonOrder,
        _limit: Option<u32>,
    ) -> Result<Vec<Lesson>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn list_lessons_by_teacher(
        &self,
        _teacher_id: UserId,
    ) -> Result<Vec<Lesson>, StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }

    async fn delete_lesson(&self, _id: LessonId) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_renders_error_state_when_backend_is_down() {
    let mut storage = Storage::from_backend(InMemoryRepository::new());
    storage.lessons = Arc::new(OfflineLessons);
    let services = TestServices::with_storage(storage);
    services.sign_in_as(Role::Student, "Sam Student").await;

    let mut harness = services.mount(ViewKind::Home);
    let html = harness.render_settled().await;
    assert!(
        html.contains("Could not reach the server"),
        "missing error in {html}"
    );
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn missing_lesson_renders_nothing_but_navigation() {
    let services = TestServices::new();
    services.sign_in_as(Role::Student, "Sam Student").await;

    let mut harness = services.mount(ViewKind::LessonDetail(LessonId::generate()));
    let html = harness.render_settled().await;
    assert!(!html.contains("Something went wrong"), "unexpected error in {html}");
    assert!(!html.contains("Loading..."), "still loading in {html}");
}
