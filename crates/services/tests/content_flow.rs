use std::sync::Arc;

use lessons_core::model::{LessonDraft, Role, SignInForm, SignUpForm, VideoDraft};
use lessons_core::time::fixed_now;
use services::{AppServices, Clock, ContentServiceError, InMemorySessionStore};
use storage::repository::StorageError;

fn sign_up(name: &str, email: &str, role: Role, grade: &str) -> SignUpForm {
    SignUpForm {
        full_name: name.into(),
        email: email.into(),
        password: "classroom".into(),
        confirm_password: "classroom".into(),
        role: Some(role),
        grade: grade.into(),
    }
}

fn sign_in(email: &str) -> SignInForm {
    SignInForm {
        email: email.into(),
        password: "classroom".into(),
    }
}

fn video(title: &str, seconds: u32) -> VideoDraft {
    VideoDraft {
        title: title.into(),
        video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
        duration_seconds: seconds,
        ..VideoDraft::default()
    }
}

#[tokio::test]
async fn teacher_publishes_and_student_completes_a_video() {
    let app = AppServices::new_sqlite(
        "sqlite:file:memdb_content_flow?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
        Arc::new(InMemorySessionStore::new()),
    )
    .await
    .expect("connect sqlite");

    let session = app.session();
    let teacher = session
        .sign_up(&sign_up("Ms Rivera", "rivera@school.example", Role::Teacher, ""))
        .await
        .expect("teacher sign up");
    let student = session
        .sign_up(&sign_up("Kim", "kim@school.example", Role::Student, "Grade 9"))
        .await
        .expect("student sign up");

    let lessons = app.lessons();
    let videos = app.videos();

    let lesson = lessons
        .create_lesson(
            &teacher,
            &LessonDraft {
                title: "  Fractions  ".into(),
                description: "Halves and quarters".into(),
                ..LessonDraft::default()
            },
        )
        .await
        .expect("create lesson");
    assert_eq!(lesson.title(), "Fractions");

    let intro = videos
        .add_video(&teacher, lesson.id(), &video("Intro", 600))
        .await
        .expect("add intro");
    let practice = videos
        .add_video(&teacher, lesson.id(), &video("Practice", 300))
        .await
        .expect("add practice");
    assert_eq!((intro.order_index(), practice.order_index()), (0, 1));

    assert!(matches!(
        lessons.create_lesson(&student, &LessonDraft::default()).await,
        Err(ContentServiceError::TeachersOnly)
    ));

    let recent = lessons.recent_lessons(5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].video_count, 2);

    session.sign_in(&sign_in("kim@school.example")).await.unwrap();
    let viewer = session.current_user();
    assert_eq!(viewer, Some(student.id()));

    let tracker = app.progress();
    tracker.mark_opened(student.id(), &intro).await.unwrap();
    tracker
        .record_progress(student.id(), intro.id(), 540.0, intro.duration_seconds())
        .await
        .unwrap();
    tracker
        .record_progress(student.id(), practice.id(), 100.0, practice.duration_seconds())
        .await
        .unwrap();

    let detail = lessons
        .lesson_detail(lesson.id(), viewer)
        .await
        .unwrap()
        .expect("lesson exists");
    assert_eq!(detail.videos.len(), 2);
    assert!(detail.progress.is_completed(intro.id()));
    assert!(!detail.progress.is_completed(practice.id()));
    assert_eq!(detail.progress.completed_count(), 1);

    let dashboard = lessons.teacher_dashboard(&teacher).await.unwrap();
    assert_eq!(dashboard.total_lessons(), 1);
    assert_eq!(dashboard.total_videos, 2);
    assert_eq!(dashboard.student_count, 1);

    videos.delete_video(&teacher, practice.id()).await.unwrap();
    let remaining = lessons
        .lesson_detail(lesson.id(), viewer)
        .await
        .unwrap()
        .expect("lesson exists")
        .videos;
    assert_eq!(remaining, vec![intro.clone()]);

    lessons.delete_lesson(&teacher, lesson.id()).await.unwrap();
    assert!(lessons.lesson_detail(lesson.id(), None).await.unwrap().is_none());
    assert!(videos.playable_video(intro.id(), None).await.unwrap().is_none());
    assert!(matches!(
        lessons.delete_lesson(&teacher, lesson.id()).await,
        Err(ContentServiceError::Storage(StorageError::NotFound))
    ));

    session.sign_out().await.unwrap();
    assert!(session.current_profile().is_none());
}
