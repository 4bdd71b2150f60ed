use chrono::Duration;
use lessons_core::model::{
    Lesson, LessonDraft, LessonId, PlaybackPosition, Profile, ProgressId, Role, UserId, Video,
    VideoDraft, VideoId, WatchProgress,
};
use lessons_core::time::fixed_now;
use storage::repository::{
    CredentialRecord, CredentialRepository, LessonOrder, LessonRepository, ProfileRepository,
    StorageError, VideoRepository, WatchProgressRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn teacher(repo: &SqliteRepository) -> Profile {
    let profile = Profile::new(
        UserId::generate(),
        format!("{}@school.example", UserId::generate()),
        "Ms Teacher",
        Role::Teacher,
        None,
        fixed_now(),
    )
    .unwrap();
    repo.insert_profile(&profile).await.unwrap();
    profile
}

fn lesson_draft(title: &str, published: bool) -> LessonDraft {
    LessonDraft {
        title: title.into(),
        is_published: published,
        ..LessonDraft::default()
    }
}

fn video(lesson: LessonId, index: i32, duration: u32) -> Video {
    let draft = VideoDraft {
        title: format!("Part {index}"),
        video_url: "https://www.youtube.com/watch?v=abc".into(),
        duration_seconds: duration,
        ..VideoDraft::default()
    };
    Video::new(VideoId::generate(), lesson, &draft, index, fixed_now()).unwrap()
}

#[tokio::test]
async fn sqlite_progress_upsert_is_idempotent() {
    let repo = connect("memdb_progress_upsert").await;
    let owner = teacher(&repo).await;
    let lesson =
        Lesson::new(LessonId::generate(), owner.id(), &lesson_draft("L", true), fixed_now())
            .unwrap();
    repo.insert_lesson(&lesson).await.unwrap();
    let clip = video(lesson.id(), 0, 600);
    repo.insert_video(&clip).await.unwrap();

    let sample = |pos: f64, minutes: i64| {
        WatchProgress::record(
            ProgressId::generate(),
            owner.id(),
            clip.id(),
            PlaybackPosition::new(pos, clip.duration_seconds()).unwrap(),
            fixed_now() + Duration::minutes(minutes),
        )
    };

    let first = repo.upsert_progress(&sample(539.0, 0)).await.unwrap();
    assert!(!first.completed());
    let again = repo.upsert_progress(&sample(539.0, 0)).await.unwrap();
    assert_eq!(first, again);

    let done = repo.upsert_progress(&sample(540.0, 5)).await.unwrap();
    assert_eq!(done.id(), first.id());
    assert_eq!(done.created_at(), first.created_at());
    assert!(done.completed());
    assert_eq!(done.watched_at(), fixed_now() + Duration::minutes(5));

    let rows = repo
        .list_progress_for_videos(owner.id(), &[clip.id(), VideoId::generate()])
        .await
        .unwrap();
    assert_eq!(rows, vec![done]);
}

#[tokio::test]
async fn sqlite_video_delete_leaves_siblings_and_order() {
    let repo = connect("memdb_video_delete").await;
    let owner = teacher(&repo).await;
    let lesson =
        Lesson::new(LessonId::generate(), owner.id(), &lesson_draft("L", true), fixed_now())
            .unwrap();
    repo.insert_lesson(&lesson).await.unwrap();

    let clips: Vec<Video> = (0..3).map(|i| video(lesson.id(), i, 60)).collect();
    for clip in &clips {
        repo.insert_video(clip).await.unwrap();
    }
    assert!(matches!(
        repo.insert_video(&video(lesson.id(), 1, 60)).await,
        Err(StorageError::Conflict)
    ));

    repo.delete_video(clips[1].id()).await.unwrap();

    let left = repo.list_videos_for_lesson(lesson.id()).await.unwrap();
    assert_eq!(left, vec![clips[0].clone(), clips[2].clone()]);
    assert_eq!(repo.count_videos_for_lesson(lesson.id()).await.unwrap(), 2);
    assert_eq!(repo.next_video_order_index(lesson.id()).await.unwrap(), 3);
    assert!(matches!(
        repo.delete_video(clips[1].id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_lesson_listing_orders_and_cascades() {
    let repo = connect("memdb_lesson_listing").await;
    let owner = teacher(&repo).await;

    let mut lessons = Vec::new();
    for (minutes_ago, title, published) in [(30, "Oldest", true), (10, "Newer", true), (0, "Hidden", false)]
    {
        let lesson = Lesson::new(
            LessonId::generate(),
            owner.id(),
            &lesson_draft(title, published),
            fixed_now() - Duration::minutes(minutes_ago),
        )
        .unwrap();
        repo.insert_lesson(&lesson).await.unwrap();
        lessons.push(lesson);
    }

    let newest = repo
        .list_published_lessons(LessonOrder::Newest, None)
        .await
        .unwrap();
    let titles: Vec<&str> = newest.iter().map(Lesson::title).collect();
    assert_eq!(titles, ["Newer", "Oldest"]);

    let limited = repo
        .list_published_lessons(LessonOrder::Curriculum, Some(1))
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].title(), "Newer");

    let own = repo.list_lessons_by_teacher(owner.id()).await.unwrap();
    assert_eq!(own.len(), 3);
    assert_eq!(own[0].title(), "Hidden");

    let target = &lessons[0];
    let clip = video(target.id(), 0, 100);
    repo.insert_video(&clip).await.unwrap();
    repo.delete_lesson(target.id()).await.unwrap();
    assert!(repo.get_lesson(target.id()).await.unwrap().is_none());
    assert!(repo.get_video(clip.id()).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_lesson(target.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_lesson_update_and_profile_counts() {
    let repo = connect("memdb_lesson_update").await;
    let owner = teacher(&repo).await;
    let student = Profile::new(
        UserId::generate(),
        "kid@school.example",
        "Kid",
        Role::Student,
        Some("Grade 7"),
        fixed_now(),
    )
    .unwrap();
    repo.insert_profile(&student).await.unwrap();
    assert_eq!(repo.count_profiles_by_role(Role::Student).await.unwrap(), 1);
    assert_eq!(
        repo.get_profile(student.id()).await.unwrap().as_ref(),
        Some(&student)
    );

    let mut lesson =
        Lesson::new(LessonId::generate(), owner.id(), &lesson_draft("Draft", false), fixed_now())
            .unwrap();
    repo.insert_lesson(&lesson).await.unwrap();
    lesson
        .apply_draft(&lesson_draft("Final", true), fixed_now() + Duration::hours(1))
        .unwrap();
    repo.update_lesson(&lesson).await.unwrap();

    let stored = repo.get_lesson(lesson.id()).await.unwrap().unwrap();
    assert_eq!(stored.title(), "Final");
    assert!(stored.is_published());

    let stranger =
        Lesson::new(LessonId::generate(), owner.id(), &lesson_draft("Nope", true), fixed_now())
            .unwrap();
    assert!(matches!(
        repo.update_lesson(&stranger).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_credentials_are_unique_by_email() {
    let repo = connect("memdb_credentials").await;
    let record = CredentialRecord {
        user_id: UserId::generate(),
        email: "Someone@Example.com".into(),
        password_hash: "$argon2id$stub".into(),
        created_at: fixed_now(),
    };
    repo.insert_credential(&record).await.unwrap();

    let found = repo
        .find_credential("someone@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user_id, record.user_id);
    assert_eq!(found.email, "someone@example.com");

    let duplicate = CredentialRecord {
        user_id: UserId::generate(),
        ..record
    };
    assert!(matches!(
        repo.insert_credential(&duplicate).await,
        Err(StorageError::Conflict)
    ));
}
