use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use lessons_core::model::{LessonDraft, Role, SignInForm, SignUpForm, VideoDraft};
use services::{
    AppServices, AuthError, Clock, FileSessionStore, InMemorySessionStore, LessonService,
    ProgressTracker, SessionContext, SessionStore, VideoService,
};
use storage::rest::RestConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// `SQLite` file with local accounts.
    Local,
    /// Hosted REST backend and its auth service.
    Remote,
}

#[derive(Parser)]
#[command(name = "lessons", about = "Lessons desktop client", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Where lessons and accounts live
    #[arg(long, env = "LESSONS_BACKEND", value_enum, default_value_t = Backend::Local, global = true)]
    backend: Backend,

    /// SQLite database (local backend)
    #[arg(long = "db", env = "LESSONS_DB_URL", default_value = "sqlite://lessons.sqlite3", global = true)]
    db_url: String,

    /// Hosted project URL (remote backend)
    #[arg(long, env = "LESSONS_API_URL", global = true)]
    api_url: Option<String>,

    /// Hosted project anon key (remote backend)
    #[arg(long, env = "LESSONS_API_KEY", global = true)]
    api_key: Option<String>,

    /// File the signed-in session is kept in between launches
    #[arg(long, env = "LESSONS_SESSION_FILE", default_value = "session.json", global = true)]
    session_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Launch the desktop app (default)
    Ui,
    /// Fill a local database with demo accounts and lessons
    Seed,
}

struct DesktopApp {
    clock: Clock,
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn clock(&self) -> Clock {
        self.clock
    }

    fn session(&self) -> SessionContext {
        self.services.session()
    }

    fn lessons(&self) -> Arc<LessonService> {
        self.services.lessons()
    }

    fn videos(&self) -> Arc<VideoService> {
        self.services.videos()
    }

    fn progress(&self) -> Arc<ProgressTracker> {
        self.services.progress()
    }
}

#[derive(Debug, thiserror::Error)]
enum ArgsError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("seed only supports the local backend")]
    SeedNeedsLocal,
}

fn init_log() {
    let filter = EnvFilter::try_from_env("LESSONS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn normalize_sqlite_url(raw: &str) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw.to_owned();
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

// Open + migrate SQLite at startup. Kept in the binary glue so core/services stay pure.
async fn open_local(
    cli: &Cli,
    clock: Clock,
    sessions: Arc<dyn SessionStore>,
) -> Result<AppServices, Box<dyn std::error::Error>> {
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(&db_url, clock, sessions).await?;
    info!(db = %db_url, "local storage ready");
    Ok(services)
}

fn open_remote(clock: Clock, cli: &Cli) -> Result<AppServices, Box<dyn std::error::Error>> {
    let config = RestConfig::new(
        cli.api_url.as_deref().unwrap_or_default(),
        cli.api_key.as_deref().unwrap_or_default(),
    )?;
    let store = Arc::new(FileSessionStore::new(cli.session_file.clone()));
    info!(api = %config.endpoint(""), "using hosted backend");
    Ok(AppServices::new_remote(config, clock, store))
}

fn launch(clock: Clock, services: AppServices) {
    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { clock, services });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Lessons")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
}

const DEMO_PASSWORD: &str = "password123";

/// Registers an account unless the email is already taken.
async fn ensure_account(
    session: &SessionContext,
    full_name: &str,
    email: &str,
    role: Role,
    grade: &str,
) -> Result<(), AuthError> {
    let form = SignUpForm {
        full_name: full_name.to_owned(),
        email: email.to_owned(),
        password: DEMO_PASSWORD.to_owned(),
        confirm_password: DEMO_PASSWORD.to_owned(),
        role: Some(role),
        grade: grade.to_owned(),
    };
    match session.sign_up(&form).await {
        Ok(profile) => {
            info!(email, role = %profile.role(), "demo account created");
            Ok(())
        }
        Err(AuthError::EmailTaken) => {
            info!(email, "demo account already present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn demo_video(title: &str, url: &str, duration_seconds: u32) -> VideoDraft {
    VideoDraft {
        title: title.to_owned(),
        video_url: url.to_owned(),
        duration_seconds,
        ..VideoDraft::default()
    }
}

async fn seed(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let session = services.session();
    ensure_account(&session, "Demo Teacher", "teacher@example.com", Role::Teacher, "").await?;
    ensure_account(&session, "Demo Student", "student@example.com", Role::Student, "Grade 9")
        .await?;

    let teacher = session
        .sign_in(&SignInForm {
            email: "teacher@example.com".into(),
            password: DEMO_PASSWORD.into(),
        })
        .await?
        .ok_or("demo teacher has no profile")?;

    let lessons = services.lessons();
    if !lessons.teacher_dashboard(&teacher).await?.lessons.is_empty() {
        warn!("demo lessons already seeded; leaving them as they are");
        session.sign_out().await?;
        return Ok(());
    }

    let catalog = [
        (
            "Introduction to Algebra",
            "Variables, expressions and simple equations.",
            vec![
                demo_video("What is a variable?", "https://www.youtube.com/watch?v=NybHckSEQBI", 412),
                demo_video("Solving one-step equations", "https://youtu.be/l3XzepN03KQ", 535),
            ],
        ),
        (
            "Basics of Physics",
            "Motion, forces and energy for beginners.",
            vec![demo_video(
                "Newton's laws",
                "https://www.youtube.com/watch?v=kKKM8Y-u7ds",
                648,
            )],
        ),
    ];

    let videos = services.videos();
    for (title, description, drafts) in catalog {
        let lesson = lessons
            .create_lesson(
                &teacher,
                &LessonDraft {
                    title: title.to_owned(),
                    description: description.to_owned(),
                    ..LessonDraft::default()
                },
            )
            .await?;
        for draft in &drafts {
            videos.add_video(&teacher, lesson.id(), draft).await?;
        }
        info!(lesson = title, videos = drafts.len(), "demo lesson seeded");
    }

    session.sign_out().await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_log();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Ui);
    let clock = Clock::default_clock();

    match command {
        Command::Ui => {
            let services = match cli.backend {
                Backend::Local => {
                    let store = Arc::new(FileSessionStore::new(cli.session_file.clone()));
                    open_local(&cli, clock, store).await?
                }
                Backend::Remote => open_remote(clock, &cli)?,
            };
            launch(clock, services);
            Ok(())
        }
        Command::Seed => {
            if cli.backend != Backend::Local {
                return Err(ArgsError::SeedNeedsLocal.into());
            }
            // Seeding signs in as the demo teacher; keep that out of the user's session file.
            let services = open_local(&cli, clock, Arc::new(InMemorySessionStore::new())).await?;
            seed(&services).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
