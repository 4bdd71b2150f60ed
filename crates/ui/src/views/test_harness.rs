use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use lessons_core::model::{
    Credentials, LessonId, NewAccount, Profile, Role, SignInForm, SignUpForm, UserId, VideoId,
};
use lessons_core::time::fixed_now;
use services::{
    AppServices, AuthError, AuthSession, Clock, IdentityProvider, InMemorySessionStore,
    LessonService, ProgressTracker, SessionContext, VideoService,
};
use storage::repository::{InMemoryRepository, Storage};

use crate::context::{UiApp, build_app_context};
use crate::views::{
    AddLessonView, EditLessonView, HomeView, LessonDetailView, LessonsView, MyLessonsView,
    ProfileView, RegisterView, TeacherDashboardView, VideoPlayerView,
};
use crate::views::auth::RegisteredPanel;

/// Identity provider that skips password hashing so view tests stay fast.
#[derive(Default)]
struct StubIdentity {
    accounts: Mutex<HashMap<String, UserId>>,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let accounts = self.accounts.lock().map_err(|_| AuthError::InvalidCredentials)?;
        let user_id = accounts
            .get(&credentials.email)
            .copied()
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(AuthSession::local(user_id, credentials.email.clone()))
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<AuthSession, AuthError> {
        let mut accounts = self.accounts.lock().map_err(|_| AuthError::EmailTaken)?;
        if accounts.contains_key(&account.email) {
            return Err(AuthError::EmailTaken);
        }
        let user_id = UserId::generate();
        accounts.insert(account.email.clone(), user_id);
        Ok(AuthSession::local(user_id, account.email.clone()))
    }

    async fn sign_out(&self, _session: &AuthSession) -> Result<(), AuthError> {
        Ok(())
    }
}

#[derive(Clone)]
struct TestApp {
    clock: Clock,
    services: AppServices,
}

impl UiApp for TestApp {
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

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Lessons,
    MyLessons,
    TeacherDashboard,
    Profile,
    LessonDetail(LessonId),
    VideoPlayer(VideoId),
    AddLesson,
    EditLesson(LessonId),
    Register,
    Registered,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Lessons => rsx! { LessonsView {} },
        ViewKind::MyLessons => rsx! { MyLessonsView {} },
        ViewKind::TeacherDashboard => rsx! { TeacherDashboardView {} },
        ViewKind::Profile => rsx! { ProfileView {} },
        ViewKind::LessonDetail(id) => rsx! { LessonDetailView { id } },
        ViewKind::VideoPlayer(id) => rsx! { VideoPlayerView { id } },
        ViewKind::AddLesson => rsx! { AddLessonView {} },
        ViewKind::EditLesson(id) => rsx! { EditLessonView { id } },
        ViewKind::Register => rsx! { RegisterView {} },
        ViewKind::Registered => rsx! { RegisteredPanel {} },
    }
}

/// Services over in-memory storage plus a signed-in user, before any view exists.
pub struct TestServices {
    pub clock: Clock,
    pub storage: Storage,
    pub services: AppServices,
}

impl TestServices {
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Storage::from_backend(InMemoryRepository::new()))
    }

    #[must_use]
    pub fn with_storage(storage: Storage) -> Self {
        let clock = Clock::fixed(fixed_now());
        let services = AppServices::assemble(
            storage.clone(),
            Arc::new(StubIdentity::default()),
            clock,
            Arc::new(InMemorySessionStore::new()),
        );
        Self {
            clock,
            storage,
            services,
        }
    }

    /// Registers and signs in a user with the given role.
    pub async fn sign_in_as(&self, role: Role, name: &str) -> Profile {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let session = self.services.session();
        session
            .sign_up(&SignUpForm {
                full_name: name.to_owned(),
                email: email.clone(),
                password: "secret123".into(),
                confirm_password: "secret123".into(),
                role: Some(role),
                grade: if role == Role::Student {
                    "Grade 9".into()
                } else {
                    String::new()
                },
            })
            .await
            .expect("sign up");
        session
            .sign_in(&SignInForm {
                email,
                password: "secret123".into(),
            })
            .await
            .expect("sign in")
            .expect("profile row")
    }

    pub fn mount(self, view: ViewKind) -> ViewHarness {
        let app = Arc::new(TestApp {
            clock: self.clock,
            services: self.services.clone(),
        });
        let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
        ViewHarness {
            dom,
            storage: self.storage,
            services: self.services,
        }
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub services: AppServices,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let pending resources settle before rendering.
    pub async fn render_settled(&mut self) -> String {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}
