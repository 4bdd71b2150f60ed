use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator, use_route};
use lessons_core::model::{LessonId, VideoId};
use lessons_core::{Section, visible_sections};
use services::AuthError;
use tracing::warn;

use crate::context::AppContext;
use crate::views::{
    AddLessonView, AddVideoView, EditLessonView, HomeView, LaunchView, LessonDetailView,
    LessonsView, LoginView, MyLessonsView, ProfileView, RegisterView, TeacherDashboardView,
    VideoPlayerView,
};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/", LaunchView)] Launch {},
    #[route("/login", LoginView)] Login {},
    #[route("/register", RegisterView)] Register {},
    #[layout(Layout)]
        #[route("/home", HomeView)] Home {},
        #[route("/lessons", LessonsView)] Lessons {},
        #[route("/my-lessons", MyLessonsView)] MyLessons {},
        #[route("/teacher", TeacherDashboardView)] TeacherDashboard {},
        #[route("/profile", ProfileView)] Profile {},
        #[route("/lesson/:id", LessonDetailView)] LessonDetail { id: LessonId },
        #[route("/video/:id", VideoPlayerView)] VideoPlayer { id: VideoId },
        #[route("/teacher/lessons/new", AddLessonView)] AddLesson {},
        #[route("/teacher/lessons/:id", EditLessonView)] EditLesson { id: LessonId },
        #[route("/teacher/lessons/:id/videos/new", AddVideoView)] AddVideo { id: LessonId },
}

impl Route {
    /// Tab bar destination for a navigation section.
    #[must_use]
    pub fn for_section(section: Section) -> Self {
        match section {
            Section::Home => Route::Home {},
            Section::Lessons => Route::Lessons {},
            Section::MyLessons => Route::MyLessons {},
            Section::TeacherDashboard => Route::TeacherDashboard {},
            Section::Profile => Route::Profile {},
        }
    }
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let route = use_route::<Route>();

    // Hosted access tokens are short-lived; renew on navigation so data
    // requests keep running as the signed-in user.
    use_effect(use_reactive((&route,), move |(_,)| {
        let session = ctx.session();
        spawn(async move {
            match session.renew().await {
                Ok(()) => {}
                Err(AuthError::NotSignedIn) => {
                    let _ = navigator.replace(Route::Login {});
                }
                Err(e) => warn!(error = %e, "could not renew session"),
            }
        });
    }));

    rsx! {
        div { class: "app",
            TabBar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn TabBar() -> Element {
    let ctx = use_context::<AppContext>();
    // Subscribing to the route re-evaluates the role gate on every navigation.
    let _route = use_route::<Route>();
    let profile = ctx.session().current_profile();
    let sections = visible_sections(profile.as_ref());

    rsx! {
        nav { class: "tabbar",
            h1 { "Lessons" }
            ul {
                for section in sections {
                    li { key: "{section.label()}",
                        Link {
                            to: Route::for_section(section),
                            active_class: "active",
                            "{section.label()}"
                        }
                    }
                }
            }
        }
    }
}
