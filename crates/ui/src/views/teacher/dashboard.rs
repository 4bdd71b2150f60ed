use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use lessons_core::model::LessonId;
use lessons_core::{Section, is_visible};
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{DashboardVm, LessonCardVm};

/// Teacher-only overview: own lessons, totals, and lesson deletion.
#[component]
pub fn TeacherDashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let profile = ctx.session().current_profile();
    let allowed = is_visible(Section::TeacherDashboard, profile.as_ref());
    let lessons = ctx.lessons();
    let mut notice = use_signal(|| None::<String>);

    let mut resource = use_resource(move || {
        let lessons = lessons.clone();
        let profile = profile.clone();

        async move {
            // Gate first: a student never triggers the dashboard queries.
            let Some(profile) = profile.filter(|_| allowed) else {
                return Err(ViewError::TeachersOnly);
            };
            let dashboard = lessons
                .teacher_dashboard(&profile)
                .await
                .map_err(ViewError::from)?;
            Ok(DashboardVm::from(&dashboard))
        }
    });

    let delete_lesson = use_callback(move |(id, title): (LessonId, String)| {
        let Some(profile) = ctx.session().current_profile() else {
            return;
        };
        let lessons = ctx.lessons();
        notice.set(None);
        spawn(async move {
            match lessons.delete_lesson(&profile, id).await {
                Ok(()) => {
                    notice.set(Some(format!("Deleted \"{title}\".")));
                    resource.restart();
                }
                Err(err) => {
                    warn!(lesson_id = %id, error = %err, "lesson delete failed");
                    notice.set(Some(format!("Could not delete \"{title}\".")));
                }
            }
        });
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page dashboard",
            div { class: "section-header",
                h2 { "Dashboard" }
                if allowed {
                    Link { to: Route::AddLesson {}, class: "primary", "New lesson" }
                }
            }
            if let Some(message) = notice() {
                p { class: "notice", "{message}" }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    div { class: "stats",
                        div { class: "stat",
                            strong { "{vm.total_lessons}" }
                            span { "Lessons" }
                        }
                        div { class: "stat",
                            strong { "{vm.total_videos}" }
                            span { "Videos" }
                        }
                        div { class: "stat",
                            strong { "{vm.student_count}" }
                            span { "Students" }
                        }
                    }
                    if vm.cards.is_empty() {
                        p { class: "empty", "You have not created any lessons yet." }
                    } else {
                        ul { class: "lesson-list",
                            for card in vm.cards.iter() {
                                DashboardRow {
                                    key: "{card.id}",
                                    card: card.clone(),
                                    on_delete: move |target| delete_lesson.call(target),
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "notice", "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn DashboardRow(card: LessonCardVm, on_delete: EventHandler<(LessonId, String)>) -> Element {
    let navigator = use_navigator();
    let mut confirming = use_signal(|| false);
    let id = card.id;
    let title = card.title.clone();

    rsx! {
        li { class: "lesson-card",
            h4 { "{card.title}" }
            div { class: "meta",
                span { "{card.videos_label}" }
                span { if card.is_published { "Published" } else { "Draft" } }
            }
            div { class: "actions",
                button {
                    onclick: move |_| {
                        let _ = navigator.push(Route::EditLesson { id });
                    },
                    "Edit"
                }
                if confirming() {
                    span { "Delete \"{card.title}\"?" }
                    button {
                        class: "danger",
                        onclick: move |_| {
                            confirming.set(false);
                            on_delete.call((id, title.clone()));
                        },
                        "Delete"
                    }
                    button { onclick: move |_| confirming.set(false), "Cancel" }
                } else {
                    button { class: "danger", onclick: move |_| confirming.set(true), "Delete" }
                }
            }
        }
    }
}
