use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::views::lessons::LessonCard;
use crate::vm::{LessonListVm, greeting_for_hour, map_lesson_list};

const RECENT_LESSONS: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
struct HomeData {
    recent: LessonListVm,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let lessons = ctx.lessons();
    let greeting = greeting_for_hour(ctx.clock().local_hour());
    let name = ctx
        .session()
        .current_profile()
        .map_or_else(|| "there".to_owned(), |p| p.full_name().to_owned());

    let mut resource = use_resource(move || {
        let lessons = lessons.clone();

        async move {
            let recent = lessons
                .recent_lessons(RECENT_LESSONS)
                .await
                .map_err(ViewError::from)?;
            Ok::<_, ViewError>(HomeData {
                recent: map_lesson_list(&recent),
            })
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page home",
            header { class: "hero",
                p { class: "greeting", "{greeting}" }
                h2 { "{name}" }
                p { "Keep going with your learning." }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    div { class: "stats",
                        div { class: "stat",
                            strong { "{data.recent.total_lessons}" }
                            span { "Lessons available" }
                        }
                        div { class: "stat",
                            strong { "{data.recent.total_videos}" }
                            span { "Videos" }
                        }
                    }
                    section {
                        div { class: "section-header",
                            h3 { "Latest lessons" }
                            Link { to: Route::Lessons {}, "See all" }
                        }
                        if data.recent.cards.is_empty() {
                            p { class: "empty", "No lessons available yet." }
                        } else {
                            ul { class: "lesson-list",
                                for card in data.recent.cards.iter() {
                                    LessonCard { key: "{card.id}", card: card.clone() }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button { onclick: move |_| resource.restart(), "Retry" }
                },
            }
        }
    }
}
