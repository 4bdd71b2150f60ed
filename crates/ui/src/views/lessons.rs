use dioxus::prelude::*;
use dioxus_router::Link;
use services::filter_lessons;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{LessonCardVm, map_lesson_cards};

/// Published catalog in curriculum order with a search box.
#[component]
pub fn LessonsView() -> Element {
    let ctx = use_context::<AppContext>();
    let lessons = ctx.lessons();
    let mut query = use_signal(String::new);

    let resource = use_resource(move || {
        let lessons = lessons.clone();

        async move { lessons.catalog().await.map_err(ViewError::from) }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page lessons",
            h2 { "All lessons" }
            input {
                class: "search",
                r#type: "search",
                placeholder: "Search lessons",
                value: "{query}",
                oninput: move |evt| query.set(evt.value()),
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(all) => {
                    let cards = map_lesson_cards(&filter_lessons(&all, &query.read()));
                    rsx! {
                        if cards.is_empty() {
                            p { class: "empty",
                                if query.read().trim().is_empty() { "No lessons available yet." } else { "No lessons match your search." }
                            }
                        } else {
                            ul { class: "lesson-list",
                                for card in cards.iter() {
                                    LessonCard { key: "{card.id}", card: card.clone() }
                                }
                            }
                        }
                    }
                }
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
pub(crate) fn LessonCard(card: LessonCardVm) -> Element {
    rsx! {
        li { class: "lesson-card",
            Link { to: Route::LessonDetail { id: card.id },
                if let Some(cover) = card.cover_image_url.clone() {
                    img { class: "cover", src: "{cover}", alt: "" }
                }
                h4 { "{card.title}" }
                if let Some(description) = card.description.clone() {
                    p { class: "description", "{description}" }
                }
                div { class: "meta",
                    span { "{card.videos_label}" }
                    span { "{card.created_at_str}" }
                }
            }
        }
    }
}
