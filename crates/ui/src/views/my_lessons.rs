use dioxus::prelude::*;
use lessons_core::{Section, is_visible};

use crate::context::AppContext;
use crate::views::lessons::LessonCard;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::map_lesson_list;

/// Student-only list of published lessons, newest first.
#[component]
pub fn MyLessonsView() -> Element {
    let ctx = use_context::<AppContext>();
    let allowed = is_visible(Section::MyLessons, ctx.session().current_profile().as_ref());
    let lessons = ctx.lessons();

    let resource = use_resource(move || {
        let lessons = lessons.clone();

        async move {
            if !allowed {
                return Err(ViewError::StudentsOnly);
            }
            let items = lessons.student_lessons().await.map_err(ViewError::from)?;
            Ok(map_lesson_list(&items))
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page my-lessons",
            h2 { "My lessons" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(list) => rsx! {
                    div { class: "stats",
                        div { class: "stat",
                            strong { "{list.total_lessons}" }
                            span { "Lessons" }
                        }
                        div { class: "stat",
                            strong { "{list.total_videos}" }
                            span { "Videos" }
                        }
                    }
                    if list.cards.is_empty() {
                        p { class: "empty", "No lessons available yet." }
                    } else {
                        ul { class: "lesson-list",
                            for card in list.cards.iter() {
                                LessonCard { key: "{card.id}", card: card.clone() }
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
