use dioxus::prelude::*;
use dioxus_router::use_navigator;
use lessons_core::model::LessonDraft;
use lessons_core::{Section, is_visible};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::views::teacher::lesson_form::LessonForm;
use crate::views::teacher::save_error;

#[component]
pub fn AddLessonView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let profile = ctx.session().current_profile();
    let allowed = is_visible(Section::TeacherDashboard, profile.as_ref());

    let mut busy = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let save = use_callback(move |draft: LessonDraft| {
        let Some(profile) = ctx.session().current_profile() else {
            error.set(Some(ViewError::NotSignedIn.message().to_owned()));
            return;
        };
        let lessons = ctx.lessons();
        busy.set(true);
        error.set(None);
        spawn(async move {
            match lessons.create_lesson(&profile, &draft).await {
                // Continue on the edit screen so videos can be added right away.
                Ok(lesson) => {
                    let _ = navigator.replace(Route::EditLesson { id: lesson.id() });
                }
                Err(err) => error.set(Some(save_error(err))),
            }
            busy.set(false);
        });
    });

    rsx! {
        div { class: "page add-lesson",
            button { class: "back", onclick: move |_| navigator.go_back(), "Back" }
            h2 { "New lesson" }
            if allowed {
                LessonForm {
                    initial: LessonDraft::default(),
                    submit_label: "Create lesson",
                    busy: busy(),
                    error: error(),
                    on_submit: move |draft| save.call(draft),
                }
            } else {
                p { class: "notice", "{ViewError::TeachersOnly.message()}" }
            }
        }
    }
}
