use dioxus::prelude::*;
use lessons_core::model::LessonDraft;

/// Title, description, cover URL and published toggle; shared by add and edit.
#[component]
pub(super) fn LessonForm(
    initial: LessonDraft,
    submit_label: &'static str,
    busy: bool,
    error: Option<String>,
    on_submit: EventHandler<LessonDraft>,
) -> Element {
    let mut draft = use_signal(|| initial.clone());

    rsx! {
        form {
            class: "lesson-form",
            onsubmit: move |evt| {
                evt.prevent_default();
                on_submit.call(draft.read().clone());
            },
            label { "Title"
                input {
                    value: "{draft.read().title}",
                    oninput: move |evt| draft.write().title = evt.value(),
                }
            }
            label { "Description"
                textarea {
                    value: "{draft.read().description}",
                    oninput: move |evt| draft.write().description = evt.value(),
                }
            }
            label { "Cover image URL"
                input {
                    r#type: "url",
                    value: "{draft.read().cover_image_url}",
                    oninput: move |evt| draft.write().cover_image_url = evt.value(),
                }
            }
            label { class: "toggle",
                input {
                    r#type: "checkbox",
                    checked: draft.read().is_published,
                    onchange: move |evt| draft.write().is_published = evt.checked(),
                }
                "Published"
            }
            if let Some(message) = error {
                p { class: "form-error", "{message}" }
            }
            button { r#type: "submit", disabled: busy,
                if busy { "Saving..." } else { "{submit_label}" }
            }
        }
    }
}
