use dioxus::prelude::*;
use dioxus_router::use_navigator;
use lessons_core::model::{LessonId, VideoDraft, parse_duration_input};

use crate::context::AppContext;
use crate::views::ViewError;
use crate::views::teacher::save_error;

/// Raw add-video inputs; duration arrives as separate minutes and seconds boxes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct VideoFormInput {
    title: String,
    description: String,
    video_url: String,
    minutes: String,
    seconds: String,
    thumbnail_url: String,
}

impl VideoFormInput {
    fn to_draft(&self) -> VideoDraft {
        VideoDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            video_url: self.video_url.clone(),
            duration_seconds: parse_duration_input(&self.minutes, &self.seconds),
            thumbnail_url: self.thumbnail_url.clone(),
        }
    }
}

#[component]
pub fn AddVideoView(id: LessonId) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let mut input = use_signal(VideoFormInput::default);
    let mut busy = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let save = use_callback(move |()| {
        if busy() {
            return;
        }
        let Some(profile) = ctx.session().current_profile() else {
            error.set(Some(ViewError::NotSignedIn.message().to_owned()));
            return;
        };
        let videos = ctx.videos();
        let draft = input.read().to_draft();
        busy.set(true);
        error.set(None);
        spawn(async move {
            match videos.add_video(&profile, id, &draft).await {
                Ok(_) => navigator.go_back(),
                Err(err) => error.set(Some(save_error(err))),
            }
            busy.set(false);
        });
    });

    rsx! {
        div { class: "page add-video",
            button { class: "back", onclick: move |_| navigator.go_back(), "Back" }
            h2 { "Add video" }

            form {
                onsubmit: move |evt| {
                    evt.prevent_default();
                    save.call(());
                },
                label { "Title"
                    input {
                        value: "{input.read().title}",
                        oninput: move |evt| input.write().title = evt.value(),
                    }
                }
                label { "Description"
                    textarea {
                        value: "{input.read().description}",
                        oninput: move |evt| input.write().description = evt.value(),
                    }
                }
                label { "Video URL"
                    input {
                        r#type: "url",
                        placeholder: "https://www.youtube.com/watch?v=...",
                        value: "{input.read().video_url}",
                        oninput: move |evt| input.write().video_url = evt.value(),
                    }
                }
                div { class: "duration-inputs",
                    label { "Minutes"
                        input {
                            r#type: "number",
                            min: "0",
                            value: "{input.read().minutes}",
                            oninput: move |evt| input.write().minutes = evt.value(),
                        }
                    }
                    label { "Seconds"
                        input {
                            r#type: "number",
                            min: "0",
                            value: "{input.read().seconds}",
                            oninput: move |evt| input.write().seconds = evt.value(),
                        }
                    }
                }
                label { "Thumbnail URL"
                    input {
                        r#type: "url",
                        value: "{input.read().thumbnail_url}",
                        oninput: move |evt| input.write().thumbnail_url = evt.value(),
                    }
                }
                if let Some(message) = error() {
                    p { class: "form-error", "{message}" }
                }
                button { r#type: "submit", disabled: busy(),
                    if busy() { "Saving..." } else { "Add video" }
                }
            }
        }
    }
}
