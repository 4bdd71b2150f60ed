use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use lessons_core::model::{LessonDraft, LessonId, LessonProgress, VideoId};
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::teacher::lesson_form::LessonForm;
use crate::views::teacher::save_error;
use crate::views::{GoBack, ViewError, ViewState, view_state_from_resource};
use crate::vm::{VideoRowVm, map_video_rows};

#[derive(Clone, Debug, PartialEq, Eq)]
struct EditData {
    draft: LessonDraft,
    videos: Vec<VideoRowVm>,
}

#[component]
pub fn EditLessonView(id: LessonId) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let lessons = ctx.lessons();
    let profile = ctx.session().current_profile();
    let delete_ctx = ctx.clone();

    let mut busy = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut saved = use_signal(|| false);
    let mut notice = use_signal(|| None::<String>);

    let mut resource = use_resource(move || {
        let lessons = lessons.clone();
        let profile = profile.clone();

        async move {
            let profile = profile.ok_or(ViewError::TeachersOnly)?;
            let found = lessons
                .lesson_for_editing(&profile, id)
                .await
                .map_err(ViewError::from)?;
            Ok::<_, ViewError>(found.map(|(lesson, videos)| EditData {
                draft: lesson.to_draft(),
                videos: map_video_rows(&videos, &LessonProgress::default()),
            }))
        }
    });

    let save = use_callback(move |draft: LessonDraft| {
        let Some(profile) = ctx.session().current_profile() else {
            return;
        };
        let lessons = ctx.lessons();
        busy.set(true);
        error.set(None);
        saved.set(false);
        spawn(async move {
            match lessons.update_lesson(&profile, id, &draft).await {
                Ok(_) => saved.set(true),
                Err(err) => error.set(Some(save_error(err))),
            }
            busy.set(false);
        });
    });

    let delete_video = use_callback(move |(video_id, title): (VideoId, String)| {
        let Some(profile) = delete_ctx.session().current_profile() else {
            return;
        };
        let videos = delete_ctx.videos();
        notice.set(None);
        error.set(None);
        spawn(async move {
            match videos.delete_video(&profile, video_id).await {
                Ok(()) => {
                    notice.set(Some(deleted_notice(&title)));
                    resource.restart();
                }
                Err(err) => {
                    warn!(%video_id, error = %err, "video delete failed");
                    error.set(Some(save_error(err)));
                }
            }
        });
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page edit-lesson",
            button { class: "back", onclick: move |_| navigator.go_back(), "Back" }
            h2 { "Edit lesson" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(None) => rsx! {
                    GoBack {}
                },
                ViewState::Ready(Some(data)) => rsx! {
                    LessonForm {
                        initial: data.draft.clone(),
                        submit_label: "Save changes",
                        busy: busy(),
                        error: error(),
                        on_submit: move |draft| save.call(draft),
                    }
                    if saved() {
                        p { class: "notice", "Saved." }
                    }

                    div { class: "section-header",
                        h3 { "Videos" }
                        Link { to: Route::AddVideo { id }, class: "primary", "Add video" }
                    }
                    if data.videos.is_empty() {
                        p { class: "empty", "No videos yet." }
                    } else {
                        ol { class: "video-list",
                            for video in data.videos.iter() {
                                VideoRow {
                                    key: "{video.id}",
                                    video: video.clone(),
                                    on_delete: move |target| delete_video.call(target),
                                }
                            }
                        }
                    }
                    if let Some(message) = notice() {
                        p { class: "notice", "{message}" }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "notice", "{err.message()}" }
                },
            }
        }
    }
}

fn deleted_notice(title: &str) -> String {
    format!("Deleted \"{title}\".")
}

#[component]
fn VideoRow(video: VideoRowVm, on_delete: EventHandler<(VideoId, String)>) -> Element {
    let mut confirming = use_signal(|| false);
    let id = video.id;
    let title = video.title.clone();

    rsx! {
        li { class: "video-row",
            span { class: "position", "{video.position}" }
            span { class: "title", "{video.title}" }
            span { class: "duration", "{video.duration_str}" }
            if confirming() {
                span { "Delete \"{video.title}\"?" }
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
