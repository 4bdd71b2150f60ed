use dioxus::prelude::*;
use dioxus_router::Link;
use lessons_core::model::LessonId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{GoBack, ViewError, ViewState, view_state_from_resource};
use crate::vm::{VideoRowVm, map_video_rows};

#[derive(Clone, Debug, PartialEq, Eq)]
struct LessonDetailData {
    title: String,
    description: Option<String>,
    cover_image_url: Option<String>,
    videos: Vec<VideoRowVm>,
    started: usize,
    completed: usize,
}

#[component]
pub fn LessonDetailView(id: LessonId) -> Element {
    let ctx = use_context::<AppContext>();
    let lessons = ctx.lessons();
    let viewer = ctx.session().current_user();

    let resource = use_resource(move || {
        let lessons = lessons.clone();

        async move {
            let detail = lessons
                .lesson_detail(id, viewer)
                .await
                .map_err(ViewError::from)?;
            Ok::<_, ViewError>(detail.map(|detail| LessonDetailData {
                title: detail.lesson.title().to_owned(),
                description: detail.lesson.description().map(str::to_owned),
                cover_image_url: detail.lesson.cover_image_url().map(str::to_owned),
                videos: map_video_rows(&detail.videos, &detail.progress),
                started: detail.progress.started_count(),
                completed: detail.progress.completed_count(),
            }))
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page lesson-detail",
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
                    if let Some(cover) = data.cover_image_url.clone() {
                        img { class: "cover", src: "{cover}", alt: "" }
                    }
                    h2 { "{data.title}" }
                    if let Some(description) = data.description.clone() {
                        p { class: "description", "{description}" }
                    }
                    div { class: "stats",
                        div { class: "stat",
                            strong { "{data.videos.len()}" }
                            span { "Videos" }
                        }
                        div { class: "stat",
                            strong { "{data.started}" }
                            span { "Started" }
                        }
                        div { class: "stat",
                            strong { "{data.completed}" }
                            span { "Completed" }
                        }
                    }
                    h3 { "Videos" }
                    if data.videos.is_empty() {
                        p { class: "empty", "No videos in this lesson yet." }
                    } else {
                        ol { class: "video-list",
                            for video in data.videos.iter() {
                                VideoRow { key: "{video.id}", video: video.clone() }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn VideoRow(video: VideoRowVm) -> Element {
    rsx! {
        li { class: "video-row",
            Link { to: Route::VideoPlayer { id: video.id },
                span { class: "position", "{video.position}" }
                div { class: "video-text",
                    h4 { "{video.title}" }
                    if let Some(description) = video.description.clone() {
                        p { "{description}" }
                    }
                }
                span { class: "duration", "{video.duration_str}" }
                if let Some(label) = video.badge.label() {
                    span { class: "{video.badge.css_class()}", "{label}" }
                }
            }
        }
    }
}
