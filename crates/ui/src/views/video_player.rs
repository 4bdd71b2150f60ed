use dioxus::prelude::*;
use lessons_core::model::{VideoId, WatchProgress};

use crate::context::AppContext;
use crate::views::{GoBack, ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq, Eq)]
struct PlayerData {
    title: String,
    description: Option<String>,
    embed_url: String,
    duration_seconds: u32,
    duration_str: String,
}

#[component]
pub fn VideoPlayerView(id: VideoId) -> Element {
    let ctx = use_context::<AppContext>();
    let videos = ctx.videos();
    let tracker = ctx.progress();
    let viewer = ctx.session().current_user();
    let mut progress = use_signal(|| None::<WatchProgress>);

    let resource = use_resource(move || {
        let videos = videos.clone();
        let tracker = tracker.clone();

        async move {
            let Some(video) = videos
                .playable_video(id, viewer)
                .await
                .map_err(ViewError::from)?
            else {
                return Ok(None);
            };
            if let Some(user_id) = viewer {
                progress.set(tracker.mark_opened(user_id, &video).await);
            }
            Ok::<_, ViewError>(Some(PlayerData {
                title: video.title().to_owned(),
                description: video.description().map(str::to_owned),
                embed_url: video.embed_url(),
                duration_seconds: video.duration_seconds(),
                duration_str: video.formatted_duration(),
            }))
        }
    });

    let mark_watched = use_callback(move |duration_seconds: u32| {
        let Some(user_id) = viewer else {
            return;
        };
        let tracker = ctx.progress();
        spawn(async move {
            let position = f64::from(duration_seconds);
            if let Some(row) = tracker
                .record_progress_best_effort(user_id, id, position, duration_seconds)
                .await
            {
                progress.set(Some(row));
            }
        });
    });

    let state = view_state_from_resource(resource);
    let completed = progress.read().as_ref().is_some_and(WatchProgress::completed);

    rsx! {
        div { class: "page player",
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
                    div { class: "player-frame",
                        iframe {
                            src: "{data.embed_url}",
                            allow: "autoplay; fullscreen",
                            allowfullscreen: true,
                        }
                    }
                    h2 { "{data.title}" }
                    p { class: "duration", "Duration: {data.duration_str}" }
                    if let Some(description) = data.description.clone() {
                        p { class: "description", "{description}" }
                    }
                    if viewer.is_some() {
                        if completed {
                            span { class: "badge badge-completed", "Completed" }
                        } else {
                            button {
                                onclick: move |_| mark_watched.call(data.duration_seconds),
                                "Mark as watched"
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
