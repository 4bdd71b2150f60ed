use dioxus::prelude::*;
use dioxus_router::use_navigator;
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};

/// Entry gate: restores a stored session, then sends the user home or to sign-in.
#[component]
pub fn LaunchView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session = ctx.session();

    let resource = use_resource(move || {
        let session = session.clone();

        async move {
            session.restore().await.map_err(|e| {
                warn!(error = %e, "session restore failed");
                ViewError::from(e)
            })
        }
    });

    use_effect(move || match view_state_from_resource(resource) {
        ViewState::Ready(Some(_)) => {
            let _ = navigator.replace(Route::Home {});
        }
        ViewState::Ready(None) | ViewState::Error(_) => {
            let _ = navigator.replace(Route::Login {});
        }
        ViewState::Idle | ViewState::Loading => {}
    });

    rsx! {
        div { class: "page launch",
            h1 { "Lessons" }
            p { "Loading..." }
        }
    }
}
