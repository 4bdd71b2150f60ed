use dioxus::prelude::*;
use dioxus_router::use_navigator;
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::ProfileVm;

#[component]
pub fn ProfileView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let session = ctx.session();

    let profile = session.current_profile().as_ref().map(ProfileVm::from);
    let fallback_email = session.current_session().map(|s| s.email).unwrap_or_default();
    let mut confirming = use_signal(|| false);
    let mut busy = use_signal(|| false);

    let sign_out = use_callback(move |()| {
        let session = ctx.session();
        busy.set(true);
        spawn(async move {
            if let Err(e) = session.sign_out().await {
                warn!(error = %e, "sign-out did not reach the identity provider");
            }
            busy.set(false);
            let _ = navigator.replace(Route::Login {});
        });
    });

    rsx! {
        div { class: "page profile",
            h2 { "Account" }

            match profile {
                Some(vm) => rsx! {
                    div { class: "avatar", "{vm.initial}" }
                    h3 { "{vm.full_name}" }
                    span { class: "role", "{vm.role_label}" }
                    dl { class: "details",
                        dt { "Email" }
                        dd { "{vm.email}" }
                        if let Some(grade) = vm.grade.clone() {
                            dt { "Grade" }
                            dd { "{grade}" }
                        }
                    }
                },
                None => rsx! {
                    dl { class: "details",
                        dt { "Email" }
                        dd { "{fallback_email}" }
                    }
                    p { class: "notice", "Your profile is not available yet." }
                },
            }

            if confirming() {
                div { class: "confirm",
                    p { "Sign out of this device?" }
                    button {
                        class: "danger",
                        disabled: busy(),
                        onclick: move |_| sign_out.call(()),
                        "Sign out"
                    }
                    button { onclick: move |_| confirming.set(false), "Cancel" }
                }
            } else {
                button { class: "danger", onclick: move |_| confirming.set(true), "Sign out" }
            }
        }
    }
}
