use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use lessons_core::model::SignInForm;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::auth::form_error;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let submit = use_callback(move |()| {
        if busy() {
            return;
        }
        let session = ctx.session();
        let form = SignInForm {
            email: email(),
            password: password(),
        };
        busy.set(true);
        error.set(None);
        spawn(async move {
            match session.sign_in(&form).await {
                Ok(_) => {
                    let _ = navigator.replace(Route::Home {});
                }
                Err(err) => error.set(Some(form_error(&err))),
            }
            busy.set(false);
        });
    });

    rsx! {
        div { class: "page auth",
            h1 { "Lessons" }
            h2 { "Sign in" }

            form {
                onsubmit: move |evt| {
                    evt.prevent_default();
                    submit.call(());
                },
                label { "Email"
                    input {
                        r#type: "email",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                }
                label { "Password"
                    input {
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                }
                if let Some(message) = error() {
                    p { class: "form-error", "{message}" }
                }
                button { r#type: "submit", disabled: busy(),
                    if busy() { "Signing in..." } else { "Sign in" }
                }
            }

            p { class: "auth-switch",
                "No account yet? "
                Link { to: Route::Register {}, "Create one" }
            }
        }
    }
}
