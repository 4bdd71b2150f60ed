use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use lessons_core::model::{Role, SignUpForm};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::auth::form_error;

#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();

    let mut form = use_signal(|| SignUpForm {
        role: Some(Role::Student),
        ..SignUpForm::default()
    });
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);
    let mut registered = use_signal(|| false);

    let submit = use_callback(move |()| {
        if busy() {
            return;
        }
        let session = ctx.session();
        let snapshot = form.read().clone();
        busy.set(true);
        error.set(None);
        spawn(async move {
            match session.sign_up(&snapshot).await {
                Ok(_) => registered.set(true),
                Err(err) => error.set(Some(form_error(&err))),
            }
            busy.set(false);
        });
    });

    if registered() {
        return rsx! {
            RegisteredPanel {}
        };
    }

    let is_student = form.read().role != Some(Role::Teacher);

    rsx! {
        div { class: "page auth",
            h2 { "Create account" }

            form {
                onsubmit: move |evt| {
                    evt.prevent_default();
                    submit.call(());
                },
                label { "Full name"
                    input {
                        value: "{form.read().full_name}",
                        oninput: move |evt| form.write().full_name = evt.value(),
                    }
                }
                label { "Email"
                    input {
                        r#type: "email",
                        value: "{form.read().email}",
                        oninput: move |evt| form.write().email = evt.value(),
                    }
                }

                fieldset { class: "role-picker",
                    legend { "I am a" }
                    for role in [Role::Student, Role::Teacher] {
                        button {
                            key: "{role}",
                            r#type: "button",
                            class: if form.read().role == Some(role) { "role active" } else { "role" },
                            onclick: move |_| form.write().role = Some(role),
                            "{role.label()}"
                        }
                    }
                }

                if is_student {
                    label { "Grade"
                        input {
                            value: "{form.read().grade}",
                            oninput: move |evt| form.write().grade = evt.value(),
                        }
                    }
                }

                label { "Password"
                    input {
                        r#type: "password",
                        value: "{form.read().password}",
                        oninput: move |evt| form.write().password = evt.value(),
                    }
                }
                label { "Confirm password"
                    input {
                        r#type: "password",
                        value: "{form.read().confirm_password}",
                        oninput: move |evt| form.write().confirm_password = evt.value(),
                    }
                }

                if let Some(message) = error() {
                    p { class: "form-error", "{message}" }
                }
                button { r#type: "submit", disabled: busy(),
                    if busy() { "Creating account..." } else { "Create account" }
                }
            }

            p { class: "auth-switch",
                "Already registered? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}

/// Shown in place of the form once the account exists.
#[component]
pub fn RegisteredPanel() -> Element {
    let navigator = use_navigator();

    rsx! {
        div { class: "page auth",
            h2 { "Account created" }
            p { class: "notice", "Registered successfully. You can now sign in." }
            button {
                class: "primary",
                onclick: move |_| {
                    let _ = navigator.replace(Route::Login {});
                },
                "Continue to sign in"
            }
        }
    }
}
