use dioxus::prelude::*;
use sync::WorkerTransport;

use super::make_worker;

#[component]
pub fn CreateUser() -> Element {
    let mut username = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut created = use_signal(|| Option::<String>::None);

    let worker = use_hook(make_worker);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let worker = worker.clone();
        spawn(async move {
            error.set(None);
            let name = username().trim().to_string();
            if name.is_empty() {
                error.set(Some("Username is required".to_string()));
                return;
            }
            match worker.add_user(&name).await {
                Ok(user) => {
                    created.set(Some(user.username));
                    username.set(String::new());
                }
                Err(err) => {
                    tracing::error!("failed to create user: {err}");
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    rsx! {
        div {
            class: "page",
            h3 { "Create New User" }
            form {
                class: "exercise-form",
                onsubmit: handle_submit,
                div {
                    class: "form-group",
                    label { "Username: " }
                    input {
                        r#type: "text",
                        required: true,
                        class: "form-control",
                        value: username(),
                        oninput: move |evt: FormEvent| username.set(evt.value()),
                    }
                }
                if let Some(message) = error() {
                    p { class: "form-error", "{message}" }
                }
                if let Some(name) = created() {
                    p { class: "success-note", "User '{name}' created." }
                }
                div {
                    class: "form-group",
                    input {
                        r#type: "submit",
                        value: "Create User",
                        class: "btn btn-primary",
                    }
                }
            }
        }
    }
}
