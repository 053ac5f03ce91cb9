use dioxus::prelude::*;
use sync::{Exercise, ExerciseDraft, User};

use crate::UserSelect;

/// Shared create/edit exercise form.
///
/// The submit callback fires only when every required field builds a
/// valid value object; otherwise the validation message shows and no call
/// leaves the form. When `initial` is set the form pre-fills from it and
/// keeps its primary key on submit. Mount this only once the user list is
/// loaded so the default selection lands on the first entry.
#[component]
pub fn ExerciseForm(
    users: Vec<User>,
    initial: Option<Exercise>,
    submit_label: String,
    on_submit: EventHandler<Exercise>,
) -> Element {
    let mut selected = use_signal(|| {
        initial
            .as_ref()
            .map(|e| e.user.primary_key.clone())
            .or_else(|| users.first().map(|u| u.primary_key.clone()))
    });
    let mut description =
        use_signal(|| initial.as_ref().map(|e| e.description.clone()).unwrap_or_default());
    let mut duration = use_signal(|| {
        initial
            .as_ref()
            .map(|e| e.duration_minutes.to_string())
            .unwrap_or_default()
    });
    let mut date =
        use_signal(|| initial.as_ref().map(|e| e.date.to_string()).unwrap_or_default());
    let mut error = use_signal(|| Option::<String>::None);

    let primary_key = initial.as_ref().map(|e| e.primary_key.clone());
    let users_for_submit = users.clone();

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();

        let draft = ExerciseDraft {
            user: selected().and_then(|key| {
                users_for_submit
                    .iter()
                    .find(|u| u.primary_key == key)
                    .cloned()
            }),
            description: description(),
            duration: duration(),
            date: date(),
        };
        let built = match &primary_key {
            Some(key) => draft.build_with_key(key),
            None => draft.build(),
        };
        match built {
            Ok(exercise) => {
                error.set(None);
                on_submit.call(exercise);
            }
            Err(err) => error.set(Some(err.to_string())),
        }
    };

    rsx! {
        form {
            class: "exercise-form",
            onsubmit: handle_submit,

            div {
                class: "form-group",
                label { "Username: " }
                UserSelect {
                    users: users.clone(),
                    selected: selected(),
                    on_select: move |key| selected.set(Some(key)),
                }
            }
            div {
                class: "form-group",
                label { "Description: " }
                input {
                    r#type: "text",
                    required: true,
                    class: "form-control",
                    value: description(),
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }
            }
            div {
                class: "form-group",
                label { "Duration (in minutes): " }
                input {
                    r#type: "number",
                    required: true,
                    class: "form-control",
                    value: duration(),
                    oninput: move |evt: FormEvent| duration.set(evt.value()),
                }
            }
            div {
                class: "form-group",
                label { "Date: " }
                input {
                    r#type: "date",
                    required: true,
                    class: "form-control",
                    value: date(),
                    oninput: move |evt: FormEvent| date.set(evt.value()),
                }
            }

            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }

            div {
                class: "form-group",
                input {
                    r#type: "submit",
                    value: submit_label,
                    class: "btn btn-primary",
                }
            }
        }
    }
}
