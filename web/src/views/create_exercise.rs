use dioxus::prelude::*;
use sync::{Exercise, User, WorkerTransport};
use ui::ExerciseForm;

use super::make_worker;
use crate::Route;

#[component]
pub fn CreateExercise() -> Element {
    let mut users = use_signal(Vec::<User>::new);
    let mut loaded = use_signal(|| false);
    let nav = use_navigator();

    let worker = use_hook(make_worker);

    // Load the known users and default-select the first one (the form
    // does the selecting once it mounts with a non-empty list).
    {
        let worker = worker.clone();
        let _loader = use_resource(move || {
            let worker = worker.clone();
            async move {
                match worker.get_users().await {
                    Ok(known) => {
                        if known.is_empty() {
                            tracing::warn!("no users found");
                        }
                        users.set(known);
                        loaded.set(true);
                    }
                    Err(err) => tracing::error!("failed to load users: {err}"),
                }
            }
        });
    }

    let handle_submit = {
        let worker = worker.clone();
        move |exercise: Exercise| {
            let worker = worker.clone();
            spawn(async move {
                match worker.add_exercise(exercise).await {
                    Ok(added) => {
                        tracing::info!(key = %added.primary_key, "exercise added");
                        nav.replace(Route::ExercisesList {});
                    }
                    Err(err) => tracing::error!("failed to add exercise: {err}"),
                }
            });
        }
    };

    rsx! {
        div {
            class: "page",
            h3 { "Create New Exercise Log" }
            if loaded() {
                if users().is_empty() {
                    p {
                        class: "empty-note",
                        "No users yet. "
                        Link { to: Route::CreateUser {}, "Add one" }
                        " before logging an exercise."
                    }
                } else {
                    ExerciseForm {
                        users: users(),
                        initial: None::<Exercise>,
                        submit_label: "Create Exercise Log",
                        on_submit: handle_submit,
                    }
                }
            }
        }
    }
}
