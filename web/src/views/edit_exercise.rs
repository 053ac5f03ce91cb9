use dioxus::prelude::*;
use sync::{Exercise, User, WorkerTransport};
use ui::ExerciseForm;

use super::make_worker;
use crate::Route;

#[component]
pub fn EditExercise(id: String) -> Element {
    // Track the route param in a signal so the loader re-runs when it
    // changes without a remount.
    let mut id_signal = use_signal(|| id.clone());
    if *id_signal.peek() != id {
        id_signal.set(id.clone());
    }

    let mut users = use_signal(Vec::<User>::new);
    let mut exercise = use_signal(|| Option::<Exercise>::None);
    let mut loaded = use_signal(|| false);
    let nav = use_navigator();

    let worker = use_hook(make_worker);

    {
        let worker = worker.clone();
        let _loader = use_resource(move || {
            let worker = worker.clone();
            let key = id_signal();
            async move {
                match worker.get_exercise(&key).await {
                    Ok(found) => {
                        if found.is_none() {
                            tracing::warn!(key = %key, "exercise not found");
                        }
                        exercise.set(found);
                    }
                    Err(err) => tracing::error!("failed to load exercise: {err}"),
                }
                match worker.get_users().await {
                    Ok(known) => users.set(known),
                    Err(err) => tracing::error!("failed to load users: {err}"),
                }
                loaded.set(true);
            }
        });
    }

    let handle_submit = {
        let worker = worker.clone();
        move |updated: Exercise| {
            let worker = worker.clone();
            spawn(async move {
                match worker.update_exercise(updated).await {
                    Ok(saved) => {
                        tracing::info!(key = %saved.primary_key, "exercise updated");
                        nav.replace(Route::ExercisesList {});
                    }
                    Err(err) => tracing::error!("failed to update exercise: {err}"),
                }
            });
        }
    };

    rsx! {
        div {
            class: "page",
            h3 { "Edit Exercise Log" }
            if loaded() {
                if let Some(current) = exercise() {
                    ExerciseForm {
                        users: users(),
                        initial: Some(current),
                        submit_label: "Save Changes",
                        on_submit: handle_submit,
                    }
                } else {
                    p { class: "empty-note", "Exercise not found." }
                }
            }
        }
    }
}
