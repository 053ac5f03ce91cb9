use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use sync::{Exercise, ExerciseFeed};
use ui::ExerciseTable;

use super::{make_worker, sleep};
use crate::Route;

/// How often the view pumps the worker's event channel.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[component]
pub fn ExercisesList() -> Element {
    let mut exercises = use_signal(Vec::<Exercise>::new);
    let nav = use_navigator();

    let feed = use_hook(|| Rc::new(ExerciseFeed::new(make_worker())));

    // Activate on mount, then keep pumping until the view unmounts and
    // the scope cancels the task.
    {
        let feed = Rc::clone(&feed);
        use_effect(move || {
            let feed = Rc::clone(&feed);
            spawn(async move {
                if let Err(err) = feed.activate().await {
                    tracing::error!("failed to load exercises: {err}");
                    return;
                }
                exercises.set(feed.snapshot());
                loop {
                    sleep(POLL_INTERVAL).await;
                    match feed.poll().await {
                        Ok(()) => exercises.set(feed.snapshot()),
                        Err(err) => tracing::error!("event poll failed: {err}"),
                    }
                }
            });
        });
    }

    // Release every subscription when the view goes away.
    {
        let feed = Rc::clone(&feed);
        use_drop(move || {
            dioxus::core::spawn_forever(async move {
                feed.deactivate().await;
            });
        });
    }

    let on_delete = {
        let feed = Rc::clone(&feed);
        move |primary_key: String| {
            let feed = Rc::clone(&feed);
            spawn(async move {
                // The row disappears when the deletion notification
                // arrives, not here.
                if let Err(err) = feed.delete(&primary_key).await {
                    tracing::error!("failed to delete exercise: {err}");
                }
            });
        }
    };

    rsx! {
        div {
            class: "page",
            h3 { "Logged Exercises" }
            if exercises().is_empty() {
                p { class: "empty-note", "No exercises logged yet." }
            } else {
                ExerciseTable {
                    exercises: exercises(),
                    on_edit: move |id: String| {
                        nav.push(Route::EditExercise { id });
                    },
                    on_delete: on_delete,
                }
            }
        }
    }
}
