use dioxus::prelude::*;
use sync::Exercise;

/// Table of logged exercises with per-row edit/delete actions.
///
/// Pure presentation: the parent owns the collection and the row actions
/// report the target's primary key back through the callbacks.
#[component]
pub fn ExerciseTable(
    exercises: Vec<Exercise>,
    on_edit: EventHandler<String>,
    on_delete: EventHandler<String>,
) -> Element {
    rsx! {
        table {
            class: "exercise-table",
            thead {
                tr {
                    th { "Username" }
                    th { "Description" }
                    th { "Duration" }
                    th { "Date" }
                    th { "Actions" }
                }
            }
            tbody {
                for exercise in &exercises {
                    ExerciseRow {
                        key: "{exercise.primary_key}",
                        exercise: exercise.clone(),
                        on_edit,
                        on_delete,
                    }
                }
            }
        }
    }
}

#[component]
fn ExerciseRow(
    exercise: Exercise,
    on_edit: EventHandler<String>,
    on_delete: EventHandler<String>,
) -> Element {
    let edit_key = exercise.primary_key.clone();
    let delete_key = exercise.primary_key.clone();
    rsx! {
        tr {
            td { "{exercise.user.username}" }
            td { "{exercise.description}" }
            td { "{exercise.duration_minutes} minutes" }
            td { "{exercise.date}" }
            td {
                class: "row-actions",
                button {
                    class: "link-button",
                    onclick: move |_| on_edit.call(edit_key.clone()),
                    "edit"
                }
                " | "
                button {
                    class: "link-button",
                    onclick: move |_| on_delete.call(delete_key.clone()),
                    "delete"
                }
            }
        }
    }
}
