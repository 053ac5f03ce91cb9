//! This crate contains all shared UI for the workspace.

mod navbar;
pub use navbar::Navbar;

mod exercise_table;
pub use exercise_table::ExerciseTable;

mod user_select;
pub use user_select::UserSelect;

mod exercise_form;
pub use exercise_form::ExerciseForm;
