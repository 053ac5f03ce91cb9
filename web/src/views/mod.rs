mod exercises_list;
pub use exercises_list::ExercisesList;

mod create_exercise;
pub use create_exercise::CreateExercise;

mod edit_exercise;
pub use edit_exercise::EditExercise;

mod create_user;
pub use create_user::CreateUser;

/// Worker primary key every view talks to. A single worker instance
/// serves all clients of the app.
pub(crate) const WORKER_KEY: &str = "default";

/// Each view builds its own worker handle instead of reading one from
/// ambient context, so the dependency is visible at the view boundary.
pub(crate) fn make_worker() -> api::RemoteWorker {
    api::RemoteWorker::connect(WORKER_KEY)
}

pub(crate) async fn sleep(duration: std::time::Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}
