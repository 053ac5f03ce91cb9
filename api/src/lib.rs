//! # API crate — fullstack server functions for the exercise tracker
//!
//! Every frontend talks to the server-resident worker through the server
//! functions defined in this file. Each one is annotated with `#[get(...)]`
//! or `#[post(...)]` and compiled twice: once with the real body (behind
//! `#[cfg(feature = "server")]`) and once as a thin client stub that the
//! macro turns into an HTTP call.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`worker`] | `server` | The `ExerciseTracker` worker: canonical state, event log, per-client subscriptions, get-or-create registry |
//! | [`transport`] | — | [`RemoteWorker`], the client-side proxy implementing `sync::WorkerTransport` over these server functions |
//!
//! ## Server functions exposed here
//!
//! - **Reads**: `get_users`, `get_exercises`, `get_exercise`
//! - **Mutations**: `add_user`, `add_exercise`, `update_exercise`, `delete_exercise`
//! - **Subscriptions**: `subscribe_message`, `unsubscribe_message`,
//!   `subscribe_updates`, `unsubscribe_updates`, `poll_events`
//!
//! Subscription calls carry a client identity (a UUID minted by
//! [`RemoteWorker::connect`]) so the worker can filter the event log per
//! client when it is polled.

use dioxus::prelude::*;

mod transport;
pub use transport::RemoteWorker;

#[cfg(feature = "server")]
pub mod worker;

pub use sync::{Envelope, Exercise, User};

/// All users known to the worker.
#[cfg(feature = "server")]
#[get("/api/workers/:worker/users")]
pub async fn get_users(worker: String) -> Result<Vec<User>, ServerFnError> {
    Ok(worker::get(&worker).users())
}

#[cfg(not(feature = "server"))]
#[get("/api/workers/:worker/users")]
pub async fn get_users(worker: String) -> Result<Vec<User>, ServerFnError> {
    Ok(Vec::new())
}

/// Create a user. Rejects empty and duplicate usernames.
#[cfg(feature = "server")]
#[post("/api/users/add")]
pub async fn add_user(worker: String, username: String) -> Result<User, ServerFnError> {
    worker::get(&worker)
        .add_user(&username)
        .map_err(ServerFnError::new)
}

#[cfg(not(feature = "server"))]
#[post("/api/users/add")]
pub async fn add_user(worker: String, username: String) -> Result<User, ServerFnError> {
    Err(ServerFnError::new("server only"))
}

/// The full exercise collection.
#[cfg(feature = "server")]
#[get("/api/workers/:worker/exercises")]
pub async fn get_exercises(worker: String) -> Result<Vec<Exercise>, ServerFnError> {
    Ok(worker::get(&worker).exercises())
}

#[cfg(not(feature = "server"))]
#[get("/api/workers/:worker/exercises")]
pub async fn get_exercises(worker: String) -> Result<Vec<Exercise>, ServerFnError> {
    Ok(Vec::new())
}

/// A single exercise by primary key, if it exists.
#[cfg(feature = "server")]
#[get("/api/workers/:worker/exercises/:primary_key")]
pub async fn get_exercise(
    worker: String,
    primary_key: String,
) -> Result<Option<Exercise>, ServerFnError> {
    Ok(worker::get(&worker).exercise(&primary_key))
}

#[cfg(not(feature = "server"))]
#[get("/api/workers/:worker/exercises/:primary_key")]
pub async fn get_exercise(
    worker: String,
    primary_key: String,
) -> Result<Option<Exercise>, ServerFnError> {
    Ok(None)
}

/// Persist a client-built exercise value. Emits the creation message to
/// message subscribers.
#[cfg(feature = "server")]
#[post("/api/exercises/add")]
pub async fn add_exercise(worker: String, exercise: Exercise) -> Result<Exercise, ServerFnError> {
    worker::get(&worker)
        .add_exercise(exercise)
        .map_err(ServerFnError::new)
}

#[cfg(not(feature = "server"))]
#[post("/api/exercises/add")]
pub async fn add_exercise(worker: String, exercise: Exercise) -> Result<Exercise, ServerFnError> {
    Err(ServerFnError::new("server only"))
}

/// Replace an existing exercise. Emits an update notification to its
/// subscribers.
#[cfg(feature = "server")]
#[post("/api/exercises/update")]
pub async fn update_exercise(
    worker: String,
    exercise: Exercise,
) -> Result<Exercise, ServerFnError> {
    worker::get(&worker)
        .update_exercise(exercise)
        .map_err(ServerFnError::new)
}

#[cfg(not(feature = "server"))]
#[post("/api/exercises/update")]
pub async fn update_exercise(
    worker: String,
    exercise: Exercise,
) -> Result<Exercise, ServerFnError> {
    Err(ServerFnError::new("server only"))
}

/// Delete by primary key. Emits a `deleted: true` notification; deleting
/// an absent key is a no-op.
#[cfg(feature = "server")]
#[post("/api/exercises/delete")]
pub async fn delete_exercise(worker: String, primary_key: String) -> Result<(), ServerFnError> {
    worker::get(&worker)
        .delete_exercise(&primary_key)
        .map_err(ServerFnError::new)
}

#[cfg(not(feature = "server"))]
#[post("/api/exercises/delete")]
pub async fn delete_exercise(worker: String, primary_key: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("server only"))
}

/// Subscribe a client to the worker's creation message.
#[cfg(feature = "server")]
#[post("/api/subscriptions/message/subscribe")]
pub async fn subscribe_message(worker: String, client_id: String) -> Result<(), ServerFnError> {
    worker::get(&worker).subscribe_message(&client_id);
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/subscriptions/message/subscribe")]
pub async fn subscribe_message(worker: String, client_id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("server only"))
}

#[cfg(feature = "server")]
#[post("/api/subscriptions/message/unsubscribe")]
pub async fn unsubscribe_message(worker: String, client_id: String) -> Result<(), ServerFnError> {
    worker::get(&worker).unsubscribe_message(&client_id);
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/subscriptions/message/unsubscribe")]
pub async fn unsubscribe_message(worker: String, client_id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("server only"))
}

/// Subscribe a client to update notifications for the given entities.
#[cfg(feature = "server")]
#[post("/api/subscriptions/updates/subscribe")]
pub async fn subscribe_updates(
    worker: String,
    client_id: String,
    keys: Vec<String>,
) -> Result<(), ServerFnError> {
    worker::get(&worker).subscribe_updates(&client_id, &keys);
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/subscriptions/updates/subscribe")]
pub async fn subscribe_updates(
    worker: String,
    client_id: String,
    keys: Vec<String>,
) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("server only"))
}

#[cfg(feature = "server")]
#[post("/api/subscriptions/updates/unsubscribe")]
pub async fn unsubscribe_updates(
    worker: String,
    client_id: String,
    keys: Vec<String>,
) -> Result<(), ServerFnError> {
    worker::get(&worker).unsubscribe_updates(&client_id, &keys);
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/subscriptions/updates/unsubscribe")]
pub async fn unsubscribe_updates(
    worker: String,
    client_id: String,
    keys: Vec<String>,
) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("server only"))
}

/// Events logged after `after` that this client's subscriptions cover.
#[cfg(feature = "server")]
#[post("/api/events/poll")]
pub async fn poll_events(
    worker: String,
    client_id: String,
    after: u64,
) -> Result<Vec<Envelope>, ServerFnError> {
    Ok(worker::get(&worker).poll_events(&client_id, after))
}

#[cfg(not(feature = "server"))]
#[post("/api/events/poll")]
pub async fn poll_events(
    worker: String,
    client_id: String,
    after: u64,
) -> Result<Vec<Envelope>, ServerFnError> {
    Ok(Vec::new())
}
