//! Boundary to the server-resident worker.

use crate::error::SyncError;
use crate::event::Envelope;
use crate::models::{Exercise, User};

/// Request/response and subscription surface of a worker, as consumed by
/// the client layer.
///
/// The production implementation forwards over server functions; tests use
/// an in-memory mock. Every call may reject. Subscription calls cover only
/// the keys the caller passes; the client layer is responsible for sending
/// each key's state transition exactly once.
pub trait WorkerTransport: Clone + 'static {
    async fn get_users(&self) -> Result<Vec<User>, SyncError>;
    async fn add_user(&self, username: &str) -> Result<User, SyncError>;

    async fn get_exercises(&self) -> Result<Vec<Exercise>, SyncError>;
    async fn get_exercise(&self, primary_key: &str) -> Result<Option<Exercise>, SyncError>;
    async fn add_exercise(&self, exercise: Exercise) -> Result<Exercise, SyncError>;
    async fn update_exercise(&self, exercise: Exercise) -> Result<Exercise, SyncError>;
    async fn delete_exercise(&self, primary_key: &str) -> Result<(), SyncError>;

    async fn subscribe_message(&self) -> Result<(), SyncError>;
    async fn unsubscribe_message(&self) -> Result<(), SyncError>;
    async fn subscribe_updates(&self, keys: &[String]) -> Result<(), SyncError>;
    async fn unsubscribe_updates(&self, keys: &[String]) -> Result<(), SyncError>;

    /// Events logged after `after`, filtered to this client's
    /// subscriptions, in sequence order.
    async fn poll_events(&self, after: u64) -> Result<Vec<Envelope>, SyncError>;
}
