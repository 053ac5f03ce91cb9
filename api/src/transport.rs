//! Client-side worker proxy backed by the server functions.

use sync::{Envelope, Exercise, SyncError, User, WorkerTransport};

/// Handle to a server-resident worker, addressed by primary key.
///
/// Connecting performs no network call; the first request does. Each
/// handle mints its own client identity, which the worker uses to scope
/// subscriptions, so one handle equals one subscriber. Cloning shares
/// both the worker key and the identity.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteWorker {
    worker: String,
    client: String,
}

impl RemoteWorker {
    pub fn connect(primary_key: &str) -> Self {
        Self {
            worker: primary_key.to_string(),
            client: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.worker
    }
}

/// Server-function failures all surface as rejections; the caller treats
/// transport loss and worker refusal the same way (log, no retry).
fn rejected(err: dioxus::prelude::ServerFnError) -> SyncError {
    SyncError::Rejected(err.to_string())
}

impl WorkerTransport for RemoteWorker {
    async fn get_users(&self) -> Result<Vec<User>, SyncError> {
        crate::get_users(self.worker.clone()).await.map_err(rejected)
    }

    async fn add_user(&self, username: &str) -> Result<User, SyncError> {
        crate::add_user(self.worker.clone(), username.to_string())
            .await
            .map_err(rejected)
    }

    async fn get_exercises(&self) -> Result<Vec<Exercise>, SyncError> {
        crate::get_exercises(self.worker.clone())
            .await
            .map_err(rejected)
    }

    async fn get_exercise(&self, primary_key: &str) -> Result<Option<Exercise>, SyncError> {
        crate::get_exercise(self.worker.clone(), primary_key.to_string())
            .await
            .map_err(rejected)
    }

    async fn add_exercise(&self, exercise: Exercise) -> Result<Exercise, SyncError> {
        crate::add_exercise(self.worker.clone(), exercise)
            .await
            .map_err(rejected)
    }

    async fn update_exercise(&self, exercise: Exercise) -> Result<Exercise, SyncError> {
        crate::update_exercise(self.worker.clone(), exercise)
            .await
            .map_err(rejected)
    }

    async fn delete_exercise(&self, primary_key: &str) -> Result<(), SyncError> {
        crate::delete_exercise(self.worker.clone(), primary_key.to_string())
            .await
            .map_err(rejected)
    }

    async fn subscribe_message(&self) -> Result<(), SyncError> {
        crate::subscribe_message(self.worker.clone(), self.client.clone())
            .await
            .map_err(rejected)
    }

    async fn unsubscribe_message(&self) -> Result<(), SyncError> {
        crate::unsubscribe_message(self.worker.clone(), self.client.clone())
            .await
            .map_err(rejected)
    }

    async fn subscribe_updates(&self, keys: &[String]) -> Result<(), SyncError> {
        crate::subscribe_updates(self.worker.clone(), self.client.clone(), keys.to_vec())
            .await
            .map_err(rejected)
    }

    async fn unsubscribe_updates(&self, keys: &[String]) -> Result<(), SyncError> {
        crate::unsubscribe_updates(self.worker.clone(), self.client.clone(), keys.to_vec())
            .await
            .map_err(rejected)
    }

    async fn poll_events(&self, after: u64) -> Result<Vec<Envelope>, SyncError> {
        crate::poll_events(self.worker.clone(), self.client.clone(), after)
            .await
            .map_err(rejected)
    }
}
