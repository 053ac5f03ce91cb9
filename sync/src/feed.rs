//! Live projection of the worker's exercise collection for the list view.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::client::SyncClient;
use crate::error::SyncError;
use crate::event::UpdateEvent;
use crate::mirror::ExerciseMirror;
use crate::models::Exercise;
use crate::transport::WorkerTransport;

/// Owns a [`SyncClient`] and an [`ExerciseMirror`] and wires them the way
/// the list view needs:
///
/// - [`activate`](Self::activate) subscribes the creation message, bulk
///   fetches the collection, and subscribes updates for every known
///   entity.
/// - [`poll`](Self::poll) pumps the event channel, then picks up update
///   subscriptions for entities that arrived through the creation message
///   since the last poll.
/// - [`deactivate`](Self::deactivate) releases every subscription exactly
///   once, on any path.
///
/// Because the mirror keys by primary key, an entity arriving both in the
/// bulk fetch and in a creation message collapses to one entry regardless
/// of order.
pub struct ExerciseFeed<T: WorkerTransport> {
    client: SyncClient<T>,
    mirror: Rc<RefCell<ExerciseMirror>>,
    /// Keys seen in a creation message that still need an update
    /// subscription.
    pending: Rc<RefCell<Vec<String>>>,
    /// Keys already covered by an update listener.
    covered: RefCell<BTreeSet<String>>,
}

impl<T: WorkerTransport> ExerciseFeed<T> {
    pub fn new(transport: T) -> Self {
        Self {
            client: SyncClient::new(transport),
            mirror: Rc::new(RefCell::new(ExerciseMirror::new())),
            pending: Rc::new(RefCell::new(Vec::new())),
            covered: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn client(&self) -> &SyncClient<T> {
        &self.client
    }

    /// Subscribe, bulk fetch, and start mirroring.
    ///
    /// On failure the caller should still run [`deactivate`](Self::deactivate);
    /// it releases whatever was set up before the error.
    pub async fn activate(&self) -> Result<(), SyncError> {
        let mirror = Rc::clone(&self.mirror);
        let pending = Rc::clone(&self.pending);
        self.client
            .subscribe_message(move |exercise: &Exercise| {
                mirror.borrow_mut().upsert(exercise.clone());
                pending.borrow_mut().push(exercise.primary_key.clone());
            })
            .await?;

        let fetched = self.client.transport().get_exercises().await?;
        let keys: Vec<String> = fetched.iter().map(|e| e.primary_key.clone()).collect();
        self.mirror.borrow_mut().upsert_all(fetched);

        if !keys.is_empty() {
            self.client.subscribe_updates(&keys).await?;
            self.attach_listener(&keys);
        }
        Ok(())
    }

    /// Pump pending events, then subscribe updates for entities that came
    /// in through the creation message.
    pub async fn poll(&self) -> Result<(), SyncError> {
        self.client.pump_once().await?;

        let fresh: Vec<String> = {
            let mut pending = self.pending.borrow_mut();
            let covered = self.covered.borrow();
            pending
                .drain(..)
                .filter(|key| !covered.contains(key))
                .collect()
        };
        if !fresh.is_empty() {
            self.client.subscribe_updates(&fresh).await?;
            self.attach_listener(&fresh);
        }
        Ok(())
    }

    fn attach_listener(&self, keys: &[String]) {
        self.covered.borrow_mut().extend(keys.iter().cloned());
        let mirror = Rc::clone(&self.mirror);
        self.client
            .add_update_listener(keys, move |event: &UpdateEvent| {
                let mut mirror = mirror.borrow_mut();
                if event.deleted {
                    if mirror.remove(&event.target.primary_key).is_some() {
                        tracing::debug!(key = %event.target.primary_key, "exercise deleted");
                    }
                } else {
                    mirror.upsert(event.target.clone());
                }
            });
    }

    pub fn len(&self) -> usize {
        self.mirror.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirror.borrow().is_empty()
    }

    /// Current contents in deterministic order, for rendering.
    pub fn snapshot(&self) -> Vec<Exercise> {
        self.mirror.borrow().snapshot()
    }

    /// Delete by primary key. The entity leaves the mirror only when the
    /// deletion notification comes back, never optimistically.
    pub async fn delete(&self, primary_key: &str) -> Result<(), SyncError> {
        tracing::debug!(key = %primary_key, "deleting exercise");
        self.client.transport().delete_exercise(primary_key).await
    }

    /// Release the message channel and every entity subscription.
    /// Idempotent; a second call reaches the transport zero times.
    pub async fn deactivate(&self) {
        self.client.release().await;
        self.pending.borrow_mut().clear();
        self.covered.borrow_mut().clear();
    }
}
