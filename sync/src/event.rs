//! Events the worker pushes at subscribed clients.

use serde::{Deserialize, Serialize};

use crate::models::Exercise;

/// Per-entity update notification.
///
/// `deleted: true` means the target was removed canonically and should
/// leave any local projection; otherwise the payload carries the current
/// state of the entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub target: Exercise,
    pub deleted: bool,
}

/// Domain message broadcast to message-channel subscribers. Messages are
/// delivered, not persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WorkerMessage {
    ExerciseAdded(Exercise),
}

/// Everything a worker can push at a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SyncEvent {
    Message(WorkerMessage),
    Update(UpdateEvent),
}

impl SyncEvent {
    /// Primary key of the entity this event concerns.
    pub fn target_key(&self) -> &str {
        match self {
            SyncEvent::Message(WorkerMessage::ExerciseAdded(exercise)) => &exercise.primary_key,
            SyncEvent::Update(update) => &update.target.primary_key,
        }
    }
}

/// A sequenced event as delivered by the transport.
///
/// Sequence numbers increase monotonically per worker, so per-entity
/// ordering follows delivery order. No ordering holds between an event and
/// a bulk fetch that raced it; consumers apply both as upserts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,
    pub event: SyncEvent,
}
