//! Client-side sync layer: worker transport contract, entity mirror, and
//! the subscription machinery the views drive.

pub mod client;
pub mod event;
pub mod feed;
pub mod mirror;
pub mod models;
pub mod transport;

mod error;
pub use error::SyncError;

pub use client::{ChannelState, SyncClient};
pub use event::{Envelope, SyncEvent, UpdateEvent, WorkerMessage};
pub use feed::ExerciseFeed;
pub use mirror::ExerciseMirror;
pub use models::{DraftError, Exercise, ExerciseDraft, User};
pub use transport::WorkerTransport;

#[cfg(test)]
pub(crate) mod testing;
