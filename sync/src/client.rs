//! Client half of the worker's pub/sub surface.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::SyncError;
use crate::event::{SyncEvent, UpdateEvent, WorkerMessage};
use crate::models::Exercise;
use crate::transport::WorkerTransport;

/// Listener for `ExerciseAdded` messages.
pub type MessageHandler = Box<dyn FnMut(&Exercise)>;
/// Listener for update notifications on subscribed entities.
pub type UpdateHandler = Box<dyn FnMut(&UpdateEvent)>;

/// Subscription lifecycle of a channel. Transitions happen only at the
/// explicit subscribe/unsubscribe calls, never implicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Subscribed,
    Unsubscribed,
}

struct Inner {
    cursor: u64,
    message_state: ChannelState,
    message_handlers: Vec<MessageHandler>,
    entity_subs: BTreeSet<String>,
    update_listeners: Vec<(BTreeSet<String>, UpdateHandler)>,
}

impl Inner {
    fn new() -> Self {
        Self {
            cursor: 0,
            message_state: ChannelState::Unsubscribed,
            message_handlers: Vec::new(),
            entity_subs: BTreeSet::new(),
            update_listeners: Vec::new(),
        }
    }
}

/// Tracks message and per-entity update subscriptions against a worker and
/// dispatches polled events to the attached listeners.
///
/// The client is single-threaded UI state: handlers run on the caller's
/// task during [`pump_once`](Self::pump_once) and must not call back into
/// the client. Code that needs a follow-up subscription (say, for an
/// entity that just arrived in a message) records the key in state it
/// captures and applies it after the pump returns, the way
/// [`crate::feed::ExerciseFeed`] does.
///
/// Cloning shares the transport and all subscription state.
pub struct SyncClient<T: WorkerTransport> {
    transport: T,
    inner: Rc<RefCell<Inner>>,
}

impl<T: WorkerTransport> Clone for SyncClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: WorkerTransport> SyncClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            inner: Rc::new(RefCell::new(Inner::new())),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn message_state(&self) -> ChannelState {
        self.inner.borrow().message_state
    }

    /// Keys currently in the `Subscribed` state.
    pub fn subscribed_keys(&self) -> Vec<String> {
        self.inner.borrow().entity_subs.iter().cloned().collect()
    }

    /// Subscribe the message channel and attach a handler for
    /// `ExerciseAdded`. The transport sees the transition once; further
    /// calls only add handlers.
    pub async fn subscribe_message(
        &self,
        handler: impl FnMut(&Exercise) + 'static,
    ) -> Result<(), SyncError> {
        if self.message_state() == ChannelState::Unsubscribed {
            self.transport.subscribe_message().await?;
        }
        let mut inner = self.inner.borrow_mut();
        inner.message_state = ChannelState::Subscribed;
        inner.message_handlers.push(Box::new(handler));
        Ok(())
    }

    /// Unsubscribe the message channel and drop its handlers. No-op when
    /// already unsubscribed, so a double release never reaches the
    /// transport.
    pub async fn unsubscribe_message(&self) -> Result<(), SyncError> {
        if self.message_state() == ChannelState::Subscribed {
            self.transport.unsubscribe_message().await?;
            let mut inner = self.inner.borrow_mut();
            inner.message_state = ChannelState::Unsubscribed;
            inner.message_handlers.clear();
        }
        Ok(())
    }

    /// Move the given entities to `Subscribed`. Only keys actually
    /// transitioning are sent to the transport.
    pub async fn subscribe_updates(&self, keys: &[String]) -> Result<(), SyncError> {
        let fresh: Vec<String> = {
            let inner = self.inner.borrow();
            keys.iter()
                .filter(|key| !inner.entity_subs.contains(*key))
                .cloned()
                .collect()
        };
        if fresh.is_empty() {
            return Ok(());
        }
        self.transport.subscribe_updates(&fresh).await?;
        self.inner.borrow_mut().entity_subs.extend(fresh);
        Ok(())
    }

    /// Move the given entities to `Unsubscribed` and detach them from
    /// their listeners. Keys not currently subscribed are skipped.
    pub async fn unsubscribe_updates(&self, keys: &[String]) -> Result<(), SyncError> {
        let held: Vec<String> = {
            let inner = self.inner.borrow();
            keys.iter()
                .filter(|key| inner.entity_subs.contains(*key))
                .cloned()
                .collect()
        };
        if held.is_empty() {
            return Ok(());
        }
        self.transport.unsubscribe_updates(&held).await?;
        let mut inner = self.inner.borrow_mut();
        for key in &held {
            inner.entity_subs.remove(key);
        }
        for (keys, _) in inner.update_listeners.iter_mut() {
            for key in &held {
                keys.remove(key);
            }
        }
        inner.update_listeners.retain(|(keys, _)| !keys.is_empty());
        Ok(())
    }

    /// Attach an update listener for the given keys. The listener fires
    /// only for events whose target is currently subscribed.
    pub fn add_update_listener(
        &self,
        keys: &[String],
        handler: impl FnMut(&UpdateEvent) + 'static,
    ) {
        self.inner
            .borrow_mut()
            .update_listeners
            .push((keys.iter().cloned().collect(), Box::new(handler)));
    }

    /// Poll the transport past the current cursor and dispatch the batch
    /// in delivery order. Returns how many events reached a listener.
    pub async fn pump_once(&self) -> Result<usize, SyncError> {
        let after = self.inner.borrow().cursor;
        let batch = self.transport.poll_events(after).await?;

        let mut inner = self.inner.borrow_mut();
        let Inner {
            cursor,
            message_state,
            message_handlers,
            entity_subs,
            update_listeners,
        } = &mut *inner;

        let mut delivered = 0;
        for envelope in batch {
            if envelope.seq <= *cursor {
                // Transport redelivery; already dispatched.
                continue;
            }
            *cursor = envelope.seq;
            match envelope.event {
                SyncEvent::Message(WorkerMessage::ExerciseAdded(exercise)) => {
                    if *message_state == ChannelState::Subscribed
                        && !message_handlers.is_empty()
                    {
                        for handler in message_handlers.iter_mut() {
                            handler(&exercise);
                        }
                        delivered += 1;
                    }
                }
                SyncEvent::Update(update) => {
                    if !entity_subs.contains(&update.target.primary_key) {
                        continue;
                    }
                    let mut hit = false;
                    for (keys, handler) in update_listeners.iter_mut() {
                        if keys.contains(&update.target.primary_key) {
                            handler(&update);
                            hit = true;
                        }
                    }
                    if hit {
                        delivered += 1;
                    }
                }
            }
        }
        Ok(delivered)
    }

    /// Scoped teardown: one unsubscribe per subscribed entity, one for the
    /// message channel, then drop every listener. Safe to call on any
    /// path, any number of times.
    pub async fn release(&self) {
        let keys = self.subscribed_keys();
        if !keys.is_empty() {
            if let Err(err) = self.unsubscribe_updates(&keys).await {
                tracing::error!("failed to unsubscribe updates: {err}");
            }
        }
        if let Err(err) = self.unsubscribe_message().await {
            tracing::error!("failed to unsubscribe message channel: {err}");
        }
        let mut inner = self.inner.borrow_mut();
        inner.message_handlers.clear();
        inner.update_listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{exercise, MockWorker};

    #[tokio::test]
    async fn message_fires_only_while_subscribed() {
        let worker = MockWorker::new();
        let client = SyncClient::new(worker.clone());

        let seen = Rc::new(RefCell::new(Vec::<String>::new()));

        // Event logged before any subscription is skipped.
        worker.push_message(exercise("a", "run"));
        client.pump_once().await.unwrap();
        assert!(seen.borrow().is_empty());

        let sink = Rc::clone(&seen);
        client
            .subscribe_message(move |ex| sink.borrow_mut().push(ex.primary_key.clone()))
            .await
            .unwrap();

        worker.push_message(exercise("b", "swim"));
        client.pump_once().await.unwrap();
        assert_eq!(*seen.borrow(), vec!["b".to_string()]);

        client.unsubscribe_message().await.unwrap();
        worker.push_message(exercise("c", "row"));
        client.pump_once().await.unwrap();
        assert_eq!(*seen.borrow(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn updates_filter_on_subscription_and_listener_keys() {
        let worker = MockWorker::new();
        let client = SyncClient::new(worker.clone());

        let seen = Rc::new(RefCell::new(Vec::<(String, bool)>::new()));
        let sink = Rc::clone(&seen);

        client
            .subscribe_updates(&["a".to_string()])
            .await
            .unwrap();
        client.add_update_listener(&["a".to_string()], move |ev| {
            sink.borrow_mut()
                .push((ev.target.primary_key.clone(), ev.deleted));
        });

        // Subscribed and listened.
        worker.push_update(exercise("a", "run"), false);
        // Not subscribed at all.
        worker.push_update(exercise("b", "swim"), false);
        client.pump_once().await.unwrap();

        assert_eq!(*seen.borrow(), vec![("a".to_string(), false)]);
    }

    #[tokio::test]
    async fn per_entity_order_follows_delivery_order() {
        let worker = MockWorker::new();
        let client = SyncClient::new(worker.clone());

        let seen = Rc::new(RefCell::new(Vec::<bool>::new()));
        let sink = Rc::clone(&seen);

        client.subscribe_updates(&["a".to_string()]).await.unwrap();
        client.add_update_listener(&["a".to_string()], move |ev| {
            sink.borrow_mut().push(ev.deleted);
        });

        worker.push_update(exercise("a", "run"), false);
        worker.push_update(exercise("a", "run"), true);
        client.pump_once().await.unwrap();

        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[tokio::test]
    async fn double_transitions_reach_the_transport_once() {
        let worker = MockWorker::new();
        let client = SyncClient::new(worker.clone());

        client.subscribe_message(|_| {}).await.unwrap();
        client.subscribe_message(|_| {}).await.unwrap();
        client.unsubscribe_message().await.unwrap();
        client.unsubscribe_message().await.unwrap();

        let keys = vec!["a".to_string(), "b".to_string()];
        client.subscribe_updates(&keys).await.unwrap();
        client.subscribe_updates(&keys).await.unwrap();
        client.unsubscribe_updates(&keys).await.unwrap();
        client.unsubscribe_updates(&keys).await.unwrap();

        let calls = worker.calls();
        assert_eq!(calls.subscribe_message, 1);
        assert_eq!(calls.unsubscribe_message, 1);
        assert_eq!(calls.subscribe_updates, vec![keys.clone()]);
        assert_eq!(calls.unsubscribe_updates, vec![keys]);
    }

    #[tokio::test]
    async fn rejected_subscribe_leaves_state_unsubscribed() {
        let worker = MockWorker::new();
        let client = SyncClient::new(worker.clone());

        worker.fail_next("worker unavailable");
        assert!(client.subscribe_message(|_| {}).await.is_err());
        assert_eq!(client.message_state(), ChannelState::Unsubscribed);

        // The next attempt goes through.
        client.subscribe_message(|_| {}).await.unwrap();
        assert_eq!(client.message_state(), ChannelState::Subscribed);
        assert_eq!(worker.calls().subscribe_message, 2);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let worker = MockWorker::new();
        let client = SyncClient::new(worker.clone());

        client.subscribe_message(|_| {}).await.unwrap();
        client
            .subscribe_updates(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        client.release().await;
        client.release().await;

        let calls = worker.calls();
        assert_eq!(calls.unsubscribe_message, 1);
        assert_eq!(
            calls.unsubscribe_updates,
            vec![vec!["a".to_string(), "b".to_string()]]
        );
        assert!(client.subscribed_keys().is_empty());
    }

    #[tokio::test]
    async fn cursor_skips_redelivered_envelopes() {
        let worker = MockWorker::new();
        let client = SyncClient::new(worker.clone());

        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        client
            .subscribe_message(move |_| *sink.borrow_mut() += 1)
            .await
            .unwrap();

        worker.push_message(exercise("a", "run"));
        client.pump_once().await.unwrap();
        // The mock log retains everything; a second pump must not
        // redeliver.
        client.pump_once().await.unwrap();
        assert_eq!(*seen.borrow(), 1);
    }
}
