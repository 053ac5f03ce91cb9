//! In-memory transport for exercising the client layer without a server.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;

use crate::error::SyncError;
use crate::event::{Envelope, SyncEvent, UpdateEvent, WorkerMessage};
use crate::models::{Exercise, User};
use crate::transport::WorkerTransport;

/// Transport calls recorded by [`MockWorker`], for asserting on the wire
/// traffic a scenario produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Calls {
    pub subscribe_message: usize,
    pub unsubscribe_message: usize,
    pub subscribe_updates: Vec<Vec<String>>,
    pub unsubscribe_updates: Vec<Vec<String>>,
    pub add_exercise: Vec<Exercise>,
    pub update_exercise: Vec<Exercise>,
    pub delete_exercise: Vec<String>,
}

#[derive(Default)]
struct MockState {
    users: Vec<User>,
    exercises: Vec<Exercise>,
    log: Vec<Envelope>,
    next_seq: u64,
    calls: Calls,
    fail_next: Option<String>,
}

/// Scriptable in-memory worker. Mutations record their arguments; pushed
/// events sit in a sequenced log that `poll_events` serves by cursor.
/// The mock never emits events on its own — deletion convergence has to
/// come from an explicitly pushed notification, like the real worker.
#[derive(Clone, Default)]
pub struct MockWorker {
    state: Rc<RefCell<MockState>>,
}

impl MockWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exercises(exercises: Vec<Exercise>) -> Self {
        let worker = Self::new();
        worker.state.borrow_mut().exercises = exercises;
        worker
    }

    pub fn push_event(&self, event: SyncEvent) {
        let mut state = self.state.borrow_mut();
        state.next_seq += 1;
        let seq = state.next_seq;
        state.log.push(Envelope { seq, event });
    }

    pub fn push_message(&self, exercise: Exercise) {
        self.push_event(SyncEvent::Message(WorkerMessage::ExerciseAdded(exercise)));
    }

    pub fn push_update(&self, target: Exercise, deleted: bool) {
        self.push_event(SyncEvent::Update(UpdateEvent { target, deleted }));
    }

    /// Make the next transport call fail with `SyncError::Transport`.
    pub fn fail_next(&self, message: &str) {
        self.state.borrow_mut().fail_next = Some(message.to_string());
    }

    pub fn calls(&self) -> Calls {
        self.state.borrow().calls.clone()
    }

    fn check_fail(&self) -> Result<(), SyncError> {
        match self.state.borrow_mut().fail_next.take() {
            Some(message) => Err(SyncError::Transport(message)),
            None => Ok(()),
        }
    }
}

impl WorkerTransport for MockWorker {
    async fn get_users(&self) -> Result<Vec<User>, SyncError> {
        self.check_fail()?;
        Ok(self.state.borrow().users.clone())
    }

    async fn add_user(&self, username: &str) -> Result<User, SyncError> {
        self.check_fail()?;
        let user = User::new(username);
        self.state.borrow_mut().users.push(user.clone());
        Ok(user)
    }

    async fn get_exercises(&self) -> Result<Vec<Exercise>, SyncError> {
        self.check_fail()?;
        Ok(self.state.borrow().exercises.clone())
    }

    async fn get_exercise(&self, primary_key: &str) -> Result<Option<Exercise>, SyncError> {
        self.check_fail()?;
        Ok(self
            .state
            .borrow()
            .exercises
            .iter()
            .find(|e| e.primary_key == primary_key)
            .cloned())
    }

    async fn add_exercise(&self, exercise: Exercise) -> Result<Exercise, SyncError> {
        self.check_fail()?;
        let mut state = self.state.borrow_mut();
        state.calls.add_exercise.push(exercise.clone());
        state.exercises.push(exercise.clone());
        Ok(exercise)
    }

    async fn update_exercise(&self, exercise: Exercise) -> Result<Exercise, SyncError> {
        self.check_fail()?;
        let mut state = self.state.borrow_mut();
        state.calls.update_exercise.push(exercise.clone());
        if let Some(existing) = state
            .exercises
            .iter_mut()
            .find(|e| e.primary_key == exercise.primary_key)
        {
            *existing = exercise.clone();
        }
        Ok(exercise)
    }

    async fn delete_exercise(&self, primary_key: &str) -> Result<(), SyncError> {
        self.check_fail()?;
        let mut state = self.state.borrow_mut();
        state.calls.delete_exercise.push(primary_key.to_string());
        state.exercises.retain(|e| e.primary_key != primary_key);
        Ok(())
    }

    async fn subscribe_message(&self) -> Result<(), SyncError> {
        self.check_fail()?;
        self.state.borrow_mut().calls.subscribe_message += 1;
        Ok(())
    }

    async fn unsubscribe_message(&self) -> Result<(), SyncError> {
        self.check_fail()?;
        self.state.borrow_mut().calls.unsubscribe_message += 1;
        Ok(())
    }

    async fn subscribe_updates(&self, keys: &[String]) -> Result<(), SyncError> {
        self.check_fail()?;
        self.state
            .borrow_mut()
            .calls
            .subscribe_updates
            .push(keys.to_vec());
        Ok(())
    }

    async fn unsubscribe_updates(&self, keys: &[String]) -> Result<(), SyncError> {
        self.check_fail()?;
        self.state
            .borrow_mut()
            .calls
            .unsubscribe_updates
            .push(keys.to_vec());
        Ok(())
    }

    async fn poll_events(&self, after: u64) -> Result<Vec<Envelope>, SyncError> {
        self.check_fail()?;
        Ok(self
            .state
            .borrow()
            .log
            .iter()
            .filter(|envelope| envelope.seq > after)
            .cloned()
            .collect())
    }
}

/// Fixture exercise owned by a fixture user.
pub fn exercise(key: &str, description: &str) -> Exercise {
    Exercise {
        primary_key: key.to_string(),
        user: User {
            primary_key: "u1".to_string(),
            username: "scott".to_string(),
        },
        description: description.to_string(),
        duration_minutes: 25,
        date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
    }
}
