//! Server-resident exercise tracker worker.
//!
//! A worker is the canonical owner of users and exercises, addressed by a
//! primary key (the app uses `"default"`). [`get`] hands out the process-wide
//! instance for a key, creating it on first use. Every mutation appends an
//! event to a capped per-worker log; clients poll the log with a sequence
//! cursor and receive only what their subscriptions cover.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use sync::{Envelope, Exercise, SyncEvent, UpdateEvent, User, WorkerMessage};

/// Upper bound on retained envelopes per worker. The log is a delivery
/// buffer, not storage; anything older is gone.
const EVENT_LOG_CAP: usize = 1024;

/// Clients idle longer than this are dropped from the subscription table.
const CLIENT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

struct ClientRecord {
    message: bool,
    entities: HashSet<String>,
    last_seen: Instant,
}

impl ClientRecord {
    fn new() -> Self {
        Self {
            message: false,
            entities: HashSet::new(),
            last_seen: Instant::now(),
        }
    }

    fn wants(&self, event: &SyncEvent) -> bool {
        match event {
            SyncEvent::Message(_) => self.message,
            SyncEvent::Update(_) => self.entities.contains(event.target_key()),
        }
    }
}

#[derive(Default)]
struct TrackerState {
    users: Vec<User>,
    exercises: BTreeMap<String, Exercise>,
    log: VecDeque<Envelope>,
    next_seq: u64,
    clients: HashMap<String, ClientRecord>,
}

impl TrackerState {
    fn push_event(&mut self, event: SyncEvent) {
        self.next_seq += 1;
        self.log.push_back(Envelope {
            seq: self.next_seq,
            event,
        });
        if self.log.len() > EVENT_LOG_CAP {
            self.log.pop_front();
        }
    }

    fn client(&mut self, client: &str) -> &mut ClientRecord {
        self.clients
            .entry(client.to_string())
            .or_insert_with(ClientRecord::new)
    }

    fn prune_idle(&mut self) {
        let now = Instant::now();
        self.clients
            .retain(|_, record| now.duration_since(record.last_seen) < CLIENT_IDLE_TIMEOUT);
    }
}

/// Canonical exercise tracker state for one worker primary key.
pub struct ExerciseTracker {
    primary_key: String,
    state: Mutex<TrackerState>,
}

impl ExerciseTracker {
    fn new(primary_key: &str) -> Self {
        Self {
            primary_key: primary_key.to_string(),
            state: Mutex::new(TrackerState::default()),
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn add_user(&self, username: &str) -> Result<User, String> {
        let username = username.trim();
        if username.is_empty() {
            return Err("username is required".to_string());
        }
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username == username) {
            return Err(format!("user '{username}' already exists"));
        }
        let user = User::new(username);
        state.users.push(user.clone());
        tracing::info!(worker = %self.primary_key, username = %user.username, "user created");
        Ok(user)
    }

    pub fn exercises(&self) -> Vec<Exercise> {
        self.state.lock().unwrap().exercises.values().cloned().collect()
    }

    pub fn exercise(&self, primary_key: &str) -> Option<Exercise> {
        self.state.lock().unwrap().exercises.get(primary_key).cloned()
    }

    pub fn add_exercise(&self, exercise: Exercise) -> Result<Exercise, String> {
        validate(&exercise)?;
        let mut state = self.state.lock().unwrap();
        if !state
            .users
            .iter()
            .any(|u| u.primary_key == exercise.user.primary_key)
        {
            return Err(format!("unknown user '{}'", exercise.user.username));
        }
        if state.exercises.contains_key(&exercise.primary_key) {
            return Err(format!(
                "exercise '{}' already exists",
                exercise.primary_key
            ));
        }
        state
            .exercises
            .insert(exercise.primary_key.clone(), exercise.clone());
        state.push_event(SyncEvent::Message(WorkerMessage::ExerciseAdded(
            exercise.clone(),
        )));
        tracing::info!(worker = %self.primary_key, key = %exercise.primary_key, "exercise added");
        Ok(exercise)
    }

    pub fn update_exercise(&self, exercise: Exercise) -> Result<Exercise, String> {
        validate(&exercise)?;
        let mut state = self.state.lock().unwrap();
        if !state.exercises.contains_key(&exercise.primary_key) {
            return Err(format!("unknown exercise '{}'", exercise.primary_key));
        }
        if !state
            .users
            .iter()
            .any(|u| u.primary_key == exercise.user.primary_key)
        {
            return Err(format!("unknown user '{}'", exercise.user.username));
        }
        state
            .exercises
            .insert(exercise.primary_key.clone(), exercise.clone());
        state.push_event(SyncEvent::Update(UpdateEvent {
            target: exercise.clone(),
            deleted: false,
        }));
        tracing::info!(worker = %self.primary_key, key = %exercise.primary_key, "exercise updated");
        Ok(exercise)
    }

    /// Delete by primary key. Deleting an absent key is a no-op so a stale
    /// row's second delete errors nowhere.
    pub fn delete_exercise(&self, primary_key: &str) -> Result<(), String> {
        let mut state = self.state.lock().unwrap();
        match state.exercises.remove(primary_key) {
            Some(removed) => {
                state.push_event(SyncEvent::Update(UpdateEvent {
                    target: removed,
                    deleted: true,
                }));
                tracing::info!(worker = %self.primary_key, key = %primary_key, "exercise deleted");
            }
            None => {
                tracing::warn!(worker = %self.primary_key, key = %primary_key, "delete of unknown exercise ignored");
            }
        }
        Ok(())
    }

    pub fn subscribe_message(&self, client: &str) {
        let mut state = self.state.lock().unwrap();
        let record = state.client(client);
        record.message = true;
        record.last_seen = Instant::now();
    }

    pub fn unsubscribe_message(&self, client: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.clients.get_mut(client) {
            record.message = false;
        }
    }

    pub fn subscribe_updates(&self, client: &str, keys: &[String]) {
        let mut state = self.state.lock().unwrap();
        let record = state.client(client);
        record.entities.extend(keys.iter().cloned());
        record.last_seen = Instant::now();
    }

    pub fn unsubscribe_updates(&self, client: &str, keys: &[String]) {
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.clients.get_mut(client) {
            for key in keys {
                record.entities.remove(key);
            }
        }
    }

    /// Events past `after` covered by this client's subscriptions, in
    /// sequence order. Touches the client's last-seen time and prunes
    /// idle clients while it is at it.
    pub fn poll_events(&self, client: &str, after: u64) -> Vec<Envelope> {
        let mut state = self.state.lock().unwrap();
        state.prune_idle();
        state.client(client).last_seen = Instant::now();
        let record = match state.clients.get(client) {
            Some(record) => record,
            None => return Vec::new(),
        };
        state
            .log
            .iter()
            .filter(|envelope| envelope.seq > after && record.wants(&envelope.event))
            .cloned()
            .collect()
    }
}

fn validate(exercise: &Exercise) -> Result<(), String> {
    if exercise.description.trim().is_empty() {
        return Err("description is required".to_string());
    }
    if exercise.duration_minutes == 0 {
        return Err("duration must be at least one minute".to_string());
    }
    Ok(())
}

/// Get or create the worker registered under `primary_key`.
pub fn get(primary_key: &str) -> Arc<ExerciseTracker> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<ExerciseTracker>>>> = OnceLock::new();
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    let mut workers = registry.lock().unwrap();
    Arc::clone(
        workers
            .entry(primary_key.to_string())
            .or_insert_with(|| Arc::new(ExerciseTracker::new(primary_key))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn exercise_for(user: &User, key: &str) -> Exercise {
        Exercise {
            primary_key: key.to_string(),
            user: user.clone(),
            description: "run".to_string(),
            duration_minutes: 30,
            date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
        }
    }

    #[test]
    fn registry_returns_the_same_instance_per_key() {
        let a = get("registry-test");
        let b = get("registry-test");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &get("registry-test-other")));
    }

    #[test]
    fn duplicate_usernames_are_rejected() {
        let worker = ExerciseTracker::new("t");
        worker.add_user("scott").unwrap();
        assert!(worker.add_user("scott").is_err());
        assert!(worker.add_user("  ").is_err());
        assert_eq!(worker.users().len(), 1);
    }

    #[test]
    fn add_requires_a_known_user_and_valid_fields() {
        let worker = ExerciseTracker::new("t");
        let stranger = User::new("nobody");
        assert!(worker.add_exercise(exercise_for(&stranger, "x")).is_err());

        let user = worker.add_user("scott").unwrap();
        let mut bad = exercise_for(&user, "x");
        bad.duration_minutes = 0;
        assert!(worker.add_exercise(bad).is_err());

        worker.add_exercise(exercise_for(&user, "x")).unwrap();
        assert_eq!(worker.exercises().len(), 1);
    }

    #[test]
    fn events_are_sequenced_and_filtered_per_subscription() {
        let worker = ExerciseTracker::new("t");
        let user = worker.add_user("scott").unwrap();
        worker.subscribe_message("c1");

        worker.add_exercise(exercise_for(&user, "a")).unwrap();
        worker.add_exercise(exercise_for(&user, "b")).unwrap();
        worker.delete_exercise("a").unwrap();

        // c1 subscribed only to messages: two creation messages, no update.
        let seen = worker.poll_events("c1", 0);
        assert_eq!(seen.len(), 2);
        assert!(seen.windows(2).all(|w| w[0].seq < w[1].seq));

        // A cursor past both yields nothing.
        let last = seen.last().unwrap().seq;
        assert!(worker.poll_events("c1", last).is_empty());

        // c2 subscribed to entity "a" only sees its deletion.
        worker.subscribe_updates("c2", &["a".to_string()]);
        worker.delete_exercise("b").unwrap();
        let seen = worker.poll_events("c2", 0);
        assert_eq!(seen.len(), 1);
        match &seen[0].event {
            SyncEvent::Update(update) => {
                assert_eq!(update.target.primary_key, "a");
                assert!(update.deleted);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn deleting_an_absent_exercise_emits_nothing() {
        let worker = ExerciseTracker::new("t");
        worker.subscribe_updates("c", &["ghost".to_string()]);
        worker.delete_exercise("ghost").unwrap();
        assert!(worker.poll_events("c", 0).is_empty());
    }

    #[test]
    fn update_round_trips_through_the_log() {
        let worker = ExerciseTracker::new("t");
        let user = worker.add_user("scott").unwrap();
        let added = worker.add_exercise(exercise_for(&user, "a")).unwrap();

        let mut changed = added.clone();
        changed.description = "long run".to_string();
        assert!(worker.update_exercise(changed.clone()).is_ok());

        worker.subscribe_updates("c", &["a".to_string()]);
        let seen = worker.poll_events("c", 0);
        assert_eq!(seen.len(), 1);
        match &seen[0].event {
            SyncEvent::Update(update) => {
                assert_eq!(update.target.description, "long run");
                assert!(!update.deleted);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let mut ghost = added;
        ghost.primary_key = "missing".to_string();
        assert!(worker.update_exercise(ghost).is_err());
    }
}
