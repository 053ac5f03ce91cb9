//! Local projection of the worker's exercise collection.

use std::collections::BTreeMap;

use crate::event::{SyncEvent, UpdateEvent, WorkerMessage};
use crate::models::Exercise;

/// Exercises keyed by primary key.
///
/// Both bulk fetch results and pushed events apply as upserts, so an
/// entity arriving twice (creation message racing the initial fetch) or
/// out of order converges to a single entry. Removal of an absent key is
/// a no-op. Iteration order is key order, which keeps rendering stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExerciseMirror {
    entries: BTreeMap<String, Exercise>,
}

impl ExerciseMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, primary_key: &str) -> bool {
        self.entries.contains_key(primary_key)
    }

    pub fn get(&self, primary_key: &str) -> Option<&Exercise> {
        self.entries.get(primary_key)
    }

    /// Insert or replace. Returns true when the key was new.
    pub fn upsert(&mut self, exercise: Exercise) -> bool {
        self.entries
            .insert(exercise.primary_key.clone(), exercise)
            .is_none()
    }

    pub fn upsert_all(&mut self, exercises: Vec<Exercise>) {
        for exercise in exercises {
            self.upsert(exercise);
        }
    }

    pub fn remove(&mut self, primary_key: &str) -> Option<Exercise> {
        self.entries.remove(primary_key)
    }

    /// Fold one pushed event into the projection.
    pub fn apply(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Message(WorkerMessage::ExerciseAdded(exercise)) => {
                self.upsert(exercise.clone());
            }
            SyncEvent::Update(UpdateEvent { target, deleted }) => {
                if *deleted {
                    self.remove(&target.primary_key);
                } else {
                    self.upsert(target.clone());
                }
            }
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> Vec<Exercise> {
        self.entries.values().cloned().collect()
    }
}
