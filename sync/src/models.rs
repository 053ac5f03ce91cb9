//! # Domain models mirrored from the worker
//!
//! These types cross the server-function boundary, so they are all
//! `Serialize + Deserialize`. Entities carry a string primary key; the
//! worker's copy is canonical and the client holds projections of it.
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | A registered user. Immutable once created. |
//! | [`Exercise`] | A logged exercise referencing an existing [`User`]. Constructed client-side as a value object, persisted by the worker's add call. |
//! | [`ExerciseDraft`] | Raw create/edit form fields. [`ExerciseDraft::build`] validates the required fields and produces the value object. |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A registered user, addressed by its primary key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique key addressing the user on the worker.
    pub primary_key: String,
    pub username: String,
}

impl User {
    /// Build a user value with a fresh primary key. The worker's add call
    /// makes it canonical.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            primary_key: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
        }
    }
}

/// A single logged exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique key addressing the exercise on the worker.
    pub primary_key: String,
    /// The user who logged the exercise. Must already exist on the worker.
    pub user: User,
    pub description: String,
    pub duration_minutes: u32,
    pub date: NaiveDate,
}

impl Exercise {
    /// Build an exercise value with a fresh primary key. The value only
    /// becomes canonical once the worker's add call accepts it.
    pub fn new(
        user: User,
        description: impl Into<String>,
        duration_minutes: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            primary_key: uuid::Uuid::new_v4().to_string(),
            user,
            description: description.into(),
            duration_minutes,
            date,
        }
    }
}

/// A required form field that is missing or unparseable.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DraftError {
    #[error("select a user")]
    MissingUser,
    #[error("description is required")]
    EmptyDescription,
    #[error("duration must be a positive number of minutes")]
    BadDuration,
    #[error("pick a date")]
    BadDate,
}

/// Raw form fields for a create or edit submission.
///
/// `duration` and `date` stay strings until [`build`](Self::build) so the
/// form can hold whatever the user typed; validation short-circuits before
/// any worker call happens.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExerciseDraft {
    pub user: Option<User>,
    pub description: String,
    pub duration: String,
    pub date: String,
}

impl ExerciseDraft {
    /// Validate and build a new exercise value with a fresh primary key.
    pub fn build(&self) -> Result<Exercise, DraftError> {
        let (user, description, duration, date) = self.validate()?;
        Ok(Exercise::new(user, description, duration, date))
    }

    /// Validate and build an exercise keeping an existing primary key,
    /// for edit submissions.
    pub fn build_with_key(&self, primary_key: &str) -> Result<Exercise, DraftError> {
        let (user, description, duration_minutes, date) = self.validate()?;
        Ok(Exercise {
            primary_key: primary_key.to_string(),
            user,
            description,
            duration_minutes,
            date,
        })
    }

    fn validate(&self) -> Result<(User, String, u32, NaiveDate), DraftError> {
        let user = self.user.clone().ok_or(DraftError::MissingUser)?;
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(DraftError::EmptyDescription);
        }
        let duration: u32 = self
            .duration
            .trim()
            .parse()
            .map_err(|_| DraftError::BadDuration)?;
        if duration == 0 {
            return Err(DraftError::BadDuration);
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| DraftError::BadDate)?;
        Ok((user, description, duration, date))
    }
}
