//! Appointment store
//!
//! Keeps the list of appointments in memory and persists it through an
//! [`AppointmentBackend`] after every successful mutation. Mutations are
//! serialized by an async mutex, and each one is applied to a copy that is
//! committed only after the backend accepted it.
//!
//! Appointments are identified by their `time` string, trimmed of
//! surrounding whitespace on the way in and on lookup. Times are not unique:
//! [`AppointmentStore::reschedule`] moves the first exact match, while
//! [`AppointmentStore::cancel`] removes every exact match.

mod backend;

pub use backend::{AppointmentBackend, InMemoryBackend, JsonFileBackend, StorageError};

#[cfg(test)]
pub use backend::MockAppointmentBackend;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A single scheduled appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Timestamp string, used as sort key and identifier
    #[serde(alias = "appointment_time")]
    pub time: String,
    /// Free-text description
    pub description: String,
}

impl Appointment {
    /// Create a new appointment
    #[must_use]
    pub fn new(time: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            description: description.into(),
        }
    }
}

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum AppointmentError {
    /// The request was missing a required field
    #[error("Invalid appointment data: {0}")]
    InvalidPayload(String),
    /// No appointment has the given time
    #[error("No appointment found at {time}")]
    NotFound {
        /// The time that was looked up
        time: String,
    },
    /// The backend failed to load or save
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for AppointmentError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Durable appointment list behind an injected backend
pub struct AppointmentStore<B> {
    backend: B,
    appointments: Mutex<Vec<Appointment>>,
}

impl<B: AppointmentBackend> AppointmentStore<B> {
    /// Load the current list from `backend`
    ///
    /// # Errors
    ///
    /// Returns `AppointmentError::Storage` if the backend cannot be read.
    pub async fn open(backend: B) -> Result<Self, AppointmentError> {
        let appointments = backend.load().await?;
        info!(count = appointments.len(), "Appointment store loaded");
        Ok(Self {
            backend,
            appointments: Mutex::new(appointments),
        })
    }

    /// All appointments sorted ascending by time
    ///
    /// The sort is stable, so equal times keep insertion order.
    pub async fn list(&self) -> Vec<Appointment> {
        let mut list = self.appointments.lock().await.clone();
        list.sort_by(|a, b| a.time.cmp(&b.time));
        list
    }

    /// Add a new appointment
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` for a blank time or description, or `Storage`
    /// if persisting fails.
    pub async fn schedule(
        &self,
        time: &str,
        description: &str,
    ) -> Result<Appointment, AppointmentError> {
        let time = required("time", time)?;
        let description = required("description", description)?;
        let appointment = Appointment::new(time, description);

        self.mutate(|list| {
            list.push(appointment.clone());
            Ok(())
        })
        .await?;

        info!(time = %appointment.time, "Appointment scheduled");
        Ok(appointment)
    }

    /// Move the first appointment at `old_time` to `new_time`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing is scheduled at `old_time`,
    /// `InvalidPayload` for a blank time, or `Storage` if persisting fails.
    pub async fn reschedule(
        &self,
        old_time: &str,
        new_time: &str,
    ) -> Result<Appointment, AppointmentError> {
        let old_time = old_time.trim();
        let new_time = required("new_time", new_time)?;

        let updated = self
            .mutate(|list| {
                let apt = list
                    .iter_mut()
                    .find(|apt| apt.time == old_time)
                    .ok_or_else(|| AppointmentError::NotFound {
                        time: old_time.to_string(),
                    })?;
                apt.time = new_time.to_string();
                Ok(apt.clone())
            })
            .await?;

        info!(from = old_time, to = %updated.time, "Appointment rescheduled");
        Ok(updated)
    }

    /// Remove every appointment at `time`, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing matched, or `Storage` if persisting fails.
    pub async fn cancel(&self, time: &str) -> Result<usize, AppointmentError> {
        let time = time.trim();
        let removed = self
            .mutate(|list| {
                let before = list.len();
                list.retain(|apt| apt.time != time);
                match before - list.len() {
                    0 => Err(AppointmentError::NotFound {
                        time: time.to_string(),
                    }),
                    n => Ok(n),
                }
            })
            .await?;

        info!(time, removed, "Appointments cancelled");
        Ok(removed)
    }

    /// Apply `change` to a copy, persist it, then commit it in memory.
    ///
    /// The lock is held across the save so writers never interleave.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Vec<Appointment>) -> Result<T, AppointmentError>,
    ) -> Result<T, AppointmentError> {
        let mut guard = self.appointments.lock().await;
        let mut draft = guard.clone();

        let outcome = change(&mut draft)?;

        if let Err(e) = self.backend.save(&draft).await {
            warn!(error = %e, "Failed to persist appointments, keeping previous state");
            return Err(e.into());
        }

        *guard = draft;
        debug!(count = guard.len(), "Appointment state committed");
        Ok(outcome)
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppointmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppointmentError::InvalidPayload(format!(
            "missing field `{field}`"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_save_keeps_previous_state() -> Result<(), AppointmentError> {
        let mut backend = MockAppointmentBackend::new();
        backend
            .expect_load()
            .returning(|| Ok(vec![Appointment::new("2025-01-01 10:00", "Dentist")]));
        backend
            .expect_save()
            .returning(|_| Err(StorageError::Backend("disk full".to_string())));

        let store = AppointmentStore::open(backend).await?;

        let err = store.schedule("2025-01-02 10:00", "Gym").await.err();
        assert!(matches!(err, Some(AppointmentError::Storage(msg)) if msg.contains("disk full")));

        let err = store.cancel("2025-01-01 10:00").await.err();
        assert!(matches!(err, Some(AppointmentError::Storage(_))));

        assert_eq!(
            store.list().await,
            vec![Appointment::new("2025-01-01 10:00", "Dentist")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_not_found_skips_save() -> Result<(), AppointmentError> {
        let mut backend = MockAppointmentBackend::new();
        backend.expect_load().returning(|| Ok(Vec::new()));
        backend.expect_save().never();

        let store = AppointmentStore::open(backend).await?;

        assert!(matches!(
            store.cancel("2030-01-01 00:00").await,
            Err(AppointmentError::NotFound { .. })
        ));
        assert!(matches!(
            store.reschedule("2030-01-01 00:00", "2030-01-02 00:00").await,
            Err(AppointmentError::NotFound { time }) if time == "2030-01-01 00:00"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected() -> Result<(), AppointmentError> {
        let store = AppointmentStore::open(InMemoryBackend::new()).await?;

        assert!(matches!(
            store.schedule("   ", "Dentist").await,
            Err(AppointmentError::InvalidPayload(_))
        ));
        assert!(matches!(
            store.schedule("2025-01-01 10:00", "").await,
            Err(AppointmentError::InvalidPayload(_))
        ));
        assert!(store.list().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_padded_time_matches_stored_time() -> Result<(), AppointmentError> {
        let store = AppointmentStore::open(InMemoryBackend::new()).await?;
        store.schedule("2025-01-01 10:00 ", "Dentist").await?;
        store.schedule("2025-01-02 09:00", "Gym").await?;

        let moved = store.reschedule(" 2025-01-01 10:00", "2025-01-03 10:00").await?;
        assert_eq!(moved.time, "2025-01-03 10:00");

        assert_eq!(store.cancel("2025-01-02 09:00 ").await?, 1);
        assert_eq!(
            store.list().await,
            vec![Appointment::new("2025-01-03 10:00", "Dentist")]
        );
        Ok(())
    }

    #[test]
    fn test_legacy_key_is_accepted() -> Result<(), serde_json::Error> {
        let apt: Appointment = serde_json::from_str(
            r#"{"appointment_time": "2025-01-01 10:00", "description": "Dentist"}"#,
        )?;
        assert_eq!(apt.time, "2025-01-01 10:00");
        Ok(())
    }
}
