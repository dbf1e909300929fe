//! Storage backends for the appointment store

use super::Appointment;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error during JSON serialization or deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Interface for appointment persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentBackend: Send + Sync {
    /// Load every persisted appointment
    async fn load(&self) -> Result<Vec<Appointment>, StorageError>;
    /// Replace the persisted list with `appointments`
    async fn save(&self, appointments: &[Appointment]) -> Result<(), StorageError>;
}

/// Backend storing the list as a pretty-printed JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Open the file at `path`, creating it with an empty list if missing
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let backend = Self {
            path: path.as_ref().to_path_buf(),
        };

        if !tokio::fs::try_exists(&backend.path).await? {
            info!(path = %backend.path.display(), "Creating empty appointments file");
            backend.save(&[]).await?;
        }

        Ok(backend)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl AppointmentBackend for JsonFileBackend {
    async fn load(&self) -> Result<Vec<Appointment>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, appointments: &[Appointment]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(appointments)?;
        let tmp = self.temp_path();

        // Rename over the target so readers never see a half-written file
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), count = appointments.len(), "Appointments saved");
        Ok(())
    }
}

/// Backend keeping appointments in process memory
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-filled with `appointments`
    #[must_use]
    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments: Mutex::new(appointments),
        }
    }
}

#[async_trait]
impl AppointmentBackend for InMemoryBackend {
    async fn load(&self) -> Result<Vec<Appointment>, StorageError> {
        self.appointments
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn save(&self, appointments: &[Appointment]) -> Result<(), StorageError> {
        let mut guard = self
            .appointments
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        *guard = appointments.to_vec();
        Ok(())
    }
}

#[async_trait]
impl<T: AppointmentBackend + ?Sized> AppointmentBackend for std::sync::Arc<T> {
    async fn load(&self) -> Result<Vec<Appointment>, StorageError> {
        (**self).load().await
    }

    async fn save(&self, appointments: &[Appointment]) -> Result<(), StorageError> {
        (**self).save(appointments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_empty_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("appointments.json");

        let backend = JsonFileBackend::open(&path).await?;
        assert!(path.exists());
        assert!(backend.load().await?.is_empty());
        assert_eq!(std::fs::read_to_string(&path)?.trim(), "[]");
        Ok(())
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("appointments.json");
        let backend = JsonFileBackend::open(&path).await?;

        backend
            .save(&[Appointment::new("2025-01-01 10:00", "Dentist")])
            .await?;

        assert!(!backend.temp_path().exists());
        let text = std::fs::read_to_string(&path)?;
        assert!(text.contains("\"time\": \"2025-01-01 10:00\""));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("appointments.json");
        std::fs::write(&path, "not json")?;

        let backend = JsonFileBackend::open(&path).await?;
        assert!(matches!(backend.load().await, Err(StorageError::Json(_))));
        Ok(())
    }
}
