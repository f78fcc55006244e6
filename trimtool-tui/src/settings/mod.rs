//! Persistent console settings: typed keys over a byte-oriented store.

mod backend;
mod sqlite;

pub use backend::SettingsBackend;
pub use sqlite::SqliteBackend;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings database error: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("settings directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),
    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
}

/// A settings key bound to its value type.
#[derive(Debug)]
pub struct Setting<T> {
    key: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Setting<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

/// Backend base URL chosen in a previous session.
pub const API_URL: Setting<String> = Setting::new("connection.api_url");
/// Batch size last used for "process now".
pub const PROCESS_LIMIT: Setting<u32> = Setting::new("dashboard.process_limit");
/// Page shown when the console last closed.
pub const LAST_PAGE: Setting<String> = Setting::new("ui.last_page");

/// Typed settings provider.
///
/// Wraps a [`SettingsBackend`] with bincode (de)serialization.
#[derive(Clone)]
pub struct SettingsProvider {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsProvider {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, setting: &Setting<T>) -> Result<Option<T>, SettingsError> {
        match self.backend.get_bytes(setting.key).await? {
            Some(bytes) => Ok(Some(
                bincode::deserialize(&bytes).map_err(SettingsError::Deserialization)?,
            )),
            None => Ok(None),
        }
    }

    pub async fn get_or<T: DeserializeOwned>(
        &self,
        setting: &Setting<T>,
        default: T,
    ) -> Result<T, SettingsError> {
        Ok(self.get(setting).await?.unwrap_or(default))
    }

    pub async fn set<T: Serialize + Sync>(&self, setting: &Setting<T>, value: &T) -> Result<(), SettingsError> {
        let bytes = bincode::serialize(value).map_err(SettingsError::Serialization)?;
        self.backend.set_bytes(setting.key, bytes).await
    }

    pub async fn delete<T>(&self, setting: &Setting<T>) -> Result<(), SettingsError> {
        self.backend.delete(setting.key).await
    }

    /// Store in the background; failures are only logged.
    pub fn save<T>(&self, setting: &'static Setting<T>, value: T)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let provider = self.clone();
        tokio::spawn(async move {
            if let Err(e) = provider.set(setting, &value).await {
                log::warn!("could not save {}: {}", setting.key, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider(dir: &tempfile::TempDir) -> SettingsProvider {
        let backend = SqliteBackend::open(dir.path().join("nested").join("settings.db"))
            .await
            .unwrap();
        SettingsProvider::new(backend)
    }

    #[tokio::test]
    async fn test_round_trip_typed_values() {
        let dir = tempfile::tempdir().unwrap();
        let settings = provider(&dir).await;

        assert_eq!(settings.get(&API_URL).await.unwrap(), None);
        assert_eq!(settings.get_or(&PROCESS_LIMIT, 500).await.unwrap(), 500);

        settings.set(&API_URL, &"http://10.0.0.5:8000".to_string()).await.unwrap();
        settings.set(&PROCESS_LIMIT, &250).await.unwrap();

        assert_eq!(
            settings.get(&API_URL).await.unwrap().as_deref(),
            Some("http://10.0.0.5:8000")
        );
        assert_eq!(settings.get_or(&PROCESS_LIMIT, 500).await.unwrap(), 250);

        settings.delete(&PROCESS_LIMIT).await.unwrap();
        assert_eq!(settings.get(&PROCESS_LIMIT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        provider(&dir)
            .await
            .set(&LAST_PAGE, &"aliases".to_string())
            .await
            .unwrap();

        let reopened = provider(&dir).await;
        assert_eq!(
            reopened.get(&LAST_PAGE).await.unwrap().as_deref(),
            Some("aliases")
        );
    }

    #[tokio::test]
    async fn test_wrong_type_is_a_deserialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = provider(&dir).await;
        settings.set(&PROCESS_LIMIT, &7).await.unwrap();

        let as_text: Setting<String> = Setting::new(PROCESS_LIMIT.key());
        assert!(matches!(
            settings.get(&as_text).await,
            Err(SettingsError::Deserialization(_))
        ));
    }
}
