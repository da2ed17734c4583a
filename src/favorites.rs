//! Locally persisted list of favorite meal ids.
//!
//! The list is kept as a JSON array of ids under a single key of a
//! [`FavoritesStore`]. It is read once when [`Favorites::open`] runs and
//! written back on every toggle.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::client::{Fetched, MealDbClient};
use crate::model::MealPreview;
use crate::ApiError;

/// Key under which the id list is stored.
pub const FAVORITES_KEY: &str = "chef_smart_favorites";

/// Minimal string key-value persistence.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, ApiError>;

    async fn save(&self, key: &str, value: &str) -> Result<(), ApiError>;
}

/// Process-local store, nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoritesStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, ApiError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ApiError::Store(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ApiError::Store(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file (`{"key": "value", ...}`).
///
/// A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, ApiError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FavoritesStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(&entries)?;

        // Replace the file in one step so a failed write leaves the old one whole.
        let staging = self.staging_path();
        tokio::fs::write(&staging, content).await?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// The user's favorite meal ids, in the order they were added.
pub struct Favorites<S: FavoritesStore> {
    store: S,
    ids: Vec<String>,
}

impl<S: FavoritesStore> Favorites<S> {
    /// Read the stored list. An unreadable store yields an empty list.
    pub async fn open(store: S) -> Self {
        let ids = match store.load(FAVORITES_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!("Failed to parse favorites: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load favorites: {}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} favorites", ids.len());

        Self { store, ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_favorite(&self, meal_id: &str) -> bool {
        self.ids.iter().any(|id| id == meal_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add or remove `meal_id` and write the list back.
    ///
    /// Returns whether the meal is a favorite afterwards. A failed write is
    /// logged; the in-memory list keeps the change.
    pub async fn toggle(&mut self, meal_id: &str) -> bool {
        let now_favorite = if self.is_favorite(meal_id) {
            self.ids.retain(|id| id != meal_id);
            false
        } else {
            self.ids.push(meal_id.to_string());
            true
        };

        match serde_json::to_string(&self.ids) {
            Ok(raw) => {
                if let Err(e) = self.store.save(FAVORITES_KEY, &raw).await {
                    warn!("Failed to save favorites: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode favorites: {}", e),
        }

        now_favorite
    }

    /// Resolve the favorites into previews through `client`.
    pub async fn previews(&self, client: &MealDbClient) -> Fetched<Vec<MealPreview>> {
        client.favorite_previews(&self.ids).await
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_toggle_adds_and_removes() {
        let mut favorites = Favorites::open(MemoryStore::new()).await;
        assert!(favorites.is_empty());

        assert!(favorites.toggle("52772").await);
        assert!(favorites.toggle("52940").await);
        assert!(favorites.is_favorite("52772"));
        assert_eq!(favorites.ids(), ["52772", "52940"]);

        assert!(!favorites.toggle("52772").await);
        assert!(!favorites.is_favorite("52772"));
        assert_eq!(favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_writes_through() {
        let mut favorites = Favorites::open(MemoryStore::new()).await;
        favorites.toggle("1").await;
        favorites.toggle("2").await;

        let store = favorites.into_store();
        let raw = store.load(FAVORITES_KEY).await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#"["1","2"]"#));
    }

    #[tokio::test]
    async fn test_corrupt_entry_yields_empty_list() {
        let store = MemoryStore::new();
        store.save(FAVORITES_KEY, "{not json").await.unwrap();

        let favorites = Favorites::open(store).await;
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("favorites.json");

        let mut favorites = Favorites::open(FileStore::new(&path)).await;
        favorites.toggle("52772").await;
        favorites.toggle("53013").await;
        drop(favorites);

        let reopened = Favorites::open(FileStore::new(&path)).await;
        assert_eq!(reopened.ids(), ["52772", "53013"]);
    }

    #[tokio::test]
    async fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));

        store.save("theme", "dark").await.unwrap();
        store.save(FAVORITES_KEY, "[]").await.unwrap();

        assert_eq!(store.load("theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(store.load("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_replaces_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::new(&path);

        store.save("theme", "dark").await.unwrap();
        // A staging file left behind by an interrupted save is overwritten.
        std::fs::write(dir.path().join("store.json.tmp"), "{\"theme\": ").unwrap();
        store.save(FAVORITES_KEY, "[\"52772\"]").await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec!["store.json"]);
        assert_eq!(store.load("theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(
            store.load(FAVORITES_KEY).await.unwrap().as_deref(),
            Some("[\"52772\"]")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(FAVORITES_KEY).await.unwrap(), None);
    }
}
