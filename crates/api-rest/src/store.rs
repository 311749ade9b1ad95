//! Key-value persistence for stories.
//!
//! Stories live under two kinds of keys:
//! - `story:{userId}:{storyId}` holds the full story document.
//! - `story-list:{userId}` holds an array of [`StoryMeta`] in insertion order.
//!
//! The list is a projection maintained by [`StoryRepository`] on every save and delete. Saves
//! are last-write-wins; there is no conflict detection.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use storyforge_core::transfer::ensure_finite_positions;
use storyforge_core::{Story, StoryError, StoryMeta};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read store file: {0}")]
    Read(std::io::Error),
    #[error("failed to write store file: {0}")]
    Write(std::io::Error),
    #[error("failed to encode stored value: {0}")]
    Encoding(serde_json::Error),
    #[error("story cannot be stored: {0}")]
    InvalidStory(StoryError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Minimal JSON key-value store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;
    /// Removing an absent key succeeds.
    async fn del(&self, key: &str) -> StoreResult<()>;
}

/// Process-local store. Everything is lost on restart.
#[derive(Default)]
pub struct InMemoryKv {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKv {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The whole file is loaded on open and rewritten on every mutation while the write lock is
/// held, so the file always reflects the last completed mutation. Each rewrite goes to a
/// sibling `.tmp` file that is then renamed over the original, so a crash mid-write leaves the
/// previous contents intact.
pub struct JsonFileKv {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Value>>,
}

impl JsonFileKv {
    /// Opens `path`, starting empty if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file exists but cannot be read, and
    /// [`StoreError::Encoding`] if it is not a JSON object.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text).map_err(StoreError::Encoding)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Read(e)),
        };
        tracing::info!(path = %path.display(), keys = entries.len(), "opened JSON file store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn scratch_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("store"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn persist(&self, entries: &BTreeMap<String, Value>) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(entries).map_err(StoreError::Encoding)?;
        let scratch = self.scratch_path();
        tokio::fs::write(&scratch, text)
            .await
            .map_err(StoreError::Write)?;
        tokio::fs::rename(&scratch, &self.path)
            .await
            .map_err(StoreError::Write)
    }
}

#[async_trait]
impl KvStore for JsonFileKv {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_owned(), value);
        self.persist(&entries).await
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Story repository
// ============================================================================

pub fn story_key(user_id: &str, story_id: &str) -> String {
    format!("story:{user_id}:{story_id}")
}

pub fn list_key(user_id: &str) -> String {
    format!("story-list:{user_id}")
}

/// Story operations on top of a [`KvStore`], scoped per user.
#[derive(Clone)]
pub struct StoryRepository {
    kv: Arc<dyn KvStore>,
    // Serialises read-modify-write of the list projection within this process.
    list_guard: Arc<Mutex<()>>,
}

impl StoryRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            list_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Upserts the story and its list entry. A story already listed keeps its list position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidStory`] without writing anything if a scene position is not
    /// finite.
    pub async fn save(&self, user_id: &str, story: &Story) -> StoreResult<()> {
        ensure_finite_positions(story).map_err(StoreError::InvalidStory)?;
        let value = serde_json::to_value(story).map_err(StoreError::Encoding)?;

        // Held across both writes so a concurrent delete cannot land between them.
        let _guard = self.list_guard.lock().await;
        self.kv.set(&story_key(user_id, &story.id), value).await?;
        let mut list = self.list(user_id).await?;
        let meta = story.meta();
        match list.iter_mut().find(|m| m.id == meta.id) {
            Some(existing) => *existing = meta,
            None => list.push(meta),
        }
        self.write_list(user_id, &list).await
    }

    /// The user's story list, empty if they never saved anything.
    pub async fn list(&self, user_id: &str) -> StoreResult<Vec<StoryMeta>> {
        match self.kv.get(&list_key(user_id)).await? {
            Some(value) => serde_json::from_value(value).map_err(StoreError::Encoding),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, user_id: &str, story_id: &str) -> StoreResult<Option<Story>> {
        match self.kv.get(&story_key(user_id, story_id)).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(StoreError::Encoding),
            None => Ok(None),
        }
    }

    /// Removes the story and its list entry. Deleting an unknown id succeeds.
    pub async fn delete(&self, user_id: &str, story_id: &str) -> StoreResult<()> {
        let _guard = self.list_guard.lock().await;
        self.kv.del(&story_key(user_id, story_id)).await?;

        let mut list = self.list(user_id).await?;
        list.retain(|m| m.id != story_id);
        self.write_list(user_id, &list).await
    }

    async fn write_list(&self, user_id: &str, list: &[StoryMeta]) -> StoreResult<()> {
        let value = serde_json::to_value(list).map_err(StoreError::Encoding)?;
        self.kv.set(&list_key(user_id), value).await
    }
}
