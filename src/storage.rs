/// List persistence: the saved-list slot and file export/import
///
/// This module provides an async trait for the key-value store that keeps the
/// raw input text, with in-memory and folder-backed implementations, and the
/// helpers used to move a list in and out of a text file.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[cfg(feature = "tokio-runtime")]
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Name of the slot the raw input is saved under
pub const DEFAULT_SLOT: &str = "wallNamePickerList";

/// File name offered when exporting. The content is newline-separated.
pub const EXPORT_FILE_NAME: &str = "wall_name_picker_list.csv";

/// Error types for list storage
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Unavailable(String),
    Io(String),
    InvalidSlot(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StoreError::Io(msg) => write!(f, "IO error: {}", msg),
            StoreError::InvalidSlot(slot) => write!(f, "Invalid slot name: {}", slot),
        }
    }
}

impl std::error::Error for StoreError {}

/// Async trait for a string key-value store
///
/// Implementations only need to hold one value per slot; the picker uses a
/// single slot.
#[async_trait(?Send)]
pub trait ListStore {
    /// Read a slot, `None` if nothing has been saved there
    async fn get(&self, slot: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a slot
    async fn set(&self, slot: &str, value: &str) -> Result<(), StoreError>;
}

/// Folder-backed store
///
/// Each slot is a `<slot>.txt` file in the base directory, which is created on
/// first save.
///
/// Only available with the `tokio-runtime` feature (not on WASM).
#[cfg(feature = "tokio-runtime")]
#[derive(Debug, Clone)]
pub struct FolderStore {
    base_path: PathBuf,
}

#[cfg(feature = "tokio-runtime")]
impl FolderStore {
    /// Create a new FolderStore rooted at `base_path`
    ///
    /// # Example
    /// ```no_run
    /// use wall_picker::storage::FolderStore;
    /// use std::path::PathBuf;
    ///
    /// let store = FolderStore::new(PathBuf::from("./.wall-picker"));
    /// ```
    pub fn new(base_path: PathBuf) -> Self {
        FolderStore { base_path }
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StoreError> {
        // Keep slot names inside the base directory
        let sanitized = slot.replace("..", "").replace(['/', '\\'], "");
        if sanitized.is_empty() {
            return Err(StoreError::InvalidSlot(slot.to_string()));
        }
        Ok(self.base_path.join(format!("{}.txt", sanitized)))
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait(?Send)]
impl ListStore for FolderStore {
    async fn get(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(slot)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    async fn set(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(slot)?;
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::write(&path, value)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

/// In-memory store
///
/// Useful for testing and for hosts with no persistent storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Create a new empty InMemoryStore
    ///
    /// # Example
    /// ```
    /// use wall_picker::storage::InMemoryStore;
    ///
    /// let store = InMemoryStore::new();
    /// assert!(!store.contains("wallNamePickerList"));
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a slot holds a value
    pub fn contains(&self, slot: &str) -> bool {
        self.slots
            .read()
            .map(|slots| slots.contains_key(slot))
            .unwrap_or(false)
    }

    /// Remove a slot, returning whether it existed
    pub fn remove(&self, slot: &str) -> bool {
        self.slots
            .write()
            .map(|mut slots| slots.remove(slot).is_some())
            .unwrap_or(false)
    }
}

#[async_trait(?Send)]
impl ListStore for InMemoryStore {
    async fn get(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(slots.get(slot).cloned())
    }

    async fn set(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}

/// A list ready to hand to a file download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// One item per line, no trailing newline
pub fn export_text(items: &[String]) -> String {
    items.join("\n")
}

/// Turn an uploaded file into raw input text.
///
/// The text is used exactly as typed input would be, apart from a leading
/// byte order mark, which text decoders drop.
pub fn import_text(file_text: &str) -> &str {
    file_text.strip_prefix('\u{feff}').unwrap_or(file_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemoryStore::new();
        assert_eq!(store.get(DEFAULT_SLOT).await, Ok(None));

        store.set(DEFAULT_SLOT, "alice\nbob").await.unwrap();
        assert!(store.contains(DEFAULT_SLOT));
        assert_eq!(
            store.get(DEFAULT_SLOT).await,
            Ok(Some("alice\nbob".to_string()))
        );

        store.set(DEFAULT_SLOT, "carol").await.unwrap();
        assert_eq!(store.get(DEFAULT_SLOT).await, Ok(Some("carol".to_string())));
    }

    #[tokio::test]
    async fn test_in_memory_store_clones_share_slots() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set("a", "1").await.unwrap();
        assert!(other.contains("a"));
        assert!(other.remove("a"));
        assert!(!store.contains("a"));
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_folder_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path().join("nested"));

        assert_eq!(store.get(DEFAULT_SLOT).await, Ok(None));
        store.set(DEFAULT_SLOT, "1-3\nzed").await.unwrap();
        assert_eq!(
            store.get(DEFAULT_SLOT).await,
            Ok(Some("1-3\nzed".to_string()))
        );
        assert!(dir.path().join("nested/wallNamePickerList.txt").exists());
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_folder_store_rejects_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FolderStore::new(dir.path().to_path_buf());
        let result = store.set("../", "x").await;
        assert!(matches!(result, Err(StoreError::InvalidSlot(_))));
    }

    #[test]
    fn test_export_joins_lines() {
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(export_text(&items), "a\nb\nc");
        assert_eq!(export_text(&[]), "");
    }

    #[test]
    fn test_import_strips_bom() {
        assert_eq!(import_text("\u{feff}x\ny"), "x\ny");
        assert_eq!(import_text("x\ny"), "x\ny");
    }
}
