//! Key-value persistence slot backing the conversation store.

use crate::error::MemoryError;
use log::info;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// String-keyed slot holding one serialized blob per key.
///
/// The conversation store reads and rewrites the full blob on every
/// mutation; no partial updates are required of implementations.
pub trait KeyValueSlot: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError>;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError>;
}

/// File-backed slot storing one JSON file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileKvSlot {
    /// Root directory for slot files.
    root: PathBuf,
}

impl FileKvSlot {
    /// Create a new file-backed slot under the given root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file kv slot (root={})", root.display());
        Ok(Self { root })
    }

    /// Path to the file holding a key's blob.
    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Path to the temporary file used for atomic rewrites.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json.tmp"))
    }
}

impl KeyValueSlot for FileKvSlot {
    /// Read the key's file in full.
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut file = OpenOptions::new().read(true).open(path)?;
        let mut value = String::new();
        file.read_to_string(&mut value)?;
        Ok(Some(value))
    }

    /// Rewrite the key's file atomically via a temp file and rename.
    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError> {
        let path = self.key_path(key);
        let temp_path = self.temp_path(key);
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(value.as_bytes())?;
        }
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        std::fs::rename(temp_path, path)?;
        Ok(())
    }
}

/// In-memory slot for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryKvSlot {
    /// Stored blobs by key.
    entries: Mutex<HashMap<String, String>>,
    /// Reject all writes when set.
    fail_writes: bool,
}

impl InMemoryKvSlot {
    /// Create an empty in-memory slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that rejects every write, for fail-soft tests.
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail_writes: true,
        }
    }
}

impl KeyValueSlot for InMemoryKvSlot {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError> {
        if self.fail_writes {
            return Err(MemoryError::Slot("write rejected".to_string()));
        }
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
