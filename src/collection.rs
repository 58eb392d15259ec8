//! Persisted per-card collected/foil state.
//!
//! The blob store is an opaque key-value surface: one JSON object keyed by
//! set code, each value a map from card identity to `{collected, foil}`.
//! A legacy flat schema (identity mapped directly to a bool or to the pair,
//! with no set nesting) is detected on load and migrated once by
//! attributing every entry to the default set code.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// BlobStore
// ---------------------------------------------------------------------------

/// Opaque blob persistence. Load/save whole-document; the schema above is
/// the caller's contract, not the store's.
pub trait BlobStore: Send {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, blob: &str) -> Result<()>;
}

/// File-backed store under a data directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create the data directory if needed; the blob lives in
    /// `collection.json` inside it.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            path: dir.as_ref().join("collection.json"),
        })
    }
}

impl BlobStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    /// Write to a temp file and rename, so an interrupted save never
    /// leaves a corrupt blob behind.
    fn save(&self, blob: &str) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-memory store with failure injection. Cloning shares the blob, so a
/// test can hold a handle while the [`CollectionStore`] owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<String>>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: &str) -> Self {
        let store = Self::default();
        *store.blob.lock().unwrap() = Some(blob.to_string());
        store
    }

    /// Make every subsequent save fail with an IO error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().unwrap().clone()
    }
}

impl BlobStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.blob.lock().unwrap().clone())
    }

    fn save(&self, blob: &str) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("save disabled").into());
        }
        *self.blob.lock().unwrap() = Some(blob.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CollectionEntry
// ---------------------------------------------------------------------------

/// Per-card ownership state. `foil` is only meaningful while `collected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub collected: bool,
    pub foil: bool,
}

type Entries = HashMap<String, HashMap<String, CollectionEntry>>;

// ---------------------------------------------------------------------------
// CollectionStore
// ---------------------------------------------------------------------------

/// In-memory collection state over a [`BlobStore`].
///
/// Every mutation attempts a save; save failures are logged and swallowed,
/// leaving the in-memory state authoritative (but unpersisted) for the
/// rest of the session.
pub struct CollectionStore {
    entries: Entries,
    store: Box<dyn BlobStore>,
    default_set: String,
}

impl CollectionStore {
    /// Load state from the store, migrating the legacy flat schema when
    /// detected. Load or parse failures are logged and yield empty state.
    pub fn load(store: Box<dyn BlobStore>, default_set: &str) -> Self {
        let mut cs = Self {
            entries: Entries::new(),
            store,
            default_set: default_set.to_string(),
        };
        match cs.store.load() {
            Ok(Some(blob)) => cs.ingest(&blob),
            Ok(None) => {}
            Err(e) => log::warn!("failed to load collection state: {}", e),
        }
        cs
    }

    fn ingest(&mut self, blob: &str) {
        let value: serde_json::Value = match serde_json::from_str(blob) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("corrupt collection blob, starting empty: {}", e);
                return;
            }
        };
        if is_legacy(&value) {
            self.entries = migrate_legacy(&value, &self.default_set);
            log::warn!(
                "migrated legacy collection schema to set {:?}",
                self.default_set
            );
            // Persist the new schema immediately so migration runs once.
            self.persist();
        } else {
            match serde_json::from_value(value) {
                Ok(entries) => self.entries = entries,
                Err(e) => log::warn!("unreadable collection schema, starting empty: {}", e),
            }
        }
    }

    fn persist(&self) {
        let blob = match serde_json::to_string(&self.entries) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("failed to serialize collection state: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save(&blob) {
            log::warn!("failed to persist collection state: {}", e);
        }
    }

    /// Mark a card collected or not. Uncollecting resets the foil flag in
    /// the same operation. Returns the updated entry.
    pub fn set_collected(&mut self, set_code: &str, card_id: &str, collected: bool) -> CollectionEntry {
        let entry = self
            .entries
            .entry(set_code.to_string())
            .or_default()
            .entry(card_id.to_string())
            .or_default();
        entry.collected = collected;
        if !collected {
            entry.foil = false;
        }
        let updated = *entry;
        self.persist();
        updated
    }

    /// Set the foil flag. A no-op while the card is uncollected: stored
    /// state is left untouched and nothing is persisted.
    pub fn set_foil(&mut self, set_code: &str, card_id: &str, foil: bool) -> CollectionEntry {
        let current = self.entry(set_code, card_id);
        if !current.collected {
            return current;
        }
        let entry = self
            .entries
            .entry(set_code.to_string())
            .or_default()
            .entry(card_id.to_string())
            .or_default();
        entry.foil = foil;
        let updated = *entry;
        self.persist();
        updated
    }

    pub fn entry(&self, set_code: &str, card_id: &str) -> CollectionEntry {
        self.entries
            .get(set_code)
            .and_then(|m| m.get(card_id))
            .copied()
            .unwrap_or_default()
    }

    /// Number of collected cards recorded for a set.
    pub fn collected_count(&self, set_code: &str) -> usize {
        self.entries
            .get(set_code)
            .map(|m| m.values().filter(|e| e.collected).count())
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Legacy schema detection and migration
// ---------------------------------------------------------------------------

/// The legacy schema mapped card identities directly to a bool or to the
/// `{collected, foil}` pair, with no set-code nesting. Detect it by the
/// shape of top-level values.
fn is_legacy(value: &serde_json::Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    map.values().any(|v| {
        v.is_boolean()
            || v.as_object()
                .is_some_and(|o| o.get("collected").is_some_and(|c| c.is_boolean()))
    })
}

fn migrate_legacy(value: &serde_json::Value, default_set: &str) -> Entries {
    let mut inner: HashMap<String, CollectionEntry> = HashMap::new();
    if let Some(map) = value.as_object() {
        for (card_id, v) in map {
            let entry = match v {
                serde_json::Value::Bool(b) => CollectionEntry {
                    collected: *b,
                    foil: false,
                },
                serde_json::Value::Object(o) => {
                    let collected = o
                        .get("collected")
                        .and_then(|c| c.as_bool())
                        .unwrap_or(false);
                    let foil =
                        collected && o.get("foil").and_then(|f| f.as_bool()).unwrap_or(false);
                    CollectionEntry { collected, foil }
                }
                _ => continue,
            };
            inner.insert(card_id.clone(), entry);
        }
    }
    let mut entries = Entries::new();
    entries.insert(default_set.to_string(), inner);
    entries
}
