use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sg_core::{
    DialogueRecord, EdgeRecord, Node, ScriptBatch, ScriptId, StoryError, TranslationRecord,
};

use crate::error_map::{map_store_encode, map_store_invalid, map_store_read, map_store_write};
use crate::memory::MemoryStore;
use crate::{RecordStore, StoreStats};

pub const STORE_SCHEMA: &str = "storygraph-records.v1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    schema_version: String,
    #[serde(default)]
    scripts: Vec<ScriptId>,
    #[serde(default)]
    dialogue: Vec<DialogueRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
    #[serde(default)]
    translations: Vec<TranslationRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocumentRef<'a> {
    schema_version: &'static str,
    scripts: Vec<ScriptId>,
    dialogue: Vec<&'a DialogueRecord>,
    edges: Vec<&'a EdgeRecord>,
    translations: Vec<&'a TranslationRecord>,
}

/// A [`MemoryStore`] mirrored to one JSON document. Every mutation writes the
/// full document to a sibling temp file and renames it over the store, and
/// the in-memory state only advances once that succeeded.
///
/// With [`JsonStore::deferred`] mutations only touch memory until
/// [`RecordStore::flush`], which writes the document once.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    memory: MemoryStore,
    deferred: bool,
    dirty: bool,
}

impl JsonStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoryError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "starting empty record store");
            return Ok(Self {
                path,
                memory: MemoryStore::new(),
                deferred: false,
                dirty: false,
            });
        }

        let raw = fs::read_to_string(&path).map_err(|error| map_store_read(&path, error))?;
        let document: StoreDocument =
            serde_json::from_str(&raw).map_err(|error| map_store_invalid(&path, error))?;
        if document.schema_version != STORE_SCHEMA {
            return Err(StoryError::new(
                "STORE_SCHEMA",
                format!("Unsupported record store schema: {}", document.schema_version),
            ));
        }

        let memory = MemoryStore::restore(
            document.scripts,
            document.dialogue,
            document.edges,
            document.translations,
        )?;
        Ok(Self {
            path,
            memory,
            deferred: false,
            dirty: false,
        })
    }

    /// Opens the store at `path`, failing when it does not exist yet.
    pub fn open_existing(path: impl Into<PathBuf>) -> Result<Self, StoryError> {
        let path = path.into();
        if !path.exists() {
            return Err(StoryError::new(
                "STORE_NOT_FOUND",
                format!("Record store does not exist: {}", path.display()),
            ));
        }
        Self::open(path)
    }

    /// Holds mutations in memory until [`RecordStore::flush`]. Each memory
    /// mutation is still all-or-nothing; a batch that is never flushed is
    /// never written.
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_unflushed_changes(&self) -> bool {
        self.dirty
    }

    fn apply<T>(
        &mut self,
        change: impl FnOnce(&mut MemoryStore) -> Result<T, StoryError>,
    ) -> Result<T, StoryError> {
        if self.deferred {
            // MemoryStore validates before it mutates, so no snapshot is needed.
            let value = change(&mut self.memory)?;
            self.dirty = true;
            return Ok(value);
        }

        let mut next = self.memory.clone();
        let value = change(&mut next)?;
        persist(&self.path, &next)?;
        self.memory = next;
        Ok(value)
    }
}

fn persist(path: &Path, memory: &MemoryStore) -> Result<(), StoryError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|error| map_store_write(path, error))?;

    let document = StoreDocumentRef {
        schema_version: STORE_SCHEMA,
        scripts: memory.script_ids().collect(),
        dialogue: memory.dialogue_records().collect(),
        edges: memory.edge_records().collect(),
        translations: memory.translation_records().collect(),
    };
    let payload = serde_json::to_string(&document).map_err(map_store_encode)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.json".to_string());
    let staging = parent.join(format!(".{}.tmp", file_name));
    fs::write(&staging, payload).map_err(|error| map_store_write(&staging, error))?;
    fs::rename(&staging, path).map_err(|error| map_store_write(path, error))
}

impl RecordStore for JsonStore {
    fn commit_script(&mut self, batch: ScriptBatch) -> Result<(), StoryError> {
        self.apply(|memory| memory.commit_script(batch))
    }

    fn put_translations(
        &mut self,
        translations: Vec<TranslationRecord>,
    ) -> Result<usize, StoryError> {
        self.apply(|memory| memory.put_translations(translations))
    }

    fn edges(&self) -> Result<Vec<EdgeRecord>, StoryError> {
        self.memory.edges()
    }

    fn edges_into(&self, node: &Node) -> Result<Vec<EdgeRecord>, StoryError> {
        self.memory.edges_into(node)
    }

    fn dialogue_counts(&self) -> Result<BTreeMap<Node, usize>, StoryError> {
        self.memory.dialogue_counts()
    }

    fn dialogue_in_thread(&self, node: &Node) -> Result<Vec<DialogueRecord>, StoryError> {
        self.memory.dialogue_in_thread(node)
    }

    fn translated_dialogue(&self, script_id: ScriptId) -> Result<Vec<DialogueRecord>, StoryError> {
        self.memory.translated_dialogue(script_id)
    }

    fn stats(&self) -> StoreStats {
        self.memory.stats()
    }

    fn flush(&mut self) -> Result<(), StoryError> {
        if !self.dirty {
            return Ok(());
        }
        persist(&self.path, &self.memory)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "flushed record store");
        Ok(())
    }
}
