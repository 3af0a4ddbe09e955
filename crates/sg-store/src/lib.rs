mod error_map;
mod json;
mod memory;

use std::collections::BTreeMap;

use sg_core::{
    DialogueRecord, EdgeRecord, Node, ScriptBatch, ScriptId, StoryError, TranslationRecord,
};

pub use json::{JsonStore, STORE_SCHEMA};
pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub scripts: usize,
    pub dialogue: usize,
    pub edges: usize,
    pub translations: usize,
}

/// Persistence boundary for extracted records.
///
/// `commit_script` is all-or-nothing for one script and replaces whatever that
/// script committed before, so extraction can be re-run over the same files.
pub trait RecordStore {
    fn commit_script(&mut self, batch: ScriptBatch) -> Result<(), StoryError>;

    /// Upserts translations by (script id, address); returns how many were stored.
    fn put_translations(
        &mut self,
        translations: Vec<TranslationRecord>,
    ) -> Result<usize, StoryError>;

    fn edges(&self) -> Result<Vec<EdgeRecord>, StoryError>;

    fn edges_into(&self, node: &Node) -> Result<Vec<EdgeRecord>, StoryError>;

    fn dialogue_counts(&self) -> Result<BTreeMap<Node, usize>, StoryError>;

    fn dialogue_in_thread(&self, node: &Node) -> Result<Vec<DialogueRecord>, StoryError>;

    /// Dialogue of one script joined with its translations, ordered by address.
    /// Untranslated dialogue is left out.
    fn translated_dialogue(&self, script_id: ScriptId) -> Result<Vec<DialogueRecord>, StoryError>;

    fn stats(&self) -> StoreStats;

    /// Writes out mutations a store has held back. Stores that persist on
    /// every mutation have nothing to do.
    fn flush(&mut self) -> Result<(), StoryError> {
        Ok(())
    }
}
