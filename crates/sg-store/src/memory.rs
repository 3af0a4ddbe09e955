use std::collections::{BTreeMap, BTreeSet};

use sg_core::{
    normalize_variant, DialogueRecord, EdgeRecord, Node, ScriptBatch, ScriptId, ScriptLocation,
    StoryError, TranslationRecord,
};

use crate::{RecordStore, StoreStats};

type DialogueKey = (ScriptId, u32);

/// Relations kept in ordered maps, with the thread and head indexes the
/// analysis queries need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    scripts: BTreeSet<ScriptId>,
    dialogue: BTreeMap<DialogueKey, DialogueRecord>,
    edges: BTreeMap<ScriptId, Vec<EdgeRecord>>,
    translations: BTreeMap<DialogueKey, TranslationRecord>,
    by_thread: BTreeMap<Node, BTreeSet<DialogueKey>>,
    by_head: BTreeMap<Node, BTreeSet<ScriptId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from flat relations, regrouping records per script.
    pub(crate) fn restore(
        scripts: Vec<ScriptId>,
        dialogue: Vec<DialogueRecord>,
        edges: Vec<EdgeRecord>,
        translations: Vec<TranslationRecord>,
    ) -> Result<Self, StoryError> {
        let mut batches: BTreeMap<ScriptId, ScriptBatch> = scripts
            .into_iter()
            .map(|script_id| (script_id, ScriptBatch::new(script_id)))
            .collect();
        for record in dialogue {
            batches
                .entry(record.script_id)
                .or_insert_with(|| ScriptBatch::new(record.script_id))
                .dialogue
                .push(record);
        }
        for edge in edges {
            batches
                .entry(edge.tail.script_id)
                .or_insert_with(|| ScriptBatch::new(edge.tail.script_id))
                .edges
                .push(edge);
        }

        let mut store = Self::new();
        for batch in batches.into_values() {
            store.commit_script(batch)?;
        }
        store.put_translations(translations)?;
        Ok(store)
    }

    pub(crate) fn script_ids(&self) -> impl Iterator<Item = ScriptId> + '_ {
        self.scripts.iter().copied()
    }

    pub(crate) fn dialogue_records(&self) -> impl Iterator<Item = &DialogueRecord> {
        self.dialogue.values()
    }

    pub(crate) fn edge_records(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.edges.values().flatten()
    }

    pub(crate) fn translation_records(&self) -> impl Iterator<Item = &TranslationRecord> {
        self.translations.values()
    }

    fn remove_script(&mut self, script_id: ScriptId) {
        let keys: Vec<DialogueKey> = self
            .dialogue
            .range((script_id, 0)..=(script_id, u32::MAX))
            .map(|(key, _)| *key)
            .collect();
        for key in keys {
            if let Some(record) = self.dialogue.remove(&key) {
                let node = record.node();
                if let Some(index) = self.by_thread.get_mut(&node) {
                    index.remove(&key);
                    if index.is_empty() {
                        self.by_thread.remove(&node);
                    }
                }
            }
        }

        for edge in self.edges.remove(&script_id).unwrap_or_default() {
            if let Some(sources) = self.by_head.get_mut(&edge.head) {
                sources.remove(&script_id);
                if sources.is_empty() {
                    self.by_head.remove(&edge.head);
                }
            }
        }

        self.scripts.remove(&script_id);
    }
}

/// Checks that every record belongs to the batch's script and that no
/// address repeats, then normalizes variants and unconditional duplicates.
fn validate(batch: ScriptBatch) -> Result<ScriptBatch, StoryError> {
    let script_id = batch.script_id;
    let mut validated = ScriptBatch::new(script_id);
    let mut addresses = BTreeSet::new();

    for mut record in batch.dialogue {
        let location = ScriptLocation::address(script_id, record.address);
        if record.script_id != script_id {
            return Err(StoryError::at(
                "STORE_SCRIPT_MISMATCH",
                format!("Dialogue belongs to script {}.", record.script_id),
                location,
            ));
        }
        if !addresses.insert(record.address) {
            return Err(StoryError::at(
                "STORE_DUPLICATE_DIALOGUE",
                "Dialogue already recorded at this address.",
                location,
            ));
        }
        record.variant_body = normalize_variant(&record.body, record.variant_body.take());
        validated.dialogue.push(record);
    }

    for edge in batch.edges {
        if edge.tail.script_id != script_id {
            return Err(StoryError::at(
                "STORE_SCRIPT_MISMATCH",
                format!("Edge leaves {} which is outside this script.", edge.tail),
                ScriptLocation::script(script_id),
            ));
        }
        validated.push_edge(edge);
    }

    Ok(validated)
}

impl RecordStore for MemoryStore {
    fn commit_script(&mut self, batch: ScriptBatch) -> Result<(), StoryError> {
        let batch = validate(batch)?;
        let script_id = batch.script_id;
        self.remove_script(script_id);

        for record in batch.dialogue {
            let key = (script_id, record.address);
            self.by_thread.entry(record.node()).or_default().insert(key);
            self.dialogue.insert(key, record);
        }
        for edge in &batch.edges {
            self.by_head
                .entry(edge.head.clone())
                .or_default()
                .insert(script_id);
        }
        if !batch.edges.is_empty() {
            self.edges.insert(script_id, batch.edges);
        }
        self.scripts.insert(script_id);
        Ok(())
    }

    fn put_translations(
        &mut self,
        translations: Vec<TranslationRecord>,
    ) -> Result<usize, StoryError> {
        let count = translations.len();
        for mut translation in translations {
            let key = (translation.script_id, translation.address);
            if !self.dialogue.contains_key(&key) {
                tracing::warn!(
                    script_id = translation.script_id,
                    address = translation.address,
                    "translation has no matching dialogue"
                );
            }
            translation.variant_body =
                normalize_variant(&translation.body, translation.variant_body.take());
            self.translations.insert(key, translation);
        }
        Ok(count)
    }

    fn edges(&self) -> Result<Vec<EdgeRecord>, StoryError> {
        Ok(self.edge_records().cloned().collect())
    }

    fn edges_into(&self, node: &Node) -> Result<Vec<EdgeRecord>, StoryError> {
        let Some(sources) = self.by_head.get(node) else {
            return Ok(Vec::new());
        };
        Ok(sources
            .iter()
            .filter_map(|script_id| self.edges.get(script_id))
            .flatten()
            .filter(|edge| &edge.head == node)
            .cloned()
            .collect())
    }

    fn dialogue_counts(&self) -> Result<BTreeMap<Node, usize>, StoryError> {
        Ok(self
            .by_thread
            .iter()
            .map(|(node, keys)| (node.clone(), keys.len()))
            .collect())
    }

    fn dialogue_in_thread(&self, node: &Node) -> Result<Vec<DialogueRecord>, StoryError> {
        Ok(self
            .by_thread
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(|key| self.dialogue.get(key))
            .cloned()
            .collect())
    }

    fn translated_dialogue(&self, script_id: ScriptId) -> Result<Vec<DialogueRecord>, StoryError> {
        Ok(self
            .dialogue
            .range((script_id, 0)..=(script_id, u32::MAX))
            .filter_map(|(key, record)| {
                self.translations
                    .get(key)
                    .map(|translation| record.translated(translation))
            })
            .collect())
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            scripts: self.scripts.len(),
            dialogue: self.dialogue.len(),
            edges: self.edges.values().map(Vec::len).sum(),
            translations: self.translations.len(),
        }
    }
}
