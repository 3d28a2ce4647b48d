//! Editable list view of `GROUP_MAPPING`
//!
//! The backend stores group mappings as an unordered object; operators edit
//! them as an ordered list of pairs. [`derive_from`] and [`fold`] convert
//! between the two. Folding is lossy: a check group listed twice keeps the
//! value of its last occurrence.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::document::ConfigDocument;
use super::mirror::ConfigMirror;
use crate::constants::keys::GROUP_MAPPING;
use crate::error::TransportError;

/// One `check group -> reference group` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMappingEntry {
    pub check_group: String,
    pub reference_group: String,
}

impl GroupMappingEntry {
    pub fn new(check_group: impl Into<String>, reference_group: impl Into<String>) -> Self {
        Self {
            check_group: check_group.into(),
            reference_group: reference_group.into(),
        }
    }
}

pub type GroupMappingList = Vec<GroupMappingEntry>;

/// Read `GROUP_MAPPING` as a list, in key order
///
/// A missing or non-object field yields an empty list; non-string values are
/// skipped.
pub fn derive_from(document: &ConfigDocument) -> GroupMappingList {
    let Some(field) = document.get(GROUP_MAPPING) else {
        return Vec::new();
    };
    let Some(mapping) = field.as_object() else {
        warn!(value = %field, "GROUP_MAPPING is not an object, treating as empty");
        return Vec::new();
    };

    mapping
        .iter()
        .filter_map(|(check, reference)| match reference.as_str() {
            Some(reference) => Some(GroupMappingEntry::new(check.clone(), reference)),
            None => {
                warn!(check_group = %check, "Skipping non-string group mapping value");
                None
            }
        })
        .collect()
}

/// Fold the list back into a mapping; later duplicates win
pub fn fold(entries: &[GroupMappingEntry]) -> Map<String, Value> {
    entries.iter().fold(Map::new(), |mut mapping, entry| {
        mapping.insert(entry.check_group.clone(), Value::String(entry.reference_group.clone()));
        mapping
    })
}

/// Append an empty row
pub fn insert_blank(mut list: GroupMappingList) -> GroupMappingList {
    list.push(GroupMappingEntry::default());
    list
}

/// Drop the row at `index`; out-of-range leaves the list as is
pub fn remove_at(mut list: GroupMappingList, index: usize) -> GroupMappingList {
    if index < list.len() {
        list.remove(index);
    }
    list
}

/// Replace the row at `index`; out-of-range leaves the list as is
pub fn update_at(mut list: GroupMappingList, index: usize, entry: GroupMappingEntry) -> GroupMappingList {
    if let Some(slot) = list.get_mut(index) {
        *slot = entry;
    }
    list
}

/// Editable projection of the mirror's group mappings
///
/// Holds the operator's working list, which may contain blank or duplicate
/// rows. Removing or editing a row saves immediately; adding a blank row does
/// not.
#[derive(Debug, Default)]
pub struct GroupMappingProjection {
    entries: GroupMappingList,
    /// Mirror revision `entries` was derived from
    derived_from: Option<u64>,
}

impl GroupMappingProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[GroupMappingEntry] {
        &self.entries
    }

    /// Re-derive the list if the mirror adopted a new document since last time
    pub fn observe(&mut self, mirror: &ConfigMirror) {
        if self.derived_from == Some(mirror.revision()) {
            return;
        }
        if let Some(document) = mirror.document() {
            self.entries = derive_from(document);
            self.derived_from = Some(mirror.revision());
            debug!(entries = self.entries.len(), revision = mirror.revision(), "Group mappings derived");
        }
    }

    /// Add an empty row locally without saving
    pub fn insert_blank(&mut self) {
        self.entries = insert_blank(std::mem::take(&mut self.entries));
    }

    fn in_range(&self, index: usize) -> bool {
        if index < self.entries.len() {
            return true;
        }
        debug!(index, entries = self.entries.len(), "Group mapping index out of range, nothing saved");
        false
    }

    /// Remove a row and save; an out-of-range index is a no-op
    pub async fn remove_at(&mut self, mirror: &mut ConfigMirror, index: usize) -> Result<(), TransportError> {
        if !self.in_range(index) {
            return Ok(());
        }
        self.entries = remove_at(std::mem::take(&mut self.entries), index);
        self.commit(mirror).await
    }

    /// Replace a row and save; an out-of-range index is a no-op
    pub async fn update_at(
        &mut self,
        mirror: &mut ConfigMirror,
        index: usize,
        entry: GroupMappingEntry,
    ) -> Result<(), TransportError> {
        if !self.in_range(index) {
            return Ok(());
        }
        self.entries = update_at(std::mem::take(&mut self.entries), index, entry);
        self.commit(mirror).await
    }

    /// Fold the working list into `GROUP_MAPPING` and save it
    ///
    /// On failure the working list keeps the operator's edits while the
    /// mirror stays on the last stored document.
    pub async fn commit(&mut self, mirror: &mut ConfigMirror) -> Result<(), TransportError> {
        let folded = fold(&self.entries);
        let partial = ConfigDocument::new().with(GROUP_MAPPING, Value::Object(folded));
        mirror.update(partial).await?;
        self.observe(mirror);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use crate::gateway::memory::{MemoryGateway, Operation};
    use crate::notification::NotificationSink;
    use serde_json::json;
    use std::sync::Arc;

    fn entry(check: &str, reference: &str) -> GroupMappingEntry {
        GroupMappingEntry::new(check, reference)
    }

    fn document_with(mapping: Value) -> ConfigDocument {
        ConfigDocument::new()
            .with("DEFAULT_GROUP", "staff")
            .with(GROUP_MAPPING, mapping)
    }

    async fn loaded(mapping: Value) -> (Arc<MemoryGateway>, ConfigMirror, GroupMappingProjection) {
        let gateway = Arc::new(MemoryGateway::new().with_config(document_with(mapping)));
        let shared: Arc<dyn Gateway> = gateway.clone();
        let mut mirror = ConfigMirror::new(shared, NotificationSink::new());
        mirror.load().await.unwrap();
        let mut projection = GroupMappingProjection::new();
        projection.observe(&mirror);
        (gateway, mirror, projection)
    }

    #[test]
    fn test_derive_sorted_by_check_group() {
        let doc = document_with(json!({"ops": "admins", "eng": "staff"}));
        assert_eq!(derive_from(&doc), vec![entry("eng", "staff"), entry("ops", "admins")]);
    }

    #[test]
    fn test_derive_missing_or_malformed_is_empty() {
        assert!(derive_from(&ConfigDocument::new()).is_empty());
        assert!(derive_from(&document_with(json!("eng=staff"))).is_empty());
        assert!(derive_from(&document_with(json!(["eng", "staff"]))).is_empty());
        assert_eq!(
            derive_from(&document_with(json!({"eng": "staff", "bad": 3}))),
            vec![entry("eng", "staff")]
        );
    }

    #[test]
    fn test_fold_last_duplicate_wins() {
        let folded = fold(&[entry("a", "x"), entry("a", "y")]);
        assert_eq!(Value::Object(folded), json!({"a": "y"}));
    }

    #[test]
    fn test_derive_fold_round_trip() {
        let mapping = json!({"eng": "staff", "ops": "admins", "": ""});
        let doc = document_with(mapping.clone());
        assert_eq!(Value::Object(fold(&derive_from(&doc))), mapping);
    }

    #[test]
    fn test_list_transforms() {
        let list = vec![entry("a", "x"), entry("b", "y")];
        assert_eq!(insert_blank(list.clone()).last(), Some(&entry("", "")));
        assert_eq!(remove_at(list.clone(), 0), vec![entry("b", "y")]);
        assert_eq!(remove_at(list.clone(), 5), list);
        assert_eq!(update_at(list.clone(), 1, entry("b", "z")), vec![entry("a", "x"), entry("b", "z")]);
        assert_eq!(update_at(list.clone(), 2, entry("c", "z")), list);
    }

    #[tokio::test]
    async fn test_remove_commits_once() {
        let (gateway, mut mirror, mut projection) = loaded(json!({"a": "x", "b": "y"})).await;

        projection.remove_at(&mut mirror, 0).await.unwrap();
        assert_eq!(projection.entries(), &[entry("b", "y")]);

        let stored = gateway.stored_documents();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get(GROUP_MAPPING), Some(&json!({"b": "y"})));
        assert_eq!(stored[0].get_str("DEFAULT_GROUP"), Some("staff"));
    }

    #[tokio::test]
    async fn test_insert_blank_is_not_saved() {
        let (gateway, mirror, mut projection) = loaded(json!({"a": "x"})).await;

        projection.insert_blank();
        assert_eq!(projection.entries(), &[entry("a", "x"), entry("", "")]);
        assert!(gateway.stored_documents().is_empty());
        assert_eq!(mirror.revision(), 1);
    }

    #[tokio::test]
    async fn test_keystrokes_converge_on_last_value() {
        let (gateway, mut mirror, mut projection) = loaded(json!({})).await;
        projection.insert_blank();

        for typed in ["e", "en", "eng"] {
            projection.update_at(&mut mirror, 0, entry(typed, "")).await.unwrap();
        }
        projection.update_at(&mut mirror, 0, entry("eng", "staff")).await.unwrap();

        assert_eq!(gateway.stored_documents().len(), 4);
        assert_eq!(gateway.config().get(GROUP_MAPPING), Some(&json!({"eng": "staff"})));
        assert_eq!(projection.entries(), &[entry("eng", "staff")]);
    }

    #[tokio::test]
    async fn test_duplicates_collapse_after_commit() {
        let (_gateway, mut mirror, mut projection) = loaded(json!({"a": "x"})).await;
        projection.insert_blank();

        projection.update_at(&mut mirror, 1, entry("a", "y")).await.unwrap();
        assert_eq!(projection.entries(), &[entry("a", "y")]);
        assert_eq!(mirror.document().unwrap().get(GROUP_MAPPING), Some(&json!({"a": "y"})));
    }

    #[tokio::test]
    async fn test_commit_without_edits_is_idempotent() {
        let mapping = json!({"eng": "staff", "ops": "admins"});
        let (gateway, mut mirror, mut projection) = loaded(mapping.clone()).await;

        projection.commit(&mut mirror).await.unwrap();
        assert_eq!(gateway.stored_documents()[0].get(GROUP_MAPPING), Some(&mapping));
        assert_eq!(mirror.document().unwrap().get(GROUP_MAPPING), Some(&mapping));
        assert_eq!(projection.entries(), &[entry("eng", "staff"), entry("ops", "admins")]);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_working_list() {
        let (gateway, mut mirror, mut projection) = loaded(json!({"a": "x", "b": "y"})).await;
        gateway.set_failing(Operation::StoreConfig, true);

        assert!(projection.remove_at(&mut mirror, 0).await.is_err());
        assert_eq!(projection.entries(), &[entry("b", "y")]);
        assert_eq!(mirror.document().unwrap().get(GROUP_MAPPING), Some(&json!({"a": "x", "b": "y"})));
    }

    #[tokio::test]
    async fn test_observe_rederives_after_reload() {
        let (gateway, mut mirror, mut projection) = loaded(json!({"a": "x"})).await;
        projection.insert_blank();

        // Same revision: working list kept
        projection.observe(&mirror);
        assert_eq!(projection.entries().len(), 2);

        gateway.set_config(document_with(json!({"z": "w"})));
        mirror.load().await.unwrap();
        projection.observe(&mirror);
        assert_eq!(projection.entries(), &[entry("z", "w")]);
    }

    #[tokio::test]
    async fn test_out_of_range_edit_sends_nothing() {
        let (gateway, mut mirror, mut projection) = loaded(json!({"a": "x"})).await;

        projection.remove_at(&mut mirror, 3).await.unwrap();
        projection.update_at(&mut mirror, 1, entry("b", "y")).await.unwrap();

        assert!(gateway.stored_documents().is_empty());
        assert_eq!(projection.entries(), &[entry("a", "x")]);
        assert_eq!(mirror.revision(), 1);
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;
        use std::collections::{BTreeMap, BTreeSet};

        proptest! {
            #[test]
            fn prop_derive_then_fold_restores_mapping(
                mapping in proptest::collection::btree_map(any::<String>(), any::<String>(), 0..16)
            ) {
                let object: Map<String, Value> = mapping
                    .iter()
                    .map(|(check, reference)| (check.clone(), Value::String(reference.clone())))
                    .collect();
                let doc = document_with(Value::Object(object.clone()));
                prop_assert_eq!(fold(&derive_from(&doc)), object);
            }

            #[test]
            fn prop_fold_keeps_last_duplicate(
                pairs in proptest::collection::vec(("[a-d]", any::<String>()), 0..32)
            ) {
                let entries: Vec<GroupMappingEntry> = pairs
                    .iter()
                    .map(|(check, reference)| entry(check, reference))
                    .collect();
                let folded = fold(&entries);

                let mut last: BTreeMap<&str, &str> = BTreeMap::new();
                for (check, reference) in &pairs {
                    last.insert(check.as_str(), reference.as_str());
                }
                let keys: BTreeSet<&str> = pairs.iter().map(|(check, _)| check.as_str()).collect();
                prop_assert_eq!(folded.len(), keys.len());
                for (check, reference) in last {
                    prop_assert_eq!(folded.get(check).and_then(Value::as_str), Some(reference));
                }
            }
        }
    }
}
