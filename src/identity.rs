//! Username ↔ user id resolution built from the `users` collection.
//!
//! Both directions are explicit maps so that resolving a post's `userId`
//! is a single lookup and an unknown id is a typed
//! [`SnapshotError::Lookup`] rather than an empty scan.
//!
//! Semantics when the input is not one-to-one:
//!
//! - duplicate usernames: the later record's id wins, and the username
//!   keeps its original position in iteration order;
//! - duplicate ids: [`IdentityMap::username_for`] returns the first
//!   username (in iteration order) that still maps to that id.

use std::collections::HashMap;

use crate::error::{Result, SnapshotError};
use crate::models::{int_field, Record, Resource};
use crate::store::CollectionStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityMap {
    entries: Vec<(String, i64)>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<i64, usize>,
}

impl IdentityMap {
    /// Build the map from user records. Each record must carry a string
    /// `username` and an integer `id`.
    pub fn from_records(records: &[Record]) -> Result<Self> {
        let collection = Resource::Users.as_str();
        let mut entries: Vec<(String, i64)> = Vec::with_capacity(records.len());
        let mut by_name: HashMap<String, usize> = HashMap::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            let username = record
                .get("username")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    SnapshotError::invalid(collection, format!("record {} has no username", i))
                })?;
            let id = int_field(record, "id").ok_or_else(|| {
                SnapshotError::invalid(collection, format!("record {} has no integer id", i))
            })?;

            match by_name.get(username) {
                Some(&pos) => {
                    tracing::warn!(username, old_id = entries[pos].1, new_id = id, "duplicate username, keeping last id");
                    entries[pos].1 = id;
                }
                None => {
                    by_name.insert(username.to_string(), entries.len());
                    entries.push((username.to_string(), id));
                }
            }
        }

        let mut by_id: HashMap<i64, usize> = HashMap::with_capacity(entries.len());
        for (pos, (_, id)) in entries.iter().enumerate() {
            by_id.entry(*id).or_insert(pos);
        }

        Ok(Self {
            entries,
            by_name,
            by_id,
        })
    }

    /// Resolve a user id to its username.
    pub fn username_for(&self, id: i64) -> Result<&str> {
        self.by_id
            .get(&id)
            .map(|&pos| self.entries[pos].0.as_str())
            .ok_or(SnapshotError::Lookup(id))
    }

    pub fn id_for(&self, username: &str) -> Option<i64> {
        self.by_name.get(username).map(|&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(username, id)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// Load `users` from the store and build the identity map.
pub fn build_identity_map<S: CollectionStore>(store: &S) -> Result<IdentityMap> {
    let users = store.load(Resource::Users.as_str())?;
    let map = IdentityMap::from_records(&users)?;
    tracing::info!(users = users.len(), unique = map.len(), "built identity map");
    Ok(map)
}
