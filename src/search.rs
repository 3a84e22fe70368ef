//! Case-insensitive keyword search over cached collections.
//!
//! There is no index: every record is rendered to compact JSON (field
//! names included) and tested for the lower-cased keyword as a substring.
//! Cost is linear in the collection's size, which is fine for the tens to
//! hundreds of records the remote source serves per collection.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::Record;
use crate::store::{collection_name, CollectionStore};

/// Matches from one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub collection: String,
    pub matches: Vec<Record>,
}

impl SearchHit {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }
}

/// Canonical text a record is matched against.
pub fn render_record(record: &Record) -> String {
    // Map serialization cannot fail: keys are strings and values are JSON.
    serde_json::to_string(record).unwrap_or_default()
}

/// True when `keyword_lower` occurs in the lower-cased rendering of `record`.
pub fn matches(record: &Record, keyword_lower: &str) -> bool {
    render_record(record).to_lowercase().contains(keyword_lower)
}

/// Search one collection for `keyword`, preserving record order.
pub fn keyword_search<S: CollectionStore>(store: &S, name: &str, keyword: &str) -> Result<SearchHit> {
    let name = collection_name(name);
    let records = store.load(name)?;
    let needle = keyword.to_lowercase();

    let total = records.len();
    let found: Vec<Record> = records
        .into_iter()
        .filter(|r| matches(r, &needle))
        .collect();

    tracing::debug!(collection = name, keyword, scanned = total, matched = found.len(), "keyword search");
    Ok(SearchHit {
        collection: name.to_string(),
        matches: found,
    })
}

/// Search each collection in `names` order. A failure on one collection
/// (for instance, not cached yet) does not stop the others.
pub fn search_collections<S, N>(store: &S, names: &[N], keyword: &str) -> Vec<(String, Result<SearchHit>)>
where
    S: CollectionStore,
    N: AsRef<str>,
{
    names
        .iter()
        .map(|n| {
            let name = collection_name(n.as_ref()).to_string();
            let hit = keyword_search(store, &name, keyword);
            (name, hit)
        })
        .collect()
}

/// Matches as a JSON array value, for indented display.
pub fn matches_value(hit: &SearchHit) -> Value {
    Value::Array(hit.matches.iter().cloned().map(Value::Object).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .save(
                "posts",
                &json!([
                    {"id": 1, "title": "Sunt aut facere", "body": "quia et suscipit"},
                    {"id": 2, "title": "qui est esse", "body": "est rerum tempore"},
                    {"id": 3, "title": "ea molestias", "body": "et iusto SED quo"}
                ]),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_single_match() {
        let hit = keyword_search(&seeded(), "posts", "molestias").unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit.matches[0]["id"], 3);
        assert_eq!(hit.collection, "posts");
    }

    #[test]
    fn test_case_insensitive_both_ways() {
        let store = seeded();
        assert_eq!(keyword_search(&store, "posts", "SUNT").unwrap().len(), 1);
        assert_eq!(keyword_search(&store, "posts", "sed").unwrap().len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let hit = keyword_search(&seeded(), "posts", "zebra").unwrap();
        assert!(hit.is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let hit = keyword_search(&seeded(), "posts.json", "est").unwrap();
        let ids: Vec<i64> = hit.matches.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_field_names_and_numbers_are_searchable() {
        let store = seeded();
        assert_eq!(keyword_search(&store, "posts", "title").unwrap().len(), 3);
        assert_eq!(keyword_search(&store, "posts", "\"id\":2").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_collection() {
        let err = keyword_search(&seeded(), "albums", "x").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_search_collections_continues_past_missing() {
        let results = search_collections(&seeded(), &["albums", "posts"], "esse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "albums");
        assert!(results[0].1.is_err());
        assert_eq!(results[1].1.as_ref().unwrap().len(), 1);
    }
}
