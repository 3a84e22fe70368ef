//! Storage abstraction for cached collections.
//!
//! The [`CollectionStore`] trait has four primitive operations over whole
//! JSON documents. Everything the rest of the crate needs (`save`, `load`,
//! `append`, `render`) is provided on top of them, so a backend only has
//! to know how to put a document under a name and get it back.
//!
//! | Backend | Purpose |
//! |---------|---------|
//! | [`JsonFileStore`] | One `<name>.json` file per collection in a directory |
//! | [`MemoryStore`] | `BTreeMap` behind a lock, for tests |

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SnapshotError};
use crate::models::Record;

const EXTENSION: &str = ".json";

/// Strip an optional `.json` suffix so `posts` and `posts.json` name the
/// same collection.
pub fn collection_name(name: &str) -> &str {
    name.strip_suffix(EXTENSION).unwrap_or(name)
}

/// Normalize `name` and require the result to be a single plain file name.
///
/// Collection names reach the store from remote data (usernames), so a
/// name with a path separator, a `.`/`..` component, or nothing left after
/// stripping `.json` is rejected with [`SnapshotError::InvalidName`].
pub fn checked_name(name: &str) -> Result<&str> {
    let stem = collection_name(name);
    let plain = !stem.is_empty()
        && stem != "."
        && stem != ".."
        && !stem.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if plain {
        Ok(stem)
    } else {
        Err(SnapshotError::InvalidName(name.to_string()))
    }
}

/// Persisted named collections.
pub trait CollectionStore {
    /// Write `value` under `name`, replacing any existing content.
    fn write_value(&self, name: &str, value: &Value) -> Result<()>;

    /// Read the document stored under `name`.
    ///
    /// Returns [`SnapshotError::NotFound`] when nothing is stored there.
    fn read_value(&self, name: &str) -> Result<Value>;

    fn contains(&self, name: &str) -> bool;

    /// Names of all stored collections, sorted.
    fn names(&self) -> Result<Vec<String>>;

    /// Serialize `data` and overwrite the collection `name`.
    fn save<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<()>
    where
        Self: Sized,
    {
        let name = collection_name(name);
        let value = serde_json::to_value(data).map_err(|source| SnapshotError::Parse {
            name: name.to_string(),
            source,
        })?;
        self.write_value(name, &value)
    }

    /// Load `name` as a sequence of records.
    fn load(&self, name: &str) -> Result<Vec<Record>> {
        let name = collection_name(name);
        let value = self.read_value(name)?;
        into_records(name, value)
    }

    /// Append `records` to an existing collection.
    ///
    /// The stored sequence is loaded, extended, and written back whole, so
    /// the file stays a single parseable document. Appending to a name with
    /// nothing stored is [`SnapshotError::NotFound`].
    fn append(&self, name: &str, records: &[Record]) -> Result<usize> {
        let name = collection_name(name);
        let mut existing = self.load(name)?;
        existing.extend(records.iter().cloned());
        let total = existing.len();
        let value = Value::Array(existing.into_iter().map(Value::Object).collect());
        self.write_value(name, &value)?;
        Ok(total)
    }

    /// Indented textual form of the stored collection, for display.
    fn render(&self, name: &str, indent: usize) -> Result<String> {
        let name = collection_name(name);
        let value = self.read_value(name)?;
        to_indented(name, &value, indent)
    }
}

/// Convert a stored document into records, requiring an array of objects.
pub fn into_records(name: &str, value: Value) -> Result<Vec<Record>> {
    let Value::Array(items) = value else {
        return Err(SnapshotError::invalid(name, "expected a JSON array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(SnapshotError::invalid(
                name,
                format!("element {} is not an object: {}", i, other),
            )),
        })
        .collect()
}

/// Pretty-print `value` with `indent` spaces per level.
pub fn to_indented(name: &str, value: &Value, indent: usize) -> Result<String> {
    let pad = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&pad);
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|source| SnapshotError::Parse {
            name: name.to_string(),
            source,
        })?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
