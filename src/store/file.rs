//! Directory-backed [`CollectionStore`]: one `<name>.json` file per collection.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{checked_name, to_indented, CollectionStore, EXTENSION};
use crate::error::{Result, SnapshotError};

/// Collections stored as indented JSON files in a single directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    indent: usize,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>, indent: usize) -> Self {
        Self {
            dir: dir.into(),
            indent,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`, always directly inside [`Self::dir`].
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let stem = checked_name(name)?;
        Ok(self.dir.join(format!("{}{}", stem, EXTENSION)))
    }

    fn io_err(name: &str, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            name: name.to_string(),
            source,
        }
    }
}

impl CollectionStore for JsonFileStore {
    fn write_value(&self, name: &str, value: &Value) -> Result<()> {
        let path = self.path_for(name)?;
        let text = to_indented(name, value, self.indent)?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_err(name, e))?;
        let mut file = fs::File::create(&path).map_err(|e| Self::io_err(name, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| Self::io_err(name, e))?;

        tracing::debug!(collection = name, path = %path.display(), bytes = text.len(), "wrote collection");
        Ok(())
    }

    fn read_value(&self, name: &str) -> Result<Value> {
        let path = self.path_for(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound(format!(
                    "{}{}",
                    checked_name(name)?,
                    EXTENSION
                )))
            }
            Err(e) => return Err(Self::io_err(name, e)),
        };

        serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
            name: name.to_string(),
            source,
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err(&self.dir.display().to_string(), e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_err(&self.dir.display().to_string(), e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = file_name.strip_suffix(EXTENSION) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use serde_json::json;
    use tempfile::TempDir;

    fn records(v: Value) -> Vec<Record> {
        crate::store::into_records("test", v).unwrap()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        let posts = records(json!([
            {"id": 1, "userId": 1, "title": "first", "tags": ["a", "b"]},
            {"id": 2, "userId": 2, "title": "second", "meta": {"draft": false}}
        ]));

        store.save("posts", &posts).unwrap();
        assert_eq!(store.load("posts").unwrap(), posts);
        assert_eq!(store.load("posts.json").unwrap(), posts);
    }

    #[test]
    fn test_save_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        store.save("users", &records(json!([{"id": 1}, {"id": 2}]))).unwrap();
        store.save("users", &records(json!([{"id": 3}]))).unwrap();
        assert_eq!(store.load("users").unwrap().len(), 1);
    }

    #[test]
    fn test_file_uses_configured_indent() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        store.save("albums", &records(json!([{"id": 1}]))).unwrap();
        let text = fs::read_to_string(tmp.path().join("albums.json")).unwrap();
        assert_eq!(text, "[\n {\n  \"id\": 1\n }\n]");
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        let err = store.load("photos").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "photos.json not found");
    }

    #[test]
    fn test_load_malformed_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("comments.json"), "[{\"id\": 1}][").unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        let err = store.load("comments").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
    }

    #[test]
    fn test_append_keeps_document_parseable() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        store.save("todos", &records(json!([{"id": 1}]))).unwrap();

        let total = store.append("todos", &records(json!([{"id": 2}]))).unwrap();
        assert_eq!(total, 2);
        store.append("todos", &records(json!([{"id": 3}]))).unwrap();

        let ids: Vec<i64> = store
            .load("todos")
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_append_to_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        let err = store.append("todos", &records(json!([{"id": 1}]))).unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.contains("todos"));
    }

    #[test]
    fn test_names_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        store.save("users", &records(json!([]))).unwrap();
        store.save("Bret", &records(json!([]))).unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();
        assert_eq!(store.names().unwrap(), vec!["Bret", "users"]);
    }

    #[test]
    fn test_names_of_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("absent"), 1);
        assert!(store.names().unwrap().is_empty());
    }

    #[test]
    fn test_names_cannot_leave_the_directory() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("data");
        let store = JsonFileStore::new(&data, 1);

        for name in ["../escaped", "nested/posts", "..\\escaped", ".."] {
            let err = store.save(name, &records(json!([{"id": 1}]))).unwrap_err();
            assert!(matches!(err, SnapshotError::InvalidName(_)), "{} accepted", name);
            assert!(!store.contains(name));
        }
        assert!(!tmp.path().join("escaped.json").exists());
        assert!(matches!(
            store.load("../escaped").unwrap_err(),
            SnapshotError::InvalidName(_)
        ));
        assert!(store.names().unwrap().is_empty());
    }

    #[test]
    fn test_creates_directory_on_first_write() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data").join("snap");
        let store = JsonFileStore::new(&dir, 2);
        store.save("posts", &records(json!([]))).unwrap();
        assert!(dir.join("posts.json").is_file());
    }
}
