//! Overview of the cached collections.
//!
//! Gives a quick summary of what is on disk: record counts, file sizes,
//! and how long ago each collection was written. Used by `jsnap list` to
//! check that a fetch and grouping actually produced something.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::models::{is_reserved_name, Resource};
use crate::store::{CollectionStore, JsonFileStore};

/// What kind of collection a stored name is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Base,
    Derived,
}

#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub name: String,
    pub kind: CollectionKind,
    /// Top-level items; `None` when the file does not parse.
    pub records: Option<usize>,
    pub bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Inspect every collection in the store's directory.
pub fn list_collections(store: &JsonFileStore) -> Result<Vec<CollectionInfo>> {
    let mut infos = Vec::new();
    for name in store.names()? {
        let meta = store
            .path_for(&name)
            .ok()
            .and_then(|p| std::fs::metadata(p).ok());
        let bytes = meta.as_ref().map(|m| m.len()).unwrap_or(0);
        let modified = meta
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from);

        let records = match store.read_value(&name) {
            Ok(Value::Array(items)) => Some(items.len()),
            Ok(Value::Object(map)) => Some(map.len()),
            Ok(_) => Some(1),
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "unreadable collection");
                None
            }
        };

        let kind = if name.parse::<Resource>().is_ok() {
            CollectionKind::Base
        } else {
            CollectionKind::Derived
        };

        infos.push(CollectionInfo {
            name,
            kind,
            records,
            bytes,
            modified,
        });
    }

    // base resources first, in fetch order; then derived names alphabetically
    infos.sort_by_key(|info| {
        let rank = info
            .name
            .parse::<Resource>()
            .ok()
            .and_then(|r| Resource::ALL.iter().position(|x| *x == r))
            .unwrap_or(Resource::ALL.len());
        (rank, info.name.clone())
    });
    Ok(infos)
}

/// Print the collection table to `out`.
pub fn run_list<W: Write>(store: &JsonFileStore, out: &mut W) -> Result<()> {
    let infos = list_collections(store)?;
    let now = Utc::now();

    writeln!(out, "Collections in {}", store.dir().display())?;
    if infos.is_empty() {
        writeln!(out, "  (none cached; run `jsnap fetch`)")?;
        return Ok(());
    }

    writeln!(
        out,
        "  {:<24} {:<8} {:>8} {:>10}   WRITTEN",
        "NAME", "KIND", "RECORDS", "SIZE"
    )?;
    writeln!(out, "  {}", "-".repeat(68))?;
    for info in &infos {
        let kind = match info.kind {
            CollectionKind::Base => "base",
            CollectionKind::Derived if is_reserved_name(&info.name) => "derived",
            CollectionKind::Derived => "user",
        };
        let records = info
            .records
            .map(|n| n.to_string())
            .unwrap_or_else(|| "invalid".to_string());
        let written = info
            .modified
            .map(|at| format_age(at, now))
            .unwrap_or_else(|| "unknown".to_string());
        writeln!(
            out,
            "  {:<24} {:<8} {:>8} {:>10}   {}",
            info.name,
            kind,
            records,
            format_size(info.bytes),
            written
        )?;
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    match bytes {
        0..=1023 => format!("{} B", bytes),
        1024..=1_048_575 => format!("{:.1} KB", bytes as f64 / KB),
        _ => format!("{:.1} MB", bytes as f64 / (KB * KB)),
    }
}

/// How long before `now` a collection was written. Past a week, or for
/// clocks that disagree, the timestamp itself is shown.
fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(at);
    if age < Duration::zero() || age >= Duration::days(7) {
        return at.format("%Y-%m-%d %H:%M").to_string();
    }

    let ago = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });
    if age.num_days() > 0 {
        ago(age.num_days(), "day")
    } else if age.num_hours() > 0 {
        ago(age.num_hours(), "hour")
    } else if age.num_minutes() > 0 {
        ago(age.num_minutes(), "min")
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_format_age() {
        let now = DateTime::parse_from_rfc3339("2024-05-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::minutes(1), now), "1 min ago");
        assert_eq!(format_age(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(format_age(now - Duration::days(1), now), "1 day ago");
        assert_eq!(format_age(now - Duration::days(9), now), "2024-05-01 12:00");
        assert_eq!(format_age(now + Duration::hours(1), now), "2024-05-10 13:00");
    }

    #[test]
    fn test_list_orders_base_first() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path(), 1);
        store.save("users", &json!([{"id": 1}, {"id": 2}])).unwrap();
        store.save("posts", &json!([{"id": 1}])).unwrap();
        store.save("Bret", &json!([{"id": 1}])).unwrap();
        store.save("todo_list", &json!({"1": {}})).unwrap();
        std::fs::write(tmp.path().join("broken.json"), "{").unwrap();

        let infos = list_collections(&store).unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "users", "Bret", "broken", "todo_list"]);
        assert_eq!(infos[1].records, Some(2));
        assert_eq!(infos[1].kind, CollectionKind::Base);
        assert_eq!(infos[3].records, None);
        assert_eq!(infos[4].records, Some(1));

        let mut out = Vec::new();
        run_list(&store, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("invalid"));
        assert!(text.contains("derived"));
    }

    #[test]
    fn test_list_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("none"), 1);
        let mut out = Vec::new();
        run_list(&store, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("none cached"));
    }
}
