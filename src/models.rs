//! Core data types shared by the store, grouping, and search layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single item of a collection: one post, one user, one todo.
pub type Record = Map<String, Value>;

/// Name under which the incomplete-task grouping is persisted.
pub const TODO_LIST: &str = "todo_list";

/// The fixed set of resources served by the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Posts,
    Comments,
    Albums,
    Photos,
    Todos,
    Users,
}

impl Resource {
    /// All resources in fetch and search order.
    pub const ALL: [Resource; 6] = [
        Resource::Posts,
        Resource::Comments,
        Resource::Albums,
        Resource::Photos,
        Resource::Todos,
        Resource::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Comments => "comments",
            Resource::Albums => "albums",
            Resource::Photos => "photos",
            Resource::Todos => "todos",
            Resource::Users => "users",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown resource '{}'. Must be one of: posts, comments, albums, photos, todos, users.",
                    s
                )
            })
    }
}

/// True when `name` is a base resource or another collection the tool
/// writes itself. Derived per-user collections must never use these.
pub fn is_reserved_name(name: &str) -> bool {
    name == TODO_LIST || name.parse::<Resource>().is_ok()
}

/// Posts for one user, in id order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPosts {
    pub username: String,
    pub posts: Vec<Record>,
}

/// Incomplete tasks for one user, as persisted in `todo_list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTasks {
    pub username: String,
    pub tasks: Vec<Record>,
}

/// Read an integer field, accepting only JSON integers.
pub fn int_field(record: &Record, field: &str) -> Option<i64> {
    record.get(field).and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_roundtrip_names() {
        for r in Resource::ALL {
            assert_eq!(r.as_str().parse::<Resource>().unwrap(), r);
        }
        assert!("widgets".parse::<Resource>().is_err());
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_name("posts"));
        assert!(is_reserved_name("users"));
        assert!(is_reserved_name("todo_list"));
        assert!(!is_reserved_name("Bret"));
        assert!(!is_reserved_name("Posts"));
    }

    #[test]
    fn test_int_field() {
        let rec: Record = serde_json::from_str(r#"{"id": 3, "name": "x", "f": 1.5}"#).unwrap();
        assert_eq!(int_field(&rec, "id"), Some(3));
        assert_eq!(int_field(&rec, "name"), None);
        assert_eq!(int_field(&rec, "f"), None);
        assert_eq!(int_field(&rec, "missing"), None);
    }
}
