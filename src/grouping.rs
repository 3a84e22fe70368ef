//! Per-user grouping of posts and incomplete todos.
//!
//! Both passes load their collection fully and then partition it. The
//! partitioning itself ([`partition_posts`], [`partition_incomplete_tasks`])
//! is pure so it can be tested without a store. A `userId` that the
//! identity map cannot resolve aborts the whole pass before anything is
//! written. A per-user collection that cannot be written is recorded in
//! [`PostGrouping::failed`] and the remaining users are still saved.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SnapshotError};
use crate::identity::IdentityMap;
use crate::models::{int_field, is_reserved_name, Record, Resource, UserPosts, UserTasks, TODO_LIST};
use crate::store::{checked_name, CollectionStore};

/// Maps usernames to the collection names their posts are saved under.
#[derive(Debug, Clone, Default)]
pub struct DerivedNaming {
    pub prefix: String,
}

impl DerivedNaming {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn name_for(&self, username: &str) -> String {
        format!("{}{}", self.prefix, username)
    }
}

/// A user's posts as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGroup {
    pub username: String,
    pub collection: String,
}

/// Outcome of [`group_posts_by_user`].
#[derive(Debug, Clone, Default)]
pub struct PostGrouping {
    pub groups: Vec<UserPosts>,
    /// Written collections, in group order.
    pub saved: Vec<SavedGroup>,
    /// Derived names refused because they would overwrite a reserved collection.
    pub collisions: Vec<String>,
    /// `(username, reason)` for users whose collection was not written.
    pub failed: Vec<(String, String)>,
}

impl PostGrouping {
    pub fn total_posts(&self) -> usize {
        self.groups.iter().map(|g| g.posts.len()).sum()
    }
}

/// Incomplete tasks keyed by user id, serialized as `{"<id>": {...}}`.
pub type TodoList = BTreeMap<i64, UserTasks>;

fn user_id(collection: &str, record: &Record) -> Result<i64> {
    int_field(record, "userId")
        .ok_or_else(|| SnapshotError::invalid(collection, "record has no integer userId"))
}

/// Sort posts by `id` and split them by resolved username.
///
/// Groups appear in the order their first post appears after sorting;
/// posts inside a group keep that sorted order.
pub fn partition_posts(posts: Vec<Record>, identity: &IdentityMap) -> Result<Vec<UserPosts>> {
    let collection = Resource::Posts.as_str();

    let mut keyed = Vec::with_capacity(posts.len());
    for (i, post) in posts.into_iter().enumerate() {
        let id = int_field(&post, "id").ok_or_else(|| {
            SnapshotError::invalid(collection, format!("record {} has no integer id", i))
        })?;
        keyed.push((id, post));
    }
    // sort_by_key is stable
    keyed.sort_by_key(|(id, _)| *id);

    let mut groups: Vec<UserPosts> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (_, post) in keyed {
        let username = identity.username_for(user_id(collection, &post)?)?;
        let pos = match index.get(username) {
            Some(&pos) => pos,
            None => {
                index.insert(username.to_string(), groups.len());
                groups.push(UserPosts {
                    username: username.to_string(),
                    posts: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[pos].posts.push(post);
    }

    Ok(groups)
}

/// Keep todos with `completed == false` and group them by user id,
/// preserving their relative order.
pub fn partition_incomplete_tasks(todos: Vec<Record>, identity: &IdentityMap) -> Result<TodoList> {
    let collection = Resource::Todos.as_str();
    let mut list = TodoList::new();

    for (i, task) in todos.into_iter().enumerate() {
        let completed = task
            .get("completed")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| {
                SnapshotError::invalid(collection, format!("record {} has no boolean completed", i))
            })?;
        if completed {
            continue;
        }

        let uid = user_id(collection, &task)?;
        let username = identity.username_for(uid)?;
        list.entry(uid)
            .or_insert_with(|| UserTasks {
                username: username.to_string(),
                tasks: Vec::new(),
            })
            .tasks
            .push(task);
    }

    Ok(list)
}

/// Group `posts` by username and persist one collection per user.
///
/// A user whose derived name is reserved is skipped and listed in
/// [`PostGrouping::collisions`]. A name that is not a plain file name, or a
/// write that fails, lands in [`PostGrouping::failed`].
pub fn group_posts_by_user<S: CollectionStore>(
    store: &S,
    identity: &IdentityMap,
    naming: &DerivedNaming,
) -> Result<PostGrouping> {
    let posts = store.load(Resource::Posts.as_str())?;
    let input = posts.len();
    let groups = partition_posts(posts, identity)?;

    let mut saved = Vec::with_capacity(groups.len());
    let mut collisions = Vec::new();
    let mut failed = Vec::new();
    for group in &groups {
        let derived = naming.name_for(&group.username);
        let name = match checked_name(&derived) {
            Ok(name) => name.to_string(),
            Err(e) => {
                tracing::warn!(username = %group.username, error = %e, "skipping posts");
                failed.push((group.username.clone(), e.to_string()));
                continue;
            }
        };
        if is_reserved_name(&name) {
            tracing::warn!(collection = %name, "{}", SnapshotError::NameCollision(name.clone()));
            collisions.push(name);
            continue;
        }
        match store.save(&name, &group.posts) {
            Ok(()) => saved.push(SavedGroup {
                username: group.username.clone(),
                collection: name,
            }),
            Err(e) => {
                tracing::warn!(username = %group.username, error = %e, "failed to save posts");
                failed.push((group.username.clone(), e.to_string()));
            }
        }
    }

    tracing::info!(
        posts = input,
        users = groups.len(),
        saved = saved.len(),
        failed = failed.len(),
        "grouped posts by user"
    );
    Ok(PostGrouping {
        groups,
        saved,
        collisions,
        failed,
    })
}

/// Filter incomplete todos, group them by user id, and persist as `todo_list`.
pub fn group_incomplete_tasks<S: CollectionStore>(store: &S, identity: &IdentityMap) -> Result<TodoList> {
    let todos = store.load(Resource::Todos.as_str())?;
    let input = todos.len();
    let list = partition_incomplete_tasks(todos, identity)?;
    store.save(TODO_LIST, &list)?;

    let pending: usize = list.values().map(|u| u.tasks.len()).sum();
    tracing::info!(todos = input, incomplete = pending, users = list.len(), "grouped incomplete tasks");
    Ok(list)
}
