//! End-to-end orchestration: fetch → identity → grouping → display → session.
//!
//! Each step reports its own failures to the console and the next step
//! runs if its inputs exist. Upstream failures are checked explicitly:
//! grouping is skipped with a message when `users` could not be fetched or
//! loaded, instead of running against missing data.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::config::Config;
use crate::display::Console;
use crate::fetch::{fetch_all, FetchSummary, RemoteSource};
use crate::grouping::{group_incomplete_tasks, group_posts_by_user, DerivedNaming, PostGrouping, TodoList};
use crate::identity::{build_identity_map, IdentityMap};
use crate::models::{Resource, TODO_LIST};
use crate::progress::FetchProgressReporter;
use crate::search::search_collections;
use crate::session::{Session, SessionSummary};
use crate::store::CollectionStore;

/// What the grouping step produced.
#[derive(Debug, Default)]
pub struct GroupingOutcome {
    pub identity: Option<IdentityMap>,
    pub posts: Option<PostGrouping>,
    pub todos: Option<TodoList>,
}

/// Fetch every configured resource and save it.
pub fn run_fetch<R, S, W>(
    config: &Config,
    source: &R,
    store: &S,
    reporter: &dyn FetchProgressReporter,
    console: &mut Console<W>,
) -> Result<FetchSummary>
where
    R: RemoteSource + ?Sized,
    S: CollectionStore,
    W: Write,
{
    console.line(&format!("Getting data from {}\n", source.describe()))?;
    let summary = fetch_all(source, store, &config.source.resources, reporter);

    for (resource, _) in &summary.saved {
        console.line(&format!("Creating json file for {}", resource))?;
    }
    for (resource, reason) in &summary.failed {
        console.line(&format!("Request error for {}: {}", resource, reason))?;
    }
    Ok(summary)
}

/// Build the identity map, group posts and incomplete todos, and print both.
pub fn run_grouping<S, W>(config: &Config, store: &S, console: &mut Console<W>) -> Result<GroupingOutcome>
where
    S: CollectionStore,
    W: Write,
{
    let mut outcome = GroupingOutcome::default();

    console.line("\nCategorizing posts by user")?;
    let identity = match build_identity_map(store) {
        Ok(map) => map,
        Err(e) => {
            console.report_error(&e)?;
            console.line("Skipping grouping: user identities are unavailable.")?;
            return Ok(outcome);
        }
    };

    let naming = DerivedNaming::new(config.store.derived_prefix.clone());
    match group_posts_by_user(store, &identity, &naming) {
        Ok(grouping) => {
            console.show_post_groups(store, &grouping)?;
            outcome.posts = Some(grouping);
        }
        Err(e) => {
            tracing::warn!(error = %e, "post grouping aborted");
            console.report_error(&e)?;
        }
    }

    match group_incomplete_tasks(store, &identity) {
        Ok(list) => {
            console.show_todo_summary(&list)?;
            console.show_collection(store, TODO_LIST)?;
            outcome.todos = Some(list);
        }
        Err(e) => {
            tracing::warn!(error = %e, "todo grouping aborted");
            console.report_error(&e)?;
        }
    }

    outcome.identity = Some(identity);
    Ok(outcome)
}

/// One-shot search across the base collections.
pub fn run_search<S, W>(store: &S, keyword: &str, console: &mut Console<W>) -> Result<usize>
where
    S: CollectionStore,
    W: Write,
{
    if keyword.trim().is_empty() {
        console.line("No keyword given.")?;
        return Ok(0);
    }

    let mut total = 0;
    let names: Vec<&str> = Resource::ALL.iter().map(|r| r.as_str()).collect();
    for (_, result) in search_collections(store, &names, keyword.trim()) {
        match result {
            Ok(hit) => {
                total += hit.len();
                if let Err(e) = console.show_search_hit(&hit) {
                    console.report_error(&e)?;
                }
            }
            Err(e) => console.report_error(&e)?,
        }
    }
    Ok(total)
}

/// Run the interactive session over `input`, writing to `console`.
pub fn run_session<S, R, W>(config: &Config, store: &S, input: R, console: Console<W>) -> Result<SessionSummary>
where
    S: CollectionStore,
    R: BufRead,
    W: Write,
{
    let mut session = Session::new(store, input, console, &config.session.affirmative);
    Ok(session.run()?)
}

/// The default invocation: fetch, group, display, then search interactively.
pub fn run_all<R, S, I, W>(
    config: &Config,
    source: &R,
    store: &S,
    reporter: &dyn FetchProgressReporter,
    input: I,
    mut console: Console<W>,
) -> Result<SessionSummary>
where
    R: RemoteSource + ?Sized,
    S: CollectionStore,
    I: BufRead,
    W: Write,
{
    let fetched = run_fetch(config, source, store, reporter, &mut console)?;
    if !fetched.is_saved(Resource::Users) && store.contains(Resource::Users.as_str()) {
        console.line("Using previously cached users.")?;
    }

    run_grouping(config, store, &mut console)?;
    run_session(config, store, input, console)
}
