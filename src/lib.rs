//! # JSON Snapshot
//!
//! Take a local snapshot of a small public REST dataset, group it per
//! user, and search it from the console.
//!
//! The tool downloads a fixed set of collections (`posts`, `comments`,
//! `albums`, `photos`, `todos`, `users`), saves each as an indented JSON
//! file, derives one post collection per user plus a `todo_list` of
//! incomplete tasks, and then runs an interactive keyword search over the
//! cached files.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌──────────────┐
//! │  Remote    │──▶│ Collection │──▶│  Identity +  │
//! │  source    │   │   store    │   │  Grouping    │
//! └────────────┘   └─────┬──────┘   └──────────────┘
//!                        │
//!                        ▼
//!                 ┌─────────────┐
//!                 │  Keyword    │◀── interactive session
//!                 │  search     │
//!                 └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! jsnap                    # fetch, group, display, then prompt for searches
//! jsnap fetch              # only refresh the cached collections
//! jsnap search "quia"      # one-shot search
//! jsnap list               # what is cached
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`error`] | Typed error taxonomy |
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Records, resources, grouped types |
//! | [`store`] | Collection store trait and backends |
//! | [`fetch`] | Remote source and fetch-all |
//! | [`progress`] | Fetch progress reporting |
//! | [`identity`] | Username ↔ id map |
//! | [`grouping`] | Posts per user, incomplete todos per user |
//! | [`search`] | Linear keyword search |
//! | [`session`] | Interactive prompt loop |
//! | [`display`] | Console output |
//! | [`list`] | Cached collection overview |
//! | [`pipeline`] | Step orchestration |

pub mod config;
pub mod display;
pub mod error;
pub mod fetch;
pub mod grouping;
pub mod identity;
pub mod list;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod search;
pub mod session;
pub mod store;
