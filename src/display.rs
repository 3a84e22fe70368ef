//! Console output: collection dumps, search reports, and the green labels
//! used to make collection names stand out.

use std::io::{self, Write};

use crate::grouping::{PostGrouping, TodoList};
use crate::search::{matches_value, SearchHit};
use crate::error::{Result, SnapshotError};
use crate::store::{to_indented, CollectionStore};

const GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

/// When to emit ANSI color codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn palette(&self) -> Palette {
        let enabled = match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => atty::is(atty::Stream::Stdout),
        };
        Palette { enabled }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Palette {
    pub enabled: bool,
}

impl Palette {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn highlight(&self, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", GREEN, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Console writer bundling the output sink, palette, and indent width.
pub struct Console<W: Write> {
    out: W,
    palette: Palette,
    indent: usize,
}

impl Console<io::Stdout> {
    pub fn stdout(palette: Palette, indent: usize) -> Self {
        Self::new(io::stdout(), palette, indent)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, palette: Palette, indent: usize) -> Self {
        Self {
            out,
            palette,
            indent,
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn label(&mut self, text: &str) -> io::Result<()> {
        let styled = self.palette.highlight(text);
        writeln!(self.out, "{}", styled)
    }

    /// Print the stored collection followed by a blank line.
    ///
    /// A collection that cannot be loaded is reported in place of its
    /// content and `Ok(false)` is returned; only output errors are `Err`.
    pub fn show_collection<S: CollectionStore>(&mut self, store: &S, name: &str) -> io::Result<bool> {
        match store.render(name, self.indent) {
            Ok(text) => {
                writeln!(self.out, "{}\n\n", text)?;
                Ok(true)
            }
            Err(e) => {
                tracing::debug!(collection = name, error = %e, "cannot show collection");
                self.report_error(&e)?;
                Ok(false)
            }
        }
    }

    /// Human-readable report of a failure: `<name> not found` for missing
    /// collections, `Error: <detail>` for everything else.
    pub fn report_error(&mut self, err: &SnapshotError) -> io::Result<()> {
        if err.is_not_found() {
            writeln!(self.out, "{}", err)
        } else {
            writeln!(self.out, "Error: {}", err)
        }
    }

    /// Print each user's posts under a highlighted heading, then the users
    /// whose posts were not saved.
    pub fn show_post_groups<S: CollectionStore>(&mut self, store: &S, grouping: &PostGrouping) -> io::Result<()> {
        for saved in &grouping.saved {
            self.label(&format!("Posts for {}", saved.username))?;
            self.show_collection(store, &saved.collection)?;
        }
        for name in &grouping.collisions {
            writeln!(
                self.out,
                "Skipped posts for {}: name collides with a reserved collection",
                name
            )?;
        }
        for (username, reason) in &grouping.failed {
            writeln!(self.out, "Could not save posts for {}: {}", username, reason)?;
        }
        Ok(())
    }

    pub fn show_todo_summary(&mut self, list: &TodoList) -> io::Result<()> {
        let pending: usize = list.values().map(|u| u.tasks.len()).sum();
        writeln!(
            self.out,
            "{} incomplete tasks across {} users",
            pending,
            list.len()
        )
    }

    /// Print one collection's search outcome.
    pub fn show_search_hit(&mut self, hit: &SearchHit) -> Result<()> {
        if hit.is_empty() {
            writeln!(self.out, "No results found in {}", hit.collection)?;
            return Ok(());
        }
        let body = to_indented(&hit.collection, &matches_value(hit), self.indent)?;
        writeln!(self.out, "\n")?;
        self.label(&format!("File: {}", hit.collection))?;
        writeln!(self.out, "{}", body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::SavedGroup;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), Palette::plain(), 1)
    }

    fn text(c: Console<Vec<u8>>) -> String {
        String::from_utf8(c.into_inner()).unwrap()
    }

    #[test]
    fn test_highlight() {
        assert_eq!(Palette { enabled: true }.highlight("x"), "\x1b[92mx\x1b[0m");
        assert_eq!(Palette::plain().highlight("x"), "x");
        assert!(ColorMode::Always.palette().enabled);
        assert!(!ColorMode::Never.palette().enabled);
    }

    #[test]
    fn test_show_collection_missing() {
        let store = MemoryStore::new();
        let mut c = console();
        assert!(!c.show_collection(&store, "alice").unwrap());
        assert_eq!(text(c), "alice.json not found\n");
    }

    #[test]
    fn test_show_collection_indented() {
        let store = MemoryStore::new();
        store.save("alice", &json!([{"id": 1}])).unwrap();
        let mut c = console();
        assert!(c.show_collection(&store, "alice").unwrap());
        assert_eq!(text(c), "[\n {\n  \"id\": 1\n }\n]\n\n\n");
    }

    #[test]
    fn test_show_search_hit() {
        let empty = SearchHit {
            collection: "albums".to_string(),
            matches: Vec::new(),
        };
        let mut c = console();
        c.show_search_hit(&empty).unwrap();
        assert_eq!(text(c), "No results found in albums\n");

        let rec = crate::store::into_records("t", json!([{"id": 9}])).unwrap();
        let hit = SearchHit {
            collection: "posts".to_string(),
            matches: rec,
        };
        let mut c = Console::new(Vec::new(), Palette { enabled: true }, 1);
        c.show_search_hit(&hit).unwrap();
        let out = text(c);
        assert!(out.contains("\x1b[92mFile: posts\x1b[0m"));
        assert!(out.contains("\"id\": 9"));
    }

    /// Writer whose every write fails, standing in for a closed stdout.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_errors_propagate() {
        let store = MemoryStore::new();
        store.save("alice", &json!([{"id": 1}])).unwrap();
        let mut c = Console::new(BrokenPipe, Palette::plain(), 1);
        assert!(c.show_collection(&store, "alice").is_err());
        assert!(c.show_collection(&store, "nobody").is_err());

        let hit = SearchHit {
            collection: "albums".to_string(),
            matches: Vec::new(),
        };
        let err = c.show_search_hit(&hit).unwrap_err();
        assert!(matches!(err, SnapshotError::Output(_)));
    }

    #[test]
    fn test_post_groups_headed_by_username() {
        let store = MemoryStore::new();
        store.save("user_alice", &json!([{"id": 1}])).unwrap();
        let grouping = PostGrouping {
            saved: vec![SavedGroup {
                username: "alice".to_string(),
                collection: "user_alice".to_string(),
            }],
            collisions: vec!["users".to_string()],
            failed: vec![("../bob".to_string(), "'../bob' is not a valid collection name".to_string())],
            ..Default::default()
        };
        let mut c = console();
        c.show_post_groups(&store, &grouping).unwrap();
        let out = text(c);
        assert!(out.starts_with("Posts for alice\n[\n {\n  \"id\": 1"));
        assert!(!out.contains("Posts for user_alice"));
        assert!(out.contains("Skipped posts for users"));
        assert!(out.contains("Could not save posts for ../bob"));
    }
}
