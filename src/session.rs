//! Interactive keyword search loop.
//!
//! The session is a two-state machine: it stays in
//! [`SessionState::Prompting`] while the user answers with the affirmative
//! token and moves to [`SessionState::Terminated`] on any other answer or
//! at end of input. Input and output are generic so the loop can be
//! driven from tests.

use std::io::{self, BufRead, Write};

use crate::display::Console;
use crate::models::Resource;
use crate::search::search_collections;
use crate::store::CollectionStore;

pub const SEARCH_PROMPT: &str = "Would you like to search for keywords or user information? (Y/N)";
pub const KEYWORD_PROMPT: &str = "What would you like to search for?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Prompting,
    Terminated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Keywords searched, in order.
    pub searches: Vec<String>,
}

pub struct Session<'a, S: CollectionStore, R: BufRead, W: Write> {
    store: &'a S,
    input: R,
    console: Console<W>,
    affirmative: String,
    collections: Vec<String>,
    state: SessionState,
}

impl<'a, S: CollectionStore, R: BufRead, W: Write> Session<'a, S, R, W> {
    pub fn new(store: &'a S, input: R, console: Console<W>, affirmative: &str) -> Self {
        Self {
            store,
            input,
            console,
            affirmative: affirmative.trim().to_string(),
            collections: Resource::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            state: SessionState::Prompting,
        }
    }

    /// Override the collections searched (default: the six base resources).
    pub fn with_collections(mut self, names: Vec<String>) -> Self {
        self.collections = names;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run until the user declines or input ends.
    pub fn run(&mut self) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        while self.state == SessionState::Prompting {
            if let Some(keyword) = self.step()? {
                summary.searches.push(keyword);
            }
        }
        Ok(summary)
    }

    /// One prompt cycle. Returns the keyword searched, if any.
    pub fn step(&mut self) -> io::Result<Option<String>> {
        self.console.line(SEARCH_PROMPT)?;
        self.console.writer().flush()?;
        let answer = match self.read_line()? {
            Some(a) => a,
            None => {
                self.state = SessionState::Terminated;
                return Ok(None);
            }
        };
        if !answer.trim().eq_ignore_ascii_case(&self.affirmative) {
            tracing::debug!(answer = answer.trim(), "session ended by user");
            self.state = SessionState::Terminated;
            return Ok(None);
        }

        self.console.line(KEYWORD_PROMPT)?;
        self.console.writer().flush()?;
        let keyword = match self.read_line()? {
            Some(k) => k.trim().to_string(),
            None => {
                self.state = SessionState::Terminated;
                return Ok(None);
            }
        };
        if keyword.is_empty() {
            self.console.line("No keyword given.")?;
            return Ok(None);
        }

        for (name, result) in search_collections(self.store, &self.collections, &keyword) {
            match result {
                Ok(hit) => {
                    if let Err(e) = self.console.show_search_hit(&hit) {
                        self.console.report_error(&e)?;
                    }
                }
                Err(e) => {
                    tracing::debug!(collection = %name, error = %e, "search skipped collection");
                    self.console.report_error(&e)?;
                }
            }
        }
        self.console.writer().flush()?;
        Ok(Some(keyword))
    }

    pub fn into_console(self) -> Console<W> {
        self.console
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        let n = self.input.read_line(&mut buf)?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
        }
    }
}
