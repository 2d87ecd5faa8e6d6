//! The modification log: every step prints one line and remembers it, and the
//! whole trail is flushed to a timestamped text file when the run ends.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::backup;
use crate::error::Error;

/// Ordered, human-readable record of what a run did.
#[derive(Debug)]
pub struct ModificationLog {
    /// Lines in the order they were recorded.
    entries: Vec<String>,
    /// First line of the written log file.
    title: &'static str,
}

impl ModificationLog {
    /// Start an empty log with the given file title.
    pub const fn new(title: &'static str) -> Self {
        return Self {
            entries: Vec::new(),
            title,
        };
    }

    /// Print a line to stdout and append it to the log.
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        println!("{message}");
        self.entries.push(message);
    }

    /// File body: title, a rule, a blank line, then one entry per line.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n{}\n\n", self.title, "=".repeat(50));
        for entry in &self.entries {
            let _ = writeln!(out, "{entry}");
        }
        return out;
    }

    /// Write the log to `<dir>/<prefix>_<stamp>.txt` without clobbering an
    /// existing file, and return the path written.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be written.
    pub fn write(&self, dir: &Path, prefix: &str, stamp: &str) -> Result<PathBuf, Error> {
        let path = backup::unclaimed_path(&dir.join(format!("{prefix}_{stamp}.txt")));
        std::fs::write(&path, self.render())?;
        return Ok(path);
    }
}
