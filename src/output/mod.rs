//! Output sink
//!
//! Optional interactive review, then the write to disk. A destination of
//! `-` keeps the text in memory only.

use crate::dialect::WritePolicy;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where the rendered program goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Return the text without writing anything
    Discard,
    File(PathBuf),
}

impl Destination {
    pub fn parse(s: &str) -> Self {
        if s == "-" {
            Destination::Discard
        } else {
            Destination::File(PathBuf::from(s))
        }
    }
}

impl From<&str> for Destination {
    fn from(s: &str) -> Self {
        Destination::parse(s)
    }
}

impl From<&Path> for Destination {
    fn from(p: &Path) -> Self {
        Destination::File(p.to_path_buf())
    }
}

/// Outcome of showing the program to the user
#[derive(Debug, Clone, PartialEq)]
pub enum Review {
    Accepted(String),
    Dismissed,
}

/// Presents rendered text for manual editing and blocks until the user is done
pub trait Reviewer {
    fn review(&mut self, text: &str) -> std::io::Result<Review>;
}

impl<F> Reviewer for F
where
    F: FnMut(&str) -> std::io::Result<Review>,
{
    fn review(&mut self, text: &str) -> std::io::Result<Review> {
        self(text)
    }
}

/// Opens the program in `$VISUAL`/`$EDITOR` (falling back to `vi`).
/// The variable may carry arguments, e.g. `code --wait`.
/// A zero exit status accepts the edited file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
}

impl Default for ExternalEditor {
    fn default() -> Self {
        let command = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_default();
        Self::new(&command)
    }
}

impl ExternalEditor {
    /// Split `command` on whitespace into the program and its leading arguments
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        match words.next() {
            Some(program) => Self {
                program,
                args: words.collect(),
            },
            None => Self {
                program: "vi".to_string(),
                args: Vec::new(),
            },
        }
    }
}

impl Reviewer for ExternalEditor {
    fn review(&mut self, text: &str) -> std::io::Result<Review> {
        let mut file = tempfile::Builder::new()
            .prefix("pathpost-")
            .suffix(".ngc")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .status()?;
        if !status.success() {
            tracing::info!("editor exited with {}, keeping rendered output", status);
            return Ok(Review::Dismissed);
        }

        let edited = std::fs::read_to_string(file.path())?;
        Ok(Review::Accepted(edited))
    }
}

/// Result of committing a program
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    /// Text after review, returned to the caller
    pub text: String,
    /// Path written, if any
    pub written: Option<PathBuf>,
}

/// Review (when requested), then write according to `policy`.
/// The reviewed text is always returned; `policy` only picks the bytes on disk.
pub fn commit(
    rendered: String,
    destination: &Destination,
    reviewer: Option<&mut dyn Reviewer>,
    policy: WritePolicy,
) -> Result<Committed, CommitError> {
    let reviewed = match reviewer {
        Some(reviewer) => match reviewer.review(&rendered).map_err(CommitError::Review)? {
            Review::Accepted(edited) => Some(edited),
            Review::Dismissed => None,
        },
        None => None,
    };

    let final_text = reviewed.unwrap_or_else(|| rendered.clone());

    let written = match destination {
        Destination::Discard => None,
        Destination::File(path) => {
            let bytes = match policy {
                WritePolicy::Edited => final_text.as_bytes(),
                WritePolicy::Original => rendered.as_bytes(),
            };
            std::fs::write(path, bytes).map_err(|source| CommitError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!("wrote {}", path.display());
            Some(path.clone())
        }
    };

    Ok(Committed {
        text: final_text,
        written,
    })
}

#[derive(thiserror::Error, Debug)]
pub enum CommitError {
    #[error("review failed: {0}")]
    Review(#[source] std::io::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
