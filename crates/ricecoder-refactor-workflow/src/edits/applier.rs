//! Applies computed edits against live file contents
//!
//! Each edit carries the text it expects to replace. Edits whose expectation
//! no longer holds are skipped and reported as conflicts; they never abort
//! the application. Files are independent: a conflict in one file does not
//! undo edits already written to another.
//!
//! Within a file, edits are checked in the given (document) order against
//! the contents as they were before any write, then the accepted edits are
//! written last-to-first so earlier replacements cannot shift later ranges.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::buffer::TextBuffer;
use crate::error::{panic_message, RefactorError, RefactorResult};
use crate::types::{EditMap, Range, TextEdit};

/// Why an edit was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// The live text differs from the edit's expected text
    TextMismatch { found: String },
    /// The edit starts before the previous accepted edit ends
    Overlapping,
    /// The range could not be read
    Unreadable { message: String },
    /// The replacement could not be written
    WriteFailed { message: String },
}

/// An edit that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditConflict {
    pub edit: TextEdit,
    pub reason: ConflictReason,
}

impl EditConflict {
    /// Describe the conflict as an error for `file`
    pub fn to_error(&self, file: &Path) -> RefactorError {
        let message = match &self.reason {
            ConflictReason::TextMismatch { found } => format!(
                "expected '{}' at {}, found '{}'",
                self.edit.old_text, self.edit.old_range, found
            ),
            ConflictReason::Overlapping => {
                format!("edit at {} overlaps a previous edit", self.edit.old_range)
            }
            ConflictReason::Unreadable { message } => {
                format!("cannot read {}: {}", self.edit.old_range, message)
            }
            ConflictReason::WriteFailed { message } => {
                format!("cannot write {}: {}", self.edit.old_range, message)
            }
        };
        RefactorError::EditConflict {
            file: file.to_path_buf(),
            message,
        }
    }
}

/// Result of applying one file's edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Every edit was applied
    Applied { edits: usize },
    /// Some edits were skipped
    Conflicted {
        applied: usize,
        conflicts: Vec<EditConflict>,
    },
}

impl FileOutcome {
    /// Number of edits written
    pub fn applied(&self) -> usize {
        match self {
            FileOutcome::Applied { edits } => *edits,
            FileOutcome::Conflicted { applied, .. } => *applied,
        }
    }

    /// Whether any edit was skipped
    pub fn has_conflicts(&self) -> bool {
        matches!(self, FileOutcome::Conflicted { .. })
    }
}

/// Per-file outcomes of one application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub files: BTreeMap<PathBuf, FileOutcome>,
}

impl ApplyReport {
    /// Whether every edit in every file was applied
    pub fn is_clean(&self) -> bool {
        self.files.values().all(|outcome| !outcome.has_conflicts())
    }

    /// Total number of edits written
    pub fn applied_edits(&self) -> usize {
        self.files.values().map(FileOutcome::applied).sum()
    }

    /// Files with at least one skipped edit
    pub fn conflicted_files(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|(_, outcome)| outcome.has_conflicts())
            .map(|(file, _)| file.as_path())
            .collect()
    }

    /// Every conflict as an [`RefactorError::EditConflict`]
    pub fn conflict_errors(&self) -> Vec<RefactorError> {
        self.files
            .iter()
            .filter_map(|(file, outcome)| match outcome {
                FileOutcome::Conflicted { conflicts, .. } => Some(
                    conflicts
                        .iter()
                        .map(|conflict| conflict.to_error(file))
                        .collect::<Vec<_>>(),
                ),
                FileOutcome::Applied { .. } => None,
            })
            .flatten()
            .collect()
    }
}

/// Applies edit maps to a [`TextBuffer`]
#[derive(Clone)]
pub struct EditApplier {
    buffers: Arc<dyn TextBuffer>,
    reject_overlapping: bool,
}

impl EditApplier {
    /// Create an applier over the given buffers
    pub fn new(buffers: Arc<dyn TextBuffer>) -> Self {
        Self {
            buffers,
            reject_overlapping: true,
        }
    }

    /// Whether overlapping or out-of-order edits are skipped as conflicts
    pub fn reject_overlapping(mut self, reject: bool) -> Self {
        self.reject_overlapping = reject;
        self
    }

    /// Apply every file's edits, best effort per file
    pub fn apply(&self, edits: &EditMap) -> ApplyReport {
        let mut report = ApplyReport::default();
        for (file, file_edits) in edits {
            let outcome = self.apply_file(file, file_edits);
            match &outcome {
                FileOutcome::Applied { edits } => {
                    info!("Applied {} edits to {}", edits, file.display());
                }
                FileOutcome::Conflicted { applied, conflicts } => {
                    for conflict in conflicts {
                        warn!("{}", conflict.to_error(file));
                    }
                    warn!(
                        "Applied {} of {} edits to {}",
                        applied,
                        file_edits.len(),
                        file.display()
                    );
                }
            }
            report.files.insert(file.clone(), outcome);
        }
        report
    }

    fn apply_file(&self, file: &Path, edits: &[TextEdit]) -> FileOutcome {
        let mut accepted: Vec<&TextEdit> = Vec::with_capacity(edits.len());
        let mut conflicts = Vec::new();
        let mut last_accepted: Option<Range> = None;

        for edit in edits {
            if self.reject_overlapping
                && last_accepted.is_some_and(|last| last.overlaps_start_of(&edit.old_range))
            {
                conflicts.push(EditConflict {
                    edit: edit.clone(),
                    reason: ConflictReason::Overlapping,
                });
                continue;
            }

            match self.read(file, edit.old_range) {
                Ok(current) if current == edit.old_text => {
                    last_accepted = Some(edit.old_range);
                    accepted.push(edit);
                }
                Ok(found) => conflicts.push(EditConflict {
                    edit: edit.clone(),
                    reason: ConflictReason::TextMismatch { found },
                }),
                Err(err) => conflicts.push(EditConflict {
                    edit: edit.clone(),
                    reason: ConflictReason::Unreadable {
                        message: err.to_string(),
                    },
                }),
            }
        }

        let mut applied = 0;
        for edit in accepted.into_iter().rev() {
            match self.write(file, edit.old_range, &edit.new_text) {
                Ok(()) => applied += 1,
                Err(err) => conflicts.push(EditConflict {
                    edit: edit.clone(),
                    reason: ConflictReason::WriteFailed {
                        message: err.to_string(),
                    },
                }),
            }
        }

        if conflicts.is_empty() {
            FileOutcome::Applied { edits: applied }
        } else {
            FileOutcome::Conflicted { applied, conflicts }
        }
    }

    // a panicking buffer fails the edit, not the whole application
    fn read(&self, file: &Path, range: Range) -> RefactorResult<String> {
        panic::catch_unwind(AssertUnwindSafe(|| self.buffers.read_range(file, range)))
            .unwrap_or_else(|payload| Err(buffer_panic(payload)))
    }

    fn write(&self, file: &Path, range: Range, text: &str) -> RefactorResult<()> {
        panic::catch_unwind(AssertUnwindSafe(|| self.buffers.write_range(file, range, text)))
            .unwrap_or_else(|payload| Err(buffer_panic(payload)))
    }
}

fn buffer_panic(payload: Box<dyn std::any::Any + Send>) -> RefactorError {
    RefactorError::buffer(format!("buffer panicked: {}", panic_message(payload.as_ref())))
}
