//! Edit application against live file contents

pub mod applier;
pub mod buffer;

pub use applier::{ApplyReport, ConflictReason, EditApplier, EditConflict, FileOutcome};
pub use buffer::{FileSystemBuffers, InMemoryBuffers, TextBuffer};
