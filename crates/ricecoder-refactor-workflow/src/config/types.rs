//! Configuration types for the refactor workflow

use serde::{Deserialize, Serialize};

use crate::error::{RefactorError, RefactorResult};

/// Default capacity of the state feed
pub const DEFAULT_STATE_FEED_CAPACITY: usize = 256;

/// Default capacity of the error feed
pub const DEFAULT_ERROR_FEED_CAPACITY: usize = 64;

/// Refactor workflow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Buffered state transitions per subscriber
    pub state_feed_capacity: usize,
    /// Buffered errors per subscriber
    pub error_feed_capacity: usize,
    /// Skip edits that overlap or precede the previous edit in the same file
    pub reject_overlapping_edits: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            state_feed_capacity: DEFAULT_STATE_FEED_CAPACITY,
            error_feed_capacity: DEFAULT_ERROR_FEED_CAPACITY,
            reject_overlapping_edits: true,
        }
    }
}

impl WorkflowConfig {
    /// Validate the configuration
    pub fn validate(&self) -> RefactorResult<()> {
        if self.state_feed_capacity == 0 {
            return Err(RefactorError::InvalidConfiguration(
                "state_feed_capacity must be greater than zero".to_string(),
            ));
        }

        if self.error_feed_capacity == 0 {
            return Err(RefactorError::InvalidConfiguration(
                "error_feed_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
