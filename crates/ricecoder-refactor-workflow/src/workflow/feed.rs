//! Subscription feeds for workflow state and errors
//!
//! Both feeds sit on tokio broadcast channels. A [`StateFeed`] first yields
//! the state current at subscription time and then every later transition,
//! with no gap and no duplicate between the two.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use super::state::WorkflowState;
use crate::error::RefactorError;

/// Feed of workflow states
#[derive(Debug)]
pub struct StateFeed {
    current: Option<WorkflowState>,
    receiver: broadcast::Receiver<WorkflowState>,
}

impl StateFeed {
    pub(crate) fn new(
        current: WorkflowState,
        receiver: broadcast::Receiver<WorkflowState>,
    ) -> Self {
        Self {
            current: Some(current),
            receiver,
        }
    }

    /// Next state; `None` once the coordinator is gone
    pub async fn next(&mut self) -> Option<WorkflowState> {
        if let Some(state) = self.current.take() {
            return Some(state);
        }
        loop {
            match self.receiver.recv().await {
                Ok(state) => return Some(state),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("State feed lagged, skipped {} states", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next state if one is already queued
    pub fn try_next(&mut self) -> Option<WorkflowState> {
        if let Some(state) = self.current.take() {
            return Some(state);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(state) => return Some(state),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("State feed lagged, skipped {} states", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Wait for the first state matching `predicate`
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Option<WorkflowState>
    where
        F: FnMut(&WorkflowState) -> bool,
    {
        while let Some(state) = self.next().await {
            if predicate(&state) {
                return Some(state);
            }
        }
        None
    }
}

/// Out-of-band feed of workflow failures
#[derive(Debug)]
pub struct ErrorFeed {
    receiver: broadcast::Receiver<Arc<RefactorError>>,
}

impl ErrorFeed {
    pub(crate) fn new(receiver: broadcast::Receiver<Arc<RefactorError>>) -> Self {
        Self { receiver }
    }

    /// Next error; `None` once the coordinator is gone
    pub async fn next(&mut self) -> Option<Arc<RefactorError>> {
        loop {
            match self.receiver.recv().await {
                Ok(err) => return Some(err),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Error feed lagged, skipped {} errors", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next error if one is already queued
    pub fn try_next(&mut self) -> Option<Arc<RefactorError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(err) => return Some(err),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Error feed lagged, skipped {} errors", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
