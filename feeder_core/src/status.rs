//! Feeding status returned from each monitoring step.

use crate::history::FeedLogEntry;

/// What started a feeding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Manual,
    /// Index into the schedule store.
    Scheduled(usize),
}

impl Origin {
    pub fn is_manual(&self) -> bool {
        matches!(self, Origin::Manual)
    }

    /// Slot index as stored in the feed log; -1 for manual feeds.
    pub fn slot_index(&self) -> i8 {
        match self {
            Origin::Manual => -1,
            Origin::Scheduled(i) => i8::try_from(*i).unwrap_or(i8::MAX),
        }
    }
}

/// Which safety net (or success) ended a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    TargetReached,
    /// No qualifying weight increase within the stuck window.
    Stuck,
    /// Absolute runtime ceiling exceeded.
    Timeout,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::TargetReached => "TargetReached",
            FinishReason::Stuck => "Stuck",
            FinishReason::Timeout => "Timeout",
        }
    }
}

/// Public status of a single monitoring step.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// No session active.
    Idle,
    /// Keep going; gate still open.
    Running,
    /// Session resolved; gate already closed.
    Finished(FeedLogEntry),
}
