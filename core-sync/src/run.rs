//! # Reconciliation Run State Machine
//!
//! Tracks one reconciliation run through its phases with validated
//! transitions and records the outcome of every mutation attempt.
//!
//! ## State Machine
//!
//! ```text
//! Planning → Mutating → Done
//!     ↓          ↓   → Failed   (every attempted mutation failed)
//!     └──────→ Aborted          (fatal error, e.g. rejected credentials)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_sync::run::{MutationOutcome, ReconciliationRun, RunPhase};
//!
//! let run = ReconciliationRun::new("PLsource", "PLtarget");
//! let mut run = run.begin_mutations()?;
//! run.record(MutationOutcome::inserted("vid1", "Artist - Song"))?;
//! let run = run.finish()?;
//! assert_eq!(run.phase, RunPhase::Done);
//! # Ok::<(), core_sync::SyncError>(())
//! ```

use crate::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a run ID from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| SyncError::Config(format!("Invalid run id '{}': {}", s, e)))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    /// Fetching snapshots and computing removals and insertions
    Planning,
    /// Issuing remote mutations
    Mutating,
    /// Finished; at least one mutation succeeded or none were attempted
    Done,
    /// Finished; every attempted mutation failed
    Failed,
    /// Stopped by a fatal error
    Aborted,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed | RunPhase::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Planning => "planning",
            RunPhase::Mutating => "mutating",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
            RunPhase::Aborted => "aborted",
        }
    }
}

impl FromStr for RunPhase {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(RunPhase::Planning),
            "mutating" => Ok(RunPhase::Mutating),
            "done" => Ok(RunPhase::Done),
            "failed" => Ok(RunPhase::Failed),
            "aborted" => Ok(RunPhase::Aborted),
            _ => Err(SyncError::Config(format!("Unknown run phase '{}'", s))),
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Insert,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MutationResult {
    Succeeded,
    Failed { reason: String },
}

/// Outcome of one insert or remove attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    /// Media id for inserts, membership id for removals
    pub subject_id: String,
    pub title: String,
    pub result: MutationResult,
}

impl MutationOutcome {
    pub fn inserted(media_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Insert,
            subject_id: media_id.into(),
            title: title.into(),
            result: MutationResult::Succeeded,
        }
    }

    pub fn removed(membership_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Remove,
            subject_id: membership_id.into(),
            title: title.into(),
            result: MutationResult::Succeeded,
        }
    }

    pub fn failed(
        kind: MutationKind,
        subject_id: impl Into<String>,
        title: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject_id: subject_id.into(),
            title: title.into(),
            result: MutationResult::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, MutationResult::Succeeded)
    }
}

/// One reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRun {
    pub id: RunId,
    pub source_id: String,
    pub target_id: String,
    pub phase: RunPhase,
    /// Outcomes in the order mutations were attempted
    pub outcomes: Vec<MutationOutcome>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub mutations_started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ReconciliationRun {
    /// Create a new run in the planning phase
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            id: RunId::new(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            phase: RunPhase::Planning,
            outcomes: Vec::new(),
            error_message: None,
            created_at: Utc::now(),
            mutations_started_at: None,
            finished_at: None,
        }
    }

    /// Move from planning to mutating
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not in `Planning`
    pub fn begin_mutations(mut self) -> Result<Self> {
        self.validate_transition(RunPhase::Mutating)?;
        self.phase = RunPhase::Mutating;
        self.mutations_started_at = Some(Utc::now());
        Ok(self)
    }

    /// Record the outcome of one mutation attempt
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not in `Mutating`
    pub fn record(&mut self, outcome: MutationOutcome) -> Result<()> {
        if self.phase != RunPhase::Mutating {
            return Err(SyncError::InvalidStateTransition {
                from: self.phase.as_str().to_string(),
                to: "record".to_string(),
                reason: "Run must be mutating to record outcomes".to_string(),
            });
        }

        self.outcomes.push(outcome);
        Ok(())
    }

    /// Finish the run
    ///
    /// Ends in `Failed` only when at least one mutation was attempted and
    /// none succeeded; otherwise `Done`.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not in `Mutating`
    pub fn finish(mut self) -> Result<Self> {
        let to = if self.attempted() > 0 && self.succeeded() == 0 {
            RunPhase::Failed
        } else {
            RunPhase::Done
        };

        self.validate_transition(to)?;
        self.phase = to;
        self.finished_at = Some(Utc::now());
        Ok(self)
    }

    /// Stop the run after a fatal error
    ///
    /// # Errors
    ///
    /// Returns an error if the run already finished
    pub fn abort(mut self, error_message: impl Into<String>) -> Result<Self> {
        self.validate_transition(RunPhase::Aborted)?;
        self.phase = RunPhase::Aborted;
        self.error_message = Some(error_message.into());
        self.finished_at = Some(Utc::now());
        Ok(self)
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// Outcomes of one kind, in attempt order
    pub fn outcomes_of(&self, kind: MutationKind) -> impl Iterator<Item = &MutationOutcome> {
        self.outcomes.iter().filter(move |o| o.kind == kind)
    }

    /// Wall-clock duration, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.created_at)
    }

    fn validate_transition(&self, to: RunPhase) -> Result<()> {
        let valid = match (self.phase, to) {
            (RunPhase::Planning, RunPhase::Mutating) => true,
            (RunPhase::Planning, RunPhase::Aborted) => true,

            (RunPhase::Mutating, RunPhase::Done) => true,
            (RunPhase::Mutating, RunPhase::Failed) => true,
            (RunPhase::Mutating, RunPhase::Aborted) => true,

            // Terminal phases cannot transition
            _ => false,
        };

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.phase.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.phase.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}
