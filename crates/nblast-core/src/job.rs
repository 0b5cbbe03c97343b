//! Job lifecycle shared by Sample, Config and Similarity entities.
//!
//! A long-running computation is expressed as a status field driven by an
//! external executor, not as a language-level coroutine: the executor claims
//! the unit (`Queued → Computing`) with an ownership token, runs the blocking
//! compute call, then finishes it (`Computing → Complete` or `→ Error`).
//!
//! Transitions are monotonic. A failed entity is never retried in place; a
//! fresh entity retries, preserving an immutable audit trail of attempts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConflictError, Result};

/// Message recorded when a unit is canceled cooperatively.
pub const CANCELED_MESSAGE: &str = "canceled";

/// Status of an asynchronously computed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Persisted, work not started.
    Queued,
    /// Claimed by exactly one executor.
    Computing,
    /// Terminal: derived fields populated and immutable.
    Complete,
    /// Terminal: carries a human-readable message.
    Error,
}

impl JobStatus {
    /// Stable lowercase name, matching the persisted status strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Computing => "computing",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

/// Per-entity job state: status, owning claim token, failure message.
///
/// The token is accepted at transition time so callers can detect and reject
/// double-claims; persisting it is the external store's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobState {
    /// Current status.
    pub status: JobStatus,
    /// Token of the claiming executor while `Computing`.
    pub claim_token: Option<Uuid>,
    /// Human-readable failure message once `Error`.
    pub error_message: Option<String>,
    /// When the entity was created (`Queued`).
    pub created_at: DateTime<Utc>,
    /// When the entity last changed status.
    pub updated_at: DateTime<Utc>,
}

impl JobState {
    /// Fresh state in `Queued`.
    pub fn queued() -> Self {
        let now = Utc::now();
        Self {
            status: JobStatus::Queued,
            claim_token: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Claim the unit for `token`: `Queued → Computing`.
    ///
    /// Re-claiming a `Computing` entity (any token, including the owner's)
    /// signals another executor already owns it. Terminal entities reject the
    /// transition outright.
    pub fn claim(&mut self, token: Uuid) -> Result<()> {
        match self.status {
            JobStatus::Queued => {
                self.status = JobStatus::Computing;
                self.claim_token = Some(token);
                self.updated_at = Utc::now();
                Ok(())
            }
            JobStatus::Computing => Err(ConflictError::AlreadyClaimed {
                owner: self.claim_token.unwrap_or(token),
            }
            .into()),
            _ => Err(ConflictError::IllegalTransition {
                from: self.status.as_str(),
                to: JobStatus::Computing.as_str(),
            }
            .into()),
        }
    }

    /// Finish successfully: `Computing → Complete`. Only the owner may finish.
    pub fn complete(&mut self, token: Uuid) -> Result<()> {
        self.finish(token, JobStatus::Complete, None)
    }

    /// Finish with a failure: `Computing → Error`.
    pub fn fail(&mut self, token: Uuid, message: impl Into<String>) -> Result<()> {
        self.finish(token, JobStatus::Error, Some(message.into()))
    }

    fn finish(&mut self, token: Uuid, to: JobStatus, message: Option<String>) -> Result<()> {
        if self.status != JobStatus::Computing {
            return Err(ConflictError::IllegalTransition {
                from: self.status.as_str(),
                to: to.as_str(),
            }
            .into());
        }
        if self.claim_token != Some(token) {
            return Err(ConflictError::NotOwner { token }.into());
        }
        self.status = to;
        self.error_message = message;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for JobState {
    fn default() -> Self {
        Self::queued()
    }
}

/// Cooperative cancellation signal, checked between object-pair iterations.
///
/// Cloning shares the flag; the executor keeps one clone and hands the other
/// to the compute call. There are no timeouts in the core; an executor that
/// wants one cancels the unit the same way.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that is never canceled unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NblastError;

    #[test]
    fn lifecycle_happy_path() {
        let mut state = JobState::queued();
        assert_eq!(state.status, JobStatus::Queued);

        let token = Uuid::new_v4();
        state.claim(token).unwrap();
        assert_eq!(state.status, JobStatus::Computing);
        assert_eq!(state.claim_token, Some(token));

        state.complete(token).unwrap();
        assert_eq!(state.status, JobStatus::Complete);
        assert!(state.status.is_terminal());
    }

    #[test]
    fn double_claim_is_conflict() {
        let mut state = JobState::queued();
        let first = Uuid::new_v4();
        state.claim(first).unwrap();

        let err = state.claim(Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            NblastError::Conflict(ConflictError::AlreadyClaimed { owner }) if owner == first
        ));
    }

    #[test]
    fn terminal_states_reject_reclaim() {
        let token = Uuid::new_v4();

        let mut done = JobState::queued();
        done.claim(token).unwrap();
        done.complete(token).unwrap();
        assert!(matches!(
            done.claim(Uuid::new_v4()).unwrap_err(),
            NblastError::Conflict(ConflictError::IllegalTransition { .. })
        ));

        let mut failed = JobState::queued();
        failed.claim(token).unwrap();
        failed.fail(token, "boom").unwrap();
        assert_eq!(failed.error_message.as_deref(), Some("boom"));
        assert!(matches!(
            failed.claim(Uuid::new_v4()).unwrap_err(),
            NblastError::Conflict(ConflictError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn only_owner_may_finish() {
        let mut state = JobState::queued();
        let owner = Uuid::new_v4();
        state.claim(owner).unwrap();

        let stranger = Uuid::new_v4();
        assert!(matches!(
            state.complete(stranger).unwrap_err(),
            NblastError::Conflict(ConflictError::NotOwner { token }) if token == stranger
        ));
        // Still computing, owner can finish.
        state.fail(owner, CANCELED_MESSAGE).unwrap();
        assert_eq!(state.status, JobStatus::Error);
    }

    #[test]
    fn queued_cannot_complete_directly() {
        let mut state = JobState::queued();
        assert!(matches!(
            state.complete(Uuid::new_v4()).unwrap_err(),
            NblastError::Conflict(ConflictError::IllegalTransition { from: "queued", .. })
        ));
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_canceled());
        token.cancel();
        assert!(clone.is_canceled());
    }
}
