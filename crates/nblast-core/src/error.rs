//! Error types for nblast-core.
//!
//! Each sub-error covers one failure domain; [`NblastError`] unifies them so
//! callers can match on the kind without losing detail. Validation errors are
//! raised synchronously, before a job ever transitions to `Computing`.
//! Failures inside a running job are caught at the job boundary and recorded
//! as the entity's `Error` status instead of propagating.

use thiserror::Error;
use uuid::Uuid;

/// Result alias used throughout nblast-core.
pub type Result<T> = std::result::Result<T, NblastError>;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Input validation failures, raised before any computation starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Bin-edge array is too short or not strictly increasing.
    #[error("Invalid breaks '{name}': {reason}")]
    InvalidBreaks {
        /// Which break array failed (`distance_breaks` or `dot_breaks`)
        name: &'static str,
        /// Detailed reason
        reason: String,
    },

    /// A flat coordinate array whose length is not divisible by 3.
    #[error("Point array length {len} is not divisible by 3")]
    PointsNotTriples {
        /// Offending array length
        len: usize,
    },

    /// Two matrices that must share a bin grid have different shapes.
    #[error("Matrix shape mismatch: {expected:?} vs {actual:?}")]
    ShapeMismatch {
        /// Shape of the first matrix (rows, cols)
        expected: (usize, usize),
        /// Shape of the second matrix (rows, cols)
        actual: (usize, usize),
    },

    /// A sample histogram with zero total count cannot be normalized.
    #[error("Sample {0} has zero total count, cannot normalize")]
    ZeroTotalCount(Uuid),

    /// A tuning parameter is outside its valid range.
    #[error("Invalid tuning parameter {name}: {reason}")]
    InvalidTuning {
        /// Parameter name
        name: &'static str,
        /// Detailed reason
        reason: String,
    },
}

// ============================================================================
// GEOMETRY ERROR
// ============================================================================

/// Geometry resolution and tangent estimation failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// Object reference did not resolve to any geometry.
    #[error("Object {kind} {id} could not be resolved")]
    Unresolvable {
        /// Object kind as a display string
        kind: &'static str,
        /// External object id
        id: u64,
    },

    /// Object resolved to fewer points than the tangent neighborhood needs.
    ///
    /// Tangent estimation over `k` neighbors requires at least `k + 1` points.
    #[error("Object has {points} points, tangent estimation needs at least {required}")]
    TooFewPoints {
        /// Points the object resolved to
        points: usize,
        /// Minimum required (`tangent_neighbors + 1`)
        required: usize,
    },

    /// Skeleton edge references a node index that does not exist.
    #[error("Skeleton edge references node {index}, but only {nodes} nodes exist")]
    InvalidEdge {
        /// Out-of-range node index
        index: usize,
        /// Number of nodes in the skeleton
        nodes: usize,
    },
}

// ============================================================================
// JOB ERRORS
// ============================================================================

/// Referencing an entity that is not yet in the state an operation needs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreconditionError {
    /// A referenced Sample or Config must be `Complete` before use.
    #[error("{entity} {id} is '{status}', expected 'complete'")]
    NotComplete {
        /// Entity kind (`Sample`, `Config`)
        entity: &'static str,
        /// Entity id
        id: Uuid,
        /// Current status as a display string
        status: &'static str,
    },

    /// A completed Config is missing its derived score matrix.
    #[error("Config {0} is complete but has no score matrix")]
    MissingScoreMatrix(Uuid),
}

/// Illegal job state transitions, including double-claims.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConflictError {
    /// The entity is already claimed by another executor.
    #[error("Job already claimed by executor {owner}")]
    AlreadyClaimed {
        /// Token of the claiming executor
        owner: Uuid,
    },

    /// Transition attempted from a state that does not allow it.
    #[error("Illegal transition from '{from}' to '{to}'")]
    IllegalTransition {
        /// Current status
        from: &'static str,
        /// Requested status
        to: &'static str,
    },

    /// A transition was attempted with a token that does not own the job.
    #[error("Token {token} does not own this job")]
    NotOwner {
        /// The non-owning token
        token: Uuid,
    },
}

/// Failures inside a running computation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComputationError {
    /// An object failed to resolve mid-computation.
    #[error("Object {kind} {id}: {source}")]
    Resolution {
        /// Object kind as a display string
        kind: &'static str,
        /// External object id
        id: u64,
        /// Underlying failure
        source: Box<NblastError>,
    },

    /// A query object resolved to an empty point list; its mean score is undefined.
    #[error("Query object at index {0} resolved to zero points")]
    EmptyQuery(usize),

    /// A target object resolved to an empty point list; no nearest neighbor exists.
    #[error("Target object at index {0} resolved to zero points")]
    EmptyTarget(usize),

    /// The unit of work was canceled by the executor.
    #[error("canceled")]
    Canceled,
}

// ============================================================================
// TOP-LEVEL UNIFIED ERROR
// ============================================================================

/// Top-level error for nblast-core.
///
/// All sub-errors convert into this type via `From`, so library code can
/// propagate with `?` and callers can still match on the failure domain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NblastError {
    /// Input validation failure, raised before computation starts.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Geometry resolution or tangent estimation failure.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Referenced entity not yet in the required state.
    #[error("Precondition error: {0}")]
    Precondition(#[from] PreconditionError),

    /// Illegal job state transition or double-claim.
    #[error("Conflict error: {0}")]
    Conflict(#[from] ConflictError),

    /// Failure inside a running computation.
    #[error("Computation error: {0}")]
    Computation(#[from] ComputationError),
}

impl NblastError {
    /// Whether this error was produced by cooperative cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, NblastError::Computation(ComputationError::Canceled))
    }
}
