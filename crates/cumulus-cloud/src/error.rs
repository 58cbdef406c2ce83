//! Machine-driver error types
//!
//! A small closed taxonomy: callers of the driver boundary decide what to
//! retry based on the kind, never on provider-specific error text.

use thiserror::Error;

/// Machine-driver errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// The provider spec violates a closed invariant (wrong placement
    /// cardinality, malformed image reference, duplicate LUN). Raised
    /// before any remote call and never worth retrying.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A resource the operation depends on (subnet, marketplace image)
    /// does not exist.
    #[error("dependency not found: {0}")]
    DependencyNotFound(String),

    /// The requested resource itself does not exist. Deletion paths
    /// upgrade this to success; everything else surfaces it.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A resource slated for deletion is attached to an owner the
    /// operation did not expect. Never silently skipped.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A remote call failed for an unclassified reason. Surfaced verbatim;
    /// the calling reconciliation loop decides whether to re-invoke.
    #[error("cloud API error: {0}")]
    Api(String),

    /// Several independent teardown tasks failed; every failure is listed
    /// in submission order so the operator sees the complete picture.
    #[error("one or more operations failed: [{}]", .failures.join("; "))]
    Aggregate { failures: Vec<String> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// True when the error means the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        match self {
            CloudError::Conflict(_) => true,
            CloudError::Aggregate { failures } => {
                failures.iter().any(|f| f.contains("conflict:"))
            }
            _ => false,
        }
    }

    /// Collapse a list of per-task outcomes into a single result.
    ///
    /// `failures` holds one formatted message per failed task, already in
    /// submission order.
    pub fn aggregate(failures: Vec<String>) -> Option<CloudError> {
        if failures.is_empty() {
            None
        } else {
            Some(CloudError::Aggregate { failures })
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
