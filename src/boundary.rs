use std::fmt;

use crate::domain::BadTag;

/// Warnings raised while processing a repository's tags.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A tag does not follow the configured format and was ignored
    BadTag { tag: String, reason: String },
    /// Fewer well-formed tags exist than the retention minimum
    KeepMinUnreachable { keep_min: usize, available: usize },
    /// Removing a tag from the registry failed; the prune carried on
    DeletionFailed { tag: String, reason: String },
}

impl From<BadTag> for BoundaryWarning {
    fn from(bad: BadTag) -> Self {
        BoundaryWarning::BadTag {
            tag: bad.tag,
            reason: bad.reason,
        }
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::BadTag { tag, reason } => {
                write!(f, "Ignoring tag '{}': {}", tag, reason)
            }
            BoundaryWarning::KeepMinUnreachable {
                keep_min,
                available,
            } => {
                write!(
                    f,
                    "Only {} valid tags available, below the minimum of {}; keeping all",
                    available, keep_min
                )
            }
            BoundaryWarning::DeletionFailed { tag, reason } => {
                write!(f, "Failed to remove tag '{}': {}", tag, reason)
            }
        }
    }
}
