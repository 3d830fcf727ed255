//! Error type shared by both tree variants.

/// Errors returned by [`Autocompleter`](crate::Autocompleter) operations.
///
/// Every error is raised before the tree is touched, so a failed call leaves
/// the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Insert was given a weight that is not a finite positive number, or one
    /// that would overflow the tree's total weight.
    #[error("weight must be finite and positive, got {0}")]
    InvalidWeight(f64),

    /// Autocomplete was given `Some(0)` as its limit.
    #[error("limit must be positive")]
    InvalidLimit,

    /// The value is already stored under a different token sequence.
    #[error("value already stored under a different sequence")]
    SequenceMismatch,

    /// A tree kind name that is neither `simple` nor `compressed`.
    #[error("unknown tree kind: {0:?}")]
    UnknownTreeKind(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn ensure_weight(weight: f64) -> Result<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidWeight(weight))
    }
}

/// Reject an insert that would push the tree's total weight past `f64::MAX`.
///
/// The root total bounds every leaf and every internal sum, so checking it
/// keeps all of them finite.
pub(crate) fn ensure_total(total: f64, extra: f64) -> Result<()> {
    if (total + extra).is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidWeight(extra))
    }
}

pub(crate) fn ensure_limit(limit: Option<usize>) -> Result<()> {
    match limit {
        Some(0) => Err(Error::InvalidLimit),
        _ => Ok(()),
    }
}
