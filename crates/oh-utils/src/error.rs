//! Error types for state resolution

use oh_core::{Dimension, Unit, UnitError, ValueKind};
use thiserror::Error;

/// Result type for state resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors reported while coercing an item state
///
/// A missing item or an undefined state is never an error; those resolve to
/// the caller's default.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Requested unit measures a different dimension than the stored quantity
    #[error("cannot convert {item} from {from} ({from_dimension}) to {to} ({to_dimension})")]
    UnitDimensionMismatch {
        item: String,
        from: Unit,
        from_dimension: Dimension,
        to: Unit,
        to_dimension: Dimension,
    },

    /// The state cannot be coerced into the requested shape
    #[error("cannot coerce {item} ({kind}) to {target}")]
    TypeCoercionUnsupported {
        item: String,
        kind: ValueKind,
        target: String,
    },

    /// Unit symbol not known to the converter
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    /// Conversion left the representable decimal range
    #[error("converting {item} to {to} overflowed")]
    Overflow { item: String, to: Unit },
}

impl ResolveError {
    pub(crate) fn from_unit_error(item: &str, err: UnitError) -> Self {
        match err {
            UnitError::UnknownUnit(symbol) => ResolveError::UnknownUnit(symbol),
            UnitError::DimensionMismatch {
                from,
                from_dimension,
                to,
                to_dimension,
            } => ResolveError::UnitDimensionMismatch {
                item: item.to_string(),
                from,
                from_dimension,
                to,
                to_dimension,
            },
            UnitError::Overflow { to, .. } => ResolveError::Overflow {
                item: item.to_string(),
                to,
            },
        }
    }
}
