//! Engine-internal error types.
//!
//! These never cross the [`GeometryEngine`](crate::GeometryEngine) boundary:
//! each trait method logs the cause and returns its failure sentinel instead.

use crate::handle::{ContextHandle, GeomHandle};
use thiserror::Error;

/// Internal failure causes.
#[derive(Error, Debug)]
pub enum EngineError {
    /// WKT syntax or conversion error.
    #[error("WKT parse error: {0}")]
    WktParse(String),

    /// Context was never created or has been finished.
    #[error("unknown or finished context {0:?}")]
    DeadContext(ContextHandle),

    /// Geometry handle is not allocated in the context.
    #[error("unknown geometry handle {0:?}")]
    UnknownGeometry(GeomHandle),

    /// Operand contains NaN or infinite coordinates.
    #[error("geometry has non-finite coordinates")]
    NonFinite,

    /// Operand type not supported by the operation.
    #[error("{op} does not support {kind} operands")]
    Unsupported { op: &'static str, kind: &'static str },

    /// Parameter outside the accepted domain.
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Algorithm produced no usable result.
    #[error("{0} produced no result")]
    NoResult(&'static str),

    /// Algorithm panicked; the panic was contained at the call boundary.
    #[error("{0} panicked")]
    Panicked(&'static str),
}

/// Result type for engine internals.
pub type Result<T> = std::result::Result<T, EngineError>;
