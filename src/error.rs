//! Typed error taxonomy for the crate's external interfaces.
//!
//! The solving core itself never fails (exhausting a resource limit is a
//! normal `SearchResult::Unknown`, not an error); errors only arise at the
//! boundaries this module names — reading a malformed DIMACS file,
//! writing a result, or an interrupt firing mid-solve.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DawnError {
    #[error("parse error at {where_}: {reason}")]
    Parse { where_: String, reason: String },

    #[error("clause arena exhausted its address space")]
    ArenaExhausted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("solve interrupted by signal or resource limit")]
    Interrupted,
}

pub type DawnResult<T> = Result<T, DawnError>;
