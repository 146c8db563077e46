// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Error type shared by the curve, session, and store modules.

use thiserror::Error;

/// Errors raised by curve validation and curve collections.
///
/// Evaluation itself never fails; see [`crate::curve::evaluate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// A control point carries a NaN or infinite value.
    #[error("point {index}: {field} must be a finite number, got {value}")]
    InvalidNumeric {
        index: usize,
        field: &'static str,
        value: f64,
    },

    /// Lookup, update, or delete on an absent key.
    #[error("{0} not found")]
    NotFound(String),

    /// An interpolation or control mode name that is not recognised.
    #[error("unknown mode '{0}'")]
    InvalidMode(String),
}
