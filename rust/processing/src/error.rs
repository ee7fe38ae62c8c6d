// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fatal conversion errors.
//!
//! Anything that would leave silently wrong geometry behind aborts the run.
//! Recoverable degradations are [`Warning`](crate::Warning)s instead.

/// Result type alias for conversion runs.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A composite names an operation outside union / subtraction / intersection.
    #[error("composite shape {shape} uses unknown boolean operator '{operator}'")]
    UnknownBooleanOperator { shape: String, operator: String },

    /// A transform the conversion depends on cannot be inverted.
    #[error("transform {matrix} is singular and cannot be inverted")]
    TransformInversion { matrix: String },

    #[error("source tree has no top volume")]
    NoTopVolume,

    /// The top volume itself could not be built.
    #[error("world volume {0} cannot be built")]
    UnbuildableWorld(String),

    /// A converter invariant did not hold; a bug rather than bad input.
    #[error("internal conversion error: {0}")]
    Internal(String),

    #[error(transparent)]
    Source(#[from] geoconv_core::Error),

    #[error(transparent)]
    Geometry(#[from] geoconv_geometry::Error),
}
