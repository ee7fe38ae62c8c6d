// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    /// Parameters describe no solid at all (zero defining height, inverted radii, ...)
    #[error("Degenerate solid: {0}")]
    DegenerateSolid(String),

    #[error("Transform is not invertible: {0}")]
    TransformInversion(String),

    #[error("Solid not found in store: {0}")]
    MissingSolid(String),

    #[error("Solid nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("Mesh with {0} vertices exceeds 32-bit indices")]
    MeshTooLarge(usize),

    #[error("Source tree error: {0}")]
    CoreError(#[from] geoconv_core::Error),
}

impl Error {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Error::DegenerateSolid(reason.into())
    }
}
