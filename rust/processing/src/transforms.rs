// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source matrices to target placements, cached by matrix identity.
//!
//! A source matrix `T = (R, t)` places a child frame in its parent. Asked for
//! the inverse, the composer returns `(R⁻¹, -R⁻¹ · t)`; a singular `R` is fatal.

use geoconv_core::{GeometrySource, MatrixHandle};
use geoconv_geometry::Placement;

use crate::error::{ConvertError, Result};
use crate::identity::IdentityCache;

#[derive(Debug, Default)]
pub struct TransformComposer {
    cache: IdentityCache<(MatrixHandle, bool), Placement>,
}

impl TransformComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placement of `handle` in target units, inverted on request.
    pub fn compose<S: GeometrySource + ?Sized>(
        &mut self,
        source: &S,
        handle: MatrixHandle,
        invert: bool,
        length_scale: f64,
    ) -> Result<Placement> {
        if let Some(placement) = self.cache.lookup((handle, invert)) {
            return Ok(placement);
        }

        let matrix = source.matrix(handle)?;
        let forward = Placement::from_row_major(&matrix.rotation, &matrix.translation)
            .with_length_scale(length_scale);
        let placement = if invert {
            forward.try_inverse().map_err(|_| ConvertError::TransformInversion {
                matrix: matrix.name.clone(),
            })?
        } else {
            forward
        };

        tracing::debug!(matrix = %matrix.name, invert, "composed transform");
        self.cache.insert((handle, invert), placement);
        Ok(placement)
    }

    /// Relative placement of a boolean's right operand in the left operand's
    /// frame: `L⁻¹ · R`.
    pub fn boolean_operand<S: GeometrySource + ?Sized>(
        &mut self,
        source: &S,
        left: MatrixHandle,
        right: MatrixHandle,
        length_scale: f64,
    ) -> Result<Placement> {
        let left_inverse = self.compose(source, left, true, length_scale)?;
        let right = self.compose(source, right, false, length_scale)?;
        Ok(left_inverse.compose(&right))
    }

    /// References to `handle`, both directions together
    pub fn references(&self, handle: MatrixHandle) -> usize {
        self.cache.count((handle, false)) + self.cache.count((handle, true))
    }

    pub fn cache(&self) -> &IdentityCache<(MatrixHandle, bool), Placement> {
        &self.cache
    }
}
