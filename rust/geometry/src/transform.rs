// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid placements and their Tait-Bryan parametrization
//!
//! A [`Placement`] maps a point `p` of a child frame to `R * p + t` in the
//! parent frame. Target trees store the rotation as three Tait-Bryan angles
//! (x, y, z) with `R = Rz(z) * Ry(y) * Rx(x)`.

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};

/// Determinant below which a rotation block counts as singular
const SINGULAR_EPSILON: f64 = 1e-12;

/// Rotation + translation, always paired
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Placement {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    /// Build from a row-major 3x3 block and a translation
    pub fn from_row_major(rotation: &[f64; 9], translation: &[f64; 3]) -> Self {
        Self::new(
            Matrix3::from_row_slice(rotation),
            Vector3::new(translation[0], translation[1], translation[2]),
        )
    }

    /// Build from Tait-Bryan angles (radians) and a translation
    pub fn from_tbxyz(angles: &Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self::new(tbxyz_to_matrix(angles), translation)
    }

    /// Homogeneous 4x4 matrix
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// Inverse placement: rotation `R⁻¹`, translation `-R⁻¹ · t`
    pub fn try_inverse(&self) -> Result<Placement> {
        let det = self.rotation.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return Err(Error::TransformInversion(format!(
                "rotation block determinant {:e}",
                det
            )));
        }
        let inverse = self
            .rotation
            .try_inverse()
            .ok_or_else(|| Error::TransformInversion("rotation block".to_string()))?;
        Ok(Placement::new(inverse, -(inverse * self.translation)))
    }

    /// `self ∘ other`: apply `other` first, then `self`
    pub fn compose(&self, other: &Placement) -> Placement {
        Placement::new(
            self.rotation * other.rotation,
            self.rotation * other.translation + self.translation,
        )
    }

    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * p.coords + self.translation)
    }

    /// Tait-Bryan angles of the rotation block
    pub fn tbxyz(&self) -> Vector3<f64> {
        matrix_to_tbxyz(&self.rotation)
    }

    /// Copy with the translation multiplied by `scale` (unit change)
    pub fn with_length_scale(&self, scale: f64) -> Placement {
        Placement::new(self.rotation, self.translation * scale)
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.rotation - Matrix3::identity()).abs().max() <= epsilon
            && self.translation.abs().max() <= epsilon
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

/// Decompose a rotation matrix into Tait-Bryan x, y, z angles.
///
/// Near the gimbal lock (`cos(y) ≈ 0`) the z angle is fixed at zero and the
/// remaining freedom is folded into x.
pub fn matrix_to_tbxyz(m: &Matrix3<f64>) -> Vector3<f64> {
    let sy = (m[(0, 0)] * m[(0, 0)] + m[(1, 0)] * m[(1, 0)]).sqrt();
    if sy >= 1e-6 {
        Vector3::new(
            m[(2, 1)].atan2(m[(2, 2)]),
            (-m[(2, 0)]).atan2(sy),
            m[(1, 0)].atan2(m[(0, 0)]),
        )
    } else {
        Vector3::new((-m[(1, 2)]).atan2(m[(1, 1)]), (-m[(2, 0)]).atan2(sy), 0.0)
    }
}

/// `Rz(z) * Ry(y) * Rx(x)`
pub fn tbxyz_to_matrix(angles: &Vector3<f64>) -> Matrix3<f64> {
    Rotation3::from_euler_angles(angles.x, angles.y, angles.z).into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn sample_placements() -> Vec<Placement> {
        let mut out = Vec::new();
        for &(x, y, z) in &[
            (0.0, 0.0, 0.0),
            (0.3, -0.2, 1.1),
            (-1.2, 0.7, -2.5),
            (FRAC_PI_2, 0.1, 0.4),
            (2.9, -1.3, 0.05),
        ] {
            let angles = Vector3::new(x, y, z);
            out.push(Placement::from_tbxyz(
                &angles,
                Vector3::new(10.0 * x, -3.0 + y, 7.5 * z),
            ));
        }
        out
    }

    #[test]
    fn tbxyz_round_trip() {
        for placement in sample_placements() {
            let angles = placement.tbxyz();
            let rebuilt = tbxyz_to_matrix(&angles);
            assert_relative_eq!(rebuilt, placement.rotation, epsilon = 1e-10);
        }
    }

    #[test]
    fn gimbal_lock_still_reconstructs() {
        let angles = Vector3::new(0.4, FRAC_PI_2, 0.0);
        let m = tbxyz_to_matrix(&angles);
        let rebuilt = tbxyz_to_matrix(&matrix_to_tbxyz(&m));
        assert_relative_eq!(rebuilt, m, epsilon = 1e-6);
    }

    #[test]
    fn inverse_composes_to_identity() {
        for placement in sample_placements() {
            let inverse = placement.try_inverse().unwrap();
            assert!(placement.compose(&inverse).is_identity(1e-10));
            assert!(inverse.compose(&placement).is_identity(1e-10));
        }
    }

    #[test]
    fn inverse_translation_is_rotated_not_negated() {
        // 90 degrees about z, then shift along x
        let placement = Placement::from_tbxyz(
            &Vector3::new(0.0, 0.0, FRAC_PI_2),
            Vector3::new(5.0, 0.0, 0.0),
        );
        let inverse = placement.try_inverse().unwrap();
        assert_relative_eq!(inverse.translation, Vector3::new(0.0, 5.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn singular_rotation_is_rejected() {
        let flat = Placement::from_row_major(
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            &[0.0, 0.0, 1.0],
        );
        match flat.try_inverse() {
            Err(Error::TransformInversion(_)) => {}
            other => panic!("Expected TransformInversion, got {:?}", other),
        }
    }

    #[test]
    fn matrix_matches_point_transform() {
        let placement = sample_placements()[2];
        let p = Point3::new(1.0, -2.0, 0.5);
        let via_matrix = placement.to_matrix().transform_point(&p);
        assert_relative_eq!(via_matrix, placement.transform_point(&p), epsilon = 1e-12);
    }
}
