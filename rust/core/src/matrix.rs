// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source affine transforms.

/// A node-to-parent transform as stored by the source tree.
///
/// `rotation` is row-major; a point `p` in the child frame maps to
/// `rotation * p + translation` in the parent frame.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMatrix {
    pub name: String,
    pub rotation: [f64; 9],
    pub translation: [f64; 3],
}

const IDENTITY_ROTATION: [f64; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

impl SourceMatrix {
    pub fn new(name: impl Into<String>, rotation: [f64; 9], translation: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            rotation,
            translation,
        }
    }

    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, IDENTITY_ROTATION, [0.0; 3])
    }

    pub fn translation(name: impl Into<String>, translation: [f64; 3]) -> Self {
        Self::new(name, IDENTITY_ROTATION, translation)
    }

    /// Rotation about the z axis by `angle` degrees followed by `translation`.
    pub fn rotation_z(name: impl Into<String>, angle: f64, translation: [f64; 3]) -> Self {
        let (s, c) = angle.to_radians().sin_cos();
        Self::new(name, [c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0], translation)
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == IDENTITY_ROTATION && self.translation == [0.0; 3]
    }

    /// Determinant of the rotation part.
    pub fn determinant(&self) -> f64 {
        let m = &self.rotation;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }
}
