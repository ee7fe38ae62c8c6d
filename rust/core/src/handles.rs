// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity handles for source-tree objects.
//!
//! A handle is the stable surrogate for "the same object": two handles compare
//! equal only when they were issued for the same insertion into a
//! [`SourceTree`](crate::SourceTree), regardless of the parameters stored
//! behind them. Handles are generational `slotmap` keys, so they are `Copy`,
//! `Hash` and cheap to use as cache keys.

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a source shape (primitive or composite).
    pub struct ShapeHandle;

    /// Handle of a source affine transform (rotation + translation).
    pub struct MatrixHandle;

    /// Handle of a source material.
    pub struct MaterialHandle;

    /// Handle of a source volume (logical volume or assembly).
    pub struct VolumeHandle;
}

/// Discriminant for the kinds of object a source tree stores.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Shape,
    Matrix,
    Material,
    Volume,
}

impl HandleKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::Shape => "shape",
            HandleKind::Matrix => "matrix",
            HandleKind::Material => "material",
            HandleKind::Volume => "volume",
        }
    }
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn handles_compare_by_insertion_not_value() {
        let mut map: SlotMap<ShapeHandle, u32> = SlotMap::with_key();
        let a = map.insert(7);
        let b = map.insert(7);
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn handle_kind_names() {
        assert_eq!(HandleKind::Shape.to_string(), "shape");
        assert_eq!(HandleKind::Volume.as_str(), "volume");
    }
}
