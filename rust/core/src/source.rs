// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The read-only query interface over a source geometry tree, and an
//! in-memory arena that implements it.
//!
//! Converters only ever see a source through [`GeometrySource`]; a host
//! toolkit binding implements the trait over its own object model, while
//! [`SourceTree`] is the self-contained implementation used for tests and for
//! trees assembled programmatically.
//!
//! ```
//! use geoconv_core::{GeometrySource, ShapeKind, SourceMaterial, SourceMatrix, SourceShape,
//!     SourceTree, SourceVolume};
//!
//! let mut tree = SourceTree::new();
//! let air = tree.add_material(SourceMaterial::single_element("Air", 7.0, 14.0, 0.0012));
//! let world_box = tree.add_shape(SourceShape::new("world", ShapeKind::Box { dx: 50.0, dy: 50.0, dz: 50.0 }));
//! let cell = tree.add_shape(SourceShape::new("cell", ShapeKind::Box { dx: 1.0, dy: 1.0, dz: 1.0 }));
//! let world = tree.add_volume(SourceVolume::new("World", world_box, air));
//! let child = tree.add_volume(SourceVolume::new("Cell", cell, air));
//! let m = tree.add_matrix(SourceMatrix::translation("m", [0.0, 0.0, 5.0]));
//! tree.add_daughter(world, "cell_pv", m, 0, child).unwrap();
//! tree.set_top_volume(world);
//!
//! assert_eq!(tree.volume(world).unwrap().daughters.len(), 1);
//! ```

use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::handles::{HandleKind, MaterialHandle, MatrixHandle, ShapeHandle, VolumeHandle};
use crate::material::SourceMaterial;
use crate::matrix::SourceMatrix;
use crate::shape::SourceShape;
use crate::volume::{SourceNode, SourceVolume};

/// Narrow query capability set over a source geometry tree.
///
/// Identity of objects is handle equality: a handle returned twice refers to
/// the same source object.
pub trait GeometrySource {
    /// All top-level materials, in source order.
    fn materials(&self) -> Vec<MaterialHandle>;

    fn material(&self, handle: MaterialHandle) -> Result<&SourceMaterial>;

    fn shape(&self, handle: ShapeHandle) -> Result<&SourceShape>;

    fn matrix(&self, handle: MatrixHandle) -> Result<&SourceMatrix>;

    fn volume(&self, handle: VolumeHandle) -> Result<&SourceVolume>;

    /// Root of the placement hierarchy, if the source designates one.
    fn top_volume(&self) -> Option<VolumeHandle>;
}

/// In-memory source tree backed by slot map arenas.
#[derive(Debug, Default)]
pub struct SourceTree {
    shapes: SlotMap<ShapeHandle, SourceShape>,
    matrices: SlotMap<MatrixHandle, SourceMatrix>,
    materials: SlotMap<MaterialHandle, SourceMaterial>,
    material_order: Vec<MaterialHandle>,
    volumes: SlotMap<VolumeHandle, SourceVolume>,
    top: Option<VolumeHandle>,
}

impl SourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: SourceShape) -> ShapeHandle {
        self.shapes.insert(shape)
    }

    pub fn add_matrix(&mut self, matrix: SourceMatrix) -> MatrixHandle {
        self.matrices.insert(matrix)
    }

    pub fn add_material(&mut self, material: SourceMaterial) -> MaterialHandle {
        let handle = self.materials.insert(material);
        self.material_order.push(handle);
        handle
    }

    pub fn add_volume(&mut self, volume: SourceVolume) -> VolumeHandle {
        self.volumes.insert(volume)
    }

    /// Appends a placement of `child` to `parent`'s daughter list.
    ///
    /// Both volumes must already exist; cycles are allowed and left for the
    /// converter to cope with.
    pub fn add_daughter(
        &mut self,
        parent: VolumeHandle,
        name: impl Into<String>,
        matrix: MatrixHandle,
        copy_number: i32,
        child: VolumeHandle,
    ) -> Result<()> {
        if !self.volumes.contains_key(child) {
            return Err(Error::unknown(HandleKind::Volume, child));
        }
        if !self.matrices.contains_key(matrix) {
            return Err(Error::unknown(HandleKind::Matrix, matrix));
        }
        let parent_volume = self
            .volumes
            .get_mut(parent)
            .ok_or_else(|| Error::unknown(HandleKind::Volume, parent))?;
        parent_volume.daughters.push(SourceNode {
            name: name.into(),
            matrix,
            copy_number,
            volume: child,
        });
        Ok(())
    }

    pub fn set_top_volume(&mut self, volume: VolumeHandle) {
        self.top = Some(volume);
    }
}

impl GeometrySource for SourceTree {
    fn materials(&self) -> Vec<MaterialHandle> {
        self.material_order.clone()
    }

    fn material(&self, handle: MaterialHandle) -> Result<&SourceMaterial> {
        self.materials
            .get(handle)
            .ok_or_else(|| Error::unknown(HandleKind::Material, handle))
    }

    fn shape(&self, handle: ShapeHandle) -> Result<&SourceShape> {
        self.shapes
            .get(handle)
            .ok_or_else(|| Error::unknown(HandleKind::Shape, handle))
    }

    fn matrix(&self, handle: MatrixHandle) -> Result<&SourceMatrix> {
        self.matrices
            .get(handle)
            .ok_or_else(|| Error::unknown(HandleKind::Matrix, handle))
    }

    fn volume(&self, handle: VolumeHandle) -> Result<&SourceVolume> {
        self.volumes
            .get(handle)
            .ok_or_else(|| Error::unknown(HandleKind::Volume, handle))
    }

    fn top_volume(&self) -> Option<VolumeHandle> {
        self.top
    }
}
