// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solid arena with lazily evaluated meshes.
//!
//! Solids are immutable once inserted. Composite solids refer to their
//! operands by [`SolidKey`], so operands shared by many composites are stored
//! and meshed once. A solid's mesh is computed on first request and reused
//! afterwards.

use std::cell::OnceCell;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::builders::{self, MeshSettings};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::solid::SolidKind;

new_key_type! {
    /// Key for a solid stored in a [`SolidStore`].
    pub struct SolidKey;
}

/// Composite nesting depth at which mesh evaluation gives up
const MAX_SOLID_DEPTH: usize = 256;

/// A named solid and its cached mesh
#[derive(Debug)]
pub struct Solid {
    name: String,
    kind: SolidKind,
    mesh: OnceCell<Arc<Mesh>>,
}

impl Solid {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SolidKind {
        &self.kind
    }

    /// Whether the mesh has been evaluated already
    pub fn is_meshed(&self) -> bool {
        self.mesh.get().is_some()
    }
}

/// Arena of solids
#[derive(Debug, Default)]
pub struct SolidStore {
    solids: SlotMap<SolidKey, Solid>,
    settings: MeshSettings,
}

impl SolidStore {
    pub fn new(settings: MeshSettings) -> Self {
        Self {
            solids: SlotMap::with_key(),
            settings,
        }
    }

    pub fn settings(&self) -> &MeshSettings {
        &self.settings
    }

    /// Validate and store a solid. Operands must already be stored.
    pub fn insert(&mut self, name: impl Into<String>, kind: SolidKind) -> Result<SolidKey> {
        kind.validate()?;
        for operand in kind.operands() {
            if !self.solids.contains_key(operand) {
                return Err(Error::MissingSolid(format!("{:?}", operand)));
            }
        }
        Ok(self.solids.insert(Solid {
            name: name.into(),
            kind,
            mesh: OnceCell::new(),
        }))
    }

    pub fn get(&self, key: SolidKey) -> Option<&Solid> {
        self.solids.get(key)
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SolidKey, &Solid)> {
        self.solids.iter()
    }

    /// Mesh of a stored solid, evaluated at most once
    pub fn mesh(&self, key: SolidKey) -> Result<Arc<Mesh>> {
        self.mesh_at_depth(key, 0)
    }

    /// Mesh a kind that is not stored (yet), resolving operands from the store
    pub fn evaluate(&self, kind: &SolidKind) -> Result<Mesh> {
        kind.validate()?;
        let mesh = builders::build_mesh(kind, &self.settings, &|operand| {
            self.mesh_at_depth(operand, 1)
        })?;
        mesh.check_indexable()?;
        Ok(mesh)
    }

    fn mesh_at_depth(&self, key: SolidKey, depth: usize) -> Result<Arc<Mesh>> {
        if depth > MAX_SOLID_DEPTH {
            return Err(Error::NestingTooDeep(MAX_SOLID_DEPTH));
        }
        let solid = self
            .solids
            .get(key)
            .ok_or_else(|| Error::MissingSolid(format!("{:?}", key)))?;
        if let Some(mesh) = solid.mesh.get() {
            return Ok(Arc::clone(mesh));
        }

        let mesh = builders::build_mesh(&solid.kind, &self.settings, &|operand| {
            self.mesh_at_depth(operand, depth + 1)
        })?;
        mesh.check_indexable()?;
        if mesh.is_empty() {
            tracing::warn!(
                solid = %solid.name,
                kind = solid.kind.type_name(),
                "solid evaluated to an empty mesh"
            );
        }

        let mesh = Arc::new(mesh);
        // Nothing else can have filled the cell: evaluation is single-threaded
        let _ = solid.mesh.set(Arc::clone(&mesh));
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::BooleanOp;
    use crate::transform::Placement;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn cube(half: f64) -> SolidKind {
        SolidKind::Box {
            dx: half,
            dy: half,
            dz: half,
        }
    }

    #[test]
    fn mesh_is_computed_once() {
        let mut store = SolidStore::default();
        let key = store.insert("cube", cube(1.0)).unwrap();
        assert!(!store.get(key).unwrap().is_meshed());

        let first = store.mesh(key).unwrap();
        let second = store.mesh(key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.get(key).unwrap().is_meshed());
    }

    #[test]
    fn degenerate_kind_is_not_stored() {
        let mut store = SolidStore::default();
        assert!(store.insert("flat", cube(0.0)).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn shared_operand_is_meshed_once() {
        let mut store = SolidStore::default();
        let a = store.insert("a", cube(5.0)).unwrap();
        let shift = Placement::from_translation(Vector3::new(20.0, 0.0, 0.0));
        let u1 = store
            .insert(
                "u1",
                SolidKind::Boolean {
                    op: BooleanOp::Union,
                    left: a,
                    right: a,
                    placement: shift,
                },
            )
            .unwrap();
        let u2 = store
            .insert(
                "u2",
                SolidKind::Scaled {
                    solid: a,
                    scale: Vector3::new(1.0, 1.0, 3.0),
                },
            )
            .unwrap();

        assert_relative_eq!(store.mesh(u1).unwrap().volume(), 2000.0, epsilon = 1e-6);
        let operand = store.mesh(a).unwrap();
        assert_relative_eq!(store.mesh(u2).unwrap().volume(), 3000.0, epsilon = 1e-9);
        assert!(Arc::ptr_eq(&operand, &store.mesh(a).unwrap()));
    }

    #[test]
    fn missing_operand_is_rejected() {
        let mut other = SolidStore::default();
        other.insert("x", cube(1.0)).unwrap();
        let stray = other.insert("y", cube(1.0)).unwrap();

        let mut store = SolidStore::default();
        let result = store.insert(
            "scaled",
            SolidKind::Scaled {
                solid: stray,
                scale: Vector3::new(1.0, 1.0, 2.0),
            },
        );
        assert!(matches!(result, Err(Error::MissingSolid(_))));
    }
}
