// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry tree walker.
//!
//! One run moves through `Start → LoadMaterials → WalkVolumes → Done`. The
//! volume walk is depth first over an explicit stack. A volume is registered in
//! the identity cache before its daughters are visited, so a volume that
//! (directly or indirectly) contains itself is placed, not rebuilt.

use geoconv_core::{
    GeometrySource, MaterialHandle, MatrixHandle, ShapeHandle, VolumeContent, VolumeHandle,
};
use geoconv_geometry::{Placement, Vector3};

use crate::config::ConvertConfig;
use crate::context::Session;
use crate::diagnostics::Warning;
use crate::error::{ConvertError, Result};
use crate::identity::IdentityCache;
use crate::materials::MaterialLoader;
use crate::registry::{PhysicalVolume, Registry, VolumeRef};
use crate::shapes::ShapeResolver;
use crate::transforms::TransformComposer;

/// Phase of a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertState {
    Start,
    LoadMaterials,
    WalkVolumes,
    Done,
}

/// Outcome of looking up a volume
enum Visit {
    /// Seen before; the cached result, possibly unbuildable
    Cached(Option<VolumeRef>),
    /// Built just now; daughters still to be walked
    Built(Option<VolumeRef>),
}

/// A placement waiting for its volume's subtree to finish
struct PendingPlacement {
    name: String,
    mother: VolumeRef,
    placement: Placement,
    rotation: Vector3<f64>,
    copy_number: i32,
}

struct Frame {
    handle: VolumeHandle,
    target: VolumeRef,
    next_daughter: usize,
    pending: Option<PendingPlacement>,
}

/// Converts one source tree into a [`Registry`].
pub struct Converter<'a, S: GeometrySource + ?Sized> {
    session: Session<'a, S>,
    shapes: ShapeResolver,
    materials: MaterialLoader,
    volumes: IdentityCache<VolumeHandle, Option<VolumeRef>>,
    state: ConvertState,
}

impl<'a, S: GeometrySource + ?Sized> Converter<'a, S> {
    pub fn new(source: &'a S, config: &'a ConvertConfig) -> Self {
        Self {
            session: Session::new(source, config),
            shapes: ShapeResolver::new(),
            materials: MaterialLoader::new(),
            volumes: IdentityCache::new(),
            state: ConvertState::Start,
        }
    }

    pub fn state(&self) -> ConvertState {
        self.state
    }

    /// Run to completion. The first fatal condition aborts the run and no
    /// partial registry is returned.
    pub fn run(mut self) -> Result<Conversion> {
        tracing::info!(
            length_scale = self.session.config.length_scale,
            "starting geometry conversion"
        );

        self.transition(ConvertState::LoadMaterials);
        let source = self.session.source;
        self.materials
            .load_all(source, &mut self.session.registry, self.session.config)?;

        self.transition(ConvertState::WalkVolumes);
        self.walk()?;

        self.transition(ConvertState::Done);
        let registry = &self.session.registry;
        tracing::info!(
            solids = registry.solids().len(),
            logical_volumes = registry.logical_volumes().count(),
            physical_volumes = registry.physical_volumes().count(),
            materials = registry.materials().count(),
            warnings = self.session.diagnostics.len(),
            "geometry conversion complete"
        );

        let Session {
            registry,
            transforms,
            diagnostics,
            ..
        } = self.session;
        Ok(Conversion {
            registry,
            warnings: diagnostics.into_warnings(),
            shapes: self.shapes,
            transforms,
            materials: self.materials,
            volumes: self.volumes,
        })
    }

    fn transition(&mut self, next: ConvertState) {
        tracing::debug!(from = ?self.state, to = ?next, "conversion state");
        self.state = next;
    }

    fn walk(&mut self) -> Result<()> {
        let source = self.session.source;
        let top = source.top_volume().ok_or(ConvertError::NoTopVolume)?;
        let world = match self.visit(top)? {
            Visit::Built(Some(world)) | Visit::Cached(Some(world)) => world,
            Visit::Built(None) | Visit::Cached(None) => {
                return Err(ConvertError::UnbuildableWorld(source.volume(top)?.name.clone()))
            }
        };
        self.session.registry.set_world(world);

        let mut stack = vec![Frame {
            handle: top,
            target: world,
            next_daughter: 0,
            pending: None,
        }];

        while let Some(frame) = stack.last_mut() {
            let volume = source.volume(frame.handle)?;
            let Some(node) = volume.daughters.get(frame.next_daughter) else {
                if let Some(done) = stack.pop() {
                    if let Some(pending) = done.pending {
                        self.place(pending, done.target);
                    }
                }
                continue;
            };
            frame.next_daughter += 1;
            let mother = frame.target;

            let pending = self.placement(node.matrix, &node.name, mother, node.copy_number)?;
            match self.visit(node.volume)? {
                Visit::Cached(Some(child)) => self.place(pending, child),
                Visit::Built(Some(child)) => stack.push(Frame {
                    handle: node.volume,
                    target: child,
                    next_daughter: 0,
                    pending: Some(pending),
                }),
                Visit::Cached(None) | Visit::Built(None) => {
                    let child = source.volume(node.volume)?;
                    self.session.warn(Warning::UnbuildableDaughter {
                        placement: node.name.clone(),
                        parent: volume.name.clone(),
                        volume: child.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Cached result for `handle`, or build the volume itself (not its daughters).
    fn visit(&mut self, handle: VolumeHandle) -> Result<Visit> {
        if let Some(cached) = self.volumes.lookup(handle) {
            tracing::debug!(volume = ?handle, "volume cache hit");
            return Ok(Visit::Cached(cached));
        }

        let source = self.session.source;
        let volume = source.volume(handle)?;
        let built = match volume.content {
            VolumeContent::Solid { shape, material } => {
                match self.shapes.resolve(&mut self.session, shape)? {
                    Some(solid) => {
                        let material = self.materials.resolve(
                            source,
                            &mut self.session.registry,
                            self.session.config,
                            material,
                        )?;
                        let key = self
                            .session
                            .registry
                            .add_logical_volume(&volume.name, solid, material);
                        Some(VolumeRef::Logical(key))
                    }
                    None => None,
                }
            }
            VolumeContent::Assembly => {
                Some(VolumeRef::Assembly(self.session.registry.add_assembly(&volume.name)))
            }
        };

        tracing::debug!(volume = %volume.name, buildable = built.is_some(), "volume");
        self.volumes.insert(handle, built);
        Ok(Visit::Built(built))
    }

    /// Daughter placement from the node's matrix.
    ///
    /// The composer yields the inverted matrix, the frame the target tree
    /// records as the rotation; the placement proper is its inverse.
    fn placement(
        &mut self,
        matrix: MatrixHandle,
        name: &str,
        mother: VolumeRef,
        copy_number: i32,
    ) -> Result<PendingPlacement> {
        let frame = self.session.transforms.compose(
            self.session.source,
            matrix,
            true,
            self.session.config.length_scale,
        )?;
        Ok(PendingPlacement {
            name: name.to_string(),
            mother,
            placement: frame.try_inverse()?,
            rotation: frame.tbxyz(),
            copy_number,
        })
    }

    fn place(&mut self, pending: PendingPlacement, volume: VolumeRef) {
        self.session.registry.add_physical_volume(PhysicalVolume {
            name: pending.name,
            volume,
            mother: pending.mother,
            placement: pending.placement,
            rotation: pending.rotation,
            copy_number: pending.copy_number,
        });
    }
}

/// Convert `source` with `config` in one run.
pub fn convert<S: GeometrySource + ?Sized>(
    source: &S,
    config: &ConvertConfig,
) -> Result<Conversion> {
    Converter::new(source, config).run()
}

/// Result of a successful run: the registry, the non-fatal warnings and the
/// reference statistics of every source object the run touched.
#[derive(Debug)]
pub struct Conversion {
    registry: Registry,
    warnings: Vec<Warning>,
    shapes: ShapeResolver,
    transforms: TransformComposer,
    materials: MaterialLoader,
    volumes: IdentityCache<VolumeHandle, Option<VolumeRef>>,
}

impl Conversion {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Times the shape was resolved, 0 if never reached
    pub fn shape_references(&self, handle: ShapeHandle) -> usize {
        self.shapes.cache().count(handle)
    }

    pub fn matrix_references(&self, handle: MatrixHandle) -> usize {
        self.transforms.references(handle)
    }

    pub fn volume_references(&self, handle: VolumeHandle) -> usize {
        self.volumes.count(handle)
    }

    /// The initial load counts once; every volume using the material adds one.
    pub fn material_references(&self, handle: MaterialHandle) -> usize {
        self.materials.cache().count(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoconv_core::{
        ShapeKind, SourceMaterial, SourceMatrix, SourceShape, SourceTree, SourceVolume,
    };

    fn cube(tree: &mut SourceTree, name: &str, half: f64) -> ShapeHandle {
        tree.add_shape(SourceShape::new(
            name,
            ShapeKind::Box {
                dx: half,
                dy: half,
                dz: half,
            },
        ))
    }

    #[test]
    fn states_advance_to_done() {
        let mut tree = SourceTree::new();
        let air = tree.add_material(SourceMaterial::single_element("Air", 7.0, 14.0, 0.0012));
        let shape = cube(&mut tree, "world", 10.0);
        let world = tree.add_volume(SourceVolume::new("World", shape, air));
        tree.set_top_volume(world);

        let config = ConvertConfig::default();
        let converter = Converter::new(&tree, &config);
        assert_eq!(converter.state(), ConvertState::Start);
        let conversion = converter.run().unwrap();
        let registry = conversion.registry();
        assert_eq!(registry.world(), registry.find_logical_volume("World").map(VolumeRef::Logical));
    }

    #[test]
    fn self_containing_volume_terminates() {
        let mut tree = SourceTree::new();
        let air = tree.add_material(SourceMaterial::single_element("Air", 7.0, 14.0, 0.0012));
        let shape = cube(&mut tree, "loop", 1.0);
        let id = tree.add_matrix(SourceMatrix::identity("id"));
        let v = tree.add_volume(SourceVolume::new("Loop", shape, air));
        tree.add_daughter(v, "again", id, 0, v).unwrap();
        tree.set_top_volume(v);

        let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
        let registry = conversion.registry();
        assert_eq!(registry.logical_volumes().count(), 1);
        assert_eq!(registry.physical_volumes().count(), 1);
        assert_eq!(conversion.volume_references(v), 2);
    }

    #[test]
    fn placement_is_created_after_its_subtree() {
        let mut tree = SourceTree::new();
        let air = tree.add_material(SourceMaterial::single_element("Air", 7.0, 14.0, 0.0012));
        let big = cube(&mut tree, "big", 10.0);
        let small = cube(&mut tree, "small", 1.0);
        let id = tree.add_matrix(SourceMatrix::identity("id"));
        let world = tree.add_volume(SourceVolume::new("World", big, air));
        let mid = tree.add_volume(SourceVolume::new("Mid", big, air));
        let leaf = tree.add_volume(SourceVolume::new("Leaf", small, air));
        tree.add_daughter(world, "pv", id, 0, mid).unwrap();
        tree.add_daughter(mid, "pv", id, 0, leaf).unwrap();
        tree.set_top_volume(world);

        let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
        let registry = conversion.registry();
        let names: Vec<(String, String)> = registry
            .physical_volumes()
            .map(|(_, pv)| {
                (
                    pv.name.clone(),
                    registry.volume_name(pv.volume).unwrap_or_default().to_string(),
                )
            })
            .collect();
        assert_eq!(
            names,
            vec![
                ("pv".to_string(), "Leaf".to_string()),
                ("pv_1".to_string(), "Mid".to_string())
            ]
        );
    }

    #[test]
    fn missing_top_volume_is_fatal() {
        let tree = SourceTree::new();
        assert!(matches!(
            convert(&tree, &ConvertConfig::default()),
            Err(ConvertError::NoTopVolume)
        ));
    }
}
