// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The target-side registry of one conversion run.
//!
//! A [`Registry`] owns every solid, volume, placement and material built
//! during a run. Names are unique per category: a colliding name gets the
//! first free `_1`, `_2`, ... suffix when the object is added, so
//! nothing is ever overwritten and the resulting identifiers are stable for
//! serialization.

use std::sync::Arc;

use geoconv_geometry::{Mesh, MeshSettings, Placement, SolidKey, SolidKind, SolidStore, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct LogicalKey;
    pub struct AssemblyKey;
    pub struct PhysicalKey;
    pub struct MaterialKey;
    pub struct ElementKey;
    pub struct IsotopeKey;
}

/// Deterministic name de-duplication
#[derive(Debug, Default)]
struct NameTable {
    used: FxHashSet<String>,
    next_suffix: FxHashMap<String, usize>,
}

impl NameTable {
    fn claim(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let next = self.next_suffix.entry(base.to_string()).or_insert(1);
        loop {
            let candidate = format!("{}_{}", base, next);
            *next += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialState {
    Undefined,
    Solid,
    Liquid,
    Gas,
}

impl MaterialState {
    /// Map a source state code; unknown codes are undefined
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => MaterialState::Solid,
            2 => MaterialState::Liquid,
            3 => MaterialState::Gas,
            _ => MaterialState::Undefined,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Isotope {
    pub name: String,
    pub z: u32,
    pub n: u32,
    pub a: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub formula: String,
    pub z: f64,
    pub a: f64,
    /// `(isotope, relative abundance)`; empty for a simple element
    pub isotopes: Vec<(IsotopeKey, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialComposition {
    SingleElement { z: f64, a: f64 },
    /// `(element, mass fraction)`
    Compound(Vec<(ElementKey, f64)>),
    /// Known to the target by name only
    Predefined,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub density: f64,
    pub state: MaterialState,
    pub temperature: f64,
    pub pressure: f64,
    pub composition: MaterialComposition,
}

impl Material {
    pub fn kind(&self) -> &'static str {
        match self.composition {
            MaterialComposition::SingleElement { .. } => "single_element",
            MaterialComposition::Compound(_) => "compound",
            MaterialComposition::Predefined => "predefined",
        }
    }
}

/// A volume that placements can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeRef {
    Logical(LogicalKey),
    Assembly(AssemblyKey),
}

#[derive(Debug, Clone)]
pub struct LogicalVolume {
    pub name: String,
    pub solid: SolidKey,
    pub material: MaterialKey,
    pub daughters: Vec<PhysicalKey>,
}

#[derive(Debug, Clone)]
pub struct AssemblyVolume {
    pub name: String,
    pub daughters: Vec<PhysicalKey>,
}

/// One placement of a volume inside a mother volume.
#[derive(Debug, Clone)]
pub struct PhysicalVolume {
    pub name: String,
    pub volume: VolumeRef,
    pub mother: VolumeRef,
    /// Child frame in the mother frame
    pub placement: Placement,
    /// Tait-Bryan angles of the frame rotation (the inverse of the placement
    /// rotation), as target trees store it
    pub rotation: Vector3<f64>,
    pub copy_number: i32,
}

impl PhysicalVolume {
    pub fn translation(&self) -> Vector3<f64> {
        self.placement.translation
    }
}

/// All target objects of one run.
#[derive(Debug, Default)]
pub struct Registry {
    solids: SolidStore,
    logical_volumes: SlotMap<LogicalKey, LogicalVolume>,
    assemblies: SlotMap<AssemblyKey, AssemblyVolume>,
    physical_volumes: SlotMap<PhysicalKey, PhysicalVolume>,
    materials: SlotMap<MaterialKey, Material>,
    elements: SlotMap<ElementKey, Element>,
    isotopes: SlotMap<IsotopeKey, Isotope>,

    element_index: FxHashMap<String, ElementKey>,
    isotope_index: FxHashMap<String, IsotopeKey>,
    predefined_index: FxHashMap<String, MaterialKey>,

    solid_names: NameTable,
    // Logical and assembly volumes share one namespace
    volume_names: NameTable,
    physical_names: NameTable,
    material_names: NameTable,

    world: Option<VolumeRef>,
}

impl Registry {
    pub fn new(settings: MeshSettings) -> Self {
        Self {
            solids: SolidStore::new(settings),
            ..Self::default()
        }
    }

    // ---- Solids ----

    /// Validate and store a solid under a unique name.
    pub fn add_solid(&mut self, name: &str, kind: SolidKind) -> geoconv_geometry::Result<SolidKey> {
        kind.validate()?;
        let name = self.solid_names.claim(name);
        self.solids.insert(name, kind)
    }

    pub fn solids(&self) -> &SolidStore {
        &self.solids
    }

    pub fn solid_name(&self, key: SolidKey) -> Option<&str> {
        self.solids.get(key).map(|s| s.name())
    }

    /// Mesh of a stored solid, evaluated on first request
    pub fn solid_mesh(&self, key: SolidKey) -> geoconv_geometry::Result<Arc<Mesh>> {
        self.solids.mesh(key)
    }

    // ---- Materials ----

    /// Isotopes are shared by name
    pub fn add_isotope(&mut self, isotope: Isotope) -> IsotopeKey {
        if let Some(&key) = self.isotope_index.get(&isotope.name) {
            return key;
        }
        let name = isotope.name.clone();
        let key = self.isotopes.insert(isotope);
        self.isotope_index.insert(name, key);
        key
    }

    /// Elements are shared by name
    pub fn add_element(&mut self, element: Element) -> ElementKey {
        if let Some(&key) = self.element_index.get(&element.name) {
            return key;
        }
        let name = element.name.clone();
        let key = self.elements.insert(element);
        self.element_index.insert(name, key);
        key
    }

    pub fn element_by_name(&self, name: &str) -> Option<ElementKey> {
        self.element_index.get(name).copied()
    }

    pub fn add_material(&mut self, mut material: Material) -> MaterialKey {
        material.name = self.material_names.claim(&material.name);
        self.materials.insert(material)
    }

    /// The predefined material `name`, added on first use
    pub fn predefined_material(&mut self, name: &str) -> MaterialKey {
        if let Some(&key) = self.predefined_index.get(name) {
            return key;
        }
        let key = self.add_material(Material {
            name: name.to_string(),
            density: 0.0,
            state: MaterialState::Undefined,
            temperature: 0.0,
            pressure: 0.0,
            composition: MaterialComposition::Predefined,
        });
        self.predefined_index.insert(name.to_string(), key);
        key
    }

    pub fn material(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }

    pub fn element(&self, key: ElementKey) -> Option<&Element> {
        self.elements.get(key)
    }

    pub fn isotope(&self, key: IsotopeKey) -> Option<&Isotope> {
        self.isotopes.get(key)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialKey, &Material)> {
        self.materials.iter()
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementKey, &Element)> {
        self.elements.iter()
    }

    pub fn isotopes(&self) -> impl Iterator<Item = (IsotopeKey, &Isotope)> {
        self.isotopes.iter()
    }

    // ---- Volumes ----

    pub fn add_logical_volume(
        &mut self,
        name: &str,
        solid: SolidKey,
        material: MaterialKey,
    ) -> LogicalKey {
        let name = self.volume_names.claim(name);
        self.logical_volumes.insert(LogicalVolume {
            name,
            solid,
            material,
            daughters: Vec::new(),
        })
    }

    pub fn add_assembly(&mut self, name: &str) -> AssemblyKey {
        let name = self.volume_names.claim(name);
        self.assemblies.insert(AssemblyVolume {
            name,
            daughters: Vec::new(),
        })
    }

    /// Store a placement and append it to its mother's daughters.
    pub fn add_physical_volume(&mut self, mut placement: PhysicalVolume) -> PhysicalKey {
        placement.name = self.physical_names.claim(&placement.name);
        let mother = placement.mother;
        let key = self.physical_volumes.insert(placement);
        match mother {
            VolumeRef::Logical(lv) => {
                if let Some(volume) = self.logical_volumes.get_mut(lv) {
                    volume.daughters.push(key);
                }
            }
            VolumeRef::Assembly(av) => {
                if let Some(volume) = self.assemblies.get_mut(av) {
                    volume.daughters.push(key);
                }
            }
        }
        key
    }

    pub fn logical_volume(&self, key: LogicalKey) -> Option<&LogicalVolume> {
        self.logical_volumes.get(key)
    }

    pub fn assembly(&self, key: AssemblyKey) -> Option<&AssemblyVolume> {
        self.assemblies.get(key)
    }

    pub fn physical_volume(&self, key: PhysicalKey) -> Option<&PhysicalVolume> {
        self.physical_volumes.get(key)
    }

    pub fn logical_volumes(&self) -> impl Iterator<Item = (LogicalKey, &LogicalVolume)> {
        self.logical_volumes.iter()
    }

    pub fn assemblies(&self) -> impl Iterator<Item = (AssemblyKey, &AssemblyVolume)> {
        self.assemblies.iter()
    }

    pub fn physical_volumes(&self) -> impl Iterator<Item = (PhysicalKey, &PhysicalVolume)> {
        self.physical_volumes.iter()
    }

    pub fn volume_name(&self, volume: VolumeRef) -> Option<&str> {
        match volume {
            VolumeRef::Logical(key) => self.logical_volumes.get(key).map(|v| v.name.as_str()),
            VolumeRef::Assembly(key) => self.assemblies.get(key).map(|v| v.name.as_str()),
        }
    }

    /// Placements inside `volume`, in insertion order
    pub fn daughters(&self, volume: VolumeRef) -> &[PhysicalKey] {
        let daughters = match volume {
            VolumeRef::Logical(key) => self.logical_volumes.get(key).map(|v| &v.daughters),
            VolumeRef::Assembly(key) => self.assemblies.get(key).map(|v| &v.daughters),
        };
        daughters.map_or(&[], |d| d.as_slice())
    }

    /// Designate the world volume. Only the first call has an effect.
    pub fn set_world(&mut self, volume: VolumeRef) -> bool {
        if self.world.is_some() {
            return false;
        }
        self.world = Some(volume);
        true
    }

    pub fn world(&self) -> Option<VolumeRef> {
        self.world
    }

    pub fn find_logical_volume(&self, name: &str) -> Option<LogicalKey> {
        self.logical_volumes
            .iter()
            .find(|(_, v)| v.name == name)
            .map(|(key, _)| key)
    }

    pub fn find_material(&self, name: &str) -> Option<MaterialKey> {
        self.materials
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(key, _)| key)
    }

    // ---- Export ----

    pub fn summary(&self) -> RegistrySummary {
        let name_of = |volume| self.volume_name(volume).unwrap_or_default().to_string();
        RegistrySummary {
            world: self.world.map(name_of),
            solids: self
                .solids
                .iter()
                .map(|(_, solid)| SolidSummary {
                    name: solid.name().to_string(),
                    kind: solid.kind().type_name().to_string(),
                })
                .collect(),
            logical_volumes: self
                .logical_volumes
                .values()
                .map(|v| VolumeSummary {
                    name: v.name.clone(),
                    solid: self.solid_name(v.solid).unwrap_or_default().to_string(),
                    material: self
                        .materials
                        .get(v.material)
                        .map(|m| m.name.clone())
                        .unwrap_or_default(),
                    daughters: v.daughters.len(),
                })
                .collect(),
            assemblies: self
                .assemblies
                .values()
                .map(|a| AssemblySummary {
                    name: a.name.clone(),
                    daughters: a.daughters.len(),
                })
                .collect(),
            physical_volumes: self
                .physical_volumes
                .values()
                .map(|p| PlacementSummary {
                    name: p.name.clone(),
                    volume: name_of(p.volume),
                    mother: name_of(p.mother),
                    copy_number: p.copy_number,
                    rotation: p.rotation.into(),
                    translation: p.translation().into(),
                })
                .collect(),
            materials: self
                .materials
                .values()
                .map(|m| MaterialSummary {
                    name: m.name.clone(),
                    kind: m.kind().to_string(),
                    density: m.density,
                    state: m.state,
                })
                .collect(),
            elements: self.elements.values().map(|e| e.name.clone()).collect(),
            isotopes: self.isotopes.values().map(|i| i.name.clone()).collect(),
        }
    }

    /// Summary as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.summary())
    }
}

/// Serializable overview of a registry, in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySummary {
    pub world: Option<String>,
    pub solids: Vec<SolidSummary>,
    pub logical_volumes: Vec<VolumeSummary>,
    pub assemblies: Vec<AssemblySummary>,
    pub physical_volumes: Vec<PlacementSummary>,
    pub materials: Vec<MaterialSummary>,
    pub elements: Vec<String>,
    pub isotopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolidSummary {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeSummary {
    pub name: String,
    pub solid: String,
    pub material: String,
    pub daughters: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssemblySummary {
    pub name: String,
    pub daughters: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementSummary {
    pub name: String,
    pub volume: String,
    pub mother: String,
    pub copy_number: i32,
    pub rotation: [f64; 3],
    pub translation: [f64; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialSummary {
    pub name: String,
    pub kind: String,
    pub density: f64,
    pub state: MaterialState,
}
