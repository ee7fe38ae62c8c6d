// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source materials to registry materials, elements and isotopes.

use geoconv_core::{Composition, GeometrySource, MaterialHandle, SourceElement, SourceIsotope};

use crate::config::ConvertConfig;
use crate::error::Result;
use crate::identity::IdentityCache;
use crate::registry::{
    Element, ElementKey, Isotope, IsotopeKey, Material, MaterialComposition, MaterialKey,
    MaterialState, Registry,
};

/// Source names may carry ':' which target names cannot
fn clean_name(name: &str) -> String {
    name.replace(':', "")
}

#[derive(Debug, Default)]
pub struct MaterialLoader {
    cache: IdentityCache<MaterialHandle, MaterialKey>,
}

impl MaterialLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert every top-level source material once.
    pub fn load_all<S: GeometrySource + ?Sized>(
        &mut self,
        source: &S,
        registry: &mut Registry,
        config: &ConvertConfig,
    ) -> Result<()> {
        for handle in source.materials() {
            if !self.cache.contains(handle) {
                let key = self.build(source, registry, config, handle)?;
                self.cache.insert(handle, key);
            }
        }
        Ok(())
    }

    /// Registry material for `handle`, converting it if no load has seen it yet.
    pub fn resolve<S: GeometrySource + ?Sized>(
        &mut self,
        source: &S,
        registry: &mut Registry,
        config: &ConvertConfig,
        handle: MaterialHandle,
    ) -> Result<MaterialKey> {
        if let Some(key) = self.cache.lookup(handle) {
            return Ok(key);
        }
        let key = self.build(source, registry, config, handle)?;
        self.cache.insert(handle, key);
        Ok(key)
    }

    pub fn cache(&self) -> &IdentityCache<MaterialHandle, MaterialKey> {
        &self.cache
    }

    fn build<S: GeometrySource + ?Sized>(
        &mut self,
        source: &S,
        registry: &mut Registry,
        config: &ConvertConfig,
        handle: MaterialHandle,
    ) -> Result<MaterialKey> {
        let material = source.material(handle)?;
        let name = clean_name(&material.name);

        if material.density == 0.0 && config.vacuum_substitution {
            tracing::debug!(
                material = %name,
                surrogate = %config.vacuum_material,
                "substituting vacuum"
            );
            return Ok(registry.predefined_material(&config.vacuum_material));
        }

        let composition = match &material.composition {
            Composition::SingleElement { z, a } => {
                MaterialComposition::SingleElement { z: *z, a: *a }
            }
            Composition::Mixture(components) => MaterialComposition::Compound(
                components
                    .iter()
                    .map(|(element, fraction)| (element_key(registry, element), *fraction))
                    .collect(),
            ),
        };

        tracing::debug!(material = %name, density = material.density, "material");
        Ok(registry.add_material(Material {
            name,
            density: material.density,
            state: MaterialState::from_code(material.state),
            temperature: material.temperature,
            pressure: material.pressure,
            composition,
        }))
    }
}

fn element_key(registry: &mut Registry, element: &SourceElement) -> ElementKey {
    let formula = clean_name(&element.name);
    let name = format!("{}_elm", formula);
    if let Some(key) = registry.element_by_name(&name) {
        return key;
    }

    let isotopes = element
        .isotopes
        .iter()
        .map(|(isotope, abundance)| (isotope_key(registry, isotope), *abundance))
        .collect();
    registry.add_element(Element {
        name,
        formula,
        z: element.z,
        a: element.a,
        isotopes,
    })
}

fn isotope_key(registry: &mut Registry, isotope: &SourceIsotope) -> IsotopeKey {
    registry.add_isotope(Isotope {
        name: clean_name(&isotope.name),
        z: isotope.z,
        n: isotope.n,
        a: isotope.a,
    })
}
