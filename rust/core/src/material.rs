// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source materials, elements and isotopes.
//!
//! Physical quantities are carried through unchanged; the converter does not
//! model material properties beyond copying them.

/// An isotope as reported by the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceIsotope {
    pub name: String,
    pub z: u32,
    pub n: u32,
    pub a: f64,
}

/// An element, optionally defined by its isotope abundances.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceElement {
    pub name: String,
    pub z: f64,
    pub a: f64,
    /// `(isotope, relative abundance)`; empty for a simple element.
    pub isotopes: Vec<(SourceIsotope, f64)>,
}

impl SourceElement {
    pub fn simple(name: impl Into<String>, z: f64, a: f64) -> Self {
        Self {
            name: name.into(),
            z,
            a,
            isotopes: Vec::new(),
        }
    }
}

/// How a material is made up.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    /// A material of one element given by effective Z and A.
    SingleElement { z: f64, a: f64 },
    /// `(element, mass fraction)` pairs.
    Mixture(Vec<(SourceElement, f64)>),
}

/// A source material.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMaterial {
    pub name: String,
    pub density: f64,
    /// Raw source state code: 0 undefined, 1 solid, 2 liquid, 3 gas.
    pub state: u32,
    pub temperature: f64,
    pub pressure: f64,
    pub composition: Composition,
}

impl SourceMaterial {
    pub fn single_element(name: impl Into<String>, z: f64, a: f64, density: f64) -> Self {
        Self {
            name: name.into(),
            density,
            state: 0,
            temperature: 293.15,
            pressure: 1.0,
            composition: Composition::SingleElement { z, a },
        }
    }

    pub fn mixture(
        name: impl Into<String>,
        density: f64,
        components: Vec<(SourceElement, f64)>,
    ) -> Self {
        Self {
            name: name.into(),
            density,
            state: 0,
            temperature: 293.15,
            pressure: 1.0,
            composition: Composition::Mixture(components),
        }
    }

    pub fn with_state(mut self, state: u32) -> Self {
        self.state = state;
        self
    }
}
