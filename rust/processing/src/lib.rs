// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoConv Processing
//!
//! Converts a source geometry tree, seen only through
//! [`geoconv_core::GeometrySource`], into a target [`Registry`] of solids,
//! logical / assembly / physical volumes and materials.
//!
//! Every shape, matrix, material and volume is converted at most once per run:
//! repeated references hit an [`IdentityCache`] keyed by source handle. Fatal
//! conditions abort the run with a [`ConvertError`]; recoverable ones are
//! collected as [`Warning`]s on the [`Conversion`].
//!
//! ```
//! use geoconv_core::{ShapeKind, SourceMaterial, SourceMatrix, SourceShape, SourceTree, SourceVolume};
//! use geoconv_processing::{convert, ConvertConfig};
//!
//! let mut tree = SourceTree::new();
//! let air = tree.add_material(SourceMaterial::single_element("Air", 7.0, 14.0, 0.0012));
//! let big = tree.add_shape(SourceShape::new("world", ShapeKind::Box { dx: 50.0, dy: 50.0, dz: 50.0 }));
//! let small = tree.add_shape(SourceShape::new("cell", ShapeKind::Box { dx: 1.0, dy: 1.0, dz: 1.0 }));
//! let world = tree.add_volume(SourceVolume::new("World", big, air));
//! let cell = tree.add_volume(SourceVolume::new("Cell", small, air));
//! for i in 0..3 {
//!     let m = tree.add_matrix(SourceMatrix::translation(format!("m{}", i), [3.0 * i as f64, 0.0, 0.0]));
//!     tree.add_daughter(world, "cell_pv", m, i, cell).unwrap();
//! }
//! tree.set_top_volume(world);
//!
//! let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
//! assert_eq!(conversion.registry().logical_volumes().count(), 2);
//! assert_eq!(conversion.registry().physical_volumes().count(), 3);
//! assert_eq!(conversion.shape_references(small), 1);
//! ```

pub mod config;
mod context;
pub mod diagnostics;
pub mod error;
pub mod identity;
pub mod materials;
pub mod registry;
pub mod shapes;
pub mod transforms;
pub mod walker;

pub use config::ConvertConfig;
pub use diagnostics::Warning;
pub use error::{ConvertError, Result};
pub use identity::IdentityCache;
pub use materials::MaterialLoader;
pub use registry::{
    AssemblyKey, AssemblyVolume, Element, ElementKey, Isotope, IsotopeKey, LogicalKey,
    LogicalVolume, Material, MaterialComposition, MaterialKey, MaterialState, PhysicalKey,
    PhysicalVolume, Registry,
    RegistrySummary, VolumeRef,
};
pub use shapes::ShapeResolver;
pub use transforms::TransformComposer;
pub use walker::{convert, Conversion, ConvertState, Converter};
