// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoConv Geometry
//!
//! Target-side solid model for the converter: a closed set of solid kinds,
//! an arena that stores them with lazily evaluated triangle meshes, rigid
//! placements with tbxyz angle conversion, and CSG evaluation through csgrs.
//!
//! ```
//! use geoconv_geometry::{SolidKind, SolidStore};
//!
//! let mut store = SolidStore::default();
//! let cube = store.insert("cube", SolidKind::Box { dx: 1.0, dy: 1.0, dz: 1.0 }).unwrap();
//! let mesh = store.mesh(cube).unwrap();
//! assert!((mesh.volume() - 8.0).abs() < 1e-9);
//! ```

pub mod builders;
pub mod csg;
pub mod cut;
pub mod error;
pub mod mesh;
pub mod solid;
pub mod store;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3};

pub use builders::MeshSettings;
pub use csg::{box_mesh, BooleanOp, CsgEvaluator, Plane};
pub use cut::{cut, cut_plane, half_space_slab, HalfSpaceCut};
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use solid::{SolidKind, Trap};
pub use store::{Solid, SolidKey, SolidStore};
pub use transform::{matrix_to_tbxyz, tbxyz_to_matrix, Placement};
pub use triangulation::{triangulate_face, triangulate_polygon};
