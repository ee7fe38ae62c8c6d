// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoConv Core
//!
//! Source-side model for detector geometry conversion.
//!
//! ## Overview
//!
//! This crate describes the geometry tree a converter reads from:
//!
//! - **Identity handles**: generational keys that stand in for object identity
//! - **Shapes**: primitive and composite shape parameters as the source reports them
//! - **Matrices**: node-to-parent affine transforms
//! - **Materials**: elements, isotopes and resolved physical quantities
//! - **Volumes**: shape/material pairs and their ordered daughter placements
//!
//! Everything is reached through the [`GeometrySource`] trait. [`SourceTree`]
//! is an in-memory implementation.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for handles

pub mod error;
pub mod handles;
pub mod material;
pub mod matrix;
pub mod shape;
pub mod source;
pub mod volume;

pub use error::{Error, Result};
pub use handles::{HandleKind, MaterialHandle, MatrixHandle, ShapeHandle, VolumeHandle};
pub use material::{Composition, SourceElement, SourceIsotope, SourceMaterial};
pub use matrix::SourceMatrix;
pub use shape::{BooleanOperator, ExtrusionSection, ShapeKind, SourceShape, TrapParams, ZPlane};
pub use source::{GeometrySource, SourceTree};
pub use volume::{SourceNode, SourceVolume, VolumeContent};
