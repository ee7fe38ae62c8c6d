// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source volumes and daughter placements.

use smallvec::SmallVec;

use crate::handles::{MaterialHandle, MatrixHandle, ShapeHandle, VolumeHandle};

/// What a source volume is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeContent {
    /// A shape filled with a material.
    Solid {
        shape: ShapeHandle,
        material: MaterialHandle,
    },
    /// A grouping of placements without a shape of its own.
    Assembly,
}

/// One placement of a child volume inside its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub name: String,
    pub matrix: MatrixHandle,
    pub copy_number: i32,
    pub volume: VolumeHandle,
}

/// A source volume with its ordered daughters.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVolume {
    pub name: String,
    pub content: VolumeContent,
    pub daughters: SmallVec<[SourceNode; 4]>,
}

impl SourceVolume {
    pub fn new(name: impl Into<String>, shape: ShapeHandle, material: MaterialHandle) -> Self {
        Self {
            name: name.into(),
            content: VolumeContent::Solid { shape, material },
            daughters: SmallVec::new(),
        }
    }

    pub fn assembly(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: VolumeContent::Assembly,
            daughters: SmallVec::new(),
        }
    }
}
