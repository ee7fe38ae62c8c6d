// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source shape descriptions.
//!
//! Lengths are in source length units and angles in degrees, exactly as the
//! source tree reports them. Half-lengths are used wherever the source
//! describes a symmetric extent (`dz` is always a half-length).

use crate::handles::{MatrixHandle, ShapeHandle};

/// A named source shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceShape {
    pub name: String,
    pub kind: ShapeKind,
}

impl SourceShape {
    pub fn new(name: impl Into<String>, kind: ShapeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Class name of the shape, used in diagnostics.
    pub fn class_name(&self) -> &str {
        self.kind.class_name()
    }
}

/// Boolean operator named by a composite shape.
///
/// Source trees may carry operators the converter does not understand;
/// those are kept verbatim in [`BooleanOperator::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanOperator {
    Union,
    Subtraction,
    Intersection,
    Other(String),
}

impl BooleanOperator {
    pub fn as_str(&self) -> &str {
        match self {
            BooleanOperator::Union => "union",
            BooleanOperator::Subtraction => "subtraction",
            BooleanOperator::Intersection => "intersection",
            BooleanOperator::Other(name) => name,
        }
    }
}

/// One z-plane of a polycone or polyhedra.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZPlane {
    pub z: f64,
    pub rmin: f64,
    pub rmax: f64,
}

/// One section of an extruded polygon.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionSection {
    pub z: f64,
    pub x0: f64,
    pub y0: f64,
    pub scale: f64,
}

/// Type-specific parameters of a source shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Box {
        dx: f64,
        dy: f64,
        dz: f64,
    },
    Tube {
        rmin: f64,
        rmax: f64,
        dz: f64,
    },
    TubeSegment {
        rmin: f64,
        rmax: f64,
        dz: f64,
        phi1: f64,
        phi2: f64,
    },
    /// Tube segment with arbitrary end planes; `low` and `high` are the
    /// outward unit normals of the end faces through `(0, 0, -dz)` and `(0, 0, dz)`.
    CutTube {
        rmin: f64,
        rmax: f64,
        dz: f64,
        phi1: f64,
        phi2: f64,
        low: [f64; 3],
        high: [f64; 3],
    },
    Cone {
        dz: f64,
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
    },
    ConeSegment {
        dz: f64,
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        phi1: f64,
        phi2: f64,
    },
    Para {
        dx: f64,
        dy: f64,
        dz: f64,
        alpha: f64,
        theta: f64,
        phi: f64,
    },
    /// Trapezoid varying in x only.
    Trd1 {
        dx1: f64,
        dx2: f64,
        dy: f64,
        dz: f64,
    },
    Trd2 {
        dx1: f64,
        dx2: f64,
        dy1: f64,
        dy2: f64,
        dz: f64,
    },
    Trap(TrapParams),
    TwistedTrap {
        twist: f64,
        trap: TrapParams,
    },
    Sphere {
        rmin: f64,
        rmax: f64,
        theta1: f64,
        theta2: f64,
        phi1: f64,
        phi2: f64,
    },
    Torus {
        r: f64,
        rmin: f64,
        rmax: f64,
        phi1: f64,
        dphi: f64,
    },
    Polycone {
        phi1: f64,
        dphi: f64,
        planes: Vec<ZPlane>,
    },
    Polyhedra {
        phi1: f64,
        dphi: f64,
        edges: u32,
        planes: Vec<ZPlane>,
    },
    EllipticalTube {
        a: f64,
        b: f64,
        dz: f64,
    },
    Paraboloid {
        rlo: f64,
        rhi: f64,
        dz: f64,
    },
    /// Hyperbolic tube; stereo angles in degrees.
    Hype {
        rmin: f64,
        stereo_in: f64,
        rmax: f64,
        stereo_out: f64,
        dz: f64,
    },
    Extruded {
        polygon: Vec<[f64; 2]>,
        sections: Vec<ExtrusionSection>,
    },
    Scaled {
        shape: ShapeHandle,
        scale: [f64; 3],
    },
    Tessellated {
        vertices: Vec<[f64; 3]>,
        facets: Vec<Vec<usize>>,
    },
    Composite {
        operator: BooleanOperator,
        left: ShapeHandle,
        right: ShapeHandle,
        left_matrix: MatrixHandle,
        right_matrix: MatrixHandle,
    },
    /// Any shape class the converter has no builder for. Only the
    /// bounding box half-lengths computed by the source are available.
    Unsupported {
        class_name: String,
        dx: f64,
        dy: f64,
        dz: f64,
    },
}

/// General trapezoid parameters (angles in degrees).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapParams {
    pub dz: f64,
    pub theta: f64,
    pub phi: f64,
    pub h1: f64,
    pub bl1: f64,
    pub tl1: f64,
    pub alpha1: f64,
    pub h2: f64,
    pub bl2: f64,
    pub tl2: f64,
    pub alpha2: f64,
}

impl ShapeKind {
    pub fn class_name(&self) -> &str {
        match self {
            ShapeKind::Box { .. } => "Box",
            ShapeKind::Tube { .. } => "Tube",
            ShapeKind::TubeSegment { .. } => "TubeSegment",
            ShapeKind::CutTube { .. } => "CutTube",
            ShapeKind::Cone { .. } => "Cone",
            ShapeKind::ConeSegment { .. } => "ConeSegment",
            ShapeKind::Para { .. } => "Para",
            ShapeKind::Trd1 { .. } => "Trd1",
            ShapeKind::Trd2 { .. } => "Trd2",
            ShapeKind::Trap(_) => "Trap",
            ShapeKind::TwistedTrap { .. } => "TwistedTrap",
            ShapeKind::Sphere { .. } => "Sphere",
            ShapeKind::Torus { .. } => "Torus",
            ShapeKind::Polycone { .. } => "Polycone",
            ShapeKind::Polyhedra { .. } => "Polyhedra",
            ShapeKind::EllipticalTube { .. } => "EllipticalTube",
            ShapeKind::Paraboloid { .. } => "Paraboloid",
            ShapeKind::Hype { .. } => "Hype",
            ShapeKind::Extruded { .. } => "Extruded",
            ShapeKind::Scaled { .. } => "Scaled",
            ShapeKind::Tessellated { .. } => "Tessellated",
            ShapeKind::Composite { .. } => "Composite",
            ShapeKind::Unsupported { class_name, .. } => class_name,
        }
    }

    /// Shapes this shape refers to, left operand first.
    pub fn children(&self) -> Vec<ShapeHandle> {
        match self {
            ShapeKind::Scaled { shape, .. } => vec![*shape],
            ShapeKind::Composite { left, right, .. } => vec![*left, *right],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_reports_its_own_class() {
        let kind = ShapeKind::Unsupported {
            class_name: "Arb8".to_string(),
            dx: 1.0,
            dy: 2.0,
            dz: 3.0,
        };
        assert_eq!(kind.class_name(), "Arb8");
        assert!(kind.children().is_empty());
    }

    #[test]
    fn operator_names() {
        assert_eq!(BooleanOperator::Union.as_str(), "union");
        assert_eq!(BooleanOperator::Other("xor".into()).as_str(), "xor");
    }
}
