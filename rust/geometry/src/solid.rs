// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target solid descriptions
//!
//! [`SolidKind`] is the closed set of solids the converter can produce.
//! Parameters are in target units: lengths already scaled, angles in radians,
//! and every `d*` length is a half-length. A kind is validated once when it is
//! stored; a kind that fails validation describes no solid at all.

use std::f64::consts::{PI, TAU};

use crate::csg::BooleanOp;
use crate::error::{Error, Result};
use crate::store::SolidKey;
use crate::transform::Placement;
use geoconv_core::{ExtrusionSection, ZPlane};
use nalgebra::{Point2, Point3, Vector3};
use smallvec::SmallVec;

/// General trapezoid: faces at `-dz` (`dy1`, `dx1`, `dx2`) and `+dz`
/// (`dy2`, `dx3`, `dx4`), axis tilted by `theta`/`phi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trap {
    pub dz: f64,
    pub theta: f64,
    pub phi: f64,
    pub dy1: f64,
    pub dx1: f64,
    pub dx2: f64,
    pub alpha1: f64,
    pub dy2: f64,
    pub dx3: f64,
    pub dx4: f64,
    pub alpha2: f64,
}

/// Every solid the registry can hold
#[derive(Debug, Clone, PartialEq)]
pub enum SolidKind {
    Box {
        dx: f64,
        dy: f64,
        dz: f64,
    },
    Tubs {
        rmin: f64,
        rmax: f64,
        dz: f64,
        sphi: f64,
        dphi: f64,
    },
    /// Tube segment whose end faces are the planes through `(0, 0, ∓dz)` with
    /// outward normals `low_normal` / `high_normal`.
    CutTubs {
        rmin: f64,
        rmax: f64,
        dz: f64,
        sphi: f64,
        dphi: f64,
        low_normal: Vector3<f64>,
        high_normal: Vector3<f64>,
    },
    Cons {
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        dz: f64,
        sphi: f64,
        dphi: f64,
    },
    Para {
        dx: f64,
        dy: f64,
        dz: f64,
        alpha: f64,
        theta: f64,
        phi: f64,
    },
    Trd {
        dx1: f64,
        dx2: f64,
        dy1: f64,
        dy2: f64,
        dz: f64,
    },
    Trap(Trap),
    TwistedTrap {
        twist: f64,
        trap: Trap,
    },
    Sphere {
        rmin: f64,
        rmax: f64,
        sphi: f64,
        dphi: f64,
        stheta: f64,
        dtheta: f64,
    },
    Torus {
        rmin: f64,
        rmax: f64,
        rtor: f64,
        sphi: f64,
        dphi: f64,
    },
    Polycone {
        sphi: f64,
        dphi: f64,
        planes: Vec<ZPlane>,
    },
    /// `planes` radii are distances to the flat sides
    Polyhedra {
        sphi: f64,
        dphi: f64,
        sides: u32,
        planes: Vec<ZPlane>,
    },
    EllipticalTube {
        dx: f64,
        dy: f64,
        dz: f64,
    },
    Paraboloid {
        rlo: f64,
        rhi: f64,
        dz: f64,
    },
    Hype {
        rmin: f64,
        rmax: f64,
        inner_stereo: f64,
        outer_stereo: f64,
        dz: f64,
    },
    ExtrudedSolid {
        polygon: Vec<Point2<f64>>,
        sections: Vec<ExtrusionSection>,
    },
    /// Facets index `vertices` counter-clockwise seen from outside
    Tessellated {
        vertices: Vec<Point3<f64>>,
        facets: Vec<SmallVec<[u32; 4]>>,
    },
    Scaled {
        solid: SolidKey,
        scale: Vector3<f64>,
    },
    /// `left op (placement · right)`
    Boolean {
        op: BooleanOp,
        left: SolidKey,
        right: SolidKey,
        placement: Placement,
    },
}

fn require(ok: bool, reason: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::DegenerateSolid(reason()))
    }
}

fn check_planes(what: &str, planes: &[ZPlane]) -> Result<()> {
    require(planes.len() >= 2, || {
        format!("{} needs at least two z-planes, has {}", what, planes.len())
    })?;
    for p in planes {
        require(p.rmin >= 0.0 && p.rmax >= p.rmin, || {
            format!("{} plane at z={} has rmin {} > rmax {}", what, p.z, p.rmin, p.rmax)
        })?;
    }
    let first = planes[0].z;
    let last = planes[planes.len() - 1].z;
    require(first != last, || format!("{} has zero length", what))?;
    require(planes.iter().any(|p| p.rmax > 0.0), || {
        format!("{} has zero outer radius everywhere", what)
    })
}

fn check_trap(trap: &Trap) -> Result<()> {
    require(trap.dz > 0.0, || format!("trap half-length {}", trap.dz))?;
    require(trap.dy1 != 0.0, || "trap with zero low-face height".to_string())?;
    require(trap.dy2 > 0.0 && trap.dy1 > 0.0, || {
        format!("trap heights {} / {}", trap.dy1, trap.dy2)
    })?;
    require(
        [trap.dx1, trap.dx2, trap.dx3, trap.dx4]
            .iter()
            .all(|x| *x >= 0.0)
            && trap.dx1 + trap.dx2 > 0.0
            && trap.dx3 + trap.dx4 > 0.0,
        || "trap with a collapsed face".to_string(),
    )
}

impl SolidKind {
    /// Short lowercase type tag
    pub fn type_name(&self) -> &'static str {
        match self {
            SolidKind::Box { .. } => "box",
            SolidKind::Tubs { .. } => "tube",
            SolidKind::CutTubs { .. } => "cuttube",
            SolidKind::Cons { .. } => "cone",
            SolidKind::Para { .. } => "para",
            SolidKind::Trd { .. } => "trd",
            SolidKind::Trap(_) => "trap",
            SolidKind::TwistedTrap { .. } => "twistedtrap",
            SolidKind::Sphere { .. } => "sphere",
            SolidKind::Torus { .. } => "torus",
            SolidKind::Polycone { .. } => "polycone",
            SolidKind::Polyhedra { .. } => "polyhedra",
            SolidKind::EllipticalTube { .. } => "eltube",
            SolidKind::Paraboloid { .. } => "paraboloid",
            SolidKind::Hype { .. } => "hype",
            SolidKind::ExtrudedSolid { .. } => "xtru",
            SolidKind::Tessellated { .. } => "tessellated",
            SolidKind::Scaled { .. } => "scaled",
            SolidKind::Boolean { op, .. } => op.as_str(),
        }
    }

    /// Solids this one is built from, left operand first
    pub fn operands(&self) -> SmallVec<[SolidKey; 2]> {
        match self {
            SolidKind::Scaled { solid, .. } => smallvec::smallvec![*solid],
            SolidKind::Boolean { left, right, .. } => smallvec::smallvec![*left, *right],
            _ => SmallVec::new(),
        }
    }

    /// Reject parameter combinations that describe no solid.
    pub fn validate(&self) -> Result<()> {
        match self {
            SolidKind::Box { dx, dy, dz } => require(*dx > 0.0 && *dy > 0.0 && *dz > 0.0, || {
                format!("box half-lengths {} {} {}", dx, dy, dz)
            }),
            SolidKind::Tubs {
                rmin,
                rmax,
                dz,
                dphi,
                ..
            }
            | SolidKind::CutTubs {
                rmin,
                rmax,
                dz,
                dphi,
                ..
            } => {
                require(*rmin >= 0.0 && rmax > rmin, || {
                    format!("tube radii {} .. {}", rmin, rmax)
                })?;
                require(*dz > 0.0, || format!("tube half-length {}", dz))?;
                require(*dphi > 0.0, || format!("tube opening angle {}", dphi))?;
                if let SolidKind::CutTubs {
                    low_normal,
                    high_normal,
                    ..
                } = self
                {
                    require(low_normal.z < 0.0, || {
                        format!("low cut normal {:?} does not face -z", low_normal)
                    })?;
                    require(high_normal.z > 0.0, || {
                        format!("high cut normal {:?} does not face +z", high_normal)
                    })?;
                }
                Ok(())
            }
            SolidKind::Cons {
                rmin1,
                rmax1,
                rmin2,
                rmax2,
                dz,
                dphi,
                ..
            } => {
                require(*rmin1 >= 0.0 && *rmin2 >= 0.0, || "negative cone radius".to_string())?;
                require(rmax1 >= rmin1 && rmax2 >= rmin2, || {
                    "cone inner radius exceeds outer".to_string()
                })?;
                require(*rmax1 > 0.0 || *rmax2 > 0.0, || "cone with no outer radius".to_string())?;
                require(*dz > 0.0 && *dphi > 0.0, || format!("cone dz {} dphi {}", dz, dphi))
            }
            SolidKind::Para { dx, dy, dz, .. } => {
                require(*dx > 0.0 && *dy > 0.0 && *dz > 0.0, || {
                    format!("para half-lengths {} {} {}", dx, dy, dz)
                })
            }
            SolidKind::Trd {
                dx1,
                dx2,
                dy1,
                dy2,
                dz,
            } => {
                require(*dz > 0.0, || format!("trd half-length {}", dz))?;
                require(*dx1 >= 0.0 && *dx2 >= 0.0 && *dy1 >= 0.0 && *dy2 >= 0.0, || {
                    "negative trd half-width".to_string()
                })?;
                require(dx1 + dx2 > 0.0 && dy1 + dy2 > 0.0, || {
                    "trd collapsed to a plane".to_string()
                })
            }
            SolidKind::Trap(trap) => check_trap(trap),
            SolidKind::TwistedTrap { trap, .. } => check_trap(trap),
            SolidKind::Sphere {
                rmin,
                rmax,
                dphi,
                dtheta,
                ..
            } => {
                require(*rmin >= 0.0 && rmax > rmin, || {
                    format!("sphere radii {} .. {}", rmin, rmax)
                })?;
                require(*dphi > 0.0 && *dtheta > 0.0, || {
                    format!("sphere angles dphi {} dtheta {}", dphi, dtheta)
                })
            }
            SolidKind::Torus {
                rmin,
                rmax,
                rtor,
                dphi,
                ..
            } => {
                require(*rmin >= 0.0 && rmax > rmin, || {
                    format!("torus radii {} .. {}", rmin, rmax)
                })?;
                require(rtor >= rmax, || format!("torus sweep radius {} < {}", rtor, rmax))?;
                require(*dphi > 0.0, || format!("torus opening angle {}", dphi))
            }
            SolidKind::Polycone { dphi, planes, .. } => {
                require(*dphi > 0.0, || format!("polycone opening angle {}", dphi))?;
                check_planes("polycone", planes)
            }
            SolidKind::Polyhedra {
                dphi,
                sides,
                planes,
                ..
            } => {
                require(*sides > 0, || "polyhedra without sides".to_string())?;
                require(*dphi > 0.0, || format!("polyhedra opening angle {}", dphi))?;
                // A side spanning half a turn or more has its corners at infinity
                let side_angle = dphi.min(TAU) / f64::from(*sides);
                require(side_angle < PI, || {
                    format!("polyhedra with {} sides over {} rad", sides, dphi)
                })?;
                check_planes("polyhedra", planes)
            }
            SolidKind::EllipticalTube { dx, dy, dz } => {
                require(*dx > 0.0 && *dy > 0.0 && *dz > 0.0, || {
                    format!("elliptical tube half-lengths {} {} {}", dx, dy, dz)
                })
            }
            SolidKind::Paraboloid { rlo, rhi, dz } => {
                require(*rlo >= 0.0 && rhi > rlo, || {
                    format!("paraboloid radii {} .. {}", rlo, rhi)
                })?;
                require(*dz > 0.0, || format!("paraboloid half-length {}", dz))
            }
            SolidKind::Hype {
                rmin, rmax, dz, ..
            } => {
                require(*rmin >= 0.0 && rmax > rmin, || {
                    format!("hype radii {} .. {}", rmin, rmax)
                })?;
                require(*dz > 0.0, || format!("hype half-length {}", dz))
            }
            SolidKind::ExtrudedSolid { polygon, sections } => {
                require(polygon.len() >= 3, || {
                    format!("extrusion polygon has {} vertices", polygon.len())
                })?;
                require(sections.len() >= 2, || {
                    format!("extrusion has {} sections", sections.len())
                })?;
                require(sections.iter().all(|s| s.scale > 0.0), || {
                    "extrusion section with non-positive scale".to_string()
                })?;
                require(sections.windows(2).all(|w| w[1].z > w[0].z), || {
                    "extrusion sections not strictly increasing in z".to_string()
                })
            }
            SolidKind::Tessellated { vertices, facets } => {
                require(!facets.is_empty(), || "tessellated solid without facets".to_string())?;
                for facet in facets {
                    require(facet.len() >= 3, || format!("facet with {} vertices", facet.len()))?;
                    require(facet.iter().all(|&i| (i as usize) < vertices.len()), || {
                        format!("facet index out of range ({} vertices)", vertices.len())
                    })?;
                }
                Ok(())
            }
            SolidKind::Scaled { scale, .. } => {
                require(scale.iter().all(|s| *s != 0.0 && s.is_finite()), || {
                    format!("scale {:?}", scale)
                })
            }
            SolidKind::Boolean { .. } => Ok(()),
        }
    }
}
