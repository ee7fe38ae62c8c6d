// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape resolution: source shapes to registry solids, at most once each.
//!
//! Composites resolve their operands first. A shape that cannot be built
//! resolves to `None` and so does every composite above it; unknown boolean
//! operators and singular operand transforms abort the run instead.

use std::f64::consts::TAU;

use geoconv_core::{
    BooleanOperator, ExtrusionSection, GeometrySource, ShapeHandle, ShapeKind, TrapParams, ZPlane,
};
use geoconv_geometry::{BooleanOp, Mesh, Point2, Point3, SolidKey, SolidKind, Trap, Vector3};
use smallvec::SmallVec;

use crate::config::ConvertConfig;
use crate::context::Session;
use crate::diagnostics::Warning;
use crate::error::{ConvertError, Result};
use crate::identity::IdentityCache;

#[derive(Debug, Default)]
pub struct ShapeResolver {
    cache: IdentityCache<ShapeHandle, Option<SolidKey>>,
}

impl ShapeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &IdentityCache<ShapeHandle, Option<SolidKey>> {
        &self.cache
    }

    /// Solid for `handle`, or `None` when the shape cannot be built.
    pub(crate) fn resolve<S: GeometrySource + ?Sized>(
        &mut self,
        session: &mut Session<'_, S>,
        handle: ShapeHandle,
    ) -> Result<Option<SolidKey>> {
        self.resolve_at(session, handle, 0)
    }

    fn resolve_at<S: GeometrySource + ?Sized>(
        &mut self,
        session: &mut Session<'_, S>,
        handle: ShapeHandle,
        depth: usize,
    ) -> Result<Option<SolidKey>> {
        if let Some(cached) = self.cache.lookup(handle) {
            tracing::debug!(shape = ?handle, "shape cache hit");
            return Ok(cached);
        }

        let source = session.source;
        let config = session.config;
        let shape = source.shape(handle)?;

        if depth > config.max_boolean_depth {
            // Not cached: a shallower reference to the same shape may still fit
            session.warn(Warning::NestingTooDeep {
                shape: shape.name.clone(),
                depth: config.max_boolean_depth,
            });
            return Ok(None);
        }

        let kind = match &shape.kind {
            ShapeKind::Composite {
                operator,
                left,
                right,
                left_matrix,
                right_matrix,
            } => {
                let op = match operator {
                    BooleanOperator::Union => BooleanOp::Union,
                    BooleanOperator::Subtraction => BooleanOp::Subtraction,
                    BooleanOperator::Intersection => BooleanOp::Intersection,
                    BooleanOperator::Other(name) => {
                        return Err(ConvertError::UnknownBooleanOperator {
                            shape: shape.name.clone(),
                            operator: name.clone(),
                        })
                    }
                };
                let left_solid = self.resolve_at(session, *left, depth + 1)?;
                let right_solid = self.resolve_at(session, *right, depth + 1)?;
                let (Some(left_solid), Some(right_solid)) = (left_solid, right_solid) else {
                    tracing::debug!(shape = %shape.name, "composite operand unbuildable");
                    self.cache.insert(handle, None);
                    return Ok(None);
                };
                let placement = session.transforms.boolean_operand(
                    source,
                    *left_matrix,
                    *right_matrix,
                    config.length_scale,
                )?;
                SolidKind::Boolean {
                    op,
                    left: left_solid,
                    right: right_solid,
                    placement,
                }
            }
            ShapeKind::Scaled { shape: inner, scale } => {
                let Some(solid) = self.resolve_at(session, *inner, depth + 1)? else {
                    self.cache.insert(handle, None);
                    return Ok(None);
                };
                SolidKind::Scaled {
                    solid,
                    scale: Vector3::from(*scale),
                }
            }
            ShapeKind::Unsupported {
                class_name,
                dx,
                dy,
                dz,
            } => {
                session.warn(Warning::UnsupportedPrimitive {
                    shape: shape.name.clone(),
                    class: class_name.clone(),
                });
                SolidKind::Box {
                    dx: config.length(*dx),
                    dy: config.length(*dy),
                    dz: config.length(*dz),
                }
            }
            primitive => match primitive_kind(primitive, config)? {
                Ok(kind) => kind,
                Err(reason) => {
                    session.warn(Warning::DegenerateSolid {
                        shape: shape.name.clone(),
                        reason,
                    });
                    self.cache.insert(handle, None);
                    return Ok(None);
                }
            },
        };

        let kind = if config.should_tessellate(&shape.name) {
            // Any evaluation failure only costs this shape
            match session.registry.solids().evaluate(&kind) {
                Ok(mesh) => tessellated_kind(&mesh),
                Err(geoconv_geometry::Error::DegenerateSolid(reason)) => {
                    session.warn(Warning::DegenerateSolid {
                        shape: shape.name.clone(),
                        reason,
                    });
                    self.cache.insert(handle, None);
                    return Ok(None);
                }
                Err(err) => {
                    session.warn(Warning::TessellationFailed {
                        shape: shape.name.clone(),
                        reason: err.to_string(),
                    });
                    self.cache.insert(handle, None);
                    return Ok(None);
                }
            }
        } else {
            kind
        };

        let solid = match session.registry.add_solid(&shape.name, kind) {
            Ok(key) => {
                tracing::debug!(shape = %shape.name, class = shape.class_name(), "built solid");
                Some(key)
            }
            Err(geoconv_geometry::Error::DegenerateSolid(reason)) => {
                session.warn(Warning::DegenerateSolid {
                    shape: shape.name.clone(),
                    reason,
                });
                None
            }
            Err(err) => return Err(err.into()),
        };
        self.cache.insert(handle, solid);
        Ok(solid)
    }
}

/// Opening angle from a start/end pair in degrees; a non-positive span wraps
fn span(start: f64, end: f64) -> f64 {
    let d = end - start;
    if d <= 0.0 {
        d + 360.0
    } else {
        d
    }
}

fn trap(params: &TrapParams, config: &ConvertConfig) -> Trap {
    Trap {
        dz: config.length(params.dz),
        theta: config.angle(params.theta),
        phi: config.angle(params.phi),
        dy1: config.length(params.h1),
        dx1: config.length(params.bl1),
        dx2: config.length(params.tl1),
        alpha1: config.angle(params.alpha1),
        dy2: config.length(params.h2),
        dx3: config.length(params.bl2),
        dx4: config.length(params.tl2),
        alpha2: config.angle(params.alpha2),
    }
}

fn planes(planes: &[ZPlane], config: &ConvertConfig) -> Vec<ZPlane> {
    planes
        .iter()
        .map(|p| ZPlane {
            z: config.length(p.z),
            rmin: config.length(p.rmin),
            rmax: config.length(p.rmax),
        })
        .collect()
}

/// Target parameters of a primitive source shape: lengths scaled, angles in radians.
///
/// The inner `Err` carries the reason a primitive describes no solid. Handing
/// a non-primitive kind here is an internal error.
fn primitive_kind(
    kind: &ShapeKind,
    config: &ConvertConfig,
) -> Result<std::result::Result<SolidKind, String>> {
    let l = |v: f64| config.length(v);
    let a = |v: f64| config.angle(v);
    let solid = match kind {
        ShapeKind::Box { dx, dy, dz } => SolidKind::Box {
            dx: l(*dx),
            dy: l(*dy),
            dz: l(*dz),
        },
        ShapeKind::Tube { rmin, rmax, dz } => SolidKind::Tubs {
            rmin: l(*rmin),
            rmax: l(*rmax),
            dz: l(*dz),
            sphi: 0.0,
            dphi: TAU,
        },
        ShapeKind::TubeSegment {
            rmin,
            rmax,
            dz,
            phi1,
            phi2,
        } => SolidKind::Tubs {
            rmin: l(*rmin),
            rmax: l(*rmax),
            dz: l(*dz),
            sphi: a(*phi1),
            dphi: a(span(*phi1, *phi2)),
        },
        ShapeKind::CutTube {
            rmin,
            rmax,
            dz,
            phi1,
            phi2,
            low,
            high,
        } => SolidKind::CutTubs {
            rmin: l(*rmin),
            rmax: l(*rmax),
            dz: l(*dz),
            sphi: a(*phi1),
            dphi: a(span(*phi1, *phi2)),
            low_normal: Vector3::from(*low),
            high_normal: Vector3::from(*high),
        },
        ShapeKind::Cone {
            dz,
            rmin1,
            rmax1,
            rmin2,
            rmax2,
        } => SolidKind::Cons {
            rmin1: l(*rmin1),
            rmax1: l(*rmax1),
            rmin2: l(*rmin2),
            rmax2: l(*rmax2),
            dz: l(*dz),
            sphi: 0.0,
            dphi: TAU,
        },
        ShapeKind::ConeSegment {
            dz,
            rmin1,
            rmax1,
            rmin2,
            rmax2,
            phi1,
            phi2,
        } => SolidKind::Cons {
            rmin1: l(*rmin1),
            rmax1: l(*rmax1),
            rmin2: l(*rmin2),
            rmax2: l(*rmax2),
            dz: l(*dz),
            sphi: a(*phi1),
            dphi: a(span(*phi1, *phi2)),
        },
        ShapeKind::Para {
            dx,
            dy,
            dz,
            alpha,
            theta,
            phi,
        } => SolidKind::Para {
            dx: l(*dx),
            dy: l(*dy),
            dz: l(*dz),
            alpha: a(*alpha),
            theta: a(*theta),
            phi: a(*phi),
        },
        ShapeKind::Trd1 { dx1, dx2, dy, dz } => SolidKind::Trd {
            dx1: l(*dx1),
            dx2: l(*dx2),
            dy1: l(*dy),
            dy2: l(*dy),
            dz: l(*dz),
        },
        ShapeKind::Trd2 {
            dx1,
            dx2,
            dy1,
            dy2,
            dz,
        } => SolidKind::Trd {
            dx1: l(*dx1),
            dx2: l(*dx2),
            dy1: l(*dy1),
            dy2: l(*dy2),
            dz: l(*dz),
        },
        ShapeKind::Trap(params) => SolidKind::Trap(trap(params, config)),
        ShapeKind::TwistedTrap { twist, trap: params } => SolidKind::TwistedTrap {
            twist: a(*twist),
            trap: trap(params, config),
        },
        ShapeKind::Sphere {
            rmin,
            rmax,
            theta1,
            theta2,
            phi1,
            phi2,
        } => SolidKind::Sphere {
            rmin: l(*rmin),
            rmax: l(*rmax),
            sphi: a(*phi1),
            dphi: a(span(*phi1, *phi2)),
            stheta: a(*theta1),
            dtheta: a(theta2 - theta1),
        },
        ShapeKind::Torus {
            r,
            rmin,
            rmax,
            phi1,
            dphi,
        } => SolidKind::Torus {
            rmin: l(*rmin),
            rmax: l(*rmax),
            rtor: l(*r),
            sphi: a(*phi1),
            dphi: a(*dphi),
        },
        ShapeKind::Polycone {
            phi1,
            dphi,
            planes: zplanes,
        } => SolidKind::Polycone {
            sphi: a(*phi1),
            dphi: a(*dphi),
            planes: planes(zplanes, config),
        },
        ShapeKind::Polyhedra {
            phi1,
            dphi,
            edges,
            planes: zplanes,
        } => SolidKind::Polyhedra {
            sphi: a(*phi1),
            dphi: a(*dphi),
            sides: *edges,
            planes: planes(zplanes, config),
        },
        ShapeKind::EllipticalTube { a: da, b: db, dz } => SolidKind::EllipticalTube {
            dx: l(*da),
            dy: l(*db),
            dz: l(*dz),
        },
        ShapeKind::Paraboloid { rlo, rhi, dz } => SolidKind::Paraboloid {
            rlo: l(*rlo),
            rhi: l(*rhi),
            dz: l(*dz),
        },
        ShapeKind::Hype {
            rmin,
            stereo_in,
            rmax,
            stereo_out,
            dz,
        } => SolidKind::Hype {
            rmin: l(*rmin),
            rmax: l(*rmax),
            inner_stereo: a(*stereo_in),
            outer_stereo: a(*stereo_out),
            dz: l(*dz),
        },
        ShapeKind::Extruded { polygon, sections } => SolidKind::ExtrudedSolid {
            polygon: polygon.iter().map(|p| Point2::new(l(p[0]), l(p[1]))).collect(),
            sections: sections
                .iter()
                .map(|s| ExtrusionSection {
                    z: l(s.z),
                    x0: l(s.x0),
                    y0: l(s.y0),
                    scale: s.scale,
                })
                .collect(),
        },
        ShapeKind::Tessellated { vertices, facets } => {
            let facets = facets
                .iter()
                .map(|f| f.iter().map(|&i| u32::try_from(i)).collect())
                .collect::<std::result::Result<Vec<SmallVec<[u32; 4]>>, _>>();
            let Ok(facets) = facets else {
                return Ok(Err("facet vertex index exceeds 32 bits".to_string()));
            };
            SolidKind::Tessellated {
                vertices: vertices
                    .iter()
                    .map(|v| Point3::new(l(v[0]), l(v[1]), l(v[2])))
                    .collect(),
                facets,
            }
        }
        // Composite, scaled and unsupported shapes are handled by the resolver
        ShapeKind::Composite { .. } | ShapeKind::Scaled { .. } | ShapeKind::Unsupported { .. } => {
            return Err(ConvertError::Internal(format!(
                "{} is not a primitive shape",
                kind.class_name()
            )))
        }
    };
    Ok(Ok(solid))
}

/// Tessellated solid with one facet per mesh triangle
fn tessellated_kind(mesh: &Mesh) -> SolidKind {
    SolidKind::Tessellated {
        vertices: (0..mesh.vertex_count()).map(|i| mesh.position(i)).collect(),
        facets: mesh
            .indices
            .chunks_exact(3)
            .map(|t| SmallVec::from_slice(t))
            .collect(),
    }
}
