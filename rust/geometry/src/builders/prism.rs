// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Prism-like solids: stacks of planar sections joined side by side.

use geoconv_core::ExtrusionSection;
use nalgebra::{Point2, Point3, Rotation2, Vector2, Vector3};

use super::MeshSettings;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::solid::Trap;
use crate::triangulation::triangulate_face;

/// Join sections of equal size with side walls and close both ends.
///
/// Each section is counter-clockwise seen from +z; sections are ordered by
/// ascending z.
pub fn loft(sections: &[Vec<Point3<f64>>]) -> Result<Mesh> {
    let (first, last) = match (sections.first(), sections.last()) {
        (Some(first), Some(last)) if sections.len() >= 2 => (first, last),
        _ => return Err(Error::degenerate("loft needs two sections")),
    };
    let n = first.len();
    if n < 3 || sections.iter().any(|s| s.len() != n) {
        return Err(Error::degenerate("loft sections differ in size"));
    }

    let mut mesh = Mesh::with_capacity(n * sections.len() * 6, n * sections.len() * 6);
    for pair in sections.windows(2) {
        let (s0, s1) = (&pair[0], &pair[1]);
        for j in 0..n {
            let k = (j + 1) % n;
            mesh.add_quad(s0[j], s0[k], s1[k], s1[j]);
        }
    }

    add_cap(&mut mesh, first, -Vector3::z())?;
    add_cap(&mut mesh, last, Vector3::z())?;
    Ok(mesh)
}

fn add_cap(mesh: &mut Mesh, points: &[Point3<f64>], normal: Vector3<f64>) -> Result<()> {
    for tri in triangulate_face(points, &normal)?.chunks_exact(3) {
        mesh.add_facet(points[tri[0]], points[tri[1]], points[tri[2]]);
    }
    Ok(())
}

/// Corners of one trap face, counter-clockwise from the `-x -y` corner
fn trap_face(
    z: f64,
    axis: Vector2<f64>,
    dy: f64,
    dx_low: f64,
    dx_high: f64,
    alpha: f64,
) -> Vec<Point3<f64>> {
    let c = axis * z;
    let shear = dy * alpha.tan();
    vec![
        Point3::new(c.x - shear - dx_low, c.y - dy, z),
        Point3::new(c.x - shear + dx_low, c.y - dy, z),
        Point3::new(c.x + shear + dx_high, c.y + dy, z),
        Point3::new(c.x + shear - dx_high, c.y + dy, z),
    ]
}

/// Slope of the line joining the face centres, per unit z
fn trap_axis(trap: &Trap) -> Vector2<f64> {
    let t = trap.theta.tan();
    Vector2::new(t * trap.phi.cos(), t * trap.phi.sin())
}

fn trap_faces(trap: &Trap) -> [Vec<Point3<f64>>; 2] {
    let axis = trap_axis(trap);
    [
        trap_face(-trap.dz, axis, trap.dy1, trap.dx1, trap.dx2, trap.alpha1),
        trap_face(trap.dz, axis, trap.dy2, trap.dx3, trap.dx4, trap.alpha2),
    ]
}

pub fn trap_mesh(trap: &Trap) -> Result<Mesh> {
    let [low, high] = trap_faces(trap);
    loft(&[low, high])
}

pub fn box_trap(dx: f64, dy: f64, dz: f64) -> Trap {
    trd_trap(dx, dx, dy, dy, dz)
}

pub fn trd_trap(dx1: f64, dx2: f64, dy1: f64, dy2: f64, dz: f64) -> Trap {
    Trap {
        dz,
        theta: 0.0,
        phi: 0.0,
        dy1,
        dx1,
        dx2: dx1,
        alpha1: 0.0,
        dy2,
        dx3: dx2,
        dx4: dx2,
        alpha2: 0.0,
    }
}

pub fn para_trap(dx: f64, dy: f64, dz: f64, alpha: f64, theta: f64, phi: f64) -> Trap {
    Trap {
        dz,
        theta,
        phi,
        dy1: dy,
        dx1: dx,
        dx2: dx,
        alpha1: alpha,
        dy2: dy,
        dx3: dx,
        dx4: dx,
        alpha2: alpha,
    }
}

/// Trap whose faces turn by `twist` from bottom to top about the centre line
pub fn twisted_trap(trap: &Trap, twist: f64, settings: &MeshSettings) -> Result<Mesh> {
    let [low, high] = trap_faces(trap);
    let axis = trap_axis(trap);
    let slices = settings.segments.max(2);

    let sections: Vec<Vec<Point3<f64>>> = (0..=slices)
        .map(|i| {
            let t = i as f64 / slices as f64;
            let z = -trap.dz + 2.0 * trap.dz * t;
            let centre = axis * z;
            let turn = Rotation2::new(twist * (t - 0.5));
            low.iter()
                .zip(&high)
                .map(|(a, b)| {
                    let p = a.coords.lerp(&b.coords, t);
                    let offset = turn * (Vector2::new(p.x, p.y) - centre);
                    Point3::new(centre.x + offset.x, centre.y + offset.y, z)
                })
                .collect()
        })
        .collect();
    loft(&sections)
}

pub fn elliptical_tube(dx: f64, dy: f64, dz: f64, settings: &MeshSettings) -> Result<Mesh> {
    let n = settings.segments;
    let ring = |z: f64| -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                Point3::new(dx * t.cos(), dy * t.sin(), z)
            })
            .collect()
    };
    loft(&[ring(-dz), ring(dz)])
}

fn signed_area(polygon: &[Point2<f64>]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

/// Extrusion of `polygon` through scaled and offset copies at each section.
pub fn extruded(polygon: &[Point2<f64>], sections: &[ExtrusionSection]) -> Result<Mesh> {
    let mut outline = polygon.to_vec();
    if signed_area(&outline) < 0.0 {
        outline.reverse();
    }
    let mut sections = sections.to_vec();
    sections.sort_by(|a, b| a.z.total_cmp(&b.z));

    let rings: Vec<Vec<Point3<f64>>> = sections
        .iter()
        .map(|s| {
            outline
                .iter()
                .map(|p| Point3::new(p.x * s.scale + s.x0, p.y * s.scale + s.y0, s.z))
                .collect()
        })
        .collect();
    loft(&rings)
}
