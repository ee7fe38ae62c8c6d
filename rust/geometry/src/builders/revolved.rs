// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solids of revolution about the z axis.
//!
//! Every builder here reduces its solid to a closed profile in the `(r, z)`
//! half-plane and sweeps it through `[sphi, sphi + dphi]`. Profiles run
//! counter-clockwise with `r` to the right and `z` up; hole loops run
//! clockwise. Profile edges lying on the axis sweep to nothing and are dropped.

use std::f64::consts::{PI, TAU};

use geoconv_core::ZPlane;
use nalgebra::{Point2, Point3};

use super::MeshSettings;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::triangulate_polygon_with_holes;

const FULL_TURN_EPSILON: f64 = 1e-9;

/// Drop repeated consecutive points (including last == first)
fn dedup_loop(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut out: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |q| (p - q).norm() > 1e-12) {
            out.push(*p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= 1e-12 {
        out.pop();
    }
    out
}

#[inline]
fn at(p: &Point2<f64>, phi: f64) -> Point3<f64> {
    let (s, c) = phi.sin_cos();
    Point3::new(p.x * c, p.x * s, p.y)
}

/// Sweep a profile (with optional holes) about z in `steps` angular intervals.
pub fn revolve(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
    sphi: f64,
    dphi: f64,
    steps: usize,
) -> Result<Mesh> {
    let outer = dedup_loop(outer);
    let holes: Vec<Vec<Point2<f64>>> = holes.iter().map(|h| dedup_loop(h)).collect();
    let full = dphi >= TAU - FULL_TURN_EPSILON;
    let dphi = dphi.min(TAU);
    let steps = steps.max(1);

    // A full turn reuses the first angle so the seam closes exactly
    let angles: Vec<f64> = (0..=steps)
        .map(|i| {
            if full && i == steps {
                sphi
            } else {
                sphi + dphi * i as f64 / steps as f64
            }
        })
        .collect();

    let mut mesh = Mesh::new();
    for ring in std::iter::once(&outer).chain(holes.iter()) {
        let n = ring.len();
        if n < 2 {
            continue;
        }
        for k in 0..n {
            let a = ring[k];
            let b = ring[(k + 1) % n];
            if a.x <= 0.0 && b.x <= 0.0 {
                continue;
            }
            for w in angles.windows(2) {
                mesh.add_quad(at(&a, w[0]), at(&a, w[1]), at(&b, w[1]), at(&b, w[0]));
            }
        }
    }

    if !full {
        add_cap(&mut mesh, &outer, &holes, sphi, true)?;
        add_cap(&mut mesh, &outer, &holes, sphi + dphi, false)?;
    }
    Ok(mesh)
}

/// Flat cap at angle `phi`. The start cap faces `-phi`, the end cap `+phi`.
fn add_cap(
    mesh: &mut Mesh,
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
    phi: f64,
    start: bool,
) -> Result<()> {
    if outer.len() < 3 {
        return Ok(());
    }
    let indices = triangulate_polygon_with_holes(outer, holes)?;
    let all: Vec<Point2<f64>> = outer
        .iter()
        .chain(holes.iter().filter(|h| h.len() >= 3).flatten())
        .copied()
        .collect();

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (all[tri[0]], all[tri[1]], all[tri[2]]);
        let ccw = (b - a).perp(&(c - a)) > 0.0;
        // A counter-clockwise profile triangle faces -phi
        let (b, c) = if ccw == start { (b, c) } else { (c, b) };
        mesh.add_facet(at(&a, phi), at(&b, phi), at(&c, phi));
    }
    Ok(())
}

/// Tube section between `z0` and `z1`
pub fn tube(
    rmin: f64,
    rmax: f64,
    z0: f64,
    z1: f64,
    sphi: f64,
    dphi: f64,
    settings: &MeshSettings,
) -> Result<Mesh> {
    let profile = [
        Point2::new(rmin, z0),
        Point2::new(rmax, z0),
        Point2::new(rmax, z1),
        Point2::new(rmin, z1),
    ];
    revolve(&profile, &[], sphi, dphi, settings.segments_for(dphi))
}

/// Cone section; `radii` is `[rmin1, rmax1, rmin2, rmax2]` at `-dz` / `+dz`
pub fn cone(
    radii: [f64; 4],
    dz: f64,
    sphi: f64,
    dphi: f64,
    settings: &MeshSettings,
) -> Result<Mesh> {
    let [rmin1, rmax1, rmin2, rmax2] = radii;
    let profile = [
        Point2::new(rmin1, -dz),
        Point2::new(rmax1, -dz),
        Point2::new(rmax2, dz),
        Point2::new(rmin2, dz),
    ];
    revolve(&profile, &[], sphi, dphi, settings.segments_for(dphi))
}

/// Spherical shell section; theta is measured from +z
pub fn sphere(
    rmin: f64,
    rmax: f64,
    sphi: f64,
    dphi: f64,
    stheta: f64,
    dtheta: f64,
    settings: &MeshSettings,
) -> Result<Mesh> {
    let theta1 = stheta.max(0.0);
    let theta2 = (stheta + dtheta).min(PI);
    let n = ((theta2 - theta1) / PI * (settings.segments as f64 / 2.0))
        .ceil()
        .max(2.0) as usize;
    let theta_at = |i: usize| theta1 + (theta2 - theta1) * i as f64 / n as f64;
    let on = |r: f64, theta: f64| Point2::new(r * theta.sin(), r * theta.cos());

    // Outer arc from the bottom up, then the inner arc back down
    let mut profile: Vec<Point2<f64>> = (0..=n).rev().map(|i| on(rmax, theta_at(i))).collect();
    if rmin > 0.0 {
        profile.extend((0..=n).map(|i| on(rmin, theta_at(i))));
    } else {
        profile.push(Point2::origin());
    }
    revolve(&profile, &[], sphi, dphi, settings.segments_for(dphi))
}

fn circle(centre: Point2<f64>, radius: f64, n: usize, clockwise: bool) -> Vec<Point2<f64>> {
    (0..n)
        .map(|i| {
            let t = TAU * i as f64 / n as f64;
            let t = if clockwise { -t } else { t };
            Point2::new(centre.x + radius * t.cos(), centre.y + radius * t.sin())
        })
        .collect()
}

/// Torus section swept at radius `rtor`
pub fn torus(
    rmin: f64,
    rmax: f64,
    rtor: f64,
    sphi: f64,
    dphi: f64,
    settings: &MeshSettings,
) -> Result<Mesh> {
    let centre = Point2::new(rtor, 0.0);
    let outer = circle(centre, rmax, settings.segments, false);
    let holes = if rmin > 0.0 {
        vec![circle(centre, rmin, settings.segments, true)]
    } else {
        Vec::new()
    };
    revolve(&outer, &holes, sphi, dphi, settings.segments_for(dphi))
}

/// Outer radii going up, inner radii coming back down
fn plane_profile(planes: &[ZPlane], radius_factor: f64) -> Vec<Point2<f64>> {
    let mut sorted = planes.to_vec();
    if sorted.first().map(|p| p.z) > sorted.last().map(|p| p.z) {
        sorted.reverse();
    }
    let mut profile: Vec<Point2<f64>> = sorted
        .iter()
        .map(|p| Point2::new(p.rmax * radius_factor, p.z))
        .collect();
    profile.extend(
        sorted
            .iter()
            .rev()
            .map(|p| Point2::new(p.rmin * radius_factor, p.z)),
    );
    profile
}

pub fn polycone(planes: &[ZPlane], sphi: f64, dphi: f64, settings: &MeshSettings) -> Result<Mesh> {
    revolve(&plane_profile(planes, 1.0), &[], sphi, dphi, settings.segments_for(dphi))
}

/// Polyhedra radii are distances to the flat sides; the corners sit further out.
pub fn polyhedra(planes: &[ZPlane], sides: u32, sphi: f64, dphi: f64) -> Result<Mesh> {
    let half_side = dphi.min(TAU) / (2.0 * f64::from(sides));
    if sides == 0 || half_side >= PI / 2.0 {
        return Err(Error::degenerate(format!(
            "polyhedra with {} sides over {} rad",
            sides, dphi
        )));
    }
    let sides = sides as usize;
    let corner_factor = 1.0 / half_side.cos();
    revolve(&plane_profile(planes, corner_factor), &[], sphi, dphi, sides)
}

/// Paraboloid `r² = k1 z + k2` through `rlo` at `-dz` and `rhi` at `+dz`
pub fn paraboloid(rlo: f64, rhi: f64, dz: f64, settings: &MeshSettings) -> Result<Mesh> {
    let k1 = (rhi * rhi - rlo * rlo) / (2.0 * dz);
    let k2 = (rhi * rhi + rlo * rlo) / 2.0;
    let n = (settings.segments / 2).max(2);

    let mut profile = vec![Point2::new(0.0, -dz)];
    profile.extend((0..=n).map(|i| {
        let z = -dz + 2.0 * dz * i as f64 / n as f64;
        Point2::new((k1 * z + k2).max(0.0).sqrt(), z)
    }));
    profile.push(Point2::new(0.0, dz));
    revolve(&profile, &[], 0.0, TAU, settings.segments)
}

/// Hyperbolic tube with stereo angles in radians
pub fn hype(
    rmin: f64,
    rmax: f64,
    inner_stereo: f64,
    outer_stereo: f64,
    dz: f64,
    settings: &MeshSettings,
) -> Result<Mesh> {
    let n = (settings.segments / 2).max(2);
    let z_at = |i: usize| -dz + 2.0 * dz * i as f64 / n as f64;
    let radius = |r0: f64, stereo: f64, z: f64| (r0 * r0 + (stereo.tan() * z).powi(2)).sqrt();

    let mut profile: Vec<Point2<f64>> = (0..=n)
        .map(|i| Point2::new(radius(rmax, outer_stereo, z_at(i)), z_at(i)))
        .collect();
    profile.extend(
        (0..=n)
            .rev()
            .map(|i| Point2::new(radius(rmin, inner_stereo, z_at(i)), z_at(i))),
    );
    revolve(&profile, &[], 0.0, TAU, settings.segments)
}
