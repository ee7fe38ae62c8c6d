// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation
//!
//! End caps of revolved and lofted solids, large tessellated facets and the
//! polygons handed back by the boolean evaluator all go through earcutr here.
//! Planar 3D faces are flattened onto their own plane first.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Triangulate a simple polygon. Indices refer to `points`.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    triangulate_polygon_with_holes(points, &[])
}

/// Triangulate `outer` minus `holes`.
///
/// Indices refer to `outer` followed by every hole of three or more points,
/// in order. Shorter holes are ignored.
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(format!(
            "outline with {} points",
            outer.len()
        )));
    }

    let holes: Vec<&Vec<Point2<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();
    if holes.is_empty() && outer.len() == 3 {
        return Ok(vec![0, 1, 2]);
    }

    let total = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut coords = Vec::with_capacity(total * 2);
    coords.extend(outer.iter().flat_map(|p| [p.x, p.y]));

    let mut hole_starts = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_starts.push(coords.len() / 2);
        coords.extend(hole.iter().flat_map(|p| [p.x, p.y]));
    }

    earcutr::earcut(&coords, &hole_starts, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Orthonormal in-plane axes for a plane with unit `normal`
fn plane_axes(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    // Cross with the coordinate axis least aligned with the normal
    let a = normal.abs();
    let reference = if a.x <= a.y && a.x <= a.z {
        Vector3::x()
    } else if a.y <= a.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = normal.cross(&reference).normalize();
    let v = normal.cross(&u).normalize();
    (u, v)
}

/// Flatten planar points onto the plane through the first point.
pub fn project_to_plane(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points.first() else {
        return Vec::new();
    };
    let (u, v) = plane_axes(normal);
    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect()
}

/// Triangulate a planar 3D face.
///
/// Every returned triangle winds counter-clockwise around `normal`, whatever
/// orientation earcutr picked.
pub fn triangulate_face(points: &[Point3<f64>], normal: &Vector3<f64>) -> Result<Vec<usize>> {
    let mut indices = triangulate_polygon(&project_to_plane(points, normal))?;
    for tri in indices.chunks_exact_mut(3) {
        let n = (points[tri[1]] - points[tri[0]]).cross(&(points[tri[2]] - points[tri[0]]));
        if n.dot(normal) < 0.0 {
            tri.swap(1, 2);
        }
    }
    Ok(indices)
}

/// Unit normal of a polygon by Newell's method; `+z` when the polygon has no area.
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::<f64>::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal.try_normalize(1e-12).unwrap_or_else(Vector3::z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn area(points: &[Point2<f64>], indices: &[usize]) -> f64 {
        indices
            .chunks_exact(3)
            .map(|t| {
                let (a, b, c) = (points[t[0]], points[t[1]], points[t[2]]);
                ((b - a).perp(&(c - a)) / 2.0).abs()
            })
            .sum()
    }

    #[test]
    fn too_few_points_is_an_error() {
        let points = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(matches!(
            triangulate_polygon(&points),
            Err(Error::TriangulationError(_))
        ));
    }

    #[test]
    fn annulus_cap_excludes_the_hole() {
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let hole = vec![
            Point2::new(3.0, 3.0),
            Point2::new(3.0, 7.0),
            Point2::new(7.0, 7.0),
            Point2::new(7.0, 3.0),
        ];
        let indices = triangulate_polygon_with_holes(&outer, &[hole.clone()]).unwrap();
        let all: Vec<_> = outer.iter().chain(hole.iter()).copied().collect();
        assert_relative_eq!(area(&all, &indices), 100.0 - 16.0, epsilon = 1e-9);
    }

    #[test]
    fn short_holes_are_ignored() {
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let stray = vec![Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        let indices = triangulate_polygon_with_holes(&outer, &[stray]).unwrap();
        assert!(indices.iter().all(|&i| i < 4));
        assert_relative_eq!(area(&outer, &indices), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn tilted_quad_normal() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(
            calculate_polygon_normal(&points),
            Vector3::new(0.0, -s, s),
            epsilon = 1e-12
        );
        assert_eq!(calculate_polygon_normal(&points[..2]), Vector3::z());
    }

    #[test]
    fn concave_face_follows_its_normal() {
        // L-shape at z = 2, counter-clockwise seen from -z
        let points = vec![
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(0.0, 2.0, 2.0),
            Point3::new(1.0, 2.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(2.0, 1.0, 2.0),
            Point3::new(2.0, 0.0, 2.0),
        ];
        let down = -Vector3::z();
        let indices = triangulate_face(&points, &down).unwrap();
        assert_eq!(indices.len(), 12);
        for tri in indices.chunks(3) {
            let n = (points[tri[1]] - points[tri[0]]).cross(&(points[tri[2]] - points[tri[0]]));
            assert!(n.z < 0.0);
        }
    }
}
