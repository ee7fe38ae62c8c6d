// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::error::Result;
use crate::mesh::Mesh;
use crate::triangulation::{calculate_polygon_normal, triangulate_face};

/// Mesh from explicit facets, each counter-clockwise seen from outside.
pub fn tessellated(vertices: &[Point3<f64>], facets: &[SmallVec<[u32; 4]>]) -> Result<Mesh> {
    let mut mesh = Mesh::with_capacity(facets.len() * 6, facets.len() * 6);
    for facet in facets {
        let points: SmallVec<[Point3<f64>; 8]> =
            facet.iter().map(|&i| vertices[i as usize]).collect();
        match points.len() {
            3 => {
                mesh.add_facet(points[0], points[1], points[2]);
            }
            4 => mesh.add_quad(points[0], points[1], points[2], points[3]),
            _ => {
                let normal = calculate_polygon_normal(&points);
                for tri in triangulate_face(&points, &normal)?.chunks_exact(3) {
                    mesh.add_facet(points[tri[0]], points[tri[1]], points[tri[2]]);
                }
            }
        }
    }
    Ok(mesh)
}
