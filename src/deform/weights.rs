//! Per-edge weights for the discrete Laplacian.
//!
//! Two selectable strategies: uniform graph weights and discrete cotangent
//! weights. Cotangent weights come from the rest-pose geometry and are
//! computed once per deformation call, never per iteration.

use nalgebra::Point3;

use crate::mesh::{HalfEdgeId, HalfEdgeMesh};

/// Weights are clamped from below to keep the assembled Laplacian positive
/// definite when triangles are obtuse or nearly degenerate.
const MIN_WEIGHT: f64 = 1e-6;

/// Edge weighting strategy for the Laplacian operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightScheme {
    /// Every edge weighs 1: the unweighted graph Laplacian.
    #[default]
    Uniform,
    /// Half the sum of the cotangents of the two angles opposite the edge;
    /// boundary edges get the single available triangle's contribution.
    Cotangent,
}

impl WeightScheme {
    /// Compute the weight of the undirected edge carried by `he`.
    ///
    /// Symmetric in the half-edge choice: `weight(he) == weight(twin(he))`.
    pub fn edge_weight(self, mesh: &HalfEdgeMesh, he: HalfEdgeId) -> f64 {
        match self {
            WeightScheme::Uniform => 1.0,
            WeightScheme::Cotangent => {
                let mut sum = opposite_cotangent(mesh, he);
                let twin = mesh.twin(he);
                if twin.is_valid() {
                    sum += opposite_cotangent(mesh, twin);
                }
                (0.5 * sum).max(MIN_WEIGHT)
            }
        }
    }

    /// Build the weighted one-ring adjacency of every vertex.
    ///
    /// Entry `i` lists `(j, w_ij)` for each neighbor `j` of vertex `i`;
    /// the listing is symmetric (`w_ij == w_ji`).
    pub(crate) fn vertex_weights(self, mesh: &HalfEdgeMesh) -> Vec<Vec<(usize, f64)>> {
        let mut rings: Vec<Vec<(usize, f64)>> = vec![Vec::new(); mesh.num_vertices()];

        for he in mesh.halfedge_ids() {
            let w = self.edge_weight(mesh, he);
            let a = mesh.start(he).index();
            let b = mesh.end(he).index();
            rings[a].push((b, w));
            // Interior edges appear once per direction via the twin; a
            // boundary half-edge must cover both directions itself.
            if mesh.is_boundary_halfedge(he) {
                rings[b].push((a, w));
            }
        }

        rings
    }
}

/// Cotangent of the angle opposite `he` inside its own face.
fn opposite_cotangent(mesh: &HalfEdgeMesh, he: HalfEdgeId) -> f64 {
    let a = mesh.position(mesh.start(he));
    let b = mesh.position(mesh.start(mesh.next(he)));
    let apex = mesh.position(mesh.start(mesh.prev(he)));
    cotangent(apex, a, b)
}

/// Cotangent of the angle at `apex` in triangle (`apex`, `b`, `c`).
fn cotangent(apex: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let u = b - apex;
    let v = c - apex;
    let cross = u.cross(&v).norm();
    if cross < 1e-12 {
        return 0.0;
    }
    u.dot(&v) / cross
}

/// Weighted differential (Laplacian) coordinate of vertex `i`:
/// `δ_i = Σ_j w_ij (v_i − v_j)` over the one-ring of `i`.
pub(crate) fn laplacian_coordinate(
    positions: &[Point3<f64>],
    ring: &[(usize, f64)],
    i: usize,
) -> nalgebra::Vector3<f64> {
    let mut delta = nalgebra::Vector3::zeros();
    for &(j, w) in ring {
        delta += w * (positions[i] - positions[j]);
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, tetrahedron};

    fn equilateral_pair() -> HalfEdgeMesh {
        // Two equilateral triangles sharing the edge (0, 1).
        let h = 3.0_f64.sqrt() / 2.0;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, h, 0.0),
            Point3::new(0.5, -h, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [1, 0, 3]]).unwrap()
    }

    #[test]
    fn uniform_weight_is_one() {
        let mesh = tetrahedron();
        for he in mesh.halfedge_ids() {
            assert_eq!(WeightScheme::Uniform.edge_weight(&mesh, he), 1.0);
        }
    }

    #[test]
    fn cotangent_interior_edge() {
        let mesh = equilateral_pair();

        // Both opposite angles are 60 degrees: w = 0.5 * 2 * cot(60) = 1/sqrt(3).
        let expected = 1.0 / 3.0_f64.sqrt();
        let interior: Vec<_> = mesh
            .halfedge_ids()
            .filter(|&he| !mesh.is_boundary_halfedge(he))
            .collect();
        assert_eq!(interior.len(), 2);
        for he in interior {
            let w = WeightScheme::Cotangent.edge_weight(&mesh, he);
            assert!((w - expected).abs() < 1e-12, "weight {}", w);
        }
    }

    #[test]
    fn cotangent_boundary_edge_single_contribution() {
        let mesh = equilateral_pair();

        // Boundary edges see one 60-degree angle: w = 0.5 * cot(60).
        let expected = 0.5 / 3.0_f64.sqrt();
        for he in mesh.boundary_halfedge_ids() {
            let w = WeightScheme::Cotangent.edge_weight(&mesh, he);
            assert!((w - expected).abs() < 1e-12, "weight {}", w);
        }
    }

    #[test]
    fn cotangent_symmetric_across_twins() {
        let mesh = tetrahedron();
        for he in mesh.halfedge_ids() {
            let twin = mesh.twin(he);
            let w0 = WeightScheme::Cotangent.edge_weight(&mesh, he);
            let w1 = WeightScheme::Cotangent.edge_weight(&mesh, twin);
            assert!((w0 - w1).abs() < 1e-12);
        }
    }

    #[test]
    fn obtuse_weight_clamped_not_negative() {
        // An obtuse sliver: the opposite angle exceeds 90 degrees, so the raw
        // cotangent is negative and the clamp must kick in.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(2.0, 0.1, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        for he in mesh.halfedge_ids() {
            let w = WeightScheme::Cotangent.edge_weight(&mesh, he);
            assert!(w > 0.0);
        }
    }

    #[test]
    fn vertex_weights_cover_full_rings() {
        let mesh = tetrahedron();
        let rings = WeightScheme::Uniform.vertex_weights(&mesh);

        for (i, ring) in rings.iter().enumerate() {
            assert_eq!(ring.len(), 3, "vertex {} ring {:?}", i, ring);
            let mut neighbors: Vec<usize> = ring.iter().map(|&(j, _)| j).collect();
            neighbors.sort_unstable();
            neighbors.dedup();
            assert_eq!(neighbors.len(), 3);
        }
    }

    #[test]
    fn vertex_weights_symmetric_with_boundary() {
        let mesh = equilateral_pair();
        let rings = WeightScheme::Cotangent.vertex_weights(&mesh);

        for (i, ring) in rings.iter().enumerate() {
            for &(j, w) in ring {
                let back = rings[j]
                    .iter()
                    .find(|&&(k, _)| k == i)
                    .unwrap_or_else(|| panic!("missing back edge {} -> {}", j, i));
                assert!((back.1 - w).abs() < 1e-12);
            }
        }

        // Degrees: shared-edge vertices see 3 neighbors, wing vertices 2.
        assert_eq!(rings[0].len(), 3);
        assert_eq!(rings[1].len(), 3);
        assert_eq!(rings[2].len(), 2);
        assert_eq!(rings[3].len(), 2);
    }

    #[test]
    fn laplacian_coordinate_of_centroid_vertex() {
        // A vertex at the centroid of equally weighted neighbors has a zero
        // differential coordinate.
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let ring = vec![(1, 1.0), (2, 1.0), (3, 1.0), (4, 1.0)];
        let delta = laplacian_coordinate(&positions, &ring, 0);
        assert!(delta.norm() < 1e-12);
    }
}
