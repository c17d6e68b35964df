//! Mesh construction.
//!
//! Builds the half-edge structure from an external vertex/triangle list.
//! Twins are paired through a hash of unordered endpoint pairs; an
//! undirected edge referenced by more than two oriented half-edges (or by
//! two half-edges with the same orientation) makes the mesh non-manifold
//! and aborts construction with no partial mesh.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{DeformError, Result};

/// Build a half-edge mesh from vertex positions and triangle faces.
///
/// # Arguments
/// * `vertices` - vertex positions
/// * `faces` - triangles as `[v0, v1, v2]` index triples, counter-clockwise
///
/// # Errors
///
/// Returns an error if the face list is empty, a triangle references an
/// out-of-range vertex, a triangle repeats a vertex, or the surface is not
/// an oriented manifold.
///
/// # Example
/// ```
/// use pliant::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_halfedges(), 3);
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(DeformError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(DeformError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(DeformError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    for &pos in vertices {
        mesh.vertices.push(Vertex::new(pos));
    }

    // Oriented half-edges per undirected edge; more than two is non-manifold.
    let mut edge_slots: HashMap<(usize, usize), Vec<HalfEdgeId>> = HashMap::new();

    for face in faces {
        let face_id = FaceId::new(mesh.num_faces());
        let base = mesh.num_halfedges();
        let ids = [
            HalfEdgeId::new(base),
            HalfEdgeId::new(base + 1),
            HalfEdgeId::new(base + 2),
        ];

        for corner in 0..3 {
            let origin = VertexId::new(face[corner]);
            let mut he = HalfEdge::unlinked();
            he.origin = origin;
            he.next = ids[(corner + 1) % 3];
            he.prev = ids[(corner + 2) % 3];
            he.face = face_id;
            mesh.halfedges.push(he);

            mesh.vertex_mut(origin).halfedge = ids[corner];

            let a = face[corner];
            let b = face[(corner + 1) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            edge_slots.entry(key).or_default().push(ids[corner]);
        }

        mesh.faces.push(Face { halfedge: ids[0] });
    }

    // Pair twins; reject edges with more than two half-edges or two
    // half-edges wound the same way.
    for (&(v0, v1), slots) in &edge_slots {
        match slots.as_slice() {
            [_] => {}
            [a, b] => {
                if mesh.start(*a) == mesh.start(*b) {
                    return Err(DeformError::NonManifoldEdge { v0, v1 });
                }
                mesh.halfedge_mut(*a).twin = *b;
                mesh.halfedge_mut(*b).twin = *a;
            }
            _ => return Err(DeformError::NonManifoldEdge { v0, v1 }),
        }
    }

    // Boundary vertices must store their twin-less outgoing half-edge so a
    // one-ring sweep covers the full neighborhood.
    for he in mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect::<Vec<_>>()
    {
        let origin = mesh.start(he);
        mesh.vertex_mut(origin).halfedge = he;
    }

    Ok(mesh)
}

/// Build the built-in session geometry: a closed tetrahedron.
///
/// Four vertices at (0,0,0), (10,0,0), (0,10,0), (0,0,10), four faces, and
/// twelve half-edges paired into six twin pairs. Having no boundary edges,
/// it exercises every interior code path without fixture files.
pub fn tetrahedron() -> HalfEdgeMesh {
    let vertices = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(0.0, 10.0, 0.0),
        Point3::new(0.0, 0.0, 10.0),
    ];
    let faces = [[1, 2, 3], [0, 2, 1], [0, 3, 2], [0, 1, 3]];

    let mut mesh =
        build_from_triangles(&vertices, &faces).expect("tetrahedron fixture is manifold");

    let normals = [
        Vector3::new(-0.577, -0.577, -0.577),
        Vector3::new(0.0, -0.7, -0.7),
        Vector3::new(-0.7, 0.0, -0.7),
        Vector3::new(-0.7, -0.7, 0.0),
    ];
    for (i, n) in normals.into_iter().enumerate() {
        mesh.set_normal(VertexId::new(i), n);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_halfedges(), 3);
        assert_eq!(mesh.boundary_halfedge_ids().count(), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn shared_edge_gets_twins() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_halfedges(), 6);
        // Exactly one twin pair: the shared edge (0, 1).
        let interior: Vec<_> = mesh
            .halfedge_ids()
            .filter(|&he| !mesh.is_boundary_halfedge(he))
            .collect();
        assert_eq!(interior.len(), 2);
        for he in interior {
            assert_eq!(mesh.twin(mesh.twin(he)), he);
            let (a, b) = (mesh.start(he).index(), mesh.end(he).index());
            assert_eq!((a.min(b), a.max(b)), (0, 1));
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn empty_face_list() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let err = build_from_triangles(&vertices, &[]).unwrap_err();
        assert!(matches!(err, DeformError::EmptyMesh));
    }

    #[test]
    fn out_of_range_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let err = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap_err();
        assert!(matches!(
            err,
            DeformError::InvalidVertexIndex { face: 0, vertex: 1 }
        ));
    }

    #[test]
    fn degenerate_face() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let err = build_from_triangles(&vertices, &[[0, 0, 2]]).unwrap_err();
        assert!(matches!(err, DeformError::DegenerateFace { face: 0 }));
    }

    #[test]
    fn three_faces_on_one_edge_is_non_manifold() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let err = build_from_triangles(&vertices, &faces).unwrap_err();
        assert!(matches!(err, DeformError::NonManifoldEdge { v0: 0, v1: 1 }));
    }

    #[test]
    fn inconsistent_winding_is_non_manifold() {
        // Second triangle repeats the directed edge (0, 1).
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 1, 3]];
        let err = build_from_triangles(&vertices, &faces).unwrap_err();
        assert!(matches!(err, DeformError::NonManifoldEdge { v0: 0, v1: 1 }));
    }

    #[test]
    fn boundary_vertices_store_boundary_halfedge() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        for (vid, v) in mesh.vertices() {
            assert_eq!(mesh.start(v.halfedge), vid);
            if mesh.is_boundary_vertex(vid) {
                assert!(mesh.is_boundary_halfedge(v.halfedge));
            }
        }
    }

    #[test]
    fn tetrahedron_fixture() {
        let mesh = tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert_eq!(mesh.boundary_halfedge_ids().count(), 0);
        assert!(mesh.is_valid());

        assert_eq!(
            mesh.position(VertexId::new(1)),
            &Point3::new(10.0, 0.0, 0.0)
        );
    }

    #[test]
    fn tetrahedron_fixture_stores_normals() {
        let mesh = tetrahedron();

        assert_eq!(
            mesh.normal(VertexId::new(0)),
            &Vector3::new(-0.577, -0.577, -0.577)
        );
        assert_eq!(mesh.normal(VertexId::new(3)), &Vector3::new(-0.7, -0.7, 0.0));
        for v in mesh.vertex_ids() {
            assert!(mesh.normal(v).norm() > 0.0);
        }
    }
}
