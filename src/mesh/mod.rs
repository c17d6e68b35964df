//! Core mesh data structures.
//!
//! The primary type is [`HalfEdgeMesh`], a triangle mesh stored as flat
//! vertex/half-edge/face vectors with index-based cross references. It is
//! built once from a face-vertex list via [`build_from_triangles`] (or the
//! built-in [`tetrahedron`] fixture) and provides O(1) adjacency queries
//! plus cyclic one-ring traversal for the deformation solver.
//!
//! ```
//! use pliant::mesh::{build_from_triangles, VertexId};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.valence(VertexId::new(0)), 2);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_triangles, tetrahedron};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, OneRingVertices, Vertex, VertexRole};
pub use index::{FaceId, HalfEdgeId, VertexId};
