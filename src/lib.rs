//! # Pliant
//!
//! Handle-based Laplacian mesh deformation on a half-edge core.
//!
//! Pliant lets an interactive application reshape a triangle mesh by pinning
//! **anchor** vertices and dragging **handle** vertices; the rest of the
//! surface follows while local detail is preserved. The crate owns the
//! half-edge connectivity with its one-ring traversal and the constrained
//! Laplacian solver, and exposes a narrow read/write surface for the
//! rendering and picking layers that live outside it.
//!
//! ## Quick start
//!
//! ```
//! use pliant::prelude::*;
//! use nalgebra::Vector3;
//!
//! // The built-in tetrahedron session geometry.
//! let mut mesh = tetrahedron();
//!
//! // Pin vertex 0, drag vertex 1.
//! let mut constraints = ConstraintSet::new();
//! constraints.set_constraints(&mut mesh, &[0], &[1]).unwrap();
//! constraints.translate_handles(Vector3::new(0.0, 0.0, 2.0));
//!
//! // Five local/global iterations with uniform weights.
//! let options = DeformOptions::default().with_scheme(WeightScheme::Uniform);
//! deform(&mut mesh, &constraints, &options).unwrap();
//! ```
//!
//! ## Building meshes
//!
//! Meshes are built once from a vertex/triangle list and their connectivity
//! is immutable afterwards; only positions and per-vertex markers change:
//!
//! ```
//! use pliant::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_vertices(), 3);
//! assert_eq!(mesh.num_faces(), 1);
//! ```
//!
//! ## Traversal
//!
//! The half-edge structure gives O(1) adjacency queries and cyclic one-ring
//! iteration, including a single-pass sweep over boundary vertices:
//!
//! ```
//! use pliant::prelude::*;
//!
//! let mesh = tetrahedron();
//! let ring: Vec<_> = mesh.one_ring(VertexId::new(0)).collect();
//! assert_eq!(ring.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deform;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use pliant::prelude::*;
/// ```
pub mod prelude {
    pub use crate::deform::{deform, ConstraintSet, DeformOptions, WeightScheme};
    pub use crate::error::{DeformError, Result};
    pub use crate::mesh::{
        build_from_triangles, tetrahedron, Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh,
        Vertex, VertexId, VertexRole,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
