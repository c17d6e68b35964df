//! Error types for pliant.
//!
//! One crate-wide enum covers construction, constraint binding, and solver
//! failures. Every failure is reported to the caller; none of them leave a
//! partially mutated mesh behind.

use thiserror::Error;

/// Result type alias using [`DeformError`].
pub type Result<T> = std::result::Result<T, DeformError>;

/// Errors that can occur while building a mesh or deforming it.
#[derive(Error, Debug)]
pub enum DeformError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A triangle references an out-of-range vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A triangle has duplicate vertex indices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An undirected edge is referenced by more than two oriented
    /// half-edges, or by two half-edges with the same orientation.
    #[error("edge ({v0}, {v1}) is non-manifold")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A constraint operation referenced an out-of-range vertex index.
    #[error("constraint references invalid vertex index {vertex}")]
    ConstraintOutOfRange {
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A vertex was placed in both the anchor and the handle set.
    #[error("vertex {vertex} appears in both the anchor and handle sets")]
    ConflictingConstraint {
        /// The doubly constrained vertex index.
        vertex: usize,
    },

    /// `deform` was called with no anchors and no handles bound.
    #[error("deformation is underconstrained: no anchor or handle vertices")]
    Underconstrained,

    /// A connected component of the mesh contains no constrained vertex,
    /// so the assembled linear system has no unique solution.
    #[error("singular system: {free} free vertices are unreachable from any constraint")]
    SingularSystem {
        /// Number of free vertices with no path to a constraint.
        free: usize,
    },

    /// The conjugate gradient solver failed to converge.
    #[error("linear solve failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
    },
}
