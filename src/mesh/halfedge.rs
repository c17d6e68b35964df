//! Half-edge mesh data structure.
//!
//! Each undirected edge of the mesh is split into two oppositely oriented
//! **half-edges**. A half-edge knows its origin vertex, its twin, the next
//! and previous half-edges around its face, and the face itself. Vertices
//! store one outgoing half-edge; faces store one half-edge of their loop.
//!
//! # Boundary handling
//!
//! There are no synthetic boundary half-edges: a boundary edge is simply a
//! face half-edge whose twin is the invalid sentinel. `boundary_halfedge_ids`
//! returns exactly those. For boundary vertices, the stored outgoing
//! half-edge is always the twin-less one so that a single forward one-ring
//! sweep reaches every neighbor.
//!
//! Connectivity is built once by [`build_from_triangles`] and immutable
//! afterwards; positions, roles, and flags are mutated in place.
//!
//! [`build_from_triangles`]: crate::mesh::build_from_triangles

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};

/// Classification of a vertex during interactive deformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexRole {
    /// Not constrained; the solver is free to move this vertex.
    #[default]
    Unspecified,
    /// Pinned to a fixed target position.
    Anchor,
    /// Dragged interactively; its target drives the deformation.
    Handle,
}

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Unit normal. Recomputed by the rendering collaborator; may be stale
    /// after the solver moves positions.
    pub normal: Vector3<f64>,

    /// Per-vertex color, consumed only by the color render mode.
    pub color: Vector3<f64>,

    /// Transient UI selection flag. Never consulted by the solver.
    pub flag: bool,

    /// Anchor/handle classification.
    pub role: VertexRole,

    /// One outgoing half-edge from this vertex. For boundary vertices this
    /// is the twin-less outgoing half-edge.
    pub halfedge: HalfEdgeId,
}

impl Vertex {
    /// Create a new unconstrained vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            color: Vector3::new(1.0, 1.0, 1.0),
            flag: false,
            role: VertexRole::Unspecified,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexId,

    /// The oppositely oriented half-edge on the same undirected edge.
    /// Invalid for boundary half-edges.
    pub twin: HalfEdgeId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The incident face.
    pub face: FaceId,
}

impl HalfEdge {
    pub(crate) fn unlinked() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge lies on the mesh boundary (has no twin).
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.twin.is_valid()
    }
}

/// A face in the half-edge mesh.
///
/// The rest of the face loop is recovered by following `next`.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

/// A triangle mesh stored as flat vertex/half-edge/face collections.
///
/// All cross-references are indices into the owned vectors; there are no
/// pointers and no ownership cycles.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    pub(crate) fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_faces * 3),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by id.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by id.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by id.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by id.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// Get the stored normal of a vertex.
    #[inline]
    pub fn normal(&self, v: VertexId) -> &Vector3<f64> {
        &self.vertex(v).normal
    }

    /// Set the stored normal of a vertex.
    #[inline]
    pub fn set_normal(&mut self, v: VertexId, normal: Vector3<f64>) {
        self.vertex_mut(v).normal = normal;
    }

    /// Get the color of a vertex.
    #[inline]
    pub fn color(&self, v: VertexId) -> &Vector3<f64> {
        &self.vertex(v).color
    }

    /// Set the color of a vertex.
    #[inline]
    pub fn set_color(&mut self, v: VertexId, color: Vector3<f64>) {
        self.vertex_mut(v).color = color;
    }

    /// Get the transient selection flag of a vertex.
    #[inline]
    pub fn flag(&self, v: VertexId) -> bool {
        self.vertex(v).flag
    }

    /// Set the transient selection flag of a vertex.
    #[inline]
    pub fn set_flag(&mut self, v: VertexId, flag: bool) {
        self.vertex_mut(v).flag = flag;
    }

    /// Get the anchor/handle role of a vertex.
    #[inline]
    pub fn role(&self, v: VertexId) -> VertexRole {
        self.vertex(v).role
    }

    /// Set the anchor/handle role of a vertex.
    #[inline]
    pub fn set_role(&mut self, v: VertexId, role: VertexRole) {
        self.vertex_mut(v).role = role;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge. Invalid for boundary half-edges.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the start (origin) vertex of a half-edge.
    #[inline]
    pub fn start(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the end vertex of a half-edge.
    ///
    /// For interior half-edges this is the origin of the twin; for boundary
    /// half-edges it is the origin of the next half-edge in the face loop.
    #[inline]
    pub fn end(&self, he: HalfEdgeId) -> VertexId {
        let twin = self.twin(he);
        if twin.is_valid() {
            self.start(twin)
        } else {
            self.start(self.next(he))
        }
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if a half-edge lies on the mesh boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex lies on the mesh boundary.
    ///
    /// Relies on the builder invariant that boundary vertices store their
    /// twin-less outgoing half-edge.
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let he = self.vertex(v).halfedge;
        !he.is_valid() || self.is_boundary_halfedge(he)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their ids.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge ids.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their ids.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over boundary half-edge ids: exactly the twin-less ones.
    ///
    /// Empty for closed meshes. The rendering collaborator draws these
    /// distinctly.
    pub fn boundary_halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedges()
            .filter(|(_, he)| he.is_boundary())
            .map(|(id, _)| id)
    }

    /// Iterate over all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their ids.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over the vertices adjacent to `v` in cyclic order.
    ///
    /// Each call constructs a fresh traversal with no shared cursor. The
    /// sequence is finite and its length equals the topological degree of
    /// `v`, for interior and boundary vertices alike: a boundary sweep stops
    /// at the trailing boundary edge instead of wrapping, emitting the final
    /// neighbor across it.
    pub fn one_ring(&self, v: VertexId) -> OneRingVertices<'_> {
        OneRingVertices::new(self, v)
    }

    /// Get the three vertices of a face.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.start(he0), self.start(he1), self.start(he2)]
    }

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(&(p2 - p0)).normalize()
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the area-weighted unit normal at a vertex.
    ///
    /// This is a convenience for the rendering collaborator; the mesh never
    /// updates stored normals on its own.
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        let p = self.position(v);
        let ring: Vec<VertexId> = self.one_ring(v).collect();
        for pair in ring.windows(2) {
            let e0 = self.position(pair[0]) - p;
            let e1 = self.position(pair[1]) - p;
            normal += e0.cross(&e1);
        }
        if !self.is_boundary_vertex(v) && ring.len() > 2 {
            let e0 = self.position(ring[ring.len() - 1]) - p;
            let e1 = self.position(ring[0]) - p;
            normal += e0.cross(&e1);
        }
        let len = normal.norm();
        if len > 1e-12 {
            normal / len
        } else {
            normal
        }
    }

    /// Compute the valence (topological degree) of a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.one_ring(v).count()
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for (vid, v) in self.vertices() {
            if v.halfedge.is_valid() && self.start(v.halfedge) != vid {
                return false;
            }
        }

        for (heid, he) in self.halfedges() {
            if he.twin.is_valid() && self.twin(he.twin) != heid {
                return false;
            }
            if !he.next.is_valid() || !he.prev.is_valid() || !he.face.is_valid() {
                return false;
            }
            if self.prev(he.next) != heid || self.next(he.prev) != heid {
                return false;
            }
        }

        for (_, f) in self.faces() {
            if !f.halfedge.is_valid() {
                return false;
            }
        }

        true
    }
}

/// Cyclic iterator over the one-ring neighbors of a vertex.
///
/// Advances by `twin(prev(e))` over the outgoing half-edges of the vertex.
/// At an interior vertex the walk wraps around to the starting half-edge;
/// at a boundary vertex it stops when the trailing edge has no twin, after
/// emitting the neighbor on the far side of that edge.
pub struct OneRingVertices<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    trailing: Option<VertexId>,
    done: bool,
}

impl<'a> OneRingVertices<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            trailing: None,
            done: !start.is_valid(),
        }
    }
}

impl Iterator for OneRingVertices<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return self.trailing.take();
        }

        let neighbor = self.mesh.end(self.current);

        // Rotate to the next outgoing half-edge across the previous edge.
        let prev = self.mesh.prev(self.current);
        let across = self.mesh.twin(prev);
        if across.is_valid() {
            self.current = across;
            if self.current == self.start {
                self.done = true;
            }
        } else {
            // Trailing boundary edge: its origin is the last neighbor.
            self.trailing = Some(self.mesh.start(prev));
            self.done = true;
        }

        Some(neighbor)
    }
}
