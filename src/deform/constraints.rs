//! Anchor and handle constraint bookkeeping.
//!
//! The interaction layer marks vertices as anchors (pinned) or handles
//! (dragged) and records their target positions here. The solver reads the
//! combined set; the mesh only carries the per-vertex role markers used for
//! highlighting and for the growth operation.

use std::collections::HashSet;

use nalgebra::{Point3, Vector3};

use crate::error::{DeformError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId, VertexRole};

/// The set of anchor and handle vertices with their target positions.
///
/// Anchor and handle index sets are disjoint at all times. Targets default
/// to each vertex's position at pin time; handle targets are then moved by
/// the interaction layer as the user drags.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    anchors: Vec<(VertexId, Point3<f64>)>,
    handles: Vec<(VertexId, Point3<f64>)>,
}

impl ConstraintSet {
    /// Create an empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both constraint sets.
    ///
    /// Marks every referenced vertex's role on the mesh and captures its
    /// current position as the target. Fails without touching the mesh if
    /// any index is out of range or appears in both sets.
    pub fn set_constraints(
        &mut self,
        mesh: &mut HalfEdgeMesh,
        anchors: &[usize],
        handles: &[usize],
    ) -> Result<()> {
        let n = mesh.num_vertices();
        for &i in anchors.iter().chain(handles) {
            if i >= n {
                return Err(DeformError::ConstraintOutOfRange { vertex: i });
            }
        }
        let anchor_set: HashSet<usize> = anchors.iter().copied().collect();
        if let Some(&i) = handles.iter().find(|i| anchor_set.contains(i)) {
            return Err(DeformError::ConflictingConstraint { vertex: i });
        }

        self.clear(mesh);

        for &i in anchors {
            let v = VertexId::new(i);
            mesh.set_role(v, VertexRole::Anchor);
            self.anchors.push((v, *mesh.position(v)));
        }
        for &i in handles {
            let v = VertexId::new(i);
            mesh.set_role(v, VertexRole::Handle);
            self.handles.push((v, *mesh.position(v)));
        }

        Ok(())
    }

    /// Anchor vertices with their targets.
    pub fn anchors(&self) -> &[(VertexId, Point3<f64>)] {
        &self.anchors
    }

    /// Handle vertices with their targets.
    pub fn handles(&self) -> &[(VertexId, Point3<f64>)] {
        &self.handles
    }

    /// Total number of constrained vertices.
    pub fn len(&self) -> usize {
        self.anchors.len() + self.handles.len()
    }

    /// True when no vertex is constrained.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty() && self.handles.is_empty()
    }

    /// Set the target position of a constrained vertex.
    ///
    /// Fails if `v` is neither an anchor nor a handle.
    pub fn set_target(&mut self, v: VertexId, target: Point3<f64>) -> Result<()> {
        for (id, pos) in self.anchors.iter_mut().chain(&mut self.handles) {
            if *id == v {
                *pos = target;
                return Ok(());
            }
        }
        Err(DeformError::ConstraintOutOfRange { vertex: v.index() })
    }

    /// Shift every handle target by `shift`, as a drag gesture does.
    pub fn translate_handles(&mut self, shift: Vector3<f64>) {
        for (_, target) in &mut self.handles {
            *target += shift;
        }
    }

    /// One-ring expansion of a frontier.
    ///
    /// Returns the deduplicated neighbors of `frontier` whose role is still
    /// [`VertexRole::Unspecified`], for the caller to promote and use as the
    /// next frontier. Lets the interaction layer grow a constrained region
    /// outward layer by layer.
    pub fn grow(&self, mesh: &HalfEdgeMesh, frontier: &[VertexId]) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for &v in frontier {
            for neighbor in mesh.one_ring(v) {
                if mesh.role(neighbor) == VertexRole::Unspecified && seen.insert(neighbor) {
                    next.push(neighbor);
                }
            }
        }
        next
    }

    /// Clear both sets and revert every vertex role to unspecified.
    pub fn clear(&mut self, mesh: &mut HalfEdgeMesh) {
        for (v, _) in self.anchors.drain(..).chain(self.handles.drain(..)) {
            mesh.set_role(v, VertexRole::Unspecified);
        }
    }
}
