//! Constrained Laplacian deformation solver.
//!
//! Solves for new vertex positions that keep each free vertex's differential
//! (Laplacian) coordinate close to its rest-pose value while anchors and
//! handles sit exactly on their targets. Detail preservation under large
//! drags comes from an optional local/global loop: each round estimates a
//! best-fit rotation per free vertex from its one-ring edge vectors and
//! rotates the stored differential coordinates before re-solving.
//!
//! The solve is synchronous and atomic: positions are written back to the
//! mesh only after every linear solve succeeded, so a failed call leaves
//! the mesh bit-identical.
//!
//! # References
//!
//! - Sorkine, O. & Alexa, M. (2007). "As-Rigid-As-Possible Surface
//!   Modeling." SGP 2007.
//! - Sorkine, O. et al. (2004). "Laplacian Surface Editing." SGP 2004.

use nalgebra::{DVector, Matrix3, Point3, Vector3};
use rayon::prelude::*;

use crate::error::{DeformError, Result};
use crate::mesh::HalfEdgeMesh;

use super::sparse::{conjugate_gradient, CsrMatrix};
use super::weights::{laplacian_coordinate, WeightScheme};
use super::ConstraintSet;

/// Options for [`deform`].
#[derive(Debug, Clone)]
pub struct DeformOptions {
    /// Number of local/global refinement rounds. Zero means a single linear
    /// solve with unrotated differential coordinates.
    pub iterations: usize,

    /// Edge weighting strategy for the Laplacian operator.
    pub scheme: WeightScheme,

    /// Maximum iterations for the conjugate gradient solver (per global step).
    pub max_cg_iterations: usize,

    /// Convergence tolerance for the CG solver.
    pub cg_tolerance: f64,

    /// Whether to estimate local rotations in parallel.
    pub parallel: bool,
}

impl Default for DeformOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            scheme: WeightScheme::Uniform,
            max_cg_iterations: 1000,
            cg_tolerance: 1e-8,
            parallel: true,
        }
    }
}

impl DeformOptions {
    /// Set the number of local/global rounds.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the weight scheme.
    pub fn with_scheme(mut self, scheme: WeightScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the maximum CG iterations per global step.
    pub fn with_max_cg_iterations(mut self, max_iter: usize) -> Self {
        self.max_cg_iterations = max_iter;
        self
    }

    /// Set the CG convergence tolerance.
    pub fn with_cg_tolerance(mut self, tol: f64) -> Self {
        self.cg_tolerance = tol;
        self
    }

    /// Set whether local rotations are estimated in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Deform the mesh so anchors and handles reach their targets.
///
/// Computes rest-pose differential coordinates with the selected weight
/// scheme, solves the constrained Laplacian system, optionally refines it
/// with `options.iterations` rotation-aware rounds, and commits the solved
/// positions. Stored normals and colors are left for the rendering
/// collaborator to recompute.
///
/// # Errors
///
/// - [`DeformError::Underconstrained`] when `constraints` is empty.
/// - [`DeformError::SingularSystem`] when a connected component contains no
///   constrained vertex.
/// - [`DeformError::ConvergenceFailed`] when a CG solve runs out of budget.
///
/// On any error the mesh is left unmodified.
///
/// # Example
///
/// ```
/// use pliant::prelude::*;
/// use nalgebra::Vector3;
///
/// let mut mesh = tetrahedron();
/// let mut constraints = ConstraintSet::new();
/// constraints.set_constraints(&mut mesh, &[0, 2], &[1]).unwrap();
/// constraints.translate_handles(Vector3::new(1.0, 0.0, 0.0));
///
/// deform(&mut mesh, &constraints, &DeformOptions::default()).unwrap();
/// ```
pub fn deform(
    mesh: &mut HalfEdgeMesh,
    constraints: &ConstraintSet,
    options: &DeformOptions,
) -> Result<()> {
    if constraints.is_empty() {
        return Err(DeformError::Underconstrained);
    }

    let n = mesh.num_vertices();

    // Target position for constrained vertices, None for free ones.
    let mut targets: Vec<Option<Point3<f64>>> = vec![None; n];
    for &(v, target) in constraints.anchors().iter().chain(constraints.handles()) {
        targets[v.index()] = Some(target);
    }

    let free: Vec<usize> = (0..n).filter(|&i| targets[i].is_none()).collect();
    let mut free_index = vec![usize::MAX; n];
    for (row, &i) in free.iter().enumerate() {
        free_index[i] = row;
    }

    log::debug!(
        "deform: {} vertices ({} free, {} constrained), {} rounds, {:?} weights",
        n,
        free.len(),
        constraints.len(),
        options.iterations,
        options.scheme,
    );

    // Rest-pose quantities, computed once per call.
    let rest: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
    let rings = options.scheme.vertex_weights(mesh);

    check_coverage(&rings, &targets, &free)?;

    if free.is_empty() {
        // Fully constrained: nothing to solve, commit the targets.
        commit(mesh, &targets, &free, &[]);
        return Ok(());
    }

    let deltas: Vec<Vector3<f64>> = free
        .iter()
        .map(|&i| laplacian_coordinate(&rest, &rings[i], i))
        .collect();

    let system = assemble_system(&rings, &free_index, &free);

    // Constant part of the right-hand side: constrained one-ring neighbors.
    let rhs_base: Vec<Vector3<f64>> = free
        .iter()
        .map(|&i| {
            let mut sum = Vector3::zeros();
            for &(j, w) in &rings[i] {
                if let Some(target) = targets[j] {
                    sum += w * target.coords;
                }
            }
            sum
        })
        .collect();

    // Full position estimate: constrained vertices at their targets, free
    // vertices warm-started from the rest pose.
    let mut estimate: Vec<Point3<f64>> = (0..n).map(|i| targets[i].unwrap_or(rest[i])).collect();

    let mut solved = solve_global(&system, &deltas, &rhs_base, &free, &mut estimate, options)?;

    for round in 0..options.iterations {
        log::trace!("deform: local/global round {}", round + 1);
        let rotated = rotate_deltas(&rest, &estimate, &rings, &free, &deltas, options.parallel);
        solved = solve_global(&system, &rotated, &rhs_base, &free, &mut estimate, options)?;
    }

    commit(mesh, &targets, &free, &solved);
    Ok(())
}

/// Verify every free vertex can reach a constrained vertex through the
/// one-ring graph; otherwise its component makes the system singular.
fn check_coverage(
    rings: &[Vec<(usize, f64)>],
    targets: &[Option<Point3<f64>>],
    free: &[usize],
) -> Result<()> {
    let n = rings.len();
    let mut reached = vec![false; n];
    let mut queue: Vec<usize> = (0..n).filter(|&i| targets[i].is_some()).collect();
    for &i in &queue {
        reached[i] = true;
    }

    while let Some(i) = queue.pop() {
        for &(j, _) in &rings[i] {
            if !reached[j] {
                reached[j] = true;
                queue.push(j);
            }
        }
    }

    let unreachable = free.iter().filter(|&&i| !reached[i]).count();
    if unreachable > 0 {
        return Err(DeformError::SingularSystem { free: unreachable });
    }
    Ok(())
}

/// Assemble the free-vertex Laplacian with constrained columns eliminated.
///
/// Row `i`: `(Σ_j w_ij) v'_i − Σ_{j free} w_ij v'_j`. With positive weights
/// and at least one constrained neighbor somewhere in each component, the
/// matrix is symmetric positive definite.
fn assemble_system(
    rings: &[Vec<(usize, f64)>],
    free_index: &[usize],
    free: &[usize],
) -> CsrMatrix {
    let mut triplets = Vec::new();
    for (row, &i) in free.iter().enumerate() {
        let mut diagonal = 0.0;
        for &(j, w) in &rings[i] {
            diagonal += w;
            let col = free_index[j];
            if col != usize::MAX {
                triplets.push((row, col, -w));
            }
        }
        triplets.push((row, row, diagonal));
    }
    CsrMatrix::from_triplets(free.len(), &triplets)
}

/// One global step: solve the three coordinate systems and update the
/// estimate for the free vertices.
fn solve_global(
    system: &CsrMatrix,
    deltas: &[Vector3<f64>],
    rhs_base: &[Vector3<f64>],
    free: &[usize],
    estimate: &mut [Point3<f64>],
    options: &DeformOptions,
) -> Result<Vec<Point3<f64>>> {
    let m = free.len();
    let mut solved = vec![Point3::origin(); m];

    for axis in 0..3 {
        let rhs = DVector::from_iterator(m, (0..m).map(|r| deltas[r][axis] + rhs_base[r][axis]));
        let warm = DVector::from_iterator(m, free.iter().map(|&i| estimate[i][axis]));

        let x = conjugate_gradient(
            system,
            &rhs,
            Some(&warm),
            options.max_cg_iterations,
            options.cg_tolerance,
        )?;

        for (r, value) in x.iter().enumerate() {
            solved[r][axis] = *value;
        }
    }

    for (r, &i) in free.iter().enumerate() {
        estimate[i] = solved[r];
    }
    Ok(solved)
}

/// Local step: rotate each free vertex's differential coordinate by the
/// best-fit rotation between its rest-pose and current one-ring edges.
fn rotate_deltas(
    rest: &[Point3<f64>],
    current: &[Point3<f64>],
    rings: &[Vec<(usize, f64)>],
    free: &[usize],
    deltas: &[Vector3<f64>],
    parallel: bool,
) -> Vec<Vector3<f64>> {
    let rotate = |(&i, delta): (&usize, &Vector3<f64>)| {
        let rotation = fit_rotation(rest, current, &rings[i], i);
        rotation * delta
    };

    if parallel {
        free.par_iter().zip(deltas.par_iter()).map(rotate).collect()
    } else {
        free.iter().zip(deltas.iter()).map(rotate).collect()
    }
}

/// Best-fit rotation taking vertex `i`'s rest one-ring edges to its current
/// ones, via the SVD of their weighted covariance.
fn fit_rotation(
    rest: &[Point3<f64>],
    current: &[Point3<f64>],
    ring: &[(usize, f64)],
    i: usize,
) -> Matrix3<f64> {
    let mut covariance = Matrix3::zeros();
    for &(j, w) in ring {
        let e_rest = rest[i] - rest[j];
        let e_current = current[i] - current[j];
        covariance += w * e_current * e_rest.transpose();
    }

    let svd = covariance.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Matrix3::identity();
    };

    let mut rotation = u * v_t;
    if rotation.determinant() < 0.0 {
        // Reflection: flip the column of U paired with the smallest
        // singular value (nalgebra sorts them descending).
        let mut u = u;
        u.column_mut(2).neg_mut();
        rotation = u * v_t;
    }
    rotation
}

/// Write the solved positions back to the mesh.
fn commit(
    mesh: &mut HalfEdgeMesh,
    targets: &[Option<Point3<f64>>],
    free: &[usize],
    solved: &[Point3<f64>],
) {
    for (i, target) in targets.iter().enumerate() {
        if let Some(pos) = target {
            mesh.vertex_mut(crate::mesh::VertexId::new(i)).position = *pos;
        }
    }
    for (r, &i) in free.iter().enumerate() {
        mesh.vertex_mut(crate::mesh::VertexId::new(i)).position = solved[r];
    }
}
