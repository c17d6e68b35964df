//! Constrained mesh deformation.
//!
//! The workflow mirrors an interactive editing session: mark anchors and
//! handles in a [`ConstraintSet`], move the handle targets, then call
//! [`deform`] to solve for the remaining vertices. Differential (Laplacian)
//! coordinates captured from the rest pose preserve surface detail;
//! [`DeformOptions`] selects the edge [`WeightScheme`] and the number of
//! rotation-aware refinement rounds.
//!
//! ```
//! use pliant::prelude::*;
//! use nalgebra::Vector3;
//!
//! let mut mesh = tetrahedron();
//! let mut constraints = ConstraintSet::new();
//! constraints.set_constraints(&mut mesh, &[0, 2, 3], &[1])?;
//! constraints.translate_handles(Vector3::new(2.0, 0.0, 0.0));
//!
//! let options = DeformOptions::default().with_scheme(WeightScheme::Cotangent);
//! deform(&mut mesh, &constraints, &options)?;
//! # Ok::<(), DeformError>(())
//! ```

mod constraints;
mod solver;
mod sparse;
mod weights;

pub use constraints::ConstraintSet;
pub use solver::{deform, DeformOptions};
pub use weights::WeightScheme;
