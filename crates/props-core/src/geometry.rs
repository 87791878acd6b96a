//! Cell-matrix geometry: volume and lattice-parameter conversions.
//!
//! The cell matrix `h` stores the three lattice vectors as its columns. Cells
//! produced by [`lattice_to_matrix`] are upper triangular, with the first
//! vector along x and the second in the xy plane.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PropsError};

/// Lengths and angles describing a simulation cell. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeParameters {
    /// Length of the first lattice vector.
    pub a: f64,
    /// Length of the second lattice vector.
    pub b: f64,
    /// Length of the third lattice vector.
    pub c: f64,
    /// Angle between the second and third vectors.
    pub alpha: f64,
    /// Angle between the first and third vectors.
    pub beta: f64,
    /// Angle between the first and second vectors.
    pub gamma: f64,
}

impl LatticeParameters {
    /// Returns `[a, b, c, alpha, beta, gamma]`.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }
}

/// Volume spanned by the cell vectors.
pub fn cell_volume(h: &Matrix3<f64>) -> f64 {
    h.determinant()
}

/// Converts a cell matrix into lattice lengths and angles.
///
/// Fails with `degenerate-cell` when any lattice vector has zero length.
pub fn matrix_to_lattice(h: &Matrix3<f64>) -> Result<LatticeParameters, PropsError> {
    let va: Vector3<f64> = h.column(0).into_owned();
    let vb: Vector3<f64> = h.column(1).into_owned();
    let vc: Vector3<f64> = h.column(2).into_owned();
    let (a, b, c) = (va.norm(), vb.norm(), vc.norm());
    if !(a > 0.0 && b > 0.0 && c > 0.0) {
        return Err(PropsError::Domain(
            ErrorInfo::new("degenerate-cell", "cell vectors must have non-zero length")
                .with_context("a", a)
                .with_context("b", b)
                .with_context("c", c),
        ));
    }
    Ok(LatticeParameters {
        a,
        b,
        c,
        alpha: angle(vb.dot(&vc) / (b * c)),
        beta: angle(va.dot(&vc) / (a * c)),
        gamma: angle(va.dot(&vb) / (a * b)),
    })
}

/// Builds the upper-triangular cell matrix for the given lattice parameters.
pub fn lattice_to_matrix(params: &LatticeParameters) -> Matrix3<f64> {
    let LatticeParameters {
        a,
        b,
        c,
        alpha,
        beta,
        gamma,
    } = *params;
    let (cos_g, sin_g) = (gamma.cos(), gamma.sin());
    let bx = b * cos_g;
    let by = b * sin_g;
    let cx = c * beta.cos();
    let cy = c * (alpha.cos() - beta.cos() * cos_g) / sin_g;
    let cz = (c * c - cx * cx - cy * cy).max(0.0).sqrt();
    Matrix3::new(a, bx, cx, 0.0, by, cy, 0.0, 0.0, cz)
}

// Rounding can push the cosine a hair outside [-1, 1].
fn angle(cosine: f64) -> f64 {
    cosine.clamp(-1.0, 1.0).acos()
}
