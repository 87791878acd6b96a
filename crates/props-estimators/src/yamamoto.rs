//! The estimator differentiates the potential numerically along the scaling
//! that stretches each replica away from the centroid. With `s = sqrt(1 ± δ)`
//! two displaced copies give
//!
//! `K = ((1 + δ) V₊ − (1 − δ) V₋) / 2δ − V₀ + 3N kT / 2`.
//!
//! In adaptive mode δ is halved while `|(V₊ + V₋) / 2V₀ − 1|` exceeds the
//! tolerance. The number of halvings is capped at
//! `ceil(log2(|δ| / δ_min))`, so the loop ends even when the error never
//! clears.

use props_core::{ensure_finite, ensure_replicas, ErrorInfo, Matrix3, PropsError};
use props_sim::ReplicaArray;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::centroid_virial::equipartition;
use crate::shadow::ShadowEvaluator;

/// Default finite-difference displacement.
pub const DEFAULT_DELTA: f64 = 1e-5;
/// Default tolerance on the symmetric-displacement error.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;
/// Default smallest displacement the adaptive loop may reach.
pub const DEFAULT_MIN_DELTA: f64 = 1e-12;

/// Finite-difference parameters. A negative `delta` enables adaptation; its
/// magnitude is the initial displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiniteDifference {
    /// Signed initial displacement.
    pub delta: f64,
    /// Tolerance on `|(V₊ + V₋) / 2V₀ − 1|`.
    pub tolerance: f64,
    /// Floor on the displacement.
    pub min_delta: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self {
            delta: -DEFAULT_DELTA,
            tolerance: DEFAULT_TOLERANCE,
            min_delta: DEFAULT_MIN_DELTA,
        }
    }
}

impl FiniteDifference {
    /// Whether the displacement adapts.
    pub fn is_adaptive(&self) -> bool {
        self.delta < 0.0
    }

    /// Upper bound on the number of halvings in one evaluation.
    pub fn max_halvings(&self) -> u32 {
        let ratio = self.delta.abs() / self.min_delta;
        if ratio.is_finite() && ratio > 1.0 {
            ratio.log2().ceil() as u32
        } else {
            0
        }
    }

    /// Checks the parameters describe a usable finite difference.
    pub fn validate(&self) -> Result<(), PropsError> {
        let magnitude = self.delta.abs();
        if !(magnitude.is_finite() && magnitude > 0.0 && magnitude < 1.0) {
            return Err(PropsError::Config(
                ErrorInfo::new("invalid-delta", "displacement must satisfy 0 < |delta| < 1")
                    .with_context("delta", self.delta)
                    .with_hint("use a negative value to enable adaptation"),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PropsError::Config(
                ErrorInfo::new("invalid-tolerance", "tolerance must be finite and positive")
                    .with_context("tolerance", self.tolerance),
            ));
        }
        if !(self.min_delta.is_finite() && self.min_delta > 0.0 && self.min_delta <= magnitude) {
            return Err(PropsError::Config(
                ErrorInfo::new(
                    "invalid-min-delta",
                    "minimum displacement must be positive and no larger than |delta|",
                )
                .with_context("min_delta", self.min_delta)
                .with_context("delta", self.delta),
            ));
        }
        Ok(())
    }
}

/// Quantities one evaluation reads from the live state.
#[derive(Debug, Clone, Copy)]
pub struct YamamotoInput<'a> {
    /// Cell matrix the shadow forces are evaluated in.
    pub cell: &'a Matrix3<f64>,
    /// Live replica positions.
    pub positions: &'a ReplicaArray,
    /// Per-replica potential energy of the undisplaced configuration.
    pub reference_potential: f64,
    /// Ensemble temperature.
    pub temperature: f64,
}

/// Outcome of one estimator evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YamamotoReport {
    /// Kinetic energy estimate.
    pub estimate: f64,
    /// Displacement the estimate was taken at.
    pub delta: f64,
    /// Number of times the displacement was halved.
    pub halvings: u32,
    /// False when the loop stopped at the floor or the halving cap.
    pub converged: bool,
    /// Per-replica potential at `s = sqrt(1 + δ)`.
    pub v_plus: f64,
    /// Per-replica potential at `s = sqrt(1 − δ)`.
    pub v_minus: f64,
    /// Symmetric-displacement error; `None` when adaptation is off.
    pub relative_error: Option<f64>,
}

/// Evaluates the displaced-path kinetic energy estimator.
///
/// The shadow evaluator's positions are overwritten; the live positions are
/// only read. Every call restarts from `|params.delta|`.
pub fn yamamoto_kinetic(
    shadow: &mut ShadowEvaluator,
    params: &FiniteDifference,
    input: &YamamotoInput<'_>,
) -> Result<YamamotoReport, PropsError> {
    params.validate()?;
    let nbeads = ensure_replicas(input.positions.nbeads())?;
    let v0 = ensure_finite("reference potential", input.reference_potential)?;
    let adaptive = params.is_adaptive();
    if adaptive && v0 == 0.0 {
        return Err(PropsError::Domain(
            ErrorInfo::new(
                "zero-reference-potential",
                "adaptive displacement needs a non-zero reference potential",
            )
            .with_hint("shift the potential or use a fixed (positive) displacement"),
        ));
    }

    let centroid = input.positions.centroid();
    let thermal = equipartition(input.positions.natoms(), input.temperature);
    let cap = params.max_halvings();
    let mut delta = params.delta.abs();
    let mut halvings = 0;

    loop {
        let splus = (1.0 + delta).sqrt();
        let sminus = (1.0 - delta).sqrt();
        let v_plus = shadow.scaled_potential(input.cell, input.positions, &centroid, splus)? / nbeads;
        let v_minus = shadow.scaled_potential(input.cell, input.positions, &centroid, sminus)? / nbeads;
        let v_plus = ensure_finite("displaced potential", v_plus)?;
        let v_minus = ensure_finite("displaced potential", v_minus)?;

        let estimate =
            ((1.0 + delta) * v_plus - (1.0 - delta) * v_minus) / (2.0 * delta) - v0 + thermal;
        let mut report = YamamotoReport {
            estimate,
            delta,
            halvings,
            converged: true,
            v_plus,
            v_minus,
            relative_error: None,
        };
        if !adaptive {
            return Ok(report);
        }

        let relative_error = ((v_plus + v_minus) / (2.0 * v0) - 1.0).abs();
        report.relative_error = Some(relative_error);
        if relative_error <= params.tolerance {
            return Ok(report);
        }
        if delta <= params.min_delta || halvings >= cap {
            warn!(
                delta,
                relative_error,
                halvings,
                "finite-difference error did not clear at the minimum displacement"
            );
            report.converged = false;
            return Ok(report);
        }

        delta *= 0.5;
        halvings += 1;
        warn!(
            delta,
            relative_error,
            iteration = halvings,
            "reducing displacement in Yamamoto kinetic estimator"
        );
    }
}
