#![deny(missing_docs)]

//! Estimators for the observables of a path-integral simulation.
//!
//! Every function here is a plain computation over already-evaluated
//! quantities; caching and dependency tracking live in the registry.

/// Centroid-virial kinetic energy and stress.
pub mod centroid_virial;
/// Instantaneous classical estimators.
pub mod classical;
mod shadow;
/// Adaptive finite-difference kinetic energy estimator.
pub mod yamamoto;

pub use shadow::ShadowEvaluator;
pub use yamamoto::{yamamoto_kinetic, FiniteDifference, YamamotoInput, YamamotoReport};
