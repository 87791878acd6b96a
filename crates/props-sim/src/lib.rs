#![deny(missing_docs)]

//! Bind interface between a path-integral simulation and the property
//! registry.
//!
//! The simulation owns every raw quantity as a [`props_depend::Source`],
//! grouped the way a time-stepper holds them: [`Ensemble`], [`Beads`],
//! [`Cell`] and [`Forces`]. [`Accessor`] names each of them so the registry
//! can declare dependencies as data.

mod accessor;
/// Force models and the replica-summing evaluator.
pub mod model;
mod replicas;
mod state;

pub use accessor::Accessor;
pub use model::{BeadEvaluation, ForceEvaluator, ForceModel, Harmonic, Quartic, ReplicaEvaluation};
pub use replicas::ReplicaArray;
pub use state::{Beads, Cell, Ensemble, Forces, Simulation};
