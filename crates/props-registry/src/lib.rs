#![deny(missing_docs)]

//! Named observables of a path-integral simulation.
//!
//! [`Properties::bind`] wires the declarative [`property_table`] to the raw
//! sources of a [`props_sim::Simulation`]; [`Properties::get`] then returns
//! any observable by name, recomputing only what changed since the last
//! read.

/// YAML-loadable estimator settings.
pub mod config;
mod properties;
mod table;

pub use config::PropertiesConfig;
pub use properties::Properties;
pub use table::{property_table, Dep, PropertySpec};
