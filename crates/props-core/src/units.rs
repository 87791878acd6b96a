//! Physical constants in the internal (atomic) unit system.

/// Boltzmann constant. Temperatures are carried in energy units internally.
pub const BOLTZMANN: f64 = 1.0;

/// Number of Cartesian components per atom.
pub const DIMENSIONS: usize = 3;
