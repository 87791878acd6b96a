#![deny(missing_docs)]
#![doc = "Shared error, value and cell-geometry types for the path-integral property engine."]

pub mod errors;
pub mod geometry;
pub mod units;
mod value;

pub use errors::{ensure_finite, ensure_positive_volume, ensure_replicas, ErrorInfo, PropsError};
pub use geometry::{cell_volume, lattice_to_matrix, matrix_to_lattice, LatticeParameters};
pub use units::{BOLTZMANN, DIMENSIONS};
pub use value::Value;

/// Re-exported so downstream crates agree on the tensor type.
pub use nalgebra::Matrix3;
