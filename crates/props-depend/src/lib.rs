#![deny(missing_docs)]

//! Pull-based reactive dependency engine.
//!
//! Raw quantities live in [`Source`] cells that carry a version counter
//! bumped on every write. Derived nodes are stored in a [`DependencyGraph`]
//! arena; each node records the versions of its upstreams at the time it was
//! last computed and recomputes on read only when one of them moved. A
//! compute function can only see the upstreams it declared, through
//! [`Inputs`], and must read every one of them.

mod graph;
mod ids;
mod inputs;
mod source;

pub use graph::{ComputeFn, DependencyGraph, Upstream};
pub use ids::NodeId;
pub use inputs::Inputs;
pub use source::{AnySource, Source, SourceRef};
