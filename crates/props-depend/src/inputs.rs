use std::any::type_name;
use std::cell::{Cell, Ref};

use props_core::{ErrorInfo, Matrix3, PropsError, Value};

use crate::graph::{NodeRecord, Upstream};
use crate::source::SourceCell;

/// Read-only view of the upstreams a node declared, handed to its compute
/// function.
///
/// Reading a name that was not declared fails with `undeclared-read`. Every
/// access is recorded; a declared upstream left unread when the compute
/// function returns fails the evaluation with `unused-dependency`.
pub struct Inputs<'a> {
    owner: &'a str,
    upstreams: &'a [Upstream],
    names: &'a [String],
    nodes: &'a [NodeRecord],
    read: Vec<Cell<bool>>,
}

impl<'a> Inputs<'a> {
    pub(crate) fn new(
        owner: &'a str,
        upstreams: &'a [Upstream],
        names: &'a [String],
        nodes: &'a [NodeRecord],
    ) -> Self {
        Self {
            owner,
            upstreams,
            names,
            nodes,
            read: names.iter().map(|_| Cell::new(false)).collect(),
        }
    }

    /// Borrows the value of a declared raw source.
    pub fn source<T: 'static>(&self, name: &str) -> Result<Ref<'a, T>, PropsError> {
        match self.slot(name)? {
            Upstream::Source(source) => source
                .as_any()
                .downcast_ref::<SourceCell<T>>()
                .map(SourceCell::borrow)
                .ok_or_else(|| self.mismatch(name, type_name::<T>())),
            Upstream::Node(_) => Err(self.mismatch(name, "raw source")),
        }
    }

    /// Copies the value of a declared raw source.
    pub fn copied<T: Copy + 'static>(&self, name: &str) -> Result<T, PropsError> {
        Ok(*self.source::<T>(name)?)
    }

    /// Cached value of a declared upstream node.
    pub fn value(&self, name: &str) -> Result<&'a Value, PropsError> {
        match self.slot(name)? {
            Upstream::Node(id) => self
                .nodes
                .get(id.index())
                .and_then(NodeRecord::cached)
                .ok_or_else(|| {
                    PropsError::Graph(
                        ErrorInfo::new("unresolved-upstream", "upstream node has no value")
                            .with_context("node", self.owner)
                            .with_context("upstream", name),
                    )
                }),
            Upstream::Source(_) => Err(self.mismatch(name, "derived node")),
        }
    }

    /// Scalar value of a declared upstream node.
    pub fn scalar(&self, name: &str) -> Result<f64, PropsError> {
        self.value(name)?.as_scalar()
    }

    /// Tensor value of a declared upstream node.
    pub fn tensor(&self, name: &str) -> Result<Matrix3<f64>, PropsError> {
        self.value(name)?.as_tensor().copied()
    }

    pub(crate) fn finish(&self) -> Result<(), PropsError> {
        let unread: Vec<&str> = self
            .names
            .iter()
            .zip(&self.read)
            .filter(|(_, read)| !read.get())
            .map(|(name, _)| name.as_str())
            .collect();
        if unread.is_empty() {
            return Ok(());
        }
        Err(PropsError::Graph(
            ErrorInfo::new(
                "unused-dependency",
                "node declared upstreams its compute function never read",
            )
            .with_context("node", self.owner)
            .with_context("upstreams", unread.join(",")),
        ))
    }

    fn slot(&self, name: &str) -> Result<&'a Upstream, PropsError> {
        let position = self
            .names
            .iter()
            .position(|declared| declared == name)
            .ok_or_else(|| {
                PropsError::Graph(
                    ErrorInfo::new(
                        "undeclared-read",
                        "compute function read an upstream it did not declare",
                    )
                    .with_context("node", self.owner)
                    .with_context("upstream", name),
                )
            })?;
        self.read[position].set(true);
        Ok(&self.upstreams[position])
    }

    fn mismatch(&self, name: &str, expected: &str) -> PropsError {
        PropsError::Graph(
            ErrorInfo::new("type-mismatch", "upstream does not hold the requested type")
                .with_context("node", self.owner)
                .with_context("upstream", name)
                .with_context("expected", expected),
        )
    }
}
