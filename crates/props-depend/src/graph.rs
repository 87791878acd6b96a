use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use props_core::{ErrorInfo, PropsError, Value};
use tracing::debug;

use crate::ids::NodeId;
use crate::inputs::Inputs;
use crate::source::{Source, SourceRef};

/// Compute function of a derived node.
pub type ComputeFn = Box<dyn FnMut(&Inputs<'_>) -> Result<Value, PropsError>>;

/// Upstream edge of a derived node.
#[derive(Clone)]
pub enum Upstream {
    /// A raw source owned by the simulation.
    Source(SourceRef),
    /// A derived node previously added to the same graph.
    Node(NodeId),
}

impl<T: 'static> From<&Source<T>> for Upstream {
    fn from(source: &Source<T>) -> Self {
        Upstream::Source(source.erased())
    }
}

impl From<NodeId> for Upstream {
    fn from(id: NodeId) -> Self {
        Upstream::Node(id)
    }
}

impl fmt::Debug for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Source(source) => f
                .debug_tuple("Source")
                .field(&source.name())
                .field(&source.version())
                .finish(),
            Upstream::Node(id) => f.debug_tuple("Node").field(id).finish(),
        }
    }
}

pub(crate) struct NodeRecord {
    name: String,
    upstreams: Vec<Upstream>,
    upstream_names: Vec<String>,
    compute: Option<ComputeFn>,
    cached: Option<Value>,
    seen: Vec<u64>,
    version: u64,
    computations: u64,
}

impl NodeRecord {
    pub(crate) fn cached(&self) -> Option<&Value> {
        self.cached.as_ref()
    }
}

/// Arena of derived nodes wired to raw sources and to each other.
///
/// Nodes may only depend on sources and on nodes added before them, so the
/// graph is acyclic by construction. Resolution is pull-based: reading a node
/// first resolves its upstream nodes, then recomputes it if any recorded
/// upstream version differs from the current one.
#[derive(Default)]
pub struct DependencyGraph {
    nodes: Vec<NodeRecord>,
    names: BTreeMap<String, NodeId>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of derived nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a derived node.
    ///
    /// Fails with `duplicate-name` if a node already uses `name`, with
    /// `unknown-node` if an upstream node id does not belong to this graph
    /// and with `duplicate-upstream` if two upstreams share a name.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        upstreams: Vec<Upstream>,
        compute: ComputeFn,
    ) -> Result<NodeId, PropsError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(PropsError::Graph(
                ErrorInfo::new("duplicate-name", "a node with this name already exists")
                    .with_context("node", &name),
            ));
        }

        let mut upstream_names = Vec::with_capacity(upstreams.len());
        let mut unique = BTreeSet::new();
        for upstream in &upstreams {
            let upstream_name = match upstream {
                Upstream::Source(source) => source.name().to_string(),
                Upstream::Node(id) => self.record(*id)?.name.clone(),
            };
            if !unique.insert(upstream_name.clone()) {
                return Err(PropsError::Graph(
                    ErrorInfo::new("duplicate-upstream", "upstream declared twice")
                        .with_context("node", &name)
                        .with_context("upstream", upstream_name),
                ));
            }
            upstream_names.push(upstream_name);
        }

        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeRecord {
            name: name.clone(),
            seen: vec![0; upstreams.len()],
            upstreams,
            upstream_names,
            compute: Some(compute),
            cached: None,
            version: 0,
            computations: 0,
        });
        self.names.insert(name, id);
        Ok(id)
    }

    /// Looks up a node by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Name of a node.
    pub fn name(&self, id: NodeId) -> Result<&str, PropsError> {
        Ok(&self.record(id)?.name)
    }

    /// Names of the upstreams a node declared, in declaration order.
    pub fn upstream_names(&self, id: NodeId) -> Result<&[String], PropsError> {
        Ok(&self.record(id)?.upstream_names)
    }

    /// Number of times the node's compute function has succeeded.
    pub fn computations(&self, id: NodeId) -> Result<u64, PropsError> {
        Ok(self.record(id)?.computations)
    }

    /// Returns the current value of a node, recomputing stale nodes on the way.
    pub fn get(&mut self, id: NodeId) -> Result<&Value, PropsError> {
        self.resolve(id)?;
        let record = self.record(id)?;
        record.cached.as_ref().ok_or_else(|| {
            PropsError::Graph(
                ErrorInfo::new("unresolved-upstream", "node has no value after resolution")
                    .with_context("node", &record.name),
            )
        })
    }

    /// Whether reading the node would trigger a recomputation. Does not
    /// recompute anything.
    pub fn is_stale(&self, id: NodeId) -> Result<bool, PropsError> {
        self.record(id)?;
        Ok(self.stale_at(id.index()))
    }

    fn stale_at(&self, index: usize) -> bool {
        let record = &self.nodes[index];
        if record.cached.is_none() {
            return true;
        }
        record
            .upstreams
            .iter()
            .zip(&record.seen)
            .any(|(upstream, seen)| match upstream {
                Upstream::Source(source) => source.version() != *seen,
                Upstream::Node(id) => {
                    self.stale_at(id.index()) || self.nodes[id.index()].version != *seen
                }
            })
    }

    fn resolve(&mut self, id: NodeId) -> Result<(), PropsError> {
        self.record(id)?;
        let index = id.index();

        let upstream_nodes: Vec<NodeId> = self.nodes[index]
            .upstreams
            .iter()
            .filter_map(|upstream| match upstream {
                Upstream::Node(id) => Some(*id),
                Upstream::Source(_) => None,
            })
            .collect();
        for upstream in upstream_nodes {
            self.resolve(upstream)?;
        }

        let current: Vec<u64> = self.nodes[index]
            .upstreams
            .iter()
            .map(|upstream| self.version_of(upstream))
            .collect();
        let record = &self.nodes[index];
        if record.cached.is_some() && record.seen == current {
            return Ok(());
        }

        let mut compute = self.nodes[index].compute.take().ok_or_else(|| {
            PropsError::Graph(
                ErrorInfo::new("reentrant-compute", "node is already being computed")
                    .with_context("node", &self.nodes[index].name),
            )
        })?;
        let outcome = {
            let record = &self.nodes[index];
            let inputs = Inputs::new(
                &record.name,
                &record.upstreams,
                &record.upstream_names,
                &self.nodes,
            );
            compute(&inputs).and_then(|value| inputs.finish().map(|()| value))
        };
        let record = &mut self.nodes[index];
        record.compute = Some(compute);
        let value = outcome?;

        record.cached = Some(value);
        record.seen = current;
        record.version += 1;
        record.computations += 1;
        debug!(node = %record.name, computations = record.computations, "recomputed node");
        Ok(())
    }

    fn version_of(&self, upstream: &Upstream) -> u64 {
        match upstream {
            Upstream::Source(source) => source.version(),
            Upstream::Node(id) => self.nodes[id.index()].version,
        }
    }

    fn record(&self, id: NodeId) -> Result<&NodeRecord, PropsError> {
        self.nodes.get(id.index()).ok_or_else(|| {
            PropsError::Graph(
                ErrorInfo::new("unknown-node", "node id does not belong to this graph")
                    .with_context("index", id.index()),
            )
        })
    }
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("nodes", &self.names.keys().collect::<Vec<_>>())
            .finish()
    }
}
