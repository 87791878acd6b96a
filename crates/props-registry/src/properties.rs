use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use props_core::{ensure_replicas, ErrorInfo, PropsError, Value};
use props_depend::{DependencyGraph, NodeId, Source, Upstream};
use props_estimators::YamamotoReport;
use props_sim::Simulation;
use tracing::info;

use crate::config::PropertiesConfig;
use crate::table::{property_table, Dep};

/// Name under which the raw cell volume is exposed.
const VOLUME: &str = "V";

#[derive(Debug)]
enum Entry {
    Node(NodeId),
    Raw(Source<f64>),
}

/// Observables of one bound simulation, looked up by name.
///
/// Values are cached per observable and recomputed on read only when one of
/// the raw quantities they depend on has been written since the previous
/// computation. The simulation must not be mutated while a read is in
/// progress.
#[derive(Debug)]
pub struct Properties {
    graph: DependencyGraph,
    entries: BTreeMap<String, Entry>,
    yamamoto: Rc<Cell<Option<YamamotoReport>>>,
    config: PropertiesConfig,
}

impl Properties {
    /// Wires every observable of the property table to the sources of `sim`.
    pub fn bind(sim: &Simulation, config: &PropertiesConfig) -> Result<Self, PropsError> {
        config.validate()?;
        let nbeads = sim.beads.nbeads();
        let natoms = sim.beads.natoms();
        ensure_replicas(nbeads)?;
        if natoms == 0 {
            return Err(PropsError::domain(
                "no-atoms",
                "cannot bind properties to a system without atoms",
            ));
        }

        let yamamoto = Rc::new(Cell::new(None));
        let mut graph = DependencyGraph::new();
        let mut entries = BTreeMap::new();
        for spec in property_table(sim, config.finite_difference(), Rc::clone(&yamamoto)) {
            let upstreams = spec
                .deps
                .iter()
                .map(|&dep| match dep {
                    Dep::Source(accessor) => Some(Upstream::Source(sim.source(accessor))),
                    Dep::Node(name) => graph.node_id(name).map(Upstream::Node),
                }
                .ok_or_else(|| {
                    PropsError::Graph(
                        ErrorInfo::new("unknown-node", "upstream entry is not declared earlier")
                            .with_context("node", spec.name)
                            .with_context("upstream", dep.name()),
                    )
                }))
                .collect::<Result<Vec<_>, PropsError>>()?;
            let id = graph.add_node(spec.name, upstreams, spec.compute)?;
            entries.insert(spec.name.to_string(), Entry::Node(id));
        }
        entries.insert(VOLUME.to_string(), Entry::Raw(sim.cell.volume.clone()));

        info!(
            properties = entries.len(),
            nbeads, natoms, "bound property registry"
        );
        Ok(Self {
            graph,
            entries,
            yamamoto,
            config: *config,
        })
    }

    /// Current value of the named observable.
    pub fn get(&mut self, name: &str) -> Result<Value, PropsError> {
        match self.entries.get(name) {
            Some(Entry::Node(id)) => self.graph.get(*id).cloned(),
            Some(Entry::Raw(source)) => Ok(Value::Scalar(source.get())),
            None => Err(PropsError::unknown_property(name)),
        }
    }

    /// Reads several observables in one pass.
    pub fn snapshot(&mut self, names: &[&str]) -> Result<BTreeMap<String, Value>, PropsError> {
        names
            .iter()
            .map(|name| Ok((name.to_string(), self.get(name)?)))
            .collect()
    }

    /// Whether reading `name` would recompute it. Raw quantities are never
    /// stale.
    pub fn is_stale(&self, name: &str) -> Result<bool, PropsError> {
        match self.entry(name)? {
            Entry::Node(id) => self.graph.is_stale(*id),
            Entry::Raw(_) => Ok(false),
        }
    }

    /// Number of successful computations of `name` since bind.
    pub fn compute_count(&self, name: &str) -> Result<u64, PropsError> {
        match self.entry(name)? {
            Entry::Node(id) => self.graph.computations(*id),
            Entry::Raw(_) => Ok(0),
        }
    }

    /// Exposed names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Upstream names `name` was declared with.
    pub fn dependencies(&self, name: &str) -> Result<Vec<String>, PropsError> {
        match self.entry(name)? {
            Entry::Node(id) => Ok(self.graph.upstream_names(*id)?.to_vec()),
            Entry::Raw(source) => Ok(vec![source.name().to_string()]),
        }
    }

    /// Report of the most recent `kinetic_yamamoto` computation.
    pub fn last_yamamoto_report(&self) -> Option<YamamotoReport> {
        self.yamamoto.get()
    }

    /// Configuration the registry was bound with.
    pub fn config(&self) -> &PropertiesConfig {
        &self.config
    }

    fn entry(&self, name: &str) -> Result<&Entry, PropsError> {
        self.entries
            .get(name)
            .ok_or_else(|| PropsError::unknown_property(name))
    }
}
