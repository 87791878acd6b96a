use std::rc::Rc;

use props_core::{Matrix3, PropsError};
use props_sim::{ForceEvaluator, ForceModel, ReplicaArray};

/// Private copy of the replica ensemble with its own force evaluator, used
/// to evaluate displaced configurations without touching the live state.
///
/// Not `Clone`: the registry holds the only instance.
#[derive(Debug)]
pub struct ShadowEvaluator {
    positions: ReplicaArray,
    evaluator: ForceEvaluator,
}

impl ShadowEvaluator {
    /// Copies `positions` and binds a fresh evaluator to `model`.
    pub fn new(positions: &ReplicaArray, model: Rc<dyn ForceModel>) -> Self {
        Self {
            positions: positions.clone(),
            evaluator: ForceEvaluator::new(model),
        }
    }

    /// Positions currently held by the shadow copy.
    pub fn positions(&self) -> &ReplicaArray {
        &self.positions
    }

    /// Sets every shadow replica to `centroid * (1 - scale) + scale * live`.
    pub fn displace(
        &mut self,
        live: &ReplicaArray,
        centroid: &[f64],
        scale: f64,
    ) -> Result<(), PropsError> {
        self.positions.ensure_same_shape(live)?;
        for (shadow, bead) in self.positions.beads_mut().zip(live.beads()) {
            for ((out, q), qc) in shadow.iter_mut().zip(bead).zip(centroid) {
                *out = qc * (1.0 - scale) + scale * q;
            }
        }
        Ok(())
    }

    /// Potential energy of the shadow replicas, summed over beads.
    pub fn potential(&self, h: &Matrix3<f64>) -> Result<f64, PropsError> {
        self.evaluator.potential(h, &self.positions)
    }

    /// Displaces the shadow copy and returns its summed potential.
    pub fn scaled_potential(
        &mut self,
        h: &Matrix3<f64>,
        live: &ReplicaArray,
        centroid: &[f64],
        scale: f64,
    ) -> Result<f64, PropsError> {
        self.displace(live, centroid, scale)?;
        self.potential(h)
    }
}
