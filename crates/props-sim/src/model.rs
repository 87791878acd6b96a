use std::fmt;
use std::rc::Rc;

use props_core::{ErrorInfo, Matrix3, PropsError, DIMENSIONS};

use crate::replicas::ReplicaArray;

/// Energy, forces and virial of a single replica.
#[derive(Debug, Clone, PartialEq)]
pub struct BeadEvaluation {
    /// Potential energy.
    pub potential: f64,
    /// Forces, laid out like the input coordinates.
    pub forces: Vec<f64>,
    /// Virial tensor `sum_atoms q_i f_j`.
    pub virial: Matrix3<f64>,
}

/// Force field evaluated one replica at a time.
pub trait ForceModel: fmt::Debug {
    /// Evaluates the replica with flat coordinates `q` inside cell `h`.
    fn evaluate(&self, h: &Matrix3<f64>, q: &[f64]) -> Result<BeadEvaluation, PropsError>;

    /// Potential energy only.
    fn potential(&self, h: &Matrix3<f64>, q: &[f64]) -> Result<f64, PropsError> {
        Ok(self.evaluate(h, q)?.potential)
    }
}

/// Totals over every replica of an ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaEvaluation {
    /// Potential energy summed over replicas.
    pub potential: f64,
    /// Per-replica forces.
    pub forces: ReplicaArray,
    /// Virial summed over replicas.
    pub virial: Matrix3<f64>,
}

/// Applies a force model to each replica of an ensemble and accumulates
/// the totals.
#[derive(Debug, Clone)]
pub struct ForceEvaluator {
    model: Rc<dyn ForceModel>,
}

impl ForceEvaluator {
    /// Wraps a model.
    pub fn new(model: Rc<dyn ForceModel>) -> Self {
        Self { model }
    }

    /// Shared handle to the underlying model.
    pub fn model(&self) -> Rc<dyn ForceModel> {
        Rc::clone(&self.model)
    }

    /// Potential energy summed over replicas.
    pub fn potential(&self, h: &Matrix3<f64>, q: &ReplicaArray) -> Result<f64, PropsError> {
        q.beads()
            .map(|bead| self.model.potential(h, bead))
            .sum::<Result<f64, PropsError>>()
    }

    /// Full evaluation of every replica.
    pub fn evaluate(
        &self,
        h: &Matrix3<f64>,
        q: &ReplicaArray,
    ) -> Result<ReplicaEvaluation, PropsError> {
        let mut potential = 0.0;
        let mut virial = Matrix3::<f64>::zeros();
        let mut forces = ReplicaArray::zeros(q.nbeads(), q.natoms())?;
        for (bead, out) in q.beads().zip(forces.beads_mut()) {
            let evaluation = self.model.evaluate(h, bead)?;
            if evaluation.forces.len() != out.len() {
                return Err(PropsError::Model(
                    ErrorInfo::new("shape-mismatch", "model returned forces of the wrong length")
                        .with_context("expected", out.len())
                        .with_context("found", evaluation.forces.len()),
                ));
            }
            out.copy_from_slice(&evaluation.forces);
            potential += evaluation.potential;
            virial += evaluation.virial;
        }
        Ok(ReplicaEvaluation {
            potential,
            forces,
            virial,
        })
    }
}

/// Isotropic harmonic well centred on the origin: `V = k/2 * sum x^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    /// Spring constant.
    pub k: f64,
}

impl ForceModel for Harmonic {
    fn evaluate(&self, h: &Matrix3<f64>, q: &[f64]) -> Result<BeadEvaluation, PropsError> {
        Quartic { k: self.k, g: 0.0 }.evaluate(h, q)
    }
}

/// Anharmonic well: `V = sum (k/2 * x^2 + g * x^4)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartic {
    /// Harmonic coefficient.
    pub k: f64,
    /// Quartic coefficient.
    pub g: f64,
}

impl ForceModel for Quartic {
    fn evaluate(&self, _h: &Matrix3<f64>, q: &[f64]) -> Result<BeadEvaluation, PropsError> {
        if q.len() % DIMENSIONS != 0 {
            return Err(PropsError::Model(
                ErrorInfo::new("shape-mismatch", "coordinates must come in Cartesian triples")
                    .with_context("coordinates", q.len()),
            ));
        }
        let mut potential = 0.0;
        let mut forces = Vec::with_capacity(q.len());
        for &x in q {
            let x2 = x * x;
            potential += 0.5 * self.k * x2 + self.g * x2 * x2;
            forces.push(-self.k * x - 4.0 * self.g * x2 * x);
        }
        let mut virial = Matrix3::<f64>::zeros();
        for (position, force) in q
            .chunks_exact(DIMENSIONS)
            .zip(forces.chunks_exact(DIMENSIONS))
        {
            for i in 0..DIMENSIONS {
                for j in 0..DIMENSIONS {
                    virial[(i, j)] += position[i] * force[j];
                }
            }
        }
        Ok(BeadEvaluation {
            potential,
            forces,
            virial,
        })
    }
}
