use std::cell::Ref;
use std::rc::Rc;

use props_core::{cell_volume, Matrix3, PropsError, DIMENSIONS};
use props_depend::{Source, SourceRef};

use crate::accessor::Accessor;
use crate::model::{ForceEvaluator, ForceModel};
use crate::replicas::ReplicaArray;

/// Thermodynamic ensemble and integrator bookkeeping.
#[derive(Debug, Clone)]
pub struct Ensemble {
    /// Step counter.
    pub step: Source<u64>,
    /// Timestep.
    pub timestep: Source<f64>,
    /// Target temperature, in energy units.
    pub temperature: Source<f64>,
    /// Conserved quantity summed over replicas.
    pub conserved: Source<f64>,
    /// Whether centre-of-mass motion is removed.
    pub fixcom: Source<bool>,
}

impl Ensemble {
    /// Ensemble at step zero with a zero conserved quantity.
    pub fn new(timestep: f64, temperature: f64, fixcom: bool) -> Self {
        Self {
            step: Source::new(Accessor::Step.name(), 0_u64),
            timestep: Source::new(Accessor::Timestep.name(), timestep),
            temperature: Source::new(Accessor::Temperature.name(), temperature),
            conserved: Source::new(Accessor::Conserved.name(), 0.0),
            fixcom: Source::new(Accessor::FixCom.name(), fixcom),
        }
    }
}

/// Replica ensemble: positions and the classical kinetic quantities the
/// integrator derives from the momenta.
///
/// The replica shape is fixed at construction; positions can only be
/// replaced through [`Beads::set_positions`].
#[derive(Debug, Clone)]
pub struct Beads {
    nbeads: usize,
    natoms: usize,
    positions: Source<ReplicaArray>,
    /// Classical kinetic energy summed over replicas.
    pub kinetic: Source<f64>,
    /// Classical kinetic stress tensor.
    pub kinetic_stress: Source<Matrix3<f64>>,
}

impl Beads {
    /// Replicas at rest at the given positions.
    pub fn new(positions: ReplicaArray) -> Self {
        Self {
            nbeads: positions.nbeads(),
            natoms: positions.natoms(),
            positions: Source::new(Accessor::Positions.name(), positions),
            kinetic: Source::new(Accessor::KineticEnergy.name(), 0.0),
            kinetic_stress: Source::new(Accessor::KineticStress.name(), Matrix3::zeros()),
        }
    }

    /// Number of replicas.
    pub fn nbeads(&self) -> usize {
        self.nbeads
    }

    /// Number of atoms per replica.
    pub fn natoms(&self) -> usize {
        self.natoms
    }

    /// Borrows the replica positions.
    pub fn positions(&self) -> Ref<'_, ReplicaArray> {
        self.positions.borrow()
    }

    /// Number of position writes so far.
    pub fn positions_version(&self) -> u64 {
        self.positions.version()
    }

    /// Replaces the positions. Fails with `shape-mismatch` if the bead or
    /// atom count differs.
    pub fn set_positions(&self, positions: ReplicaArray) -> Result<(), PropsError> {
        self.positions.borrow().ensure_same_shape(&positions)?;
        self.positions.set(positions);
        Ok(())
    }

    /// Shifts every coordinate in place, keeping the replica shape.
    pub fn translate(&self, offset: [f64; DIMENSIONS]) {
        self.positions.update(|positions| {
            for bead in positions.beads_mut() {
                for (x, shift) in bead.iter_mut().zip(offset.iter().cycle()) {
                    *x += shift;
                }
            }
        });
    }
}

/// Simulation box.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Cell matrix with lattice vectors as columns.
    pub matrix: Source<Matrix3<f64>>,
    /// Cell volume, kept in step with `matrix`.
    pub volume: Source<f64>,
}

impl Cell {
    /// Cell spanned by the columns of `h`.
    pub fn new(h: Matrix3<f64>) -> Self {
        Self {
            volume: Source::new(Accessor::Volume.name(), cell_volume(&h)),
            matrix: Source::new(Accessor::CellMatrix.name(), h),
        }
    }

    /// Replaces the cell matrix and its volume.
    pub fn set_matrix(&self, h: Matrix3<f64>) {
        self.volume.set(cell_volume(&h));
        self.matrix.set(h);
    }
}

/// Forces acting on the live replicas, as last evaluated.
#[derive(Debug, Clone)]
pub struct Forces {
    /// Potential energy summed over replicas.
    pub potential: Source<f64>,
    /// Per-replica forces.
    pub forces: Source<ReplicaArray>,
    /// Force virial summed over replicas.
    pub virial: Source<Matrix3<f64>>,
    evaluator: ForceEvaluator,
}

impl Forces {
    /// Evaluates `model` on the current positions and cell.
    pub fn bind(beads: &Beads, cell: &Cell, model: Rc<dyn ForceModel>) -> Result<Self, PropsError> {
        let evaluator = ForceEvaluator::new(model);
        let evaluation = evaluator.evaluate(&cell.matrix.borrow(), &beads.positions())?;
        Ok(Self {
            potential: Source::new(Accessor::Potential.name(), evaluation.potential),
            forces: Source::new(Accessor::Forces.name(), evaluation.forces),
            virial: Source::new(Accessor::Virial.name(), evaluation.virial),
            evaluator,
        })
    }

    /// Re-evaluates potential, forces and virial from the current state.
    pub fn refresh(&self, beads: &Beads, cell: &Cell) -> Result<(), PropsError> {
        let evaluation = self
            .evaluator
            .evaluate(&cell.matrix.borrow(), &beads.positions())?;
        self.potential.set(evaluation.potential);
        self.forces.set(evaluation.forces);
        self.virial.set(evaluation.virial);
        Ok(())
    }
}

/// Everything the property registry binds to.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Ensemble bookkeeping.
    pub ensemble: Ensemble,
    /// Replica ensemble.
    pub beads: Beads,
    /// Simulation box.
    pub cell: Cell,
    /// Live forces.
    pub forces: Forces,
}

impl Simulation {
    /// Assembles a simulation and performs the initial force evaluation.
    pub fn new(
        ensemble: Ensemble,
        beads: Beads,
        cell: Cell,
        model: Rc<dyn ForceModel>,
    ) -> Result<Self, PropsError> {
        let forces = Forces::bind(&beads, &cell, model)?;
        Ok(Self {
            ensemble,
            beads,
            cell,
            forces,
        })
    }

    /// Erased handle to one raw quantity.
    pub fn source(&self, accessor: Accessor) -> SourceRef {
        match accessor {
            Accessor::Step => self.ensemble.step.erased(),
            Accessor::Timestep => self.ensemble.timestep.erased(),
            Accessor::Temperature => self.ensemble.temperature.erased(),
            Accessor::Conserved => self.ensemble.conserved.erased(),
            Accessor::FixCom => self.ensemble.fixcom.erased(),
            Accessor::Positions => self.beads.positions.erased(),
            Accessor::KineticEnergy => self.beads.kinetic.erased(),
            Accessor::KineticStress => self.beads.kinetic_stress.erased(),
            Accessor::CellMatrix => self.cell.matrix.erased(),
            Accessor::Volume => self.cell.volume.erased(),
            Accessor::Potential => self.forces.potential.erased(),
            Accessor::Forces => self.forces.forces.erased(),
            Accessor::Virial => self.forces.virial.erased(),
        }
    }

    /// Re-evaluates the live forces after positions or cell changed.
    pub fn refresh_forces(&self) -> Result<(), PropsError> {
        self.forces.refresh(&self.beads, &self.cell)
    }

    /// Increments the step counter.
    pub fn advance(&self) {
        self.ensemble.step.update(|step| *step += 1);
    }

    /// Force model the live forces are evaluated with.
    pub fn model(&self) -> Rc<dyn ForceModel> {
        self.forces.evaluator.model()
    }
}
