use serde::{Deserialize, Serialize};

/// Raw quantities a simulation exposes to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Accessor {
    /// Integration step counter.
    Step,
    /// Integration timestep.
    Timestep,
    /// Target temperature of the ensemble.
    Temperature,
    /// Conserved quantity, summed over replicas.
    Conserved,
    /// Whether centre-of-mass motion is removed.
    FixCom,
    /// Replica positions.
    Positions,
    /// Classical kinetic energy, summed over replicas.
    KineticEnergy,
    /// Classical kinetic stress tensor.
    KineticStress,
    /// Cell matrix (lattice vectors as columns).
    CellMatrix,
    /// Cell volume.
    Volume,
    /// Potential energy, summed over replicas.
    Potential,
    /// Replica forces.
    Forces,
    /// Force virial tensor, summed over replicas.
    Virial,
}

impl Accessor {
    /// Every accessor, in declaration order.
    pub const ALL: [Accessor; 13] = [
        Accessor::Step,
        Accessor::Timestep,
        Accessor::Temperature,
        Accessor::Conserved,
        Accessor::FixCom,
        Accessor::Positions,
        Accessor::KineticEnergy,
        Accessor::KineticStress,
        Accessor::CellMatrix,
        Accessor::Volume,
        Accessor::Potential,
        Accessor::Forces,
        Accessor::Virial,
    ];

    /// Source name under which the quantity is registered.
    pub const fn name(self) -> &'static str {
        match self {
            Accessor::Step => "ensemble.step",
            Accessor::Timestep => "ensemble.dt",
            Accessor::Temperature => "ensemble.temp",
            Accessor::Conserved => "ensemble.econs",
            Accessor::FixCom => "ensemble.fixcom",
            Accessor::Positions => "beads.q",
            Accessor::KineticEnergy => "beads.kin",
            Accessor::KineticStress => "beads.kstress",
            Accessor::CellMatrix => "cell.h",
            Accessor::Volume => "cell.V",
            Accessor::Potential => "forces.pot",
            Accessor::Forces => "forces.f",
            Accessor::Virial => "forces.vir",
        }
    }
}
