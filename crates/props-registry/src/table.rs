use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use props_core::{Matrix3, PropsError, Value};
use props_depend::{ComputeFn, Inputs};
use props_estimators::{
    centroid_virial, classical, yamamoto_kinetic, FiniteDifference, ShadowEvaluator,
    YamamotoInput, YamamotoReport,
};
use props_sim::{Accessor, ReplicaArray, Simulation};

const STEP: &str = Accessor::Step.name();
const TIMESTEP: &str = Accessor::Timestep.name();
const TEMPERATURE: &str = Accessor::Temperature.name();
const CONSERVED: &str = Accessor::Conserved.name();
const FIXCOM: &str = Accessor::FixCom.name();
const POSITIONS: &str = Accessor::Positions.name();
const KINETIC: &str = Accessor::KineticEnergy.name();
const KINETIC_STRESS: &str = Accessor::KineticStress.name();
const CELL: &str = Accessor::CellMatrix.name();
const VOLUME: &str = Accessor::Volume.name();
const POTENTIAL: &str = Accessor::Potential.name();
const FORCES: &str = Accessor::Forces.name();
const VIRIAL: &str = Accessor::Virial.name();

/// Upstream of a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dep {
    /// Raw simulation quantity.
    Source(Accessor),
    /// Entry declared earlier in the table.
    Node(&'static str),
}

impl Dep {
    /// Name the compute function reads this upstream under.
    pub fn name(self) -> &'static str {
        match self {
            Dep::Source(accessor) => accessor.name(),
            Dep::Node(name) => name,
        }
    }
}

/// One named observable: what it reads and how it is computed.
pub struct PropertySpec {
    /// Lookup name.
    pub name: &'static str,
    /// Every upstream the compute function reads, and nothing else.
    pub deps: Vec<Dep>,
    /// Compute function.
    pub compute: ComputeFn,
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

fn spec<F>(name: &'static str, deps: Vec<Dep>, compute: F) -> PropertySpec
where
    F: FnMut(&Inputs<'_>) -> Result<Value, PropsError> + 'static,
{
    PropertySpec {
        name,
        deps,
        compute: Box::new(compute),
    }
}

/// Builds the observable table for `sim`.
///
/// Entries are ordered so that every [`Dep::Node`] names an earlier entry.
/// `kinetic_yamamoto` owns a fresh [`ShadowEvaluator`] bound to the
/// simulation's force model and publishes each evaluation's report into
/// `reports`.
pub fn property_table(
    sim: &Simulation,
    params: FiniteDifference,
    reports: Rc<Cell<Option<YamamotoReport>>>,
) -> Vec<PropertySpec> {
    let nbeads = sim.beads.nbeads();
    let natoms = sim.beads.natoms();
    let mut shadow = ShadowEvaluator::new(&sim.beads.positions(), sim.model());

    vec![
        spec(
            "time",
            vec![Dep::Source(Accessor::Step), Dep::Source(Accessor::Timestep)],
            |inputs| {
                let step = inputs.copied::<u64>(STEP)?;
                let dt = inputs.copied::<f64>(TIMESTEP)?;
                Ok(classical::elapsed_time(step, dt).into())
            },
        ),
        spec("conserved", vec![Dep::Source(Accessor::Conserved)], move |inputs| {
            Ok(classical::per_replica(inputs.copied(CONSERVED)?, nbeads)?.into())
        }),
        spec("kinetic_md", vec![Dep::Source(Accessor::KineticEnergy)], move |inputs| {
            Ok(classical::per_replica(inputs.copied(KINETIC)?, nbeads)?.into())
        }),
        spec("potential", vec![Dep::Source(Accessor::Potential)], move |inputs| {
            Ok(classical::per_replica(inputs.copied(POTENTIAL)?, nbeads)?.into())
        }),
        spec(
            "temperature",
            vec![
                Dep::Source(Accessor::KineticEnergy),
                Dep::Source(Accessor::FixCom),
            ],
            move |inputs| {
                let kinetic = inputs.copied::<f64>(KINETIC)?;
                let fixcom = inputs.copied::<bool>(FIXCOM)?;
                Ok(classical::temperature(kinetic, natoms, nbeads, fixcom)?.into())
            },
        ),
        spec("cell_parameters", vec![Dep::Source(Accessor::CellMatrix)], |inputs| {
            let h = inputs.source::<Matrix3<f64>>(CELL)?;
            Ok(classical::cell_parameters(&h)?.into())
        }),
        spec(
            "stress_md",
            vec![
                Dep::Source(Accessor::KineticStress),
                Dep::Source(Accessor::Virial),
                Dep::Source(Accessor::Volume),
            ],
            |inputs| {
                let kinetic_stress = inputs.copied::<Matrix3<f64>>(KINETIC_STRESS)?;
                let virial = inputs.copied::<Matrix3<f64>>(VIRIAL)?;
                let volume = inputs.copied::<f64>(VOLUME)?;
                Ok(classical::stress(&virial, &kinetic_stress, volume)?.into())
            },
        ),
        spec("stress_md.xx", vec![Dep::Node("stress_md")], |inputs| {
            Ok(inputs.tensor("stress_md")?[(0, 0)].into())
        }),
        spec("pressure_md", vec![Dep::Node("stress_md")], |inputs| {
            Ok(classical::pressure(&inputs.tensor("stress_md")?).into())
        }),
        spec(
            "kinetic_cv",
            vec![
                Dep::Source(Accessor::Positions),
                Dep::Source(Accessor::Forces),
                Dep::Source(Accessor::Temperature),
            ],
            |inputs| {
                let positions = inputs.source::<ReplicaArray>(POSITIONS)?;
                let forces = inputs.source::<ReplicaArray>(FORCES)?;
                let temperature = inputs.copied::<f64>(TEMPERATURE)?;
                Ok(centroid_virial::kinetic(&positions, &forces, temperature)?.into())
            },
        ),
        spec(
            "kstress_cv",
            vec![
                Dep::Source(Accessor::Positions),
                Dep::Source(Accessor::Forces),
                Dep::Source(Accessor::Temperature),
            ],
            |inputs| {
                let positions = inputs.source::<ReplicaArray>(POSITIONS)?;
                let forces = inputs.source::<ReplicaArray>(FORCES)?;
                let temperature = inputs.copied::<f64>(TEMPERATURE)?;
                Ok(centroid_virial::kinetic_stress(&positions, &forces, temperature)?.into())
            },
        ),
        spec(
            "stress_cv",
            vec![
                Dep::Node("kstress_cv"),
                Dep::Source(Accessor::Virial),
                Dep::Source(Accessor::Volume),
            ],
            |inputs| {
                let kinetic_stress = inputs.tensor("kstress_cv")?;
                let virial = inputs.copied::<Matrix3<f64>>(VIRIAL)?;
                let volume = inputs.copied::<f64>(VOLUME)?;
                Ok(classical::stress(&virial, &kinetic_stress, volume)?.into())
            },
        ),
        spec("stress_cv.xx", vec![Dep::Node("stress_cv")], |inputs| {
            Ok(inputs.tensor("stress_cv")?[(0, 0)].into())
        }),
        spec("pressure_cv", vec![Dep::Node("stress_cv")], |inputs| {
            Ok(classical::pressure(&inputs.tensor("stress_cv")?).into())
        }),
        spec(
            "kinetic_yamamoto",
            vec![
                Dep::Source(Accessor::Positions),
                Dep::Source(Accessor::Temperature),
                Dep::Node("potential"),
                Dep::Source(Accessor::CellMatrix),
            ],
            move |inputs| {
                let positions = inputs.source::<ReplicaArray>(POSITIONS)?;
                let temperature = inputs.copied::<f64>(TEMPERATURE)?;
                let reference_potential = inputs.scalar("potential")?;
                let cell = inputs.source::<Matrix3<f64>>(CELL)?;
                let report = yamamoto_kinetic(
                    &mut shadow,
                    &params,
                    &YamamotoInput {
                        cell: &cell,
                        positions: &positions,
                        reference_potential,
                        temperature,
                    },
                )?;
                reports.set(Some(report));
                Ok(report.estimate.into())
            },
        ),
    ]
}
