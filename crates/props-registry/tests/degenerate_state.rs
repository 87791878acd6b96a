mod common;

use std::rc::Rc;

use props_core::{Matrix3, PropsError, Value};
use props_estimators::centroid_virial;
use props_registry::{Properties, PropertiesConfig};
use props_sim::{Beads, Cell, Ensemble, Harmonic, ReplicaArray, Simulation};

use common::{bound, cell_matrix, simulation, NATOMS, NBEADS};

fn single_particle(position: [f64; 3], fixcom: bool) -> Simulation {
    let beads = Beads::new(ReplicaArray::from_beads(&[position.to_vec()]).unwrap());
    beads.kinetic.set(1.0);
    Simulation::new(
        Ensemble::new(1.0, 0.5, fixcom),
        beads,
        Cell::new(cell_matrix()),
        Rc::new(Harmonic { k: 1.0 }),
    )
    .unwrap()
}

#[test]
fn collapsed_cell_fails_volume_dependent_observables() {
    let sim = simulation();
    let mut props = bound(&sim);
    sim.cell.set_matrix(Matrix3::zeros());

    for name in ["stress_md", "stress_md.xx", "pressure_md", "pressure_cv"] {
        let err = props.get(name).unwrap_err();
        assert!(
            matches!(&err, PropsError::Domain(info) if info.code == "zero-volume"),
            "{name}: {err}"
        );
    }
    assert_eq!(props.get("V").unwrap(), Value::Scalar(0.0));
    assert_eq!(props.get("cell_parameters").unwrap_err().code(), "degenerate-cell");

    // Failed reads cache nothing.
    assert!(props.is_stale("stress_md").unwrap());
    assert_eq!(props.compute_count("stress_md").unwrap(), 0);

    sim.cell.set_matrix(cell_matrix());
    assert!(props.get("pressure_md").is_ok());
    assert_eq!(props.compute_count("stress_md").unwrap(), 1);
}

#[test]
fn inverted_cell_has_no_positive_volume() {
    let sim = simulation();
    let mut props = bound(&sim);
    sim.cell
        .set_matrix(Matrix3::new(-10.0, 0.0, 0.0, 0.0, 12.0, 0.0, 0.0, 0.0, 14.0));
    assert_eq!(props.get("stress_cv").unwrap_err().code(), "zero-volume");
}

#[test]
fn temperature_needs_degrees_of_freedom() {
    let sim = single_particle([0.1, 0.2, 0.3], true);
    let mut props = bound(&sim);
    let err = props.get("temperature").unwrap_err();
    assert!(matches!(&err, PropsError::Domain(info) if info.code == "zero-degrees-of-freedom"));

    sim.ensemble.fixcom.set(false);
    let temperature = props.get("temperature").unwrap().as_scalar().unwrap();
    assert!((temperature - 1.0 / 1.5).abs() < 1e-15);
}

#[test]
fn adaptive_estimator_rejects_a_zero_reference_potential() {
    let sim = single_particle([0.0; 3], false);
    let mut adaptive = bound(&sim);
    let err = adaptive.get("kinetic_yamamoto").unwrap_err();
    assert!(matches!(&err, PropsError::Domain(info) if info.code == "zero-reference-potential"));
    assert!(adaptive.last_yamamoto_report().is_none());

    let config = PropertiesConfig {
        fd_delta: 1e-4,
        ..PropertiesConfig::default()
    };
    let mut fixed = Properties::bind(&sim, &config).unwrap();
    let kinetic = fixed.get("kinetic_yamamoto").unwrap().as_scalar().unwrap();
    assert!((kinetic - 0.5 * 0.5 * 3.0).abs() < 1e-12);
}

#[test]
fn replica_shape_is_fixed_after_bind() {
    let sim = simulation();
    let mut props = bound(&sim);
    let before = props.get("kinetic_cv").unwrap();

    let err = sim
        .beads
        .set_positions(ReplicaArray::zeros(3, 2).unwrap())
        .unwrap_err();
    assert_eq!(err.code(), "shape-mismatch");
    assert_eq!(sim.beads.positions().nbeads(), NBEADS);
    assert_eq!(sim.beads.positions().natoms(), NATOMS);
    assert!(!props.is_stale("kinetic_cv").unwrap());

    sim.beads.translate([0.5, -0.25, 1.0]);
    sim.refresh_forces().unwrap();
    assert_eq!(sim.forces.forces.borrow().nbeads(), NBEADS);
    let after = props.get("kinetic_cv").unwrap().as_scalar().unwrap();
    let expected = centroid_virial::kinetic(
        &sim.beads.positions(),
        &sim.forces.forces.borrow(),
        0.25,
    )
    .unwrap();
    assert_eq!(after, expected);
    assert!((after - before.as_scalar().unwrap()).abs() < 1e-9);
    assert_eq!(props.compute_count("kinetic_cv").unwrap(), 2);
}
