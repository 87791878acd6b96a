use std::rc::Rc;

use props_core::{Matrix3, PropsError};
use props_depend::AnySource;
use props_sim::{
    Accessor, Beads, Cell, Ensemble, ForceModel, Harmonic, Quartic, ReplicaArray, Simulation,
};

fn two_bead_dimer() -> ReplicaArray {
    ReplicaArray::from_beads(&[
        vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0],
        vec![3.0, 0.0, 0.0, 0.0, 0.0, 4.0],
    ])
    .unwrap()
}

fn simulation(model: Rc<dyn ForceModel>) -> Simulation {
    Simulation::new(
        Ensemble::new(0.5, 1.0, false),
        Beads::new(two_bead_dimer()),
        Cell::new(Matrix3::from_diagonal_element(10.0)),
        model,
    )
    .unwrap()
}

#[test]
fn replica_layout_and_centroid() {
    let q = two_bead_dimer();
    assert_eq!((q.nbeads(), q.natoms(), q.ncoords()), (2, 2, 6));
    assert_eq!(q.centroid(), vec![2.0, 0.0, 0.0, 0.0, 1.0, 2.0]);
    assert_eq!(q.beads().nth(1).unwrap(), &[3.0, 0.0, 0.0, 0.0, 0.0, 4.0]);
}

#[test]
fn replica_shape_is_validated() {
    let err = ReplicaArray::new(2, 1, vec![0.0; 5]).unwrap_err();
    assert!(matches!(err, PropsError::Domain(info) if info.code == "shape-mismatch"));
    assert_eq!(ReplicaArray::zeros(0, 1).unwrap_err().code(), "no-replicas");
    assert_eq!(ReplicaArray::zeros(1, 0).unwrap_err().code(), "no-atoms");
    assert_eq!(
        ReplicaArray::from_beads(&[vec![0.0; 3], vec![0.0; 6]])
            .unwrap_err()
            .code(),
        "shape-mismatch"
    );
}

#[test]
fn harmonic_forces_and_virial() {
    let sim = simulation(Rc::new(Harmonic { k: 2.0 }));
    // sum over beads of k/2 |q|^2 = (1 + 4) + (9 + 16) = 30
    assert_eq!(sim.forces.potential.get(), 30.0);
    let forces = sim.forces.forces.get();
    assert_eq!(forces.beads().next().unwrap(), &[-2.0, 0.0, 0.0, 0.0, -4.0, 0.0]);
    let virial = sim.forces.virial.get();
    assert_eq!(virial[(0, 0)], -2.0 * (1.0 + 9.0));
    assert_eq!(virial[(1, 1)], -2.0 * 4.0);
    assert_eq!(virial[(2, 2)], -2.0 * 16.0);
    assert_eq!(virial[(0, 1)], 0.0);
}

#[test]
fn quartic_reduces_to_harmonic() {
    let h = Matrix3::identity();
    let q = [0.3, -0.7, 1.1];
    let harmonic = Harmonic { k: 1.5 }.evaluate(&h, &q).unwrap();
    let quartic = Quartic { k: 1.5, g: 0.0 }.evaluate(&h, &q).unwrap();
    assert_eq!(harmonic, quartic);
    let stiff = Quartic { k: 1.5, g: 0.25 }.evaluate(&h, &q).unwrap();
    assert!(stiff.potential > harmonic.potential);
    assert_eq!(
        Quartic { k: 1.0, g: 1.0 }.evaluate(&h, &[1.0, 2.0]).unwrap_err().code(),
        "shape-mismatch"
    );
}

#[test]
fn refresh_follows_positions_and_bumps_versions() {
    let sim = simulation(Rc::new(Harmonic { k: 1.0 }));
    let before = sim.forces.potential.version();
    sim.beads
        .set_positions(ReplicaArray::zeros(2, 2).unwrap())
        .unwrap();
    sim.refresh_forces().unwrap();
    assert_eq!(sim.forces.potential.get(), 0.0);
    assert_eq!(sim.forces.potential.version(), before + 1);

    let err = sim
        .beads
        .set_positions(ReplicaArray::zeros(3, 2).unwrap())
        .unwrap_err();
    assert_eq!(err.code(), "shape-mismatch");
}

#[test]
fn translation_shifts_every_atom_and_keeps_the_shape() {
    let sim = simulation(Rc::new(Harmonic { k: 1.0 }));
    let version = sim.beads.positions_version();
    sim.beads.translate([1.0, -2.0, 0.5]);

    assert_eq!(sim.beads.positions_version(), version + 1);
    let q = sim.beads.positions();
    assert_eq!((q.nbeads(), q.natoms()), (2, 2));
    assert_eq!(
        q.as_slice(),
        &[2.0, -2.0, 0.5, 1.0, 0.0, 0.5, 4.0, -2.0, 0.5, 1.0, -2.0, 4.5]
    );
}

#[test]
fn cell_volume_tracks_matrix() {
    let cell = Cell::new(Matrix3::from_diagonal_element(2.0));
    assert_eq!(cell.volume.get(), 8.0);
    cell.set_matrix(Matrix3::from_diagonal_element(3.0));
    assert!((cell.volume.get() - 27.0).abs() < 1e-12);
    assert_eq!(cell.volume.version(), 1);
}

#[test]
fn accessors_are_named_after_their_sources() {
    let sim = simulation(Rc::new(Harmonic { k: 1.0 }));
    for accessor in Accessor::ALL {
        assert_eq!(sim.source(accessor).name(), accessor.name());
    }
    sim.advance();
    sim.advance();
    assert_eq!(sim.ensemble.step.get(), 2);
    assert_eq!(sim.source(Accessor::Step).version(), 2);
}

#[test]
fn accessors_serialise_by_variant() {
    assert_eq!(
        serde_json::to_value(Accessor::KineticStress).unwrap(),
        serde_json::json!("KineticStress")
    );
    let text = serde_json::to_string(&Accessor::ALL).unwrap();
    let back: Vec<Accessor> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, Accessor::ALL.to_vec());
    assert!(serde_json::from_str::<Accessor>("\"beads.q\"").is_err());
}
