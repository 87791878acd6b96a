#![allow(dead_code)]

use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use props_core::Matrix3;
use props_registry::{Properties, PropertiesConfig};
use props_sim::{Beads, Cell, Ensemble, ForceModel, Harmonic, ReplicaArray, Simulation};

pub const NBEADS: usize = 4;
pub const NATOMS: usize = 2;

pub fn positions() -> ReplicaArray {
    ReplicaArray::from_beads(&[
        vec![0.30, -0.10, 0.20, 1.10, 0.90, -0.40],
        vec![0.45, 0.05, 0.10, 0.95, 1.20, -0.25],
        vec![0.20, 0.15, 0.35, 1.25, 1.05, -0.55],
        vec![0.35, -0.20, 0.25, 1.00, 0.85, -0.30],
    ])
    .unwrap()
}

pub fn cell_matrix() -> Matrix3<f64> {
    Matrix3::new(10.0, 0.0, 0.0, 0.0, 12.0, 0.0, 0.0, 0.0, 14.0)
}

pub fn simulation_with(model: Rc<dyn ForceModel>, fixcom: bool) -> Simulation {
    let ensemble = Ensemble::new(0.5, 0.25, fixcom);
    let beads = Beads::new(positions());
    beads.kinetic.set(10.0);
    beads
        .kinetic_stress
        .set(Matrix3::new(3.0, 0.2, 0.1, 0.2, 2.5, 0.3, 0.1, 0.3, 2.0));
    ensemble.conserved.set(-8.0);
    Simulation::new(ensemble, beads, Cell::new(cell_matrix()), model).unwrap()
}

pub fn simulation() -> Simulation {
    simulation_with(Rc::new(Harmonic { k: 1.3 }), false)
}

pub fn bound(sim: &Simulation) -> Properties {
    Properties::bind(sim, &PropertiesConfig::default()).unwrap()
}

#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `body` with a fmt subscriber writing into a buffer and returns the
/// captured text.
pub fn capture_logs<R>(level: tracing::Level, body: impl FnOnce() -> R) -> (R, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(level)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, body);
    let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (result, text)
}
