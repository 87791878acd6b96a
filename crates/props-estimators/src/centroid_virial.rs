//! Displacements are measured from the replica centroid rather than from the
//! origin, which removes the large centroid contribution from the variance.

use props_core::{ensure_replicas, Matrix3, PropsError, BOLTZMANN, DIMENSIONS};
use props_sim::ReplicaArray;

/// Centroid-virial kinetic energy.
///
/// `-1/(2P) sum_b (q_b - q_c) . f_b + 3N kT / 2`
pub fn kinetic(
    positions: &ReplicaArray,
    forces: &ReplicaArray,
    temperature: f64,
) -> Result<f64, PropsError> {
    positions.ensure_same_shape(forces)?;
    let nbeads = ensure_replicas(positions.nbeads())?;
    let centroid = positions.centroid();

    let mut virial = 0.0;
    for (bead, force) in positions.beads().zip(forces.beads()) {
        virial += bead
            .iter()
            .zip(&centroid)
            .zip(force)
            .map(|((q, qc), f)| (q - qc) * f)
            .sum::<f64>();
    }
    Ok(-0.5 / nbeads * virial + equipartition(positions.natoms(), temperature))
}

/// Centroid-virial kinetic stress tensor.
///
/// Only the upper triangle (diagonal included) is filled; the lower triangle
/// stays zero. Component `(i, j)` contracts the `i` Cartesian component of
/// every atom's centroid displacement with the `j` component of its force.
pub fn kinetic_stress(
    positions: &ReplicaArray,
    forces: &ReplicaArray,
    temperature: f64,
) -> Result<Matrix3<f64>, PropsError> {
    positions.ensure_same_shape(forces)?;
    let nbeads = ensure_replicas(positions.nbeads())?;
    let centroid = positions.centroid();

    let mut kst = Matrix3::<f64>::zeros();
    for (bead, force) in positions.beads().zip(forces.beads()) {
        for i in 0..DIMENSIONS {
            for j in i..DIMENSIONS {
                let displacement = bead.iter().skip(i).step_by(DIMENSIONS);
                let reference = centroid.iter().skip(i).step_by(DIMENSIONS);
                let component = force.iter().skip(j).step_by(DIMENSIONS);
                kst[(i, j)] += displacement
                    .zip(reference)
                    .zip(component)
                    .map(|((q, qc), f)| (q - qc) * f)
                    .sum::<f64>();
            }
        }
    }

    kst *= -1.0 / nbeads;
    let thermal = BOLTZMANN * temperature * (DIMENSIONS * positions.natoms()) as f64;
    for i in 0..DIMENSIONS {
        kst[(i, i)] += thermal;
    }
    Ok(kst)
}

/// Classical equipartition term `3N kT / 2`.
pub fn equipartition(natoms: usize, temperature: f64) -> f64 {
    0.5 * BOLTZMANN * temperature * (DIMENSIONS * natoms) as f64
}
