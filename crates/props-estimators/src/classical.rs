use props_core::{
    ensure_positive_volume, ensure_replicas, matrix_to_lattice, ErrorInfo, Matrix3, PropsError,
    BOLTZMANN, DIMENSIONS,
};

/// Elapsed simulation time after `step` completed steps.
pub fn elapsed_time(step: u64, timestep: f64) -> f64 {
    (1 + step) as f64 * timestep
}

/// Normalises a replica-summed quantity to a per-replica value.
pub fn per_replica(total: f64, nbeads: usize) -> Result<f64, PropsError> {
    Ok(total / ensure_replicas(nbeads)?)
}

/// Degrees of freedom of the ring-polymer system.
pub fn degrees_of_freedom(natoms: usize, nbeads: usize, fixcom: bool) -> usize {
    let total = DIMENSIONS * natoms * nbeads;
    if fixcom {
        total.saturating_sub(DIMENSIONS)
    } else {
        total
    }
}

/// Kinetic temperature from the replica-summed classical kinetic energy.
pub fn temperature(
    kinetic: f64,
    natoms: usize,
    nbeads: usize,
    fixcom: bool,
) -> Result<f64, PropsError> {
    let nbeads_f = ensure_replicas(nbeads)?;
    let dof = degrees_of_freedom(natoms, nbeads, fixcom);
    if dof == 0 {
        return Err(PropsError::Domain(
            ErrorInfo::new("zero-degrees-of-freedom", "system has no kinetic degrees of freedom")
                .with_context("natoms", natoms)
                .with_context("nbeads", nbeads)
                .with_context("fixcom", fixcom),
        ));
    }
    Ok(kinetic / (0.5 * BOLTZMANN * dof as f64 * nbeads_f))
}

/// Lattice parameters `[a, b, c, alpha, beta, gamma]` of the cell.
pub fn cell_parameters(h: &Matrix3<f64>) -> Result<Vec<f64>, PropsError> {
    Ok(matrix_to_lattice(h)?.to_array().to_vec())
}

/// Stress tensor `(virial + kinetic_stress) / volume`.
pub fn stress(
    virial: &Matrix3<f64>,
    kinetic_stress: &Matrix3<f64>,
    volume: f64,
) -> Result<Matrix3<f64>, PropsError> {
    let volume = ensure_positive_volume(volume)?;
    Ok((virial + kinetic_stress) / volume)
}

/// Pressure as a third of the stress trace.
pub fn pressure(stress: &Matrix3<f64>) -> f64 {
    stress.trace() / 3.0
}
