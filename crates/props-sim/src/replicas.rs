use props_core::{ErrorInfo, PropsError, DIMENSIONS};

/// Per-replica Cartesian arrays (positions or forces), stored bead-major.
///
/// Bead `b` occupies `data[b * 3 * natoms..(b + 1) * 3 * natoms]`, with atom
/// `a` at offsets `3a, 3a + 1, 3a + 2` inside its bead.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaArray {
    nbeads: usize,
    natoms: usize,
    data: Vec<f64>,
}

impl ReplicaArray {
    /// Wraps a flat buffer, checking it holds `nbeads * 3 * natoms` entries.
    pub fn new(nbeads: usize, natoms: usize, data: Vec<f64>) -> Result<Self, PropsError> {
        if nbeads == 0 {
            return Err(PropsError::domain(
                "no-replicas",
                "replica ensemble must contain at least one bead",
            ));
        }
        if natoms == 0 {
            return Err(PropsError::domain("no-atoms", "replicas must contain atoms"));
        }
        let expected = nbeads * DIMENSIONS * natoms;
        if data.len() != expected {
            return Err(PropsError::Domain(
                ErrorInfo::new("shape-mismatch", "buffer length does not match replica shape")
                    .with_context("expected", expected)
                    .with_context("found", data.len()),
            ));
        }
        Ok(Self {
            nbeads,
            natoms,
            data,
        })
    }

    /// Zero-filled array of the given shape.
    pub fn zeros(nbeads: usize, natoms: usize) -> Result<Self, PropsError> {
        Self::new(nbeads, natoms, vec![0.0; nbeads * DIMENSIONS * natoms])
    }

    /// Builds an array from one flat coordinate list per bead.
    pub fn from_beads(beads: &[Vec<f64>]) -> Result<Self, PropsError> {
        let ncoords = beads.first().map(Vec::len).unwrap_or(0);
        if ncoords % DIMENSIONS != 0 || beads.iter().any(|bead| bead.len() != ncoords) {
            return Err(PropsError::Domain(
                ErrorInfo::new("shape-mismatch", "beads must share a length divisible by 3")
                    .with_context("coordinates", ncoords),
            ));
        }
        Self::new(beads.len(), ncoords / DIMENSIONS, beads.concat())
    }

    /// Number of replicas.
    pub fn nbeads(&self) -> usize {
        self.nbeads
    }

    /// Number of atoms per replica.
    pub fn natoms(&self) -> usize {
        self.natoms
    }

    /// Number of coordinates per replica (`3 * natoms`).
    pub fn ncoords(&self) -> usize {
        DIMENSIONS * self.natoms
    }

    /// Flat view of every replica.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterates replicas in order.
    pub fn beads(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.ncoords())
    }

    /// Iterates replicas mutably in order.
    pub fn beads_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        let ncoords = self.ncoords();
        self.data.chunks_exact_mut(ncoords)
    }

    /// Per-coordinate mean over replicas.
    pub fn centroid(&self) -> Vec<f64> {
        let mut centroid = vec![0.0; self.ncoords()];
        for bead in self.beads() {
            for (acc, x) in centroid.iter_mut().zip(bead) {
                *acc += x;
            }
        }
        let scale = 1.0 / self.nbeads as f64;
        centroid.iter_mut().for_each(|x| *x *= scale);
        centroid
    }

    /// Fails with `shape-mismatch` unless `other` has the same bead and atom counts.
    pub fn ensure_same_shape(&self, other: &ReplicaArray) -> Result<(), PropsError> {
        if self.nbeads == other.nbeads && self.natoms == other.natoms {
            return Ok(());
        }
        Err(PropsError::Domain(
            ErrorInfo::new("shape-mismatch", "replica arrays have different shapes")
                .with_context("left", format!("{}x{}", self.nbeads, self.natoms))
                .with_context("right", format!("{}x{}", other.nbeads, other.natoms)),
        ))
    }
}
