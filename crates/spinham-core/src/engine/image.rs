use super::error::EngineError;
use crate::core::geometry::Geometry;
use crate::core::hamiltonian::{EnergyBreakdown, Hamiltonian};
use crate::core::manifold::{normalize_direction, project_tangential};
use nalgebra::{DMatrix, Vector3};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error};

/// Everything an image guards behind its lock.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub spins: Vec<Vector3<f64>>,
    pub hamiltonian: Hamiltonian,
}

impl ImageData {
    /// Rebuilds derived data after a locked section panicked part-way through.
    fn recover(&mut self) {
        error!(
            model = self.hamiltonian.name(),
            "Image lock was poisoned by a panic; regenerating derived interaction data."
        );
        if let Some(heisenberg) = self.hamiltonian.as_heisenberg_mut() {
            heisenberg.update_interactions();
        }
    }
}

/// One simulation image: a spin configuration on a shared geometry together with the
/// energy model that evaluates it.
///
/// The geometry is immutable and shared between images. Spins and model are replaced
/// only under the exclusive guard returned by [`SpinImage::lock`].
#[derive(Debug)]
pub struct SpinImage {
    geometry: Arc<Geometry>,
    data: RwLock<ImageData>,
}

impl SpinImage {
    /// Creates an image in the uniform `+z` configuration.
    pub fn new(geometry: Arc<Geometry>, hamiltonian: Hamiltonian) -> Result<Self, EngineError> {
        let spins = vec![Vector3::z(); geometry.nos()];
        Self::with_spins(geometry, hamiltonian, spins)
    }

    pub fn with_spins(
        geometry: Arc<Geometry>,
        hamiltonian: Hamiltonian,
        spins: Vec<Vector3<f64>>,
    ) -> Result<Self, EngineError> {
        if let Some(nos) = hamiltonian.nos() {
            if nos != geometry.nos() {
                return Err(EngineError::InvalidInput(format!(
                    "energy model is bound to {} sites, but the geometry has {}",
                    nos,
                    geometry.nos()
                )));
            }
        }
        let spins = normalized_spins(spins, geometry.nos())?;
        debug!(
            nos = geometry.nos(),
            model = hamiltonian.name(),
            "Created spin image."
        );
        Ok(Self {
            geometry,
            data: RwLock::new(ImageData { spins, hamiltonian }),
        })
    }

    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub fn nos(&self) -> usize {
        self.geometry.nos()
    }

    /// Exclusive access for mutations and for solver steps that must not interleave
    /// with them.
    ///
    /// A lock poisoned by a panicking holder is recovered: derived data is regenerated
    /// from the parameters and the poison is cleared.
    pub fn lock(&self) -> RwLockWriteGuard<'_, ImageData> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                guard.recover();
                self.data.clear_poison();
                guard
            }
        }
    }

    /// Shared access; never observes a mutation half-applied.
    pub fn read(&self) -> RwLockReadGuard<'_, ImageData> {
        if self.data.is_poisoned() {
            drop(self.lock());
        }
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the spin configuration, renormalising every moment.
    pub fn set_spins(&self, spins: Vec<Vector3<f64>>) -> Result<(), EngineError> {
        let spins = normalized_spins(spins, self.nos())?;
        self.lock().spins = spins;
        Ok(())
    }

    pub fn energy(&self) -> Result<f64, EngineError> {
        let data = self.read();
        Ok(data.hamiltonian.energy(&data.spins)?)
    }

    pub fn energy_contributions(&self) -> Result<EnergyBreakdown, EngineError> {
        let data = self.read();
        Ok(data.hamiltonian.energy_contributions(&data.spins)?)
    }

    pub fn effective_field(&self) -> Result<Vec<Vector3<f64>>, EngineError> {
        let data = self.read();
        let mut field = vec![Vector3::zeros(); data.spins.len()];
        data.hamiltonian.effective_field(&data.spins, &mut field)?;
        Ok(field)
    }

    /// Effective field with the component along each spin removed; the part that
    /// rotates the spins.
    pub fn tangent_field(&self) -> Result<Vec<Vector3<f64>>, EngineError> {
        let data = self.read();
        let mut field = vec![Vector3::zeros(); data.spins.len()];
        data.hamiltonian.effective_field(&data.spins, &mut field)?;
        project_tangential(&mut field, &data.spins);
        Ok(field)
    }

    pub fn hessian(&self) -> Result<DMatrix<f64>, EngineError> {
        let data = self.read();
        let dim = 3 * data.spins.len();
        let mut hessian = DMatrix::zeros(dim, dim);
        data.hamiltonian.hessian(&data.spins, &mut hessian)?;
        Ok(hessian)
    }
}

fn normalized_spins(
    spins: Vec<Vector3<f64>>,
    nos: usize,
) -> Result<Vec<Vector3<f64>>, EngineError> {
    if spins.len() != nos {
        return Err(EngineError::InvalidInput(format!(
            "expected {} spins, got {}",
            nos,
            spins.len()
        )));
    }
    spins
        .iter()
        .enumerate()
        .map(|(i, m)| {
            normalize_direction(m).ok_or_else(|| {
                EngineError::InvalidInput(format!("spin {} has no direction", i))
            })
        })
        .collect()
}
