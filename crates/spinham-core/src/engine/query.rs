//! Read-only access to the parameters of an image's energy model.
//!
//! Getters take the image's shared guard, so they see either the state before or after
//! a concurrent mutation. Parameters a model does not carry are reported as neutral
//! defaults.

use super::error::EngineError;
use super::image::SpinImage;
use crate::core::constants::MU_B;
use crate::core::geometry::Pair;
use crate::core::hamiltonian::Heisenberg;
use nalgebra::Vector3;

fn read_heisenberg<T>(
    image: &SpinImage,
    default: T,
    f: impl FnOnce(&Heisenberg) -> T,
) -> Result<T, EngineError> {
    let data = image.read();
    Ok(data.hamiltonian.as_heisenberg().map_or(default, f))
}

pub fn name(image: &SpinImage) -> Result<&'static str, EngineError> {
    Ok(image.read().hamiltonian.name())
}

pub fn boundary_conditions(image: &SpinImage) -> Result<[bool; 3], EngineError> {
    Ok(image.read().hamiltonian.boundary_conditions())
}

/// Moment magnitudes of the atoms of the first cell.
pub fn mu_s(image: &SpinImage) -> Result<Vec<f64>, EngineError> {
    let n_cell_atoms = image.geometry().n_cell_atoms();
    read_heisenberg(image, Vec::new(), |h| {
        h.mu_s().iter().take(n_cell_atoms).copied().collect()
    })
}

/// External field magnitude in Tesla and its direction; `(0, ẑ)` when there is none.
pub fn field(image: &SpinImage) -> Result<(f64, Vector3<f64>), EngineError> {
    read_heisenberg(image, (0.0, Vector3::z()), |h| {
        if h.external_field_magnitude() > 0.0 {
            (
                h.external_field_magnitude() / MU_B,
                *h.external_field_normal(),
            )
        } else {
            (0.0, Vector3::z())
        }
    })
}

/// Anisotropy of the first anisotropic atom; `(0, ẑ)` when there is none.
pub fn anisotropy(image: &SpinImage) -> Result<(f64, Vector3<f64>), EngineError> {
    read_heisenberg(image, (0.0, Vector3::z()), |h| {
        match (h.anisotropy_magnitudes().first(), h.anisotropy_normals().first()) {
            (Some(&k), Some(&normal)) => (k, normal),
            _ => (0.0, Vector3::z()),
        }
    })
}

/// Exchange shell magnitudes; their count is the number of shells.
pub fn exchange_shells(image: &SpinImage) -> Result<Vec<f64>, EngineError> {
    read_heisenberg(image, Vec::new(), |h| h.exchange_shell_magnitudes().to_vec())
}

/// DMI shell magnitudes and chirality.
pub fn dmi_shells(image: &SpinImage) -> Result<(Vec<f64>, i32), EngineError> {
    read_heisenberg(image, (Vec::new(), 1), |h| {
        (h.dmi_shell_magnitudes().to_vec(), h.dmi_shell_chirality())
    })
}

/// Dipolar cutoff radius in Å.
pub fn ddi_cutoff(image: &SpinImage) -> Result<f64, EngineError> {
    read_heisenberg(image, 0.0, |h| h.ddi_cutoff_radius())
}

pub fn exchange_n_pairs(_image: &SpinImage) -> Result<usize, EngineError> {
    Err(EngineError::NotImplemented("fetching exchange pairs"))
}

pub fn exchange_pairs(_image: &SpinImage) -> Result<Vec<(Pair, f64)>, EngineError> {
    Err(EngineError::NotImplemented("fetching exchange pairs"))
}

pub fn dmi_n_pairs(_image: &SpinImage) -> Result<usize, EngineError> {
    Err(EngineError::NotImplemented("fetching DMI pairs"))
}
