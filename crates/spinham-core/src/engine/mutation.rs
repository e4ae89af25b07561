//! Locked setters for the parameters of an image's energy model.
//!
//! Every setter holds the image's exclusive guard from the capability check until the
//! derived data is recomputed. Setters that the model does not support leave it
//! untouched and report [`MutationOutcome::Unsupported`]; invalid input is rejected with
//! [`EngineError::InvalidInput`] before anything is written.

use super::error::EngineError;
use super::image::SpinImage;
use crate::core::constants::MU_B;
use crate::core::hamiltonian::{Capability, HamiltonianError, Heisenberg};
use nalgebra::Vector3;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied { notice: String },
    Unsupported { notice: String },
}

impl MutationOutcome {
    pub fn notice(&self) -> &str {
        match self {
            Self::Applied { notice } | Self::Unsupported { notice } => notice,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

fn invalid_input(error: HamiltonianError) -> EngineError {
    EngineError::InvalidInput(error.to_string())
}

fn mutate_heisenberg<F>(
    image: &SpinImage,
    capability: Capability,
    apply: F,
) -> Result<MutationOutcome, EngineError>
where
    F: FnOnce(&mut Heisenberg) -> Result<String, HamiltonianError>,
{
    let mut data = image.lock();
    let name = data.hamiltonian.name();
    let unsupported = || MutationOutcome::Unsupported {
        notice: format!("{} cannot be set on {}", capability, name),
    };
    if !data.hamiltonian.supports(capability) {
        return Ok(unsupported());
    }
    match data.hamiltonian.as_heisenberg_mut() {
        Some(heisenberg) => {
            let notice = apply(heisenberg).map_err(invalid_input)?;
            debug!(
                contributions = ?heisenberg.energy_contribution_list(),
                "Installed {}.",
                capability
            );
            Ok(MutationOutcome::Applied { notice })
        }
        None => Ok(unsupported()),
    }
}

fn shell_magnitudes(n_shells: usize, magnitudes: &[f64]) -> Result<Vec<f64>, EngineError> {
    magnitudes
        .get(..n_shells)
        .map(<[f64]>::to_vec)
        .ok_or_else(|| {
            EngineError::InvalidInput(format!(
                "{} shells requested, but only {} magnitudes given",
                n_shells,
                magnitudes.len()
            ))
        })
}

/// Sets the periodicity of each axis. Every model stores boundary conditions.
pub fn set_boundary_conditions(
    image: &SpinImage,
    periodical: [bool; 3],
) -> Result<MutationOutcome, EngineError> {
    let mut data = image.lock();
    data.hamiltonian.set_boundary_conditions(periodical);
    Ok(MutationOutcome::Applied {
        notice: format!(
            "Set boundary conditions to {} {} {}",
            periodical[0], periodical[1], periodical[2]
        ),
    })
}

/// Sets the moment magnitude of every site, in Bohr magnetons.
pub fn set_mu_s(image: &SpinImage, mu_s: f64) -> Result<MutationOutcome, EngineError> {
    mutate_heisenberg(image, Capability::MomentMagnitude, |h| {
        h.set_mu_s(mu_s)?;
        Ok(format!("Set mu_s to {}", mu_s))
    })
}

/// Sets the external field. `magnitude` is in Tesla; `normal` is renormalised.
pub fn set_field(
    image: &SpinImage,
    magnitude: f64,
    normal: &Vector3<f64>,
) -> Result<MutationOutcome, EngineError> {
    mutate_heisenberg(image, Capability::ExternalField, |h| {
        h.set_external_field(magnitude * MU_B, normal)?;
        Ok(format!(
            "Set external field to {}, direction ({}, {}, {})",
            magnitude, normal.x, normal.y, normal.z
        ))
    })
}

/// Installs the same uniaxial anisotropy on every atom of the unit cell.
pub fn set_anisotropy(
    image: &SpinImage,
    magnitude: f64,
    normal: &Vector3<f64>,
) -> Result<MutationOutcome, EngineError> {
    let n_cell_atoms = image.geometry().n_cell_atoms();
    mutate_heisenberg(image, Capability::Anisotropy, |h| {
        h.set_anisotropy(
            (0..n_cell_atoms).collect(),
            vec![magnitude; n_cell_atoms],
            vec![*normal; n_cell_atoms],
        )?;
        Ok(format!(
            "Set anisotropy to {}, direction ({}, {}, {})",
            magnitude, normal.x, normal.y, normal.z
        ))
    })
}

/// Replaces the exchange interaction by the first `n_shells` shell magnitudes.
pub fn set_exchange(
    image: &SpinImage,
    n_shells: usize,
    jij: &[f64],
) -> Result<MutationOutcome, EngineError> {
    let magnitudes = shell_magnitudes(n_shells, jij)?;
    mutate_heisenberg(image, Capability::Exchange, |h| {
        let mut notice = format!("Set exchange to {} shells", n_shells);
        if let Some(j0) = magnitudes.first() {
            notice.push_str(&format!(" Jij[0] = {}", j0));
        }
        h.set_exchange_shells(magnitudes)?;
        Ok(notice)
    })
}

/// Replaces the DMI by the first `n_shells` shell magnitudes with the given chirality.
pub fn set_dmi(
    image: &SpinImage,
    n_shells: usize,
    dij: &[f64],
    chirality: i32,
) -> Result<MutationOutcome, EngineError> {
    let magnitudes = shell_magnitudes(n_shells, dij)?;
    mutate_heisenberg(image, Capability::Dmi, |h| {
        let mut notice = format!("Set dmi to {} shells", n_shells);
        if let Some(d0) = magnitudes.first() {
            notice.push_str(&format!(" Dij[0] = {}", d0));
        }
        h.set_dmi_shells(magnitudes, chirality)?;
        Ok(notice)
    })
}

/// Sets the dipolar cutoff radius in Å and regenerates the dipolar pairs.
pub fn set_ddi(image: &SpinImage, radius: f64) -> Result<MutationOutcome, EngineError> {
    mutate_heisenberg(image, Capability::Dipolar, |h| {
        h.set_ddi_cutoff(radius)?;
        Ok(format!("Set ddi radius to {}", radius))
    })
}
