//! Energy models of a spin lattice.
//!
//! [`Hamiltonian`] is the closed set of models the engine evaluates. Each variant
//! implements [`EnergyModel`], which only knows how to *accumulate* its energy terms;
//! size checks, zero-filling and summation live on the enum so every variant shares
//! one evaluation contract.

pub mod contribution;
pub mod gaussian;
pub mod heisenberg;
pub mod interactions;

pub use contribution::{EnergyBreakdown, EnergyContribution};
pub use gaussian::{Gaussian, GaussianTerm};
pub use heisenberg::{Heisenberg, HeisenbergBuilder};

use crate::core::geometry::GeometryError;
use nalgebra::{DMatrix, Vector3};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HamiltonianError {
    #[error("Spin configuration has {found} sites, but the model expects {expected}")]
    SizeMismatch { expected: usize, found: usize },
    #[error("Output buffer for {what} has size {found}, expected {expected}")]
    OutputMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Length of {what} ({found}) does not match the expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Invalid {what}: {reason}")]
    InvalidParameter { what: &'static str, reason: String },
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// A parameter group that only some models carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    BoundaryConditions,
    MomentMagnitude,
    ExternalField,
    Anisotropy,
    Exchange,
    Dmi,
    Dipolar,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BoundaryConditions => "Boundary conditions",
            Self::MomentMagnitude => "mu_s",
            Self::ExternalField => "External field",
            Self::Anisotropy => "Anisotropy",
            Self::Exchange => "Exchange",
            Self::Dmi => "DMI",
            Self::Dipolar => "DDI",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HamiltonianKind {
    Heisenberg,
    Gaussian,
}

/// Accumulating interface implemented by every energy model.
///
/// Implementations may assume that `spins`, `field` and `hessian` are correctly sized;
/// [`Hamiltonian`] checks this before dispatching.
pub trait EnergyModel {
    fn name(&self) -> &'static str;

    /// Energies of the active contributions, in model order.
    fn energy_contributions(&self, spins: &[Vector3<f64>]) -> EnergyBreakdown;

    /// Adds `-∂E/∂m` of every site to `field`.
    fn add_effective_field(&self, spins: &[Vector3<f64>], field: &mut [Vector3<f64>]);

    /// Adds `∂²E/∂m∂m` to the `3N × 3N` matrix `hessian`.
    fn add_hessian(&self, spins: &[Vector3<f64>], hessian: &mut DMatrix<f64>);
}

#[derive(Debug, Clone)]
pub enum Hamiltonian {
    Heisenberg(Heisenberg),
    Gaussian(Gaussian),
}

impl Hamiltonian {
    pub fn kind(&self) -> HamiltonianKind {
        match self {
            Self::Heisenberg(_) => HamiltonianKind::Heisenberg,
            Self::Gaussian(_) => HamiltonianKind::Gaussian,
        }
    }

    pub fn name(&self) -> &'static str {
        self.model().name()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match self {
            Self::Heisenberg(_) => true,
            Self::Gaussian(_) => capability == Capability::BoundaryConditions,
        }
    }

    pub fn boundary_conditions(&self) -> [bool; 3] {
        match self {
            Self::Heisenberg(h) => h.boundary_conditions(),
            Self::Gaussian(g) => g.boundary_conditions(),
        }
    }

    pub fn set_boundary_conditions(&mut self, boundary_conditions: [bool; 3]) {
        match self {
            Self::Heisenberg(h) => h.set_boundary_conditions(boundary_conditions),
            Self::Gaussian(g) => g.set_boundary_conditions(boundary_conditions),
        }
    }

    pub fn as_heisenberg(&self) -> Option<&Heisenberg> {
        match self {
            Self::Heisenberg(h) => Some(h),
            Self::Gaussian(_) => None,
        }
    }

    pub fn as_heisenberg_mut(&mut self) -> Option<&mut Heisenberg> {
        match self {
            Self::Heisenberg(h) => Some(h),
            Self::Gaussian(_) => None,
        }
    }

    pub fn as_gaussian(&self) -> Option<&Gaussian> {
        match self {
            Self::Gaussian(g) => Some(g),
            Self::Heisenberg(_) => None,
        }
    }

    fn model(&self) -> &dyn EnergyModel {
        match self {
            Self::Heisenberg(h) => h,
            Self::Gaussian(g) => g,
        }
    }

    /// Number of sites the model is bound to. The gaussian landscape has no geometry
    /// and accepts any configuration size.
    pub fn nos(&self) -> Option<usize> {
        match self {
            Self::Heisenberg(h) => Some(h.geometry().nos()),
            Self::Gaussian(_) => None,
        }
    }

    fn check_spins(&self, spins: &[Vector3<f64>]) -> Result<(), HamiltonianError> {
        match self.nos() {
            Some(nos) if spins.len() != nos => Err(HamiltonianError::SizeMismatch {
                expected: nos,
                found: spins.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Per-contribution energies of `spins`.
    pub fn energy_contributions(
        &self,
        spins: &[Vector3<f64>],
    ) -> Result<EnergyBreakdown, HamiltonianError> {
        self.check_spins(spins)?;
        Ok(self.model().energy_contributions(spins))
    }

    /// One entry per active contribution; sums to [`Hamiltonian::energy`].
    pub fn energy_array(&self, spins: &[Vector3<f64>]) -> Result<Vec<f64>, HamiltonianError> {
        Ok(self.energy_contributions(spins)?.values())
    }

    pub fn energy(&self, spins: &[Vector3<f64>]) -> Result<f64, HamiltonianError> {
        Ok(self.energy_contributions(spins)?.total())
    }

    /// Overwrites `field` with `-∂E/∂m` of every site. No tangent projection is applied.
    pub fn effective_field(
        &self,
        spins: &[Vector3<f64>],
        field: &mut [Vector3<f64>],
    ) -> Result<(), HamiltonianError> {
        self.check_spins(spins)?;
        if field.len() != spins.len() {
            return Err(HamiltonianError::OutputMismatch {
                what: "effective field",
                expected: spins.len(),
                found: field.len(),
            });
        }
        field.iter_mut().for_each(|h| *h = Vector3::zeros());
        self.model().add_effective_field(spins, field);
        Ok(())
    }

    /// Overwrites `hessian` with the dense, symmetric `3N × 3N` curvature matrix.
    pub fn hessian(
        &self,
        spins: &[Vector3<f64>],
        hessian: &mut DMatrix<f64>,
    ) -> Result<(), HamiltonianError> {
        self.check_spins(spins)?;
        let dim = 3 * spins.len();
        if hessian.shape() != (dim, dim) {
            return Err(HamiltonianError::OutputMismatch {
                what: "hessian",
                expected: dim,
                found: hessian.nrows(),
            });
        }
        hessian.fill(0.0);
        self.model().add_hessian(spins, hessian);
        Ok(())
    }
}

impl From<Heisenberg> for Hamiltonian {
    fn from(h: Heisenberg) -> Self {
        Self::Heisenberg(h)
    }
}

impl From<Gaussian> for Hamiltonian {
    fn from(g: Gaussian) -> Self {
        Self::Gaussian(g)
    }
}
