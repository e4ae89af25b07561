use super::contribution::{EnergyBreakdown, EnergyContribution};
use super::{EnergyModel, HamiltonianError};
use crate::core::manifold::{dist_greatcircle, geodesic_factors, normalize_direction};
use nalgebra::{DMatrix, Vector3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One term of a gaussian landscape on the unit sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianTerm {
    pub amplitude: f64,
    pub width: f64,
    pub center: Vector3<f64>,
}

impl GaussianTerm {
    /// Energy of a single moment, `A exp(-θ² / 2σ²)` with `θ` the geodesic distance to
    /// the center.
    #[inline]
    fn energy(&self, m: &Vector3<f64>) -> f64 {
        let theta = dist_greatcircle(m, &self.center);
        self.amplitude * (-theta * theta / (2.0 * self.width * self.width)).exp()
    }

    /// First and second derivatives of the energy with respect to `x = m · c`.
    #[inline]
    fn derivatives(&self, m: &Vector3<f64>) -> (f64, f64) {
        let (theta, g1, g2) = geodesic_factors(m.dot(&self.center));
        let sigma2 = self.width * self.width;
        let energy = self.amplitude * (-theta * theta / (2.0 * sigma2)).exp();
        let d1 = energy * g1 / sigma2;
        let d2 = energy * (g1 / sigma2).powi(2) + energy * g2 / sigma2;
        (d1, d2)
    }
}

/// Synthetic landscape without inter-site coupling: every site sees the same sum of
/// gaussians centred on points of the unit sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    boundary_conditions: [bool; 3],
    terms: Vec<GaussianTerm>,
}

impl Gaussian {
    /// Builds the landscape from parallel lists. Centers are normalised; widths must be
    /// positive.
    pub fn new(
        amplitudes: Vec<f64>,
        widths: Vec<f64>,
        centers: Vec<Vector3<f64>>,
    ) -> Result<Self, HamiltonianError> {
        if widths.len() != amplitudes.len() {
            return Err(HamiltonianError::LengthMismatch {
                what: "gaussian widths",
                expected: amplitudes.len(),
                found: widths.len(),
            });
        }
        if centers.len() != amplitudes.len() {
            return Err(HamiltonianError::LengthMismatch {
                what: "gaussian centers",
                expected: amplitudes.len(),
                found: centers.len(),
            });
        }

        let mut terms = Vec::with_capacity(amplitudes.len());
        for ((amplitude, width), center) in amplitudes.into_iter().zip(widths).zip(centers) {
            if !(width > 0.0 && width.is_finite()) {
                return Err(HamiltonianError::InvalidParameter {
                    what: "gaussian width",
                    reason: format!("must be finite and positive, got {}", width),
                });
            }
            if !amplitude.is_finite() {
                return Err(HamiltonianError::InvalidParameter {
                    what: "gaussian amplitude",
                    reason: format!("{} is not finite", amplitude),
                });
            }
            let center = normalize_direction(&center).ok_or_else(|| {
                HamiltonianError::InvalidParameter {
                    what: "gaussian center",
                    reason: "must be finite and non-zero".to_string(),
                }
            })?;
            terms.push(GaussianTerm {
                amplitude,
                width,
                center,
            });
        }

        Ok(Self {
            boundary_conditions: [false; 3],
            terms,
        })
    }

    pub fn terms(&self) -> &[GaussianTerm] {
        &self.terms
    }

    pub fn amplitudes(&self) -> Vec<f64> {
        self.terms.iter().map(|t| t.amplitude).collect()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.terms.iter().map(|t| t.width).collect()
    }

    pub fn centers(&self) -> Vec<Vector3<f64>> {
        self.terms.iter().map(|t| t.center).collect()
    }

    pub fn boundary_conditions(&self) -> [bool; 3] {
        self.boundary_conditions
    }

    /// Stored for a uniform surface; the landscape has no pairs and ignores them.
    pub fn set_boundary_conditions(&mut self, boundary_conditions: [bool; 3]) {
        self.boundary_conditions = boundary_conditions;
    }

    fn term_energy(&self, term: &GaussianTerm, spins: &[Vector3<f64>]) -> f64 {
        #[cfg(not(feature = "parallel"))]
        let iterator = spins.iter();

        #[cfg(feature = "parallel")]
        let iterator = spins.par_iter();

        iterator.map(|m| term.energy(m)).sum()
    }
}

impl EnergyModel for Gaussian {
    fn name(&self) -> &'static str {
        "Gaussian"
    }

    fn energy_contributions(&self, spins: &[Vector3<f64>]) -> EnergyBreakdown {
        self.terms
            .iter()
            .enumerate()
            .map(|(n, term)| (EnergyContribution::Gaussian(n), self.term_energy(term, spins)))
            .collect()
    }

    fn add_effective_field(&self, spins: &[Vector3<f64>], field: &mut [Vector3<f64>]) {
        let terms = &self.terms;

        #[cfg(not(feature = "parallel"))]
        let iterator = field.iter_mut().zip(spins.iter());

        #[cfg(feature = "parallel")]
        let iterator = field.par_iter_mut().zip(spins.par_iter());

        iterator.for_each(|(h, m)| {
            for term in terms {
                let (d1, _) = term.derivatives(m);
                *h -= term.center * d1;
            }
        });
    }

    fn add_hessian(&self, spins: &[Vector3<f64>], hessian: &mut DMatrix<f64>) {
        for (i, m) in spins.iter().enumerate() {
            let mut view = hessian.fixed_view_mut::<3, 3>(3 * i, 3 * i);
            for term in &self.terms {
                let (_, d2) = term.derivatives(m);
                view += term.center * term.center.transpose() * d2;
            }
        }
    }
}
