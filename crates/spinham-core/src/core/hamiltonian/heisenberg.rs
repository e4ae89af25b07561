use super::contribution::{EnergyBreakdown, EnergyContribution};
use super::interactions;
use super::{EnergyModel, HamiltonianError};
use crate::core::constants::MU_B;
use crate::core::geometry::{
    Geometry, Pair, check_search_radius, ddi_from_pair, dmi_normal_from_pair,
    neighbours_in_shells, pairs_in_radius, shell_search_radius,
};
use crate::core::manifold::normalize_direction;
use nalgebra::{DMatrix, Matrix3, Vector3};
use std::sync::Arc;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Classical Heisenberg model with Zeeman, uniaxial anisotropy, exchange, DMI and
/// dipole-dipole terms.
///
/// Exchange and DMI are parametrised either by neighbour-shell magnitudes or by an
/// explicit pair list; an explicit list takes precedence. The pair lists the energy is
/// evaluated on (`exchange_pairs`, `dmi_pairs`, `ddi_pairs`) are derived data and are
/// regenerated in full whenever their generating parameters change.
#[derive(Debug, Clone)]
pub struct Heisenberg {
    geometry: Arc<Geometry>,
    boundary_conditions: [bool; 3],

    mu_s: Vec<f64>,

    external_field_magnitude: f64,
    external_field_normal: Vector3<f64>,

    anisotropy_indices: Vec<usize>,
    anisotropy_magnitudes: Vec<f64>,
    anisotropy_normals: Vec<Vector3<f64>>,

    exchange_shell_magnitudes: Vec<f64>,
    exchange_pairs_in: Vec<Pair>,
    exchange_magnitudes_in: Vec<f64>,
    exchange_pairs: Vec<Pair>,
    exchange_magnitudes: Vec<f64>,

    dmi_shell_magnitudes: Vec<f64>,
    dmi_shell_chirality: i32,
    dmi_pairs_in: Vec<Pair>,
    dmi_magnitudes_in: Vec<f64>,
    dmi_normals_in: Vec<Vector3<f64>>,
    dmi_pairs: Vec<Pair>,
    dmi_magnitudes: Vec<f64>,
    dmi_normals: Vec<Vector3<f64>>,

    ddi_cutoff_radius: f64,
    ddi_pairs: Vec<Pair>,
    ddi_magnitudes: Vec<f64>,
    ddi_normals: Vec<Vector3<f64>>,

    energy_contributions: Vec<EnergyContribution>,
}

impl Heisenberg {
    pub fn builder() -> HeisenbergBuilder {
        HeisenbergBuilder::new()
    }

    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub fn boundary_conditions(&self) -> [bool; 3] {
        self.boundary_conditions
    }

    pub fn set_boundary_conditions(&mut self, boundary_conditions: [bool; 3]) {
        self.boundary_conditions = boundary_conditions;
    }

    // --- Moment magnitude ---

    /// Moment magnitude of every site, in Bohr magnetons.
    pub fn mu_s(&self) -> &[f64] {
        &self.mu_s
    }

    pub fn set_mu_s(&mut self, mu_s: f64) -> Result<(), HamiltonianError> {
        check_finite("mu_s", mu_s)?;
        self.mu_s.iter_mut().for_each(|m| *m = mu_s);
        Ok(())
    }

    // --- External field ---

    /// Zeeman energy scale `B·μB` in meV per Bohr magneton.
    pub fn external_field_magnitude(&self) -> f64 {
        self.external_field_magnitude
    }

    pub fn external_field_normal(&self) -> &Vector3<f64> {
        &self.external_field_normal
    }

    /// Installs an external field given as an energy scale in meV per Bohr magneton
    /// and a direction, which is renormalised.
    pub fn set_external_field(
        &mut self,
        magnitude: f64,
        normal: &Vector3<f64>,
    ) -> Result<(), HamiltonianError> {
        check_finite("external field magnitude", magnitude)?;
        self.external_field_normal = unit_direction("external field normal", normal)?;
        self.external_field_magnitude = magnitude;
        self.update_energy_contributions();
        Ok(())
    }

    // --- Anisotropy ---

    pub fn anisotropy_indices(&self) -> &[usize] {
        &self.anisotropy_indices
    }

    pub fn anisotropy_magnitudes(&self) -> &[f64] {
        &self.anisotropy_magnitudes
    }

    pub fn anisotropy_normals(&self) -> &[Vector3<f64>] {
        &self.anisotropy_normals
    }

    /// Installs uniaxial anisotropy on the given cell atoms. Applies in every cell.
    pub fn set_anisotropy(
        &mut self,
        indices: Vec<usize>,
        magnitudes: Vec<f64>,
        normals: Vec<Vector3<f64>>,
    ) -> Result<(), HamiltonianError> {
        check_length("anisotropy magnitudes", indices.len(), magnitudes.len())?;
        check_length("anisotropy normals", indices.len(), normals.len())?;
        let n_cell_atoms = self.geometry.n_cell_atoms();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n_cell_atoms) {
            return Err(HamiltonianError::InvalidParameter {
                what: "anisotropy index",
                reason: format!("cell atom {} does not exist ({} per cell)", bad, n_cell_atoms),
            });
        }
        for &k in &magnitudes {
            check_finite("anisotropy magnitude", k)?;
        }
        let normals = normals
            .iter()
            .map(|n| unit_direction("anisotropy normal", n))
            .collect::<Result<Vec<_>, _>>()?;

        self.anisotropy_indices = indices;
        self.anisotropy_magnitudes = magnitudes;
        self.anisotropy_normals = normals;
        self.update_energy_contributions();
        Ok(())
    }

    // --- Exchange ---

    pub fn exchange_shell_magnitudes(&self) -> &[f64] {
        &self.exchange_shell_magnitudes
    }

    pub fn exchange_pairs(&self) -> &[Pair] {
        &self.exchange_pairs
    }

    pub fn exchange_magnitudes(&self) -> &[f64] {
        &self.exchange_magnitudes
    }

    /// Replaces the exchange interaction by shell magnitudes, discarding any explicit
    /// pair list, and regenerates the exchange pairs.
    pub fn set_exchange_shells(&mut self, magnitudes: Vec<f64>) -> Result<(), HamiltonianError> {
        for &j in &magnitudes {
            check_finite("exchange magnitude", j)?;
        }
        self.check_shell_count(magnitudes.len())?;
        self.exchange_shell_magnitudes = magnitudes;
        self.exchange_pairs_in.clear();
        self.exchange_magnitudes_in.clear();
        self.update_exchange_pairs();
        self.update_energy_contributions();
        Ok(())
    }

    /// Installs an explicit exchange pair list, which overrides the shell magnitudes.
    pub fn set_exchange_pairs(
        &mut self,
        pairs: Vec<Pair>,
        magnitudes: Vec<f64>,
    ) -> Result<(), HamiltonianError> {
        check_length("exchange magnitudes", pairs.len(), magnitudes.len())?;
        self.check_pairs(&pairs)?;
        self.exchange_pairs_in = pairs;
        self.exchange_magnitudes_in = magnitudes;
        self.update_exchange_pairs();
        self.update_energy_contributions();
        Ok(())
    }

    // --- DMI ---

    pub fn dmi_shell_magnitudes(&self) -> &[f64] {
        &self.dmi_shell_magnitudes
    }

    pub fn dmi_shell_chirality(&self) -> i32 {
        self.dmi_shell_chirality
    }

    pub fn dmi_pairs(&self) -> &[Pair] {
        &self.dmi_pairs
    }

    pub fn dmi_magnitudes(&self) -> &[f64] {
        &self.dmi_magnitudes
    }

    pub fn dmi_normals(&self) -> &[Vector3<f64>] {
        &self.dmi_normals
    }

    /// Replaces the DMI by shell magnitudes with the given chirality sign, discarding
    /// any explicit pair list, and regenerates the DMI pairs.
    pub fn set_dmi_shells(
        &mut self,
        magnitudes: Vec<f64>,
        chirality: i32,
    ) -> Result<(), HamiltonianError> {
        if chirality == 0 {
            return Err(HamiltonianError::InvalidParameter {
                what: "DMI chirality",
                reason: "must be +1 or -1".to_string(),
            });
        }
        for &d in &magnitudes {
            check_finite("DMI magnitude", d)?;
        }
        self.check_shell_count(magnitudes.len())?;
        self.dmi_shell_magnitudes = magnitudes;
        self.dmi_shell_chirality = chirality.signum();
        self.dmi_pairs_in.clear();
        self.dmi_magnitudes_in.clear();
        self.dmi_normals_in.clear();
        self.update_dmi_pairs();
        self.update_energy_contributions();
        Ok(())
    }

    /// Installs an explicit DMI pair list, which overrides the shell magnitudes.
    pub fn set_dmi_pairs(
        &mut self,
        pairs: Vec<Pair>,
        magnitudes: Vec<f64>,
        normals: Vec<Vector3<f64>>,
    ) -> Result<(), HamiltonianError> {
        check_length("DMI magnitudes", pairs.len(), magnitudes.len())?;
        check_length("DMI normals", pairs.len(), normals.len())?;
        self.check_pairs(&pairs)?;
        let normals = normals
            .iter()
            .map(|n| unit_direction("DMI normal", n))
            .collect::<Result<Vec<_>, _>>()?;
        self.dmi_pairs_in = pairs;
        self.dmi_magnitudes_in = magnitudes;
        self.dmi_normals_in = normals;
        self.update_dmi_pairs();
        self.update_energy_contributions();
        Ok(())
    }

    // --- Dipolar ---

    pub fn ddi_cutoff_radius(&self) -> f64 {
        self.ddi_cutoff_radius
    }

    pub fn ddi_pairs(&self) -> &[Pair] {
        &self.ddi_pairs
    }

    pub fn ddi_magnitudes(&self) -> &[f64] {
        &self.ddi_magnitudes
    }

    pub fn ddi_normals(&self) -> &[Vector3<f64>] {
        &self.ddi_normals
    }

    /// Sets the dipolar cutoff radius in Å and regenerates the dipolar pairs.
    /// A non-positive radius disables the interaction. Radii that are not finite, or
    /// whose pair search would be unbounded, are rejected.
    pub fn set_ddi_cutoff(&mut self, radius: f64) -> Result<(), HamiltonianError> {
        check_finite("DDI cutoff radius", radius)?;
        if radius > 0.0 {
            check_search_radius(&self.geometry, radius)?;
        }
        self.ddi_cutoff_radius = radius;
        self.update_ddi_pairs();
        self.update_energy_contributions();
        Ok(())
    }

    // --- Derived data ---

    /// Contributions that are currently non-trivial, in evaluation order.
    pub fn energy_contribution_list(&self) -> &[EnergyContribution] {
        &self.energy_contributions
    }

    /// Regenerates every derived pair list from its generating parameters and
    /// refreshes the list of active contributions.
    pub fn update_interactions(&mut self) {
        self.update_exchange_pairs();
        self.update_dmi_pairs();
        self.update_ddi_pairs();
        self.update_energy_contributions();
    }

    pub fn update_energy_contributions(&mut self) {
        let mut contributions = Vec::with_capacity(5);
        if self.external_field_magnitude > 0.0 {
            contributions.push(EnergyContribution::Zeeman);
        }
        if !self.anisotropy_indices.is_empty() {
            contributions.push(EnergyContribution::Anisotropy);
        }
        if !self.exchange_pairs.is_empty() {
            contributions.push(EnergyContribution::Exchange);
        }
        if !self.dmi_pairs.is_empty() {
            contributions.push(EnergyContribution::Dmi);
        }
        if !self.ddi_pairs.is_empty() {
            contributions.push(EnergyContribution::Ddi);
        }
        debug!(?contributions, "Updated active energy contributions.");
        self.energy_contributions = contributions;
    }

    #[instrument(skip_all, level = "debug")]
    fn update_exchange_pairs(&mut self) {
        if !self.exchange_pairs_in.is_empty() {
            self.exchange_pairs = self.exchange_pairs_in.clone();
            self.exchange_magnitudes = self.exchange_magnitudes_in.clone();
            return;
        }
        let shells = neighbours_in_shells(&self.geometry, self.exchange_shell_magnitudes.len());
        let (pairs, magnitudes): (Vec<Pair>, Vec<f64>) = shells
            .into_iter()
            .map(|(pair, shell)| (pair, self.exchange_shell_magnitudes[shell]))
            .unzip();
        self.exchange_pairs = pairs;
        self.exchange_magnitudes = magnitudes;
    }

    #[instrument(skip_all, level = "debug")]
    fn update_dmi_pairs(&mut self) {
        if !self.dmi_pairs_in.is_empty() {
            self.dmi_pairs = self.dmi_pairs_in.clone();
            self.dmi_magnitudes = self.dmi_magnitudes_in.clone();
            self.dmi_normals = self.dmi_normals_in.clone();
            return;
        }
        let shells = neighbours_in_shells(&self.geometry, self.dmi_shell_magnitudes.len());
        self.dmi_pairs = Vec::with_capacity(shells.len());
        self.dmi_magnitudes = Vec::with_capacity(shells.len());
        self.dmi_normals = Vec::with_capacity(shells.len());
        for (pair, shell) in shells {
            self.dmi_normals.push(dmi_normal_from_pair(
                &self.geometry,
                &pair,
                self.dmi_shell_chirality,
            ));
            self.dmi_magnitudes.push(self.dmi_shell_magnitudes[shell]);
            self.dmi_pairs.push(pair);
        }
    }

    #[instrument(skip_all, level = "debug")]
    fn update_ddi_pairs(&mut self) {
        let pairs = pairs_in_radius(&self.geometry, self.ddi_cutoff_radius);
        let (magnitudes, normals): (Vec<f64>, Vec<Vector3<f64>>) = pairs
            .iter()
            .map(|pair| ddi_from_pair(&self.geometry, pair))
            .unzip();
        self.ddi_pairs = pairs;
        self.ddi_magnitudes = magnitudes;
        self.ddi_normals = normals;
    }

    fn check_shell_count(&self, n_shells: usize) -> Result<(), HamiltonianError> {
        let radius = shell_search_radius(&self.geometry, n_shells);
        Ok(check_search_radius(&self.geometry, radius)?)
    }

    fn check_pairs(&self, pairs: &[Pair]) -> Result<(), HamiltonianError> {
        let n_cell_atoms = self.geometry.n_cell_atoms();
        match pairs
            .iter()
            .find(|p| p.i >= n_cell_atoms || p.j >= n_cell_atoms)
        {
            Some(bad) => Err(HamiltonianError::InvalidParameter {
                what: "pair",
                reason: format!(
                    "{:?} references a cell atom beyond {} per cell",
                    bad, n_cell_atoms
                ),
            }),
            None => Ok(()),
        }
    }

    // --- Per-contribution evaluation ---

    fn energy_zeeman(&self, spins: &[Vector3<f64>]) -> f64 {
        let magnitude = self.external_field_magnitude;
        let normal = &self.external_field_normal;

        #[cfg(not(feature = "parallel"))]
        let iterator = spins.iter().zip(self.mu_s.iter());

        #[cfg(feature = "parallel")]
        let iterator = spins.par_iter().zip(self.mu_s.par_iter());

        iterator
            .map(|(m, &mu)| interactions::zeeman_energy(mu, magnitude, normal, m))
            .sum()
    }

    fn energy_anisotropy(&self, spins: &[Vector3<f64>]) -> f64 {
        let mut energy = 0.0;
        for cell in self.geometry.cells() {
            for ((&ibasis, &k), axis) in self
                .anisotropy_indices
                .iter()
                .zip(&self.anisotropy_magnitudes)
                .zip(&self.anisotropy_normals)
            {
                let idx = self.geometry.site_index(cell, ibasis);
                energy += interactions::anisotropy_energy(k, axis, &spins[idx]);
            }
        }
        energy
    }

    fn energy_exchange(&self, spins: &[Vector3<f64>]) -> f64 {
        let mut energy = 0.0;
        for (pair, &j) in self.exchange_pairs.iter().zip(&self.exchange_magnitudes) {
            for (s, t) in self.geometry.pair_sites(pair, &self.boundary_conditions) {
                energy += interactions::exchange_energy(j, &spins[s], &spins[t]);
            }
        }
        energy
    }

    fn energy_dmi(&self, spins: &[Vector3<f64>]) -> f64 {
        let mut energy = 0.0;
        for ((pair, &d), normal) in self
            .dmi_pairs
            .iter()
            .zip(&self.dmi_magnitudes)
            .zip(&self.dmi_normals)
        {
            for (s, t) in self.geometry.pair_sites(pair, &self.boundary_conditions) {
                energy += interactions::dmi_energy(d, normal, &spins[s], &spins[t]);
            }
        }
        energy
    }

    fn energy_ddi(&self, spins: &[Vector3<f64>]) -> f64 {
        let mut energy = 0.0;
        for ((pair, &magnitude), normal) in self
            .ddi_pairs
            .iter()
            .zip(&self.ddi_magnitudes)
            .zip(&self.ddi_normals)
        {
            for (s, t) in self.geometry.pair_sites(pair, &self.boundary_conditions) {
                let coupling = magnitude * self.mu_s[s] * self.mu_s[t];
                energy += interactions::ddi_energy(coupling, normal, &spins[s], &spins[t]);
            }
        }
        energy
    }

    fn field_zeeman(&self, field: &mut [Vector3<f64>]) {
        let magnitude = self.external_field_magnitude;
        let normal = &self.external_field_normal;

        #[cfg(not(feature = "parallel"))]
        let iterator = field.iter_mut().zip(self.mu_s.iter());

        #[cfg(feature = "parallel")]
        let iterator = field.par_iter_mut().zip(self.mu_s.par_iter());

        iterator.for_each(|(h, &mu)| *h += interactions::zeeman_field(mu, magnitude, normal));
    }

    fn field_anisotropy(&self, spins: &[Vector3<f64>], field: &mut [Vector3<f64>]) {
        for cell in self.geometry.cells() {
            for ((&ibasis, &k), axis) in self
                .anisotropy_indices
                .iter()
                .zip(&self.anisotropy_magnitudes)
                .zip(&self.anisotropy_normals)
            {
                let idx = self.geometry.site_index(cell, ibasis);
                field[idx] += interactions::anisotropy_field(k, axis, &spins[idx]);
            }
        }
    }

    fn field_exchange(&self, spins: &[Vector3<f64>], field: &mut [Vector3<f64>]) {
        for (pair, &j) in self.exchange_pairs.iter().zip(&self.exchange_magnitudes) {
            for (s, t) in self.geometry.pair_sites(pair, &self.boundary_conditions) {
                field[s] += spins[t] * j;
                field[t] += spins[s] * j;
            }
        }
    }

    fn field_dmi(&self, spins: &[Vector3<f64>], field: &mut [Vector3<f64>]) {
        for ((pair, &d), normal) in self
            .dmi_pairs
            .iter()
            .zip(&self.dmi_magnitudes)
            .zip(&self.dmi_normals)
        {
            for (s, t) in self.geometry.pair_sites(pair, &self.boundary_conditions) {
                let (hs, ht) = interactions::dmi_fields(d, normal, &spins[s], &spins[t]);
                field[s] += hs;
                field[t] += ht;
            }
        }
    }

    fn field_ddi(&self, spins: &[Vector3<f64>], field: &mut [Vector3<f64>]) {
        for ((pair, &magnitude), normal) in self
            .ddi_pairs
            .iter()
            .zip(&self.ddi_magnitudes)
            .zip(&self.ddi_normals)
        {
            for (s, t) in self.geometry.pair_sites(pair, &self.boundary_conditions) {
                let coupling = magnitude * self.mu_s[s] * self.mu_s[t];
                field[s] += interactions::ddi_field(coupling, normal, &spins[t]);
                field[t] += interactions::ddi_field(coupling, normal, &spins[s]);
            }
        }
    }

    fn hessian_anisotropy(&self, hessian: &mut DMatrix<f64>) {
        for cell in self.geometry.cells() {
            for ((&ibasis, &k), axis) in self
                .anisotropy_indices
                .iter()
                .zip(&self.anisotropy_magnitudes)
                .zip(&self.anisotropy_normals)
            {
                let idx = self.geometry.site_index(cell, ibasis);
                add_block(hessian, idx, idx, &interactions::anisotropy_hessian(k, axis));
            }
        }
    }

    fn hessian_pairs<F>(&self, pairs: &[Pair], hessian: &mut DMatrix<f64>, block_for: F)
    where
        F: Fn(usize, usize, usize) -> Matrix3<f64>,
    {
        for (n, pair) in pairs.iter().enumerate() {
            for (s, t) in self.geometry.pair_sites(pair, &self.boundary_conditions) {
                let block = block_for(n, s, t);
                add_block(hessian, s, t, &block);
                add_block(hessian, t, s, &block.transpose());
            }
        }
    }
}

impl EnergyModel for Heisenberg {
    fn name(&self) -> &'static str {
        "Heisenberg"
    }

    fn energy_contributions(&self, spins: &[Vector3<f64>]) -> EnergyBreakdown {
        self.energy_contributions
            .iter()
            .map(|&contribution| {
                let energy = match contribution {
                    EnergyContribution::Zeeman => self.energy_zeeman(spins),
                    EnergyContribution::Anisotropy => self.energy_anisotropy(spins),
                    EnergyContribution::Exchange => self.energy_exchange(spins),
                    EnergyContribution::Dmi => self.energy_dmi(spins),
                    EnergyContribution::Ddi => self.energy_ddi(spins),
                    EnergyContribution::Gaussian(_) => 0.0,
                };
                (contribution, energy)
            })
            .collect()
    }

    fn add_effective_field(&self, spins: &[Vector3<f64>], field: &mut [Vector3<f64>]) {
        for contribution in &self.energy_contributions {
            match contribution {
                EnergyContribution::Zeeman => self.field_zeeman(field),
                EnergyContribution::Anisotropy => self.field_anisotropy(spins, field),
                EnergyContribution::Exchange => self.field_exchange(spins, field),
                EnergyContribution::Dmi => self.field_dmi(spins, field),
                EnergyContribution::Ddi => self.field_ddi(spins, field),
                EnergyContribution::Gaussian(_) => {}
            }
        }
    }

    fn add_hessian(&self, _spins: &[Vector3<f64>], hessian: &mut DMatrix<f64>) {
        // Every term is at most bilinear in the moments, so the curvature does not
        // depend on the configuration. The Zeeman term is linear and has none.
        for contribution in &self.energy_contributions {
            match contribution {
                EnergyContribution::Anisotropy => self.hessian_anisotropy(hessian),
                EnergyContribution::Exchange => {
                    self.hessian_pairs(&self.exchange_pairs, hessian, |n, _, _| {
                        interactions::exchange_hessian(self.exchange_magnitudes[n])
                    })
                }
                EnergyContribution::Dmi => {
                    self.hessian_pairs(&self.dmi_pairs, hessian, |n, _, _| {
                        interactions::dmi_hessian(self.dmi_magnitudes[n], &self.dmi_normals[n])
                    })
                }
                EnergyContribution::Ddi => {
                    self.hessian_pairs(&self.ddi_pairs, hessian, |n, s, t| {
                        let coupling = self.ddi_magnitudes[n] * self.mu_s[s] * self.mu_s[t];
                        interactions::ddi_hessian(coupling, &self.ddi_normals[n])
                    })
                }
                EnergyContribution::Zeeman | EnergyContribution::Gaussian(_) => {}
            }
        }
    }
}

fn add_block(hessian: &mut DMatrix<f64>, i: usize, j: usize, block: &Matrix3<f64>) {
    let mut view = hessian.fixed_view_mut::<3, 3>(3 * i, 3 * j);
    view += block;
}

fn check_finite(what: &'static str, value: f64) -> Result<(), HamiltonianError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(HamiltonianError::InvalidParameter {
            what,
            reason: format!("{} is not finite", value),
        })
    }
}

fn check_length(what: &'static str, expected: usize, found: usize) -> Result<(), HamiltonianError> {
    if expected == found {
        Ok(())
    } else {
        Err(HamiltonianError::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}

fn unit_direction(
    what: &'static str,
    v: &Vector3<f64>,
) -> Result<Vector3<f64>, HamiltonianError> {
    normalize_direction(v).ok_or_else(|| HamiltonianError::InvalidParameter {
        what,
        reason: "direction must be finite and non-zero".to_string(),
    })
}

/// Consuming builder for [`Heisenberg`]. Every term defaults to absent.
#[derive(Debug, Clone)]
pub struct HeisenbergBuilder {
    boundary_conditions: [bool; 3],
    mu_s: f64,
    field: Option<(f64, Vector3<f64>)>,
    anisotropy: Option<(f64, Vector3<f64>)>,
    exchange_shells: Vec<f64>,
    exchange_pairs: Option<(Vec<Pair>, Vec<f64>)>,
    dmi_shells: Vec<f64>,
    dmi_chirality: i32,
    dmi_pairs: Option<(Vec<Pair>, Vec<f64>, Vec<Vector3<f64>>)>,
    ddi_cutoff_radius: f64,
}

impl Default for HeisenbergBuilder {
    fn default() -> Self {
        Self {
            boundary_conditions: [false; 3],
            mu_s: 1.0,
            field: None,
            anisotropy: None,
            exchange_shells: Vec::new(),
            exchange_pairs: None,
            dmi_shells: Vec::new(),
            dmi_chirality: 1,
            dmi_pairs: None,
            ddi_cutoff_radius: 0.0,
        }
    }
}

impl HeisenbergBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boundary_conditions(mut self, periodic: [bool; 3]) -> Self {
        self.boundary_conditions = periodic;
        self
    }
    /// Moment magnitude of every site, in Bohr magnetons.
    pub fn mu_s(mut self, mu_s: f64) -> Self {
        self.mu_s = mu_s;
        self
    }
    /// External field in Tesla.
    pub fn external_field(mut self, magnitude: f64, normal: Vector3<f64>) -> Self {
        self.field = Some((magnitude, normal));
        self
    }
    /// Uniaxial anisotropy in meV, applied to every cell atom.
    pub fn anisotropy(mut self, magnitude: f64, normal: Vector3<f64>) -> Self {
        self.anisotropy = Some((magnitude, normal));
        self
    }
    pub fn exchange_shells(mut self, magnitudes: Vec<f64>) -> Self {
        self.exchange_shells = magnitudes;
        self
    }
    pub fn exchange_pairs(mut self, pairs: Vec<Pair>, magnitudes: Vec<f64>) -> Self {
        self.exchange_pairs = Some((pairs, magnitudes));
        self
    }
    pub fn dmi_shells(mut self, magnitudes: Vec<f64>, chirality: i32) -> Self {
        self.dmi_shells = magnitudes;
        self.dmi_chirality = chirality;
        self
    }
    pub fn dmi_pairs(
        mut self,
        pairs: Vec<Pair>,
        magnitudes: Vec<f64>,
        normals: Vec<Vector3<f64>>,
    ) -> Self {
        self.dmi_pairs = Some((pairs, magnitudes, normals));
        self
    }
    /// Dipolar cutoff radius in Å; non-positive disables the interaction.
    pub fn ddi_cutoff_radius(mut self, radius: f64) -> Self {
        self.ddi_cutoff_radius = radius;
        self
    }

    pub fn build(self, geometry: Arc<Geometry>) -> Result<Heisenberg, HamiltonianError> {
        let nos = geometry.nos();
        let mut hamiltonian = Heisenberg {
            geometry,
            boundary_conditions: self.boundary_conditions,
            mu_s: vec![1.0; nos],
            external_field_magnitude: 0.0,
            external_field_normal: Vector3::z(),
            anisotropy_indices: Vec::new(),
            anisotropy_magnitudes: Vec::new(),
            anisotropy_normals: Vec::new(),
            exchange_shell_magnitudes: Vec::new(),
            exchange_pairs_in: Vec::new(),
            exchange_magnitudes_in: Vec::new(),
            exchange_pairs: Vec::new(),
            exchange_magnitudes: Vec::new(),
            dmi_shell_magnitudes: Vec::new(),
            dmi_shell_chirality: 1,
            dmi_pairs_in: Vec::new(),
            dmi_magnitudes_in: Vec::new(),
            dmi_normals_in: Vec::new(),
            dmi_pairs: Vec::new(),
            dmi_magnitudes: Vec::new(),
            dmi_normals: Vec::new(),
            ddi_cutoff_radius: 0.0,
            ddi_pairs: Vec::new(),
            ddi_magnitudes: Vec::new(),
            ddi_normals: Vec::new(),
            energy_contributions: Vec::new(),
        };

        hamiltonian.set_mu_s(self.mu_s)?;
        if let Some((magnitude, normal)) = self.field {
            hamiltonian.set_external_field(magnitude * MU_B, &normal)?;
        }
        if let Some((magnitude, normal)) = self.anisotropy {
            let n_cell_atoms = hamiltonian.geometry.n_cell_atoms();
            hamiltonian.set_anisotropy(
                (0..n_cell_atoms).collect(),
                vec![magnitude; n_cell_atoms],
                vec![normal; n_cell_atoms],
            )?;
        }
        hamiltonian.set_exchange_shells(self.exchange_shells)?;
        if let Some((pairs, magnitudes)) = self.exchange_pairs {
            hamiltonian.set_exchange_pairs(pairs, magnitudes)?;
        }
        hamiltonian.set_dmi_shells(self.dmi_shells, self.dmi_chirality)?;
        if let Some((pairs, magnitudes, normals)) = self.dmi_pairs {
            hamiltonian.set_dmi_pairs(pairs, magnitudes, normals)?;
        }
        hamiltonian.set_ddi_cutoff(self.ddi_cutoff_radius)?;
        Ok(hamiltonian)
    }
}
