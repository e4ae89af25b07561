/// Bohr magneton in meV/T. Converts an external field given in Tesla into the
/// Zeeman energy scale of a moment measured in Bohr magnetons.
pub const MU_B: f64 = 0.057883817555;

/// Dipolar prefactor `μ0 μB² / (4π)` in meV·Å³, for moments measured in Bohr magnetons.
pub const DIPOLAR_PREFACTOR: f64 = 0.0536815112;
