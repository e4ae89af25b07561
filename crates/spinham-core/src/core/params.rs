use super::geometry::{Geometry, GeometryError};
use super::hamiltonian::{Gaussian, Hamiltonian, HamiltonianError, Heisenberg};
use nalgebra::Vector3;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Invalid energy model: {0}")]
    Hamiltonian(#[from] HamiltonianError),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeometryConfig {
    #[serde(default = "default_bravais_vectors")]
    pub bravais_vectors: [[f64; 3]; 3],
    #[serde(default = "default_cell_atoms")]
    pub cell_atoms: Vec<[f64; 3]>,
    pub n_cells: [usize; 3],
    #[serde(default = "default_lattice_constant")]
    pub lattice_constant: f64,
}

fn default_bravais_vectors() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

fn default_cell_atoms() -> Vec<[f64; 3]> {
    vec![[0.0, 0.0, 0.0]]
}

fn default_lattice_constant() -> f64 {
    1.0
}

fn default_mu_s() -> f64 {
    1.0
}

fn default_chirality() -> i32 {
    1
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DirectedMagnitude {
    pub magnitude: f64,
    pub normal: [f64; 3],
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ShellConfig {
    pub shells: Vec<f64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DmiConfig {
    pub shells: Vec<f64>,
    #[serde(default = "default_chirality")]
    pub chirality: i32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DdiConfig {
    pub cutoff_radius: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GaussianTermConfig {
    pub amplitude: f64,
    pub width: f64,
    pub center: [f64; 3],
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", deny_unknown_fields)]
pub enum HamiltonianConfig {
    #[serde(rename_all = "kebab-case")]
    Heisenberg {
        #[serde(default)]
        boundary_conditions: [bool; 3],
        #[serde(default = "default_mu_s")]
        mu_s: f64,
        /// Magnitude in Tesla.
        external_field: Option<DirectedMagnitude>,
        anisotropy: Option<DirectedMagnitude>,
        exchange: Option<ShellConfig>,
        dmi: Option<DmiConfig>,
        ddi: Option<DdiConfig>,
    },
    #[serde(rename_all = "kebab-case")]
    Gaussian {
        #[serde(default)]
        boundary_conditions: [bool; 3],
        #[serde(default)]
        gaussians: Vec<GaussianTermConfig>,
    },
}

/// A model file: one lattice geometry and the energy model living on it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModelConfig {
    pub geometry: GeometryConfig,
    pub hamiltonian: HamiltonianConfig,
}

impl ModelConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn build_geometry(&self) -> Result<Geometry, ConfigLoadError> {
        let g = &self.geometry;
        let bravais = g.bravais_vectors.map(Vector3::from);
        let cell_atoms = g.cell_atoms.iter().copied().map(Vector3::from).collect();
        Ok(Geometry::new(
            bravais,
            cell_atoms,
            g.n_cells,
            g.lattice_constant,
        )?)
    }

    /// Builds the geometry and the energy model described by the file.
    pub fn build(&self) -> Result<(Arc<Geometry>, Hamiltonian), ConfigLoadError> {
        let geometry = Arc::new(self.build_geometry()?);
        let hamiltonian = match &self.hamiltonian {
            HamiltonianConfig::Heisenberg {
                boundary_conditions,
                mu_s,
                external_field,
                anisotropy,
                exchange,
                dmi,
                ddi,
            } => {
                let mut builder = Heisenberg::builder()
                    .boundary_conditions(*boundary_conditions)
                    .mu_s(*mu_s);
                if let Some(field) = external_field {
                    builder = builder.external_field(field.magnitude, Vector3::from(field.normal));
                }
                if let Some(anisotropy) = anisotropy {
                    builder =
                        builder.anisotropy(anisotropy.magnitude, Vector3::from(anisotropy.normal));
                }
                if let Some(exchange) = exchange {
                    builder = builder.exchange_shells(exchange.shells.clone());
                }
                if let Some(dmi) = dmi {
                    builder = builder.dmi_shells(dmi.shells.clone(), dmi.chirality);
                }
                if let Some(ddi) = ddi {
                    builder = builder.ddi_cutoff_radius(ddi.cutoff_radius);
                }
                Hamiltonian::Heisenberg(builder.build(geometry.clone())?)
            }
            HamiltonianConfig::Gaussian {
                boundary_conditions,
                gaussians,
            } => {
                let mut model = Gaussian::new(
                    gaussians.iter().map(|g| g.amplitude).collect(),
                    gaussians.iter().map(|g| g.width).collect(),
                    gaussians.iter().map(|g| Vector3::from(g.center)).collect(),
                )?;
                model.set_boundary_conditions(*boundary_conditions);
                Hamiltonian::Gaussian(model)
            }
        };
        Ok((geometry, hamiltonian))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hamiltonian::HamiltonianKind;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", content).unwrap();
        (dir, path)
    }

    #[test]
    fn load_and_build_heisenberg_model() {
        let (_dir, path) = write_config(
            r#"
            [geometry]
            n-cells = [4, 4, 1]
            lattice-constant = 2.5

            [hamiltonian]
            type = "heisenberg"
            boundary-conditions = [true, true, false]
            mu-s = 2.0

            [hamiltonian.external-field]
            magnitude = 1.0
            normal = [0.0, 0.0, 2.0]

            [hamiltonian.exchange]
            shells = [1.0, 0.1]

            [hamiltonian.dmi]
            shells = [0.3]
            chirality = -1
            "#,
        );

        let config = ModelConfig::load(&path).unwrap();
        let (geometry, hamiltonian) = config.build().unwrap();
        assert_eq!(geometry.nos(), 16);
        assert_eq!(hamiltonian.kind(), HamiltonianKind::Heisenberg);
        assert_eq!(hamiltonian.boundary_conditions(), [true, true, false]);

        let heisenberg = hamiltonian.as_heisenberg().unwrap();
        assert_eq!(heisenberg.mu_s()[0], 2.0);
        assert_eq!(heisenberg.exchange_shell_magnitudes(), &[1.0, 0.1]);
        assert_eq!(heisenberg.dmi_shell_chirality(), -1);
        assert_eq!(heisenberg.external_field_normal(), &Vector3::z());
        assert!(heisenberg.ddi_pairs().is_empty());
    }

    #[test]
    fn load_and_build_gaussian_model() {
        let (_dir, path) = write_config(
            r#"
            [geometry]
            n-cells = [1, 1, 1]

            [hamiltonian]
            type = "gaussian"

            [[hamiltonian.gaussians]]
            amplitude = 1.0
            width = 0.3
            center = [0.0, 0.0, 1.0]

            [[hamiltonian.gaussians]]
            amplitude = -0.5
            width = 0.2
            center = [1.0, 0.0, 0.0]
            "#,
        );

        let (_, hamiltonian) = ModelConfig::load(&path).unwrap().build().unwrap();
        let gaussian = hamiltonian.as_gaussian().unwrap();
        assert_eq!(gaussian.amplitudes(), vec![1.0, -0.5]);
        assert_eq!(gaussian.widths(), vec![0.3, 0.2]);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = ModelConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigLoadError::Io { .. })));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let (_dir, path) = write_config(
            r#"
            [geometry]
            n-cells = [2, 2, 1]
            n-atoms = 3

            [hamiltonian]
            type = "gaussian"
            "#,
        );
        assert!(matches!(
            ModelConfig::load(&path),
            Err(ConfigLoadError::Toml { .. })
        ));
    }

    #[test]
    fn load_rejects_misspelled_hamiltonian_sections() {
        let (_dir, path) = write_config(
            r#"
            [geometry]
            n-cells = [2, 2, 1]

            [hamiltonian]
            type = "heisenberg"

            [hamiltonian.exchnage]
            shells = [1.0]
            "#,
        );
        assert!(matches!(
            ModelConfig::load(&path),
            Err(ConfigLoadError::Toml { .. })
        ));
    }

    #[test]
    fn load_rejects_parameters_of_other_variant() {
        let (_dir, path) = write_config(
            r#"
            [geometry]
            n-cells = [2, 2, 1]

            [hamiltonian]
            type = "gaussian"
            mu-s = 2.0
            "#,
        );
        assert!(matches!(
            ModelConfig::load(&path),
            Err(ConfigLoadError::Toml { .. })
        ));
    }

    #[test]
    fn build_reports_invalid_geometry() {
        let (_dir, path) = write_config(
            r#"
            [geometry]
            n-cells = [0, 2, 1]

            [hamiltonian]
            type = "heisenberg"
            "#,
        );
        let result = ModelConfig::load(&path).unwrap().build();
        assert!(matches!(
            result,
            Err(ConfigLoadError::Geometry(GeometryError::EmptyAxis { axis: 0 }))
        ));
    }

    #[test]
    fn build_reports_invalid_gaussian_width() {
        let (_dir, path) = write_config(
            r#"
            [geometry]
            n-cells = [1, 1, 1]

            [hamiltonian]
            type = "gaussian"

            [[hamiltonian.gaussians]]
            amplitude = 1.0
            width = -0.3
            center = [0.0, 0.0, 1.0]
            "#,
        );
        let result = ModelConfig::load(&path).unwrap().build();
        assert!(matches!(result, Err(ConfigLoadError::Hamiltonian(_))));
    }
}
