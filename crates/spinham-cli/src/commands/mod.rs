pub mod energy;
pub mod pairs;

use crate::error::{CliError, Result};
use nalgebra::Vector3;
use spinham::core::params::ModelConfig;
use std::path::Path;
use tracing::info;

pub(crate) fn load_model(path: &Path) -> Result<ModelConfig> {
    info!("Loading model file {:?}", path);
    Ok(ModelConfig::load(path)?)
}

/// Converts a clap multi-value argument into a vector, checking its arity.
pub(crate) fn vector_arg(name: &str, values: &[f64]) -> Result<Vector3<f64>> {
    match values {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(CliError::Argument(format!(
            "--{} expects 3 components, got {}",
            name,
            values.len()
        ))),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub fn write_model(content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{}", content).unwrap();
        (dir, path)
    }
}
