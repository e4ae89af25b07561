use super::{load_model, vector_arg};
use crate::cli::EnergyArgs;
use crate::error::{CliError, Result};
use spinham::api::hamiltonian as api;
use spinham::core::hamiltonian::EnergyBreakdown;
use spinham::engine::{SpinImage, State};
use tracing::info;

#[derive(Debug)]
pub struct EnergyReport {
    pub model: &'static str,
    pub nos: usize,
    pub breakdown: EnergyBreakdown,
    /// Largest norm of the tangential effective field over all sites, in meV.
    pub max_torque: f64,
}

/// Builds the model, applies the overrides through the boundary API and evaluates the
/// uniform configuration.
pub fn evaluate(args: &EnergyArgs) -> Result<EnergyReport> {
    let config = load_model(&args.config)?;
    let (geometry, hamiltonian) = config.build()?;
    let image = SpinImage::new(geometry, hamiltonian)?;
    if let Some(direction) = &args.direction {
        let m = vector_arg("direction", direction)?;
        image.set_spins(vec![m; image.nos()])?;
    }
    let state = State::from_image(image);

    if let Some(field) = &args.field {
        let (magnitude, normal) = field
            .split_first()
            .ok_or_else(|| CliError::Argument("--field expects 4 values".to_string()))?;
        let normal = vector_arg("field", normal)?;
        api::set_field(&state, *magnitude, normal.into(), None, None);
    }
    if let Some(radius) = args.ddi_radius {
        api::set_ddi(&state, radius, None, None);
    }

    let image = state.resolve(None, None)?;
    let breakdown = image.energy_contributions()?;
    let max_torque = image
        .tangent_field()?
        .iter()
        .map(|h| h.norm())
        .fold(0.0, f64::max);
    info!(
        "Evaluated {} contributions on {} sites.",
        breakdown.len(),
        image.nos()
    );
    Ok(EnergyReport {
        model: spinham::engine::query::name(&image)?,
        nos: image.nos(),
        breakdown,
        max_torque,
    })
}

pub fn run(args: EnergyArgs) -> Result<()> {
    let report = evaluate(&args)?;

    println!("{} model, {} sites", report.model, report.nos);
    for (contribution, energy) in report.breakdown.iter() {
        println!("  {:<12} {:>18.8} meV", contribution.to_string(), energy);
    }
    let total = report.breakdown.total();
    println!("  {:<12} {:>18.8} meV", "Total", total);
    println!("  {:<12} {:>18.8} meV", "Max torque", report.max_torque);
    if args.per_site {
        println!(
            "  {:<12} {:>18.8} meV",
            "Per site",
            total / report.nos as f64
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_model;
    use spinham::core::constants::MU_B;
    use spinham::core::hamiltonian::EnergyContribution;
    use std::path::PathBuf;

    const MODEL: &str = r#"
        [geometry]
        n-cells = [3, 3, 1]

        [hamiltonian]
        type = "heisenberg"

        [hamiltonian.exchange]
        shells = [1.0]
    "#;

    fn args(config: PathBuf) -> EnergyArgs {
        EnergyArgs {
            config,
            direction: None,
            field: None,
            ddi_radius: None,
            per_site: false,
        }
    }

    #[test]
    fn evaluate_reports_exchange_of_uniform_state() {
        let (_dir, path) = write_model(MODEL);
        let report = evaluate(&args(path)).unwrap();
        assert_eq!(report.model, "Heisenberg");
        assert_eq!(report.nos, 9);
        assert_eq!(report.breakdown.len(), 1);
        assert!((report.breakdown.total() + 12.0).abs() < 1e-12);
    }

    #[test]
    fn evaluate_applies_field_override_in_tesla() {
        let (_dir, path) = write_model(MODEL);
        let mut args = args(path);
        args.direction = Some(vec![0.0, 0.0, 1.0]);
        args.field = Some(vec![2.0, 0.0, 0.0, 5.0]);
        let report = evaluate(&args).unwrap();
        let zeeman = report.breakdown.get(EnergyContribution::Zeeman).unwrap();
        assert!((zeeman + 9.0 * 2.0 * MU_B).abs() < 1e-12);
        assert!(report.max_torque < 1e-12);
    }

    #[test]
    fn evaluate_reports_torque_of_transverse_field() {
        let (_dir, path) = write_model(MODEL);
        let mut args = args(path);
        args.direction = Some(vec![0.0, 0.0, 1.0]);
        args.field = Some(vec![2.0, 1.0, 0.0, 0.0]);
        let report = evaluate(&args).unwrap();
        assert!((report.max_torque - 2.0 * MU_B).abs() < 1e-12);
    }

    #[test]
    fn evaluate_applies_ddi_override() {
        let (_dir, path) = write_model(MODEL);
        let mut args = args(path);
        args.ddi_radius = Some(1.0);
        let report = evaluate(&args).unwrap();
        assert!(report.breakdown.get(EnergyContribution::Ddi).is_some());
    }

    #[test]
    fn evaluate_rejects_zero_direction() {
        let (_dir, path) = write_model(MODEL);
        let mut args = args(path);
        args.direction = Some(vec![0.0, 0.0, 0.0]);
        assert!(matches!(evaluate(&args), Err(CliError::Engine(_))));
    }

    #[test]
    fn evaluate_reports_missing_model_file() {
        let args = args(PathBuf::from("/nonexistent/model.toml"));
        assert!(matches!(evaluate(&args), Err(CliError::Config(_))));
    }
}
