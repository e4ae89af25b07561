use super::load_model;
use crate::cli::PairsArgs;
use crate::error::{CliError, Result};
use spinham::core::geometry::{
    Geometry, Pair, check_search_radius, neighbours_in_shells, pairs_in_radius,
    shell_search_radius,
};
use tracing::info;

/// Pairs selected by the arguments, each with its shell index when listed by shells.
pub fn collect(args: &PairsArgs, geometry: &Geometry) -> Result<Vec<(Pair, Option<usize>)>> {
    let search_radius = match (args.radius, args.shells) {
        (Some(radius), None) => radius,
        (None, Some(n_shells)) => shell_search_radius(geometry, n_shells),
        _ => 0.0,
    };
    if search_radius > 0.0 || search_radius.is_nan() {
        check_search_radius(geometry, search_radius)
            .map_err(|e| CliError::Argument(e.to_string()))?;
    }

    match (args.radius, args.shells) {
        (Some(radius), None) => Ok(pairs_in_radius(geometry, radius)
            .into_iter()
            .map(|pair| (pair, None))
            .collect()),
        (None, Some(n_shells)) => Ok(neighbours_in_shells(geometry, n_shells)
            .into_iter()
            .map(|(pair, shell)| (pair, Some(shell)))
            .collect()),
        _ => Err(CliError::Argument(
            "exactly one of --radius and --shells is required".to_string(),
        )),
    }
}

pub fn run(args: PairsArgs) -> Result<()> {
    let geometry = load_model(&args.config)?.build_geometry()?;
    let pairs = collect(&args, &geometry)?;
    info!("Found {} pairs.", pairs.len());

    println!("{:>4} {:>4} {:>5} {:>5} {:>5} {:>12} {:>6}", "i", "j", "da", "db", "dc", "dist [Å]", "shell");
    for (pair, shell) in &pairs {
        let [da, db, dc] = pair.translation;
        let distance = geometry.pair_displacement(pair).norm();
        let shell = shell.map_or_else(|| "-".to_string(), |s| s.to_string());
        println!(
            "{:>4} {:>4} {:>5} {:>5} {:>5} {:>12.6} {:>6}",
            pair.i, pair.j, da, db, dc, distance, shell
        );
    }
    println!("{} pairs", pairs.len());
    Ok(())
}
