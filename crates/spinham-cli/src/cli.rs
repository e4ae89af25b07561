use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Spinham Developers",
    version,
    about = "spinham - evaluate energies and interaction pairs of classical spin lattice models.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate the energy of a uniform configuration, split into its contributions.
    Energy(EnergyArgs),
    /// List the interaction pairs of a lattice within a radius or a number of shells.
    Pairs(PairsArgs),
}

/// Arguments for the `energy` subcommand.
#[derive(Args, Debug)]
pub struct EnergyArgs {
    /// Path to the model file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Direction of every moment of the evaluated configuration.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub direction: Option<Vec<f64>>,

    // --- Parameter Overrides ---
    /// Override the external field: magnitude in Tesla followed by its direction.
    #[arg(long, num_args = 4, value_names = ["MAG", "X", "Y", "Z"], allow_negative_numbers = true)]
    pub field: Option<Vec<f64>>,

    /// Override the dipolar cutoff radius in Å.
    #[arg(long, value_name = "FLOAT")]
    pub ddi_radius: Option<f64>,

    /// Also print the energy per site.
    #[arg(long)]
    pub per_site: bool,
}

/// Arguments for the `pairs` subcommand.
#[derive(Args, Debug)]
pub struct PairsArgs {
    /// Path to the model file in TOML format. Only its geometry is used.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// List all pairs up to this distance in Å.
    #[arg(long, value_name = "FLOAT", conflicts_with = "shells", required_unless_present = "shells")]
    pub radius: Option<f64>,

    /// List the pairs of the first NUM neighbour shells.
    #[arg(long, value_name = "NUM")]
    pub shells: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_command_parses_vector_overrides() {
        let cli = Cli::try_parse_from([
            "spinham",
            "energy",
            "-c",
            "model.toml",
            "--direction",
            "0",
            "0",
            "-1",
            "--field",
            "2.0",
            "1",
            "0",
            "0",
            "--ddi-radius",
            "3.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Energy(args) => {
                assert_eq!(args.direction, Some(vec![0.0, 0.0, -1.0]));
                assert_eq!(args.field, Some(vec![2.0, 1.0, 0.0, 0.0]));
                assert_eq!(args.ddi_radius, Some(3.5));
                assert!(!args.per_site);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn pairs_command_requires_radius_or_shells() {
        assert!(Cli::try_parse_from(["spinham", "pairs", "-c", "model.toml"]).is_err());
        assert!(
            Cli::try_parse_from([
                "spinham", "pairs", "-c", "model.toml", "--radius", "1.0", "--shells", "2"
            ])
            .is_err()
        );
        assert!(Cli::try_parse_from(["spinham", "pairs", "-c", "model.toml", "--shells", "2"]).is_ok());
    }

    #[test]
    fn verbosity_is_counted_and_conflicts_with_quiet() {
        let cli =
            Cli::try_parse_from(["spinham", "-vv", "pairs", "-c", "m.toml", "--radius", "1"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(
            Cli::try_parse_from(["spinham", "-v", "-q", "pairs", "-c", "m.toml", "--radius", "1"])
                .is_err()
        );
    }
}
