//! Clap definitions for the `lasercalc` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lasercalc_core::lookup::Estimate;
use lasercalc_core::materials::SheetMaterial;
use lasercalc_core::reference::{Nozzle, PierceStrategy};

/// lasercalc -- manufacturing cost estimates for laser cutting shops.
#[derive(Parser, Debug)]
#[command(name = "lasercalc", about = "Manufacturing cost estimates for laser cutting shops", version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Debug logging to stderr.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Shop settings JSON applied to inputs (default: built-in rates).
    #[arg(long, global = true, env = "LASERCALC_SETTINGS")]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate one calculation input (a JSON object with a "type" tag).
    Calc(CalcArgs),

    /// Print the default input for a calculation type.
    Template(TemplateArgs),

    /// Query a reference table directly.
    #[command(subcommand)]
    Lookup(LookupCommand),

    /// Create, extend and run job worksheets (.lcw).
    #[command(subcommand)]
    Worksheet(WorksheetCommand),
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Input JSON file, or "-" for stdin.
    pub input: PathBuf,

    /// Print a text report instead of JSON.
    #[arg(long)]
    pub report: bool,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Calculation type, e.g. pierce, kerf, hourly_rate.
    pub calc_type: String,
}

#[derive(Subcommand, Debug)]
pub enum LookupCommand {
    /// Seconds per pierce and the tabulated range.
    Pierce(PierceLookupArgs),
    /// Kerf width for a nozzle, with the nozzles usually run at that thickness.
    Kerf(KerfLookupArgs),
}

#[derive(Args, Debug)]
pub struct PierceLookupArgs {
    #[arg(long, value_parser = parse_sheet_material)]
    pub material: SheetMaterial,

    /// Sheet thickness in mm.
    #[arg(long)]
    pub thickness: f64,

    #[arg(long, value_parser = parse_strategy, default_value = "high_pressure")]
    pub strategy: PierceStrategy,

    /// min, typical or max.
    #[arg(long, value_parser = parse_estimate, default_value = "typical")]
    pub quality: Estimate,
}

#[derive(Args, Debug)]
pub struct KerfLookupArgs {
    #[arg(long, value_parser = parse_sheet_material)]
    pub material: SheetMaterial,

    /// Sheet thickness in mm.
    #[arg(long)]
    pub thickness: f64,

    /// Nozzle diameter, e.g. 2.0 or 2.0mm_nozzle.
    #[arg(long, value_parser = parse_nozzle, default_value = "2.0")]
    pub nozzle: Nozzle,
}

#[derive(Subcommand, Debug)]
pub enum WorksheetCommand {
    /// Create an empty worksheet.
    New(WorksheetNewArgs),
    /// Add a calculation input to a worksheet.
    Add(WorksheetAddArgs),
    /// Evaluate every item in a worksheet.
    Run(WorksheetRunArgs),
}

#[derive(Args, Debug)]
pub struct WorksheetNewArgs {
    pub path: PathBuf,

    #[arg(long, default_value = "")]
    pub estimator: String,

    /// Job or quote number.
    #[arg(long, default_value = "")]
    pub job: String,

    #[arg(long, default_value = "")]
    pub customer: String,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct WorksheetAddArgs {
    pub path: PathBuf,

    /// Input JSON file, or "-" for stdin.
    pub input: PathBuf,

    /// Name recorded in the lock file (default: $USER).
    #[arg(long, env = "USER", default_value = "lasercalc")]
    pub user: String,
}

#[derive(Args, Debug)]
pub struct WorksheetRunArgs {
    pub path: PathBuf,

    /// Print text reports instead of JSON.
    #[arg(long)]
    pub report: bool,
}

fn parse_sheet_material(s: &str) -> Result<SheetMaterial, String> {
    SheetMaterial::from_str_flexible(s).map_err(|e| e.to_string())
}

fn parse_strategy(s: &str) -> Result<PierceStrategy, String> {
    PierceStrategy::from_str_flexible(s).map_err(|e| e.to_string())
}

fn parse_estimate(s: &str) -> Result<Estimate, String> {
    Estimate::from_str_flexible(s).map_err(|e| e.to_string())
}

fn parse_nozzle(s: &str) -> Result<Nozzle, String> {
    Nozzle::from_str_flexible(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lookup_pierce() {
        let cli = Cli::parse_from([
            "lasercalc", "lookup", "pierce", "--material", "stainless", "--thickness", "6", "--quality", "max",
        ]);
        match cli.command {
            Commands::Lookup(LookupCommand::Pierce(args)) => {
                assert_eq!(args.material, SheetMaterial::StainlessSteel);
                assert_eq!(args.strategy, PierceStrategy::HighPressure);
                assert_eq!(args.quality, Estimate::Max);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_material() {
        let err = Cli::try_parse_from(["lasercalc", "lookup", "kerf", "--material", "wood", "--thickness", "3"]);
        assert!(err.is_err());
    }
}
