use std::path::PathBuf;

/// Projects past election results onto new district boundaries
#[derive(clap::Parser, Debug)]
#[command(name = "ridingcast", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Project and blend the elections listed in a run configuration
    Project(ProjectArgs),

    /// Blend previously written projection files
    Blend(BlendArgs),

    /// Write the built-in 2011 + 2014 -> 2018 configuration
    Preset(PresetArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProjectArgs {
    /// Run configuration (JSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output projection file, overrides the configured output
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also write each election's own projection next to the output as <stem>_<year>.json
    #[arg(long)]
    pub per_year: bool,

    /// Fail districts whose polls are missing from the results instead of counting zero
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct BlendArgs {
    /// Inputs as PATH=WEIGHT, weights summing to 1
    #[arg(required = true, value_parser = parse_weighted_path)]
    pub inputs: Vec<(PathBuf, f64)>,

    /// Output projection file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct PresetArgs {
    /// Data directory laid out as <year>/{districts,polls,results}
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub data: PathBuf,

    /// Where to write the configuration, defaults to "./run.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

fn parse_weighted_path(s: &str) -> Result<(PathBuf, f64), String> {
    let (path, weight) = s.rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=WEIGHT, got {s:?}"))?;
    let weight: f64 = weight.parse().map_err(|e| format!("invalid weight {weight:?}: {e}"))?;
    Ok((PathBuf::from(path), weight))
}
