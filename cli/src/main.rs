mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{blend, preset, project};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Project(args) => project::run(&cli, args),
        Commands::Blend(args) => blend::run(&cli, args),
        Commands::Preset(args) => preset::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
