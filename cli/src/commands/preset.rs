use anyhow::Result;
use log::info;
use ridingcast::RunConfig;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::PresetArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or_else(|| "./run.json".into());
    info!("[preset] writing configuration for {} to {}", args.data.display(), out_path.display());
    RunConfig::ontario_2018(&args.data).to_json_file(&out_path)
}
