use anyhow::Result;
use log::info;
use ridingcast::io::{read_projection, write_projection};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::BlendArgs) -> Result<()> {
    let projections = args.inputs.iter()
        .map(|(path, weight)| {
            info!("[blend] reading {} (weight {weight})", path.display());
            Ok((read_projection(path)?, *weight))
        })
        .collect::<Result<Vec<_>>>()?;

    let inputs: Vec<_> = projections.iter().map(|(projection, weight)| (projection, *weight)).collect();
    let blended = ridingcast::blend(&inputs)?;

    info!("[blend] writing {} districts to {}", blended.len(), args.output.display());
    write_projection(&args.output, &blended)
}
