use std::{path::{Path, PathBuf}, time::Instant};

use anyhow::Result;
use log::{info, warn};
use ridingcast::{io::write_projection, Diagnostics, RunConfig};

/// `<dir>/<stem>_<year>.json` next to the blended output.
fn per_year_path(output: &Path, year: u16) -> PathBuf {
    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("projection");
    output.with_file_name(format!("{stem}_{year}.json"))
}

/// One line per year; the individual errors were logged as they were reported.
fn summary(diagnostics: &Diagnostics) -> String {
    format!(
        "{} record errors, {} vote lookup misses, {} unattributable sources",
        diagnostics.errors().len(),
        diagnostics.missing_votes(),
        diagnostics.unattributable(),
    )
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ProjectArgs) -> Result<()> {
    let start = Instant::now();

    info!("[project] loading config from {}", args.config.display());
    let mut config = RunConfig::from_json_file(&args.config)?;
    config.strict_missing_votes |= args.strict;
    let out_path = args.output.clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| "./projection.json".into());

    let output = ridingcast::run(&config)?;

    for year in &output.years {
        if year.diagnostics.is_clean() {
            info!("[project {}] {}", year.year, summary(&year.diagnostics));
        } else {
            warn!("[project {}] {}", year.year, summary(&year.diagnostics));
        }
        if args.per_year {
            let path = per_year_path(&out_path, year.year);
            info!("[project] writing {} projection to {}", year.year, path.display());
            write_projection(&path, &year.projection)?;
        }
    }

    info!("[project] writing blended projection to {}", out_path.display());
    write_projection(&out_path, &output.blended)?;

    info!("[project] took {:.2} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_instead_of_repeating_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(ridingcast::ProjectionError::ZeroVoteSum { district: ridingcast::DistrictId(4) });
        diagnostics.note_unattributable("poll 4/1");
        assert_eq!(summary(&diagnostics), "1 record errors, 0 vote lookup misses, 1 unattributable sources");
    }

    #[test]
    fn per_year_files_sit_next_to_output() {
        assert_eq!(per_year_path(Path::new("out/ridings_2018.json"), 2014), PathBuf::from("out/ridings_2018_2014.json"));
    }
}
