use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{results::YearLayout, types::PartyTally};

/// Province-wide popular vote of the 2011 general election, in percent.
pub fn baseline_2011() -> PartyTally { PartyTally::new(37.65, 35.45, 22.74, 4.1) }

/// Province-wide popular vote of the 2014 general election, in percent.
pub fn baseline_2014() -> PartyTally { PartyTally::new(38.7, 31.3, 23.7, 6.1) }

fn default_max_record_errors() -> usize { 10 }

/// Attribute names of the target district boundary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub districts: PathBuf,
    #[serde(default = "TargetConfig::default_id_field")]
    pub id_field: String,
    #[serde(default = "TargetConfig::default_name_field")]
    pub name_field: String,
}

impl TargetConfig {
    fn default_id_field() -> String { "ED_ID".into() }
    fn default_name_field() -> String { "ENGLISH_NA".into() }
}

/// Attribute names of a source election's district and poll boundary files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFields {
    pub district_id: String,
    pub district_name: String,
    pub poll_district: String,
    pub poll_number: String,
}

impl Default for SourceFields {
    fn default() -> Self {
        Self {
            district_id: "ED_ID".into(),
            district_name: "ENGLISH_NA".into(),
            poll_district: "ED_ID".into(),
            poll_number: "POLL_DIV_1".into(),
        }
    }
}

/// Inputs and parameters of one historical election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub year: u16,
    /// Share of this election in the blended projection.
    pub weight: f64,
    /// Popular vote shares used for swing computation.
    pub baseline: PartyTally,
    pub districts: PathBuf,
    pub polls: PathBuf,
    /// Directory of per-district results workbooks.
    pub results_dir: PathBuf,
    /// Headerless CSV: district name, LIB, PC, NDP candidate.
    pub roster: PathBuf,
    #[serde(default)]
    pub fields: SourceFields,
    #[serde(default)]
    pub layout: YearLayout,
}

/// A full projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub target: TargetConfig,
    pub sources: Vec<SourceConfig>,
    /// Fail a district on a vote table lookup miss instead of counting it as zero.
    #[serde(default)]
    pub strict_missing_votes: bool,
    /// Per-record errors tolerated before the run aborts.
    #[serde(default = "default_max_record_errors")]
    pub max_record_errors: usize,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl RunConfig {
    /// Read a JSON run configuration. Relative paths are resolved against the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: RunConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration as pretty JSON.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Make every relative input/output path relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| if p.is_relative() { *p = base.join(&*p) };
        resolve(&mut self.target.districts);
        for source in &mut self.sources {
            resolve(&mut source.districts);
            resolve(&mut source.polls);
            resolve(&mut source.results_dir);
            resolve(&mut source.roster);
        }
        if let Some(output) = self.output.as_mut() {
            resolve(output);
        }
    }

    /// Reject configurations that cannot produce a blended projection.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("config lists no source elections");
        }
        let total: f64 = self.sources.iter().map(|source| source.weight).sum();
        if self.sources.iter().any(|source| !(source.weight >= 0.0)) || (total - 1.0).abs() > 1e-9 {
            bail!("source weights must be non-negative and sum to 1 (got {total})");
        }
        Ok(())
    }

    /// The 2011 + 2014 Ontario elections projected onto the 2018 districts,
    /// laid out as `<data>/<year>/{districts,polls,results}`.
    pub fn ontario_2018(data_dir: &Path) -> Self {
        let source = |year: u16, weight: f64, baseline: PartyTally, layout: YearLayout| {
            let dir = data_dir.join(year.to_string());
            SourceConfig {
                year,
                weight,
                baseline,
                districts: dir.join("districts/districts.shp"),
                polls: dir.join("polls/polls.shp"),
                results_dir: dir.join("results/poll_results"),
                roster: dir.join("results/candidates_fixed.csv"),
                fields: SourceFields::default(),
                layout,
            }
        };

        Self {
            target: TargetConfig {
                districts: data_dir.join("2018/districts/districts.shp"),
                id_field: TargetConfig::default_id_field(),
                name_field: TargetConfig::default_name_field(),
            },
            sources: vec![
                source(2011, 0.25, baseline_2011(), YearLayout::legacy_2011()),
                source(2014, 0.75, baseline_2014(), YearLayout::legacy_2014()),
            ],
            strict_missing_votes: false,
            max_record_errors: default_max_record_errors(),
            output: Some(PathBuf::from("ridings_2018.json")),
        }
    }
}
