//! One run: load each source election, project it onto the target districts,
//! then blend the projections.

use std::collections::BTreeSet;

use ahash::AHashMap;
use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;

use crate::{
    config::{RunConfig, SourceConfig},
    district::{assign_weights, PollLocation, SourceDistrict, TargetSet},
    error::{Diagnostics, ProjectionError, ProjectionResult},
    io,
    projection::{aggregate, blend, Projection},
    results::{reconcile, ResultSheet, Roster, RosterBook, VoteTable, YearLayout},
    types::{DistrictId, PartyTally},
};

/// Everything loaded for one historical election.
#[derive(Debug, Clone)]
pub struct SourceElection {
    pub year: u16,
    pub districts: Vec<SourceDistrict>,
    pub polls: Vec<PollLocation>,
    pub sheets: Vec<ResultSheet>,
    pub rosters: RosterBook,
    pub layout: YearLayout,
    pub baseline: PartyTally,
}

/// Run-wide error policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub strict_missing_votes: bool,
    pub max_record_errors: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { strict_missing_votes: false, max_record_errors: 10 }
    }
}

impl From<&RunConfig> for RunOptions {
    fn from(config: &RunConfig) -> Self {
        Self { strict_missing_votes: config.strict_missing_votes, max_record_errors: config.max_record_errors }
    }
}

/// Projection of one historical election onto the target districts.
#[derive(Debug, Clone)]
pub struct YearProjection {
    pub year: u16,
    pub projection: Projection,
    pub diagnostics: Diagnostics,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub years: Vec<YearProjection>,
    pub blended: Projection,
}

fn describe(ids: &BTreeSet<DistrictId>) -> String {
    ids.iter().map(DistrictId::to_string).collect::<Vec<_>>().join(", ")
}

/// The source boundary file and the vote table must describe the same districts.
pub fn check_consistency(districts: &[SourceDistrict], votes: &VoteTable) -> ProjectionResult<()> {
    let geometry: BTreeSet<DistrictId> = districts.iter().map(|district| district.id).collect();
    let tabular: BTreeSet<DistrictId> = votes.district_ids().into_iter().collect();

    let no_results: BTreeSet<DistrictId> = geometry.difference(&tabular).copied().collect();
    let no_geometry: BTreeSet<DistrictId> = tabular.difference(&geometry).copied().collect();
    if !no_results.is_empty() || !no_geometry.is_empty() {
        return Err(ProjectionError::InconsistentDistricts(format!(
            "districts without results: [{}]; results without a district: [{}]",
            describe(&no_results),
            describe(&no_geometry),
        )));
    }
    Ok(())
}

/// Project one source election: weight assignment and reconciliation run
/// concurrently, aggregation starts once both are done.
pub fn project_election(targets: &TargetSet, election: &SourceElection, options: RunOptions) -> ProjectionResult<YearProjection> {
    let year = election.year;
    let rosters: AHashMap<DistrictId, Roster> = election.districts.iter()
        .filter_map(|district| election.rosters.get(&district.name).map(|roster| (district.id, roster.clone())))
        .collect();

    let ((weights, mut diagnostics), reconciled) = rayon::join(
        || assign_weights(targets, &election.polls, &election.districts),
        || reconcile(&election.sheets, &rosters, &election.layout),
    );
    info!("[project {year}] poll and district weights assigned");

    let (votes, reconcile_diagnostics) = reconciled?;
    info!("[project {year}] results reconciled for {} districts", votes.len());
    diagnostics.merge(reconcile_diagnostics);
    diagnostics.check_threshold(options.max_record_errors)?;

    check_consistency(&election.districts, &votes)?;

    let (projection, aggregate_diagnostics) = aggregate(targets, &weights, &votes, &election.baseline, options.strict_missing_votes);
    diagnostics.merge(aggregate_diagnostics);
    diagnostics.check_threshold(options.max_record_errors)?;
    info!(
        "[project {year}] results calculated for {} districts ({} lookup misses, {} unattributable sources, {} errors)",
        projection.len(),
        diagnostics.missing_votes(),
        diagnostics.unattributable(),
        diagnostics.errors().len(),
    );

    Ok(YearProjection { year, projection, diagnostics })
}

/// Load a source election's boundary files, results workbooks and roster.
pub fn load_election(config: &SourceConfig) -> Result<SourceElection> {
    let year = config.year;
    let fields = &config.fields;

    let districts = io::read_source_districts(&config.districts, &fields.district_id, &fields.district_name)?;
    info!("[load {year}] {} districts loaded", districts.len());
    let polls = io::read_poll_locations(&config.polls, &fields.poll_district, &fields.poll_number)?;
    info!("[load {year}] {} polling locations loaded", polls.len());
    let rosters = io::read_roster(&config.roster)?;
    info!("[load {year}] candidate list loaded for {} districts", rosters.len());
    let sheets = io::read_results_dir(&config.results_dir, &config.layout)?;
    info!("[load {year}] {} results sheets loaded", sheets.len());

    Ok(SourceElection {
        year,
        districts,
        polls,
        sheets,
        rosters,
        layout: config.layout.clone(),
        baseline: config.baseline,
    })
}

fn zero_vote_districts(year: &YearProjection) -> Vec<DistrictId> {
    year.diagnostics.errors().iter()
        .filter_map(|error| match error {
            ProjectionError::ZeroVoteSum { district } => Some(*district),
            _ => None,
        })
        .collect()
}

/// Blend per-year projections with `weights`, parallel to `years`.
///
/// A district one year dropped for lack of votes makes the blend fail; the
/// error then names those districts per year.
pub fn blend_years(years: &[YearProjection], weights: &[f64]) -> Result<Projection> {
    let inputs: Vec<(&Projection, f64)> = years.iter().zip(weights)
        .map(|(year, weight)| (&year.projection, *weight))
        .collect();
    blend(&inputs).with_context(|| {
        let dropped: Vec<String> = years.iter()
            .filter_map(|year| {
                let ids: BTreeSet<DistrictId> = zero_vote_districts(year).into_iter().collect();
                (!ids.is_empty()).then(|| format!("{}: [{}]", year.year, describe(&ids)))
            })
            .collect();
        if dropped.is_empty() {
            "Failed to blend the yearly projections".to_string()
        } else {
            format!("Failed to blend the yearly projections; districts left out for having no votes: {}", dropped.join("; "))
        }
    })
}

/// Project every configured election in parallel and blend them with their configured weights.
pub fn run(config: &RunConfig) -> Result<RunOutput> {
    config.validate()?;
    let options = RunOptions::from(config);

    let target = &config.target;
    let targets = TargetSet::new(io::read_target_districts(&target.districts, &target.id_field, &target.name_field)?)?;
    info!("[run] {} target districts loaded", targets.len());

    let years = config.sources.par_iter()
        .map(|source| {
            let election = load_election(source)?;
            project_election(&targets, &election, options)
                .with_context(|| format!("Failed to project the {} election", source.year))
        })
        .collect::<Result<Vec<_>>>()?;

    let weights: Vec<f64> = config.sources.iter().map(|source| source.weight).collect();
    let blended = blend_years(&years, &weights)?;
    info!("[run] blended {} elections into {} districts", years.len(), blended.len());

    Ok(RunOutput { years, blended })
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use super::*;
    use crate::{
        district::TargetDistrict,
        results::{Cell, CellGrid, DistrictVotes},
        types::{PollKey, SourcePoll},
    };

    fn rect(x0: f64, x1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: 0.0), (x: x1, y: 0.0), (x: x1, y: 1.0), (x: x0, y: 1.0), (x: x0, y: 0.0),
        ]])
    }

    fn grid(poll_votes: [&str; 3], advance: [&str; 3]) -> CellGrid {
        let mut header: Vec<Cell> = vec!["POLL".into(), Cell::Empty, Cell::Empty];
        header.extend(["ANN", "BOB", "CY"].map(Cell::from));
        let row = |label: &str, votes: [&str; 3]| {
            let mut cells: Vec<Cell> = vec![label.into(), Cell::Empty, Cell::Empty];
            cells.extend(votes.map(Cell::from));
            cells
        };
        CellGrid::new(vec![
            vec!["District".into()],
            header,
            row("1", poll_votes),
            row("ADV", advance),
            vec!["Totals".into()],
        ])
    }

    fn election() -> SourceElection {
        let mut rosters = RosterBook::new();
        rosters.insert("Old", Roster::from_candidates("ANN", "BOB", "CY"));
        SourceElection {
            year: 2014,
            districts: vec![SourceDistrict { id: DistrictId(1), name: "Old".into(), geometry: rect(0.0, 10.0) }],
            polls: vec![PollLocation { poll: SourcePoll::new(1, 1), geometry: rect(0.0, 10.0) }],
            sheets: vec![ResultSheet { district: DistrictId(1), grid: grid(["60", "30", "10"], ["20", "20", "0"]) }],
            rosters,
            layout: YearLayout::legacy_2014(),
            baseline: PartyTally::new(40.0, 40.0, 20.0, 0.0),
        }
    }

    fn targets() -> TargetSet {
        TargetSet::new(vec![
            TargetDistrict { id: DistrictId(10), name: "West".into(), geometry: rect(0.0, 6.0) },
            TargetDistrict { id: DistrictId(20), name: "East".into(), geometry: rect(6.0, 10.0) },
        ]).unwrap()
    }

    #[test]
    fn projects_one_election_end_to_end() {
        let year = project_election(&targets(), &election(), RunOptions::default()).unwrap();
        assert!(year.diagnostics.is_clean());

        let west = year.projection.get(DistrictId(10)).unwrap();
        let east = year.projection.get(DistrictId(20)).unwrap();
        for (got, expected) in [(west.results, 0.6), (east.results, 0.4)] {
            assert!((got.sum() - 140.0 * expected).abs() < 1e-9);
        }
        assert!((west.percents.sum() - 100.0).abs() < 1e-9);
        assert!((west.results.sum() + east.results.sum() - 140.0).abs() < 1e-9);
    }

    #[test]
    fn voided_poll_is_not_missing_data() {
        let mut election = election();
        election.polls = vec![
            PollLocation { poll: SourcePoll::new(1, 1), geometry: rect(0.0, 6.0) },
            PollLocation { poll: SourcePoll::new(1, 2), geometry: rect(6.0, 10.0) },
        ];
        let base = grid(["60", "30", "10"], ["20", "20", "0"]);
        let mut rows: Vec<Vec<Cell>> = (0..base.height()).map(|row| base.row(row).to_vec()).collect();
        rows.insert(3, vec!["2".into(), Cell::Empty, "NO POLL".into()]);
        election.sheets[0].grid = CellGrid::new(rows);

        for strict_missing_votes in [false, true] {
            let options = RunOptions { strict_missing_votes, ..RunOptions::default() };
            let year = project_election(&targets(), &election, options).unwrap();
            assert!(year.diagnostics.is_clean());
            assert_eq!(year.diagnostics.missing_votes(), 0);
            assert_eq!(year.projection.len(), 2);
            assert!((year.projection.get(DistrictId(10)).unwrap().results.sum() - (100.0 + 40.0 * 0.6)).abs() < 1e-9);
        }
    }

    #[test]
    fn blend_failure_names_zero_vote_districts() {
        let full = project_election(&targets(), &election(), RunOptions::default()).unwrap();
        let mut partial = full.clone();
        partial.year = 2011;
        partial.projection = Projection::new(vec![full.projection.get(DistrictId(10)).unwrap().clone()]);
        partial.diagnostics.report(ProjectionError::ZeroVoteSum { district: DistrictId(20) });

        let error = blend_years(&[partial, full.clone()], &[0.25, 0.75]).unwrap_err();
        let message = format!("{error:#}");
        assert!(message.contains("no votes: 2011: [20]"), "{message}");
        assert!(matches!(
            error.downcast_ref::<ProjectionError>(),
            Some(ProjectionError::MissingDistrictInBlend { district: DistrictId(20), .. })
        ));

        let blended = blend_years(&[full.clone(), full], &[0.25, 0.75]).unwrap();
        assert_eq!(blended.len(), 2);
    }

    #[test]
    fn missing_results_sheet_aborts() {
        let mut election = election();
        election.districts.push(SourceDistrict { id: DistrictId(2), name: "Gone".into(), geometry: rect(20.0, 30.0) });
        let result = project_election(&targets(), &election, RunOptions::default());
        assert!(matches!(result, Err(ProjectionError::InconsistentDistricts(_))));
    }

    #[test]
    fn consistency_reports_both_directions() {
        let mut votes = VoteTable::new();
        votes.insert(DistrictId(5), DistrictVotes::from([(PollKey::Advance, PartyTally::default())]));
        let districts = vec![SourceDistrict { id: DistrictId(4), name: "Four".into(), geometry: rect(0.0, 1.0) }];
        match check_consistency(&districts, &votes) {
            Err(ProjectionError::InconsistentDistricts(message)) => {
                assert!(message.contains("without results: [4]"));
                assert!(message.contains("without a district: [5]"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_threshold_aborts_the_run() {
        let mut election = election();
        election.sheets[0].grid = grid(["60", "oops", "10"], ["20", "20", "0"]);
        let strict = RunOptions { max_record_errors: 0, ..RunOptions::default() };
        assert_eq!(
            project_election(&targets(), &election, strict).err(),
            Some(ProjectionError::ErrorThresholdExceeded { count: 1, limit: 0 })
        );

        let lenient = project_election(&targets(), &election, RunOptions::default()).unwrap();
        assert_eq!(lenient.diagnostics.errors().len(), 1);
        assert_eq!(lenient.diagnostics.missing_votes(), 2);
    }
}
