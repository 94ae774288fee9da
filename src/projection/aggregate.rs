use rayon::prelude::*;

use crate::{
    district::{DistrictWeights, TargetDistrict, TargetSet, WeightTable},
    error::{Diagnostics, ProjectionError, ProjectionResult},
    results::{PollVotes, VoteTable},
    types::{DistrictId, PartyTally, PollKey},
};
use super::{ProjectedDistrict, Projection};

/// Sum the weighted poll and advance-poll contributions of one target district.
///
/// A voided poll contributes zero silently. A lookup miss contributes zero and
/// is counted in `diagnostics`; with `strict` it fails with `MissingVoteData` instead.
pub fn tally_district(
    weights: &DistrictWeights,
    votes: &VoteTable,
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> ProjectionResult<PartyTally> {
    let contributions = weights.polls.iter()
        .map(|(poll, weight)| (poll.district, poll.key(), *weight))
        .chain(weights.districts.iter().map(|(district, weight)| (*district, PollKey::Advance, *weight)));

    let mut total = PartyTally::default();
    for (district, poll, weight) in contributions {
        match votes.lookup(district, poll) {
            PollVotes::Counted(tally) => total.add_scaled(tally, weight),
            PollVotes::Voided => {}
            PollVotes::Missing if strict => return Err(ProjectionError::MissingVoteData { district, poll }),
            PollVotes::Missing => diagnostics.note_missing_votes(district, poll),
        }
    }
    Ok(total)
}

/// Derive percentages and swings from final vote totals.
pub fn finalize(
    id: DistrictId,
    name: &str,
    results: PartyTally,
    baseline: &PartyTally,
) -> ProjectionResult<ProjectedDistrict> {
    let vote_sum = results.sum();
    if !(vote_sum > 0.0) {
        return Err(ProjectionError::ZeroVoteSum { district: id });
    }

    let percents = results.scaled(100.0 / vote_sum);
    let swings = PartyTally::from_fn(|party| percents[party] - baseline[party]);
    Ok(ProjectedDistrict { name: name.to_string(), id, results, percents, swings })
}

fn project_district(
    target: &TargetDistrict,
    weights: &DistrictWeights,
    votes: &VoteTable,
    baseline: &PartyTally,
    strict: bool,
) -> (ProjectionResult<ProjectedDistrict>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let projected = tally_district(weights, votes, strict, &mut diagnostics)
        .and_then(|results| finalize(target.id, &target.name, results, baseline));
    (projected, diagnostics)
}

/// Project one source election onto every target district.
///
/// Districts that fail (zero vote sum, or a strict lookup miss) are reported in
/// the returned diagnostics and left out of the projection.
pub fn aggregate(
    targets: &TargetSet,
    weights: &WeightTable,
    votes: &VoteTable,
    baseline: &PartyTally,
    strict: bool,
) -> (Projection, Diagnostics) {
    let empty = DistrictWeights::default();
    let projected: Vec<_> = targets.districts().par_iter().enumerate()
        .map(|(i, target)| project_district(target, weights.get(i).unwrap_or(&empty), votes, baseline, strict))
        .collect();

    let mut diagnostics = Diagnostics::new();
    let mut districts = Vec::with_capacity(projected.len());
    for (result, district_diagnostics) in projected {
        diagnostics.merge(district_diagnostics);
        match result {
            Ok(district) => districts.push(district),
            Err(error) => diagnostics.report(error),
        }
    }

    (Projection::new(districts), diagnostics)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        results::{DistrictVotes, VoidedPolls},
        types::{Party, SourcePoll},
    };

    fn votes() -> VoteTable {
        let mut table = VoteTable::new();
        table.insert(DistrictId(1), DistrictVotes::from([
            (PollKey::Number(1), PartyTally::new(100.0, 50.0, 25.0, 25.0)),
            (PollKey::Number(2), PartyTally::new(0.0, 0.0, 0.0, 0.0)),
            (PollKey::Advance, PartyTally::new(40.0, 40.0, 20.0, 0.0)),
        ]));
        table.insert_voided(DistrictId(1), VoidedPolls::from([PollKey::Number(3)]));
        table
    }

    #[test]
    fn percents_and_swings() {
        let baseline = PartyTally::new(38.7, 31.3, 23.7, 6.1);
        let district = finalize(DistrictId(9), "Nine", PartyTally::new(50.0, 30.0, 15.0, 5.0), &baseline).unwrap();
        let expected_swings = [11.3, -1.3, -8.7, -1.1];
        for (party, expected) in Party::order().into_iter().zip(expected_swings) {
            assert_abs_diff_eq!(district.percents[party], district.results[party], epsilon = 1e-9);
            assert_abs_diff_eq!(district.swings[party], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_vote_sum_is_raised() {
        assert_eq!(
            finalize(DistrictId(3), "Three", PartyTally::default(), &PartyTally::default()),
            Err(ProjectionError::ZeroVoteSum { district: DistrictId(3) })
        );
    }

    #[test]
    fn weighted_poll_and_advance_contributions() {
        let weights = DistrictWeights {
            polls: vec![(SourcePoll::new(1, 1), 0.5), (SourcePoll::new(1, 2), 1.0)],
            districts: vec![(DistrictId(1), 0.25)],
        };
        let mut diagnostics = Diagnostics::new();
        let total = tally_district(&weights, &votes(), false, &mut diagnostics).unwrap();
        assert_eq!(total, PartyTally::new(60.0, 35.0, 17.5, 12.5));
        assert_eq!(diagnostics.missing_votes(), 0);
    }

    #[test]
    fn missing_votes_are_counted_not_confused_with_zero() {
        let weights = DistrictWeights {
            polls: vec![(SourcePoll::new(1, 2), 1.0), (SourcePoll::new(1, 77), 1.0)],
            districts: vec![(DistrictId(8), 1.0)],
        };
        let mut diagnostics = Diagnostics::new();
        let total = tally_district(&weights, &votes(), false, &mut diagnostics).unwrap();
        assert_eq!(total, PartyTally::default());
        assert_eq!(diagnostics.missing_votes(), 2);
    }

    #[test]
    fn voided_polls_count_zero_even_in_strict_mode() {
        let weights = DistrictWeights {
            polls: vec![(SourcePoll::new(1, 1), 1.0), (SourcePoll::new(1, 3), 1.0)],
            districts: vec![],
        };
        for strict in [false, true] {
            let mut diagnostics = Diagnostics::new();
            let total = tally_district(&weights, &votes(), strict, &mut diagnostics).unwrap();
            assert_eq!(total, PartyTally::new(100.0, 50.0, 25.0, 25.0));
            assert_eq!(diagnostics.missing_votes(), 0);
        }
    }

    #[test]
    fn strict_mode_fails_on_missing_votes() {
        let weights = DistrictWeights { polls: vec![(SourcePoll::new(1, 77), 1.0)], districts: vec![] };
        let mut diagnostics = Diagnostics::new();
        assert_eq!(
            tally_district(&weights, &votes(), true, &mut diagnostics),
            Err(ProjectionError::MissingVoteData { district: DistrictId(1), poll: PollKey::Number(77) })
        );
    }
}
