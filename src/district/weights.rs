use std::hash::Hash;

use ahash::AHashMap;
use rayon::prelude::*;

use crate::{
    error::{Diagnostics, ProjectionResult},
    geom::{normalize, HasGeometry, Overlap, Weight},
    types::{DistrictId, SourcePoll},
};
use super::{PollLocation, SourceDistrict, TargetSet};

/// Weighted sources attributed to one target district, in source load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictWeights {
    /// Fine-grained polling locations and the share of each inside this district.
    pub polls: Vec<(SourcePoll, f64)>,
    /// Source districts and the share of each inside this district (advance polls).
    pub districts: Vec<(DistrictId, f64)>,
}

/// Weights for every target district, parallel to `TargetSet::districts()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTable {
    weights: Vec<DistrictWeights>,
}

impl WeightTable {
    /// Zip per-target poll and district weight lists into one table.
    pub fn from_parts(polls: Vec<Vec<(SourcePoll, f64)>>, districts: Vec<Vec<(DistrictId, f64)>>) -> Self {
        Self {
            weights: polls.into_iter().zip(districts)
                .map(|(polls, districts)| DistrictWeights { polls, districts })
                .collect(),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.weights.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    /// Weights of the target district at `position`.
    #[inline] pub fn get(&self, position: usize) -> Option<&DistrictWeights> { self.weights.get(position) }

    #[inline] pub fn iter(&self) -> impl Iterator<Item = &DistrictWeights> { self.weights.iter() }
}

/// Add `parts` into `pooled`, summing the areas of repeated targets.
fn pool(pooled: &mut Vec<Overlap>, parts: Vec<Overlap>) {
    for part in parts {
        match pooled.iter_mut().find(|overlap| overlap.target == part.target) {
            Some(overlap) => overlap.area += part.area,
            None => pooled.push(part),
        }
    }
}

/// Overlay every source against the targets and fold the weights into one list per target.
///
/// Overlays run in parallel. Records sharing a key are parts of one source:
/// their overlaps are pooled and normalized together, so the source still
/// distributes a total weight of one. The fold runs in order of each key's
/// first record so each target's list is reproducible. Degenerate sources are
/// reported and skipped, sources that intersect nothing are counted as unattributable.
fn assign<S, K>(
    targets: &TargetSet,
    sources: &[S],
    key: impl Fn(&S) -> K + Sync,
    label: impl Fn(&S) -> String + Sync,
    keep_zero: bool,
) -> (Vec<Vec<(K, f64)>>, Diagnostics)
where
    S: HasGeometry + Sync,
    K: Copy + Eq + Hash + Send + Sync,
{
    let overlaps: Vec<Vec<Overlap>> = sources.par_iter()
        .map(|source| targets.overlay(source.geometry()))
        .collect();

    let mut groups: Vec<(K, &S, Vec<Overlap>)> = Vec::new();
    let mut position: AHashMap<K, usize> = AHashMap::new();
    for (source, parts) in sources.iter().zip(overlaps) {
        let id = key(source);
        match position.get(&id).copied() {
            Some(group) => {
                log::debug!("[weights] {} has several records; pooling their areas", label(source));
                pool(&mut groups[group].2, parts);
            }
            None => {
                position.insert(id, groups.len());
                groups.push((id, source, parts));
            }
        }
    }

    let resolved: Vec<ProjectionResult<Vec<Weight>>> = groups.par_iter()
        .map(|(_, source, overlaps)| normalize(overlaps, || label(source)))
        .collect();

    let mut diagnostics = Diagnostics::new();
    let mut lists: Vec<Vec<(K, f64)>> = vec![Vec::new(); targets.len()];
    for ((id, source, overlaps), weights) in groups.iter().zip(resolved) {
        if overlaps.is_empty() {
            diagnostics.note_unattributable(&label(source));
            continue;
        }
        match weights {
            Ok(weights) => {
                for Weight { target, weight } in weights {
                    if keep_zero || weight > 0.0 {
                        lists[target].push((*id, weight));
                    }
                }
            }
            Err(error) => diagnostics.report(error),
        }
    }

    (lists, diagnostics)
}

/// Poll-level weights: every source polling location against every target district.
/// Only strictly positive weights are kept.
pub fn assign_poll_weights(targets: &TargetSet, polls: &[PollLocation]) -> (Vec<Vec<(SourcePoll, f64)>>, Diagnostics) {
    assign(targets, polls, |location| location.poll, |location| format!("poll {}", location.poll), false)
}

/// District-level weights, used for advance polls that have no polling-location geometry.
pub fn assign_district_weights(targets: &TargetSet, districts: &[SourceDistrict]) -> (Vec<Vec<(DistrictId, f64)>>, Diagnostics) {
    assign(targets, districts, |district| district.id, |district| format!("source district {}", district.id), true)
}

/// Run both weight assignments concurrently and join them into one table.
pub fn assign_weights(targets: &TargetSet, polls: &[PollLocation], districts: &[SourceDistrict]) -> (WeightTable, Diagnostics) {
    let ((poll_weights, mut diagnostics), (district_weights, district_diagnostics)) = rayon::join(
        || assign_poll_weights(targets, polls),
        || assign_district_weights(targets, districts),
    );
    diagnostics.merge(district_diagnostics);

    (WeightTable::from_parts(poll_weights, district_weights), diagnostics)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use geo::{polygon, MultiPolygon};

    use super::*;
    use crate::{district::TargetDistrict, error::ProjectionError};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
        ]])
    }

    fn targets() -> TargetSet {
        TargetSet::new(vec![
            TargetDistrict { id: DistrictId(100), name: "West".into(), geometry: rect(0.0, 0.0, 6.0, 10.0) },
            TargetDistrict { id: DistrictId(200), name: "East".into(), geometry: rect(6.0, 0.0, 10.0, 10.0) },
        ]).unwrap()
    }

    #[test]
    fn poll_split_across_two_targets() {
        let polls = vec![
            PollLocation { poll: SourcePoll::new(1, 1), geometry: rect(0.0, 0.0, 10.0, 10.0) },
            PollLocation { poll: SourcePoll::new(1, 2), geometry: rect(1.0, 1.0, 2.0, 2.0) },
        ];
        let (lists, diagnostics) = assign_poll_weights(&targets(), &polls);

        assert!(diagnostics.is_clean());
        assert_eq!(lists[0].len(), 2);
        assert_eq!(lists[0][0].0, SourcePoll::new(1, 1));
        assert_abs_diff_eq!(lists[0][0].1, 0.6, epsilon = 1e-9);
        assert_eq!(lists[0][1], (SourcePoll::new(1, 2), 1.0));
        assert_eq!(lists[1].len(), 1);
        assert_abs_diff_eq!(lists[1][0].1, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn insertion_order_follows_source_order() {
        let polls: Vec<PollLocation> = (0..20)
            .map(|i| PollLocation {
                poll: SourcePoll::new(1, i),
                geometry: rect(0.1 * i as f64, 0.0, 0.1 * i as f64 + 0.1, 1.0),
            })
            .collect();
        let (lists, _) = assign_poll_weights(&targets(), &polls);
        let order: Vec<u32> = lists[0].iter().map(|(poll, _)| poll.poll).collect();
        assert_eq!(order, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn unattributable_poll_contributes_nothing() {
        let polls = vec![PollLocation { poll: SourcePoll::new(1, 9), geometry: rect(50.0, 50.0, 51.0, 51.0) }];
        let (lists, diagnostics) = assign_poll_weights(&targets(), &polls);
        assert!(lists.iter().all(|list| list.is_empty()));
        assert!(diagnostics.is_clean());
        assert_eq!(diagnostics.unattributable(), 1);
    }

    #[test]
    fn degenerate_poll_is_reported() {
        // A collapsed ring intersects the western target but encloses no area.
        let sliver = MultiPolygon(vec![polygon![
            (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 2.0, y: 3.0), (x: 2.0, y: 1.0),
        ]]);
        let polls = vec![PollLocation { poll: SourcePoll::new(4, 2), geometry: sliver }];
        let (lists, diagnostics) = assign_poll_weights(&targets(), &polls);
        assert!(lists.iter().all(|list| list.is_empty()));
        assert_eq!(
            diagnostics.errors(),
            &[ProjectionError::DegenerateGeometry { record: "poll 4/2".into() }]
        );
    }

    #[test]
    fn records_sharing_a_poll_are_weighted_as_one() {
        let polls = vec![
            PollLocation { poll: SourcePoll::new(1, 3), geometry: rect(0.0, 0.0, 3.0, 10.0) },
            PollLocation { poll: SourcePoll::new(1, 4), geometry: rect(7.0, 0.0, 8.0, 1.0) },
            PollLocation { poll: SourcePoll::new(1, 3), geometry: rect(3.0, 0.0, 6.0, 10.0) },
            PollLocation { poll: SourcePoll::new(1, 3), geometry: rect(6.0, 0.0, 8.0, 10.0) },
        ];
        let (lists, diagnostics) = assign_poll_weights(&targets(), &polls);

        assert!(diagnostics.is_clean());
        assert_eq!(lists[0].len(), 1);
        assert_eq!(lists[0][0].0, SourcePoll::new(1, 3));
        assert_abs_diff_eq!(lists[0][0].1, 0.75, epsilon = 1e-9);
        let east: Vec<SourcePoll> = lists[1].iter().map(|(poll, _)| *poll).collect();
        assert_eq!(east, vec![SourcePoll::new(1, 3), SourcePoll::new(1, 4)]);
        assert_abs_diff_eq!(lists[1][0].1, 0.25, epsilon = 1e-9);

        let total: f64 = lists.iter().flatten()
            .filter(|(poll, _)| *poll == SourcePoll::new(1, 3))
            .map(|(_, weight)| weight)
            .sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn district_weights_feed_the_table() {
        let districts = vec![SourceDistrict { id: DistrictId(1), name: "Old".into(), geometry: rect(3.0, 0.0, 9.0, 10.0) }];
        let polls = vec![PollLocation { poll: SourcePoll::new(1, 1), geometry: rect(0.0, 0.0, 1.0, 1.0) }];
        let (table, diagnostics) = assign_weights(&targets(), &polls, &districts);

        assert!(diagnostics.is_clean());
        assert_eq!(table.len(), 2);
        let west = table.get(0).unwrap();
        let east = table.get(1).unwrap();
        assert_eq!(west.polls, vec![(SourcePoll::new(1, 1), 1.0)]);
        assert!(east.polls.is_empty());
        assert_abs_diff_eq!(west.districts[0].1, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(east.districts[0].1, 0.5, epsilon = 1e-9);
    }
}
