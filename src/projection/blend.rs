use ahash::AHashMap;

use crate::{
    error::{ProjectionError, ProjectionResult},
    types::{DistrictId, PartyTally},
};
use super::{ProjectedDistrict, Projection};

const WEIGHT_TOLERANCE: f64 = 1e-9;

fn check_weights(inputs: &[(&Projection, f64)]) -> ProjectionResult<()> {
    if inputs.is_empty() {
        return Err(ProjectionError::InvalidBlendWeights("nothing to blend".into()));
    }
    if let Some((i, (_, weight))) = inputs.iter().enumerate().find(|(_, (_, w))| !(w.is_finite() && *w >= 0.0)) {
        return Err(ProjectionError::InvalidBlendWeights(format!("weight {weight} of projection {i} is not a non-negative number")));
    }
    let total: f64 = inputs.iter().map(|(_, weight)| weight).sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ProjectionError::InvalidBlendWeights(format!("weights sum to {total}, not 1")));
    }
    Ok(())
}

/// Weighted average of several projections of the same target districts.
///
/// Every district of every input must appear in all inputs; a district missing
/// from any projection fails the blend. Output follows the first projection's order and names.
pub fn blend(inputs: &[(&Projection, f64)]) -> ProjectionResult<Projection> {
    check_weights(inputs)?;

    let lookups: Vec<AHashMap<DistrictId, &ProjectedDistrict>> = inputs.iter()
        .map(|(projection, _)| projection.districts().iter().map(|d| (d.id, d)).collect())
        .collect();

    for (i, lookup) in lookups.iter().enumerate() {
        for (j, (projection, _)) in inputs.iter().enumerate() {
            if let Some(district) = projection.districts().iter().find(|d| !lookup.contains_key(&d.id)) {
                log::debug!("[blend] district {} of projection {j} is absent from projection {i}", district.id);
                return Err(ProjectionError::MissingDistrictInBlend { district: district.id, projection: i });
            }
        }
    }

    let (first, _) = inputs[0];
    let districts = first.districts().iter()
        .map(|district| {
            let mut results = PartyTally::default();
            let mut percents = PartyTally::default();
            let mut swings = PartyTally::default();
            for (lookup, (_, weight)) in lookups.iter().zip(inputs) {
                let other = lookup[&district.id];
                results.add_scaled(&other.results, *weight);
                percents.add_scaled(&other.percents, *weight);
                swings.add_scaled(&other.swings, *weight);
            }
            ProjectedDistrict { name: district.name.clone(), id: district.id, results, percents, swings }
        })
        .collect();

    Ok(Projection::new(districts))
}
