use std::collections::BTreeMap;

use super::super::taxonomy::Country;

/// Score assigned when an indicator gives no usable signal.
pub const NEUTRAL_SCORE: i32 = 50;

const MIN_SPREAD: f64 = 1e-9;

/// Min-max normalization across the tracked countries.
///
/// Countries with a missing value are imputed with the median of the
/// available values before scaling, which keeps a single outlier from
/// dragging every gap-filled country toward it. A degenerate spread (all
/// values equal, or nothing known) yields the neutral score for everyone.
pub fn normalize_local(
    values: &BTreeMap<Country, Option<f64>>,
    higher_is_better: bool,
) -> BTreeMap<Country, i32> {
    let known: Vec<f64> = values.values().filter_map(|value| *value).collect();
    if known.is_empty() {
        return values.keys().map(|country| (*country, NEUTRAL_SCORE)).collect();
    }

    let min = known.iter().copied().fold(f64::INFINITY, f64::min);
    let max = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < MIN_SPREAD {
        return values.keys().map(|country| (*country, NEUTRAL_SCORE)).collect();
    }

    let median = median_of(&known);
    values
        .iter()
        .map(|(country, value)| {
            let value = value.unwrap_or(median);
            let mut ratio = (value - min) / (max - min);
            if !higher_is_better {
                ratio = 1.0 - ratio;
            }
            (*country, (ratio * 100.0).round() as i32)
        })
        .collect()
}

/// Percentile ranking against a global reference distribution.
///
/// The rank is a leftmost insertion point over the sorted reference: the
/// number of reference values strictly less than the country's value.
/// Dividing by `len - 1` puts the reference minimum at percentile 0 and the
/// maximum at 1. Missing country values are imputed with the reference
/// median. An empty reference returns `None`; the caller falls back to
/// local normalization.
pub fn normalize_global(
    values: &BTreeMap<Country, Option<f64>>,
    reference: &[f64],
    higher_is_better: bool,
) -> Option<BTreeMap<Country, i32>> {
    if reference.is_empty() {
        return None;
    }

    let mut sorted: Vec<f64> = reference.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = median_of_sorted(&sorted);
    let max_index = sorted.len().saturating_sub(1).max(1);

    let normalized = values
        .iter()
        .map(|(country, value)| {
            let value = value.unwrap_or(median);
            let rank = sorted.partition_point(|reference| *reference < value);
            // Values beyond the reference extremes saturate at the bounds.
            let mut percentile = (rank as f64 / max_index as f64).clamp(0.0, 1.0);
            if !higher_is_better {
                percentile = 1.0 - percentile;
            }
            (*country, (percentile * 100.0).round() as i32)
        })
        .collect();

    Some(normalized)
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    median_of_sorted(&sorted)
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
