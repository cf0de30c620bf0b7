use super::super::taxonomy::{Aspect, Country};
use super::profile::{coerce_delta, Impact, RawImpact};

/// Bounds for a single impact delta.
pub const MAX_DELTA: i32 = 20;

const DEFAULT_REASON: &str = "AI assessment of scenario impact.";
const COVERAGE_REASON: &str =
    "Global spillovers from the scenario affect trade, investment, and confidence.";

/// Validate raw interpretation output into well-formed impacts.
///
/// Entries missing a field, naming an unknown country or aspect, or
/// carrying a non-numeric delta are dropped, not corrected. Surviving
/// deltas are coerced away from zero and clamped into bounds.
pub fn sanitize_raw(raw: &[RawImpact]) -> Vec<Impact> {
    raw.iter()
        .filter_map(|entry| {
            let country = Country::parse(entry.country.as_deref()?)?;
            let aspect = Aspect::parse(entry.aspect.as_deref()?)?;
            let delta = coerce_delta(entry.delta.as_ref()?)?;
            let reason = entry
                .reason
                .clone()
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REASON.to_string());
            Some(Impact {
                country,
                aspect,
                delta: bound_delta(delta),
                reason,
            })
        })
        .collect()
}

/// Re-apply the delta invariants to already-typed impacts (used for the
/// synthesized path, where reasons may still be blank).
pub fn sanitize(impacts: Vec<Impact>) -> Vec<Impact> {
    impacts
        .into_iter()
        .map(|mut impact| {
            impact.delta = bound_delta(i64::from(impact.delta));
            if impact.reason.trim().is_empty() {
                impact.reason = DEFAULT_REASON.to_string();
            }
            impact
        })
        .collect()
}

/// Guarantee every tracked country appears at least once. Missing
/// countries receive a single Economic Stability spillover impact scaled
/// to 30% of the mean existing magnitude, signed by the overall
/// directional bias of what is already there.
pub fn ensure_country_coverage(mut impacts: Vec<Impact>) -> Vec<Impact> {
    let missing: Vec<Country> = Country::ALL
        .into_iter()
        .filter(|country| !impacts.iter().any(|impact| impact.country == *country))
        .collect();
    if missing.is_empty() {
        return impacts;
    }

    let mean_magnitude = if impacts.is_empty() {
        5.0
    } else {
        impacts
            .iter()
            .map(|impact| f64::from(impact.delta.abs()))
            .sum::<f64>()
            / impacts.len() as f64
    };
    let magnitude = (mean_magnitude * 0.3).round().max(2.0) as i32;

    let direction_sum: i32 = impacts.iter().map(|impact| impact.delta).sum();
    let direction = if impacts.is_empty() || direction_sum < 0 {
        -1
    } else {
        1
    };
    let delta = direction * magnitude;

    for country in missing {
        impacts.push(Impact {
            country,
            aspect: Aspect::EconomicStability,
            delta,
            reason: COVERAGE_REASON.to_string(),
        });
    }

    impacts
}

fn bound_delta(delta: i64) -> i32 {
    let delta = if delta == 0 { -1 } else { delta };
    delta.clamp(i64::from(-MAX_DELTA), i64::from(MAX_DELTA)) as i32
}
