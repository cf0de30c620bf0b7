use std::collections::BTreeMap;

use super::super::taxonomy::Aspect;
use super::indicators::ASPECT_WEIGHTS;
use super::normalizer::NEUTRAL_SCORE;

/// Blend one country's normalized indicators into its seven aspect scores.
///
/// An indicator referenced by the weight table but absent from the input
/// contributes the neutral score instead of failing; the aggregator never
/// errors on arbitrary positive weights.
pub fn aggregate_country(indicators: &BTreeMap<String, i32>) -> BTreeMap<Aspect, i32> {
    ASPECT_WEIGHTS
        .iter()
        .map(|(aspect, weights)| {
            let score: f64 = weights
                .iter()
                .map(|(indicator, weight)| {
                    let value = indicators
                        .get(*indicator)
                        .copied()
                        .unwrap_or(NEUTRAL_SCORE);
                    f64::from(value) * weight
                })
                .sum();
            (*aspect, score.round() as i32)
        })
        .collect()
}

/// Total score is the plain mean of the aspect scores, rounded. An empty
/// aspect map totals 0.
pub fn total_score(aspects: &BTreeMap<Aspect, i32>) -> i32 {
    if aspects.is_empty() {
        return 0;
    }
    let sum: i32 = aspects.values().sum();
    (f64::from(sum) / aspects.len() as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::taxonomy::Aspect;

    fn uniform_indicators(score: i32) -> BTreeMap<String, i32> {
        crate::simulation::baseline::indicators::INDICATOR_SPECS
            .iter()
            .map(|spec| (spec.name.to_string(), score))
            .collect()
    }

    #[test]
    fn uniform_indicators_give_uniform_aspects() {
        let aspects = aggregate_country(&uniform_indicators(80));
        assert_eq!(aspects.len(), 7);
        for (_, score) in &aspects {
            assert_eq!(*score, 80);
        }
    }

    #[test]
    fn weighted_blend_rounds_half_away_from_zero() {
        let mut indicators = uniform_indicators(0);
        indicators.insert("health_spend_per_capita".to_string(), 65);
        indicators.insert("life_expectancy".to_string(), 100);
        let aspects = aggregate_country(&indicators);
        // 65 * 0.7 + 100 * 0.3 = 75.5 -> 76
        assert_eq!(aspects[&Aspect::HealthcareBiologicalReadiness], 76);
    }

    #[test]
    fn missing_indicator_reads_neutral() {
        let aspects = aggregate_country(&BTreeMap::new());
        for (_, score) in &aspects {
            assert_eq!(*score, 50);
        }
    }

    #[test]
    fn total_is_rounded_mean_of_aspects() {
        let aspects: BTreeMap<Aspect, i32> = Aspect::ALL
            .into_iter()
            .zip([70, 71, 72, 73, 74, 75, 76])
            .collect();
        assert_eq!(total_score(&aspects), 73);
    }

    #[test]
    fn empty_aspects_total_zero() {
        assert_eq!(total_score(&BTreeMap::new()), 0);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let indicators = uniform_indicators(63);
        assert_eq!(aggregate_country(&indicators), aggregate_country(&indicators));
    }
}
