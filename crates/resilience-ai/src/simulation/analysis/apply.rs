use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::scenario::Impact;
use super::super::taxonomy::{Aspect, Country};

/// Ranking movement for one country between baseline and updated totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub country: Country,
    pub rank: usize,
    pub previous_rank: usize,
    /// Positive means the country moved toward #1.
    pub rank_change: i32,
    pub score: i32,
    pub score_change: i32,
}

/// Summed applied delta for one aspect across all countries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectDelta {
    pub aspect: Aspect,
    pub delta: i32,
}

/// Movers and dominant aspects for the headline summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub top_risers: Vec<RankChange>,
    pub top_fallers: Vec<RankChange>,
    pub top_aspects: Vec<AspectDelta>,
}

/// Apply impacts onto a copy of the baseline aspect scores.
///
/// Returns the updated scores and the *applied* delta per country/aspect:
/// saturation at the 0/100 bounds is observable, so a requested +20 on a
/// baseline of 95 records +5. Applied deltas accumulate when several
/// impacts touch the same cell.
pub fn apply_impacts(
    baseline: &BTreeMap<Country, BTreeMap<Aspect, i32>>,
    impacts: &[Impact],
) -> (
    BTreeMap<Country, BTreeMap<Aspect, i32>>,
    BTreeMap<Country, BTreeMap<Aspect, i32>>,
) {
    let mut updated = baseline.clone();
    let mut deltas: BTreeMap<Country, BTreeMap<Aspect, i32>> = baseline
        .keys()
        .map(|country| {
            (
                *country,
                Aspect::ALL.into_iter().map(|aspect| (aspect, 0)).collect(),
            )
        })
        .collect();

    for impact in impacts {
        let Some(aspects) = updated.get_mut(&impact.country) else {
            continue;
        };
        let Some(current) = aspects.get_mut(&impact.aspect) else {
            continue;
        };
        let new_value = (*current + impact.delta).clamp(0, 100);
        let applied = new_value - *current;
        *current = new_value;
        if let Some(country_deltas) = deltas.get_mut(&impact.country) {
            *country_deltas.entry(impact.aspect).or_insert(0) += applied;
        }
    }

    (updated, deltas)
}

/// 1-based ranks over totals for both score sets, sorted by the new rank.
/// Ties keep the canonical country order on both sides.
pub fn build_rank_changes(
    baseline_scores: &BTreeMap<Country, i32>,
    new_scores: &BTreeMap<Country, i32>,
) -> Vec<RankChange> {
    let baseline_pos = rank_positions(baseline_scores);
    let new_pos = rank_positions(new_scores);

    let mut changes: Vec<RankChange> = new_scores
        .iter()
        .map(|(country, score)| {
            let previous_rank = baseline_pos.get(country).copied().unwrap_or(0);
            let rank = new_pos.get(country).copied().unwrap_or(0);
            RankChange {
                country: *country,
                rank,
                previous_rank,
                rank_change: previous_rank as i32 - rank as i32,
                score: *score,
                score_change: score
                    - baseline_scores.get(country).copied().unwrap_or(0),
            }
        })
        .collect();

    changes.sort_by_key(|change| change.rank);
    changes
}

/// Top 3 risers by rank gained, top 3 fallers with the steepest drop
/// first, and the 3 aspects with the largest total applied movement.
pub fn summarize_impacts(
    rank_changes: &[RankChange],
    deltas: &BTreeMap<Country, BTreeMap<Aspect, i32>>,
) -> ImpactSummary {
    let mut ranked: Vec<RankChange> = rank_changes.to_vec();
    ranked.sort_by_key(|change| std::cmp::Reverse(change.rank_change));

    let top_risers: Vec<RankChange> = ranked
        .iter()
        .filter(|change| change.rank_change > 0)
        .take(3)
        .cloned()
        .collect();
    let top_fallers: Vec<RankChange> = ranked
        .iter()
        .rev()
        .filter(|change| change.rank_change < 0)
        .take(3)
        .cloned()
        .collect();

    let mut aspect_totals: BTreeMap<Aspect, i32> =
        Aspect::ALL.into_iter().map(|aspect| (aspect, 0)).collect();
    for country_deltas in deltas.values() {
        for (aspect, delta) in country_deltas {
            *aspect_totals.entry(*aspect).or_insert(0) += delta;
        }
    }

    let mut top_aspects: Vec<AspectDelta> = aspect_totals
        .into_iter()
        .map(|(aspect, delta)| AspectDelta { aspect, delta })
        .collect();
    top_aspects.sort_by_key(|entry| std::cmp::Reverse(entry.delta.abs()));
    top_aspects.truncate(3);

    ImpactSummary {
        top_risers,
        top_fallers,
        top_aspects,
    }
}

fn rank_positions(scores: &BTreeMap<Country, i32>) -> BTreeMap<Country, usize> {
    let mut ordered: Vec<(Country, i32)> =
        scores.iter().map(|(country, score)| (*country, *score)).collect();
    ordered.sort_by_key(|(_, score)| std::cmp::Reverse(*score));
    ordered
        .into_iter()
        .enumerate()
        .map(|(index, (country, _))| (country, index + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_with(country: Country, aspect: Aspect, score: i32)
        -> BTreeMap<Country, BTreeMap<Aspect, i32>>
    {
        let mut baseline: BTreeMap<Country, BTreeMap<Aspect, i32>> = Country::ALL
            .into_iter()
            .map(|entry| {
                (
                    entry,
                    Aspect::ALL.into_iter().map(|aspect| (aspect, 50)).collect(),
                )
            })
            .collect();
        if let Some(aspects) = baseline.get_mut(&country) {
            aspects.insert(aspect, score);
        }
        baseline
    }

    #[test]
    fn applied_delta_reflects_boundary_saturation() {
        let baseline = baseline_with(Country::Japan, Aspect::EconomicStability, 95);
        let impacts = vec![Impact {
            country: Country::Japan,
            aspect: Aspect::EconomicStability,
            delta: 20,
            reason: "surge".to_string(),
        }];

        let (updated, deltas) = apply_impacts(&baseline, &impacts);
        assert_eq!(updated[&Country::Japan][&Aspect::EconomicStability], 100);
        assert_eq!(deltas[&Country::Japan][&Aspect::EconomicStability], 5);
    }

    #[test]
    fn applied_deltas_accumulate_per_cell() {
        let baseline = baseline_with(Country::India, Aspect::EnergySecurity, 50);
        let impacts = vec![
            Impact {
                country: Country::India,
                aspect: Aspect::EnergySecurity,
                delta: -10,
                reason: "first".to_string(),
            },
            Impact {
                country: Country::India,
                aspect: Aspect::EnergySecurity,
                delta: -10,
                reason: "second".to_string(),
            },
        ];

        let (updated, deltas) = apply_impacts(&baseline, &impacts);
        assert_eq!(updated[&Country::India][&Aspect::EnergySecurity], 30);
        assert_eq!(deltas[&Country::India][&Aspect::EnergySecurity], -20);
    }

    #[test]
    fn scores_never_leave_bounds() {
        let baseline = baseline_with(Country::Nepal, Aspect::DebtFiscalSustainability, 5);
        let impacts = vec![Impact {
            country: Country::Nepal,
            aspect: Aspect::DebtFiscalSustainability,
            delta: -20,
            reason: "crash".to_string(),
        }];

        let (updated, deltas) = apply_impacts(&baseline, &impacts);
        assert_eq!(updated[&Country::Nepal][&Aspect::DebtFiscalSustainability], 0);
        assert_eq!(deltas[&Country::Nepal][&Aspect::DebtFiscalSustainability], -5);
    }

    #[test]
    fn rank_change_is_positive_when_moving_up() {
        let baseline: BTreeMap<Country, i32> = [
            (Country::India, 60),
            (Country::China, 70),
            (Country::Japan, 80),
        ]
        .into_iter()
        .collect();
        let updated: BTreeMap<Country, i32> = [
            (Country::India, 85),
            (Country::China, 70),
            (Country::Japan, 80),
        ]
        .into_iter()
        .collect();

        let changes = build_rank_changes(&baseline, &updated);
        assert_eq!(changes[0].country, Country::India);
        assert_eq!(changes[0].previous_rank, 3);
        assert_eq!(changes[0].rank, 1);
        assert_eq!(changes[0].rank_change, 2);
        assert_eq!(changes[0].score_change, 25);

        let japan = changes
            .iter()
            .find(|change| change.country == Country::Japan)
            .expect("japan present");
        assert_eq!(japan.rank_change, -1);
    }

    #[test]
    fn ties_keep_canonical_country_order() {
        let scores: BTreeMap<Country, i32> =
            Country::ALL.into_iter().map(|country| (country, 50)).collect();
        let changes = build_rank_changes(&scores, &scores);
        for (index, change) in changes.iter().enumerate() {
            assert_eq!(change.country, Country::ALL[index]);
            assert_eq!(change.rank_change, 0);
        }
    }

    #[test]
    fn summary_orders_fallers_steepest_first() {
        let baseline: BTreeMap<Country, i32> = Country::ALL
            .into_iter()
            .enumerate()
            .map(|(index, country)| (country, 90 - index as i32 * 5))
            .collect();
        let mut updated = baseline.clone();
        // India drops from rank 1 to the bottom; everyone else rises one.
        updated.insert(Country::India, 10);

        let changes = build_rank_changes(&baseline, &updated);
        let summary = summarize_impacts(&changes, &BTreeMap::new());

        assert_eq!(summary.top_fallers.len(), 1);
        assert_eq!(summary.top_fallers[0].country, Country::India);
        assert_eq!(summary.top_fallers[0].rank_change, -9);
        assert_eq!(summary.top_risers.len(), 3);
    }

    #[test]
    fn top_aspects_rank_by_absolute_total() {
        let mut deltas: BTreeMap<Country, BTreeMap<Aspect, i32>> = BTreeMap::new();
        deltas.insert(
            Country::India,
            [
                (Aspect::EconomicStability, -12),
                (Aspect::EnergySecurity, 4),
                (Aspect::HealthcareBiologicalReadiness, -6),
            ]
            .into_iter()
            .collect(),
        );
        deltas.insert(
            Country::China,
            [(Aspect::EnergySecurity, 5)].into_iter().collect(),
        );

        let summary = summarize_impacts(&[], &deltas);
        assert_eq!(summary.top_aspects.len(), 3);
        assert_eq!(summary.top_aspects[0].aspect, Aspect::EconomicStability);
        assert_eq!(summary.top_aspects[0].delta, -12);
        assert_eq!(summary.top_aspects[1].aspect, Aspect::EnergySecurity);
        assert_eq!(summary.top_aspects[1].delta, 9);
    }
}
