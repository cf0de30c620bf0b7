use std::collections::BTreeMap;

use super::super::taxonomy::{Aspect, Country, Scope, Sector};
use super::profile::{Impact, ScenarioProfile};

/// Severity floor: every interpretable scenario has some effect.
const MIN_SEVERITY: f64 = 0.05;
/// Accumulated aspect deltas below this magnitude are noise and are not
/// reported, unless nothing clears it.
const SELECTION_THRESHOLD: f64 = 1.5;
/// At most this many aspects are reported per country.
const MAX_ASPECTS_PER_COUNTRY: usize = 3;
/// Listing at least this many countries promotes the scenario to global.
const GLOBAL_COUNTRY_THRESHOLD: usize = 8;

const AFFECTED_MULTIPLIER: f64 = 1.0;
const GLOBAL_SPILLOVER_MULTIPLIER: f64 = 0.35;
const LOCAL_SPILLOVER_MULTIPLIER: f64 = 0.2;

/// Fixed distribution of each sector's shock across aspects. Weights sum
/// to 1.0 per sector; compatibility constants, do not recalibrate.
pub fn sector_weights(sector: Sector) -> &'static [(Aspect, f64)] {
    match sector {
        Sector::Health => &[
            (Aspect::HealthcareBiologicalReadiness, 0.7),
            (Aspect::DemographicSocialStability, 0.2),
            (Aspect::EconomicStability, 0.1),
        ],
        Sector::Cyber => &[
            (Aspect::CyberResilienceDigitalInfrastructure, 0.7),
            (Aspect::DefenseStrategicSecurity, 0.2),
            (Aspect::EconomicStability, 0.1),
        ],
        Sector::Energy => &[
            (Aspect::EnergySecurity, 0.7),
            (Aspect::EconomicStability, 0.2),
            (Aspect::DebtFiscalSustainability, 0.1),
        ],
        Sector::Financial => &[
            (Aspect::EconomicStability, 0.5),
            (Aspect::DebtFiscalSustainability, 0.3),
            (Aspect::DemographicSocialStability, 0.2),
        ],
        Sector::Conflict => &[
            (Aspect::DefenseStrategicSecurity, 0.5),
            (Aspect::EconomicStability, 0.2),
            (Aspect::DemographicSocialStability, 0.2),
            (Aspect::EnergySecurity, 0.1),
        ],
        Sector::Climate => &[
            (Aspect::EconomicStability, 0.3),
            (Aspect::HealthcareBiologicalReadiness, 0.3),
            (Aspect::DemographicSocialStability, 0.2),
            (Aspect::EnergySecurity, 0.2),
        ],
        Sector::Social => &[
            (Aspect::DemographicSocialStability, 0.5),
            (Aspect::HealthcareBiologicalReadiness, 0.2),
            (Aspect::EconomicStability, 0.2),
            (Aspect::DefenseStrategicSecurity, 0.1),
        ],
        Sector::SupplyChain => &[
            (Aspect::EconomicStability, 0.5),
            (Aspect::EnergySecurity, 0.2),
            (Aspect::CyberResilienceDigitalInfrastructure, 0.2),
            (Aspect::DebtFiscalSustainability, 0.1),
        ],
        Sector::Governance => &[
            (Aspect::DemographicSocialStability, 0.4),
            (Aspect::EconomicStability, 0.3),
            (Aspect::DefenseStrategicSecurity, 0.2),
            (Aspect::DebtFiscalSustainability, 0.1),
        ],
    }
}

/// Turn a scenario profile into concrete per-country impacts.
///
/// Impact magnitude is inversely coupled to current resilience: a country
/// already weak in an aspect takes a proportionally harder hit there
/// (vulnerability multiplier 0.6-1.4 around the baseline score). Reasons
/// are left empty; the caller attaches explanations afterwards.
pub fn synthesize(
    profile: &ScenarioProfile,
    baseline_aspects: &BTreeMap<Country, BTreeMap<Aspect, i32>>,
) -> Vec<Impact> {
    let sectors: Vec<Sector> = if profile.sectors.is_empty() {
        vec![Sector::SupplyChain]
    } else {
        profile.sectors.clone()
    };

    let severity = if profile.severity.is_finite() {
        profile.severity.clamp(MIN_SEVERITY, 1.0)
    } else {
        0.5
    };
    let direction = if profile.direction > 0 { 1 } else { -1 };

    let summary_mentions_global = profile.summary.to_lowercase().contains("global");
    let is_global = profile.scope == Scope::Global
        || summary_mentions_global
        || profile.affected_countries.len() >= GLOBAL_COUNTRY_THRESHOLD;

    let affected: Vec<Country> = if profile.affected_countries.is_empty() && is_global {
        Country::ALL.to_vec()
    } else {
        profile.affected_countries.clone()
    };

    let base_magnitude = 6 + (14.0 * severity).round() as i32;

    let mut impacts = Vec::new();
    for country in Country::ALL {
        let multiplier = if affected.contains(&country) {
            AFFECTED_MULTIPLIER
        } else if is_global {
            GLOBAL_SPILLOVER_MULTIPLIER
        } else {
            LOCAL_SPILLOVER_MULTIPLIER
        };

        let country_aspects = baseline_aspects.get(&country);
        let mut aspect_deltas: BTreeMap<Aspect, f64> = BTreeMap::new();
        for sector in &sectors {
            for (aspect, weight) in sector_weights(*sector) {
                let baseline_score = country_aspects
                    .and_then(|aspects| aspects.get(aspect))
                    .copied()
                    .unwrap_or(50);
                let vulnerability = 0.6 + (1.0 - f64::from(baseline_score) / 100.0) * 0.8;
                let delta = f64::from(direction)
                    * f64::from(base_magnitude)
                    * weight
                    * vulnerability
                    * multiplier;
                *aspect_deltas.entry(*aspect).or_insert(0.0) += delta;
            }
        }

        if aspect_deltas.is_empty() {
            continue;
        }

        let mut ranked: Vec<(Aspect, f64)> = aspect_deltas.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.abs()
                .partial_cmp(&a.1.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let selected: Vec<(Aspect, f64)> = {
            let qualifying: Vec<(Aspect, f64)> = ranked
                .iter()
                .copied()
                .filter(|(_, delta)| delta.abs() >= SELECTION_THRESHOLD)
                .take(MAX_ASPECTS_PER_COUNTRY)
                .collect();
            if qualifying.is_empty() {
                ranked.into_iter().take(1).collect()
            } else {
                qualifying
            }
        };

        for (aspect, delta) in selected {
            let mut rounded = delta.round() as i32;
            if rounded == 0 {
                rounded = direction;
            }
            impacts.push(Impact {
                country,
                aspect,
                delta: rounded,
                reason: String::new(),
            });
        }
    }

    impacts
}

/// Templated reason used when the explanation capability fails or
/// misaligns: built from the profile's dominant sector and channel.
pub fn fallback_reason(profile: &ScenarioProfile, impact: &Impact) -> String {
    let channel = profile
        .channels
        .first()
        .map(String::as_str)
        .unwrap_or("secondary spillovers");
    let sector = profile
        .sectors
        .first()
        .map(|sector| sector.tag())
        .unwrap_or("cross-sector disruption");
    format!(
        "{sector} shock via {channel} strains {}.",
        impact.aspect.label().to_lowercase()
    )
}
