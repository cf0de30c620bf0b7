use std::collections::BTreeMap;

use super::super::scenario::Impact;
use super::super::taxonomy::{Aspect, Country};
use super::apply::ImpactSummary;

const NO_CHANGE_REASON: &str = "no significant change";
const NO_CHANGE_EXPLANATION: &str = "No significant changes.";
const NEUTRAL_SUMMARY: &str = "Scenario analyzed. No significant changes detected.";
const GENERIC_INTERVENTION: &str = "maintain monitoring and contingency planning";

/// One fixed advisory phrase per aspect.
pub const fn intervention_for(aspect: Aspect) -> &'static str {
    match aspect {
        Aspect::EconomicStability => "stabilize trade flows and secure fiscal buffers",
        Aspect::DefenseStrategicSecurity => {
            "strengthen emergency readiness and regional coordination"
        }
        Aspect::HealthcareBiologicalReadiness => {
            "expand surge capacity and public health logistics"
        }
        Aspect::CyberResilienceDigitalInfrastructure => {
            "harden critical infrastructure and response playbooks"
        }
        Aspect::DemographicSocialStability => {
            "increase social support and risk communication"
        }
        Aspect::EnergySecurity => "diversify energy supply and protect energy infrastructure",
        Aspect::DebtFiscalSustainability => {
            "restructure liabilities and preserve fiscal headroom"
        }
    }
}

/// Per-country narrative assembled from the impact reasons.
pub fn build_explanations(impacts: &[Impact]) -> BTreeMap<Country, String> {
    let mut lines: BTreeMap<Country, Vec<String>> = Country::ALL
        .into_iter()
        .map(|country| (country, Vec::new()))
        .collect();

    for impact in impacts {
        if let Some(country_lines) = lines.get_mut(&impact.country) {
            country_lines.push(format!(
                "{}: {:+} points because {}.",
                impact.aspect.label(),
                impact.delta,
                impact.reason
            ));
        }
    }

    lines
        .into_iter()
        .map(|(country, country_lines)| {
            let text = if country_lines.is_empty() {
                NO_CHANGE_EXPLANATION.to_string()
            } else {
                country_lines.join(" ")
            };
            (country, text)
        })
        .collect()
}

/// Per-country, per-aspect reason grid with a neutral default.
pub fn build_aspect_reasons(
    impacts: &[Impact],
) -> BTreeMap<Country, BTreeMap<Aspect, String>> {
    let mut reasons: BTreeMap<Country, BTreeMap<Aspect, String>> = Country::ALL
        .into_iter()
        .map(|country| {
            (
                country,
                Aspect::ALL
                    .into_iter()
                    .map(|aspect| (aspect, NO_CHANGE_REASON.to_string()))
                    .collect(),
            )
        })
        .collect();

    for impact in impacts {
        if impact.reason.is_empty() {
            continue;
        }
        if let Some(country_reasons) = reasons.get_mut(&impact.country) {
            country_reasons.insert(impact.aspect, impact.reason.clone());
        }
    }

    reasons
}

/// Deterministic multi-line headline summary.
pub fn build_delta_summary(summary: &str, impact_summary: &ImpactSummary) -> String {
    let mut lines = Vec::new();

    if !summary.is_empty() {
        lines.push(format!("Scenario: {summary}"));
    }

    if !impact_summary.top_risers.is_empty() {
        let risers: Vec<&str> = impact_summary
            .top_risers
            .iter()
            .map(|entry| entry.country.name())
            .collect();
        lines.push(format!("Top risers: {}", risers.join(", ")));
    }

    if !impact_summary.top_fallers.is_empty() {
        let fallers: Vec<&str> = impact_summary
            .top_fallers
            .iter()
            .map(|entry| entry.country.name())
            .collect();
        lines.push(format!("Top fallers: {}", fallers.join(", ")));
    }

    if !impact_summary.top_aspects.is_empty() {
        let aspects: Vec<&str> = impact_summary
            .top_aspects
            .iter()
            .map(|entry| entry.aspect.label())
            .collect();
        lines.push(format!("Most affected aspects: {}", aspects.join(", ")));
    }

    if lines.is_empty() {
        return NEUTRAL_SUMMARY.to_string();
    }

    lines.join("\n")
}

/// Up to three deduplicated advisory phrases per country; countries with
/// no impacts get the generic monitoring phrase.
pub fn suggest_interventions(impacts: &[Impact]) -> BTreeMap<Country, Vec<String>> {
    let mut suggestions: BTreeMap<Country, Vec<String>> = Country::ALL
        .into_iter()
        .map(|country| (country, Vec::new()))
        .collect();

    for impact in impacts {
        let phrase = intervention_for(impact.aspect);
        if let Some(country_suggestions) = suggestions.get_mut(&impact.country) {
            if !country_suggestions.iter().any(|existing| existing == phrase) {
                country_suggestions.push(phrase.to_string());
            }
        }
    }

    for (_, country_suggestions) in suggestions.iter_mut() {
        if country_suggestions.is_empty() {
            country_suggestions.push(GENERIC_INTERVENTION.to_string());
        } else {
            country_suggestions.truncate(3);
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::analysis::apply::{AspectDelta, RankChange};

    fn impact(country: Country, aspect: Aspect, delta: i32, reason: &str) -> Impact {
        Impact {
            country,
            aspect,
            delta,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn explanations_join_reasons_and_default_to_neutral() {
        let impacts = vec![
            impact(
                Country::India,
                Aspect::HealthcareBiologicalReadiness,
                -10,
                "surge overwhelms hospitals",
            ),
            impact(Country::India, Aspect::EconomicStability, -4, "trade slows"),
        ];

        let explanations = build_explanations(&impacts);
        assert_eq!(
            explanations[&Country::India],
            "Healthcare & Biological Readiness: -10 points because surge overwhelms hospitals. \
             Economic Stability: -4 points because trade slows."
        );
        assert_eq!(explanations[&Country::Japan], "No significant changes.");
    }

    #[test]
    fn positive_deltas_are_signed_in_explanations() {
        let impacts = vec![impact(
            Country::Uk,
            Aspect::EnergySecurity,
            7,
            "new supply comes online",
        )];
        let explanations = build_explanations(&impacts);
        assert!(explanations[&Country::Uk].contains("+7 points"));
    }

    #[test]
    fn aspect_reasons_default_and_override() {
        let impacts = vec![impact(
            Country::China,
            Aspect::CyberResilienceDigitalInfrastructure,
            -8,
            "attack degrades networks",
        )];
        let reasons = build_aspect_reasons(&impacts);
        assert_eq!(
            reasons[&Country::China][&Aspect::CyberResilienceDigitalInfrastructure],
            "attack degrades networks"
        );
        assert_eq!(
            reasons[&Country::China][&Aspect::EnergySecurity],
            NO_CHANGE_REASON
        );
    }

    #[test]
    fn delta_summary_lists_only_populated_lines() {
        let change = RankChange {
            country: Country::India,
            rank: 1,
            previous_rank: 3,
            rank_change: 2,
            score: 80,
            score_change: 10,
        };
        let summary = ImpactSummary {
            top_risers: vec![change],
            top_fallers: Vec::new(),
            top_aspects: vec![AspectDelta {
                aspect: Aspect::EconomicStability,
                delta: -12,
            }],
        };

        let text = build_delta_summary("Major shock.", &summary);
        assert_eq!(
            text,
            "Scenario: Major shock.\nTop risers: India\nMost affected aspects: Economic Stability"
        );
    }

    #[test]
    fn empty_summary_emits_the_neutral_message() {
        let summary = ImpactSummary {
            top_risers: Vec::new(),
            top_fallers: Vec::new(),
            top_aspects: Vec::new(),
        };
        assert_eq!(build_delta_summary("", &summary), NEUTRAL_SUMMARY);
    }

    #[test]
    fn interventions_deduplicate_and_cap_at_three() {
        let impacts = vec![
            impact(Country::India, Aspect::EconomicStability, -5, "a"),
            impact(Country::India, Aspect::EconomicStability, -3, "b"),
            impact(Country::India, Aspect::EnergySecurity, -3, "c"),
            impact(Country::India, Aspect::DefenseStrategicSecurity, -3, "d"),
            impact(Country::India, Aspect::DebtFiscalSustainability, -3, "e"),
        ];

        let interventions = suggest_interventions(&impacts);
        let india = &interventions[&Country::India];
        assert_eq!(india.len(), 3);
        assert_eq!(india[0], intervention_for(Aspect::EconomicStability));

        assert_eq!(
            interventions[&Country::Japan],
            vec![GENERIC_INTERVENTION.to_string()]
        );
    }
}
