use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use resilience_ai::simulation::analysis::AnalysisService;
use resilience_ai::simulation::baseline::{BaselineProvider, StaticBaselineProvider};
use resilience_ai::simulation::scenario::{
    DirectImpacts, Impact, InterpreterError, ScenarioInterpreter, ScenarioProfile,
};
use resilience_ai::simulation::taxonomy::{Aspect, Country, Scope, Sector};

struct PandemicInterpreter;

#[async_trait]
impl ScenarioInterpreter for PandemicInterpreter {
    async fn profile(
        &self,
        _headline: &str,
    ) -> Result<Option<ScenarioProfile>, InterpreterError> {
        Ok(Some(ScenarioProfile {
            summary: "A novel pathogen spreads worldwide within weeks.".to_string(),
            severity: 0.9,
            direction: -1,
            scope: Scope::Global,
            affected_countries: Vec::new(),
            sectors: vec![Sector::Health],
            channels: vec!["hospital capacity strain".to_string()],
        }))
    }

    async fn direct_impacts(
        &self,
        _headline: &str,
    ) -> Result<Option<DirectImpacts>, InterpreterError> {
        Ok(None)
    }

    async fn explain(
        &self,
        _profile: &ScenarioProfile,
        _impacts: &[Impact],
    ) -> Result<Option<Vec<String>>, InterpreterError> {
        Ok(None)
    }
}

fn service() -> AnalysisService<StaticBaselineProvider, PandemicInterpreter> {
    AnalysisService::new(
        Arc::new(StaticBaselineProvider::reference()),
        Arc::new(PandemicInterpreter),
        Duration::from_secs(60),
    )
}

#[tokio::test]
async fn full_pipeline_produces_a_complete_result() {
    let service = service();
    let result = service
        .analyze("analyst", "Global pandemic outbreak")
        .await
        .expect("pipeline runs");

    assert_eq!(result.country_scores.len(), 10);
    assert_eq!(result.baseline_country_scores.len(), 10);
    assert_eq!(result.rank_changes.len(), 10);
    assert_eq!(result.explanations.len(), 10);
    assert_eq!(result.interventions.len(), 10);

    for country in Country::ALL {
        assert!(result
            .impacts
            .iter()
            .any(|impact| impact.country == country));
        for (_, score) in &result.aspect_scores[&country] {
            assert!((0..=100).contains(score));
        }
    }

    // A health-sector shock lands hardest on Healthcare readiness.
    assert_eq!(
        result.impact_summary.top_aspects[0].aspect,
        Aspect::HealthcareBiologicalReadiness
    );
    assert!(result.impact_summary.top_aspects[0].delta < 0);

    assert!(result.analysis.contains("Most affected aspects:"));
    assert_eq!(
        result.model_metadata.indicators.len(),
        10,
        "metadata lists the indicator set"
    );
}

#[tokio::test]
async fn repeated_analyses_are_idempotent() {
    let service = service();

    let first = service
        .analyze("user-a", "Global pandemic outbreak")
        .await
        .expect("first run");
    let second = service
        .analyze("user-b", "Global pandemic outbreak")
        .await
        .expect("second run");

    let first_json = serde_json::to_vec(first.as_ref()).expect("serializes");
    let second_json = serde_json::to_vec(second.as_ref()).expect("serializes");
    assert_eq!(first_json, second_json);
}

#[tokio::test]
async fn baseline_is_exposed_alongside_analysis() {
    let service = service();
    let snapshot = service.baseline().await.expect("baseline serves");

    assert_eq!(snapshot.aspect_scores.len(), 10);
    let provider = StaticBaselineProvider::reference();
    let again = provider.baseline().await.expect("baseline serves");
    assert_eq!(snapshot.country_scores, again.country_scores);
}
