use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::simulation::analysis::AnalysisService;
use crate::simulation::baseline::{BaselineSnapshot, StaticBaselineProvider};
use crate::simulation::scenario::{
    DirectImpacts, Impact, InterpreterError, RawImpact, ScenarioInterpreter,
    ScenarioProfile,
};
use crate::simulation::taxonomy::{Aspect, Country, Scope, Sector};

pub(super) const TEST_TTL: Duration = Duration::from_secs(60);

/// Interpreter double that always yields one fixed profile.
pub(super) struct ProfileInterpreter {
    pub(super) profile: ScenarioProfile,
    pub(super) reasons: Option<Vec<String>>,
}

#[async_trait]
impl ScenarioInterpreter for ProfileInterpreter {
    async fn profile(
        &self,
        _headline: &str,
    ) -> Result<Option<ScenarioProfile>, InterpreterError> {
        Ok(Some(self.profile.clone()))
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
        Ok(self.reasons.clone())
    }
}

/// Interpreter double that fails profiling but answers the direct path.
pub(super) struct DirectInterpreter {
    pub(super) summary: Option<String>,
    pub(super) impacts: Vec<RawImpact>,
}

#[async_trait]
impl ScenarioInterpreter for DirectInterpreter {
    async fn profile(
        &self,
        _headline: &str,
    ) -> Result<Option<ScenarioProfile>, InterpreterError> {
        Ok(None)
    }

    async fn direct_impacts(
        &self,
        _headline: &str,
    ) -> Result<Option<DirectImpacts>, InterpreterError> {
        Ok(Some(DirectImpacts {
            summary: self.summary.clone(),
            impacts: self.impacts.clone(),
        }))
    }

    async fn explain(
        &self,
        _profile: &ScenarioProfile,
        _impacts: &[Impact],
    ) -> Result<Option<Vec<String>>, InterpreterError> {
        Ok(None)
    }
}

/// Interpreter double where every capability is down.
pub(super) struct FailingInterpreter;

#[async_trait]
impl ScenarioInterpreter for FailingInterpreter {
    async fn profile(
        &self,
        _headline: &str,
    ) -> Result<Option<ScenarioProfile>, InterpreterError> {
        Err(InterpreterError::Transport("profile capability down".to_string()))
    }

    async fn direct_impacts(
        &self,
        _headline: &str,
    ) -> Result<Option<DirectImpacts>, InterpreterError> {
        Err(InterpreterError::Transport("impacts capability down".to_string()))
    }

    async fn explain(
        &self,
        _profile: &ScenarioProfile,
        _impacts: &[Impact],
    ) -> Result<Option<Vec<String>>, InterpreterError> {
        Err(InterpreterError::Transport("explain capability down".to_string()))
    }
}

pub(super) fn pandemic_profile() -> ScenarioProfile {
    ScenarioProfile {
        summary: "A severe global pandemic strains health systems.".to_string(),
        severity: 0.9,
        direction: -1,
        scope: Scope::Global,
        affected_countries: Vec::new(),
        sectors: vec![Sector::Health],
        channels: vec!["capacity strain".to_string()],
    }
}

pub(super) fn raw_impact(country: &str, aspect: &str, delta: i64) -> RawImpact {
    RawImpact {
        country: Some(country.to_string()),
        aspect: Some(aspect.to_string()),
        delta: Some(json!(delta)),
        reason: Some("causal chain".to_string()),
        confidence: None,
        channels: Vec::new(),
    }
}

pub(super) fn profile_service(
    interpreter: ProfileInterpreter,
) -> AnalysisService<StaticBaselineProvider, ProfileInterpreter> {
    AnalysisService::new(
        Arc::new(StaticBaselineProvider::reference()),
        Arc::new(interpreter),
        TEST_TTL,
    )
}

pub(super) fn direct_service(
    interpreter: DirectInterpreter,
) -> AnalysisService<StaticBaselineProvider, DirectInterpreter> {
    AnalysisService::new(
        Arc::new(StaticBaselineProvider::reference()),
        Arc::new(interpreter),
        TEST_TTL,
    )
}

/// Flat baseline with one aspect pinned per country, for vulnerability
/// coupling assertions.
pub(super) fn flat_baseline_with(
    overrides: &[(Country, Aspect, i32)],
) -> StaticBaselineProvider {
    let mut aspect_scores: BTreeMap<Country, BTreeMap<Aspect, i32>> = Country::ALL
        .into_iter()
        .map(|country| {
            (
                country,
                Aspect::ALL.into_iter().map(|aspect| (aspect, 60)).collect(),
            )
        })
        .collect();
    for (country, aspect, score) in overrides {
        if let Some(aspects) = aspect_scores.get_mut(country) {
            aspects.insert(*aspect, *score);
        }
    }

    let country_scores: BTreeMap<Country, i32> = aspect_scores
        .iter()
        .map(|(country, aspects)| {
            (
                *country,
                crate::simulation::baseline::aggregator::total_score(aspects),
            )
        })
        .collect();

    StaticBaselineProvider::new(BaselineSnapshot {
        aspect_scores,
        country_scores,
        normalized_indicators: BTreeMap::new(),
        indicators: Vec::new(),
        aspect_weights: BTreeMap::new(),
        methodology: String::new(),
    })
}
