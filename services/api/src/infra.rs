use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;

use resilience_ai::config::AppConfig;
use resilience_ai::simulation::analysis::AnalysisService;
use resilience_ai::simulation::baseline::{
    BaselineProvider, CachedBaselineProvider, StaticBaselineProvider,
};
use resilience_ai::simulation::baseline::sources::WorldBankSource;
use resilience_ai::simulation::scenario::{
    DirectImpacts, GeminiInterpreter, Impact, InterpreterError, NullInterpreter,
    ScenarioInterpreter, ScenarioProfile,
};
use resilience_ai::simulation::taxonomy::{Country, Scope, Sector};

pub(crate) type DynAnalysisService =
    AnalysisService<dyn BaselineProvider, dyn ScenarioInterpreter>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Production wiring: World Bank indicators plus the hosted interpreter.
/// Without an API key the interpreter degrades to the null capability and
/// analyses report as temporarily unavailable.
pub(crate) fn online_service(config: &AppConfig) -> Arc<DynAnalysisService> {
    let baseline: Arc<dyn BaselineProvider> = Arc::new(CachedBaselineProvider::new(
        WorldBankSource::new(),
        config.simulation.baseline_ttl,
    ));
    let interpreter: Arc<dyn ScenarioInterpreter> = match &config.interpreter.api_key {
        Some(key) => Arc::new(GeminiInterpreter::new(
            key.clone(),
            config.interpreter.model.clone(),
        )),
        None => Arc::new(NullInterpreter),
    };
    Arc::new(AnalysisService::new(
        baseline,
        interpreter,
        config.simulation.result_ttl,
    ))
}

/// Offline wiring for demos and air-gapped runs: reference baseline plus
/// the scripted keyword interpreter.
pub(crate) fn offline_service(result_ttl: Duration) -> Arc<DynAnalysisService> {
    let baseline: Arc<dyn BaselineProvider> = Arc::new(StaticBaselineProvider::reference());
    let interpreter: Arc<dyn ScenarioInterpreter> = Arc::new(ScriptedInterpreter);
    Arc::new(AnalysisService::new(baseline, interpreter, result_ttl))
}

/// Deterministic interpreter reading the headline with keyword rules.
/// Good enough to exercise the full pipeline without network access.
pub(crate) struct ScriptedInterpreter;

#[async_trait]
impl ScenarioInterpreter for ScriptedInterpreter {
    async fn profile(
        &self,
        headline: &str,
    ) -> Result<Option<ScenarioProfile>, InterpreterError> {
        Ok(Some(scripted_profile(headline)))
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

pub(crate) fn scripted_profile(headline: &str) -> ScenarioProfile {
    let lower = headline.to_lowercase();

    let contains_any =
        |words: &[&str]| words.iter().any(|word| lower.contains(word));

    let (sectors, channels) = if contains_any(&[
        "virus", "pandemic", "disease", "outbreak", "epidemic", "flu",
    ]) {
        (vec![Sector::Health], vec!["hospital capacity strain"])
    } else if contains_any(&["cyber", "hack", "ransomware", "malware"]) {
        (vec![Sector::Cyber], vec!["network outage"])
    } else if contains_any(&["energy", "oil", "gas", "power", "electricity"]) {
        (vec![Sector::Energy], vec!["supply shortfall"])
    } else if contains_any(&["war", "conflict", "invasion", "attack", "military"]) {
        (vec![Sector::Conflict], vec!["regional escalation"])
    } else if contains_any(&["recession", "crash", "financial", "crisis", "default", "debt"]) {
        (vec![Sector::Financial], vec!["credit tightening"])
    } else if contains_any(&["flood", "drought", "hurricane", "heatwave", "climate", "cyclone"]) {
        (vec![Sector::Climate], vec!["infrastructure damage"])
    } else if contains_any(&["unrest", "protest", "strike", "riot"]) {
        (vec![Sector::Social], vec!["civil disruption"])
    } else {
        (vec![Sector::SupplyChain], vec!["trade disruption"])
    };

    let scope = if contains_any(&["global", "world", "worldwide", "international"]) {
        Scope::Global
    } else {
        Scope::Regional
    };

    let affected_countries: Vec<Country> = Country::ALL
        .into_iter()
        .filter(|country| lower.contains(&country.name().to_lowercase()))
        .collect();

    let severity = if contains_any(&["severe", "major", "catastrophic", "massive"]) {
        0.85
    } else {
        0.6
    };

    let direction = if contains_any(&["recovery", "breakthrough", "boom", "surge in growth"]) {
        1
    } else {
        -1
    };

    ScenarioProfile {
        summary: headline.trim().to_string(),
        severity,
        direction,
        scope,
        affected_countries,
        sectors,
        channels: channels.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pandemic_headlines_map_to_the_health_sector() {
        let profile = scripted_profile("Global pandemic outbreak reported");
        assert_eq!(profile.sectors, vec![Sector::Health]);
        assert_eq!(profile.scope, Scope::Global);
        assert_eq!(profile.direction, -1);
    }

    #[test]
    fn named_countries_are_picked_up() {
        let profile = scripted_profile("Severe flooding hits India and Bangladesh");
        assert_eq!(profile.sectors, vec![Sector::Climate]);
        assert_eq!(
            profile.affected_countries,
            vec![Country::India, Country::Bangladesh]
        );
        assert_eq!(profile.severity, 0.85);
    }

    #[test]
    fn unmatched_headlines_default_to_supply_chain() {
        let profile = scripted_profile("Something unusual happened");
        assert_eq!(profile.sectors, vec![Sector::SupplyChain]);
        assert_eq!(profile.scope, Scope::Regional);
    }
}
