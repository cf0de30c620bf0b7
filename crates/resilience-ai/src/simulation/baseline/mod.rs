//! Baseline resilience model: public indicators normalized to 0-100 and
//! blended into per-country aspect scores.

pub mod aggregator;
pub mod indicators;
pub mod normalizer;
pub mod sources;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::warn;

use super::taxonomy::{Aspect, Country};
use aggregator::{aggregate_country, total_score};
use indicators::{IndicatorSpec, ASPECT_WEIGHTS, INDICATOR_SPECS, METHODOLOGY};
use normalizer::{normalize_global, normalize_local};
use sources::{IndicatorObservation, IndicatorSource, SourceError};

/// Default bounded staleness for the cached baseline.
pub const DEFAULT_BASELINE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Immutable baseline snapshot consumed by the impact pipeline and
/// serialized verbatim on the API surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    pub aspect_scores: BTreeMap<Country, BTreeMap<Aspect, i32>>,
    pub country_scores: BTreeMap<Country, i32>,
    pub normalized_indicators: BTreeMap<Country, BTreeMap<String, i32>>,
    pub indicators: Vec<String>,
    pub aspect_weights: BTreeMap<Aspect, BTreeMap<String, f64>>,
    pub methodology: String,
}

/// Verification payload exposing raw values and vintages next to the
/// normalized scores they produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineAudit {
    pub generated_at: DateTime<Utc>,
    pub indicator_codes: BTreeMap<String, String>,
    pub raw_indicators: BTreeMap<Country, BTreeMap<String, Option<f64>>>,
    pub indicator_years: BTreeMap<Country, BTreeMap<String, Option<String>>>,
    pub normalized_indicators: BTreeMap<Country, BTreeMap<String, i32>>,
    pub baseline_aspect_scores: BTreeMap<Country, BTreeMap<Aspect, i32>>,
    pub baseline_country_scores: BTreeMap<Country, i32>,
    pub aspect_weights: BTreeMap<Aspect, BTreeMap<String, f64>>,
    pub methodology: String,
}

/// Error raised when a baseline cannot be produced at all. Individual
/// indicator failures degrade to neutral scores instead of raising this.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("baseline computation failed: {0}")]
    Compute(String),
}

/// Supplier of the baseline snapshot the analysis pipeline starts from.
#[async_trait]
pub trait BaselineProvider: Send + Sync {
    async fn baseline(&self) -> Result<Arc<BaselineSnapshot>, BaselineError>;
    async fn audit(&self) -> Result<BaselineAudit, BaselineError>;
}

/// Baseline provider that recomputes from an [`IndicatorSource`] honoring a
/// bounded-staleness TTL. Refresh happens under the cache lock, so
/// concurrent callers never trigger duplicate fan-outs.
pub struct CachedBaselineProvider<S> {
    source: Arc<S>,
    ttl: Duration,
    cached: tokio::sync::Mutex<Option<CachedSnapshot>>,
}

struct CachedSnapshot {
    fetched_at: Instant,
    snapshot: Arc<BaselineSnapshot>,
}

impl<S> CachedBaselineProvider<S>
where
    S: IndicatorSource + 'static,
{
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source: Arc::new(source),
            ttl,
            cached: tokio::sync::Mutex::new(None),
        }
    }

    async fn observations(
        &self,
    ) -> Result<BTreeMap<&'static str, BTreeMap<Country, IndicatorObservation>>, BaselineError>
    {
        let mut set = JoinSet::new();
        for spec in &INDICATOR_SPECS {
            for country in Country::ALL {
                let source = Arc::clone(&self.source);
                set.spawn(async move {
                    let observation = match source.latest(country, spec).await {
                        Ok(observation) => observation,
                        Err(err) => {
                            warn!(
                                indicator = spec.name,
                                country = country.name(),
                                %err,
                                "indicator fetch failed; using neutral placeholder"
                            );
                            IndicatorObservation::default()
                        }
                    };
                    (spec.name, country, observation)
                });
            }
        }

        let mut observations: BTreeMap<&'static str, BTreeMap<Country, IndicatorObservation>> =
            INDICATOR_SPECS
                .iter()
                .map(|spec| (spec.name, BTreeMap::new()))
                .collect();
        while let Some(joined) = set.join_next().await {
            let (name, country, observation) =
                joined.map_err(|err| BaselineError::Compute(err.to_string()))?;
            if let Some(per_country) = observations.get_mut(name) {
                per_country.insert(country, observation);
            }
        }

        Ok(observations)
    }

    async fn global_references(
        &self,
    ) -> Result<BTreeMap<&'static str, Vec<f64>>, BaselineError> {
        let mut set = JoinSet::new();
        for spec in &INDICATOR_SPECS {
            let source = Arc::clone(&self.source);
            set.spawn(async move {
                let values = match source.global_latest(spec).await {
                    Ok(values) => values,
                    Err(err) => {
                        warn!(indicator = spec.name, %err, "global reference fetch failed");
                        Vec::new()
                    }
                };
                (spec.name, values)
            });
        }

        let mut references = BTreeMap::new();
        while let Some(joined) = set.join_next().await {
            let (name, values) = joined.map_err(|err| BaselineError::Compute(err.to_string()))?;
            references.insert(name, values);
        }

        Ok(references)
    }

    async fn refresh(&self) -> Result<Arc<BaselineSnapshot>, BaselineError> {
        let observations = self.observations().await?;
        let references = self.global_references().await?;
        Ok(Arc::new(build_snapshot(&observations, &references)))
    }
}

#[async_trait]
impl<S> BaselineProvider for CachedBaselineProvider<S>
where
    S: IndicatorSource + 'static,
{
    async fn baseline(&self) -> Result<Arc<BaselineSnapshot>, BaselineError> {
        let mut guard = self.cached.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.snapshot));
            }
        }

        let snapshot = self.refresh().await?;
        *guard = Some(CachedSnapshot {
            fetched_at: Instant::now(),
            snapshot: Arc::clone(&snapshot),
        });
        Ok(snapshot)
    }

    async fn audit(&self) -> Result<BaselineAudit, BaselineError> {
        // Audits bypass the cache: the point is to show what the sources
        // report right now.
        let observations = self.observations().await?;
        let references = self.global_references().await?;
        Ok(build_audit(&observations, &references))
    }
}

/// Baseline provider serving one fixed snapshot. Used by tests and the
/// offline demo; also the fallback when no network access is configured.
#[derive(Clone)]
pub struct StaticBaselineProvider {
    snapshot: Arc<BaselineSnapshot>,
}

impl StaticBaselineProvider {
    pub fn new(snapshot: BaselineSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    /// Hand-tuned reference scores for demos and deterministic tests.
    pub fn reference() -> Self {
        const ROWS: [(Country, [i32; 7]); 10] = [
            (Country::India, [55, 70, 55, 50, 50, 60, 50]),
            (Country::China, [78, 85, 70, 80, 60, 75, 60]),
            (Country::Pakistan, [40, 65, 45, 40, 45, 45, 35]),
            (Country::Nepal, [45, 50, 50, 35, 55, 40, 40]),
            (Country::Bangladesh, [50, 55, 50, 40, 50, 45, 45]),
            (Country::SriLanka, [35, 55, 60, 45, 50, 40, 30]),
            (Country::Usa, [75, 90, 75, 85, 65, 80, 60]),
            (Country::Russia, [60, 85, 65, 70, 55, 85, 70]),
            (Country::Japan, [80, 75, 85, 85, 70, 65, 50]),
            (Country::Uk, [75, 80, 80, 80, 70, 65, 70]),
        ];

        let mut aspect_scores = BTreeMap::new();
        let mut country_scores = BTreeMap::new();
        for (country, scores) in ROWS {
            let aspects: BTreeMap<Aspect, i32> =
                Aspect::ALL.into_iter().zip(scores).collect();
            country_scores.insert(country, total_score(&aspects));
            aspect_scores.insert(country, aspects);
        }

        Self::new(BaselineSnapshot {
            aspect_scores,
            country_scores,
            normalized_indicators: BTreeMap::new(),
            indicators: indicator_names(),
            aspect_weights: aspect_weight_map(),
            methodology: METHODOLOGY.to_string(),
        })
    }
}

#[async_trait]
impl BaselineProvider for StaticBaselineProvider {
    async fn baseline(&self) -> Result<Arc<BaselineSnapshot>, BaselineError> {
        Ok(Arc::clone(&self.snapshot))
    }

    async fn audit(&self) -> Result<BaselineAudit, BaselineError> {
        let empty_raw: BTreeMap<String, Option<f64>> = INDICATOR_SPECS
            .iter()
            .map(|spec| (spec.name.to_string(), None))
            .collect();
        let empty_years: BTreeMap<String, Option<String>> = INDICATOR_SPECS
            .iter()
            .map(|spec| (spec.name.to_string(), None))
            .collect();

        Ok(BaselineAudit {
            generated_at: Utc::now(),
            indicator_codes: indicator_codes(),
            raw_indicators: Country::ALL
                .into_iter()
                .map(|country| (country, empty_raw.clone()))
                .collect(),
            indicator_years: Country::ALL
                .into_iter()
                .map(|country| (country, empty_years.clone()))
                .collect(),
            normalized_indicators: self.snapshot.normalized_indicators.clone(),
            baseline_aspect_scores: self.snapshot.aspect_scores.clone(),
            baseline_country_scores: self.snapshot.country_scores.clone(),
            aspect_weights: self.snapshot.aspect_weights.clone(),
            methodology: self.snapshot.methodology.clone(),
        })
    }
}

fn normalize_all(
    observations: &BTreeMap<&'static str, BTreeMap<Country, IndicatorObservation>>,
    references: &BTreeMap<&'static str, Vec<f64>>,
) -> BTreeMap<Country, BTreeMap<String, i32>> {
    let mut normalized_indicators: BTreeMap<Country, BTreeMap<String, i32>> = Country::ALL
        .into_iter()
        .map(|country| (country, BTreeMap::new()))
        .collect();

    for spec in &INDICATOR_SPECS {
        let values = values_for(spec, observations);
        let reference = references.get(spec.name).map(Vec::as_slice).unwrap_or(&[]);
        let normalized = normalize_global(&values, reference, spec.higher_is_better)
            .unwrap_or_else(|| normalize_local(&values, spec.higher_is_better));
        for country in Country::ALL {
            let score = normalized
                .get(&country)
                .copied()
                .unwrap_or(normalizer::NEUTRAL_SCORE);
            if let Some(per_country) = normalized_indicators.get_mut(&country) {
                per_country.insert(spec.name.to_string(), score);
            }
        }
    }

    normalized_indicators
}

fn score_all(
    normalized_indicators: &BTreeMap<Country, BTreeMap<String, i32>>,
) -> (
    BTreeMap<Country, BTreeMap<Aspect, i32>>,
    BTreeMap<Country, i32>,
) {
    let mut aspect_scores = BTreeMap::new();
    let mut country_scores = BTreeMap::new();
    for (country, indicators) in normalized_indicators {
        let aspects = aggregate_country(indicators);
        country_scores.insert(*country, total_score(&aspects));
        aspect_scores.insert(*country, aspects);
    }
    (aspect_scores, country_scores)
}

fn build_snapshot(
    observations: &BTreeMap<&'static str, BTreeMap<Country, IndicatorObservation>>,
    references: &BTreeMap<&'static str, Vec<f64>>,
) -> BaselineSnapshot {
    let normalized_indicators = normalize_all(observations, references);
    let (aspect_scores, country_scores) = score_all(&normalized_indicators);

    BaselineSnapshot {
        aspect_scores,
        country_scores,
        normalized_indicators,
        indicators: indicator_names(),
        aspect_weights: aspect_weight_map(),
        methodology: METHODOLOGY.to_string(),
    }
}

fn build_audit(
    observations: &BTreeMap<&'static str, BTreeMap<Country, IndicatorObservation>>,
    references: &BTreeMap<&'static str, Vec<f64>>,
) -> BaselineAudit {
    let normalized_indicators = normalize_all(observations, references);
    let (baseline_aspect_scores, baseline_country_scores) = score_all(&normalized_indicators);

    let mut raw_indicators: BTreeMap<Country, BTreeMap<String, Option<f64>>> = BTreeMap::new();
    let mut indicator_years: BTreeMap<Country, BTreeMap<String, Option<String>>> = BTreeMap::new();
    for country in Country::ALL {
        let mut raw = BTreeMap::new();
        let mut years = BTreeMap::new();
        for spec in &INDICATOR_SPECS {
            let observation = observations
                .get(spec.name)
                .and_then(|per_country| per_country.get(&country))
                .cloned()
                .unwrap_or_default();
            raw.insert(spec.name.to_string(), observation.value);
            years.insert(spec.name.to_string(), observation.year);
        }
        raw_indicators.insert(country, raw);
        indicator_years.insert(country, years);
    }

    BaselineAudit {
        generated_at: Utc::now(),
        indicator_codes: indicator_codes(),
        raw_indicators,
        indicator_years,
        normalized_indicators,
        baseline_aspect_scores,
        baseline_country_scores,
        aspect_weights: aspect_weight_map(),
        methodology: METHODOLOGY.to_string(),
    }
}

fn values_for(
    spec: &IndicatorSpec,
    observations: &BTreeMap<&'static str, BTreeMap<Country, IndicatorObservation>>,
) -> BTreeMap<Country, Option<f64>> {
    Country::ALL
        .into_iter()
        .map(|country| {
            let value = observations
                .get(spec.name)
                .and_then(|per_country| per_country.get(&country))
                .and_then(|observation| observation.value);
            (country, value)
        })
        .collect()
}

fn indicator_names() -> Vec<String> {
    INDICATOR_SPECS
        .iter()
        .map(|spec| spec.name.to_string())
        .collect()
}

fn indicator_codes() -> BTreeMap<String, String> {
    INDICATOR_SPECS
        .iter()
        .map(|spec| (spec.name.to_string(), spec.code.to_string()))
        .collect()
}

fn aspect_weight_map() -> BTreeMap<Aspect, BTreeMap<String, f64>> {
    ASPECT_WEIGHTS
        .iter()
        .map(|(aspect, weights)| {
            let weights = weights
                .iter()
                .map(|(indicator, weight)| (indicator.to_string(), *weight))
                .collect();
            (*aspect, weights)
        })
        .collect()
}
