//! Full analysis pipeline: interpretation, synthesis, sanitization,
//! aggregation, and the comparative report, with per-user result caching.

pub mod apply;
pub mod cache;
pub mod report;
pub mod router;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::baseline::aggregator::total_score;
use super::baseline::{BaselineAudit, BaselineError, BaselineProvider, BaselineSnapshot};
use super::scenario::{
    sanitizer, synthesizer, Impact, InterpreterError, ScenarioInterpreter,
};
use super::taxonomy::{Aspect, Country};

pub use apply::{AspectDelta, ImpactSummary, RankChange};
pub use cache::{AnalysisCache, DEFAULT_RESULT_TTL};
pub use router::analysis_router;

const DEFAULT_SUMMARY: &str = "Scenario analyzed.";

/// Terminal aggregate of one analysis. Collaborating layers serialize
/// this verbatim; it is immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: String,
    pub scenario_summary: String,
    pub impacts: Vec<Impact>,
    pub country_scores: BTreeMap<Country, i32>,
    pub aspect_scores: BTreeMap<Country, BTreeMap<Aspect, i32>>,
    pub baseline_country_scores: BTreeMap<Country, i32>,
    pub baseline_aspect_scores: BTreeMap<Country, BTreeMap<Aspect, i32>>,
    pub aspect_deltas: BTreeMap<Country, BTreeMap<Aspect, i32>>,
    pub rank_changes: Vec<RankChange>,
    pub impact_summary: ImpactSummary,
    pub explanations: BTreeMap<Country, String>,
    pub aspect_reasons: BTreeMap<Country, BTreeMap<Aspect, String>>,
    pub interventions: BTreeMap<Country, Vec<String>>,
    pub model_metadata: ModelMetadata,
}

/// Provenance block describing how the baseline was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub indicators: Vec<String>,
    pub aspect_weights: BTreeMap<Aspect, BTreeMap<String, f64>>,
    pub methodology: String,
}

/// Error surfaced by the analysis pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("headline cannot be empty")]
    EmptyHeadline,
    /// Both interpretation paths failed; retrying later may succeed.
    #[error("scenario interpretation unavailable: {0}")]
    InterpretationUnavailable(String),
    #[error(transparent)]
    Baseline(#[from] BaselineError),
}

/// Orchestrates the impact simulation pipeline over the two external
/// capabilities. Both type parameters accept trait objects so the service
/// shell can wire providers at runtime.
pub struct AnalysisService<P: ?Sized, I: ?Sized> {
    baseline: Arc<P>,
    interpreter: Arc<I>,
    cache: AnalysisCache,
}

impl<P, I> AnalysisService<P, I>
where
    P: BaselineProvider + ?Sized,
    I: ScenarioInterpreter + ?Sized,
{
    pub fn new(baseline: Arc<P>, interpreter: Arc<I>, result_ttl: Duration) -> Self {
        Self {
            baseline,
            interpreter,
            cache: AnalysisCache::new(result_ttl),
        }
    }

    /// Run the full pipeline for a headline, serving cached results for
    /// repeated (user, headline) pairs. Concurrent identical requests
    /// compute at most once.
    pub async fn analyze(
        &self,
        user: &str,
        headline: &str,
    ) -> Result<Arc<AnalysisResult>, AnalysisError> {
        let headline = headline.trim();
        if headline.is_empty() {
            return Err(AnalysisError::EmptyHeadline);
        }

        let key = AnalysisCache::key(user, headline);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let lock = self.cache.lock_for(&key);
        let guard = lock.lock().await;
        // A concurrent request may have finished while we waited.
        let outcome = match self.cache.get(&key) {
            Some(cached) => Ok(cached),
            None => match self.compute(headline).await {
                Ok(result) => {
                    let result = Arc::new(result);
                    self.cache.store(key.clone(), Arc::clone(&result));
                    Ok(result)
                }
                Err(err) => Err(err),
            },
        };
        drop(guard);
        self.cache.release(&key);
        outcome
    }

    /// Most recent successful analysis for a user, if any.
    pub fn last_result(&self, user: &str) -> Option<Arc<AnalysisResult>> {
        self.cache.last_for_user(user)
    }

    pub async fn baseline(&self) -> Result<Arc<BaselineSnapshot>, BaselineError> {
        self.baseline.baseline().await
    }

    pub async fn baseline_audit(&self) -> Result<BaselineAudit, BaselineError> {
        self.baseline.audit().await
    }

    async fn compute(&self, headline: &str) -> Result<AnalysisResult, AnalysisError> {
        let baseline = self.baseline.baseline().await?;
        let (summary, impacts) = self
            .interpret(headline, &baseline.aspect_scores)
            .await?;
        let impacts = sanitizer::ensure_country_coverage(impacts);

        let (updated_aspects, aspect_deltas) =
            apply::apply_impacts(&baseline.aspect_scores, &impacts);
        let updated_scores: BTreeMap<Country, i32> = updated_aspects
            .iter()
            .map(|(country, aspects)| (*country, total_score(aspects)))
            .collect();

        let rank_changes =
            apply::build_rank_changes(&baseline.country_scores, &updated_scores);
        let impact_summary = apply::summarize_impacts(&rank_changes, &aspect_deltas);
        let explanations = report::build_explanations(&impacts);
        let aspect_reasons = report::build_aspect_reasons(&impacts);
        let interventions = report::suggest_interventions(&impacts);
        let analysis = report::build_delta_summary(&summary, &impact_summary);

        Ok(AnalysisResult {
            analysis,
            scenario_summary: summary,
            impacts,
            country_scores: updated_scores,
            aspect_scores: updated_aspects,
            baseline_country_scores: baseline.country_scores.clone(),
            baseline_aspect_scores: baseline.aspect_scores.clone(),
            aspect_deltas,
            rank_changes,
            impact_summary,
            explanations,
            aspect_reasons,
            interventions,
            model_metadata: ModelMetadata {
                indicators: baseline.indicators.clone(),
                aspect_weights: baseline.aspect_weights.clone(),
                methodology: baseline.methodology.clone(),
            },
        })
    }

    /// Fallback chain: profile-based synthesis first, direct impacts
    /// second, hard failure when neither produces usable data.
    async fn interpret(
        &self,
        headline: &str,
        baseline_aspects: &BTreeMap<Country, BTreeMap<Aspect, i32>>,
    ) -> Result<(String, Vec<Impact>), AnalysisError> {
        let mut summary = DEFAULT_SUMMARY.to_string();
        let mut profile_error: Option<InterpreterError> = None;

        match self.interpreter.profile(headline).await {
            Ok(Some(profile)) => {
                if !profile.summary.is_empty() {
                    summary = profile.summary.clone();
                }
                let synthesized = synthesizer::synthesize(&profile, baseline_aspects);
                if !synthesized.is_empty() {
                    let reasons = match self
                        .interpreter
                        .explain(&profile, &synthesized)
                        .await
                    {
                        Ok(Some(reasons)) if reasons.len() == synthesized.len() => {
                            Some(reasons)
                        }
                        Ok(_) => None,
                        Err(err) => {
                            warn!(%err, "impact explanation failed; using templated reasons");
                            None
                        }
                    };

                    let explained: Vec<Impact> = synthesized
                        .into_iter()
                        .enumerate()
                        .map(|(index, mut impact)| {
                            impact.reason = match &reasons {
                                Some(reasons) => reasons[index].clone(),
                                None => synthesizer::fallback_reason(&profile, &impact),
                            };
                            impact
                        })
                        .collect();

                    return Ok((summary, sanitizer::sanitize(explained)));
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(%err, "scenario profiling failed; trying direct impacts");
                profile_error = Some(err);
            }
        }

        match self.interpreter.direct_impacts(headline).await {
            Ok(Some(direct)) => {
                if let Some(direct_summary) =
                    direct.summary.filter(|text| !text.is_empty())
                {
                    summary = direct_summary;
                }
                Ok((summary, sanitizer::sanitize_raw(&direct.impacts)))
            }
            Ok(None) => Err(AnalysisError::InterpretationUnavailable(
                "interpreter produced neither a profile nor impacts".to_string(),
            )),
            Err(err) => {
                let detail = match profile_error {
                    Some(earlier) => format!("{earlier}; {err}"),
                    None => err.to_string(),
                };
                Err(AnalysisError::InterpretationUnavailable(detail))
            }
        }
    }
}
