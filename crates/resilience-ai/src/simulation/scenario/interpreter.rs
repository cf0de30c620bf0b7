use async_trait::async_trait;

use super::profile::{DirectImpacts, Impact, ScenarioProfile};

/// Error raised by the interpretation capability.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    #[error("interpreter transport failed: {0}")]
    Transport(String),
    #[error("no interpretation capability configured")]
    Unconfigured,
}

/// External capability turning scenario text into structured data.
///
/// Backed by a hosted language model in production; tests inject
/// deterministic doubles. Every method may legitimately return `Ok(None)`
/// — the analysis service owns the fallback chain and decides when the
/// combination of failures becomes fatal.
#[async_trait]
pub trait ScenarioInterpreter: Send + Sync {
    /// Read the scenario into a [`ScenarioProfile`] for rule-based
    /// synthesis. `None` means the capability produced nothing usable.
    async fn profile(&self, headline: &str)
        -> Result<Option<ScenarioProfile>, InterpreterError>;

    /// Ask for concrete impacts directly, bypassing synthesis. Used when
    /// profiling fails.
    async fn direct_impacts(
        &self,
        headline: &str,
    ) -> Result<Option<DirectImpacts>, InterpreterError>;

    /// Causal one-liners aligned 1:1 with `impacts`. A length mismatch is
    /// treated the same as `None`; the caller falls back to templated
    /// reasons.
    async fn explain(
        &self,
        profile: &ScenarioProfile,
        impacts: &[Impact],
    ) -> Result<Option<Vec<String>>, InterpreterError>;
}

/// Interpreter used when no upstream capability is configured. Every call
/// reports [`InterpreterError::Unconfigured`], which the analysis service
/// surfaces as a retryable unavailability, never a crash.
pub struct NullInterpreter;

#[async_trait]
impl ScenarioInterpreter for NullInterpreter {
    async fn profile(
        &self,
        _headline: &str,
    ) -> Result<Option<ScenarioProfile>, InterpreterError> {
        Err(InterpreterError::Unconfigured)
    }

    async fn direct_impacts(
        &self,
        _headline: &str,
    ) -> Result<Option<DirectImpacts>, InterpreterError> {
        Err(InterpreterError::Unconfigured)
    }

    async fn explain(
        &self,
        _profile: &ScenarioProfile,
        _impacts: &[Impact],
    ) -> Result<Option<Vec<String>>, InterpreterError> {
        Err(InterpreterError::Unconfigured)
    }
}
