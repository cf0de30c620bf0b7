use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use super::interpreter::{InterpreterError, ScenarioInterpreter};
use super::profile::{DirectImpacts, Impact, ScenarioProfile};

const GENERATE_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Models tried in order after the preferred one fails. Single shot per
/// model, no retry loop beyond this list.
const FALLBACK_MODELS: [&str; 4] = [
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-2.0-flash",
    "gemini-1.0-pro",
];

/// Scenario interpreter backed by the Generative Language REST API.
pub struct GeminiInterpreter {
    client: reqwest::Client,
    api_key: String,
    preferred_model: String,
}

impl GeminiInterpreter {
    pub fn new(api_key: String, preferred_model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            preferred_model: preferred_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    async fn generate_with_model(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<String, InterpreterError> {
        let url = format!("{GENERATE_BASE}/{model}:generateContent?key={}", self.api_key);
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| InterpreterError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| InterpreterError::Transport(err.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|err| InterpreterError::Transport(err.to_string()))?;

        candidate_text(&payload)
            .ok_or_else(|| InterpreterError::Transport("empty candidate text".to_string()))
    }

    async fn generate(&self, prompt: &str) -> Result<String, InterpreterError> {
        let mut last_error = None;
        let preferred = self.preferred_model.as_str();
        let models = std::iter::once(preferred)
            .chain(FALLBACK_MODELS.iter().copied().filter(|model| *model != preferred));

        for model in models {
            match self.generate_with_model(model, prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    warn!(model, %err, "generation attempt failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| InterpreterError::Transport("no model available".to_string())))
    }
}

#[async_trait]
impl ScenarioInterpreter for GeminiInterpreter {
    async fn profile(
        &self,
        headline: &str,
    ) -> Result<Option<ScenarioProfile>, InterpreterError> {
        let text = self.generate(&profile_prompt(headline)).await?;
        let Some(candidate) = extract_json_object(&text) else {
            return Ok(None);
        };
        let Ok(value) = serde_json::from_str::<Value>(candidate) else {
            return Ok(None);
        };
        Ok(ScenarioProfile::from_value(&value))
    }

    async fn direct_impacts(
        &self,
        headline: &str,
    ) -> Result<Option<DirectImpacts>, InterpreterError> {
        let text = self.generate(&impacts_prompt(headline)).await?;
        let Some(candidate) = extract_json_object(&text) else {
            return Ok(None);
        };
        Ok(serde_json::from_str::<DirectImpacts>(candidate).ok())
    }

    async fn explain(
        &self,
        profile: &ScenarioProfile,
        impacts: &[Impact],
    ) -> Result<Option<Vec<String>>, InterpreterError> {
        let prompt = explain_prompt(profile, impacts);
        let text = self.generate(&prompt).await?;
        let Some(candidate) = extract_json_array(&text) else {
            return Ok(None);
        };
        let Ok(value) = serde_json::from_str::<Value>(candidate) else {
            return Ok(None);
        };
        let Some(items) = value.as_array() else {
            return Ok(None);
        };
        let reasons = items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect();
        Ok(Some(reasons))
    }
}

/// Models wrap JSON in prose or code fences; take the outermost object.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end >= start).then(|| &text[start..=end])
}

fn candidate_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

fn profile_prompt(headline: &str) -> String {
    format!(
        r#"You are a resilience analyst. Interpret this scenario and return only valid JSON:
"{headline}"

Return JSON in this exact structure:
{{
  "summary": "1-2 sentence causal summary of the shock",
  "severity": 0.0,
  "direction": -1,
  "scope": "regional",
  "affected_countries": ["India"],
  "sectors": ["health"],
  "channels": ["trade disruption", "capacity strain"]
}}

Rules:
- severity is a float from 0.0 to 1.0.
- direction is -1 for adverse shocks, 1 for positive shocks.
- scope is one of: local, regional, global.
- affected_countries is a subset of: India, China, Pakistan, Nepal, Bangladesh, Sri Lanka, USA, Russia, Japan, UK.
- sectors must be chosen from: health, cyber, energy, financial, conflict, climate, social, supply_chain, governance.
- channels are short causal mechanisms (2-4 words each).
- If scope is global, include all countries.
- Do not include any additional text outside the JSON.
"#
    )
}

fn impacts_prompt(headline: &str) -> String {
    format!(
        r#"You are a resilience analyst. Interpret this scenario and return only valid JSON:
"{headline}"

Return JSON in this exact structure:
{{
  "summary": "1-2 sentence causal summary of the shock",
  "impacts": [
    {{
      "country": "India",
      "aspect": "Economic Stability",
      "delta": -12,
      "confidence": 0.0,
      "reason": "short causal chain explaining the change",
      "channels": ["trade disruption", "cost inflation"]
    }}
  ]
}}

Rules:
- Use only these countries: India, China, Pakistan, Nepal, Bangladesh, Sri Lanka, USA, Russia, Japan, UK.
- Use only these aspects: Economic Stability, Defense & Strategic Security, Healthcare & Biological Readiness, Cyber Resilience & Digital Infrastructure, Demographic & Social Stability, Energy Security, Debt & Fiscal Sustainability.
- Deltas are integers from -20 to +20 based on severity and relevance. Do not use 0.
- Include at least one impact for each of the 10 countries.
- Provide multiple impacts if the scenario is multi-sector or multi-country.
- Reasons must be 8-18 words, causal, and mention at least one channel.
"#
    )
}

fn explain_prompt(profile: &ScenarioProfile, impacts: &[Impact]) -> String {
    let sectors: Vec<&str> = profile.sectors.iter().map(|sector| sector.tag()).collect();
    let impacts_json = serde_json::to_string(impacts).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are a resilience analyst. Provide a short causal reason for each impact.

Scenario summary:
{summary}

Sectors: {sectors:?}
Channels: {channels:?}

Impacts (JSON array):
{impacts_json}

Return ONLY a JSON array of strings, same length and order as the impacts list.
Each reason must be 8-20 words, causal, and mention a channel or sector.
Do not include any extra text outside the JSON array.
"#,
        summary = profile.summary,
        sectors = sectors,
        channels = profile.channels,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_extraction_strips_prose_and_fences() {
        let text = "Sure, here you go:\n```json\n{\"summary\": \"x\"}\n```";
        assert_eq!(extract_json_object(text), Some("{\"summary\": \"x\"}"));
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn json_array_extraction_finds_outermost_brackets() {
        let text = "reasons: [\"a\", \"b\"] done";
        assert_eq!(extract_json_array(text), Some("[\"a\", \"b\"]"));
    }

    #[test]
    fn candidate_text_concatenates_parts() {
        let payload = json!({
            "candidates": [{
                "content": {"parts": [{"text": "hello "}, {"text": "world"}]}
            }]
        });
        assert_eq!(candidate_text(&payload).as_deref(), Some("hello world"));
        assert_eq!(candidate_text(&json!({"candidates": []})), None);
    }
}
