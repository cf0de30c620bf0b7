use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::super::taxonomy::{Aspect, Country, Scope, Sector};

/// Structured reading of a scenario, produced once by the interpretation
/// capability and consumed once by the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProfile {
    pub summary: String,
    pub severity: f64,
    pub direction: i32,
    pub scope: Scope,
    pub affected_countries: Vec<Country>,
    pub sectors: Vec<Sector>,
    pub channels: Vec<String>,
}

impl ScenarioProfile {
    /// Lenient construction from whatever JSON the model emitted. Unknown
    /// countries and sectors are dropped; malformed severity/direction
    /// fall back to a mild adverse default. Returns `None` only when the
    /// payload is not an object at all.
    pub fn from_value(value: &Value) -> Option<ScenarioProfile> {
        let object = value.as_object()?;

        let summary = object
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let severity = object
            .get("severity")
            .map(coerce_f64)
            .unwrap_or(None)
            .unwrap_or(0.5);

        let direction = object
            .get("direction")
            .map(coerce_i64)
            .unwrap_or(None)
            .unwrap_or(-1) as i32;

        let scope = object
            .get("scope")
            .and_then(Value::as_str)
            .map(Scope::parse_or_regional)
            .unwrap_or(Scope::Regional);

        let affected_countries = string_items(object.get("affected_countries"))
            .iter()
            .filter_map(|name| Country::parse(name))
            .collect();

        let sectors = string_items(object.get("sectors"))
            .iter()
            .filter_map(|tag| Sector::parse(tag))
            .collect();

        let channels = string_items(object.get("channels"));

        Some(ScenarioProfile {
            summary,
            severity,
            direction,
            scope,
            affected_countries,
            sectors,
            channels,
        })
    }
}

/// Impact entry as emitted by the interpretation capability, before
/// sanitization. Every field is optional because the upstream model is
/// allowed to be sloppy; the sanitizer decides what survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImpact {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub aspect: Option<String>,
    #[serde(default)]
    pub delta: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub channels: Vec<String>,
}

/// Validated impact: one bounded score shift for one country/aspect pair.
/// Invariant: `delta` is in [-20, 20] and never 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    pub country: Country,
    pub aspect: Aspect,
    pub delta: i32,
    pub reason: String,
}

/// Direct interpretation output: impacts without an intermediate profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectImpacts {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub impacts: Vec<RawImpact>,
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|float| float as i64))
        }
        _ => None,
    }
}

/// Integer coercion for impact deltas: floats truncate toward zero and
/// numeric strings are accepted, anything else is rejected.
pub(crate) fn coerce_delta(value: &Value) -> Option<i64> {
    coerce_i64(value)
}
