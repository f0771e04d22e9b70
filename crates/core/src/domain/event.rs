use crate::domain::persona::{CompanyProfile, PersonaAnalysisData};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One decoded frame of the analysis event stream, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start {
        #[serde(default, deserialize_with = "lenient")]
        message: Option<String>,
    },
    Status(StatusPayload),
    Step(StepPayload),
    Complete {},
    Error {
        #[serde(default, deserialize_with = "lenient")]
        message: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub node: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
}

/// A completed pipeline node. The optional fields carry the node's output and
/// feed the run accumulator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StepPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub node: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub financial_info: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub persona_analyses: Option<Vec<PersonaAnalysisData>>,
    #[serde(default, deserialize_with = "lenient")]
    pub report: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub company_profile: Option<CompanyProfile>,
}

/// Decodes a payload field, substituting `None` when the value has the wrong
/// shape so one bad field never discards the whole frame.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_or_default(value))
}

/// Like `lenient`, but decodes each element on its own and drops only the
/// malformed ones.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.into_iter().filter_map(decode_or_default).collect())),
        other => Ok(decode_or_default(other)),
    }
}

fn decode_or_default<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value::<T>(value) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring malformed stream payload field");
            None
        }
    }
}
