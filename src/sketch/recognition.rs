use crate::sketch::error::SketchError;
use reqwest::blocking::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

pub const CALCULATE_PATH: &str = "calculate";
const USER_AGENT: &str = "sketch-calc recognizer";

/// Payload sent to the recognition service: the drawing as a PNG data URL
/// plus every variable bound so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub image: String,
    #[serde(rename = "dict_of_vars")]
    pub variables: BTreeMap<String, String>,
}

/// One recognized expression. `is_assignment` marks a variable binding
/// whose name is `expression`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionItem {
    #[serde(rename = "expr")]
    pub expression: String,
    #[serde(rename = "result", deserialize_with = "scalar_as_string")]
    pub value: String,
    #[serde(rename = "assign", default)]
    pub is_assignment: bool,
}

impl RecognitionItem {
    pub fn new(expression: impl Into<String>, value: impl Into<String>, is_assignment: bool) -> Self {
        Self {
            expression: expression.into(),
            value: value.into(),
            is_assignment,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    data: Vec<RecognitionItem>,
}

/// The external service that turns a drawing into expressions.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, request: &RecognitionRequest) -> Result<Vec<RecognitionItem>, SketchError>;
}

/// Recognizer reached over HTTP at `POST {base}/calculate`.
pub struct HttpRecognizer {
    client: Client,
    endpoint: Url,
}

impl HttpRecognizer {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = calculate_endpoint(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        tracing::info!(%endpoint, "recognition endpoint configured");
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Recognizer for HttpRecognizer {
    fn recognize(&self, request: &RecognitionRequest) -> Result<Vec<RecognitionItem>, SketchError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .map_err(|err| SketchError::unavailable(format!("request failed: {err}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SketchError::unavailable(format!(
                "service responded with {status}"
            )));
        }

        let body = resp
            .text()
            .map_err(|err| SketchError::unavailable(format!("read response: {err}")))?;
        parse_response(&body)
    }
}

/// Resolve `{base}/calculate`, keeping any path prefix on the base address.
pub fn calculate_endpoint(base_url: &str) -> anyhow::Result<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base)
        .map_err(|err| anyhow::anyhow!("invalid recognition base url '{base_url}': {err}"))?;
    Ok(base.join(CALCULATE_PATH)?)
}

/// Decode the service envelope `{ message, status, data: [...] }`.
pub fn parse_response(body: &str) -> Result<Vec<RecognitionItem>, SketchError> {
    let envelope: ResponseEnvelope = serde_json::from_str(body)
        .map_err(|err| SketchError::unavailable(format!("malformed response: {err}")))?;

    if let Some(status) = envelope.status.as_deref() {
        if !status.eq_ignore_ascii_case("success") {
            let message = envelope.message.unwrap_or_default();
            return Err(SketchError::unavailable(format!(
                "service reported status '{status}': {message}"
            )));
        }
    }
    Ok(envelope.data)
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar result, got {other}"
        ))),
    }
}
