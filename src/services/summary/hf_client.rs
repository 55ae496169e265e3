use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{device_label, Config};
use crate::models::summary::SummaryLength;

use super::traits::{ModelLoader, SummaryBoxFuture, SummaryModel};
use super::types::GenerationParams;

const WARMUP_TEXT: &str = "The service is starting up and sends this short passage to the \
summarization model so that the weights are resident before the first real request. \
It contains enough words to pass through the normal generation path without being \
rejected for length, and the output is discarded once the call completes.";

#[derive(Debug, Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
    truncation: &'static str,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
    use_cache: bool,
    device: i32,
}

/// Summarization model served over the Hugging Face inference protocol.
pub struct HfInferenceModel {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    device: i32,
}

impl HfInferenceModel {
    fn payload<'a>(&self, text: &'a str, params: GenerationParams) -> InferencePayload<'a> {
        InferencePayload {
            inputs: text,
            parameters: InferenceParameters {
                min_length: params.min_length,
                max_length: params.max_length,
                do_sample: params.do_sample,
                truncation: "only_first",
            },
            options: InferenceOptions {
                wait_for_model: true,
                use_cache: false,
                device: self.device,
            },
        }
    }
}

impl SummaryModel for HfInferenceModel {
    fn summarize<'a>(
        &'a self,
        text: &'a str,
        params: GenerationParams,
    ) -> SummaryBoxFuture<'a, Result<String, String>> {
        Box::pin(async move {
            let mut request = self.http.post(&self.endpoint).json(&self.payload(text, params));
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| format!("inference request failed: {e}"))?;
            let status = response.status();
            let raw = response
                .text()
                .await
                .map_err(|e| format!("read inference response failed: {e}"))?;
            let body: Value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));

            if !status.is_success() {
                return Err(format!(
                    "inference endpoint returned {}: {}",
                    status,
                    error_message(&body).unwrap_or_else(|| body.to_string())
                ));
            }
            extract_summary(&body)
        })
    }
}

pub struct HfModelLoader {
    endpoint: String,
    model_id: String,
    api_key: Option<String>,
    device: i32,
    timeout: Duration,
    warmup: bool,
}

impl HfModelLoader {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            endpoint: cfg.summarizer_endpoint.clone(),
            model_id: cfg.summarizer_model.clone(),
            api_key: cfg.summarizer_api_key.clone(),
            device: cfg.summarizer_device,
            timeout: Duration::from_secs(cfg.summarizer_timeout_secs.max(1)),
            warmup: cfg.summarizer_warmup,
        }
    }
}

impl ModelLoader for HfModelLoader {
    fn load<'a>(&'a self) -> SummaryBoxFuture<'a, Result<Arc<dyn SummaryModel>, String>> {
        Box::pin(async move {
            info!(
                "[MODEL] model={} endpoint={} device={}",
                self.model_id,
                self.endpoint,
                device_label(self.device)
            );
            let http = reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| format!("build inference client failed: {e}"))?;

            let model = HfInferenceModel {
                http,
                endpoint: self.endpoint.clone(),
                api_key: self.api_key.clone(),
                device: self.device,
            };

            if self.warmup {
                let params = GenerationParams::for_length(SummaryLength::Short);
                model
                    .summarize(WARMUP_TEXT, params)
                    .await
                    .map_err(|e| format!("model warm-up failed: {e}"))?;
            } else if self.api_key.is_none() {
                warn!("[MODEL] SUMMARIZER_API_KEY not set; hosted endpoints may reject requests");
            }

            Ok(Arc::new(model) as Arc<dyn SummaryModel>)
        })
    }
}

/// Accepts `[{"summary_text": ..}]`, a bare `{"summary_text": ..}` object or
/// an `{"error": ..}` body.
pub fn extract_summary(body: &Value) -> Result<String, String> {
    let candidate = match body {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(body),
        _ => None,
    };

    if let Some(text) = candidate
        .and_then(|item| item.get("summary_text"))
        .and_then(|v| v.as_str())
    {
        return Ok(text.to_string());
    }

    match error_message(body) {
        Some(message) => Err(format!("model error: {message}")),
        None => Err(format!("unexpected inference response: {body}")),
    }
}

fn error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(other) => Some(other.to_string()),
        None => body.as_str().map(|s| s.to_string()),
    }
}
