use tracing::error;

use crate::core::time::now_rfc3339;
use crate::core::validation::{char_count, word_count};
use crate::models::summary::{SummaryRequest, SummaryResult};

use super::cache::SummaryCache;
use super::client::SummarizerClient;
use super::types::Summarized;

/// Cache lookup, model call on miss, then best-effort cache write.
#[derive(Clone)]
pub struct SummaryEngine {
    cache: SummaryCache,
    summarizer: SummarizerClient,
}

impl SummaryEngine {
    pub fn new(cache: SummaryCache, summarizer: SummarizerClient) -> Self {
        Self { cache, summarizer }
    }

    pub fn summarizer(&self) -> &SummarizerClient {
        &self.summarizer
    }

    pub async fn generate_summary(&self, request: &SummaryRequest) -> Result<SummaryResult, String> {
        if let Some(hit) = self.cache.lookup(&request.text, request.length).await {
            return Ok(hit);
        }

        let summarized = self
            .summarizer
            .summarize(&request.text, request.length)
            .await
            .map_err(|err| {
                error!("[SUMMARY] summarization error: {}", err);
                err
            })?;

        let result = build_result(&request.text, summarized);
        self.cache
            .store(&request.text, request.length, &result)
            .await;
        Ok(result)
    }
}

pub fn build_result(text: &str, summarized: Summarized) -> SummaryResult {
    SummaryResult {
        original_word_count: word_count(text),
        summary_word_count: word_count(&summarized.summary),
        compression_ratio: compression_ratio(&summarized.summary, text),
        inference_time_seconds: round_to(summarized.elapsed_seconds, 2),
        cached: false,
        timestamp: now_rfc3339(),
        summary: summarized.summary,
    }
}

/// Character-based ratio, as a percentage with one decimal.
pub fn compression_ratio(summary: &str, text: &str) -> f64 {
    let text_chars = char_count(text);
    if text_chars == 0 {
        return 0.0;
    }
    round_to(char_count(summary) as f64 / text_chars as f64 * 100.0, 1)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
