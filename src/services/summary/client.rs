use std::sync::Arc;
use std::time::Instant;

use crate::models::summary::SummaryLength;

use super::model_manager::ModelManager;
use super::types::{GenerationParams, Summarized};

#[derive(Clone)]
pub struct SummarizerClient {
    models: Arc<ModelManager>,
}

impl SummarizerClient {
    pub fn new(models: Arc<ModelManager>) -> Self {
        Self { models }
    }

    pub async fn summarize(&self, text: &str, length: SummaryLength) -> Result<Summarized, String> {
        let model = self.models.get_model().await?;
        let params = GenerationParams::for_length(length);

        let started = Instant::now();
        let summary = model.summarize(text, params).await?;
        Ok(Summarized {
            summary: summary.trim().to_string(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }

    pub async fn ensure_loaded(&self) -> Result<(), String> {
        self.models.get_model().await.map(|_| ())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.models.is_loaded()
    }
}
