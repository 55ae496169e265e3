use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::traits::{ModelLoader, SummaryBoxFuture, SummaryModel};
use super::types::GenerationParams;

pub fn sample_text(words: usize) -> String {
    (0..words)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct StaticModel {
    summary: String,
    pub calls: AtomicUsize,
    params: Mutex<Option<GenerationParams>>,
}

impl StaticModel {
    pub fn last_params(&self) -> Option<GenerationParams> {
        *self.params.lock().unwrap()
    }
}

impl SummaryModel for StaticModel {
    fn summarize<'a>(
        &'a self,
        _text: &'a str,
        params: GenerationParams,
    ) -> SummaryBoxFuture<'a, Result<String, String>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.params.lock().unwrap() = Some(params);
            Ok(self.summary.clone())
        })
    }
}

pub struct StaticLoader {
    pub model: Arc<StaticModel>,
    pub loads: AtomicUsize,
    delay: Duration,
}

impl StaticLoader {
    pub fn new(summary: &str) -> Self {
        Self::with_delay(summary, Duration::ZERO)
    }

    pub fn with_delay(summary: &str, delay: Duration) -> Self {
        Self {
            model: Arc::new(StaticModel {
                summary: summary.to_string(),
                calls: AtomicUsize::new(0),
                params: Mutex::new(None),
            }),
            loads: AtomicUsize::new(0),
            delay,
        }
    }
}

impl ModelLoader for StaticLoader {
    fn load<'a>(&'a self) -> SummaryBoxFuture<'a, Result<Arc<dyn SummaryModel>, String>> {
        Box::pin(async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.model.clone() as Arc<dyn SummaryModel>)
        })
    }
}

#[derive(Default)]
pub struct FailingLoader {
    pub attempts: AtomicUsize,
}

impl ModelLoader for FailingLoader {
    fn load<'a>(&'a self) -> SummaryBoxFuture<'a, Result<Arc<dyn SummaryModel>, String>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err("model unavailable: weights not found".to_string())
        })
    }
}
