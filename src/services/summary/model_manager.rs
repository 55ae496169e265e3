use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::{error, info};

use super::traits::{ModelLoader, SummaryModel};

/// Lazily builds the model on first use and keeps it for the process
/// lifetime. Concurrent first callers wait on the same initialization; a
/// failed load leaves the cell empty so the next caller retries.
pub struct ModelManager {
    loader: Arc<dyn ModelLoader>,
    model: OnceCell<Arc<dyn SummaryModel>>,
}

impl ModelManager {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    pub async fn get_model(&self) -> Result<Arc<dyn SummaryModel>, String> {
        let model = self
            .model
            .get_or_try_init(|| async {
                info!("[MODEL] loading summarization model...");
                let started = Instant::now();
                let model = self.loader.load().await.map_err(|err| {
                    error!("[MODEL] load failed: {}", err);
                    err
                })?;
                info!(
                    "[MODEL] model loaded in {:.2}s",
                    started.elapsed().as_secs_f64()
                );
                Ok::<Arc<dyn SummaryModel>, String>(model)
            })
            .await?;
        Ok(Arc::clone(model))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::services::summary::testing::{FailingLoader, StaticLoader};

    #[tokio::test(start_paused = true)]
    async fn concurrent_first_access_loads_once() {
        let loader = Arc::new(StaticLoader::with_delay("summary", Duration::from_secs(3)));
        let manager = Arc::new(ModelManager::new(loader.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.get_model().await.map(|_| ()) })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.expect("task").expect("model");
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(manager.is_loaded());
    }

    #[tokio::test]
    async fn failed_load_is_retried_on_next_access() {
        let loader = Arc::new(FailingLoader::default());
        let manager = ModelManager::new(loader.clone());

        assert!(manager.get_model().await.is_err());
        assert!(manager.get_model().await.is_err());
        assert!(!manager.is_loaded());
        assert_eq!(loader.attempts.load(Ordering::SeqCst), 2);
    }
}
