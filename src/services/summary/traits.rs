use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::types::GenerationParams;

pub type SummaryBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A loaded summarization model, treated as an opaque function.
pub trait SummaryModel: Send + Sync {
    fn summarize<'a>(
        &'a self,
        text: &'a str,
        params: GenerationParams,
    ) -> SummaryBoxFuture<'a, Result<String, String>>;
}

/// Builds the model instance. Called at most once per successful load.
pub trait ModelLoader: Send + Sync {
    fn load<'a>(&'a self) -> SummaryBoxFuture<'a, Result<Arc<dyn SummaryModel>, String>>;
}
