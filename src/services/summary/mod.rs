pub mod cache;
pub mod client;
pub mod engine;
pub mod hf_client;
pub mod model_manager;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use cache::SummaryCache;
pub use client::SummarizerClient;
pub use engine::SummaryEngine;
pub use hf_client::HfModelLoader;
pub use model_manager::ModelManager;
pub use traits::ModelLoader;
