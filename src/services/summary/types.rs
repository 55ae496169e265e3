use serde::Serialize;

use crate::models::summary::SummaryLength;

/// Output bounds for one generation call, in model tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationParams {
    pub min_length: u32,
    pub max_length: u32,
    pub do_sample: bool,
}

impl GenerationParams {
    pub fn for_length(length: SummaryLength) -> Self {
        let (min_length, max_length) = match length {
            SummaryLength::Short => (20, 50),
            SummaryLength::Medium => (30, 130),
            SummaryLength::Long => (50, 250),
        };
        Self {
            min_length,
            max_length,
            do_sample: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summarized {
    pub summary: String,
    pub elapsed_seconds: f64,
}
