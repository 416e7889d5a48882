use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] api_client::error::ApiError),

    #[error(
        "No data left after the cutoff: {total_rows} distinct rows, none on or after {cutoff} ({months} months back)"
    )]
    EmptyWindow {
        cutoff: DateTime<Utc>,
        months: u32,
        total_rows: usize,
    },

    #[error("Transform failed: {0}")]
    Transform(#[from] analytics::AnalyticsError),

    #[error("Validation failed: {0}")]
    Validation(#[from] data_quality::error::ValidationError),

    #[error("Render failed: {0}")]
    Render(#[from] renderer::RenderError),
}

impl PipelineError {
    /// The pipeline stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::EmptyWindow { .. } | PipelineError::Transform(_) => "transform",
            PipelineError::Validation(_) => "validate",
            PipelineError::Render(_) => "render",
        }
    }
}
