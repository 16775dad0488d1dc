use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid detection #{index}: {reason}")]
    InvalidDetection { index: usize, reason: String },

    #[error("Track ids exhausted: {needed} needed, {remaining} left")]
    IdsExhausted { needed: usize, remaining: u64 },

    #[error("Degenerate filter state: {0}")]
    Degenerate(String),

    #[error("Pipeline is closed")]
    PipelineClosed,

    #[error("Pipeline worker panicked")]
    WorkerPanicked,

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}
