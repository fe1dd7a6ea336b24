pub mod backend;
pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod store;

// Re-export commonly used types for convenience
pub use backend::{InferenceBackend, InferenceError};
pub use cancel::Cancellation;
pub use config::{ClassifierConfig, ModelSettings};
pub use error::{ClassifyError, Stage};
pub use pipeline::ClassificationPipeline;
pub use ranking::{LabelConfidence, ResultRanker};
pub use store::{LoadedModel, ModelStore, ReloadPolicy};
