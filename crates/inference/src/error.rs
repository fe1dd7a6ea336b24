use crate::backend::InferenceError;
use preprocess::PreprocessError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline step, used to attribute failures, cancellations and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Decode,
    ResizeToMax,
    CropSquare,
    ResizeIntermediate,
    CropInput,
    LoadModel,
    Pack,
    Infer,
    Rank,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::ResizeToMax => "resize_to_max",
            Stage::CropSquare => "crop_square",
            Stage::ResizeIntermediate => "resize_intermediate",
            Stage::CropInput => "crop_input",
            Stage::LoadModel => "load_model",
            Stage::Pack => "pack",
            Stage::Infer => "infer",
            Stage::Rank => "rank",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Image decode failed: {0}")]
    Decode(#[source] PreprocessError),

    #[error("Preprocessing failed at {stage}: {source}")]
    Preprocess {
        stage: Stage,
        #[source]
        source: PreprocessError,
    },

    #[error("Failed to load model graph from {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: InferenceError,
    },

    #[error("Failed to load labels from {}: {source}", path.display())]
    LabelsLoad {
        path: PathBuf,
        #[source]
        source: InferenceError,
    },

    #[error("Inference failed: {0}")]
    Inference(#[source] InferenceError),

    #[error("Classification cancelled before {0}")]
    Cancelled(Stage),

    #[error("Classification deadline exceeded before {0}")]
    DeadlineExceeded(Stage),
}

impl ClassifyError {
    /// Stage the request was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            ClassifyError::Decode(_) => Stage::Decode,
            ClassifyError::Preprocess { stage, .. } => *stage,
            ClassifyError::ModelLoad { .. } | ClassifyError::LabelsLoad { .. } => Stage::LoadModel,
            ClassifyError::Inference(InferenceError::LabelCountMismatch { .. }) => Stage::Rank,
            ClassifyError::Inference(_) => Stage::Infer,
            ClassifyError::Cancelled(stage) | ClassifyError::DeadlineExceeded(stage) => *stage,
        }
    }

    /// HTTP status a hosting layer should answer with.
    ///
    /// Only undecodable input is the caller's fault; geometry failures point at
    /// a bad configuration and model/label/inference failures at the deployment.
    pub fn status_code(&self) -> u16 {
        match self {
            ClassifyError::Decode(_) => 400,
            ClassifyError::Cancelled(_) => 499,
            ClassifyError::DeadlineExceeded(_) => 504,
            ClassifyError::Preprocess { .. }
            | ClassifyError::ModelLoad { .. }
            | ClassifyError::LabelsLoad { .. }
            | ClassifyError::Inference(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
