use super::{InferenceBackend, InferenceError};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use preprocess::Tensor;
use std::sync::Mutex;

const DEFAULT_INTRA_THREADS: usize = 4;

/// A loaded ONNX Runtime session. Runs need exclusive access to the session.
pub struct OrtGraph {
    session: Mutex<Session>,
}

/// CPU-only ONNX Runtime backend.
#[derive(Debug, Clone)]
pub struct OrtBackend {
    intra_threads: usize,
}

impl OrtBackend {
    pub fn new() -> Self {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        Self {
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }

    pub fn with_intra_threads(mut self, intra_threads: usize) -> Self {
        self.intra_threads = intra_threads.max(1);
        self
    }
}

impl Default for OrtBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn graph_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Graph(e.to_string())
}

fn runtime_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Runtime(e.to_string())
}

impl InferenceBackend for OrtBackend {
    type Graph = OrtGraph;

    fn load_graph(&self, bytes: &[u8]) -> Result<OrtGraph, InferenceError> {
        let mut builder = Session::builder()
            .map_err(graph_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(graph_error)?
            .with_intra_threads(self.intra_threads)
            .map_err(graph_error)?;

        let session = builder.commit_from_memory(bytes).map_err(graph_error)?;

        tracing::debug!(
            model_bytes = bytes.len(),
            intra_threads = self.intra_threads,
            "ONNX Runtime session created"
        );

        Ok(OrtGraph {
            session: Mutex::new(session),
        })
    }

    fn run(
        &self,
        graph: &OrtGraph,
        input_name: &str,
        output_name: &str,
        tensor: &Tensor,
    ) -> Result<Vec<f32>, InferenceError> {
        let mut session = graph
            .session
            .lock()
            .map_err(|_| InferenceError::Runtime("session lock poisoned".to_string()))?;

        let input = TensorRef::from_array_view(tensor.view()).map_err(runtime_error)?;
        let outputs = session
            .run(ort::inputs![input_name => input])
            .map_err(runtime_error)?;

        let output = outputs
            .get(output_name)
            .ok_or_else(|| InferenceError::MissingTensor(output_name.to_string()))?;
        let probabilities = output.try_extract_array::<f32>().map_err(runtime_error)?;

        Ok(probabilities.iter().copied().collect())
    }
}
