use preprocess::Tensor;
use std::io;
use thiserror::Error;

#[cfg(feature = "ort-backend")]
pub mod ort;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Malformed graph: {0}")]
    Graph(String),

    #[error("Unreadable labels: {0}")]
    Labels(String),

    #[error("Tensor `{0}` not found in graph")]
    MissingTensor(String),

    #[error("Graph execution failed: {0}")]
    Runtime(String),

    #[error("Graph produced {probabilities} probabilities for {labels} labels")]
    LabelCountMismatch { probabilities: usize, labels: usize },
}

/// Graph execution engine the pipeline runs on.
///
/// Implementations only turn bytes into a graph handle and run it; reading
/// files, caching and ranking are handled by the caller.
pub trait InferenceBackend {
    type Graph;

    fn load_graph(&self, bytes: &[u8]) -> Result<Self::Graph, InferenceError>;

    /// Parse a labels file: one label per line, order significant.
    fn load_labels(&self, bytes: &[u8]) -> Result<Vec<String>, InferenceError> {
        parse_labels(bytes)
    }

    /// Feed `tensor` to `input_name` and return the flattened `output_name` tensor.
    fn run(
        &self,
        graph: &Self::Graph,
        input_name: &str,
        output_name: &str,
        tensor: &Tensor,
    ) -> Result<Vec<f32>, InferenceError>;
}

/// Split a UTF-8 labels file into lines.
///
/// A leading byte-order mark is dropped and `\r\n` endings are accepted. Blank
/// lines are kept: removing them would shift every later label off its output
/// index.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<String>, InferenceError> {
    let text = std::str::from_utf8(bytes).map_err(|e| InferenceError::Labels(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    Ok(text.lines().map(str::to_string).collect())
}
