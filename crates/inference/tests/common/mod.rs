#![allow(dead_code)]

use image::Rgb;
use inference::{ClassifierConfig, InferenceBackend, InferenceError};
use preprocess::{EncodeFormat, PixelImage, Tensor, encode};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// What the fake backend was asked to run
#[derive(Debug, Clone)]
pub struct SeenTensor {
    pub input_name: String,
    pub shape: Vec<usize>,
    pub center_bgr: [f32; 3],
}

/// Backend whose "model file" is a whitespace-separated probability vector.
///
/// `run` returns that vector unchanged, so tests control the network output
/// through the file on disk.
pub struct FakeBackend {
    pub input_name: String,
    pub output_name: String,
    graph_loads: AtomicUsize,
    runs: AtomicUsize,
    seen: Mutex<Vec<SeenTensor>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            input_name: "Placeholder".to_string(),
            output_name: "loss".to_string(),
            graph_loads: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn graph_loads(&self) -> usize {
        self.graph_loads.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenTensor> {
        self.seen.lock().unwrap().clone()
    }
}

impl InferenceBackend for FakeBackend {
    type Graph = Vec<f32>;

    fn load_graph(&self, bytes: &[u8]) -> Result<Vec<f32>, InferenceError> {
        self.graph_loads.fetch_add(1, Ordering::SeqCst);

        let text = std::str::from_utf8(bytes).map_err(|e| InferenceError::Graph(e.to_string()))?;
        text.split_whitespace()
            .map(|token| {
                token
                    .parse::<f32>()
                    .map_err(|e| InferenceError::Graph(format!("{}: {}", token, e)))
            })
            .collect()
    }

    fn run(
        &self,
        graph: &Vec<f32>,
        input_name: &str,
        output_name: &str,
        tensor: &Tensor,
    ) -> Result<Vec<f32>, InferenceError> {
        self.runs.fetch_add(1, Ordering::SeqCst);

        if input_name != self.input_name {
            return Err(InferenceError::MissingTensor(input_name.to_string()));
        }
        if output_name != self.output_name {
            return Err(InferenceError::MissingTensor(output_name.to_string()));
        }

        let shape = tensor.shape().to_vec();
        let (row, col) = (shape[1] / 2, shape[2] / 2);
        self.seen.lock().unwrap().push(SeenTensor {
            input_name: input_name.to_string(),
            shape,
            center_bgr: [
                tensor[[0, row, col, 0]],
                tensor[[0, row, col, 1]],
                tensor[[0, row, col, 2]],
            ],
        });

        Ok(graph.clone())
    }
}

/// Temporary models directory holding `model.pb` and `labels.txt`
pub fn models_dir(probabilities: &str, labels: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), probabilities);
    fs::write(dir.path().join("labels.txt"), labels).unwrap();
    dir
}

pub fn write_model(dir: &Path, probabilities: &str) {
    fs::write(dir.join("model.pb"), probabilities).unwrap();
}

pub fn config_for(dir: &TempDir) -> ClassifierConfig {
    ClassifierConfig::new(dir.path())
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = PixelImage::from_pixel(width, height, Rgb(color));
    encode(&image, EncodeFormat::Png).unwrap()
}
