use crate::store::ReloadPolicy;
use common::{env_flag, env_parse};
use preprocess::{BGR_CHANNELS, DEFAULT_INPUT_SIZE, INTERMEDIATE_SIZE};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub use common::Environment;

pub const DEFAULT_INPUT_TENSOR_NAME: &str = "Placeholder";
pub const DEFAULT_OUTPUT_TENSOR_NAME: &str = "loss";
pub const DEFAULT_MODEL_FILENAME: &str = "model.pb";
pub const DEFAULT_LABELS_FILENAME: &str = "labels.txt";
pub const DEFAULT_THRESHOLD: f32 = 0.9;

/// What the model expects and where its files live. Fixed for the lifetime of
/// the process.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub input_tensor_name: String,
    pub output_tensor_name: String,
    pub model_filename: String,
    pub labels_filename: String,
    pub threshold: f32,
    pub input_width: u32,
    pub input_height: u32,
    pub input_channels: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            input_tensor_name: DEFAULT_INPUT_TENSOR_NAME.to_string(),
            output_tensor_name: DEFAULT_OUTPUT_TENSOR_NAME.to_string(),
            model_filename: DEFAULT_MODEL_FILENAME.to_string(),
            labels_filename: DEFAULT_LABELS_FILENAME.to_string(),
            threshold: DEFAULT_THRESHOLD,
            input_width: DEFAULT_INPUT_SIZE.0,
            input_height: DEFAULT_INPUT_SIZE.1,
            input_channels: BGR_CHANNELS,
        }
    }
}

impl ModelSettings {
    /// Compiled-in defaults, overridden by environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let settings = Self {
            input_tensor_name: env::var("INPUT_TENSOR_NAME")
                .unwrap_or(defaults.input_tensor_name),
            output_tensor_name: env::var("OUTPUT_TENSOR_NAME")
                .unwrap_or(defaults.output_tensor_name),
            model_filename: env::var("MODEL_FILENAME").unwrap_or(defaults.model_filename),
            labels_filename: env::var("LABELS_FILENAME").unwrap_or(defaults.labels_filename),
            threshold: env_parse("PROBABILITY_THRESHOLD")?.unwrap_or(defaults.threshold),
            input_width: env_parse("INPUT_WIDTH")?.unwrap_or(defaults.input_width),
            input_height: env_parse("INPUT_HEIGHT")?.unwrap_or(defaults.input_height),
            input_channels: env_parse("INPUT_CHANNELS")?.unwrap_or(defaults.input_channels),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn input_size(&self) -> (u32, u32) {
        (self.input_width, self.input_height)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!(
                "Probability threshold must be within [0, 1], got {}",
                self.threshold
            );
        }
        if self.input_width == 0 || self.input_height == 0 {
            anyhow::bail!(
                "Input tensor size must be non-zero, got {}x{}",
                self.input_width,
                self.input_height
            );
        }
        if self.input_width != self.input_height {
            anyhow::bail!(
                "Input tensor must be square, got {}x{}",
                self.input_width,
                self.input_height
            );
        }
        if self.input_width > INTERMEDIATE_SIZE {
            anyhow::bail!(
                "Input tensor size {} exceeds the {}px intermediate crop",
                self.input_width,
                INTERMEDIATE_SIZE
            );
        }
        if self.input_channels != BGR_CHANNELS {
            anyhow::bail!(
                "Input tensor must have {} channels, got {}",
                BGR_CHANNELS,
                self.input_channels
            );
        }
        if self.input_tensor_name.is_empty() || self.output_tensor_name.is_empty() {
            anyhow::bail!("Input and output tensor names must be set");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub environment: Environment,
    pub log_level: String,
    pub models_root: PathBuf,
    pub settings: ModelSettings,
    pub reload_policy: ReloadPolicy,
    /// Where to write a copy of each preprocessed image, if anywhere
    pub preprocessed_dir: Option<PathBuf>,
    /// Applied to every `classify` call that does not bring its own cancellation
    pub timeout: Option<Duration>,
    pub otel_endpoint: Option<String>,
}

impl ClassifierConfig {
    /// Defaults for everything except the models directory.
    pub fn new(models_root: impl Into<PathBuf>) -> Self {
        Self {
            environment: Environment::Development,
            log_level: "info".to_string(),
            models_root: models_root.into(),
            settings: ModelSettings::default(),
            reload_policy: ReloadPolicy::EveryRequest,
            preprocessed_dir: None,
            timeout: None,
            otel_endpoint: None,
        }
    }

    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let models_root = env::var("MODELS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models"));

        let settings = ModelSettings::from_env()?;

        let reload_policy = if env_flag("CACHE_MODELS").unwrap_or(false) {
            ReloadPolicy::CacheUntilModified
        } else {
            ReloadPolicy::EveryRequest
        };

        let preprocessed_dir = match env::var("PREPROCESSED_DIR") {
            Ok(dir) => Some(PathBuf::from(dir)),
            Err(_) if env_flag("SAVE_PREPROCESSED").unwrap_or(false) => {
                Some(env::temp_dir().join("classify"))
            }
            Err(_) => None,
        };

        let timeout = env_parse::<u64>("CLASSIFY_TIMEOUT_MS")?
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);

        let otel_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            environment,
            log_level,
            models_root,
            settings,
            reload_policy,
            preprocessed_dir,
            timeout,
            otel_endpoint,
        })
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_root.join(&self.settings.model_filename)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.models_root.join(&self.settings.labels_filename)
    }
}
