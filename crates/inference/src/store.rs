use crate::backend::{InferenceBackend, InferenceError};
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

/// A parsed graph together with its index-aligned labels.
pub struct LoadedModel<G> {
    pub graph: G,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Read and parse the model and labels on every request.
    #[default]
    EveryRequest,
    /// Keep the last load until either file's modification time or size changes.
    CacheUntilModified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    model_path: PathBuf,
    labels_path: PathBuf,
    model: FileStamp,
    labels: FileStamp,
}

type CachedModel<G> = (CacheKey, Arc<LoadedModel<G>>);

/// Loads the model and labels files through a backend.
pub struct ModelStore<B: InferenceBackend> {
    backend: B,
    model_path: PathBuf,
    labels_path: PathBuf,
    policy: ReloadPolicy,
    cached: RwLock<Option<CachedModel<B::Graph>>>,
}

impl<B: InferenceBackend> ModelStore<B> {
    pub fn new(backend: B, model_path: PathBuf, labels_path: PathBuf, policy: ReloadPolicy) -> Self {
        Self {
            backend,
            model_path,
            labels_path,
            policy,
            cached: RwLock::new(None),
        }
    }

    pub fn from_config(backend: B, config: &ClassifierConfig) -> Self {
        Self::new(
            backend,
            config.model_path(),
            config.labels_path(),
            config.reload_policy,
        )
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn labels_path(&self) -> &Path {
        &self.labels_path
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    /// Current model, loaded according to the reload policy.
    ///
    /// The model file is read before the labels file, so a missing model is
    /// always reported as [`ClassifyError::ModelLoad`].
    pub fn load(&self) -> Result<Arc<LoadedModel<B::Graph>>, ClassifyError> {
        match self.policy {
            ReloadPolicy::EveryRequest => self.read_and_parse().map(Arc::new),
            ReloadPolicy::CacheUntilModified => self.load_cached(),
        }
    }

    fn load_cached(&self) -> Result<Arc<LoadedModel<B::Graph>>, ClassifyError> {
        let key = self.cache_key()?;

        {
            let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((cached_key, model)) = cached.as_ref()
                && *cached_key == key
            {
                return Ok(Arc::clone(model));
            }
        }

        let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have loaded it while we waited for the write lock
        if let Some((cached_key, model)) = cached.as_ref()
            && *cached_key == key
        {
            return Ok(Arc::clone(model));
        }

        tracing::info!(
            model_path = %self.model_path.display(),
            labels_path = %self.labels_path.display(),
            "Model files changed or not cached yet, reloading"
        );

        let model = Arc::new(self.read_and_parse()?);
        *cached = Some((key, Arc::clone(&model)));
        Ok(model)
    }

    fn cache_key(&self) -> Result<CacheKey, ClassifyError> {
        let model = stamp(&self.model_path).map_err(|source| ClassifyError::ModelLoad {
            path: self.model_path.clone(),
            source,
        })?;
        let labels = stamp(&self.labels_path).map_err(|source| ClassifyError::LabelsLoad {
            path: self.labels_path.clone(),
            source,
        })?;

        Ok(CacheKey {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            model,
            labels,
        })
    }

    fn read_and_parse(&self) -> Result<LoadedModel<B::Graph>, ClassifyError> {
        let _s = common::span!("load_model");

        let model_error = |source| ClassifyError::ModelLoad {
            path: self.model_path.clone(),
            source,
        };
        let model_bytes = fs::read(&self.model_path).map_err(|e| model_error(e.into()))?;
        let graph = self.backend.load_graph(&model_bytes).map_err(model_error)?;

        let labels_error = |source| ClassifyError::LabelsLoad {
            path: self.labels_path.clone(),
            source,
        };
        let label_bytes = fs::read(&self.labels_path).map_err(|e| labels_error(e.into()))?;
        let labels = self.backend.load_labels(&label_bytes).map_err(labels_error)?;

        tracing::debug!(
            model_bytes = model_bytes.len(),
            labels = labels.len(),
            "Model loaded"
        );

        Ok(LoadedModel { graph, labels })
    }
}

fn stamp(path: &Path) -> Result<FileStamp, InferenceError> {
    let metadata = fs::metadata(path)?;
    Ok(FileStamp {
        modified: metadata.modified().ok(),
        len: metadata.len(),
    })
}
