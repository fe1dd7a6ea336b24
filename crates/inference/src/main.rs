use anyhow::Context;
use common::{TelemetryConfig, TelemetryGuard};
use inference::{
    ClassificationPipeline, ClassifierConfig, LabelConfidence, backend::ort::OrtBackend,
    logging::setup_logging,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Serialize)]
struct Report {
    image: String,
    predictions: Vec<LabelConfidence>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClassifierConfig::from_env()?;

    let _telemetry = match &config.otel_endpoint {
        Some(endpoint) => {
            let telemetry = TelemetryConfig::new("classify", endpoint, config.environment)
                .with_log_directive(&config.log_level);
            Some(TelemetryGuard::init(&telemetry)?)
        }
        None => {
            setup_logging(&config);
            None
        }
    };

    let images: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if images.is_empty() {
        anyhow::bail!("Usage: classify <image>...");
    }

    tracing::info!(
        config = ?config,
        images = images.len(),
        "Loaded configuration"
    );

    let pipeline = Arc::new(ClassificationPipeline::new(OrtBackend::new(), &config));

    // One image at a time: each classification may build its own session
    let mut failures = 0usize;
    for path in images {
        let pipeline = Arc::clone(&pipeline);
        let task = tokio::task::spawn_blocking(move || classify_file(&pipeline, path));

        match task.await? {
            Ok(report) => println!("{}", serde_json::to_string(&report)?),
            Err(e) => {
                failures += 1;
                tracing::error!(error = ?e, "Image skipped");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} image(s) could not be classified", failures);
    }
    Ok(())
}

fn classify_file(
    pipeline: &ClassificationPipeline<OrtBackend>,
    path: PathBuf,
) -> anyhow::Result<Report> {
    let bytes =
        std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;

    let predictions = pipeline
        .classify(&bytes)
        .with_context(|| format!("Failed to classify {}", path.display()))?;

    Ok(Report {
        image: path.display().to_string(),
        predictions,
    })
}
