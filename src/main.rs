use anyhow::{Context, Result};
use crashdata::{export, Pipeline, PipelineConfig};
use serde::Serialize;
use std::{env, path::PathBuf};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_REGIONS: &str = "MSK,JHM,ZLK";

#[derive(Serialize)]
struct Summary {
    regions: Vec<String>,
    rows: usize,
    columns: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = match env::var_os("CRASHDATA_CONFIG") {
        Some(path) => PipelineConfig::from_yaml_file(&path)
            .with_context(|| format!("loading config {:?}", path))?,
        None => PipelineConfig::default(),
    };
    let regions: Vec<String> = env::var("CRASHDATA_REGIONS")
        .unwrap_or_else(|_| DEFAULT_REGIONS.to_string())
        .split(',')
        .map(|r| r.trim().to_uppercase())
        .filter(|r| !r.is_empty())
        .collect();
    let export_path = env::var_os("CRASHDATA_EXPORT").map(PathBuf::from);
    info!(folder = %config.folder.display(), ?regions, "configured");

    // ─── 3) run the blocking pipeline off the async runtime ──────────
    let start = Instant::now();
    let summary = tokio::task::spawn_blocking(move || -> Result<Summary> {
        let mut pipeline =
            Pipeline::from_config(config).context("preparing data folder")?;
        let requested: Vec<&str> = regions.iter().map(String::as_str).collect();
        let data = pipeline
            .aggregate(Some(requested.as_slice()))
            .context("aggregating regions")?;

        if let Some(path) = export_path {
            export::write_parquet(&data, &path)
                .with_context(|| format!("exporting to {}", path.display()))?;
        }

        let stats = pipeline.cache_stats();
        info!(
            memory_hits = stats.memory_hits,
            disk_hits = stats.disk_hits,
            cold_parses = stats.cold_parses,
            "cache"
        );
        Ok(Summary {
            rows: data.num_rows(),
            columns: data.names,
            regions,
        })
    })
    .await??;

    // ─── 4) report ───────────────────────────────────────────────────
    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
