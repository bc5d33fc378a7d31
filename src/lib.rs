//! Download, parse and cache yearly regional traffic-accident archives.
//!
//! Archives are zip files of semicolon-separated, Windows-1250 encoded CSV,
//! one entry per region. [`Pipeline`] fetches missing archives, turns a
//! region's rows into typed columns, caches the result in memory and on
//! disk, and concatenates regions into one [`AggregatedDataset`].

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod storage;

pub use cache::{CacheStats, RegionCache};
pub use config::PipelineConfig;
pub use dataset::{AggregatedDataset, ColumnData, RegionDataset};
pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
pub use schema::{Column, ColumnType, Schema};
