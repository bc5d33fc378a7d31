// src/cache/mod.rs

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::{self, Read, Write},
    sync::Arc,
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::dataset::RegionDataset;
use crate::error::{PipelineError, Result};
use crate::schema::{ColumnType, Schema};
use crate::storage::Storage;

/// Bumped whenever the on-disk layout changes.
const CACHE_FORMAT_VERSION: u32 = 1;

/// On-disk layout: gzip over bincode. The schema is stored alongside the
/// data so a file written for a different layout is detected on load.
#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    columns: Vec<(String, ColumnType)>,
    dataset: &'a RegionDataset,
}

#[derive(Deserialize)]
struct CacheFile {
    version: u32,
    columns: Vec<(String, ColumnType)>,
    dataset: RegionDataset,
}

/// How each `get_with` call was resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_hits: usize,
    pub disk_hits: usize,
    pub cold_parses: usize,
}

/// Per-region datasets, resolved from memory, then from a cache file, then
/// by running the caller's cold path.
///
/// A region is cold-parsed at most once per cache instance. An unusable
/// cache file is logged and replaced by a fresh cold parse.
pub struct RegionCache<S> {
    storage: S,
    template: String,
    schema: Schema,
    resident: HashMap<String, Arc<RegionDataset>>,
    stats: CacheStats,
}

impl<S: Storage> RegionCache<S> {
    /// `template` names the cache file; its `{}` is replaced by the region code.
    pub fn new(storage: S, template: impl Into<String>, schema: Schema) -> Self {
        Self {
            storage,
            template: template.into(),
            schema,
            resident: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn cache_key(&self, region: &str) -> String {
        self.template.replacen("{}", region, 1)
    }

    pub fn is_resident(&self, region: &str) -> bool {
        self.resident.contains_key(region)
    }

    /// Drop the in-memory copy; the cache file stays.
    pub fn evict(&mut self, region: &str) -> Option<Arc<RegionDataset>> {
        self.resident.remove(region)
    }

    /// Resolve `region`. `cold` runs only when neither tier has it; its
    /// result is kept in memory and persisted before being returned. When
    /// `cold` fails nothing is stored.
    pub fn get_with<F>(&mut self, region: &str, cold: F) -> Result<Arc<RegionDataset>>
    where
        F: FnOnce(&S) -> Result<RegionDataset>,
    {
        if let Some(ds) = self.resident.get(region) {
            self.stats.memory_hits += 1;
            debug!(region, "memory hit");
            return Ok(Arc::clone(ds));
        }

        let key = self.cache_key(region);
        if self.storage.exists(&key) {
            match self.load(&key, region) {
                Ok(ds) => {
                    self.stats.disk_hits += 1;
                    info!(region, key = %key, rows = ds.num_rows(), "loaded region from cache file");
                    return Ok(self.keep(region, ds));
                }
                Err(e) => warn!(region, error = %e, "discarding cache file"),
            }
        }

        let start = Instant::now();
        let ds = cold(&self.storage)?;
        self.stats.cold_parses += 1;
        self.store(&key, &ds)?;
        info!(
            region,
            key = %key,
            rows = ds.num_rows(),
            elapsed = ?start.elapsed(),
            "added region to cache file"
        );
        Ok(self.keep(region, ds))
    }

    fn keep(&mut self, region: &str, ds: RegionDataset) -> Arc<RegionDataset> {
        let ds = Arc::new(ds);
        self.resident.insert(region.to_string(), Arc::clone(&ds));
        ds
    }

    fn signature(&self) -> Vec<(String, ColumnType)> {
        self.schema
            .output_names()
            .into_iter()
            .zip(self.schema.output_types())
            .collect()
    }

    fn store(&self, key: &str, ds: &RegionDataset) -> Result<()> {
        let file = CacheFileRef {
            version: CACHE_FORMAT_VERSION,
            columns: self.signature(),
            dataset: ds,
        };
        let encoded = bincode::serialize(&file)
            .map_err(|e| PipelineError::storage(key, io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&encoded)
            .map_err(|e| PipelineError::storage(key, e))?;
        let compressed = encoder.finish().map_err(|e| PipelineError::storage(key, e))?;
        self.storage.write(key, &compressed)
    }

    fn load(&self, key: &str, region: &str) -> Result<RegionDataset> {
        let corrupt = |reason: String| PipelineError::CacheCorruption {
            key: key.to_string(),
            reason,
        };

        let compressed = self.storage.read(key)?;
        let mut encoded = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut encoded)
            .map_err(|e| corrupt(format!("gzip: {}", e)))?;
        let file: CacheFile =
            bincode::deserialize(&encoded).map_err(|e| corrupt(format!("decode: {}", e)))?;

        if file.version != CACHE_FORMAT_VERSION {
            return Err(corrupt(format!("format version {}", file.version)));
        }
        if file.columns != self.signature() {
            return Err(corrupt("written for a different schema".into()));
        }
        if file.dataset.region != region {
            return Err(corrupt(format!("holds region `{}`", file.dataset.region)));
        }
        file.dataset
            .validate(&self.schema.output_types())
            .map_err(corrupt)?;
        Ok(file.dataset)
    }
}
