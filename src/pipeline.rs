// src/pipeline.rs

use std::{io::Cursor, sync::Arc};
use tracing::{debug, info};

use crate::aggregate;
use crate::cache::{CacheStats, RegionCache};
use crate::config::PipelineConfig;
use crate::dataset::{AggregatedDataset, RegionDataset};
use crate::error::{PipelineError, Result};
use crate::fetch::{Fetcher, HttpTransport, Transport};
use crate::process::{self, parse_records, RawRecord};
use crate::schema::{self, Schema};
use crate::storage::{FsStorage, Storage};

/// Downloads, parses and caches the yearly accident archives, and merges
/// regions on request.
pub struct Pipeline<T, S> {
    config: PipelineConfig,
    schema: Schema,
    fetcher: Fetcher<T>,
    cache: RegionCache<S>,
}

impl Pipeline<HttpTransport, FsStorage> {
    /// Pipeline over HTTP with the data folder from `config`. Fails if the
    /// folder cannot be created.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let storage = FsStorage::new(&config.folder)?;
        let transport = HttpTransport::new(&config)?;
        Self::with_parts(config, transport, storage)
    }
}

impl<T: Transport, S: Storage> Pipeline<T, S> {
    pub fn with_parts(config: PipelineConfig, transport: T, storage: S) -> Result<Self> {
        config.validate()?;
        let schema = Schema::accidents();
        let fetcher = Fetcher::new(transport, config.listing_url()?, config.archives.clone());
        let cache = RegionCache::new(storage, config.cache_template.clone(), schema.clone());
        Ok(Self {
            config,
            schema,
            fetcher,
            cache,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn cache(&self) -> &RegionCache<S> {
        &self.cache
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Output column names, `region` last.
    pub fn column_names(&self) -> Vec<String> {
        self.schema.output_names()
    }

    /// Download any archive not yet stored locally.
    pub fn ensure_archives(&self) -> Result<usize> {
        self.fetcher.ensure(self.cache.storage())
    }

    /// Re-download every archive the listing offers.
    pub fn download_all(&self) -> Result<usize> {
        self.fetcher.download_all(self.cache.storage())
    }

    /// Parse `region` straight from the archives, bypassing both cache tiers.
    pub fn parse_region(&self, region: &str) -> Result<RegionDataset> {
        cold_parse(&self.fetcher, self.cache.storage(), &self.schema, region)
    }

    /// Dataset for one region, from memory, the cache file, or the archives.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn get(&mut self, region: &str) -> Result<Arc<RegionDataset>> {
        if schema::entry_name(region).is_none() {
            return Err(PipelineError::UnknownRegion(region.to_string()));
        }
        let fetcher = &self.fetcher;
        let schema = &self.schema;
        self.cache
            .get_with(region, |storage| cold_parse(fetcher, storage, schema, region))
    }

    /// Merge the requested regions (all of them for `None`) in request order.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn aggregate(&mut self, regions: Option<&[&str]>) -> Result<AggregatedDataset> {
        let regions = aggregate::resolve_regions(regions)?;
        let mut parts = Vec::with_capacity(regions.len());
        for region in &regions {
            parts.push(self.get(region)?);
        }
        let merged = aggregate::concat(&self.schema, &parts)?;
        info!(regions = regions.len(), rows = merged.num_rows(), "aggregated");
        Ok(merged)
    }
}

/// Fetch missing archives, collect the region's rows from every archive in
/// configured order and parse them.
fn cold_parse<T, S>(
    fetcher: &Fetcher<T>,
    storage: &S,
    schema: &Schema,
    region: &str,
) -> Result<RegionDataset>
where
    T: Transport,
    S: Storage + ?Sized,
{
    let entry = schema::entry_name(region)
        .ok_or_else(|| PipelineError::UnknownRegion(region.to_string()))?;
    fetcher.ensure(storage)?;

    let mut rows: Vec<RawRecord> = Vec::new();
    for archive in fetcher.archives() {
        if !storage.exists(archive) {
            return Err(PipelineError::archive(archive, "missing after fetch"));
        }
        let bytes = storage.read(archive)?;
        let part = process::read_region_rows(Cursor::new(bytes), archive, entry)?;
        debug!(region, archive = %archive, rows = part.len(), "read archive");
        rows.extend(part);
    }

    info!(region, rows = rows.len(), "parsing region");
    Ok(parse_records(&rows, schema, region))
}
