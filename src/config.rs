// src/config.rs

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};
use url::Url;

use crate::error::{PipelineError, Result};

pub const DEFAULT_URL: &str = "https://ehw.fit.vutbr.cz/izv/";
pub const DEFAULT_FOLDER: &str = "data";
pub const DEFAULT_CACHE_TEMPLATE: &str = "data_{}.bin.gz";

/// Yearly archives every region is assembled from, oldest first.
pub static DEFAULT_ARCHIVES: &[&str] = &[
    "datagis2016.zip",
    "datagis-rok-2017.zip",
    "datagis-rok-2018.zip",
    "datagis-rok-2019.zip",
    "datagis-09-2020.zip",
];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/70.0.3538.77 Safari/537.36";

/// Pipeline settings. Every field is optional in the YAML file.
///
/// ```yaml
/// url: https://ehw.fit.vutbr.cz/izv/
/// folder: data
/// cache_template: data_{}.bin.gz
/// timeout_secs: 60
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Listing page the archives are linked from.
    pub url: String,
    /// Local folder for archives and cache files.
    pub folder: PathBuf,
    /// Cache file name; `{}` is replaced by the region code.
    pub cache_template: String,
    pub archives: Vec<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            folder: PathBuf::from(DEFAULT_FOLDER),
            cache_template: DEFAULT_CACHE_TEMPLATE.to_string(),
            archives: DEFAULT_ARCHIVES.iter().map(|a| a.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 60,
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a YAML config file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_yaml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.listing_url()?;
        if self.cache_template.matches("{}").count() != 1 {
            return Err(PipelineError::Config(format!(
                "cache_template `{}` must contain exactly one `{{}}`",
                self.cache_template
            )));
        }
        if self.archives.is_empty() {
            return Err(PipelineError::Config("archive list is empty".into()));
        }
        Ok(())
    }

    pub fn listing_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|e| PipelineError::Config(format!("url `{}`: {}", self.url, e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.archives.len(), 5);
        assert_eq!(config.cache_template, DEFAULT_CACHE_TEMPLATE);
    }

    #[test]
    fn yaml_overrides_only_given_fields() {
        let config = PipelineConfig::from_yaml_str(
            "folder: /tmp/accidents\ncache_template: \"cache-{}.gz\"\nmax_retries: 0\n",
        )
        .unwrap();
        assert_eq!(config.folder, PathBuf::from("/tmp/accidents"));
        assert_eq!(config.cache_template, "cache-{}.gz");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.url, DEFAULT_URL);
    }

    #[test]
    fn rejects_bad_values() {
        for yaml in [
            "cache_template: data.gz",
            "cache_template: \"{}_{}.gz\"",
            "archives: []",
            "url: not a url",
            "unknown_key: 1",
        ] {
            assert!(
                matches!(
                    PipelineConfig::from_yaml_str(yaml),
                    Err(PipelineError::Config(_))
                ),
                "accepted {yaml}"
            );
        }
    }
}
