// src/fetch/mod.rs
pub mod client;
pub mod urls;
pub mod zips;

use tracing::{debug, info};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::storage::Storage;

pub use client::{HttpTransport, Transport};
pub use urls::{ArchiveLink, ArchiveListing, HtmlListing};

/// Makes sure the yearly archives are present in local storage.
pub struct Fetcher<T> {
    transport: T,
    listing_url: Url,
    archives: Vec<String>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, listing_url: Url, archives: Vec<String>) -> Self {
        Self {
            transport,
            listing_url,
            archives,
        }
    }

    pub fn archives(&self) -> &[String] {
        &self.archives
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn listing(&self) -> HtmlListing<&T> {
        HtmlListing::new(&self.transport, self.listing_url.clone())
    }

    /// Download every archive missing from `storage`, using the HTML listing.
    /// Returns how many archives were downloaded; zero means no network
    /// traffic happened.
    pub fn ensure<S: Storage + ?Sized>(&self, storage: &S) -> Result<usize> {
        self.ensure_from(storage, &self.listing())
    }

    /// [`Fetcher::ensure`] against an arbitrary listing.
    pub fn ensure_from<S, L>(&self, storage: &S, listing: &L) -> Result<usize>
    where
        S: Storage + ?Sized,
        L: ArchiveListing + ?Sized,
    {
        let missing: Vec<&String> = self
            .archives
            .iter()
            .filter(|archive| !storage.exists(archive))
            .collect();
        if missing.is_empty() {
            debug!("all archives present");
            return Ok(0);
        }

        let links = listing.links()?;
        for archive in &missing {
            info!(archive = %archive, "data archive missing");
            let link = links
                .iter()
                .find(|link| link.filename == **archive)
                .ok_or_else(|| PipelineError::ArchiveNotListed {
                    archive: archive.to_string(),
                    url: self.listing_url.to_string(),
                })?;
            zips::download_archive(&self.transport, &link.url, storage, archive)?;
        }
        Ok(missing.len())
    }

    /// Download every known archive the listing offers, replacing local
    /// copies. Returns how many were downloaded.
    pub fn download_all<S: Storage + ?Sized>(&self, storage: &S) -> Result<usize> {
        let links = self.listing().links()?;
        let mut downloaded = 0;
        for archive in &self.archives {
            if let Some(link) = links.iter().find(|link| link.filename == *archive) {
                zips::download_archive(&self.transport, &link.url, storage, archive)?;
                downloaded += 1;
            }
        }
        info!(downloaded, known = self.archives.len(), "download finished");
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::{cell::RefCell, collections::HashMap};

    /// Serves canned bodies and records every requested URL.
    #[derive(Default)]
    struct FakeTransport {
        bodies: HashMap<String, Vec<u8>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        fn with(mut self, url: &str, body: &[u8]) -> Self {
            self.bodies.insert(url.to_string(), body.to_vec());
            self
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &Url) -> Result<Vec<u8>> {
            self.calls.borrow_mut().push(url.to_string());
            self.bodies
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| PipelineError::fetch(url.as_str(), "404 Not Found"))
        }
    }

    const BASE: &str = "https://example.test/izv/";

    fn fetcher(transport: FakeTransport) -> Fetcher<FakeTransport> {
        Fetcher::new(
            transport,
            Url::parse(BASE).unwrap(),
            vec!["a.zip".to_string(), "b.zip".to_string()],
        )
    }

    fn serving_both() -> FakeTransport {
        FakeTransport::default()
            .with(
                BASE,
                br#"<a href="data/a.zip">a</a><a href="data/b.zip">b</a><a href="data/c.zip">c</a>"#,
            )
            .with("https://example.test/izv/data/a.zip", b"AAA")
            .with("https://example.test/izv/data/b.zip", b"BBB")
    }

    #[test]
    fn downloads_only_missing_archives() {
        let storage = MemoryStorage::new();
        storage.write("a.zip", b"local").unwrap();
        let fetcher = fetcher(serving_both());

        assert_eq!(fetcher.ensure(&storage).unwrap(), 1);
        assert_eq!(storage.read("a.zip").unwrap(), b"local");
        assert_eq!(storage.read("b.zip").unwrap(), b"BBB");
        // listing + one archive
        assert_eq!(fetcher.transport().call_count(), 2);
    }

    #[test]
    fn ensure_is_idempotent() {
        let storage = MemoryStorage::new();
        let fetcher = fetcher(serving_both());

        assert_eq!(fetcher.ensure(&storage).unwrap(), 2);
        let calls = fetcher.transport().call_count();
        assert_eq!(fetcher.ensure(&storage).unwrap(), 0);
        assert_eq!(fetcher.ensure(&storage).unwrap(), 0);
        assert_eq!(fetcher.transport().call_count(), calls);
    }

    #[test]
    fn unlisted_archive_is_an_error() {
        let storage = MemoryStorage::new();
        let transport = FakeTransport::default()
            .with(BASE, br#"<a href="data/a.zip">a</a>"#)
            .with("https://example.test/izv/data/a.zip", b"AAA");
        let err = fetcher(transport).ensure(&storage).unwrap_err();
        assert!(
            matches!(err, PipelineError::ArchiveNotListed { ref archive, .. } if archive == "b.zip"),
            "{err}"
        );
    }

    #[test]
    fn network_failure_propagates() {
        let storage = MemoryStorage::new();
        let err = fetcher(FakeTransport::default())
            .ensure(&storage)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn download_all_replaces_local_copies() {
        let storage = MemoryStorage::new();
        storage.write("a.zip", b"stale").unwrap();
        let fetcher = fetcher(serving_both());

        assert_eq!(fetcher.download_all(&storage).unwrap(), 2);
        assert_eq!(storage.read("a.zip").unwrap(), b"AAA");
        assert!(!storage.exists("c.zip"));
    }
}
