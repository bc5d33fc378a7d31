// src/fetch/urls.rs
use scraper::{Html, Selector};
use url::Url;

use super::client::Transport;
use crate::error::{PipelineError, Result};

/// A downloadable file offered by the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLink {
    /// Last path segment of `url`.
    pub filename: String,
    pub url: Url,
}

/// Source of `(filename, url)` pairs for the archives.
pub trait ArchiveListing {
    fn links(&self) -> Result<Vec<ArchiveLink>>;
}

/// Scrapes `<a href>` anchors from an HTML index page.
pub struct HtmlListing<T> {
    transport: T,
    base: Url,
}

impl<T: Transport> HtmlListing<T> {
    pub fn new(transport: T, base: Url) -> Self {
        Self { transport, base }
    }
}

impl<T: Transport> ArchiveListing for HtmlListing<T> {
    fn links(&self) -> Result<Vec<ArchiveLink>> {
        let body = self.transport.get(&self.base)?;
        let html = String::from_utf8_lossy(&body);
        extract_links(&self.base, &html)
    }
}

/// Every anchor in `html`, resolved against `base`. Anchors whose target
/// has no file name (directories, fragments) are skipped.
pub fn extract_links(base: &Url, html: &str) -> Result<Vec<ArchiveLink>> {
    let selector = Selector::parse("a[href]")
        .map_err(|e| PipelineError::fetch(base.as_str(), format!("anchor selector: {:?}", e)))?;

    Ok(Html::parse_document(html)
        .select(&selector)
        .filter_map(|elem| elem.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter_map(|url| {
            let filename = url.path_segments()?.last()?.to_string();
            if filename.is_empty() {
                return None;
            }
            Some(ArchiveLink { filename, url })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <a href="?C=N;O=D">Name</a>
        <a href="/">Parent Directory</a>
        <a href="data/datagis2016.zip">datagis2016.zip</a> <a href="data/datagis2016.zip">(mirror)</a>
        <a href="data/datagis-rok-2017.zip">2017</a>
        <a href="https://elsewhere.example/other.pdf">pdf</a>
        <a>no href</a>
    </body></html>"#;

    #[test]
    fn resolves_relative_links() {
        let base = Url::parse("https://ehw.fit.vutbr.cz/izv/").unwrap();
        let links = extract_links(&base, PAGE).unwrap();
        let names: Vec<&str> = links.iter().map(|l| l.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "datagis2016.zip",
                "datagis2016.zip",
                "datagis-rok-2017.zip",
                "other.pdf"
            ]
        );
        assert_eq!(
            links[2].url.as_str(),
            "https://ehw.fit.vutbr.cz/izv/data/datagis-rok-2017.zip"
        );
    }
}
