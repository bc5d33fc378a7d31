use std::time::Instant;
use tracing::info;
use url::Url;

use super::client::Transport;
use crate::error::Result;
use crate::storage::Storage;

/// Download `url` and store the bytes verbatim under `filename`.
/// Returns the number of bytes written.
pub fn download_archive<T, S>(
    transport: &T,
    url: &Url,
    storage: &S,
    filename: &str,
) -> Result<usize>
where
    T: Transport + ?Sized,
    S: Storage + ?Sized,
{
    info!(archive = filename, url = %url, "downloading");
    let start = Instant::now();
    let bytes = transport.get(url)?;
    storage.write(filename, &bytes)?;
    info!(archive = filename, bytes = bytes.len(), elapsed = ?start.elapsed(), "downloaded");
    Ok(bytes.len())
}
