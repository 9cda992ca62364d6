use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Error};
use reqwest::blocking::{Client, ClientBuilder};
use thiserror::Error;

/// Test archives may be big.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// A resource that cannot be obtained from a judge.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Cannot download {url}: HTTP {status}")]
    Lookup { url: String, status: u16 },
}

fn http_client() -> Result<Client, Error> {
    ClientBuilder::new()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to build the HTTP client")
}

/// Download `url` streaming it into `path`. Returns the number of bytes written.
pub fn download_file_to(url: &str, path: &Path) -> Result<u64, Error> {
    info!("Downloading {} to {}", url, path.display());
    let mut response = http_client()?
        .get(url)
        .send()
        .with_context(|| format!("Failed to download {}", url))?;
    if !response.status().is_success() {
        return Err(DownloadError::Lookup {
            url: url.to_string(),
            status: response.status().as_u16(),
        }
        .into());
    }
    if let Some(size) = response.content_length() {
        debug!("{} is {} bytes", url, size);
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let size = response
        .copy_to(&mut file)
        .with_context(|| format!("Failed to download {}", url))?;
    info!("Downloaded {} bytes into {}", size, path.display());
    Ok(size)
}

/// Download the text of a web page.
pub fn download_web_page(url: &str) -> Result<String, Error> {
    debug!("GET {}", url);
    let response = http_client()?
        .get(url)
        .send()
        .with_context(|| format!("Failed to download {}", url))?;
    if !response.status().is_success() {
        return Err(DownloadError::Lookup {
            url: url.to_string(),
            status: response.status().as_u16(),
        }
        .into());
    }
    response
        .text()
        .with_context(|| format!("Failed to read {}", url))
}
