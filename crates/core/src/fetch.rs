//! Page acquisition from URLs, files, and stdin.
//!
//! The pipeline itself only ever sees an HTML string; these helpers cover
//! the three ways callers get one. Only URL fetching is async.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{ClaritasError, Result};

/// HTTP client configuration for fetching pages to simplify.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Maximum accepted response size in bytes; larger pages are refused
    /// rather than scored.
    pub max_page_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Claritas/1.0; +https://github.com/stormlightlabs/claritas)"
                .to_string(),
            max_page_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Fetches the HTML of a page over HTTP(S).
///
/// Follows redirects, sends a browser-like Accept header, and maps
/// timeouts onto [`ClaritasError::Timeout`].
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ClaritasError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClaritasError::InvalidUrl(format!(
            "unsupported scheme: {}",
            parsed.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(ClaritasError::HttpError)?;

    let response = client
        .get(parsed)
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ClaritasError::Timeout { timeout: config.timeout }
            } else {
                ClaritasError::HttpError(e)
            }
        })?;

    let content = response.text().await?;
    if content.len() > config.max_page_bytes {
        return Err(ClaritasError::InvalidUrl(format!(
            "page exceeds {} byte limit",
            config.max_page_bytes
        )));
    }

    Ok(content)
}

/// Reads HTML from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(ClaritasError::FileNotFound(path));
    }
    fs::read_to_string(&path).map_err(ClaritasError::from)
}

/// Reads HTML from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
