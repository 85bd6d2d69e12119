//! Reading the run's inputs: stylesheet text, page list, source map.

use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned non-text content ({content_type})")]
    NotText { url: String, content_type: String },
}

/// Where the stylesheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetLocation {
    Remote(Url),
    Local(String),
}

impl StylesheetLocation {
    /// `http://` and `https://` URLs are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::Local(location.to_string()),
        }
    }
}

pub async fn load_stylesheet(location: &str) -> Result<String, SourceError> {
    match StylesheetLocation::parse(location) {
        StylesheetLocation::Remote(url) => fetch_text(url).await,
        StylesheetLocation::Local(path) => read_text(Path::new(&path)).await,
    }
}

async fn fetch_text(url: Url) -> Result<String, SourceError> {
    tracing::info!("Fetching stylesheet: {}", url);
    let http_err = |source| SourceError::Http {
        url: url.to_string(),
        source,
    };
    let response = reqwest::get(url.clone())
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http_err)?;

    if let Some(content_type) = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        && !is_text_content(content_type)
    {
        return Err(SourceError::NotText {
            url: url.to_string(),
            content_type: content_type.to_string(),
        });
    }

    response.text().await.map_err(http_err)
}

fn is_text_content(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/octet-stream"
}

async fn read_text(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Page URLs from a newline-delimited list. Blank lines and `#` comments
/// are skipped.
pub fn parse_links(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub async fn load_links(path: &Path) -> Result<Vec<String>, SourceError> {
    let content = read_text(path).await?;
    Ok(parse_links(&content))
}

pub async fn load_source_map(path: &Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path).await.map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}
