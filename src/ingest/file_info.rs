//! Derives name and content type of a remote file before URL ingestion.

use log::warn;
use reqwest::Url;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::http::HttpClient;
use crate::models::FileInfo;

pub const HEAD_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Probes `url` with a HEAD request. Never fails: missing or unreachable
/// metadata falls back to values derived from the URL itself.
pub async fn resolve(http: &HttpClient, url: &str) -> FileInfo {
    match http.head(url, HEAD_TIMEOUT).await {
        Ok(headers) => from_headers(url, &headers),
        Err(e) => {
            warn!("HEAD {} failed ({}), deriving file info from URL", url, e);
            FileInfo {
                name: name_from_url(url),
                url: url.to_string(),
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
            }
        }
    }
}

pub fn from_headers(url: &str, headers: &HeaderMap) -> FileInfo {
    let name = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_content_disposition)
        .unwrap_or_else(|| name_from_url(url));

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    FileInfo {
        name,
        url: url.to_string(),
        content_type: content_type.to_string(),
    }
}

/// Extracts the file name from a Content-Disposition value. `filename*=`
/// wins over `filename=` when both are present.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let raw = if let Some(rest) = parameter(value, "filename*=") {
        // RFC 5987: charset'language'percent-encoded
        let encoded = rest.splitn(3, '\'').nth(2).unwrap_or(rest);
        percent_decode(until_delimiter(encoded.trim_start_matches(['"', '\''])))
    } else {
        let rest = parameter(value, "filename=")?;
        until_delimiter(rest.trim_start_matches(['"', '\''])).to_string()
    };

    let name = raw.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn parameter<'a>(value: &'a str, key: &str) -> Option<&'a str> {
    let start = value.find(key)? + key.len();
    Some(value[start..].trim_start())
}

fn until_delimiter(s: &str) -> &str {
    let end = s.find(['"', '\'', ';', '\r', '\n']).unwrap_or(s.len());
    &s[..end]
}

/// Last non-empty path segment, percent-decoded, or `file_<n>`.
pub fn name_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()
                .map(percent_decode)
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            let mut hasher = DefaultHasher::new();
            url.hash(&mut hasher);
            format!("file_{}", hasher.finish() % 10000)
        })
}

fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}
