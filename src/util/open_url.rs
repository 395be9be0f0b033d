use thiserror::Error;
use url::Url;

/// Errors that can occur when checking a post URL before opening it.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Post has no URL")]
    Empty,
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validates a post URL before it is handed to the desktop opener.
///
/// The opener dispatches on scheme, so anything but http(s) could launch an
/// arbitrary handler (`file://`, `javascript:`, custom URI schemes).
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }
    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}
