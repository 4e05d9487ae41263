//! Boundary to the cloud media backend. Upload transport lives outside
//! this service: clients upload to the media CDN directly and submit the
//! resulting URLs. This module validates those references before they
//! are persisted; the URL itself is the content reference the gallery
//! diff compares.

use crate::error::{AppError, AppResult};

const ALLOWED_SCHEMES: [&str; 2] = ["https://", "http://"];

/// Reject references the media backend would not have produced. Field
/// name propagates so a multi-image payload reports which entry failed.
pub fn validate_image_url(field: &str, url: &str) -> AppResult<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Storage(format!("{field}: empty image reference")));
    }
    if !ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(AppError::Storage(format!(
            "{field}: image reference must be an http(s) URL"
        )));
    }
    let rest = ALLOWED_SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .unwrap_or_default();
    if rest.split('/').next().unwrap_or_default().is_empty() {
        return Err(AppError::Storage(format!(
            "{field}: image reference has no host"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_urls() {
        assert!(validate_image_url("gallery[0]", "https://cdn.example.com/img/abc123.webp").is_ok());
    }

    #[test]
    fn rejects_empty_and_schemeless() {
        assert!(validate_image_url("cover_image", "").is_err());
        assert!(validate_image_url("cover_image", "abc123.webp").is_err());
        assert!(validate_image_url("cover_image", "ftp://cdn/x.png").is_err());
        assert!(validate_image_url("cover_image", "https:///no-host.png").is_err());
    }
}
