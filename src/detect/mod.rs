/// Remote detection service
///
/// This module handles:
/// - Uploading the selected image as multipart (client.rs)
/// - Validating verdict and error bodies (response.rs)
/// - Resolving heatmap paths against the service origin

pub mod client;
pub mod response;

pub use client::AnalysisClient;

/// Multipart field the endpoint reads the image from
pub const FILE_FIELD: &str = "file";

/// Resolve a heatmap path returned by the service into a full URL
///
/// Absolute `http(s)` URLs pass through untouched; anything else is
/// joined onto `base_url` with exactly one slash between them.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
