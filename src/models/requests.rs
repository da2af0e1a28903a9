//! Request DTOs for the image service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::category::Category;

/// Upper bound on URLs accepted by one preload request.
pub const MAX_PRELOAD_URLS: usize = 100;

/// Request body for POST /resolve
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    /// Candidate image URLs, best first
    #[serde(default)]
    pub candidates: Vec<String>,
    /// Listing category used for fallbacks
    pub category: Category,
    /// Consult the blob cache before probing
    #[serde(default)]
    pub use_cache: bool,
}

/// Query string for GET /image and GET /image/peek
#[derive(Debug, Clone, Deserialize)]
pub struct ImageQuery {
    pub url: String,
}

impl ImageQuery {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_url(&self.url)
    }
}

/// Request body for POST /preload
#[derive(Debug, Clone, Deserialize)]
pub struct PreloadRequest {
    pub urls: Vec<String>,
}

impl PreloadRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.urls.len() > MAX_PRELOAD_URLS {
            return Some(format!(
                "At most {} URLs can be preloaded at once",
                MAX_PRELOAD_URLS
            ));
        }
        self.urls.iter().find_map(|url| validate_url(url))
    }
}

fn validate_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return Some("URL cannot be empty".to_string());
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Some(format!("URL must be http(s): {}", url));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_request_deserialize() {
        let json = r#"{"candidates": ["https://a.example/1.jpg"], "category": "thermal_baths"}"#;
        let req: ResolveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.candidates.len(), 1);
        assert_eq!(req.category, Category::ThermalBaths);
        assert!(!req.use_cache);
    }

    #[test]
    fn test_resolve_request_without_candidates() {
        let req: ResolveRequest = serde_json::from_str(r#"{"category": "lodging"}"#).unwrap();
        assert!(req.candidates.is_empty());
    }

    #[test]
    fn test_resolve_request_unknown_category() {
        let result = serde_json::from_str::<ResolveRequest>(r#"{"category": "museums"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_image_query_validation() {
        let ok = ImageQuery { url: "https://a.example/1.jpg".to_string() };
        let empty = ImageQuery { url: " ".to_string() };
        let ftp = ImageQuery { url: "ftp://a.example/1.jpg".to_string() };

        assert!(ok.validate().is_none());
        assert!(empty.validate().is_some());
        assert!(ftp.validate().is_some());
    }

    #[test]
    fn test_preload_validation() {
        let too_many = PreloadRequest {
            urls: vec!["https://a.example/1.jpg".to_string(); MAX_PRELOAD_URLS + 1],
        };
        assert!(too_many.validate().is_some());

        let bad = PreloadRequest {
            urls: vec!["https://a.example/1.jpg".to_string(), "".to_string()],
        };
        assert!(bad.validate().is_some());

        let empty = PreloadRequest { urls: vec![] };
        assert!(empty.validate().is_none());
    }
}
