//! Listing Categories
//!
//! Every listing belongs to one category. A category owns an embedded
//! placeholder image and an ordered list of local fallback assets.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Directory on the asset server holding per-category fallback images.
pub const FALLBACK_ASSET_ROOT: &str = "/assets/fallback";

/// Number of local fallback images deployed per category.
pub const FALLBACKS_PER_CATEGORY: usize = 3;

// == Category ==
/// Closed set of listing categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Commerce,
    Gastronomy,
    Lodging,
    Services,
    Events,
    PublicSpaces,
    ThermalBaths,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Commerce,
        Category::Gastronomy,
        Category::Lodging,
        Category::Services,
        Category::Events,
        Category::PublicSpaces,
        Category::ThermalBaths,
    ];

    /// Wire name, also used as the asset directory name.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Commerce => "commerce",
            Category::Gastronomy => "gastronomy",
            Category::Lodging => "lodging",
            Category::Services => "services",
            Category::Events => "events",
            Category::PublicSpaces => "public_spaces",
            Category::ThermalBaths => "thermal_baths",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::Commerce => "Comercio",
            Category::Gastronomy => "Gastronomía",
            Category::Lodging => "Hospedaje",
            Category::Services => "Servicios",
            Category::Events => "Eventos",
            Category::PublicSpaces => "Espacios públicos",
            Category::ThermalBaths => "Termas",
        }
    }

    fn tint(self) -> &'static str {
        match self {
            Category::Commerce => "#2f6fb5",
            Category::Gastronomy => "#c0572b",
            Category::Lodging => "#6a4fa3",
            Category::Services => "#3c8d5a",
            Category::Events => "#b83b6b",
            Category::PublicSpaces => "#5b8a2e",
            Category::ThermalBaths => "#1f8a99",
        }
    }

    // == Placeholder ==
    /// Returns the embedded placeholder as a `data:` URI.
    ///
    /// The image is an inline SVG, so it renders with no network access.
    /// The output is deterministic for a given category.
    pub fn placeholder(self) -> String {
        let svg = format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300">"#,
                r#"<rect width="400" height="300" fill="{tint}"/>"#,
                r##"<text x="200" y="160" font-family="sans-serif" font-size="28" fill="#ffffff" text-anchor="middle">{label}</text>"##,
                "</svg>"
            ),
            tint = self.tint(),
            label = self.label(),
        );

        format!(
            "data:image/svg+xml;base64,{}",
            general_purpose::STANDARD.encode(svg.as_bytes())
        )
    }

    // == Local Fallbacks ==
    /// Ordered local asset paths tried after every remote candidate fails.
    pub fn local_fallbacks(self) -> Vec<String> {
        (1..=FALLBACKS_PER_CATEGORY)
            .map(|n| format!("{}/{}/{}.jpg", FALLBACK_ASSET_ROOT, self.as_str(), n))
            .collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
