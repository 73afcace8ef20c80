//! Museum and artwork domain types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Museum entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Museum {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub price: String,
    #[serde(default, rename = "imageurl")]
    pub image_url: String,
    /// Id of the museum this one belongs to, for sub-collections
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Artwork entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artwork {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "imageurl")]
    pub image_url: String,
    /// Owning museum id
    #[serde(default)]
    pub museum: String,
    #[serde(default)]
    pub is_exposed: Option<bool>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl Artwork {
    /// Artworks without an exposure flag are assumed to be on display.
    pub fn is_on_display(&self) -> bool {
        self.is_exposed.unwrap_or(true)
    }
}
