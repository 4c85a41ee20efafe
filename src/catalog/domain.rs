//! Internal domain models for catalog data.
//!
//! These types are OUR types - they don't change when the catalog API changes.
//! Every catalog response gets converted into these types via an adapter.

use serde::{Deserialize, Serialize};

/// An artist credited on a track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCredit {
    /// Catalog artist ID (absent for some local or unmatched credits)
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Link to the artist page (empty when unknown)
    pub url: String,
}

impl ArtistCredit {
    /// Create a credit with an ID.
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One entry of a playlist as delivered by the catalog, in playlist order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlaylistTrack {
    /// Catalog track ID (absent for local files)
    pub id: Option<String>,
    /// Track title
    pub name: String,
    /// Link to the track page (empty when unknown)
    pub url: String,
    /// Credited artists, primary artist first
    pub artists: Vec<ArtistCredit>,
}

/// A track from an artist's top-tracks listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopTrack {
    /// Catalog track ID
    pub id: Option<String>,
    /// Track title
    pub name: String,
    /// Link to the track page
    pub url: String,
    /// Credited artists, primary artist first
    pub artists: Vec<ArtistCredit>,
    /// Normalized popularity in [0, 1]
    pub popularity: f64,
    /// Genre tags of the track's artist, when the provider supplies them
    pub genres: Vec<String>,
}

/// Errors that can occur while talking to the catalog
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not a playlist URL, URI or ID: {0}")]
    InvalidPlaylistRef(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}
