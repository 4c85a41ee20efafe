//! Spotify Web API Data Transfer Objects
//!
//! These types match EXACTLY what the Web API returns for the endpoints we use.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api
//!
//! Endpoints:
//! - `POST /api/token` (client credentials)
//! - `GET /v1/playlists/{id}/tracks`
//! - `GET /v1/artists/{id}/top-tracks`
//! - `GET /v1/artists?ids=...`

use serde::{Deserialize, Serialize};

/// Client-credentials token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Accounts service error body (`{"error": "...", "error_description": "..."}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthError {
    pub error: String,
    pub error_description: Option<String>,
}

/// Web API error body (`{"error": {"status": 404, "message": "..."}}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}

/// One page of playlist items
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistTracksPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    /// Only present when requested through the `fields` filter
    pub total: Option<u32>,
}

/// Playlist item wrapper
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistItem {
    /// Null for removed or unavailable tracks
    pub track: Option<Track>,
}

/// Track object (simplified to the fields we request)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub is_local: bool,
    /// 0-100, absent from playlist field filters
    pub popularity: Option<u32>,
}

/// Artist object (simplified or full)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    /// Only present on full artist objects
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// `GET /v1/artists/{id}/top-tracks`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// `GET /v1/artists?ids=...` - unknown IDs come back as null
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistsResponse {
    #[serde(default)]
    pub artists: Vec<Option<Artist>>,
}
