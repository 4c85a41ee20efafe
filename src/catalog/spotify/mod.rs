//! Spotify Web API integration
//!
//! Supplies playlist contents, artist top tracks, and artist genres.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

use once_cell::sync::Lazy;
use regex::Regex;

pub use client::{SpotifyClient, SpotifyConfig};

use crate::catalog::domain::CatalogError;

static PLAYLIST_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"open\.spotify\.com/(?:intl-[a-z]{2}/)?playlist/([A-Za-z0-9]+)")
        .expect("playlist url regex")
});

static PLAYLIST_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^spotify:playlist:([A-Za-z0-9]+)$").expect("playlist uri regex"));

static BARE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("playlist id regex"));

/// Extract a playlist ID from a share URL, a `spotify:playlist:` URI, or a bare ID.
pub fn parse_playlist_ref(raw: &str) -> Result<String, CatalogError> {
    let raw = raw.trim();

    if let Some(caps) = PLAYLIST_URL_RE.captures(raw) {
        return Ok(caps[1].to_string());
    }

    if let Some(caps) = PLAYLIST_URI_RE.captures(raw) {
        return Ok(caps[1].to_string());
    }

    if BARE_ID_RE.is_match(raw) {
        return Ok(raw.to_string());
    }

    Err(CatalogError::InvalidPlaylistRef(raw.to_string()))
}
