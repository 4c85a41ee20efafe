//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use std::collections::HashMap;

use super::dto;
use crate::catalog::domain::{ArtistCredit, RawPlaylistTrack, TopTrack};

/// Convert a playlist page into playlist entries.
///
/// Null tracks and local files are dropped; they carry no catalog identity.
pub fn to_playlist_tracks(page: dto::PlaylistTracksPage) -> Vec<RawPlaylistTrack> {
    page.items
        .into_iter()
        .filter_map(|item| item.track)
        .filter(|track| !track.is_local)
        .map(|track| RawPlaylistTrack {
            id: non_empty(track.id),
            name: track.name.unwrap_or_else(|| "Unknown track".to_string()),
            url: spotify_url(track.external_urls.as_ref()),
            artists: to_credits(&track.artists),
        })
        .collect()
}

/// Convert a top-tracks response, keeping the catalog's ordering.
pub fn to_top_tracks(response: dto::TopTracksResponse) -> Vec<TopTrack> {
    response
        .tracks
        .into_iter()
        .map(|track| TopTrack {
            id: non_empty(track.id),
            name: track.name.unwrap_or_else(|| "Unknown track".to_string()),
            url: spotify_url(track.external_urls.as_ref()),
            artists: to_credits(&track.artists),
            popularity: normalize_popularity(track.popularity.unwrap_or(0)),
            genres: Vec::new(),
        })
        .collect()
}

/// Convert a several-artists response to `artist_id -> genres`.
pub fn to_genres(response: dto::ArtistsResponse) -> HashMap<String, Vec<String>> {
    response
        .artists
        .into_iter()
        .flatten()
        .filter_map(|artist| {
            let id = non_empty(artist.id)?;
            let genres = artist
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|g| g.to_lowercase())
                .collect();
            Some((id, genres))
        })
        .collect()
}

/// Popularity arrives as 0-100.
fn normalize_popularity(raw: u32) -> f64 {
    (f64::from(raw) / 100.0).clamp(0.0, 1.0)
}

/// Credits without a name are dropped, like the catalog UI does.
fn to_credits(artists: &[dto::Artist]) -> Vec<ArtistCredit> {
    artists
        .iter()
        .filter_map(|artist| {
            let name = artist.name.clone().filter(|n| !n.is_empty())?;
            Some(ArtistCredit {
                id: non_empty(artist.id.clone()),
                name,
                url: spotify_url(artist.external_urls.as_ref()),
            })
        })
        .collect()
}

fn spotify_url(urls: Option<&dto::ExternalUrls>) -> String {
    urls.and_then(|u| u.spotify.clone()).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
