//! Playlist profile: per-artist counts, shares, and the genre mix.
//!
//! The profile is the only view of the playlist the rest of the engine sees.
//! It is built once per request and never mutated afterwards;
//! [`PlaylistProfile::with_genres`] consumes the profile and returns a new one.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::signature::track_signature;
use crate::catalog::RawPlaylistTrack;

/// Errors raised while profiling a playlist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("Playlist is empty - nothing to analyze")]
    EmptyPlaylist,
}

/// A playlist entry attributed to an artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrack {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub external_url: String,
    /// 0-based position in the source playlist
    pub order: usize,
}

/// One distinct artist of the playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSummary {
    /// Catalog artist ID; credits without one can't be expanded into candidates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub external_url: String,
    /// Playlist tracks crediting this artist
    pub count: u32,
    /// `100 * count / total_tracks`
    pub share: f64,
    /// In playlist order
    pub tracks: Vec<PlaylistTrack>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

/// Summary of a playlist's composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistProfile {
    pub total_tracks: usize,
    pub unique_artists: usize,
    /// Sorted by `count` descending, ties in first-seen order
    pub artists: Vec<ArtistSummary>,
    /// Genre -> weight in [0, 1]; empty when no genre data was attached
    pub genre_profile: BTreeMap<String, f64>,
    #[serde(skip)]
    track_ids: HashSet<String>,
    #[serde(skip)]
    signatures: HashSet<String>,
}

impl PlaylistProfile {
    /// Look up an artist by catalog ID.
    pub fn artist(&self, artist_id: &str) -> Option<&ArtistSummary> {
        self.artists
            .iter()
            .find(|a| a.id.as_deref() == Some(artist_id))
    }

    /// The first `n` artists in profile order.
    pub fn top_artists(&self, n: usize) -> &[ArtistSummary] {
        &self.artists[..n.min(self.artists.len())]
    }

    /// Highest per-artist count, 0 for an artist-less profile.
    pub fn max_count(&self) -> u32 {
        self.artists.first().map(|a| a.count).unwrap_or(0)
    }

    /// Whether a track ID is already in the playlist.
    pub fn contains_track_id(&self, track_id: &str) -> bool {
        self.track_ids.contains(track_id)
    }

    /// Whether a track signature is already in the playlist.
    pub fn contains_signature(&self, signature: &str) -> bool {
        self.signatures.contains(signature)
    }

    /// Attach per-artist genres and derive the genre profile.
    ///
    /// Each artist's genres are weighted by that artist's track count and the
    /// result is normalized to sum to 1. Artists the map doesn't mention
    /// contribute nothing; an empty map leaves the genre profile empty.
    pub fn with_genres(mut self, genres_by_artist: &HashMap<String, Vec<String>>) -> Self {
        let mut weights: BTreeMap<String, f64> = BTreeMap::new();

        for artist in &mut self.artists {
            let Some(genres) = artist.id.as_ref().and_then(|id| genres_by_artist.get(id)) else {
                continue;
            };

            let mut unique: Vec<String> = Vec::with_capacity(genres.len());
            for genre in genres {
                let genre = genre.trim().to_lowercase();
                if !genre.is_empty() && !unique.contains(&genre) {
                    unique.push(genre);
                }
            }

            for genre in &unique {
                *weights.entry(genre.clone()).or_insert(0.0) += f64::from(artist.count);
            }
            artist.genres = unique;
        }

        let total: f64 = weights.values().sum();
        if total > 0.0 {
            for weight in weights.values_mut() {
                *weight /= total;
            }
        } else {
            weights.clear();
        }

        self.genre_profile = weights;
        self
    }
}

/// Accumulator for one artist during the profiling pass
struct ArtistBucket {
    id: Option<String>,
    name: String,
    url: String,
    tracks: Vec<PlaylistTrack>,
}

/// Build the playlist profile from playlist entries in playlist order.
///
/// A track credited to several artists counts once for each of them, so the
/// per-artist counts can add up to more than `total_tracks`.
pub fn build_profile(tracks: &[RawPlaylistTrack]) -> Result<PlaylistProfile, ProfileError> {
    if tracks.is_empty() {
        return Err(ProfileError::EmptyPlaylist);
    }

    let mut buckets: Vec<ArtistBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut track_ids = HashSet::new();
    let mut signatures = HashSet::new();

    for (order, track) in tracks.iter().enumerate() {
        if let Some(ref id) = track.id {
            track_ids.insert(id.clone());
        }
        if let Some(signature) = track_signature(&track.name, &track.artists) {
            signatures.insert(signature);
        }

        let mut credited_here: HashSet<String> = HashSet::new();
        for credit in &track.artists {
            let name = credit.name.trim();
            if name.is_empty() {
                continue;
            }
            let key = match credit.id {
                Some(ref id) => format!("id:{id}"),
                None => format!("name:{}", name.to_lowercase()),
            };
            if !credited_here.insert(key.clone()) {
                continue;
            }

            let slot = *index.entry(key).or_insert_with(|| {
                buckets.push(ArtistBucket {
                    id: credit.id.clone(),
                    name: name.to_string(),
                    url: credit.url.clone(),
                    tracks: Vec::new(),
                });
                buckets.len() - 1
            });

            buckets[slot].tracks.push(PlaylistTrack {
                id: track.id.clone(),
                name: track.name.clone(),
                external_url: track.url.clone(),
                order,
            });
        }
    }

    let total_tracks = tracks.len();
    let mut artists: Vec<ArtistSummary> = buckets
        .into_iter()
        .map(|bucket| {
            let count = bucket.tracks.len() as u32;
            ArtistSummary {
                id: bucket.id,
                name: bucket.name,
                external_url: bucket.url,
                count,
                share: 100.0 * f64::from(count) / total_tracks as f64,
                tracks: bucket.tracks,
                genres: Vec::new(),
            }
        })
        .collect();

    // Stable: equal counts keep first-seen order
    artists.sort_by(|a, b| b.count.cmp(&a.count));

    tracing::debug!(
        target: "recommend::profile",
        total_tracks,
        unique_artists = artists.len(),
        "Built playlist profile"
    );

    Ok(PlaylistProfile {
        total_tracks,
        unique_artists: artists.len(),
        artists,
        genre_profile: BTreeMap::new(),
        track_ids,
        signatures,
    })
}
