//! Per-candidate signals.
//!
//! Every signal is a pure function of data already gathered; nothing here
//! does I/O. Each lands in `[0, 1]` except the balance penalty, which is a
//! multiplicative dampener in `[0.5, 1]`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::candidates::CandidateTrack;
use super::profile::PlaylistProfile;

/// The largest share of the score the balance penalty can remove
pub const MAX_BALANCE_PENALTY: f64 = 0.5;

/// Signals computed for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    pub artist_score: f64,
    /// Playlist tracks by the candidate's source artist (display only)
    pub artist_count: u32,
    /// Source artist's playlist share in percent (display only)
    pub artist_share: f64,
    pub rank_score: f64,
    pub genre_score: f64,
    pub popularity_score: f64,
    pub balance_penalty: f64,
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// How prevalent an artist is relative to the playlist's most prevalent one.
pub fn artist_score(count: u32, max_count: u32) -> f64 {
    if max_count == 0 {
        return 0.0;
    }
    unit(f64::from(count) / f64::from(max_count))
}

/// `1 - rank / limit`: the artist's top track scores 1.0, the tenth of ten 0.1.
pub fn rank_score(track_rank: usize, limit: usize) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    unit(1.0 - track_rank as f64 / limit as f64)
}

pub fn popularity_score(popularity: f64) -> f64 {
    unit(popularity)
}

/// Sum of the playlist's genre weights over the candidate's genres.
///
/// Zero when the playlist has no genre profile or the candidate no genres.
pub fn genre_score<'a>(
    genres: impl IntoIterator<Item = &'a String>,
    genre_profile: &BTreeMap<String, f64>,
) -> f64 {
    if genre_profile.is_empty() {
        return 0.0;
    }
    let overlap: f64 = genres
        .into_iter()
        .filter_map(|g| genre_profile.get(g))
        .sum();
    unit(overlap)
}

/// `1 - min(0.5, share / 100)` for a share given in percent.
pub fn balance_penalty(artist_share: f64) -> f64 {
    if artist_share.is_nan() {
        return 1.0;
    }
    1.0 - (artist_share.max(0.0) / 100.0).min(MAX_BALANCE_PENALTY)
}

/// Compute all signals for a candidate.
///
/// The source artist is looked up in the profile by ID. An artist the
/// profile doesn't know scores as if it had no playlist tracks.
pub fn compute_signals(
    candidate: &CandidateTrack,
    profile: &PlaylistProfile,
    top_tracks_limit: usize,
) -> Signals {
    let (artist_count, artist_share) = profile
        .artist(&candidate.artist_id)
        .map(|a| (a.count, a.share))
        .unwrap_or((0, 0.0));

    Signals {
        artist_score: artist_score(artist_count, profile.max_count()),
        artist_count,
        artist_share,
        rank_score: rank_score(candidate.track_rank_in_artist_top, top_tracks_limit),
        genre_score: genre_score(&candidate.artist_genres, &profile.genre_profile),
        popularity_score: popularity_score(candidate.popularity),
        balance_penalty: balance_penalty(artist_share),
    }
}
