//! Candidate pool assembly.
//!
//! For each of the playlist's top artists, fetch that artist's top tracks and
//! keep the ones the playlist doesn't already contain. Fetches run with
//! bounded concurrency and complete in any order; ranks always come from the
//! requested artist order, never from arrival order.
//!
//! A failing artist is logged, recorded in [`CandidatePool::failures`], and
//! skipped. The pool is only [`complete`](CandidatePool::is_complete) when
//! every requested artist answered.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use futures::{StreamExt, stream};
use serde::Serialize;

use super::profile::{ArtistSummary, PlaylistProfile};
use super::signature::track_signature;
use crate::catalog::{CatalogApi, CatalogError, TopTrack};

/// Default number of playlist artists expanded into candidates
pub const MAX_TOP_ARTISTS: usize = 20;

/// Default number of top tracks requested per artist
pub const TOP_TRACKS_PER_ARTIST: usize = 10;

/// Knobs for [`assemble_candidates`]
#[derive(Debug, Clone, PartialEq)]
pub struct AssembleOptions {
    /// How many playlist artists to expand
    pub max_top_artists: usize,
    /// How many top tracks to request per artist
    pub top_tracks_per_artist: usize,
    /// Upper bound on in-flight catalog requests
    pub max_concurrent_fetches: usize,
    /// Per-artist deadline; a late artist counts as failed
    pub fetch_timeout: Option<Duration>,
    /// Only expand artists with at most this many playlist tracks
    pub max_artist_count: Option<u32>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            max_top_artists: MAX_TOP_ARTISTS,
            top_tracks_per_artist: TOP_TRACKS_PER_ARTIST,
            max_concurrent_fetches: 8,
            fetch_timeout: None,
            max_artist_count: None,
        }
    }
}

/// A track proposed as a recommendation, with its artist-level context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTrack {
    pub id: String,
    pub name: String,
    pub external_url: String,
    /// The playlist artist this candidate was sourced from
    pub artist_id: String,
    pub artist_name: String,
    pub artist_url: String,
    /// Position of the source artist among the expanded artists (0-based)
    pub source_artist_rank_in_playlist: usize,
    /// Position among the source artist's top tracks (0-based)
    pub track_rank_in_artist_top: usize,
    /// Normalized popularity in [0, 1]
    pub popularity: f64,
    pub artist_genres: BTreeSet<String>,
}

/// An artist whose top tracks could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistFetchFailure {
    pub artist_id: String,
    pub artist_name: String,
    pub reason: String,
    #[serde(skip)]
    pub error: CatalogError,
}

/// Deduplicated candidates plus a record of how the fetches went.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePool {
    pub candidates: Vec<CandidateTrack>,
    /// Artists whose top tracks were requested
    pub artists_requested: usize,
    /// Artists that answered, even with an empty list
    pub artists_succeeded: usize,
    pub failures: Vec<ArtistFetchFailure>,
}

impl CandidatePool {
    /// True when every requested artist answered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// The artists that will be expanded, in rank order.
///
/// Artists without a catalog ID can't be looked up and are passed over.
pub fn expansion_targets<'a>(
    profile: &'a PlaylistProfile,
    options: &AssembleOptions,
) -> Vec<&'a ArtistSummary> {
    profile
        .artists
        .iter()
        .filter(|a| a.id.is_some())
        .filter(|a| options.max_artist_count.is_none_or(|max| a.count <= max))
        .take(options.max_top_artists)
        .collect()
}

/// Gather candidates from the top artists' top tracks.
///
/// Dropping the returned future abandons every in-flight fetch; nothing is
/// merged until all fetches have been joined.
pub async fn assemble_candidates<C>(
    profile: &PlaylistProfile,
    catalog: &C,
    options: &AssembleOptions,
) -> CandidatePool
where
    C: CatalogApi + ?Sized,
{
    let targets = expansion_targets(profile, options);
    if targets.is_empty() {
        tracing::info!(target: "recommend::candidates", "No artists eligible for expansion");
        return CandidatePool::default();
    }

    let limit = options.top_tracks_per_artist;
    let concurrency = options.max_concurrent_fetches.clamp(1, targets.len());

    let mut fetched: Vec<(usize, Result<Vec<TopTrack>, CatalogError>)> =
        stream::iter(targets.iter().enumerate())
            .map(|(rank, artist)| async move {
                let artist_id = artist.id.as_deref().unwrap_or_default();
                let result = fetch_top_tracks(catalog, artist_id, limit, options.fetch_timeout).await;
                (rank, result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
    fetched.sort_by_key(|(rank, _)| *rank);

    let mut pool = CandidatePool {
        artists_requested: targets.len(),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();

    for (rank, result) in fetched {
        let artist = targets[rank];
        let artist_id = artist.id.clone().unwrap_or_default();

        let tracks = match result {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!(
                    target: "recommend::candidates",
                    artist_id = %artist_id,
                    artist = %artist.name,
                    error = %e,
                    "Top tracks lookup failed, skipping artist"
                );
                pool.failures.push(ArtistFetchFailure {
                    artist_id,
                    artist_name: artist.name.clone(),
                    reason: e.to_string(),
                    error: e,
                });
                continue;
            }
        };

        pool.artists_succeeded += 1;
        if tracks.is_empty() {
            tracing::debug!(target: "recommend::candidates", artist_id = %artist_id, "No top tracks");
        }

        for (track_rank, track) in tracks.into_iter().take(limit).enumerate() {
            let Some(id) = track.id.clone() else {
                continue;
            };
            if profile.contains_track_id(&id) || seen.contains(&id) {
                continue;
            }
            if track_signature(&track.name, &track.artists)
                .is_some_and(|sig| profile.contains_signature(&sig))
            {
                tracing::trace!(target: "recommend::candidates", track = %track.name, "Skipping version of a playlist track");
                continue;
            }

            seen.insert(id.clone());
            pool.candidates
                .push(to_candidate(id, track, artist, rank, track_rank));
        }
    }

    if pool.failures.len() == pool.artists_requested {
        tracing::warn!(
            target: "recommend::candidates",
            artists = pool.artists_requested,
            "Every top tracks lookup failed, candidate pool is empty"
        );
    } else {
        tracing::info!(
            target: "recommend::candidates",
            candidates = pool.candidates.len(),
            requested = pool.artists_requested,
            failed = pool.failures.len(),
            "Assembled candidate pool"
        );
    }

    pool
}

async fn fetch_top_tracks<C>(
    catalog: &C,
    artist_id: &str,
    limit: usize,
    deadline: Option<Duration>,
) -> Result<Vec<TopTrack>, CatalogError>
where
    C: CatalogApi + ?Sized,
{
    match deadline {
        Some(deadline) => tokio::time::timeout(deadline, catalog.artist_top_tracks(artist_id, limit))
            .await
            .map_err(|_| CatalogError::Timeout(deadline.as_millis() as u64))?,
        None => catalog.artist_top_tracks(artist_id, limit).await,
    }
}

fn to_candidate(
    id: String,
    track: TopTrack,
    source: &ArtistSummary,
    rank: usize,
    track_rank: usize,
) -> CandidateTrack {
    let (artist_name, artist_url) = match track.artists.first() {
        Some(credit) => (credit.name.clone(), credit.url.clone()),
        None => (source.name.clone(), source.external_url.clone()),
    };

    let genres = if track.genres.is_empty() {
        &source.genres
    } else {
        &track.genres
    };

    let popularity = if track.popularity.is_finite() {
        track.popularity.clamp(0.0, 1.0)
    } else {
        0.0
    };

    CandidateTrack {
        id,
        name: track.name,
        external_url: track.url,
        artist_id: source.id.clone().unwrap_or_default(),
        artist_name,
        artist_url,
        source_artist_rank_in_playlist: rank,
        track_rank_in_artist_top: track_rank,
        popularity,
        artist_genres: genres.iter().map(|g| g.to_lowercase()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::catalog::traits::mocks::{MockCatalog, playlist_track, top_track};
    use crate::recommend::profile::build_profile;
    use crate::recommend::profile::fixtures::profile_with_counts;

    #[tokio::test]
    async fn test_ranks_follow_profile_and_top_track_order() {
        let profile = profile_with_counts(&[("a", 3), ("b", 1)]);
        let catalog = MockCatalog::default()
            .top("a", vec![top_track("x1", "X1", "a", "A", 0.9), top_track("x2", "X2", "a", "A", 0.8)])
            .top("b", vec![top_track("y1", "Y1", "b", "B", 0.7)]);

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        let ranks: Vec<_> = pool
            .candidates
            .iter()
            .map(|c| (c.id.as_str(), c.source_artist_rank_in_playlist, c.track_rank_in_artist_top))
            .collect();
        assert_eq!(ranks, vec![("x1", 0, 0), ("x2", 0, 1), ("y1", 1, 0)]);
        assert!(pool.is_complete());
        assert_eq!(pool.artists_requested, 2);
        assert_eq!(pool.artists_succeeded, 2);
    }

    #[tokio::test]
    async fn test_ranks_ignore_completion_order() {
        let profile = profile_with_counts(&[("a", 3), ("b", 2), ("c", 1)]);
        let catalog = MockCatalog::default()
            .top("a", vec![top_track("x1", "X1", "a", "A", 0.9)])
            .top("b", vec![top_track("y1", "Y1", "b", "B", 0.9)])
            .top("c", vec![top_track("z1", "Z1", "c", "C", 0.9)])
            .delayed("a", Duration::from_millis(60))
            .delayed("b", Duration::from_millis(30));

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        let ids: Vec<_> = pool.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["x1", "y1", "z1"]);
        assert_eq!(pool.candidates[2].source_artist_rank_in_playlist, 2);
    }

    #[tokio::test]
    async fn test_playlist_tracks_never_become_candidates() {
        let playlist = vec![
            playlist_track("p1", "Already Here", "a", "A"),
            playlist_track("p2", "Other", "a", "A"),
        ];
        let profile = build_profile(&playlist).unwrap();
        let catalog = MockCatalog::default().top(
            "a",
            vec![
                top_track("p1", "Already Here", "a", "A", 0.9),
                top_track("n1", "New", "a", "A", 0.5),
            ],
        );

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.candidates[0].id, "n1");
        // Rank is the position in the artist's listing, excluded tracks included
        assert_eq!(pool.candidates[0].track_rank_in_artist_top, 1);
    }

    #[tokio::test]
    async fn test_remasters_of_playlist_tracks_are_excluded() {
        let profile = build_profile(&[playlist_track("p1", "Classic", "a", "A")]).unwrap();
        let catalog = MockCatalog::default().top(
            "a",
            vec![top_track("r1", "Classic - 2011 Remaster", "a", "A", 0.9)],
        );

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_candidates_keep_first_occurrence() {
        let profile = profile_with_counts(&[("a", 2), ("b", 1)]);
        let catalog = MockCatalog::default()
            .top("a", vec![top_track("c1", "Collab", "a", "A", 0.9)])
            .top(
                "b",
                vec![top_track("b1", "Solo", "b", "B", 0.9), top_track("c1", "Collab", "a", "A", 0.9)],
            );

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        let collab: Vec<_> = pool.candidates.iter().filter(|c| c.id == "c1").collect();
        assert_eq!(collab.len(), 1);
        assert_eq!(collab[0].artist_id, "a");
        assert_eq!(collab[0].source_artist_rank_in_playlist, 0);
    }

    #[tokio::test]
    async fn test_failed_artist_is_skipped_and_recorded() {
        let profile = profile_with_counts(&[("a", 2), ("b", 1)]);
        let catalog = MockCatalog::default()
            .failing("a", CatalogError::RateLimited)
            .top("b", vec![top_track("y1", "Y1", "b", "B", 0.5)]);

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.candidates[0].source_artist_rank_in_playlist, 1);
        assert!(!pool.is_complete());
        assert_eq!(pool.failures[0].artist_id, "a");
        assert_eq!(pool.failures[0].error, CatalogError::RateLimited);
    }

    #[tokio::test]
    async fn test_all_artists_failing_yields_empty_pool() {
        let profile = profile_with_counts(&[("a", 2), ("b", 1)]);
        let catalog = MockCatalog::default()
            .failing("a", CatalogError::Network("down".to_string()))
            .failing("b", CatalogError::Network("down".to_string()));

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert!(pool.is_empty());
        assert_eq!(pool.failures.len(), 2);
        assert_eq!(pool.artists_succeeded, 0);
    }

    #[tokio::test]
    async fn test_slow_artist_times_out() {
        let profile = profile_with_counts(&[("a", 2), ("b", 1)]);
        let catalog = MockCatalog::default()
            .top("a", vec![top_track("x1", "X1", "a", "A", 0.9)])
            .top("b", vec![top_track("y1", "Y1", "b", "B", 0.9)])
            .delayed("a", Duration::from_secs(5));
        let options = AssembleOptions {
            fetch_timeout: Some(Duration::from_millis(50)),
            ..Default::default()
        };

        let pool = assemble_candidates(&profile, &catalog, &options).await;

        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.failures[0].error, CatalogError::Timeout(50));
        assert!(!pool.is_complete());
    }

    #[tokio::test]
    async fn test_dropped_assembly_leaves_nothing_behind() {
        let profile = profile_with_counts(&[("a", 2), ("b", 1)]);
        let mut catalog = MockCatalog::default()
            .top("a", vec![top_track("x1", "X1", "a", "A", 0.9)])
            .top("b", vec![top_track("y1", "Y1", "b", "B", 0.9)])
            .delayed("a", Duration::from_secs(5));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            assemble_candidates(&profile, &catalog, &AssembleOptions::default()),
        )
        .await;
        assert!(abandoned.is_err());

        catalog.delays.clear();
        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert!(pool.is_complete());
        assert_eq!(pool.artists_succeeded, 2);
        let ids: Vec<_> = pool.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["x1", "y1"]);
    }

    #[tokio::test]
    async fn test_only_top_n_artists_are_requested() {
        let counts: Vec<(String, u32)> = (0..25).map(|i| (format!("a{i:02}"), 30 - i)).collect();
        let refs: Vec<(&str, u32)> = counts.iter().map(|(a, c)| (a.as_str(), *c)).collect();
        let profile = profile_with_counts(&refs);
        let catalog = MockCatalog::default();

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert_eq!(pool.artists_requested, MAX_TOP_ARTISTS);
        let requested = catalog.requested.lock().unwrap();
        assert_eq!(requested.len(), MAX_TOP_ARTISTS);
        assert!(!requested.contains(&"a24".to_string()));
    }

    #[tokio::test]
    async fn test_track_limit_is_respected() {
        let profile = profile_with_counts(&[("a", 1)]);
        let tracks = (0..15)
            .map(|i| top_track(&format!("x{i}"), &format!("X{i}"), "a", "A", 0.5))
            .collect();
        let catalog = MockCatalog::default().top("a", tracks);

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert_eq!(pool.candidates.len(), TOP_TRACKS_PER_ARTIST);
        assert_eq!(pool.candidates.last().unwrap().track_rank_in_artist_top, 9);
    }

    #[test]
    fn test_max_artist_count_limits_expansion() {
        let profile = profile_with_counts(&[("a", 5), ("b", 2), ("c", 1)]);
        let options = AssembleOptions {
            max_artist_count: Some(2),
            ..Default::default()
        };

        let targets: Vec<_> = expansion_targets(&profile, &options)
            .iter()
            .map(|a| a.id.clone().unwrap())
            .collect();

        assert_eq!(targets, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_candidate_inherits_artist_genres() {
        let profile = profile_with_counts(&[("a", 1)])
            .with_genres(&HashMap::from([("a".to_string(), vec!["dream pop".to_string()])]));
        let catalog = MockCatalog::default().top("a", vec![top_track("x1", "X1", "a", "A", 0.4)]);

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        let genres: Vec<_> = pool.candidates[0].artist_genres.iter().cloned().collect();
        assert_eq!(genres, vec!["dream pop".to_string()]);
        assert_eq!(pool.candidates[0].artist_name, "A");
    }

    #[tokio::test]
    async fn test_tracks_without_id_are_skipped() {
        let profile = profile_with_counts(&[("a", 1)]);
        let mut anonymous = top_track("x", "No Id", "a", "A", 0.4);
        anonymous.id = None;
        let catalog = MockCatalog::default().top("a", vec![anonymous]);

        let pool = assemble_candidates(&profile, &catalog, &AssembleOptions::default()).await;

        assert!(pool.is_empty());
        assert!(pool.is_complete());
    }
}
