//! Recommendation engine.
//!
//! Turns a playlist into a ranked, confidence-annotated list of tracks it
//! doesn't contain yet:
//!
//! 1. [`profile`] - per-artist counts, shares, and a genre profile
//! 2. [`candidates`] - top tracks of the top playlist artists, deduplicated
//! 3. [`signals`] - artist, rank, genre, popularity, and balance signals
//! 4. [`scoring`] - weighted confidence and a total, deterministic order
//! 5. [`focus`] - optional filter towards under-represented artists
//!
//! Only the profile inputs and the candidate fetches touch the catalog;
//! everything after the candidate pool is pure.
//!
//! # Usage
//!
//! ```ignore
//! use rhythm_refiner::recommend::{RecommendOptions, Recommender};
//!
//! let recommender = Recommender::new(client, RecommendOptions::default());
//! let result = recommender.recommend("37i9dQZF1DXcBWIGoYBM5M").await?;
//! for track in &result.recommended_tracks {
//!     println!("{:5.1}%  {}", track.confidence_pct, track.candidate.name);
//! }
//! ```

pub mod candidates;
pub mod focus;
pub mod profile;
pub mod scoring;
pub mod signals;
pub mod signature;

use std::collections::BTreeMap;

use serde::Serialize;

pub use candidates::{
    ArtistFetchFailure, AssembleOptions, CandidatePool, CandidateTrack, assemble_candidates,
};
pub use focus::{FocusMode, apply_focus, lesser_known_threshold};
pub use profile::{ArtistSummary, PlaylistProfile, PlaylistTrack, ProfileError, build_profile};
pub use scoring::{Ranking, ScoredTrack, Weights, WeightsError, score_and_rank};
pub use signals::{Signals, compute_signals};

use crate::catalog::{CatalogApi, CatalogError};

/// Default cap on returned recommendations
pub const MAX_RESULTS: usize = 100;

/// Errors from the recommendation pipeline
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Everything that shapes a recommendation run
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    pub assemble: AssembleOptions,
    pub weights: Weights,
    pub focus: FocusMode,
    /// Cap on the returned list, applied after focus filtering
    pub max_results: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            assemble: AssembleOptions::default(),
            weights: Weights::default(),
            focus: FocusMode::default(),
            max_results: MAX_RESULTS,
        }
    }
}

/// How the candidate fetches went
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolReport {
    pub artists_requested: usize,
    pub artists_succeeded: usize,
    pub failed_artists: Vec<ArtistFetchFailure>,
    pub candidates: usize,
    /// False when any artist failed; the ranking is then based on a partial pool
    pub complete: bool,
}

impl From<&CandidatePool> for PoolReport {
    fn from(pool: &CandidatePool) -> Self {
        Self {
            artists_requested: pool.artists_requested,
            artists_succeeded: pool.artists_succeeded,
            failed_artists: pool.failures.clone(),
            candidates: pool.candidates.len(),
            complete: pool.is_complete(),
        }
    }
}

/// Result of a recommendation run, with what's needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub total_tracks: usize,
    pub recommended_tracks: Vec<ScoredTrack>,
    pub playlist_genre_profile: BTreeMap<String, f64>,
    pub weights: Weights,
    pub focus: FocusMode,
    pub pool: PoolReport,
    /// Why the list is empty or incomplete, when it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl Recommendations {
    fn empty(options: &RecommendOptions, info: impl Into<String>) -> Self {
        Self {
            total_tracks: 0,
            recommended_tracks: Vec::new(),
            playlist_genre_profile: BTreeMap::new(),
            weights: options.weights,
            focus: options.focus,
            pool: PoolReport {
                complete: true,
                ..Default::default()
            },
            info: Some(info.into()),
        }
    }
}

/// Runs the full pipeline against a catalog.
pub struct Recommender<C> {
    catalog: C,
    options: RecommendOptions,
}

impl<C: CatalogApi> Recommender<C> {
    pub fn new(catalog: C, options: RecommendOptions) -> Self {
        Self { catalog, options }
    }

    /// Fetch a playlist and profile it, without genre data.
    pub async fn profile(&self, playlist_id: &str) -> Result<PlaylistProfile, RecommendError> {
        let tracks = self.catalog.playlist_tracks(playlist_id).await?;
        tracing::info!(
            target: "recommend",
            playlist_id,
            tracks = tracks.len(),
            "Fetched playlist"
        );
        Ok(build_profile(&tracks)?)
    }

    /// Attach genres to a profile. A failed lookup leaves the profile without
    /// a genre profile, which zeroes the genre signal.
    pub async fn with_genres(&self, profile: PlaylistProfile) -> PlaylistProfile {
        let artist_ids: Vec<String> = profile.artists.iter().filter_map(|a| a.id.clone()).collect();
        if artist_ids.is_empty() {
            return profile;
        }

        match self.catalog.artist_genres(&artist_ids).await {
            Ok(genres) => profile.with_genres(&genres),
            Err(e) => {
                tracing::warn!(
                    target: "recommend",
                    error = %e,
                    "Genre lookup failed, continuing without genre signal"
                );
                profile
            }
        }
    }

    /// Recommend tracks for a playlist.
    ///
    /// An empty playlist yields an empty result with an explanation rather
    /// than an error. Failing to fetch the playlist itself is an error.
    pub async fn recommend(&self, playlist_id: &str) -> Result<Recommendations, RecommendError> {
        let profile = match self.profile(playlist_id).await {
            Ok(profile) => profile,
            Err(RecommendError::Profile(e)) => {
                tracing::info!(target: "recommend", playlist_id, "{}", e);
                return Ok(Recommendations::empty(&self.options, e.to_string()));
            }
            Err(e) => return Err(e),
        };
        let profile = self.with_genres(profile).await;

        Ok(self.recommend_for_profile(&profile).await)
    }

    /// Run candidate assembly, scoring, and focus filtering on a ready profile.
    pub async fn recommend_for_profile(&self, profile: &PlaylistProfile) -> Recommendations {
        let options = &self.options;
        let pool = assemble_candidates(profile, &self.catalog, &options.assemble).await;
        let report = PoolReport::from(&pool);

        let ranking = score_and_rank(
            profile,
            pool.candidates,
            &options.weights,
            options.assemble.top_tracks_per_artist,
        );
        let candidates = ranking.ranked_tracks.len();

        let mut recommended = apply_focus(ranking.ranked_tracks, profile, options.focus);
        recommended.truncate(options.max_results);

        let info = explain(&report, candidates, recommended.len(), options.focus);

        tracing::info!(
            target: "recommend",
            candidates,
            returned = recommended.len(),
            focus = %options.focus,
            complete = report.complete,
            "Recommendations ready"
        );

        Recommendations {
            total_tracks: ranking.total_tracks,
            recommended_tracks: recommended,
            playlist_genre_profile: ranking.genre_profile,
            weights: ranking.weights,
            focus: options.focus,
            pool: report,
            info,
        }
    }
}

fn explain(
    report: &PoolReport,
    candidates: usize,
    returned: usize,
    focus: FocusMode,
) -> Option<String> {
    if report.artists_requested > 0 && report.artists_succeeded == 0 {
        return Some("Could not fetch top tracks for any playlist artist.".to_string());
    }
    if candidates == 0 {
        return Some(
            "No candidate tracks found (all top tracks are already in the playlist?).".to_string(),
        );
    }
    if returned == 0 {
        return Some(format!("No candidates match the '{focus}' focus."));
    }
    if !report.complete {
        return Some(format!(
            "Top tracks unavailable for {} of {} artists; results are based on a partial pool.",
            report.failed_artists.len(),
            report.artists_requested
        ));
    }
    None
}
