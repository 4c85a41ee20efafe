//! Confidence aggregation and ranking.
//!
//! ```text
//! rawScore      = artist*artistScore + rank*rankScore + genre*genreScore + popularity*popularityScore
//! finalScore    = rawScore * balancePenalty        (clamped to [0, 1])
//! confidencePct = finalScore * 100                 (clamped to [0, 100])
//! ```
//!
//! Ranking is by confidence descending, then artist score descending, then
//! candidate ID ascending, which makes the order total and repeatable.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::candidates::CandidateTrack;
use super::profile::PlaylistProfile;
use super::signals::{Signals, compute_signals};

/// Tolerance for the weights summing to one
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Invalid weight configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    #[error("Weight '{0}' must be a finite number")]
    NotFinite(&'static str),

    #[error("Weight '{name}' must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("Weights must sum to 1.0 (got {0})")]
    BadSum(f64),
}

/// Linear weights of the four primary signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub artist: f64,
    pub rank: f64,
    pub genre: f64,
    pub popularity: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            artist: 0.40,
            rank: 0.25,
            genre: 0.15,
            popularity: 0.20,
        }
    }
}

impl Weights {
    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("artist", self.artist),
            ("rank", self.rank),
            ("genre", self.genre),
            ("popularity", self.popularity),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.artist + self.rank + self.genre + self.popularity
    }

    /// Check each weight is a finite non-negative number and they sum to 1.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (name, value) in self.named() {
            if !value.is_finite() {
                return Err(WeightsError::NotFinite(name));
            }
            if value < 0.0 {
                return Err(WeightsError::Negative { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum(sum));
        }
        Ok(())
    }

    /// Weighted sum of the primary signals.
    pub fn raw_score(&self, signals: &Signals) -> f64 {
        self.artist * signals.artist_score
            + self.rank * signals.rank_score
            + self.genre * signals.genre_score
            + self.popularity * signals.popularity_score
    }
}

/// A candidate with its signals and confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTrack {
    #[serde(flatten)]
    pub candidate: CandidateTrack,
    #[serde(flatten)]
    pub signals: Signals,
    pub raw_score: f64,
    pub final_score: f64,
    /// Confidence in percent, in [0, 100]
    pub confidence_pct: f64,
}

impl ScoredTrack {
    /// Score a candidate from its signals.
    pub fn new(candidate: CandidateTrack, signals: Signals, weights: &Weights) -> Self {
        let raw_score = weights.raw_score(&signals);
        let final_score = clamp_unit(raw_score * signals.balance_penalty);
        let confidence_pct = (final_score * 100.0).clamp(0.0, 100.0);

        Self {
            candidate,
            signals,
            raw_score,
            final_score,
            confidence_pct,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Ranked candidates plus the context needed to explain them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub ranked_tracks: Vec<ScoredTrack>,
    pub total_tracks: usize,
    pub genre_profile: BTreeMap<String, f64>,
    pub weights: Weights,
}

/// Ordering used for the ranked list.
pub fn compare_scored(a: &ScoredTrack, b: &ScoredTrack) -> Ordering {
    b.confidence_pct
        .total_cmp(&a.confidence_pct)
        .then_with(|| b.signals.artist_score.total_cmp(&a.signals.artist_score))
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// Score every candidate and order the result.
///
/// `top_tracks_limit` is the per-artist fetch limit the candidates were
/// gathered with; rank scores are relative to it.
pub fn score_and_rank(
    profile: &PlaylistProfile,
    candidates: Vec<CandidateTrack>,
    weights: &Weights,
    top_tracks_limit: usize,
) -> Ranking {
    let mut ranked_tracks: Vec<ScoredTrack> = candidates
        .into_iter()
        .map(|candidate| {
            let signals = compute_signals(&candidate, profile, top_tracks_limit);
            ScoredTrack::new(candidate, signals, weights)
        })
        .collect();
    ranked_tracks.sort_by(compare_scored);

    tracing::debug!(
        target: "recommend::scoring",
        count = ranked_tracks.len(),
        best = ranked_tracks.first().map(|t| t.confidence_pct),
        "Ranked candidates"
    );

    Ranking {
        ranked_tracks,
        total_tracks: profile.total_tracks,
        genre_profile: profile.genre_profile.clone(),
        weights: *weights,
    }
}
