//! Post-ranking focus filter.
//!
//! `prevalent` keeps everything. `lesser-known` keeps candidates whose source
//! artist has at most the median playlist count. The filter only removes
//! entries; scores and relative order are untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::profile::PlaylistProfile;
use super::scoring::ScoredTrack;

/// Which artists the recommendations should lean towards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    /// Favor artists already prominent in the playlist (no filtering)
    #[default]
    Prevalent,
    /// Favor under-represented artists
    LesserKnown,
}

impl FocusMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusMode::Prevalent => "prevalent",
            FocusMode::LesserKnown => "lesser-known",
        }
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown focus mode '{0}' (expected 'prevalent' or 'lesser-known')")]
pub struct UnknownFocusMode(pub String);

impl std::str::FromStr for FocusMode {
    type Err = UnknownFocusMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "prevalent" => Ok(FocusMode::Prevalent),
            "lesser-known" | "lesserknown" => Ok(FocusMode::LesserKnown),
            _ => Err(UnknownFocusMode(s.to_string())),
        }
    }
}

/// Median of the playlist's artist counts, as used by `lesser-known`.
///
/// Counts are sorted ascending and the element at index `n / 2` is taken,
/// so an even number of artists picks the upper of the two middle values.
/// An artist-less profile yields 1.
pub fn lesser_known_threshold(profile: &PlaylistProfile) -> u32 {
    let mut counts: Vec<u32> = profile.artists.iter().map(|a| a.count).collect();
    if counts.is_empty() {
        return 1;
    }
    counts.sort_unstable();
    counts[counts.len() / 2]
}

/// Filter a ranked list by focus mode.
pub fn apply_focus(
    ranked: Vec<ScoredTrack>,
    profile: &PlaylistProfile,
    mode: FocusMode,
) -> Vec<ScoredTrack> {
    match mode {
        FocusMode::Prevalent => ranked,
        FocusMode::LesserKnown => {
            let threshold = lesser_known_threshold(profile);
            let before = ranked.len();
            let kept: Vec<ScoredTrack> = ranked
                .into_iter()
                .filter(|t| t.signals.artist_count <= threshold)
                .collect();

            tracing::debug!(
                target: "recommend::focus",
                threshold,
                before,
                after = kept.len(),
                "Applied lesser-known focus"
            );
            kept
        }
    }
}
