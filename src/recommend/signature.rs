//! Track signatures for duplicate detection.
//!
//! Two catalog entries with different IDs are often the same recording
//! (remasters, live cuts credited like the studio take, radio edits). A
//! signature is `normalized title|primary artist` and is compared in addition
//! to track IDs when deciding whether a candidate is already in the playlist.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::ArtistCredit;

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(.*?\)").expect("parenthesized regex"));

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\[.*?\]").expect("bracketed regex"));

static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+-\s*(?:\d{4}\s+)?(?:remaster(?:ed)?(?:\s*\d+)?|live.*|radio edit.*)")
        .expect("version suffix regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Lower-case a title and strip version decorations.
///
/// ```ignore
/// assert_eq!(normalize_title("Song (feat. X) - 2011 Remaster"), "song");
/// ```
pub fn normalize_title(title: &str) -> String {
    let title = title.trim().to_lowercase();
    let title = PARENTHESIZED.replace_all(&title, "");
    let title = BRACKETED.replace_all(&title, "");
    let title = VERSION_SUFFIX.replace_all(&title, "");
    let title = WHITESPACE.replace_all(&title, " ");
    title.trim().to_string()
}

/// Build the signature of a track, or `None` when title or primary artist is blank.
pub fn track_signature(title: &str, artists: &[ArtistCredit]) -> Option<String> {
    let primary = artists.first()?.name.trim().to_lowercase();
    let title = normalize_title(title);
    if primary.is_empty() || title.is_empty() {
        return None;
    }
    Some(format!("{title}|{primary}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit(name: &str) -> ArtistCredit {
        ArtistCredit {
            id: None,
            name: name.to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn test_strips_parentheses_and_brackets() {
        assert_eq!(normalize_title("Song (feat. Someone) [Deluxe]"), "song");
    }

    #[test]
    fn test_strips_remaster_suffixes() {
        assert_eq!(normalize_title("Song - Remastered 2009"), "song");
        assert_eq!(normalize_title("Song - 2011 Remaster"), "song");
        assert_eq!(normalize_title("Song - Remaster"), "song");
    }

    #[test]
    fn test_strips_live_and_radio_edit() {
        assert_eq!(normalize_title("Song - Live at Wembley"), "song");
        assert_eq!(normalize_title("Song - Radio Edit"), "song");
    }

    #[test]
    fn test_keeps_words_that_only_look_like_suffixes() {
        assert_eq!(normalize_title("Live Forever"), "live forever");
        assert_eq!(normalize_title("Remaster  The   World"), "remaster the world");
    }

    #[test]
    fn test_signature_uses_primary_artist() {
        let sig = track_signature("Song - Remastered", &[credit("The Band"), credit("Guest")]);
        assert_eq!(sig.as_deref(), Some("song|the band"));
    }

    #[test]
    fn test_signature_requires_title_and_artist() {
        assert!(track_signature("Song", &[]).is_none());
        assert!(track_signature("Song", &[credit("  ")]).is_none());
        assert!(track_signature("(Intro)", &[credit("Artist")]).is_none());
    }
}
