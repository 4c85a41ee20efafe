//! Playlist summary command.

use serde_json::json;
use tokio::runtime::Runtime;

use super::{Cli, build_client, playlist_id, truncate};
use crate::config::Config;
use crate::error::Error;
use crate::recommend::{PlaylistProfile, ProfileError, RecommendError, Recommender};

/// Print a playlist's artist breakdown
pub fn cmd_summary(
    rt: &Runtime,
    cli: &Cli,
    config: &Config,
    playlist: &str,
    json: bool,
    show_tracks: bool,
) -> anyhow::Result<()> {
    let id = playlist_id(playlist)?;
    let client = build_client(cli, config)?;
    let recommender = Recommender::new(client, config.recommend_options(Default::default(), None));

    let profile = match rt.block_on(recommender.profile(&id)) {
        Ok(profile) => profile,
        Err(RecommendError::Profile(ProfileError::EmptyPlaylist)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&empty_profile_json())?);
            } else {
                println!("Playlist is empty - nothing to analyze.");
            }
            return Ok(());
        }
        Err(e) => return Err(Error::from(e).context(format!("Summarizing playlist {id}")).into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    print_profile(&profile, show_tracks);
    Ok(())
}

/// JSON for a playlist with nothing to profile, keyed like [`PlaylistProfile`]
fn empty_profile_json() -> serde_json::Value {
    json!({
        "totalTracks": 0,
        "uniqueArtists": 0,
        "artists": [],
        "genreProfile": {},
    })
}

fn print_profile(profile: &PlaylistProfile, show_tracks: bool) {
    println!(
        "Playlist: {} tracks, {} artists\n",
        profile.total_tracks, profile.unique_artists
    );
    println!("{:>4}  {:<36} {:>6} {:>7}", "#", "Artist", "Tracks", "Share");
    println!("{}", "-".repeat(57));

    for (i, artist) in profile.artists.iter().enumerate() {
        println!(
            "{:>4}  {:<36} {:>6} {:>6.1}%",
            i + 1,
            truncate(&artist.name, 36),
            artist.count,
            artist.share
        );
        if show_tracks {
            for track in &artist.tracks {
                println!("{:>6}  {:>4}. {}", "", track.order + 1, track.name);
            }
        }
    }
}
