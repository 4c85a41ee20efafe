//! Recommendation command.

use tokio::runtime::Runtime;

use super::{Cli, build_client, playlist_id, truncate};
use crate::config::Config;
use crate::error::ResultExt;
use crate::recommend::{FocusMode, Recommendations, Recommender};

/// Fetch, score, and print recommendations for a playlist
#[allow(clippy::too_many_arguments)]
pub fn cmd_recommend(
    rt: &Runtime,
    cli: &Cli,
    config: &Config,
    playlist: &str,
    focus: FocusMode,
    max_artist_count: Option<u32>,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let id = playlist_id(playlist)?;
    let client = build_client(cli, config)?;

    let mut options = config.recommend_options(focus, max_artist_count);
    if let Some(limit) = limit {
        options.max_results = options.max_results.min(limit);
    }
    let recommender = Recommender::new(client, options);

    if !json {
        println!("Analyzing playlist {}...", id);
    }
    let result = rt
        .block_on(recommender.recommend(&id))
        .with_context(format!("Recommending for playlist {id}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_recommendations(&result);
    Ok(())
}

fn print_recommendations(result: &Recommendations) {
    println!(
        "Playlist: {} tracks | focus: {} | {} recommendations\n",
        result.total_tracks,
        result.focus,
        result.recommended_tracks.len()
    );

    if !result.recommended_tracks.is_empty() {
        println!("{:>4}  {:>6}  {:<40} {:<28}", "#", "Conf.", "Track", "Artist");
        println!("{}", "-".repeat(82));
    }

    for (i, track) in result.recommended_tracks.iter().enumerate() {
        println!(
            "{:>4}  {:>5.1}%  {:<40} {:<28}",
            i + 1,
            track.confidence_pct,
            truncate(&track.candidate.name, 40),
            truncate(&track.candidate.artist_name, 28)
        );
    }

    let w = &result.weights;
    println!(
        "\nconfidence = ({:.2}*artist + {:.2}*rank + {:.2}*genre + {:.2}*popularity) * balance",
        w.artist, w.rank, w.genre, w.popularity
    );
    if result.playlist_genre_profile.is_empty() {
        println!("No genre data available; genre signal is 0 for every track.");
    }

    if !result.pool.complete {
        eprintln!("\nTop tracks could not be fetched for:");
        for failure in &result.pool.failed_artists {
            eprintln!("  {} ({})", failure.artist_name, failure.reason);
        }
    }
    if let Some(ref info) = result.info {
        println!("\n{}", info);
    }
}
