//! Weight display, configuration checks, and config file creation.

use std::path::Path;

use anyhow::Context;

use super::Cli;
use crate::config::{self, Config, Credentials};
use crate::recommend::signals::MAX_BALANCE_PENALTY;

/// Print the scoring formula with the active weights
pub fn cmd_weights(config: &Config, json: bool) -> anyhow::Result<()> {
    let weights = config.effective_weights();

    if json {
        println!("{}", serde_json::to_string_pretty(&weights)?);
        return Ok(());
    }

    println!("Scoring weights:");
    println!("  artist      {:.2}  playlist count of the source artist / top artist count", weights.artist);
    println!("  rank        {:.2}  1 - position in the artist's top tracks / tracks fetched", weights.rank);
    println!("  genre       {:.2}  playlist genre weight covered by the artist's genres", weights.genre);
    println!("  popularity  {:.2}  catalog popularity, 0-1", weights.popularity);
    println!();
    println!("raw        = weighted sum of the four signals");
    println!(
        "balance    = 1 - min({:.1}, artist share / 100)",
        MAX_BALANCE_PENALTY
    );
    println!("confidence = raw * balance * 100, within 0-100%");

    if weights != config.weights {
        eprintln!("\nNote: configured weights are invalid; defaults are shown.");
    }
    Ok(())
}

/// Report the config file location and credential availability
pub fn cmd_check_config(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match config::config_path() {
        Some(path) => {
            let state = if path.exists() { "found" } else { "not found, using defaults" };
            println!("Config file: {} ({})", path.display(), state);
        }
        None => println!("Config file: no config directory on this system"),
    }

    let file_credentials = if config.credentials.is_complete() { "complete" } else { "incomplete" };
    println!("Credentials in config file: {}", file_credentials);

    let spotify = config.spotify_config(cli.client_id.as_deref(), cli.client_secret.as_deref());
    let set = |v: &str| if v.trim().is_empty() { "missing" } else { "set" };
    println!("Client ID:     {}", set(&spotify.client_id));
    println!("Client secret: {}", set(&spotify.client_secret));
    println!("Market:        {}", spotify.market);

    let rec = &config.recommend;
    println!(
        "Candidates:    top {} artists x {} tracks, {} parallel fetches",
        rec.max_top_artists, rec.top_tracks_per_artist, rec.max_concurrent_fetches
    );
    match rec.fetch_timeout_secs {
        Some(secs) => println!("Fetch timeout: {}s per artist", secs),
        None => println!("Fetch timeout: none"),
    }

    match config.weights.validate() {
        Ok(()) => println!("Weights:       valid"),
        Err(e) => println!("Weights:       {} (defaults will be used)", e),
    }
    Ok(())
}

/// Write a config file with default settings
///
/// Credentials given on the command line or through the environment are
/// stored in the new file.
pub fn cmd_init_config(cli: &Cli, force: bool) -> anyhow::Result<()> {
    let path = config::config_path().context("Could not determine config directory")?;
    let credentials = Credentials {
        client_id: cli.client_id.clone(),
        client_secret: cli.client_secret.clone(),
    };
    init_config_at(&path, credentials, force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub(crate) fn init_config_at(path: &Path, credentials: Credentials, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = Config {
        credentials,
        ..Default::default()
    };
    config::save_to(&config, path).context("Failed to write config file")
}
