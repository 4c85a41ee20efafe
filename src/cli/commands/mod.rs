//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `summary`: Playlist composition
//! - `recommend`: Confidence-ranked recommendations
//! - `settings`: Scoring weights, configuration checks, config file creation

mod recommend;
mod settings;
mod summary;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::catalog::{SpotifyClient, parse_playlist_ref};
use crate::config::Config;
use crate::error::Error;
use crate::recommend::FocusMode;

pub use recommend::cmd_recommend;
pub use settings::{cmd_check_config, cmd_init_config, cmd_weights};
pub use summary::cmd_summary;

/// Rhythm Refiner CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Spotify client ID (or set SPOTIFY_CLIENT_ID env var)
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Spotify client secret (or set SPOTIFY_CLIENT_SECRET env var)
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Show which artists make up a playlist
    Summary {
        /// Playlist URL, spotify:playlist: URI, or ID
        playlist: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// List each artist's tracks
        #[arg(long)]
        tracks: bool,
    },
    /// Recommend tracks the playlist doesn't contain yet
    Recommend {
        /// Playlist URL, spotify:playlist: URI, or ID
        playlist: String,
        /// Favor prevalent or lesser-known playlist artists
        #[arg(long, default_value = "prevalent")]
        focus: FocusMode,
        /// Only expand artists with at most this many playlist tracks
        #[arg(long)]
        max_artist_count: Option<u32>,
        /// Show at most this many recommendations
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the scoring formula and active weights
    Weights {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the config file location and whether credentials are available
    CheckConfig,
    /// Write a config file with default settings
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = crate::config::load();

    let result = match &cli.command {
        Commands::Summary {
            playlist,
            json,
            tracks,
        } => {
            let rt = Runtime::new()?;
            cmd_summary(&rt, cli, &config, playlist, *json, *tracks)
        }
        Commands::Recommend {
            playlist,
            focus,
            max_artist_count,
            limit,
            json,
        } => {
            let rt = Runtime::new()?;
            cmd_recommend(
                &rt,
                cli,
                &config,
                playlist,
                *focus,
                *max_artist_count,
                *limit,
                *json,
            )
        }
        Commands::Weights { json } => cmd_weights(&config, *json),
        Commands::CheckConfig => cmd_check_config(cli, &config),
        Commands::InitConfig { force } => cmd_init_config(cli, *force),
    };

    if let Err(ref e) = result
        && is_transient(e)
    {
        eprintln!("The catalog may be temporarily unavailable; try again in a moment.");
    }
    result
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Build a catalog client from flags, env, and config, in that order.
pub(crate) fn build_client(cli: &Cli, config: &Config) -> anyhow::Result<SpotifyClient> {
    let spotify = config.spotify_config(cli.client_id.as_deref(), cli.client_secret.as_deref());
    if spotify.client_id.trim().is_empty() || spotify.client_secret.trim().is_empty() {
        print_credentials_instructions();
        anyhow::bail!("Spotify credentials are not configured");
    }
    SpotifyClient::new(spotify).context("Failed to create Spotify client")
}

/// Whether a command failed for a reason that retrying might fix
pub(crate) fn is_transient(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Error>().is_some_and(Error::is_transient)
}

/// Resolve a playlist argument to a catalog ID.
pub(crate) fn playlist_id(raw: &str) -> anyhow::Result<String> {
    parse_playlist_ref(raw).with_context(|| format!("Could not read playlist reference '{raw}'"))
}

/// Print where credentials can come from
pub(crate) fn print_credentials_instructions() {
    eprintln!("Error: no Spotify credentials found.");
    eprintln!("Create an app at https://developer.spotify.com/dashboard, then either:");
    eprintln!("  pass --client-id and --client-secret,");
    eprintln!("  set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET, or");
    match crate::config::config_path() {
        Some(path) => eprintln!("  add a [credentials] section to {}", path.display()),
        None => eprintln!("  add a [credentials] section to the config file"),
    }
}

/// Shorten a string to `max` characters for table output
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
