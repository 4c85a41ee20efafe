//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\rhythm-refiner\config.toml
//! - macOS: ~/Library/Application Support/rhythm-refiner/config.toml
//! - Linux: ~/.config/rhythm-refiner/config.toml
//!
//! Every section is optional. Missing keys fall back to the defaults below,
//! and command-line flags override what the file says.
//!
//! ```toml
//! [credentials]
//! client_id = "..."
//! client_secret = "..."
//!
//! [catalog]
//! market = "US"
//! request_timeout_secs = 10
//! page_fetch_concurrency = 8
//!
//! [recommend]
//! max_top_artists = 20
//! top_tracks_per_artist = 10
//! max_concurrent_fetches = 8
//! fetch_timeout_secs = 15
//! max_results = 100
//!
//! [weights]
//! artist = 0.40
//! rank = 0.25
//! genre = 0.15
//! popularity = 0.20
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::SpotifyConfig;
use crate::recommend::candidates::{MAX_TOP_ARTISTS, TOP_TRACKS_PER_ARTIST};
use crate::recommend::{AssembleOptions, FocusMode, MAX_RESULTS, RecommendOptions, Weights, WeightsError};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API credentials
    pub credentials: Credentials,

    /// Catalog client settings
    pub catalog: CatalogConfig,

    /// Candidate gathering and result settings
    pub recommend: RecommendConfig,

    /// Scoring weights
    pub weights: Weights,
}

/// Catalog API credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Spotify client ID
    pub client_id: Option<String>,

    /// Spotify client secret
    pub client_secret: Option<String>,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.client_id) && set(&self.client_secret)
    }
}

/// Catalog client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Market used for top-track lookups
    pub market: String,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,

    /// Playlist pages fetched in parallel
    pub page_fetch_concurrency: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            market: "US".to_string(),
            request_timeout_secs: 10,
            page_fetch_concurrency: 8,
        }
    }
}

/// Candidate gathering and result settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Playlist artists expanded into candidates
    pub max_top_artists: usize,

    /// Top tracks requested per artist
    pub top_tracks_per_artist: usize,

    /// Parallel top-track lookups (clamped to 1..=max_top_artists)
    pub max_concurrent_fetches: usize,

    /// Per-artist deadline; unset means no deadline
    pub fetch_timeout_secs: Option<u64>,

    /// Cap on returned recommendations
    pub max_results: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_top_artists: MAX_TOP_ARTISTS,
            top_tracks_per_artist: TOP_TRACKS_PER_ARTIST,
            max_concurrent_fetches: 8,
            fetch_timeout_secs: None,
            max_results: MAX_RESULTS,
        }
    }
}

impl Config {
    /// Configured weights, or the defaults when they don't validate.
    pub fn effective_weights(&self) -> Weights {
        match self.weights.validate() {
            Ok(()) => self.weights,
            Err(e) => {
                tracing::error!("Invalid weights in config ({}), using defaults", e);
                Weights::default()
            }
        }
    }

    /// Build catalog client settings, preferring explicit credentials.
    pub fn spotify_config(
        &self,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> SpotifyConfig {
        let pick = |flag: Option<&str>, file: &Option<String>| {
            flag.map(str::to_string)
                .or_else(|| file.clone())
                .unwrap_or_default()
        };

        SpotifyConfig {
            client_id: pick(client_id, &self.credentials.client_id),
            client_secret: pick(client_secret, &self.credentials.client_secret),
            market: self.catalog.market.clone(),
            request_timeout: Duration::from_secs(self.catalog.request_timeout_secs.max(1)),
            page_concurrency: self.catalog.page_fetch_concurrency.max(1),
        }
    }

    /// Build pipeline options for a run.
    pub fn recommend_options(
        &self,
        focus: FocusMode,
        max_artist_count: Option<u32>,
    ) -> RecommendOptions {
        let rec = &self.recommend;
        let max_top_artists = rec.max_top_artists.max(1);

        RecommendOptions {
            assemble: AssembleOptions {
                max_top_artists,
                top_tracks_per_artist: rec.top_tracks_per_artist.max(1),
                max_concurrent_fetches: rec.max_concurrent_fetches.clamp(1, max_top_artists),
                fetch_timeout: rec.fetch_timeout_secs.map(Duration::from_secs),
                max_artist_count,
            },
            weights: self.effective_weights(),
            focus,
            max_results: rec.max_results,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rhythm-refiner"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    config.weights.validate()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Invalid weights: {0}")]
    InvalidWeights(#[from] WeightsError),
}

// ============================================================================
// Tests
// ============================================================================
