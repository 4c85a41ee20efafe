//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`CatalogError`], [`ProfileError`], [`ConfigError`])
//!   for detailed handling
//! - Scoring and focus filtering have no error type; they always produce a
//!   (possibly empty) result
//!
//! # Example
//!
//! ```ignore
//! use rhythm_refiner::error::{Result, ResultExt};
//!
//! async fn summarize(client: &SpotifyClient, raw: &str) -> Result<PlaylistProfile> {
//!     let id = parse_playlist_ref(raw)?;
//!     let tracks = client.playlist_tracks(&id).await.with_context("fetching playlist")?;
//!     Ok(build_profile(&tracks)?)
//! }
//! ```

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::recommend::{ProfileError, RecommendError};

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog request failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Playlist could not be profiled
    #[error("{0}")]
    Profile(#[from] ProfileError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl From<RecommendError> for Error {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::Catalog(e) => Error::Catalog(e),
            RecommendError::Profile(e) => Error::Profile(e),
        }
    }
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Catalog(e) => matches!(
                e,
                CatalogError::Network(_) | CatalogError::RateLimited | CatalogError::Timeout(_)
            ),
            Error::WithContext { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, CatalogError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Catalog(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, RecommendError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::from(e).context(ctx))
    }
}
