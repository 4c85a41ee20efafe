//! Music catalog access - playlist contents, artist top tracks, and genres.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types the recommendation engine consumes
//! - **API DTOs** (`spotify/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Traits** (`traits.rs`) - The [`CatalogApi`] seam the engine depends on
//!
//! The engine never sees a DTO, so a catalog API change stays inside
//! `spotify/`, and tests can run the whole pipeline against a mock.
//!
//! # Usage
//!
//! ```ignore
//! use rhythm_refiner::catalog::{SpotifyClient, SpotifyConfig, parse_playlist_ref};
//!
//! let client = SpotifyClient::new(SpotifyConfig {
//!     client_id: "id".to_string(),
//!     client_secret: "secret".to_string(),
//!     ..Default::default()
//! })?;
//! let id = parse_playlist_ref("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")?;
//! let tracks = client.playlist_tracks(&id).await?;
//! ```

pub mod domain;
pub mod spotify;
pub mod traits;

pub use domain::{ArtistCredit, CatalogError, RawPlaylistTrack, TopTrack};
pub use spotify::{SpotifyClient, SpotifyConfig, parse_playlist_ref};
pub use traits::CatalogApi;
