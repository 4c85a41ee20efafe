//! Trait definition for the music catalog collaborator.
//!
//! The recommendation engine only ever talks to the catalog through
//! [`CatalogApi`]. Production code uses [`SpotifyClient`](super::spotify::SpotifyClient),
//! while tests substitute the mocks below.
//!
//! # Example
//!
//! ```ignore
//! use rhythm_refiner::catalog::CatalogApi;
//!
//! async fn first_hit<C: CatalogApi + ?Sized>(catalog: &C, artist_id: &str) {
//!     let tracks = catalog.artist_top_tracks(artist_id, 10).await?;
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;

use super::domain::{CatalogError, RawPlaylistTrack, TopTrack};

/// Read-only access to playlist, top-track, and genre data.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch every track of a playlist, in playlist order.
    async fn playlist_tracks(&self, playlist_id: &str)
    -> Result<Vec<RawPlaylistTrack>, CatalogError>;

    /// Fetch up to `limit` of an artist's top tracks, most popular first.
    async fn artist_top_tracks(
        &self,
        artist_id: &str,
        limit: usize,
    ) -> Result<Vec<TopTrack>, CatalogError>;

    /// Fetch lower-cased genre tags for each artist ID the catalog knows.
    async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, CatalogError>;
}

#[async_trait]
impl CatalogApi for super::spotify::SpotifyClient {
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistTrack>, CatalogError> {
        self.playlist_tracks(playlist_id).await
    }

    async fn artist_top_tracks(
        &self,
        artist_id: &str,
        limit: usize,
    ) -> Result<Vec<TopTrack>, CatalogError> {
        let mut tracks = self.artist_top_tracks(artist_id).await?;
        tracks.truncate(limit);
        Ok(tracks)
    }

    async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, CatalogError> {
        self.artist_genres(artist_ids).await
    }
}
