//! Spotify Web API HTTP client
//!
//! Handles communication with the Web API using the client-credentials flow.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! ## API Quirks
//!
//! ### Paging
//! Playlist items come in pages of at most 100. Only the first page asks for
//! `total` through the `fields` filter; the remaining offsets are derived
//! from it and fetched concurrently, then stitched back together in offset
//! order so playlist positions stay intact.
//!
//! ### Several-artists lookup
//! `GET /v1/artists` accepts at most 50 IDs per request and answers `null`
//! for IDs it does not know.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures::{StreamExt, TryStreamExt, stream};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::catalog::domain::{CatalogError, RawPlaylistTrack, TopTrack};

const API_BASE: &str = "https://api.spotify.com/v1";
const ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Playlist page size (API maximum)
const PAGE_LIMIT: u32 = 100;

/// Several-artists batch size (API maximum)
const ARTIST_BATCH: usize = 50;

/// Refresh the token this long before the catalog says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const PAGE_FIELDS: &str =
    "items(track(id,name,external_urls,artists(id,name,external_urls),is_local))";

/// Connection settings for [`SpotifyClient`]
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// ISO 3166-1 market used for top-track lookups
    pub market: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Concurrent playlist page fetches
    pub page_concurrency: usize,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            market: "US".to_string(),
            request_timeout: Duration::from_secs(10),
            page_concurrency: 8,
        }
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    config: SpotifyConfig,
    api_base: String,
    accounts_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    /// Create a new client.
    ///
    /// Fails with [`CatalogError::Auth`] when credentials are missing, so a
    /// misconfiguration surfaces before any playlist work starts.
    pub fn new(config: SpotifyConfig) -> Result<Self, CatalogError> {
        Self::with_base_urls(config, API_BASE, ACCOUNTS_BASE)
    }

    /// Create a client against custom endpoints (proxies, test servers)
    pub fn with_base_urls(
        config: SpotifyConfig,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(CatalogError::Auth(
                "client ID and client secret are required".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(config.request_timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            accounts_base: accounts_base.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    /// Fetch every playlist entry in playlist order
    pub async fn playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistTrack>, CatalogError> {
        let first = self.fetch_page(playlist_id, 0, true).await?;
        let total = first.total.unwrap_or(0);
        let mut tracks = adapter::to_playlist_tracks(first);

        let offsets: Vec<u32> = (PAGE_LIMIT..total).step_by(PAGE_LIMIT as usize).collect();
        if !offsets.is_empty() {
            tracing::debug!(
                target: "catalog::spotify",
                playlist_id,
                total,
                pages = offsets.len() + 1,
                "Fetching remaining playlist pages"
            );
        }

        // `buffered` yields in input order even though requests overlap
        let pages: Vec<dto::PlaylistTracksPage> = stream::iter(offsets)
            .map(|offset| self.fetch_page(playlist_id, offset, false))
            .buffered(self.config.page_concurrency.max(1))
            .try_collect()
            .await?;

        for page in pages {
            tracks.extend(adapter::to_playlist_tracks(page));
        }

        tracing::info!(
            target: "catalog::spotify",
            playlist_id,
            tracks = tracks.len(),
            "Fetched playlist"
        );
        Ok(tracks)
    }

    /// Fetch an artist's top tracks for the configured market
    pub async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<TopTrack>, CatalogError> {
        let url = format!(
            "{}/artists/{}/top-tracks",
            self.api_base,
            urlencoding::encode(artist_id)
        );
        let response: dto::TopTracksResponse = self
            .get_json(&url, &[("market", self.config.market.clone())])
            .await?;
        Ok(adapter::to_top_tracks(response))
    }

    /// Fetch genres for many artists, batching as the API requires
    pub async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, CatalogError> {
        let mut genres = HashMap::new();
        let url = format!("{}/artists", self.api_base);

        for batch in artist_ids.chunks(ARTIST_BATCH) {
            let response: dto::ArtistsResponse =
                self.get_json(&url, &[("ids", batch.join(","))]).await?;
            genres.extend(adapter::to_genres(response));
        }

        Ok(genres)
    }

    async fn fetch_page(
        &self,
        playlist_id: &str,
        offset: u32,
        include_total: bool,
    ) -> Result<dto::PlaylistTracksPage, CatalogError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_base,
            urlencoding::encode(playlist_id)
        );
        let fields = if include_total {
            format!("{PAGE_FIELDS},total")
        } else {
            PAGE_FIELDS.to_string()
        };

        self.get_json(
            &url,
            &[
                ("limit", PAGE_LIMIT.to_string()),
                ("offset", offset.to_string()),
                ("fields", fields),
            ],
        )
        .await
    }

    /// Authorized GET that maps HTTP failures onto [`CatalogError`]
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let token = self.access_token().await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Force a fresh token on the next call
            self.token.lock().await.take();
            return Err(CatalogError::Auth("access token rejected".to_string()));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            let message = match response.json::<dto::ApiErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Return a cached token, requesting a new one when it is close to expiry
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;

        if let Some(ref token) = *cached
            && Instant::now() < token.expires_at
        {
            return Ok(token.value.clone());
        }

        let fresh = self.request_token().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let value = fresh.access_token;
        // An unrepresentable expiry means the token is used once and not kept
        *cached = Instant::now()
            .checked_add(lifetime)
            .map(|expires_at| CachedToken {
                value: value.clone(),
                expires_at,
            });

        tracing::debug!(target: "catalog::spotify", expires_in = fresh.expires_in, "Obtained access token");
        Ok(value)
    }

    fn transport_error(&self, e: reqwest::Error) -> CatalogError {
        if e.is_timeout() {
            CatalogError::Timeout(self.config.request_timeout.as_millis() as u64)
        } else {
            CatalogError::Network(e.to_string())
        }
    }

    async fn request_token(&self) -> Result<dto::TokenResponse, CatalogError> {
        let url = format!("{}/api/token", self.accounts_base);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<dto::AuthError>().await {
                Ok(body) => body.error_description.unwrap_or(body.error),
                Err(_) => format!("HTTP {status}"),
            };
            return Err(CatalogError::Auth(message));
        }

        response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SpotifyConfig {
        SpotifyConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new(config()).unwrap();
        assert_eq!(client.api_base, "https://api.spotify.com/v1");
        assert_eq!(client.accounts_base, "https://accounts.spotify.com");
    }

    #[test]
    fn test_client_with_custom_urls() {
        let client =
            SpotifyClient::with_base_urls(config(), "http://localhost:8080/v1/", "http://localhost:8081")
                .unwrap();
        assert_eq!(client.api_base, "http://localhost:8080/v1");
        assert_eq!(client.accounts_base, "http://localhost:8081");
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = SpotifyClient::new(SpotifyConfig::default());
        assert!(matches!(result, Err(CatalogError::Auth(_))));
    }

    #[test]
    fn test_default_config() {
        let config = SpotifyConfig::default();
        assert_eq!(config.market, "US");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.page_concurrency, 8);
    }

    #[test]
    fn test_remaining_offsets() {
        let offsets: Vec<u32> = (PAGE_LIMIT..250).step_by(PAGE_LIMIT as usize).collect();
        assert_eq!(offsets, vec![100, 200]);
        let none: Vec<u32> = (PAGE_LIMIT..100).step_by(PAGE_LIMIT as usize).collect();
        assert!(none.is_empty());
    }
}

/// HTTP behaviour against a local mock server
#[cfg(test)]
mod http_tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client_for(server: &MockServer) -> SpotifyClient {
        let config = SpotifyConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        SpotifyClient::with_base_urls(config, server.url("/v1"), server.base_url()).unwrap()
    }

    async fn mock_token<'a>(server: &'a MockServer, expires_in: u64) -> httpmock::Mock<'a> {
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/token");
                then.status(200).json_body(json!({
                    "access_token": "tok",
                    "token_type": "Bearer",
                    "expires_in": expires_in
                }));
            })
            .await
    }

    fn page_items(prefix: &str, count: usize) -> serde_json::Value {
        let items: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "track": {
                        "id": format!("{prefix}{i}"),
                        "name": format!("Song {prefix}{i}"),
                        "external_urls": { "spotify": "https://open.spotify.com/track/x" },
                        "artists": [{ "id": "ar1", "name": "Artist", "external_urls": {} }],
                        "is_local": false
                    }
                })
            })
            .collect();
        json!(items)
    }

    #[tokio::test]
    async fn test_token_is_cached_across_requests() {
        let server = MockServer::start_async().await;
        let token = mock_token(&server, 3600).await;
        let top = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/artists/ar1/top-tracks")
                    .query_param("market", "US");
                then.status(200).json_body(json!({
                    "tracks": [{ "id": "t1", "name": "Hit", "artists": [], "popularity": 80 }]
                }));
            })
            .await;

        let client = client_for(&server);
        let first = client.artist_top_tracks("ar1").await.unwrap();
        client.artist_top_tracks("ar1").await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].popularity, 0.8);
        token.assert_hits_async(1).await;
        top.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_absurd_expiry_is_not_cached() {
        let server = MockServer::start_async().await;
        let token = mock_token(&server, u64::MAX).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/artists/ar1/top-tracks");
                then.status(200).json_body(json!({ "tracks": [] }));
            })
            .await;

        let client = client_for(&server);
        client.artist_top_tracks("ar1").await.unwrap();
        client.artist_top_tracks("ar1").await.unwrap();

        token.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_unauthorized_clears_cached_token() {
        let server = MockServer::start_async().await;
        let token = mock_token(&server, 3600).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/artists/ar1/top-tracks");
                then.status(401).json_body(json!({
                    "error": { "status": 401, "message": "The access token expired" }
                }));
            })
            .await;

        let client = client_for(&server);
        let first = client.artist_top_tracks("ar1").await;
        let second = client.artist_top_tracks("ar1").await;

        assert!(matches!(first, Err(CatalogError::Auth(_))));
        assert!(matches!(second, Err(CatalogError::Auth(_))));
        // Each attempt after a 401 has to fetch a new token
        token.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start_async().await;
        mock_token(&server, 3600).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/artists/missing/top-tracks");
                then.status(404).json_body(json!({
                    "error": { "status": 404, "message": "Not found." }
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/artists/busy/top-tracks");
                then.status(429).header("retry-after", "3");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/artists/broken/top-tracks");
                then.status(502).json_body(json!({
                    "error": { "status": 502, "message": "Bad gateway upstream" }
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/artists/opaque/top-tracks");
                then.status(500).body("<html>oops</html>");
            })
            .await;

        let client = client_for(&server);

        assert!(matches!(
            client.artist_top_tracks("missing").await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            client.artist_top_tracks("busy").await,
            Err(CatalogError::RateLimited)
        ));
        match client.artist_top_tracks("broken").await {
            Err(CatalogError::ApiError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad gateway upstream");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
        match client.artist_top_tracks("opaque").await {
            Err(CatalogError::ApiError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_token_rejection_is_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/token");
                then.status(400).json_body(json!({
                    "error": "invalid_client",
                    "error_description": "Invalid client secret"
                }));
            })
            .await;

        let client = client_for(&server);
        match client.artist_top_tracks("ar1").await {
            Err(CatalogError::Auth(message)) => assert_eq!(message, "Invalid client secret"),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pages_are_stitched_in_offset_order() {
        let server = MockServer::start_async().await;
        mock_token(&server, 3600).await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/playlists/pl1/tracks")
                    .query_param("offset", "0");
                then.status(200)
                    .json_body(json!({ "items": page_items("a", 100), "total": 250 }));
            })
            .await;
        // The middle page answers last
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/playlists/pl1/tracks")
                    .query_param("offset", "100");
                then.status(200)
                    .delay(Duration::from_millis(300))
                    .json_body(json!({ "items": page_items("b", 100) }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/playlists/pl1/tracks")
                    .query_param("offset", "200");
                then.status(200)
                    .json_body(json!({ "items": page_items("c", 50) }));
            })
            .await;

        let client = client_for(&server);
        let tracks = client.playlist_tracks("pl1").await.unwrap();

        assert_eq!(tracks.len(), 250);
        assert_eq!(tracks[0].id.as_deref(), Some("a0"));
        assert_eq!(tracks[99].id.as_deref(), Some("a99"));
        assert_eq!(tracks[100].id.as_deref(), Some("b0"));
        assert_eq!(tracks[199].id.as_deref(), Some("b99"));
        assert_eq!(tracks[200].id.as_deref(), Some("c0"));
        assert_eq!(tracks[249].id.as_deref(), Some("c49"));
    }

    #[tokio::test]
    async fn test_genres_are_batched_by_fifty() {
        let server = MockServer::start_async().await;
        mock_token(&server, 3600).await;
        let artists = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/artists");
                then.status(200).json_body(json!({
                    "artists": [{ "id": "ar1", "name": "Artist", "genres": ["Indie Rock"] }, null]
                }));
            })
            .await;

        let ids: Vec<String> = (0..120).map(|i| format!("ar{i}")).collect();
        let client = client_for(&server);
        let genres = client.artist_genres(&ids).await.unwrap();

        artists.assert_hits_async(3).await;
        assert_eq!(genres.get("ar1"), Some(&vec!["indie rock".to_string()]));
    }
}
