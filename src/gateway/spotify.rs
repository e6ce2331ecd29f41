use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use rspotify::{
    http::HttpError,
    model::{
        Country, FullTrack, Market, PlayableId, PlaylistId, SearchResult, SearchType, TrackId,
        UserId,
    },
    prelude::*,
    scopes, AuthCodePkceSpotify, ClientError, Config as SpotifyConfig, Credentials, OAuth,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::GatewayError;

use super::{
    MusicGateway, Playlist, TrackFeatures, TrackSummary, UserProfile, FEATURES_BATCH_MAX,
    PLAYLIST_APPEND_MAX, SEARCH_LIMIT_MAX, TRACKS_BATCH_MAX,
};

/// Build an rspotify client from config with the scopes this crate needs.
///
/// The OAuth dance itself (opening the authorize URL, handling the redirect,
/// exchanging the code) is the embedding application's responsibility; the
/// gateway assumes the client it receives already holds a token.
pub fn build_client(config: &Config) -> AuthCodePkceSpotify {
    let creds = Credentials::new(&config.client_id, &config.client_secret);

    let scopes = scopes!(
        "user-library-read",
        "user-read-private",
        "playlist-modify-private"
    );

    let oauth = OAuth {
        redirect_uri: config.redirect_uri.clone(),
        scopes,
        ..Default::default()
    };

    let sp_config = SpotifyConfig {
        token_refreshing: true,
        ..Default::default()
    };

    AuthCodePkceSpotify::with_config(creds, oauth, sp_config)
}

/// Production [`MusicGateway`] over the Spotify Web API.
///
/// Converts rspotify's response models into the crate's value types at this
/// boundary and maps every `ClientError` into the [`GatewayError`] taxonomy;
/// nothing provider-shaped leaks upward.
pub struct SpotifyGateway {
    spotify: Arc<Mutex<AuthCodePkceSpotify>>,
    default_market: Option<Country>,
}

impl SpotifyGateway {
    pub fn new(spotify: Arc<Mutex<AuthCodePkceSpotify>>) -> Self {
        SpotifyGateway {
            spotify,
            default_market: None,
        }
    }

    /// Market applied to searches when the caller passes none.
    pub fn with_default_market(mut self, market: Option<&str>) -> Self {
        self.default_market = market.and_then(parse_market);
        self
    }
}

fn parse_market(code: &str) -> Option<Country> {
    use serde::de::value::{Error as DeError, StrDeserializer};
    use serde::Deserialize;
    match Country::deserialize(StrDeserializer::<DeError>::new(code)) {
        Ok(country) => Some(country),
        Err(_) => {
            warn!("Ignoring unrecognized market code: {code}");
            None
        }
    }
}

fn map_client_error(err: ClientError) -> GatewayError {
    match err {
        ClientError::InvalidToken => {
            GatewayError::Auth("access token missing or expired".into())
        }
        ClientError::Http(http) => match *http {
            HttpError::StatusCode(response) => {
                let status = response.status().as_u16();
                if status == 401 {
                    GatewayError::Auth(format!("spotify rejected credentials (status {status})"))
                } else {
                    GatewayError::Api {
                        status: Some(status),
                        message: format!("spotify returned status {status}"),
                    }
                }
            }
            HttpError::Client(err) => GatewayError::Api {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            },
        },
        other => GatewayError::api(other.to_string()),
    }
}

fn to_track_ids(track_ids: &[String]) -> Result<Vec<TrackId<'_>>, GatewayError> {
    track_ids
        .iter()
        .map(|id| {
            TrackId::from_id(id.as_str())
                .map_err(|e| GatewayError::validation("track_id", format!("{id}: {e}")))
        })
        .collect()
}

/// Convert a provider track into a [`TrackSummary`], or `None` when the
/// track is missing the fields we consider mandatory.
fn parse_track(track: &FullTrack) -> Option<TrackSummary> {
    let id = track.id.as_ref()?;
    if track.name.is_empty() || track.artists.is_empty() {
        return None;
    }
    Some(TrackSummary {
        track_id: id.id().to_string(),
        title: track.name.clone(),
        artists: track.artists.iter().map(|a| a.name.clone()).collect(),
        album_name: track.album.name.clone(),
        spotify_url: track
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_default(),
        uri: id.uri(),
        preview_url: track.preview_url.clone(),
        cover_image_url: track.album.images.first().map(|img| img.url.clone()),
    })
}

#[async_trait]
impl MusicGateway for SpotifyGateway {
    async fn profile(&self) -> Result<UserProfile, GatewayError> {
        let sp = self.spotify.lock().await;
        let user = sp.me().await.map_err(map_client_error)?;

        let profile = UserProfile {
            user_id: user.id.id().to_string(),
            display_name: user
                .display_name
                .unwrap_or_else(|| "Spotify User".to_string()),
            followers: user.followers.map(|f| f.total).unwrap_or(0),
            profile_image_url: user
                .images
                .as_ref()
                .and_then(|imgs| imgs.first())
                .map(|img| img.url.clone()),
            spotify_url: user.external_urls.get("spotify").cloned(),
        };
        info!("Retrieved profile for user: {}", profile.display_name);
        Ok(profile)
    }

    async fn saved_track_ids(&self, max: usize) -> Result<Vec<String>, GatewayError> {
        let sp = self.spotify.lock().await;
        debug!("Fetching up to {max} saved track ids");

        // Local files and non-track items have no usable id; skip them
        // before counting toward `max`.
        let ids: Vec<String> = sp
            .current_user_saved_tracks(None)
            .map_err(map_client_error)
            .try_filter_map(|saved| async move {
                let track = saved.track;
                if track.is_local {
                    return Ok(None);
                }
                Ok(track.id.map(|id| id.id().to_string()))
            })
            .take(max)
            .try_collect()
            .await?;

        info!("Retrieved {} saved track ids", ids.len());
        Ok(ids)
    }

    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<TrackFeatures>, GatewayError> {
        if track_ids.len() > FEATURES_BATCH_MAX {
            return Err(GatewayError::validation(
                "track_ids",
                format!("cannot request features for more than {FEATURES_BATCH_MAX} tracks"),
            ));
        }
        if track_ids.is_empty() {
            return Ok(vec![]);
        }

        let ids = to_track_ids(track_ids)?;
        let sp = self.spotify.lock().await;
        debug!("Fetching audio features for {} tracks", track_ids.len());

        let features = sp
            .tracks_features(ids)
            .await
            .map_err(map_client_error)?
            .unwrap_or_default();

        Ok(features
            .into_iter()
            .map(|f| TrackFeatures {
                track_id: f.id.id().to_string(),
                valence: Some(f.valence),
                energy: Some(f.energy),
                danceability: Some(f.danceability),
                tempo: Some(f.tempo),
            })
            .collect())
    }

    async fn tracks(&self, track_ids: &[String]) -> Result<Vec<TrackSummary>, GatewayError> {
        if track_ids.len() > TRACKS_BATCH_MAX {
            return Err(GatewayError::validation(
                "track_ids",
                format!("cannot request more than {TRACKS_BATCH_MAX} tracks at once"),
            ));
        }
        if track_ids.is_empty() {
            return Ok(vec![]);
        }

        let ids = to_track_ids(track_ids)?;
        let sp = self.spotify.lock().await;
        debug!("Fetching details for {} tracks", track_ids.len());

        let tracks = sp.tracks(ids, None).await.map_err(map_client_error)?;
        Ok(tracks.iter().filter_map(parse_track).collect())
    }

    async fn search(
        &self,
        query: &str,
        limit: u32,
        market: Option<&str>,
    ) -> Result<Vec<TrackSummary>, GatewayError> {
        if query.trim().is_empty() {
            return Err(GatewayError::validation("query", "search query cannot be empty"));
        }
        if limit > SEARCH_LIMIT_MAX {
            return Err(GatewayError::validation(
                "limit",
                format!("cannot request more than {SEARCH_LIMIT_MAX} search results"),
            ));
        }

        let market = market
            .and_then(parse_market)
            .or(self.default_market)
            .map(Market::Country);

        let sp = self.spotify.lock().await;
        debug!("Searching tracks with query: {query}");

        let result = sp
            .search(query, SearchType::Track, market, None, Some(limit), None)
            .await
            .map_err(map_client_error)?;

        let tracks = match result {
            SearchResult::Tracks(page) => page.items,
            _ => vec![],
        };
        info!("Found {} tracks for query: {query}", tracks.len());
        Ok(tracks.iter().filter_map(parse_track).collect())
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        is_public: bool,
    ) -> Result<Playlist, GatewayError> {
        let user_id = UserId::from_id(owner_id)
            .map_err(|e| GatewayError::validation("owner_id", e.to_string()))?;

        let sp = self.spotify.lock().await;
        debug!("Creating playlist: {name}");

        let created = sp
            .user_playlist_create(
                user_id,
                name,
                Some(is_public),
                Some(false),
                Some(description),
            )
            .await
            .map_err(map_client_error)?;

        info!("Created playlist: {name}");
        Ok(Playlist {
            playlist_id: created.id.id().to_string(),
            name: created.name,
            owner_id: owner_id.to_string(),
            description: description.to_string(),
            is_public,
            spotify_url: created.external_urls.get("spotify").cloned(),
            track_ids: vec![],
        })
    }

    async fn append_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), GatewayError> {
        if track_ids.is_empty() {
            return Err(GatewayError::validation(
                "track_ids",
                "cannot add an empty track list to a playlist",
            ));
        }
        if track_ids.len() > PLAYLIST_APPEND_MAX {
            return Err(GatewayError::validation(
                "track_ids",
                format!("cannot add more than {PLAYLIST_APPEND_MAX} tracks at once"),
            ));
        }

        let pid = PlaylistId::from_id(playlist_id)
            .map_err(|e| GatewayError::validation("playlist_id", e.to_string()))?;
        let items: Vec<PlayableId> = to_track_ids(track_ids)?
            .into_iter()
            .map(PlayableId::Track)
            .collect();

        let sp = self.spotify.lock().await;
        debug!("Adding {} tracks to playlist {playlist_id}", track_ids.len());

        sp.playlist_add_items(pid, items, None)
            .await
            .map_err(map_client_error)?;
        info!("Added {} tracks to playlist", track_ids.len());
        Ok(())
    }
}
