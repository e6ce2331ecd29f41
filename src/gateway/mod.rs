use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub mod spotify;

pub use spotify::{build_client, SpotifyGateway};

/// Hard per-request ceilings enforced by the Spotify Web API.
pub const FEATURES_BATCH_MAX: usize = 100;
pub const TRACKS_BATCH_MAX: usize = 50;
pub const SEARCH_LIMIT_MAX: u32 = 50;
pub const PLAYLIST_APPEND_MAX: usize = 100;

/// Current user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub followers: u32,
    pub profile_image_url: Option<String>,
    pub spotify_url: Option<String>,
}

/// Audio-analysis features for one track. Individual fields may be absent
/// when the provider has no analysis for that dimension; the scorer
/// substitutes neutral midpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    pub track_id: String,
    pub valence: Option<f32>,
    pub energy: Option<f32>,
    pub danceability: Option<f32>,
    pub tempo: Option<f32>,
}

/// Essential track metadata, decoupled from the provider's response shape.
/// Features and summaries for the same track_id are fetched independently
/// and either may be missing without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track_id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album_name: String,
    pub spotify_url: String,
    pub uri: String,
    pub preview_url: Option<String>,
    pub cover_image_url: Option<String>,
}

impl TrackSummary {
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// A playlist owned by the caller's session. Mutable: tracks are appended
/// after creation. Duplicates are not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub playlist_id: String,
    pub name: String,
    pub owner_id: String,
    pub description: String,
    pub is_public: bool,
    pub spotify_url: Option<String>,
    pub track_ids: Vec<String>,
}

impl Playlist {
    pub fn add_track(&mut self, track_id: impl Into<String>) {
        let track_id = track_id.into();
        if !self.track_ids.contains(&track_id) {
            self.track_ids.push(track_id);
        }
    }

    pub fn track_count(&self) -> usize {
        self.track_ids.len()
    }
}

/// Capability interface over the music provider.
///
/// The recommender and exporter only ever talk to this trait; the
/// production implementation is [`SpotifyGateway`], tests substitute a
/// scripted mock. Every operation fails with a [`GatewayError`] — raw
/// provider error types never cross this boundary.
#[async_trait]
pub trait MusicGateway: Send + Sync {
    /// Current user's profile. Fails with `Auth` on invalid or expired
    /// credentials.
    async fn profile(&self) -> Result<UserProfile, GatewayError>;

    /// Up to `max` saved-track ids, newest first. Local files and
    /// non-track items (podcast episodes) are excluded.
    async fn saved_track_ids(&self, max: usize) -> Result<Vec<String>, GatewayError>;

    /// Audio features for up to [`FEATURES_BATCH_MAX`] tracks. Tracks
    /// without features are omitted from the result.
    async fn audio_features(&self, track_ids: &[String])
        -> Result<Vec<TrackFeatures>, GatewayError>;

    /// Full summaries for up to [`TRACKS_BATCH_MAX`] tracks. Missing or
    /// malformed tracks are omitted.
    async fn tracks(&self, track_ids: &[String]) -> Result<Vec<TrackSummary>, GatewayError>;

    /// Track search. `limit` is capped at [`SEARCH_LIMIT_MAX`]; `market`
    /// is an ISO 3166-1 alpha-2 country code.
    async fn search(
        &self,
        query: &str,
        limit: u32,
        market: Option<&str>,
    ) -> Result<Vec<TrackSummary>, GatewayError>;

    /// Create an (initially empty) playlist for `owner_id`.
    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        is_public: bool,
    ) -> Result<Playlist, GatewayError>;

    /// Append up to [`PLAYLIST_APPEND_MAX`] tracks. Fails with a
    /// validation error on an empty list.
    async fn append_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_add_track_skips_duplicates() {
        let mut playlist = Playlist {
            playlist_id: "pl1".into(),
            name: "Moodmix – Happy".into(),
            owner_id: "user1".into(),
            description: String::new(),
            is_public: false,
            spotify_url: None,
            track_ids: vec![],
        };
        playlist.add_track("a");
        playlist.add_track("b");
        playlist.add_track("a");
        assert_eq!(playlist.track_count(), 2);
        assert_eq!(playlist.track_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_artist_line_joins_names() {
        let track = TrackSummary {
            track_id: "t1".into(),
            title: "Song".into(),
            artists: vec!["A".into(), "B".into()],
            album_name: "Album".into(),
            spotify_url: String::new(),
            uri: String::new(),
            preview_url: None,
            cover_image_url: None,
        };
        assert_eq!(track.artist_line(), "A, B");
    }
}
