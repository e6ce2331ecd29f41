use tracing::info;

use crate::error::GatewayError;
use crate::gateway::{MusicGateway, Playlist, TrackSummary, PLAYLIST_APPEND_MAX};

/// Prefix for playlists this crate creates.
const PLAYLIST_NAME_PREFIX: &str = "Moodmix";

/// Persists a recommendation list as a private playlist.
///
/// Unlike the recommender's best-effort feature batches, playlist writes
/// are user-visible mutations: every gateway failure here propagates to
/// the caller verbatim instead of being swallowed.
pub struct PlaylistExporter<G> {
    gateway: G,
}

impl<G: MusicGateway> PlaylistExporter<G> {
    pub fn new(gateway: G) -> Self {
        PlaylistExporter { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Create a private playlist named after the mood and append all
    /// `tracks` in provider-sized batches. Duplicate track ids are
    /// collapsed before appending.
    pub async fn export(
        &self,
        owner_id: &str,
        mood_name: &str,
        tracks: &[TrackSummary],
    ) -> Result<Playlist, GatewayError> {
        if tracks.is_empty() {
            return Err(GatewayError::validation(
                "tracks",
                "cannot create a playlist with no tracks",
            ));
        }

        let name = format!("{PLAYLIST_NAME_PREFIX} – {mood_name}");
        let description =
            format!("Tracks recommended by {PLAYLIST_NAME_PREFIX} for {mood_name} mood");
        info!("Creating playlist: {name}");

        let mut playlist = self
            .gateway
            .create_playlist(owner_id, &name, &description, false)
            .await?;

        let mut track_ids: Vec<String> = Vec::with_capacity(tracks.len());
        for track in tracks {
            if !track_ids.contains(&track.track_id) {
                track_ids.push(track.track_id.clone());
            }
        }

        for batch in track_ids.chunks(PLAYLIST_APPEND_MAX) {
            self.gateway
                .append_tracks(&playlist.playlist_id, batch)
                .await?;
            for id in batch {
                playlist.add_track(id.clone());
            }
        }

        info!("Created playlist with {} tracks", playlist.track_count());
        Ok(playlist)
    }
}
