//! Mood-based track recommendation engine over the Spotify Web API.
//!
//! The crate maps named moods ("Happy", "Chill", ...) to target
//! audio-feature vectors and resolves them into tracks, either by ranking
//! a user's library against the target or by mood-keyword catalog search
//! with feature-distance filtering. UI rendering, session state and the
//! OAuth dance are the embedding application's job; this crate starts at
//! an authenticated client handle.
//!
//! ```no_run
//! use moodmix::{MoodCatalog, MoodClassifier, Recommender, SpotifyGateway};
//! # async fn demo(client: std::sync::Arc<tokio::sync::Mutex<rspotify::AuthCodePkceSpotify>>) -> anyhow::Result<()> {
//! let catalog = MoodCatalog::default_catalog();
//! let matched = MoodClassifier::new(catalog.clone()).classify("I need workout music");
//!
//! let gateway = SpotifyGateway::new(client);
//! let mut recommender = Recommender::new(gateway, catalog);
//! let result = recommender.recommend(&matched.target, 10, None).await?;
//! for track in &result.tracks {
//!     println!("{} – {}", track.title, track.artist_line());
//! }
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod moods;
pub mod playlist;
pub mod recommend;
pub mod scoring;

pub use chat::{extract_artist, MoodClassifier, MoodMatch};
pub use config::Config;
pub use error::GatewayError;
pub use gateway::{
    build_client, MusicGateway, Playlist, SpotifyGateway, TrackFeatures, TrackSummary, UserProfile,
};
pub use moods::{MoodCatalog, MoodEntry, MoodTarget};
pub use playlist::PlaylistExporter;
pub use recommend::{Recommendation, RecommendationSource, Recommender, MAX_RECOMMENDATIONS};
pub use scoring::{score, ScoringProfile};
