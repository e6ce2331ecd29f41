use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::gateway::{
    MusicGateway, TrackFeatures, TrackSummary, FEATURES_BATCH_MAX, SEARCH_LIMIT_MAX,
    TRACKS_BATCH_MAX,
};
use crate::moods::{MoodCatalog, MoodTarget};
use crate::scoring::{rank, score, ScoringProfile};

/// Upper bound on `limit`, matching the provider's search page ceiling.
pub const MAX_RECOMMENDATIONS: usize = 50;

/// How many library tracks to sample for feature analysis.
const LIBRARY_SAMPLE_MAX: usize = 100;

/// The library strategy yields nothing when fewer feature sets than this
/// survive fetching — ranking three tracks against a mood is meaningless.
const MIN_USABLE_FEATURES: usize = 3;

/// Last-resort query when every mood-derived search comes back empty.
const POPULAR_QUERY: &str = "top hits";

/// Which strategy produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    /// Ranked from the caller's candidate pool.
    Library,
    /// Catalog search, re-ranked by feature distance.
    Search,
    /// Unfiltered popular search — no feature ranking was applied.
    Popular,
    /// Every strategy came back empty. A normal outcome, not an error.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub tracks: Vec<TrackSummary>,
    pub source: RecommendationSource,
}

impl Recommendation {
    fn empty() -> Self {
        Recommendation {
            tracks: vec![],
            source: RecommendationSource::Exhausted,
        }
    }

    /// True when the result skipped feature ranking entirely.
    pub fn is_degraded(&self) -> bool {
        self.source == RecommendationSource::Popular
    }
}

/// Mood-to-tracks orchestrator.
///
/// Strategies are attempted in order and the first non-empty result wins:
/// library match (when a candidate pool is supplied), then a catalog-search
/// ladder of decreasing specificity, then an unranked popular search.
/// Gateway failures inside a strategy downgrade to "zero results, next
/// strategy" — for a recommendation surface, showing something beats
/// showing an error. Only a bad `limit` is ever returned as `Err`.
pub struct Recommender<G> {
    gateway: G,
    catalog: MoodCatalog,
    profile: ScoringProfile,
    rng: StdRng,
}

impl<G: MusicGateway> Recommender<G> {
    pub fn new(gateway: G, catalog: MoodCatalog) -> Self {
        Self::with_rng(gateway, catalog, StdRng::from_entropy())
    }

    /// Construct with a caller-supplied random source, so tests can seed
    /// the library sampler deterministically.
    pub fn with_rng(gateway: G, catalog: MoodCatalog, rng: StdRng) -> Self {
        Recommender {
            gateway,
            catalog,
            profile: ScoringProfile::default(),
            rng,
        }
    }

    pub fn with_profile(mut self, profile: ScoringProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Resolve up to `limit` tracks matching `target`.
    ///
    /// `candidate_pool` (typically the user's saved-track ids) enables the
    /// library strategy; it is only attempted when the pool holds at least
    /// `limit` ids. An empty result is a normal outcome the caller must
    /// handle — "no tracks found", not a crash.
    pub async fn recommend(
        &mut self,
        target: &MoodTarget,
        limit: usize,
        candidate_pool: Option<&[String]>,
    ) -> Result<Recommendation, GatewayError> {
        if limit < 1 || limit > MAX_RECOMMENDATIONS {
            return Err(GatewayError::validation(
                "limit",
                format!("must be between 1 and {MAX_RECOMMENDATIONS}, got {limit}"),
            ));
        }

        info!("Getting {limit} recommendations for mood: {}", target.name);

        if let Some(pool) = candidate_pool {
            if pool.len() >= limit {
                let tracks = self.from_library(target, pool, limit).await;
                if !tracks.is_empty() {
                    info!("Matched {} tracks from library", tracks.len());
                    return Ok(Recommendation {
                        tracks,
                        source: RecommendationSource::Library,
                    });
                }
                warn!(
                    "Library strategy yielded nothing for {}; falling back to search",
                    target.name
                );
            }
        }

        self.from_search(target, limit).await
    }

    /// Strategy 1: rank a random sample of the caller's pool by feature
    /// distance and return the closest `limit` tracks.
    async fn from_library(
        &mut self,
        target: &MoodTarget,
        pool: &[String],
        limit: usize,
    ) -> Vec<TrackSummary> {
        let sample_size = LIBRARY_SAMPLE_MAX.min(pool.len());
        let sample: Vec<String> = pool
            .choose_multiple(&mut self.rng, sample_size)
            .cloned()
            .collect();
        debug!("Sampling {sample_size} of {} pool tracks", pool.len());

        let features = self.fetch_features_lenient(&sample).await;
        if features.len() < MIN_USABLE_FEATURES {
            warn!(
                "Only {} usable feature sets from library sample (need {MIN_USABLE_FEATURES})",
                features.len()
            );
            return vec![];
        }

        let scores: Vec<f32> = features
            .iter()
            .map(|f| score(Some(f), target, self.profile))
            .collect();
        let best_ids: Vec<String> = rank(&scores, limit)
            .into_iter()
            .map(|i| features[i].track_id.clone())
            .collect();

        self.fetch_summaries_lenient(&best_ids).await
    }

    /// Strategy 2: search ladder of decreasing specificity, then the
    /// unranked popular fallback.
    async fn from_search(
        &self,
        target: &MoodTarget,
        limit: usize,
    ) -> Result<Recommendation, GatewayError> {
        // Request extra results so feature-based filtering has room.
        let fetch = (limit * 3).min(SEARCH_LIMIT_MAX as usize) as u32;

        for query in self.search_queries(target) {
            match self.gateway.search(&query, fetch, None).await {
                Ok(found) if !found.is_empty() => {
                    info!("Found {} tracks with query: {query}", found.len());
                    let tracks = self.rerank(target, found, limit).await;
                    return Ok(Recommendation {
                        tracks,
                        source: RecommendationSource::Search,
                    });
                }
                Ok(_) => debug!("No results for query: {query}"),
                Err(e) => warn!("Search failed for query '{query}': {e}"),
            }
        }

        // Last resort: whatever is popular, in search order. The caller
        // sees this flagged as degraded.
        match self.gateway.search(POPULAR_QUERY, fetch, None).await {
            Ok(mut found) if !found.is_empty() => {
                warn!("Falling back to unranked popular tracks for {}", target.name);
                found.truncate(limit);
                Ok(Recommendation {
                    tracks: found,
                    source: RecommendationSource::Popular,
                })
            }
            Ok(_) => Ok(Recommendation::empty()),
            Err(e) => {
                warn!("Popular fallback failed: {e}");
                Ok(Recommendation::empty())
            }
        }
    }

    /// The three mood-derived query variants, most specific first. The year
    /// window follows energy: high-energy moods skew recent.
    fn search_queries(&self, target: &MoodTarget) -> Vec<String> {
        let keywords = self.catalog.keywords(&target.name);
        let primary = keywords.first().map(|s| s.as_str()).unwrap_or("pop");

        let year_window = if target.energy > 0.7 {
            "2020-2025"
        } else if target.energy > 0.4 {
            "2015-2025"
        } else {
            "2010-2025"
        };

        vec![
            format!("{primary} year:{year_window}"),
            primary.to_string(),
            target.name.to_lowercase(),
        ]
    }

    /// Re-rank search results by feature distance. Feature fetching is
    /// best-effort: candidates whose features cannot be fetched score
    /// INFINITY and keep their search order behind every scored candidate.
    async fn rerank(
        &self,
        target: &MoodTarget,
        found: Vec<TrackSummary>,
        limit: usize,
    ) -> Vec<TrackSummary> {
        let ids: Vec<String> = found.iter().map(|t| t.track_id.clone()).collect();
        let features = self.fetch_features_lenient(&ids).await;
        let by_id: HashMap<&str, &TrackFeatures> = features
            .iter()
            .map(|f| (f.track_id.as_str(), f))
            .collect();

        let scores: Vec<f32> = found
            .iter()
            .map(|t| score(by_id.get(t.track_id.as_str()).copied(), target, self.profile))
            .collect();

        rank(&scores, limit)
            .into_iter()
            .map(|i| found[i].clone())
            .collect()
    }

    /// Fetch features in provider-sized batches. A failed batch falls back
    /// to one retry per id; ids that still fail are skipped. One bad track
    /// must not sink the whole request.
    async fn fetch_features_lenient(&self, track_ids: &[String]) -> Vec<TrackFeatures> {
        let mut features = Vec::new();

        for batch in track_ids.chunks(FEATURES_BATCH_MAX) {
            match self.gateway.audio_features(batch).await {
                Ok(mut got) => features.append(&mut got),
                Err(e) => {
                    warn!("Feature batch failed ({e}); retrying tracks individually");
                    for id in batch {
                        if let Ok(mut got) =
                            self.gateway.audio_features(std::slice::from_ref(id)).await
                        {
                            features.append(&mut got);
                        }
                    }
                }
            }
        }

        features
    }

    /// Fetch summaries in provider-sized batches; failed batches are
    /// dropped rather than retried.
    async fn fetch_summaries_lenient(&self, track_ids: &[String]) -> Vec<TrackSummary> {
        let mut tracks = Vec::new();

        for batch in track_ids.chunks(TRACKS_BATCH_MAX) {
            match self.gateway.tracks(batch).await {
                Ok(mut got) => tracks.append(&mut got),
                Err(e) => warn!("Track detail batch failed: {e}"),
            }
        }

        tracks
    }
}
