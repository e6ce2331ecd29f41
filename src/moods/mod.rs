use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Audio-feature targets for a named mood.
///
/// - valence (0-1): musical positivity (0 = sad, 1 = happy)
/// - energy (0-1): intensity and activity level
/// - danceability (0-1): how suitable for dancing
/// - tempo (BPM): speed, 60-200
///
/// Bounds are enforced at construction; a `MoodTarget` in hand is always
/// valid and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodTarget {
    pub name: String,
    pub valence: f32,
    pub energy: f32,
    pub danceability: f32,
    pub tempo: u32,
    pub description: String,
}

impl MoodTarget {
    pub fn new(
        name: impl Into<String>,
        valence: f32,
        energy: f32,
        danceability: f32,
        tempo: u32,
        description: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        if !(0.0..=1.0).contains(&valence) {
            return Err(GatewayError::validation(
                "valence",
                format!("must be between 0 and 1, got {valence}"),
            ));
        }
        if !(0.0..=1.0).contains(&energy) {
            return Err(GatewayError::validation(
                "energy",
                format!("must be between 0 and 1, got {energy}"),
            ));
        }
        if !(0.0..=1.0).contains(&danceability) {
            return Err(GatewayError::validation(
                "danceability",
                format!("must be between 0 and 1, got {danceability}"),
            ));
        }
        if !(60..=200).contains(&tempo) {
            return Err(GatewayError::validation(
                "tempo",
                format!("must be between 60 and 200 BPM, got {tempo}"),
            ));
        }
        Ok(MoodTarget {
            name: name.into(),
            valence,
            energy,
            danceability,
            tempo,
            description: description.into(),
        })
    }
}

/// One catalog entry: a mood target plus its ordered search keywords.
/// The keyword order matters — the first keyword seeds catalog searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub target: MoodTarget,
    pub keywords: Vec<String>,
}

/// Ordered, immutable set of moods the rest of the crate works against.
///
/// Built once at startup and injected into the classifier and recommender
/// rather than living as a module-level singleton, so tests can substitute
/// alternative catalogs. Iteration order is insertion order and is the
/// documented tie-break for classification.
#[derive(Debug, Clone)]
pub struct MoodCatalog {
    entries: Vec<MoodEntry>,
}

impl MoodCatalog {
    pub fn new(entries: Vec<MoodEntry>) -> Self {
        MoodCatalog { entries }
    }

    /// The built-in six-mood catalog.
    pub fn default_catalog() -> Self {
        // Validated literals; new() cannot fail for these values.
        let moods = [
            (
                "Happy",
                0.8,
                0.7,
                0.7,
                120,
                "Upbeat and joyful vibes",
                &["happy", "upbeat", "cheerful", "positive", "joyful"][..],
            ),
            (
                "Chill",
                0.5,
                0.3,
                0.4,
                90,
                "Relaxed and mellow tunes",
                &["chill", "relaxed", "mellow", "ambient", "calm"][..],
            ),
            (
                "Focus",
                0.4,
                0.4,
                0.3,
                100,
                "Concentration-enhancing beats",
                &["focus", "study", "concentration", "ambient", "instrumental"][..],
            ),
            (
                "Sad",
                0.2,
                0.3,
                0.3,
                80,
                "Melancholic and introspective",
                &["sad", "melancholy", "emotional", "ballad", "heartbreak"][..],
            ),
            (
                "Hype",
                0.7,
                0.9,
                0.8,
                140,
                "High-energy pump-up tracks",
                &["hype", "energetic", "pump", "party", "workout"][..],
            ),
            (
                "Romantic",
                0.6,
                0.4,
                0.5,
                95,
                "Love songs and sweet melodies",
                &["romantic", "love", "beautiful", "emotional", "sweet"][..],
            ),
        ];

        let entries = moods
            .into_iter()
            .filter_map(|(name, valence, energy, dance, tempo, desc, keywords)| {
                let target = MoodTarget::new(name, valence, energy, dance, tempo, desc).ok()?;
                Some(MoodEntry {
                    target,
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
            })
            .collect();

        MoodCatalog { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoodEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup by mood name.
    pub fn get(&self, name: &str) -> Option<&MoodEntry> {
        self.entries
            .iter()
            .find(|e| e.target.name.eq_ignore_ascii_case(name))
    }

    /// Search keywords for a mood; empty slice when the mood is unknown.
    pub fn keywords(&self, name: &str) -> &[String] {
        self.get(name).map(|e| e.keywords.as_slice()).unwrap_or(&[])
    }
}

impl Default for MoodCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}
