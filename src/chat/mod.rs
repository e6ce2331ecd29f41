use tracing::debug;

use crate::moods::{MoodCatalog, MoodTarget};

/// Classification result: the resolved target plus a human-readable line
/// the chat front end can echo back ("Picked Focus because ...").
#[derive(Debug, Clone)]
pub struct MoodMatch {
    pub target: MoodTarget,
    pub explanation: String,
}

/// Keyword-containment mood detector for free-text chat input.
///
/// Not NLP — every step is case-insensitive substring containment against
/// fixed tables, resolved in a documented order:
/// 1. activity table, first match wins (table order is the tie-break)
/// 2. per-mood keyword hit count, catalog order breaks ties
/// 3. generic intent phrases (energy up / energy down)
/// 4. fall back to the catalog's first mood ("Happy" in the default set)
pub struct MoodClassifier {
    catalog: MoodCatalog,
    /// Ordered (activity phrase, mood name) pairs.
    activities: Vec<(String, String)>,
    energy_up: Vec<String>,
    energy_down: Vec<String>,
}

/// Default activity table, scanned in this order.
const DEFAULT_ACTIVITIES: &[(&str, &str)] = &[
    ("workout", "Hype"),
    ("gym", "Hype"),
    ("exercise", "Hype"),
    ("running", "Hype"),
    ("study", "Focus"),
    ("studying", "Focus"),
    ("homework", "Focus"),
    ("coding", "Focus"),
    ("reading", "Focus"),
    ("working", "Focus"),
    ("party", "Hype"),
    ("dancing", "Hype"),
    ("sleep", "Chill"),
    ("meditat", "Chill"),
    ("yoga", "Chill"),
    ("relaxing", "Chill"),
    ("dinner", "Romantic"),
    ("date night", "Romantic"),
    ("cleaning", "Happy"),
    ("cooking", "Happy"),
];

const ENERGY_UP_PHRASES: &[&str] = &["more energy", "faster", "pump it up", "turn it up"];
const ENERGY_DOWN_PHRASES: &[&str] = &["slower", "calmer", "wind down", "tone it down"];

const FALLBACK_MOOD: &str = "Happy";

impl MoodClassifier {
    /// The catalog must be non-empty; `classify` always answers with one of
    /// its moods.
    pub fn new(catalog: MoodCatalog) -> Self {
        MoodClassifier {
            catalog,
            activities: DEFAULT_ACTIVITIES
                .iter()
                .map(|(a, m)| (a.to_string(), m.to_string()))
                .collect(),
            energy_up: ENERGY_UP_PHRASES.iter().map(|p| p.to_string()).collect(),
            energy_down: ENERGY_DOWN_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Replace the activity table (entries scanned in the given order).
    pub fn with_activities(mut self, activities: Vec<(String, String)>) -> Self {
        self.activities = activities;
        self
    }

    pub fn catalog(&self) -> &MoodCatalog {
        &self.catalog
    }

    /// Map free text onto the mood vocabulary. Never fails; unrecognized
    /// input falls back to "Happy" with a "no mood detected" explanation.
    pub fn classify(&self, text: &str) -> MoodMatch {
        let lowered = text.to_lowercase();

        // Step 1: activity lookup, first match in table order wins.
        for (activity, mood_name) in &self.activities {
            if lowered.contains(activity.as_str()) {
                if let Some(entry) = self.catalog.get(mood_name) {
                    debug!("Activity '{activity}' matched mood {mood_name}");
                    return MoodMatch {
                        target: entry.target.clone(),
                        explanation: format!(
                            "Picked {} because you mentioned \"{activity}\"",
                            entry.target.name
                        ),
                    };
                }
            }
        }

        // Step 2: keyword hit count per mood; catalog order breaks ties.
        let mut best: Option<(usize, &crate::moods::MoodEntry)> = None;
        for entry in self.catalog.iter() {
            let hits = entry
                .keywords
                .iter()
                .filter(|kw| lowered.contains(kw.as_str()))
                .count();
            if hits > 0 && best.map(|(h, _)| hits > h).unwrap_or(true) {
                best = Some((hits, entry));
            }
        }
        if let Some((hits, entry)) = best {
            debug!("Keyword match: {} ({hits} hits)", entry.target.name);
            return MoodMatch {
                target: entry.target.clone(),
                explanation: format!(
                    "Picked {} from {hits} matching keyword{}",
                    entry.target.name,
                    if hits == 1 { "" } else { "s" }
                ),
            };
        }

        // Step 3: generic intent.
        if self.energy_up.iter().any(|p| lowered.contains(p.as_str())) {
            if let Some(entry) = self.catalog.get("Hype") {
                return MoodMatch {
                    target: entry.target.clone(),
                    explanation: "Sounds like you want more energy — going with Hype".into(),
                };
            }
        }
        if self.energy_down.iter().any(|p| lowered.contains(p.as_str())) {
            if let Some(entry) = self.catalog.get("Chill") {
                return MoodMatch {
                    target: entry.target.clone(),
                    explanation: "Sounds like you want to slow things down — going with Chill"
                        .into(),
                };
            }
        }

        // Step 4: default.
        let entry = self
            .catalog
            .get(FALLBACK_MOOD)
            .or_else(|| self.catalog.iter().next())
            .expect("catalog must not be empty");
        MoodMatch {
            target: entry.target.clone(),
            explanation: format!(
                "No mood detected in your message — defaulting to {}",
                entry.target.name
            ),
        }
    }
}

/// Lead-in phrases that signal an artist name follows, scanned in order.
const ARTIST_LEAD_INS: &[&str] = &[
    "songs by ",
    "music by ",
    "tracks by ",
    "something by ",
    "anything by ",
    "play ",
];

/// Words that terminate an artist name early.
const ARTIST_STOP_WORDS: &[&str] = &[
    "songs", "music", "tracks", "please", "now", "tonight", "playlist", "mix",
];

/// Best-effort artist extraction from chat text.
///
/// Takes up to 4 words after the first lead-in phrase found, stopping early
/// at a stop-word. Heuristic by design: it can misparse, and callers should
/// treat the result as a search hint rather than ground truth.
pub fn extract_artist(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();

    for lead_in in ARTIST_LEAD_INS {
        let Some(pos) = lowered.find(lead_in) else {
            continue;
        };
        // Offsets come from the lowercased copy; guard the slice in case
        // lowercasing shifted byte positions (non-ASCII input).
        let Some(rest) = text.get(pos + lead_in.len()..) else {
            continue;
        };

        let mut words = Vec::new();
        for word in rest.split_whitespace().take(4) {
            let cleaned = word.trim_matches(|c: char| c.is_ascii_punctuation());
            if cleaned.is_empty() {
                break;
            }
            if ARTIST_STOP_WORDS.contains(&cleaned.to_lowercase().as_str()) {
                break;
            }
            words.push(cleaned);
        }

        if !words.is_empty() {
            return Some(words.join(" "));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> MoodClassifier {
        MoodClassifier::new(MoodCatalog::default_catalog())
    }

    #[test]
    fn test_activity_match_beats_keywords() {
        // "workout" is both an activity (→ Hype) and a Hype keyword, but
        // the activity table must answer first.
        let m = classifier().classify("I need workout music");
        assert_eq!(m.target.name, "Hype");
        assert!(m.explanation.contains("workout"));
    }

    #[test]
    fn test_study_activity_wins_over_chill_keyword() {
        // "chill" scores as a Chill keyword, but "study" hits the activity
        // table first; the documented first-match rule pins this to Focus.
        let m = classifier().classify("something chill to study to");
        assert_eq!(m.target.name, "Focus");
    }

    #[test]
    fn test_keyword_count_picks_best_mood() {
        let m = classifier().classify("give me sad emotional heartbreak ballads");
        assert_eq!(m.target.name, "Sad");
    }

    #[test]
    fn test_keyword_tie_breaks_by_catalog_order() {
        // "emotional" is a keyword of both Sad and Romantic; Sad comes
        // first in the catalog.
        let m = classifier().classify("something emotional");
        assert_eq!(m.target.name, "Sad");
    }

    #[test]
    fn test_generic_intent_more_energy() {
        let m = classifier().classify("more energy please");
        assert_eq!(m.target.name, "Hype");
    }

    #[test]
    fn test_generic_intent_slower() {
        let m = classifier().classify("a bit slower");
        assert_eq!(m.target.name, "Chill");
    }

    #[test]
    fn test_gibberish_defaults_to_happy() {
        let m = classifier().classify("asdfqwerty");
        assert_eq!(m.target.name, "Happy");
        assert!(m.explanation.contains("No mood detected"));
    }

    #[test]
    fn test_extract_artist_songs_by() {
        assert_eq!(
            extract_artist("play songs by Tame Impala please"),
            Some("Tame Impala".to_string())
        );
    }

    #[test]
    fn test_extract_artist_stops_at_stop_word() {
        assert_eq!(
            extract_artist("music by Daft Punk songs tonight"),
            Some("Daft Punk".to_string())
        );
    }

    #[test]
    fn test_extract_artist_caps_at_four_words() {
        assert_eq!(
            extract_artist("something by The Tallest Man On Earth"),
            Some("The Tallest Man On".to_string())
        );
    }

    #[test]
    fn test_extract_artist_none_without_lead_in() {
        assert_eq!(extract_artist("I want something upbeat"), None);
    }
}
