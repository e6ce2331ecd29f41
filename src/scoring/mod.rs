use crate::gateway::TrackFeatures;
use crate::moods::MoodTarget;

/// Neutral midpoints used when a candidate is missing a feature field.
/// A track with partial data is still rankable, just without a penalty
/// or bonus on the missing dimension.
const NEUTRAL_LEVEL: f32 = 0.5;
const NEUTRAL_TEMPO: f32 = 120.0;

/// Weight profile for the distance sum.
///
/// Two variants exist in the product history; `Standard` is the canonical
/// one. `Strict` leans harder on energy and is gentler on tempo, which
/// suits filtering broad catalog-search results where energy is the main
/// discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringProfile {
    #[default]
    Standard,
    Strict,
}

impl ScoringProfile {
    fn weights(self) -> (f32, f32, f32, f32) {
        // (valence, energy, danceability, tempo divisor)
        match self {
            ScoringProfile::Standard => (2.0, 1.5, 1.5, 100.0),
            ScoringProfile::Strict => (2.0, 2.0, 1.5, 200.0),
        }
    }
}

/// Weighted absolute-difference distance between a candidate's features and
/// a mood target. Lower is better; 0.0 is a perfect match.
///
/// `None` (no features at all) scores `f32::INFINITY`, which guarantees
/// such candidates sort behind every candidate with a finite score.
pub fn score(
    candidate: Option<&TrackFeatures>,
    target: &MoodTarget,
    profile: ScoringProfile,
) -> f32 {
    let Some(features) = candidate else {
        return f32::INFINITY;
    };

    let (w_valence, w_energy, w_dance, tempo_div) = profile.weights();

    let valence = features.valence.unwrap_or(NEUTRAL_LEVEL);
    let energy = features.energy.unwrap_or(NEUTRAL_LEVEL);
    let danceability = features.danceability.unwrap_or(NEUTRAL_LEVEL);
    let tempo = features.tempo.unwrap_or(NEUTRAL_TEMPO);

    (valence - target.valence).abs() * w_valence
        + (energy - target.energy).abs() * w_energy
        + (danceability - target.danceability).abs() * w_dance
        + (tempo - target.tempo as f32).abs() / tempo_div
}

/// Stable ascending rank over `(index-into-items, score)` pairs.
///
/// Returns the indices of the best `limit` items. Ties (and the INFINITY
/// sentinel) preserve input order, so unusable candidates only ever fill
/// trailing slots once every finite-scored candidate is taken.
pub fn rank(scores: &[f32], limit: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(limit);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moods::MoodCatalog;

    fn happy() -> MoodTarget {
        MoodCatalog::default_catalog()
            .get("Happy")
            .unwrap()
            .target
            .clone()
    }

    fn features(valence: f32, energy: f32, dance: f32, tempo: f32) -> TrackFeatures {
        TrackFeatures {
            track_id: "t".into(),
            valence: Some(valence),
            energy: Some(energy),
            danceability: Some(dance),
            tempo: Some(tempo),
        }
    }

    #[test]
    fn test_exact_match_scores_zero() {
        let target = happy();
        let exact = features(0.8, 0.7, 0.7, 120.0);
        assert_eq!(score(Some(&exact), &target, ScoringProfile::Standard), 0.0);
        assert_eq!(score(Some(&exact), &target, ScoringProfile::Strict), 0.0);
    }

    #[test]
    fn test_score_is_symmetric_around_target() {
        let target = happy();
        let above = features(0.9, 0.8, 0.8, 130.0);
        let below = features(0.7, 0.6, 0.6, 110.0);
        let a = score(Some(&above), &target, ScoringProfile::Standard);
        let b = score(Some(&below), &target, ScoringProfile::Standard);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_score_monotonic_in_each_feature() {
        let target = happy();
        let near = features(0.75, 0.7, 0.7, 120.0);
        let far = features(0.2, 0.7, 0.7, 120.0);
        assert!(
            score(Some(&near), &target, ScoringProfile::Standard)
                < score(Some(&far), &target, ScoringProfile::Standard)
        );

        let slow = features(0.8, 0.7, 0.7, 80.0);
        let slower = features(0.8, 0.7, 0.7, 60.0);
        assert!(
            score(Some(&slow), &target, ScoringProfile::Standard)
                < score(Some(&slower), &target, ScoringProfile::Standard)
        );
    }

    #[test]
    fn test_missing_fields_default_to_midpoints() {
        let target = happy();
        let partial = TrackFeatures {
            track_id: "t".into(),
            valence: None,
            energy: None,
            danceability: None,
            tempo: None,
        };
        let filled = features(0.5, 0.5, 0.5, 120.0);
        let a = score(Some(&partial), &target, ScoringProfile::Standard);
        let b = score(Some(&filled), &target, ScoringProfile::Standard);
        assert!((a - b).abs() < 1e-6);
        assert!(a.is_finite());
    }

    #[test]
    fn test_absent_candidate_scores_infinity() {
        let target = happy();
        assert_eq!(score(None, &target, ScoringProfile::Standard), f32::INFINITY);
    }

    #[test]
    fn test_profiles_diverge_on_energy_and_tempo() {
        let target = happy();
        let off_energy = features(0.8, 0.3, 0.7, 120.0);
        let std_score = score(Some(&off_energy), &target, ScoringProfile::Standard);
        let strict_score = score(Some(&off_energy), &target, ScoringProfile::Strict);
        // Strict weighs the 0.4 energy gap at 2.0 instead of 1.5.
        assert!((std_score - 0.6).abs() < 1e-6);
        assert!((strict_score - 0.8).abs() < 1e-6);

        let off_tempo = features(0.8, 0.7, 0.7, 170.0);
        let std_tempo = score(Some(&off_tempo), &target, ScoringProfile::Standard);
        let strict_tempo = score(Some(&off_tempo), &target, ScoringProfile::Strict);
        assert!((std_tempo - 0.5).abs() < 1e-6);
        assert!((strict_tempo - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_rank_is_stable_and_keeps_infinity_last() {
        let scores = [1.0, f32::INFINITY, 0.5, 1.0, f32::INFINITY];
        let top = rank(&scores, 4);
        assert_eq!(top, vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let scores = [3.0, 1.0, 2.0];
        assert_eq!(rank(&scores, 2), vec![1, 2]);
        assert_eq!(rank(&scores, 10), vec![1, 2, 0]);
    }
}
