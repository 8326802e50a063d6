//! Consumption pacing analysis
//!
//! Classifies how quickly a drink sequence was consumed from the mean gap
//! between consecutive drinks, and derives the multiplicative BAC
//! adjustment for that pacing. Input order is irrelevant; the sequence is
//! sorted internally.

use chrono::{DateTime, Utc};

use crate::types::{DrinkEvent, DrinkingPattern, SpeedAnalysis};

/// Mean-gap classification boundaries, minutes.
///
/// Below `BINGE_GAP_MINUTES` is binge pacing; each following band runs up to
/// and excluding the next boundary, except that a mean of exactly
/// `MODERATE_GAP_MINUTES` still counts as moderate.
pub const BINGE_GAP_MINUTES: f64 = 15.0;
pub const FAST_GAP_MINUTES: f64 = 30.0;
pub const MODERATE_GAP_MINUTES: f64 = 60.0;

/// Gap reported when fewer than two drinks exist
pub const NEUTRAL_GAP_MINUTES: f64 = 60.0;

/// Classify the pacing of a drink sequence.
///
/// Fewer than two drinks yields the neutral default (60 min, moderate,
/// factor 1.0). Classification uses the unrounded mean gap; the reported
/// average is rounded to the nearest minute for display.
pub fn analyze_speed(drinks: &[DrinkEvent]) -> SpeedAnalysis {
    if drinks.len() < 2 {
        return SpeedAnalysis {
            average_minutes_between_drinks: NEUTRAL_GAP_MINUTES,
            speed_factor: DrinkingPattern::Moderate.speed_factor(),
            pattern: DrinkingPattern::Moderate,
        };
    }

    let mut timestamps: Vec<DateTime<Utc>> = drinks.iter().map(|d| d.timestamp).collect();
    timestamps.sort();

    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_milliseconds() as f64 / 60_000.0)
        .collect();
    let mean_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;

    let pattern = classify(mean_gap);
    SpeedAnalysis {
        average_minutes_between_drinks: mean_gap.round(),
        speed_factor: pattern.speed_factor(),
        pattern,
    }
}

fn classify(mean_gap_minutes: f64) -> DrinkingPattern {
    if mean_gap_minutes < BINGE_GAP_MINUTES {
        DrinkingPattern::Binge
    } else if mean_gap_minutes < FAST_GAP_MINUTES {
        DrinkingPattern::Fast
    } else if mean_gap_minutes <= MODERATE_GAP_MINUTES {
        DrinkingPattern::Moderate
    } else {
        DrinkingPattern::Slow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DrinkCategory;
    use chrono::{Duration, TimeZone};

    fn drinks_with_gaps(gaps_minutes: &[i64]) -> Vec<DrinkEvent> {
        let mut timestamp = Utc.with_ymd_and_hms(2024, 6, 21, 20, 0, 0).unwrap();
        let mut drinks = vec![DrinkEvent::new(
            "d0",
            "u",
            DrinkCategory::Beer,
            50.0,
            5.0,
            timestamp,
        )];
        for (index, gap) in gaps_minutes.iter().enumerate() {
            timestamp += Duration::minutes(*gap);
            drinks.push(DrinkEvent::new(
                format!("d{}", index + 1),
                "u",
                DrinkCategory::Beer,
                50.0,
                5.0,
                timestamp,
            ));
        }
        drinks
    }

    #[test]
    fn test_fewer_than_two_drinks_is_neutral() {
        let neutral = analyze_speed(&[]);
        assert_eq!(neutral.average_minutes_between_drinks, 60.0);
        assert_eq!(neutral.speed_factor, 1.0);
        assert_eq!(neutral.pattern, DrinkingPattern::Moderate);

        let single = drinks_with_gaps(&[]);
        assert_eq!(analyze_speed(&single), neutral);
    }

    #[test]
    fn test_binge_classification() {
        // Gaps of 10, 10, 5 average under 15 minutes
        let analysis = analyze_speed(&drinks_with_gaps(&[10, 10, 5]));
        assert_eq!(analysis.pattern, DrinkingPattern::Binge);
        assert_eq!(analysis.speed_factor, 1.4);
    }

    #[test]
    fn test_fast_classification() {
        let analysis = analyze_speed(&drinks_with_gaps(&[25, 25]));
        assert_eq!(analysis.pattern, DrinkingPattern::Fast);
        assert_eq!(analysis.speed_factor, 1.2);
        assert_eq!(analysis.average_minutes_between_drinks, 25.0);
    }

    #[test]
    fn test_moderate_includes_exactly_sixty() {
        let analysis = analyze_speed(&drinks_with_gaps(&[60, 60]));
        assert_eq!(analysis.pattern, DrinkingPattern::Moderate);
        assert_eq!(analysis.speed_factor, 1.0);
    }

    #[test]
    fn test_slow_classification() {
        let analysis = analyze_speed(&drinks_with_gaps(&[90, 75]));
        assert_eq!(analysis.pattern, DrinkingPattern::Slow);
        assert_eq!(analysis.speed_factor, 0.85);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(classify(14.99), DrinkingPattern::Binge);
        assert_eq!(classify(15.0), DrinkingPattern::Fast);
        assert_eq!(classify(29.99), DrinkingPattern::Fast);
        assert_eq!(classify(30.0), DrinkingPattern::Moderate);
        assert_eq!(classify(60.0), DrinkingPattern::Moderate);
        assert_eq!(classify(60.01), DrinkingPattern::Slow);
    }

    #[test]
    fn test_order_independent() {
        let mut drinks = drinks_with_gaps(&[20, 40, 10]);
        let sorted = analyze_speed(&drinks);
        drinks.reverse();
        assert_eq!(analyze_speed(&drinks), sorted);
    }

    #[test]
    fn test_classification_uses_unrounded_mean() {
        // Gaps of 29 and 30 average 29.5: rounds to 30 for display but
        // classifies as fast
        let analysis = analyze_speed(&drinks_with_gaps(&[29, 30]));
        assert_eq!(analysis.average_minutes_between_drinks, 30.0);
        assert_eq!(analysis.pattern, DrinkingPattern::Fast);
    }

    #[test]
    fn test_duplicate_timestamps_do_not_panic() {
        let analysis = analyze_speed(&drinks_with_gaps(&[0, 0]));
        assert_eq!(analysis.pattern, DrinkingPattern::Binge);
        assert_eq!(analysis.average_minutes_between_drinks, 0.0);
    }
}
