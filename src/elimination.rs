//! Linear alcohol elimination
//!
//! Applies constant-rate hepatic elimination to a set of dated drink events
//! to compute the units still unmetabolized at a reference time. The
//! reference time is always an explicit parameter; nothing here reads a
//! clock.

use chrono::{DateTime, Utc};

use crate::types::DrinkEvent;
use crate::units::round2;

/// Average hepatic elimination rate, units per hour
pub const ELIMINATION_RATE_UNITS_PER_HOUR: f64 = 0.15;

/// Units still unmetabolized at `as_of`.
///
/// Each event decays independently: `max(0, units - hours_elapsed × rate)`.
/// Elapsed time is not clamped at zero, so an event dated after `as_of`
/// temporarily counts for more than its stored units until time catches up;
/// the per-event floor still applies. Events whose stored `units` is
/// non-finite or negative count as zero. The total is rounded to two
/// decimals.
pub fn remaining_units(events: &[DrinkEvent], as_of: DateTime<Utc>) -> f64 {
    let total: f64 = events
        .iter()
        .map(|event| remaining_for(event, as_of))
        .sum();
    round2(total)
}

fn remaining_for(event: &DrinkEvent, as_of: DateTime<Utc>) -> f64 {
    let units = if event.units.is_finite() && event.units >= 0.0 {
        event.units
    } else {
        0.0
    };
    let hours_elapsed = (as_of - event.timestamp).num_milliseconds() as f64 / 3_600_000.0;
    (units - hours_elapsed * ELIMINATION_RATE_UNITS_PER_HOUR).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DrinkCategory;
    use chrono::{Duration, TimeZone};

    fn drink_at(timestamp: DateTime<Utc>, volume_cl: f64, strength_percent: f64) -> DrinkEvent {
        DrinkEvent::new(
            "d",
            "u",
            DrinkCategory::Beer,
            volume_cl,
            strength_percent,
            timestamp,
        )
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, 22, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(remaining_units(&[], base_time()), 0.0);
    }

    #[test]
    fn test_linear_decay() {
        let consumed = base_time();
        // 2.00 units, two hours later: 2.0 - 2 * 0.15 = 1.70
        let events = vec![drink_at(consumed, 50.0, 5.0)];
        assert_eq!(remaining_units(&events, consumed + Duration::hours(2)), 1.7);
    }

    #[test]
    fn test_per_event_floor() {
        let consumed = base_time();
        // 2.00 units fully eliminated after 2.0 / 0.15 ~ 13.3 hours
        let events = vec![drink_at(consumed, 50.0, 5.0)];
        assert_eq!(remaining_units(&events, consumed + Duration::hours(24)), 0.0);
    }

    #[test]
    fn test_floor_applies_per_event_not_per_total() {
        let consumed = base_time();
        // One old fully-eliminated drink must not eat into a fresh one
        let events = vec![
            drink_at(consumed - Duration::hours(24), 50.0, 5.0),
            drink_at(consumed, 50.0, 5.0),
        ];
        assert_eq!(remaining_units(&events, consumed), 2.0);
    }

    #[test]
    fn test_non_increasing_over_time() {
        let consumed = base_time();
        let events = vec![
            drink_at(consumed, 50.0, 5.0),
            drink_at(consumed + Duration::minutes(30), 4.0, 40.0),
        ];
        let mut previous = f64::INFINITY;
        for hours in 1..=16 {
            let remaining = remaining_units(&events, consumed + Duration::hours(hours));
            assert!(remaining <= previous);
            assert!(remaining >= 0.0);
            previous = remaining;
        }
    }

    #[test]
    fn test_future_event_is_not_clamped() {
        let as_of = base_time();
        // Dated one hour ahead: 2.0 - (-1.0 * 0.15) = 2.15
        let events = vec![drink_at(as_of + Duration::hours(1), 50.0, 5.0)];
        assert_eq!(remaining_units(&events, as_of), 2.15);
    }

    #[test]
    fn test_corrupt_units_count_as_zero() {
        let consumed = base_time();
        let mut event = drink_at(consumed, 50.0, 5.0);
        event.units = f64::NAN;
        assert_eq!(remaining_units(&[event], consumed), 0.0);

        let mut event = drink_at(consumed, 50.0, 5.0);
        event.units = -3.0;
        assert_eq!(remaining_units(&[event], consumed), 0.0);
    }

    #[test]
    fn test_total_is_rounded() {
        let consumed = base_time();
        let events = vec![drink_at(consumed, 33.0, 4.7)];
        let remaining = remaining_units(&events, consumed + Duration::minutes(10));
        assert_eq!(remaining, (remaining * 100.0).round() / 100.0);
    }
}
