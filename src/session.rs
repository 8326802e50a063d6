//! Session segmentation
//!
//! Partitions a user's chronological drink history into the currently-active
//! session: the trailing run of events with no disqualifying gap between
//! temporal neighbors. A gap disqualifies on its own when it exceeds the
//! session gap threshold, or earlier when activity data shows the subject
//! slept through it. Sessions are derived per query and carry no identity.

use crate::sleep::{self, SleepConfig};
use crate::types::{ActivitySample, DrinkEvent};

/// A break strictly longer than this splits a session on its own.
/// Exactly this long stays continuous.
pub const SESSION_GAP_MINUTES: f64 = 240.0;

/// A shorter break still splits when at least this much sleep is detected
/// inside it
pub const SLEEP_BREAK_MIN_HOURS: f64 = 3.0;

/// Tunable thresholds for session segmentation
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Hard gap threshold, minutes; strictly greater splits
    pub session_gap_minutes: f64,
    /// Minimum detected sleep, hours, for a sub-threshold gap to split
    pub sleep_break_min_hours: f64,
    pub sleep: SleepConfig,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            session_gap_minutes: SESSION_GAP_MINUTES,
            sleep_break_min_hours: SLEEP_BREAK_MIN_HOURS,
            sleep: SleepConfig::default(),
        }
    }
}

/// The currently-active session for `user_id`, from time gaps alone.
pub fn session_drinks(all_drinks: &[DrinkEvent], user_id: &str) -> Vec<DrinkEvent> {
    session_drinks_with_config(all_drinks, user_id, &SegmenterConfig::default())
}

pub fn session_drinks_with_config(
    all_drinks: &[DrinkEvent],
    user_id: &str,
    config: &SegmenterConfig,
) -> Vec<DrinkEvent> {
    let drinks = user_history(all_drinks, user_id);
    for i in (1..drinks.len()).rev() {
        if gap_minutes(&drinks[i - 1], &drinks[i]) > config.session_gap_minutes {
            return drinks[i..].to_vec();
        }
    }
    drinks
}

/// The currently-active session for `user_id`, refined by activity data.
///
/// With no activity samples this is exactly [`session_drinks`]. Otherwise a
/// gap of at least the minimum sleep length also ends the session when the
/// samples inside it show a qualifying sleep; continued activity through a
/// sub-threshold gap never splits.
pub fn session_drinks_with_activity(
    all_drinks: &[DrinkEvent],
    samples: &[ActivitySample],
    user_id: &str,
) -> Vec<DrinkEvent> {
    session_drinks_with_activity_config(all_drinks, samples, user_id, &SegmenterConfig::default())
}

pub fn session_drinks_with_activity_config(
    all_drinks: &[DrinkEvent],
    samples: &[ActivitySample],
    user_id: &str,
    config: &SegmenterConfig,
) -> Vec<DrinkEvent> {
    if samples.is_empty() {
        return session_drinks_with_config(all_drinks, user_id, config);
    }

    let drinks = user_history(all_drinks, user_id);
    for i in (1..drinks.len()).rev() {
        let gap = gap_minutes(&drinks[i - 1], &drinks[i]);
        if gap > config.session_gap_minutes
            || slept_through_gap(&drinks[i - 1], &drinks[i], gap, samples, config)
        {
            return drinks[i..].to_vec();
        }
    }
    drinks
}

/// The user's consumed drinks, oldest first. Templates never participate.
fn user_history(all_drinks: &[DrinkEvent], user_id: &str) -> Vec<DrinkEvent> {
    let mut drinks: Vec<DrinkEvent> = all_drinks
        .iter()
        .filter(|drink| drink.user_id == user_id && !drink.is_template)
        .cloned()
        .collect();
    drinks.sort_by_key(|drink| drink.timestamp);
    drinks
}

fn gap_minutes(earlier: &DrinkEvent, later: &DrinkEvent) -> f64 {
    (later.timestamp - earlier.timestamp).num_milliseconds() as f64 / 60_000.0
}

/// Sleep can only split a gap at least as long as the minimum sleep itself,
/// and only samples timestamped inside the gap are consulted.
fn slept_through_gap(
    earlier: &DrinkEvent,
    later: &DrinkEvent,
    gap_minutes: f64,
    samples: &[ActivitySample],
    config: &SegmenterConfig,
) -> bool {
    if gap_minutes < config.sleep_break_min_hours * 60.0 {
        return false;
    }
    let window: Vec<ActivitySample> = samples
        .iter()
        .filter(|sample| {
            sample.timestamp >= earlier.timestamp && sample.timestamp <= later.timestamp
        })
        .copied()
        .collect();
    sleep::detect_sleep_with_config(&window, config.sleep_break_min_hours, &config.sleep)
        .is_sleeping
}
