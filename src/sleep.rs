//! Sleep detection from activity samples
//!
//! Decides whether the subject is in a sustained low-activity state by
//! scanning step samples from the most recent one backward. The thresholds
//! are heuristics tuned for a nightlife context, not calibrated physiology,
//! and are overridable through [`SleepConfig`].

use chrono::{DateTime, Utc};

use crate::types::{ActivitySample, SleepCheck};

/// Steps per sampling interval below which an interval counts as inactive
pub const LOW_ACTIVITY_STEP_THRESHOLD: f64 = 20.0;

/// Largest gap between consecutive samples that still counts as contiguous.
/// Samples nominally arrive every 10 minutes; a larger hole means the
/// counter was off and nothing can be said about the interval.
pub const MAX_SAMPLE_GAP_MINUTES: f64 = 30.0;

/// Fallback minimum sleep length when the caller passes a non-finite value
pub const DEFAULT_MIN_SLEEP_HOURS: f64 = 3.0;

/// Tunable sleep-detection thresholds
#[derive(Debug, Clone)]
pub struct SleepConfig {
    pub low_activity_step_threshold: f64,
    pub max_sample_gap_minutes: f64,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            low_activity_step_threshold: LOW_ACTIVITY_STEP_THRESHOLD,
            max_sample_gap_minutes: MAX_SAMPLE_GAP_MINUTES,
        }
    }
}

/// Detect sleep with the default thresholds.
pub fn detect_sleep(samples: &[ActivitySample], min_hours: f64) -> SleepCheck {
    detect_sleep_with_config(samples, min_hours, &SleepConfig::default())
}

/// Detect sleep over an activity window.
///
/// Walks the interpretable samples from the most recent backward,
/// accumulating the time spanned while step totals stay below the
/// low-activity threshold. Accumulation stops at the first active sample or
/// at a hole in the sampling larger than the configured gap. Samples whose
/// counts are uninterpretable are skipped: they neither extend nor break the
/// run, so a single corrupt sample cannot invalidate the computation.
///
/// `is_sleeping` is true when the accumulated time reaches `min_hours`. The
/// returned duration is always finite.
pub fn detect_sleep_with_config(
    samples: &[ActivitySample],
    min_hours: f64,
    config: &SleepConfig,
) -> SleepCheck {
    let min_hours = if min_hours.is_finite() {
        min_hours.max(0.0)
    } else {
        DEFAULT_MIN_SLEEP_HOURS
    };

    let mut readings: Vec<(DateTime<Utc>, f64)> = samples
        .iter()
        .filter_map(|sample| {
            sample
                .steps
                .effective_total()
                .map(|total| (sample.timestamp, total))
        })
        .collect();
    readings.sort_by_key(|(timestamp, _)| *timestamp);

    let mut inactivity_hours = 0.0;
    let mut run_start: Option<DateTime<Utc>> = None;

    for (timestamp, steps) in readings.iter().rev() {
        if *steps >= config.low_activity_step_threshold {
            break;
        }
        match run_start {
            None => run_start = Some(*timestamp),
            Some(later) => {
                let gap_minutes = (later - *timestamp).num_milliseconds() as f64 / 60_000.0;
                if gap_minutes > config.max_sample_gap_minutes {
                    break;
                }
                inactivity_hours += gap_minutes / 60.0;
                run_start = Some(*timestamp);
            }
        }
    }

    SleepCheck {
        is_sleeping: run_start.is_some() && inactivity_hours >= min_hours,
        inactivity_hours,
    }
}
