//! Core types for the Promille engine
//!
//! This module defines the data structures that flow through an evaluation:
//! drink events, activity samples, body profiles, per-stage results, and the
//! snapshot payload handed back to the host app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::units;

/// Drink category recorded by the host app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrinkCategory {
    Beer,
    Wine,
    Cocktail,
    Shot,
    Champagne,
    Soft,
    Other,
}

impl DrinkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkCategory::Beer => "beer",
            DrinkCategory::Wine => "wine",
            DrinkCategory::Cocktail => "cocktail",
            DrinkCategory::Shot => "shot",
            DrinkCategory::Champagne => "champagne",
            DrinkCategory::Soft => "soft",
            DrinkCategory::Other => "other",
        }
    }
}

/// A single consumed drink (or reusable preset) owned by the history
/// collection.
///
/// `units` is derived once at creation from volume and strength and never
/// recomputed afterwards; consumed drinks are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkEvent {
    /// Opaque unique identifier
    pub id: String,
    /// Owning subject
    pub user_id: String,
    pub category: DrinkCategory,
    /// Serving volume in centiliters
    pub volume_cl: f64,
    /// Alcohol by volume, percent
    pub strength_percent: f64,
    /// Standard units (10 g pure ethanol each), derived at creation
    pub units: f64,
    /// When the drink was consumed
    pub timestamp: DateTime<Utc>,
    /// Reusable preset, excluded from all session and statistics computations
    #[serde(default)]
    pub is_template: bool,
}

impl DrinkEvent {
    /// Create a drink event, deriving `units` from volume and strength.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        category: DrinkCategory,
        volume_cl: f64,
        strength_percent: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            category,
            volume_cl,
            strength_percent,
            units: units::compute_units(volume_cl, strength_percent),
            timestamp,
            is_template: false,
        }
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Step counts for one sampling interval, split by movement kind.
///
/// Counts are stored as `f64` because collaborator data can carry negative,
/// NaN, or infinite values; `effective_total` is the only reading path the
/// engine uses, and a missing field deserializes to NaN (uninterpretable)
/// rather than to a fabricated zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepCounts {
    #[serde(default = "nan")]
    pub walking: f64,
    #[serde(default = "nan")]
    pub dancing: f64,
    #[serde(default = "nan")]
    pub total: f64,
}

impl StepCounts {
    /// Build counts from the split values, deriving `total`.
    pub fn new(walking: f64, dancing: f64) -> Self {
        Self {
            walking,
            dancing,
            total: walking + dancing,
        }
    }

    /// The safest interpretable step total for this interval.
    ///
    /// Prefers a finite, non-negative `total`; falls back to the sum of the
    /// interpretable split counts; `None` when no field is usable.
    pub fn effective_total(&self) -> Option<f64> {
        fn usable(value: f64) -> Option<f64> {
            (value.is_finite() && value >= 0.0).then_some(value)
        }

        if let Some(total) = usable(self.total) {
            return Some(total);
        }

        match (usable(self.walking), usable(self.dancing)) {
            (None, None) => None,
            (walking, dancing) => Some(walking.unwrap_or(0.0) + dancing.unwrap_or(0.0)),
        }
    }
}

/// One step-counter reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivitySample {
    pub timestamp: DateTime<Utc>,
    pub steps: StepCounts,
}

/// Subject sex, used to select the Widmark distribution coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Self-reported physical activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

/// Subject metabolism inputs supplied by the host app.
///
/// Every field is individually optional; missing data is resolved against
/// population-average defaults in a single merge step
/// ([`ResolvedProfile::from_partial`]), never at the point of use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyProfile {
    pub age: Option<f64>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

/// Population-average defaults applied when profile data is missing
pub const DEFAULT_AGE_YEARS: f64 = 30.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Fully-populated profile after the merge-with-defaults step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedProfile {
    pub age: f64,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
}

impl ResolvedProfile {
    /// Merge a possibly-absent, possibly-partial profile with defaults.
    ///
    /// Non-finite or non-positive numeric fields are treated as absent.
    pub fn from_partial(profile: Option<&BodyProfile>) -> Self {
        fn usable(value: Option<f64>) -> Option<f64> {
            value.filter(|v| v.is_finite() && *v > 0.0)
        }

        let partial = profile.cloned().unwrap_or_default();
        Self {
            age: usable(partial.age).unwrap_or(DEFAULT_AGE_YEARS),
            gender: partial.gender.unwrap_or(Gender::Male),
            height_cm: usable(partial.height_cm).unwrap_or(DEFAULT_HEIGHT_CM),
            weight_kg: usable(partial.weight_kg).unwrap_or(DEFAULT_WEIGHT_KG),
            activity_level: partial.activity_level.unwrap_or(ActivityLevel::Moderate),
        }
    }

    /// Body mass index from the resolved height and weight
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }
}

/// Simple Widmark estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacEstimate {
    /// Blood alcohol concentration, g/L, rounded to two decimals
    pub blood_alcohol: f64,
    /// Breath alcohol concentration, mg/L (blood × 0.5), rounded to two decimals
    pub breath_alcohol: f64,
}

/// Metabolism details exposed alongside the personalized estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetabolismInfo {
    pub bmi: f64,
}

/// Personalized Widmark estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvancedBacEstimate {
    /// Blood alcohol concentration, g/L
    pub blood_alcohol: f64,
    /// Breath alcohol concentration, mg/L
    pub breath_alcohol: f64,
    /// Personalized elimination rate, units per hour
    pub elimination_rate: f64,
    /// Hours until the remaining alcohol clears at the personalized rate
    pub time_to_sober_hours: f64,
    /// Distribution coefficient after body-composition adjustment
    pub widmark_factor: f64,
    pub metabolism: MetabolismInfo,
}

/// Consumption pacing classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkingPattern {
    Slow,
    Moderate,
    Fast,
    Binge,
}

impl DrinkingPattern {
    /// Multiplicative BAC adjustment for this pacing
    pub fn speed_factor(&self) -> f64 {
        match self {
            DrinkingPattern::Slow => 0.85,
            DrinkingPattern::Moderate => 1.0,
            DrinkingPattern::Fast => 1.2,
            DrinkingPattern::Binge => 1.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkingPattern::Slow => "slow",
            DrinkingPattern::Moderate => "moderate",
            DrinkingPattern::Fast => "fast",
            DrinkingPattern::Binge => "binge",
        }
    }
}

/// Result of consumption pacing analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedAnalysis {
    /// Mean gap between consecutive drinks, rounded to the nearest minute
    pub average_minutes_between_drinks: f64,
    pub speed_factor: f64,
    pub pattern: DrinkingPattern,
}

/// Result of sleep detection over an activity window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepCheck {
    pub is_sleeping: bool,
    /// Accumulated contiguous low-activity time, hours; always finite
    pub inactivity_hours: f64,
}

/// Per-member totals for the current group session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberSessionStats {
    pub drink_count: u32,
    pub unit_total: f64,
}

/// Group-level session statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSessionStats {
    /// Session units across all member entries divided by the member count
    pub group_average_units: f64,
    /// Members with at least one session drink
    pub member_stats: HashMap<String, MemberSessionStats>,
    /// Earliest session drink across members, when any exist
    pub session_started_at: Option<DateTime<Utc>>,
}

/// Full evaluation of one subject at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntoxicationAssessment {
    pub user_id: String,
    /// Reference time the evaluation was computed against
    pub as_of: DateTime<Utc>,
    /// Units still unmetabolized at `as_of`
    pub current_units: f64,
    /// Speed-adjusted Widmark estimate on the resolved profile
    pub bac: BacEstimate,
    /// Personalized estimate
    pub advanced: AdvancedBacEstimate,
    /// Pacing of the current session
    pub speed: SpeedAnalysis,
    /// Drinks in the currently-active session
    pub session_drinks: Vec<DrinkEvent>,
    pub session_units: f64,
    pub session_started_at: Option<DateTime<Utc>>,
}

/// Producer metadata embedded in snapshot payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Intoxication block of a snapshot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotIntoxication {
    pub current_units: f64,
    pub blood_alcohol_g_l: f64,
    pub breath_alcohol_mg_l: f64,
    pub elimination_rate_units_per_hour: f64,
    pub time_to_sober_hours: f64,
    pub bmi: f64,
}

/// Session block of a snapshot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSession {
    pub drink_count: u32,
    pub unit_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at_utc: Option<String>,
    pub average_minutes_between_drinks: f64,
    pub pattern: DrinkingPattern,
    pub speed_factor: f64,
}

/// Complete snapshot payload for the host app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub snapshot_version: String,
    pub producer: SnapshotProducer,
    pub user_id: String,
    pub as_of_utc: String,
    pub computed_at_utc: String,
    pub intoxication: SnapshotIntoxication,
    pub session: SnapshotSession,
}
