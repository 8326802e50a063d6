//! Record ingestion
//!
//! Parses the loosely-shaped JSON record arrays supplied by the persistence
//! and step-counter collaborators into typed events. A syntactically broken
//! document is an error; a damaged individual record degrades instead:
//! missing ids are minted, a stored unit value that is not usable is
//! recomputed from volume and strength, unknown categories map to `other`,
//! and records without a subject or a readable timestamp are dropped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::{ActivitySample, BodyProfile, DrinkCategory, DrinkEvent, StepCounts};
use crate::units;

#[derive(Debug, Deserialize)]
struct RawDrinkRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    volume_cl: Option<f64>,
    #[serde(default)]
    strength_percent: Option<f64>,
    #[serde(default)]
    units: Option<f64>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    is_template: bool,
}

#[derive(Debug, Deserialize)]
struct RawStepCounts {
    #[serde(default)]
    walking: Option<f64>,
    #[serde(default)]
    dancing: Option<f64>,
    #[serde(default)]
    total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawActivityRecord {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    steps: Option<RawStepCounts>,
}

/// Parse a drink-log JSON array into drink events.
pub fn parse_drink_log(json: &str) -> Result<Vec<DrinkEvent>, EngineError> {
    let raw: Vec<RawDrinkRecord> = serde_json::from_str(json)
        .map_err(|e| EngineError::ParseError(format!("drink log: {e}")))?;
    Ok(raw.into_iter().filter_map(drink_from_raw).collect())
}

/// Parse an activity-log JSON array into activity samples.
pub fn parse_activity_log(json: &str) -> Result<Vec<ActivitySample>, EngineError> {
    let raw: Vec<RawActivityRecord> = serde_json::from_str(json)
        .map_err(|e| EngineError::ParseError(format!("activity log: {e}")))?;
    Ok(raw.into_iter().filter_map(sample_from_raw).collect())
}

/// Parse a body-profile JSON object; the literal `null` maps to `None`.
pub fn parse_profile(json: &str) -> Result<Option<BodyProfile>, EngineError> {
    serde_json::from_str(json).map_err(|e| EngineError::ParseError(format!("profile: {e}")))
}

fn drink_from_raw(raw: RawDrinkRecord) -> Option<DrinkEvent> {
    let user_id = raw.user_id.filter(|u| !u.is_empty())?;
    let timestamp = parse_timestamp(raw.timestamp.as_deref())?;

    let volume_cl = raw.volume_cl.unwrap_or(0.0);
    let strength_percent = raw.strength_percent.unwrap_or(0.0);
    let units = match raw.units {
        Some(u) if u.is_finite() && u >= 0.0 => u,
        _ => units::compute_units(volume_cl, strength_percent),
    };

    Some(DrinkEvent {
        id: raw
            .id
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        user_id,
        category: category_from_str(raw.category.as_deref()),
        volume_cl,
        strength_percent,
        units,
        timestamp,
        is_template: raw.is_template,
    })
}

fn sample_from_raw(raw: RawActivityRecord) -> Option<ActivitySample> {
    let timestamp = parse_timestamp(raw.timestamp.as_deref())?;
    let steps = match raw.steps {
        Some(steps) => StepCounts {
            walking: steps.walking.unwrap_or(f64::NAN),
            dancing: steps.dancing.unwrap_or(f64::NAN),
            total: steps.total.unwrap_or(f64::NAN),
        },
        None => StepCounts {
            walking: f64::NAN,
            dancing: f64::NAN,
            total: f64::NAN,
        },
    };
    Some(ActivitySample { timestamp, steps })
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn category_from_str(value: Option<&str>) -> DrinkCategory {
    match value {
        Some("beer") => DrinkCategory::Beer,
        Some("wine") => DrinkCategory::Wine,
        Some("cocktail") => DrinkCategory::Cocktail,
        Some("shot") => DrinkCategory::Shot,
        Some("champagne") => DrinkCategory::Champagne,
        Some("soft") => DrinkCategory::Soft,
        _ => DrinkCategory::Other,
    }
}
