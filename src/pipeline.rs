//! Pipeline orchestration
//!
//! This module provides the public API of the engine: a typed evaluation
//! over already-parsed records, a JSON-in/JSON-out convenience used by the
//! FFI and CLI surfaces, and a stateful processor that keeps configuration
//! and a stable encoder instance across calls.
//!
//! The reference time is threaded explicitly through every computation;
//! only the JSON conveniences default a missing `as_of` to the wall clock.

use chrono::{DateTime, Utc};

use crate::bac;
use crate::elimination;
use crate::error::EngineError;
use crate::ingest;
use crate::session::{self, SegmenterConfig};
use crate::snapshot::SnapshotEncoder;
use crate::speed;
use crate::types::{
    ActivitySample, BodyProfile, DrinkEvent, Gender, IntoxicationAssessment, ResolvedProfile,
};
use crate::units::round2;

/// Evaluate one subject at one point in time with default configuration.
///
/// Pipeline stages:
/// 1. Elimination - units still unmetabolized across the user's history
/// 2. Segmentation - the currently-active session (activity-refined when
///    samples exist)
/// 3. Pacing - session pattern and speed factor
/// 4. Estimation - speed-adjusted Widmark figure plus the personalized
///    estimate
pub fn assess(
    drinks: &[DrinkEvent],
    samples: &[ActivitySample],
    profile: Option<&BodyProfile>,
    user_id: &str,
    as_of: DateTime<Utc>,
) -> IntoxicationAssessment {
    assess_with_config(
        drinks,
        samples,
        profile,
        user_id,
        as_of,
        &SegmenterConfig::default(),
    )
}

pub fn assess_with_config(
    drinks: &[DrinkEvent],
    samples: &[ActivitySample],
    profile: Option<&BodyProfile>,
    user_id: &str,
    as_of: DateTime<Utc>,
    config: &SegmenterConfig,
) -> IntoxicationAssessment {
    let consumed: Vec<DrinkEvent> = drinks
        .iter()
        .filter(|drink| drink.user_id == user_id && !drink.is_template)
        .cloned()
        .collect();
    let current_units = elimination::remaining_units(&consumed, as_of);

    let session_drinks =
        session::session_drinks_with_activity_config(drinks, samples, user_id, config);
    let speed = speed::analyze_speed(&session_drinks);

    let resolved = ResolvedProfile::from_partial(profile);
    let bac = bac::estimate_bac(
        current_units,
        resolved.weight_kg,
        resolved.gender == Gender::Male,
        speed.speed_factor,
    );
    let advanced = bac::estimate_advanced_bac(current_units, profile);

    let session_units = round2(
        session_drinks
            .iter()
            .map(|drink| {
                if drink.units.is_finite() && drink.units >= 0.0 {
                    drink.units
                } else {
                    0.0
                }
            })
            .sum(),
    );
    let session_started_at = session_drinks.first().map(|drink| drink.timestamp);

    IntoxicationAssessment {
        user_id: user_id.to_string(),
        as_of,
        current_units,
        bac,
        advanced,
        speed,
        session_drinks,
        session_units,
        session_started_at,
    }
}

/// Evaluate collaborator JSON and return a snapshot JSON payload.
///
/// `activity_json` and `profile_json` are optional inputs; a missing
/// `as_of` (RFC3339) defaults to the current time.
pub fn snapshot_from_json(
    drinks_json: &str,
    activity_json: Option<&str>,
    profile_json: Option<&str>,
    user_id: &str,
    as_of: Option<&str>,
) -> Result<String, EngineError> {
    PromilleProcessor::new().snapshot_json(drinks_json, activity_json, profile_json, user_id, as_of)
}

fn parse_as_of(value: Option<&str>) -> Result<DateTime<Utc>, EngineError> {
    match value {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| EngineError::InvalidTimestamp(format!("{raw}: {e}"))),
    }
}

/// Stateful processor holding segmentation configuration and a stable
/// snapshot encoder instance.
pub struct PromilleProcessor {
    config: SegmenterConfig,
    encoder: SnapshotEncoder,
}

impl Default for PromilleProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PromilleProcessor {
    /// Create a processor with default configuration
    pub fn new() -> Self {
        Self {
            config: SegmenterConfig::default(),
            encoder: SnapshotEncoder::new(),
        }
    }

    /// Create a processor with specific segmentation thresholds
    pub fn with_config(config: SegmenterConfig) -> Self {
        Self {
            config,
            encoder: SnapshotEncoder::new(),
        }
    }

    /// Typed evaluation with this processor's configuration
    pub fn assess(
        &self,
        drinks: &[DrinkEvent],
        samples: &[ActivitySample],
        profile: Option<&BodyProfile>,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> IntoxicationAssessment {
        assess_with_config(drinks, samples, profile, user_id, as_of, &self.config)
    }

    /// JSON-in/JSON-out evaluation
    pub fn snapshot_json(
        &self,
        drinks_json: &str,
        activity_json: Option<&str>,
        profile_json: Option<&str>,
        user_id: &str,
        as_of: Option<&str>,
    ) -> Result<String, EngineError> {
        let drinks = ingest::parse_drink_log(drinks_json)?;
        let samples = match activity_json {
            Some(json) => ingest::parse_activity_log(json)?,
            None => Vec::new(),
        };
        let profile = match profile_json {
            Some(json) => ingest::parse_profile(json)?,
            None => None,
        };
        let as_of = parse_as_of(as_of)?;

        let assessment = self.assess(&drinks, &samples, profile.as_ref(), user_id, as_of);
        self.encoder.encode_to_json(&assessment)
    }
}
