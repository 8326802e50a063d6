//! Snapshot encoding
//!
//! Packages one full evaluation into a versioned JSON payload with producer
//! metadata for the host app to render.

use chrono::Utc;
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::{
    IntoxicationAssessment, SnapshotIntoxication, SnapshotPayload, SnapshotProducer,
    SnapshotSession,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current snapshot payload version
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Encoder for producing snapshot payloads
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance id
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an assessment into a snapshot payload
    pub fn encode(&self, assessment: &IntoxicationAssessment) -> SnapshotPayload {
        SnapshotPayload {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            producer: SnapshotProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            user_id: assessment.user_id.clone(),
            as_of_utc: assessment.as_of.to_rfc3339(),
            computed_at_utc: Utc::now().to_rfc3339(),
            intoxication: SnapshotIntoxication {
                current_units: assessment.current_units,
                blood_alcohol_g_l: assessment.bac.blood_alcohol,
                breath_alcohol_mg_l: assessment.bac.breath_alcohol,
                elimination_rate_units_per_hour: assessment.advanced.elimination_rate,
                time_to_sober_hours: assessment.advanced.time_to_sober_hours,
                bmi: assessment.advanced.metabolism.bmi,
            },
            session: SnapshotSession {
                drink_count: assessment.session_drinks.len() as u32,
                unit_total: assessment.session_units,
                started_at_utc: assessment
                    .session_started_at
                    .map(|timestamp| timestamp.to_rfc3339()),
                average_minutes_between_drinks: assessment.speed.average_minutes_between_drinks,
                pattern: assessment.speed.pattern,
                speed_factor: assessment.speed.speed_factor,
            },
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        assessment: &IntoxicationAssessment,
    ) -> Result<String, EngineError> {
        serde_json::to_string_pretty(&self.encode(assessment)).map_err(EngineError::JsonError)
    }
}
