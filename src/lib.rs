//! Promille - On-device estimation engine for blood-alcohol level and
//! drinking-session analytics
//!
//! Promille turns a log of discrete drink events and optional step-count
//! samples into intoxication metrics through a deterministic pipeline:
//! ingestion → unit conversion → elimination → BAC estimation, with session
//! segmentation feeding pacing analysis and group statistics.
//!
//! Every computation is synchronous and pure: the reference time is an
//! explicit parameter, no call reads a clock or performs I/O, and pathological
//! input degrades to documented defaults instead of panicking.

pub mod bac;
pub mod elimination;
pub mod error;
pub mod group;
pub mod ingest;
pub mod pipeline;
pub mod session;
pub mod sleep;
pub mod snapshot;
pub mod speed;
pub mod types;
pub mod units;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::EngineError;
pub use pipeline::{assess, snapshot_from_json, PromilleProcessor};
pub use types::{
    ActivitySample, BodyProfile, DrinkEvent, GroupSessionStats, IntoxicationAssessment,
};

/// Engine version embedded in all snapshot payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshot payloads
pub const PRODUCER_NAME: &str = "promille";
