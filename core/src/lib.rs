//! Kjerne for klokkestatistikk i cardio-økter: cache med debouncet
//! persistering, og lagre-beslutningen som beskytter klokkeverdier på serveren.

pub mod cache;
pub mod cardio_types;
pub mod cli;
pub mod companion;
pub mod config;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod models;
pub mod patch;
pub mod persist;
pub mod save_flow;
pub mod service;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use cache::WatchStatsCache;
pub use cardio_types::{is_time_cardio, CardioType};
pub use companion::{close_from_watch, CompanionMessage, CompanionSession, ControlHandler};
pub use config::{CacheConfig, Config, ServiceConfig, UnitSystem};
pub use error::{CardioError, CardioResult};
pub use merge::{convert_for_request, decide, prepare_for_request, CardioInputs, CardioPayload, Corroboration};
pub use models::{ActivityId, ActivityStats, CardioRecord, CardioStatus, DurationData, StatsMap};
pub use patch::Patch;
pub use save_flow::{SaveFlow, SaveOutcome};
pub use service::{CardioService, HttpCardioService, SetResponse};
pub use stats::{compute_derived, with_watch_stats, DerivedStats};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use tracker::{on_tracker_ended, TrackerEnded};
