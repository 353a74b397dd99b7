//! Core domain logic for research attribution.
//!
//! This crate contains the fundamental types and logic for:
//! - Activity capture: typed records of prompts, searches, visits and copies
//! - Paragraph segmentation: splitting editor text at blank lines
//! - Attribution: linking paragraphs and pastes to the activity behind them
//! - Reporting: statistics and debug snapshots

pub mod action;
pub mod activity;
pub mod activity_log;
pub mod activity_type;
pub mod attribution;
pub mod debounce;
pub mod engine;
pub mod focus;
pub mod paragraph;
pub mod stats;
pub mod storage;
pub mod surface;
pub mod types;
pub mod url_filter;

pub use action::ActionEntry;
pub use activity::{Activity, ActivityPayload};
pub use activity_log::ActivityLog;
pub use activity_type::{ActivityType, UnknownActivityType};
pub use attribution::{SourceEstimate, estimate_source};
pub use engine::{
    AttributionEngine, EngineConfig, NavigationControl, ObservedEvent, Reaction, TimedEvent,
};
pub use focus::{FocusTracker, TabSwitch};
pub use paragraph::{Paragraph, ParagraphLog, ParagraphSegmenter};
pub use stats::{DebugSnapshot, Statistics};
pub use storage::{KeyValueStore, MemoryStore, StoreError};
pub use surface::Surface;
pub use types::{ActivityId, Confidence, ParagraphId, ValidationError};
