//! holdlabel - Climbing Hold Annotation Engine
//!
//! Polygon geometry, selection and editing for labeling climbing holds and
//! volumes on wall photos, plus the normalized label file format they are
//! stored in. Rendering is left to the viewer; this crate only answers
//! hit-tests and applies pointer and keyboard intent to an annotation set.

pub mod config;
pub mod constants;
pub mod detector;
pub mod format;
pub mod interaction;
pub mod model;
pub mod session;

pub use config::{AppConfig, ConfigError, LogLevel, UserPreferences};
pub use detector::{ConfidenceThreshold, Proposal, Region, apply_proposals, clear_proposals};
pub use format::{FormatError, LoadReport, SaveReport, SkippedLine};
pub use interaction::{InteractionController, InteractionMessage, InteractionState};
pub use model::{
    AnnotationSet, ClassType, Hit, ImageSize, Point, Polygon, PolygonId, Provenance, Selection,
};
pub use session::{ActiveImage, Session, SessionError, SessionOptions};
