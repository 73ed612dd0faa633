//! Global constants for the holdlabel engine

/// Vertex proximity radius for hit-testing (in image pixels).
pub const VERTEX_HIT_RADIUS: f32 = 10.0;

/// Minimum number of vertices for a polygon to enclose area.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Decimal places written for each normalized coordinate.
pub const COORDINATE_PRECISION: usize = 6;

/// Default detector confidence threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Default folder scanned for images.
pub const DEFAULT_IMAGES_DIR: &str = "data/to_annotate";

/// Default folder for per-image label files.
pub const DEFAULT_LABELS_DIR: &str = "annotations";

/// Extension of label files.
pub const LABEL_EXTENSION: &str = "txt";

/// Image extensions picked up by a session (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
