//! Annotation geometry: points, polygons and the per-image polygon set.

mod annotation_set;
mod class;
mod image_size;
mod point;
mod polygon;

pub use annotation_set::{AnnotationSet, PointRemoval, PointView, PolygonView, Selection};
pub use class::{ClassType, Provenance};
pub use image_size::ImageSize;
pub use point::Point;
pub use polygon::{Bounds, Hit, Polygon, PolygonId};
