//! Detector proposal intake.
//!
//! An external detector (remote API or local model) proposes regions with a
//! confidence score. This module turns those proposals into polygons tagged
//! [`Provenance::Detector`], replacing the previous batch whenever the
//! proposals or the threshold change. It never talks to the detector itself.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONFIDENCE_THRESHOLD, MIN_POLYGON_VERTICES};
use crate::model::{AnnotationSet, ClassType, ImageSize, Point, Polygon, Provenance};

/// Minimum confidence a proposal needs to become a polygon, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ConfidenceThreshold(f32);

impl ConfidenceThreshold {
    /// Create a threshold, clamped to `[0, 1]`.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Create a threshold from a 0-100 slider value.
    pub fn from_percent(percent: u8) -> Self {
        Self::new(f32::from(percent) / 100.0)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Whether a confidence passes the threshold.
    pub fn accepts(&self, confidence: f32) -> bool {
        confidence >= self.0
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

/// Shape of a proposed region, in image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Region {
    /// Axis-aligned box given by two opposite corners.
    BoundingBox { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Ordered contour (mask outline).
    Contour(Vec<Point>),
}

impl Region {
    /// Polygon vertices for this region. Boxes yield their four corners.
    pub fn to_points(&self) -> Vec<Point> {
        match self {
            Region::BoundingBox { x1, y1, x2, y2 } => {
                let (left, right) = (x1.min(*x2), x1.max(*x2));
                let (top, bottom) = (y1.min(*y2), y1.max(*y2));
                vec![
                    Point::new(left, top),
                    Point::new(right, top),
                    Point::new(right, bottom),
                    Point::new(left, bottom),
                ]
            }
            Region::Contour(points) => points.clone(),
        }
    }
}

/// A region proposed by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub region: Region,
    pub confidence: f32,
    #[serde(default)]
    pub class_type: ClassType,
}

impl Proposal {
    pub fn new(region: Region, confidence: f32, class_type: ClassType) -> Self {
        Self {
            region,
            confidence,
            class_type,
        }
    }
}

/// One prediction record as returned by the detection service.
///
/// Boxes are given by their centre and size; segmentation models add an
/// outline in `points`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub points: Vec<Point>,
}

impl Prediction {
    /// Convert to a proposal. Boxes and contours are clipped to the image bounds.
    pub fn to_proposal(&self, size: ImageSize) -> Proposal {
        let class_type = self
            .class
            .as_deref()
            .and_then(ClassType::from_label)
            .unwrap_or_default();

        let max_x = size.width as f32;
        let max_y = size.height as f32;
        let region = if self.points.len() >= MIN_POLYGON_VERTICES {
            Region::Contour(
                self.points
                    .iter()
                    .map(|p| Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y)))
                    .collect(),
            )
        } else {
            Region::BoundingBox {
                x1: (self.x - self.width / 2.0).clamp(0.0, max_x),
                y1: (self.y - self.height / 2.0).clamp(0.0, max_y),
                x2: (self.x + self.width / 2.0).clamp(0.0, max_x),
                y2: (self.y + self.height / 2.0).clamp(0.0, max_y),
            }
        };

        Proposal::new(region, self.confidence, class_type)
    }
}

/// A full detection response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

impl DetectionResponse {
    /// Parse a detection response from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert every prediction to a proposal.
    pub fn proposals(&self, size: ImageSize) -> Vec<Proposal> {
        self.predictions
            .iter()
            .map(|p| p.to_proposal(size))
            .collect()
    }
}

/// Replace all detector polygons with the proposals passing `threshold`.
///
/// Manual polygons are untouched. Returns the number of polygons added.
pub fn apply_proposals(
    set: &mut AnnotationSet,
    proposals: &[Proposal],
    threshold: ConfidenceThreshold,
) -> usize {
    let removed = clear_proposals(set);
    let mut added = 0;

    for proposal in proposals {
        if !threshold.accepts(proposal.confidence) {
            continue;
        }
        let points = proposal.region.to_points();
        if points.len() < MIN_POLYGON_VERTICES {
            log::debug!("Ignoring proposal with {} points", points.len());
            continue;
        }
        let name = set.next_name(proposal.class_type);
        set.add(
            Polygon::from_points(name, proposal.class_type, points)
                .with_provenance(Provenance::Detector),
        );
        added += 1;
    }

    log::info!(
        "Applied detector proposals: {} added, {} replaced (threshold {:.2})",
        added,
        removed,
        threshold.value()
    );
    added
}

/// Remove every detector polygon. Returns how many were removed.
pub fn clear_proposals(set: &mut AnnotationSet) -> usize {
    set.remove_where(|p| p.provenance() == Provenance::Detector)
}
