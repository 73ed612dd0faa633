//! Freeform polygon outlining one hold or volume.

use serde::{Deserialize, Serialize};

use super::class::{ClassType, Provenance};
use super::point::Point;
use crate::constants::{MIN_POLYGON_VERTICES, VERTEX_HIT_RADIUS};

/// Unique identifier for a polygon within an [`AnnotationSet`](super::AnnotationSet).
pub type PolygonId = u32;

/// Tolerance for treating a location as lying on an edge.
const EDGE_EPSILON: f32 = 1e-4;

/// Result of hit-testing a location against a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hit {
    /// Within the proximity radius of the vertex at this index
    Vertex(usize),
    /// Inside the contour (or on its boundary) but not near a vertex
    Interior,
    /// Neither
    Miss,
}

/// An axis-aligned bounding box in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// A named, classified sequence of vertices in contour order.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub(super) id: PolygonId,
    name: String,
    class_type: ClassType,
    provenance: Provenance,
    points: Vec<Point>,
    /// Last pointer position of an in-progress drag.
    drag_anchor: Option<(f32, f32)>,
}

impl Polygon {
    /// Create an empty, manually drawn polygon.
    pub fn new(name: impl Into<String>, class_type: ClassType) -> Self {
        Self {
            id: 0,
            name: name.into(),
            class_type,
            provenance: Provenance::Manual,
            points: Vec::new(),
            drag_anchor: None,
        }
    }

    /// Create a polygon from existing vertices.
    pub fn from_points(
        name: impl Into<String>,
        class_type: ClassType,
        points: impl IntoIterator<Item = Point>,
    ) -> Self {
        let mut polygon = Self::new(name, class_type);
        polygon.points = points.into_iter().collect();
        polygon
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Identifier assigned by the owning set (0 until added).
    pub fn id(&self) -> PolygonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_type(&self) -> ClassType {
        self.class_type
    }

    /// Retarget the class in place; the name is kept.
    pub fn set_class_type(&mut self, class_type: ClassType) {
        self.class_type = class_type;
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the polygon has enough vertices to enclose area.
    pub fn is_closed(&self) -> bool {
        self.points.len() >= MIN_POLYGON_VERTICES
    }

    // ========================================================================
    // Point mutation
    // ========================================================================

    /// Append a vertex at the end of the contour.
    pub fn add_point(&mut self, x: f32, y: f32) {
        self.points.push(Point::new(x, y));
    }

    /// Overwrite a vertex position. Returns false for an out-of-range index.
    pub fn move_point(&mut self, index: usize, x: f32, y: f32) -> bool {
        match self.points.get_mut(index) {
            Some(point) => {
                point.x = x;
                point.y = y;
                true
            }
            None => false,
        }
    }

    /// Rigidly translate every vertex.
    pub fn move_all(&mut self, dx: f32, dy: f32) {
        for point in &mut self.points {
            point.translate(dx, dy);
        }
    }

    /// Remove a vertex. Returns None for an out-of-range index.
    pub fn remove_point(&mut self, index: usize) -> Option<Point> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Insert the midpoint of every edge right after the edge's first vertex.
    ///
    /// All midpoints come from the original vertices, so the result is
    /// `[p0, m0, p1, m1, ..., pn-1, mn-1]` with `mi` between `pi` and
    /// `p(i+1 mod n)`. Returns false (and does nothing) with fewer than 2 points.
    pub fn insert_midpoints(&mut self) -> bool {
        let n = self.points.len();
        if n < 2 {
            return false;
        }
        self.points = (0..n)
            .flat_map(|i| {
                let current = self.points[i];
                let next = self.points[(i + 1) % n];
                [current, current.midpoint(&next)]
            })
            .collect();
        true
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    /// Anchor a drag at the given position.
    pub fn start_drag(&mut self, x: f32, y: f32) {
        self.drag_anchor = Some((x, y));
    }

    /// Move the polygon by the delta from the previous anchor and re-anchor.
    ///
    /// Returns the applied delta, or None when no drag is active.
    pub fn update_drag(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let (ax, ay) = self.drag_anchor?;
        let delta = (x - ax, y - ay);
        self.move_all(delta.0, delta.1);
        self.drag_anchor = Some((x, y));
        Some(delta)
    }

    /// Clear the drag anchor.
    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    // ========================================================================
    // Hit-testing
    // ========================================================================

    /// Hit-test with the default vertex radius.
    pub fn hit_test(&self, x: f32, y: f32) -> Hit {
        self.hit_test_with_radius(x, y, VERTEX_HIT_RADIUS)
    }

    /// Vertex proximity first (in insertion order), then interior membership.
    pub fn hit_test_with_radius(&self, x: f32, y: f32, radius: f32) -> Hit {
        if let Some(index) = self.points.iter().position(|p| p.is_near(x, y, radius)) {
            return Hit::Vertex(index);
        }
        if self.contains(x, y) {
            Hit::Interior
        } else {
            Hit::Miss
        }
    }

    /// Even-odd point-in-polygon test; locations on an edge count as inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        if !self.is_closed() {
            return false;
        }

        let n = self.points.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.points[i];
            let vj = self.points[j];

            if on_segment(vi, vj, x, y) {
                return true;
            }
            if ((vi.y > y) != (vj.y > y)) && (x < (vj.x - vi.x) * (y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Get the bounding box of the polygon.
    pub fn bounding_box(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(self.points.iter().fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }
}

/// Whether (x, y) lies on the segment a-b.
fn on_segment(a: Point, b: Point, x: f32, y: f32) -> bool {
    let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
    let length = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    if cross.abs() > EDGE_EPSILON * length.max(1.0) {
        return false;
    }
    x >= a.x.min(b.x) - EDGE_EPSILON
        && x <= a.x.max(b.x) + EDGE_EPSILON
        && y >= a.y.min(b.y) - EDGE_EPSILON
        && y <= a.y.max(b.y) + EDGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::from_points(
            "hold_1",
            ClassType::Hold,
            [
                Point::new(10.0, 10.0),
                Point::new(110.0, 10.0),
                Point::new(110.0, 110.0),
                Point::new(10.0, 110.0),
            ],
        )
    }

    #[test]
    fn test_hit_test_scenarios() {
        let poly = square();
        assert_eq!(poly.hit_test(12.0, 12.0), Hit::Vertex(0));
        assert_eq!(poly.hit_test(60.0, 60.0), Hit::Interior);
        assert_eq!(poly.hit_test(150.0, 150.0), Hit::Miss);
    }

    #[test]
    fn test_vertex_takes_priority_over_interior() {
        let poly = square();
        // Inside the contour and within radius of (110, 110)
        assert_eq!(poly.hit_test(105.0, 104.0), Hit::Vertex(2));
        // Outside the contour but still near a vertex
        assert_eq!(poly.hit_test(118.0, 2.0), Hit::Vertex(1));
    }

    #[test]
    fn test_first_vertex_in_insertion_order_wins() {
        let poly = Polygon::from_points(
            "hold_1",
            ClassType::Hold,
            [
                Point::new(50.0, 50.0),
                Point::new(52.0, 50.0),
                Point::new(100.0, 100.0),
            ],
        );
        assert_eq!(poly.hit_test(51.0, 50.0), Hit::Vertex(0));
    }

    #[test]
    fn test_boundary_counts_as_inside() {
        let poly = square();
        assert!(poly.contains(60.0, 10.0));
        assert!(poly.contains(110.0, 60.0));
        assert!(poly.contains(60.0, 110.0));
        assert!(poly.contains(10.0, 60.0));
        assert!(!poly.contains(60.0, 111.0));
    }

    #[test]
    fn test_open_polygon_has_no_interior() {
        let mut poly = Polygon::new("hold_1", ClassType::Hold);
        poly.add_point(0.0, 0.0);
        poly.add_point(100.0, 0.0);
        assert!(!poly.contains(50.0, 0.0));
        assert_eq!(poly.hit_test(50.0, 0.0), Hit::Miss);
        assert_eq!(poly.hit_test(98.0, 3.0), Hit::Vertex(1));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upwards
        let poly = Polygon::from_points(
            "volume_1",
            ClassType::Volume,
            [
                Point::new(0.0, 0.0),
                Point::new(30.0, 0.0),
                Point::new(30.0, 70.0),
                Point::new(70.0, 70.0),
                Point::new(70.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
        );
        assert_eq!(poly.hit_test(50.0, 30.0), Hit::Miss);
        assert_eq!(poly.hit_test(50.0, 85.0), Hit::Interior);
        assert_eq!(poly.hit_test(15.0, 40.0), Hit::Interior);
    }

    #[test]
    fn test_move_point_out_of_range_is_noop() {
        let mut poly = square();
        let before = poly.clone();
        assert!(!poly.move_point(4, 0.0, 0.0));
        assert_eq!(poly, before);

        assert!(poly.move_point(1, 120.0, 5.0));
        assert_eq!(poly.points()[1], Point::new(120.0, 5.0));
    }

    #[test]
    fn test_move_all_is_reversible() {
        let mut poly = square();
        let original = poly.points().to_vec();
        poly.move_all(13.25, -7.5);
        assert_eq!(poly.points()[0], Point::new(23.25, 2.5));
        poly.move_all(-13.25, 7.5);
        for (a, b) in poly.points().iter().zip(&original) {
            assert!((a.x - b.x).abs() < 1e-4);
            assert!((a.y - b.y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_insert_midpoints_doubles_and_keeps_originals() {
        let mut poly = square();
        let original = poly.points().to_vec();
        assert!(poly.insert_midpoints());

        assert_eq!(poly.len(), 8);
        for (i, p) in original.iter().enumerate() {
            assert_eq!(poly.points()[2 * i], *p);
        }
        assert_eq!(poly.points()[1], Point::new(60.0, 10.0));
        assert_eq!(poly.points()[3], Point::new(110.0, 60.0));
        assert_eq!(poly.points()[5], Point::new(60.0, 110.0));
        // Closing edge midpoint
        assert_eq!(poly.points()[7], Point::new(10.0, 60.0));
    }

    #[test]
    fn test_insert_midpoints_on_triangle_twice() {
        let mut poly = Polygon::from_points(
            "hold_1",
            ClassType::Hold,
            [
                Point::new(0.0, 0.0),
                Point::new(8.0, 0.0),
                Point::new(0.0, 8.0),
            ],
        );
        poly.insert_midpoints();
        poly.insert_midpoints();
        assert_eq!(poly.len(), 12);
        assert_eq!(poly.points()[4], Point::new(8.0, 0.0));
    }

    #[test]
    fn test_insert_midpoints_needs_two_points() {
        let mut poly = Polygon::new("hold_1", ClassType::Hold);
        poly.add_point(1.0, 1.0);
        assert!(!poly.insert_midpoints());
        assert_eq!(poly.len(), 1);
    }

    #[test]
    fn test_drag_is_incremental() {
        let mut poly = square();
        assert_eq!(poly.update_drag(50.0, 50.0), None);

        poly.start_drag(50.0, 50.0);
        assert_eq!(poly.update_drag(55.0, 50.0), Some((5.0, 0.0)));
        assert_eq!(poly.update_drag(55.0, 60.0), Some((0.0, 10.0)));
        assert_eq!(poly.points()[0], Point::new(15.0, 20.0));

        poly.end_drag();
        assert!(!poly.is_dragging());
        assert_eq!(poly.update_drag(0.0, 0.0), None);
        assert_eq!(poly.points()[0], Point::new(15.0, 20.0));
    }

    #[test]
    fn test_bounding_box() {
        let bounds = square().bounding_box().unwrap();
        assert_eq!(bounds.min_x, 10.0);
        assert_eq!(bounds.max_y, 110.0);
        assert_eq!(bounds.width(), 100.0);
        assert!(Polygon::new("hold_1", ClassType::Hold).bounding_box().is_none());
    }
}
