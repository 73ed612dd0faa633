//! Per-image polygon collection with single selection.

use serde::{Deserialize, Serialize};

use super::class::{ClassType, Provenance};
use super::point::Point;
use super::polygon::{Hit, Polygon, PolygonId};
use crate::constants::{MIN_POLYGON_VERTICES, VERTEX_HIT_RADIUS};

/// The current selection: one polygon and optionally one of its vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub polygon: PolygonId,
    pub point: Option<usize>,
}

/// Outcome of deleting a single vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointRemoval {
    /// Index or polygon did not exist
    Ignored,
    /// The vertex was removed
    Removed,
    /// The vertex was removed and the polygon dropped below 3 vertices
    PolygonRemoved,
}

/// Read-only vertex state for a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointView {
    pub x: f32,
    pub y: f32,
    pub selected: bool,
}

/// Read-only polygon state for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonView {
    pub id: PolygonId,
    pub name: String,
    pub class_type: ClassType,
    pub provenance: Provenance,
    pub selected: bool,
    pub points: Vec<PointView>,
}

/// All polygons drawn on a single image.
#[derive(Debug, Clone)]
pub struct AnnotationSet {
    /// Identity of the image these polygons belong to.
    image_key: String,
    /// Polygons in insertion order.
    polygons: Vec<Polygon>,
    /// Counter for generating unique polygon IDs.
    next_id: PolygonId,
    /// Currently selected polygon and vertex.
    selection: Option<Selection>,
    /// Set by every mutation, cleared after save/load.
    dirty: bool,
}

impl AnnotationSet {
    pub fn new(image_key: impl Into<String>) -> Self {
        Self {
            image_key: image_key.into(),
            polygons: Vec::new(),
            next_id: 1,
            selection: None,
            dirty: false,
        }
    }

    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    /// Check if the set has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after a successful save or load.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // ========================================================================
    // Collection
    // ========================================================================

    /// Add a polygon and return its ID. The caller picks a unique name,
    /// usually via [`AnnotationSet::next_name`].
    pub fn add(&mut self, mut polygon: Polygon) -> PolygonId {
        let id = self.next_id;
        self.next_id += 1;
        polygon.id = id;
        self.polygons.push(polygon);
        self.mark_dirty();
        id
    }

    /// Remove a polygon by ID, clearing the selection if it pointed there.
    pub fn remove(&mut self, id: PolygonId) -> Option<Polygon> {
        let index = self.index_of(id)?;
        let removed = self.polygons.remove(index);
        if self.selected_polygon() == Some(id) {
            self.selection = None;
        }
        self.mark_dirty();
        Some(removed)
    }

    /// Remove every polygon matching the predicate. Returns how many were removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Polygon) -> bool) -> usize {
        let before = self.polygons.len();
        let selected = self.selected_polygon();
        self.polygons.retain(|p| !predicate(p));
        let removed = before - self.polygons.len();
        if removed > 0 {
            if selected.is_some_and(|id| self.index_of(id).is_none()) {
                self.selection = None;
            }
            self.mark_dirty();
        }
        removed
    }

    /// Deep-copy a polygon's class and vertices into a newly named polygon,
    /// which becomes the selection.
    pub fn duplicate(&mut self, id: PolygonId) -> Option<PolygonId> {
        let source = self.get(id)?;
        let class_type = source.class_type();
        let points = source.points().to_vec();
        let name = self.next_name(class_type);
        let copy_id = self.add(Polygon::from_points(name, class_type, points));
        self.select_polygon(copy_id);
        Some(copy_id)
    }

    pub fn get(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.id == id)
    }

    /// Mutable access; marks the set dirty when the polygon exists.
    pub fn get_mut(&mut self, id: PolygonId) -> Option<&mut Polygon> {
        let index = self.index_of(id)?;
        self.dirty = true;
        Some(&mut self.polygons[index])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.iter()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Remove all polygons.
    pub fn clear(&mut self) {
        if !self.polygons.is_empty() {
            self.mark_dirty();
        }
        self.polygons.clear();
        self.selection = None;
    }

    /// Number of polygons of the given class.
    pub fn count_of(&self, class_type: ClassType) -> usize {
        self.polygons
            .iter()
            .filter(|p| p.class_type() == class_type)
            .count()
    }

    /// Next free `"{class}_{ordinal}"` name, starting at count + 1.
    pub fn next_name(&self, class_type: ClassType) -> String {
        let mut ordinal = self.count_of(class_type) + 1;
        loop {
            let name = format!("{}_{}", class_type.name(), ordinal);
            if self.get_by_name(&name).is_none() {
                return name;
            }
            ordinal += 1;
        }
    }

    fn index_of(&self, id: PolygonId) -> Option<usize> {
        self.polygons.iter().position(|p| p.id == id)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_polygon(&self) -> Option<PolygonId> {
        self.selection.map(|s| s.polygon)
    }

    pub fn is_selected(&self, id: PolygonId) -> bool {
        self.selected_polygon() == Some(id)
    }

    /// Selected vertex index of the given polygon, if any.
    pub fn selected_point(&self, id: PolygonId) -> Option<usize> {
        self.selection
            .filter(|s| s.polygon == id)
            .and_then(|s| s.point)
    }

    /// Select a polygon, replacing any previous selection.
    pub fn select_polygon(&mut self, id: PolygonId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selection = Some(Selection {
            polygon: id,
            point: None,
        });
        true
    }

    /// Select a vertex (and its polygon), replacing any previous selection.
    pub fn select_point(&mut self, id: PolygonId, index: usize) -> bool {
        match self.get(id) {
            Some(polygon) if index < polygon.len() => {
                self.selection = Some(Selection {
                    polygon: id,
                    point: Some(index),
                });
                true
            }
            _ => false,
        }
    }

    /// Drop the vertex selection, keeping its polygon selected.
    pub fn deselect_point(&mut self) {
        if let Some(selection) = &mut self.selection {
            selection.point = None;
        }
    }

    pub fn deselect_all(&mut self) {
        self.selection = None;
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Find the polygon under a location.
    ///
    /// Vertex hits anywhere in the set win over interior hits; within each
    /// tier the first polygon in insertion order wins.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<(PolygonId, Hit)> {
        self.hit_test_with_radius(x, y, VERTEX_HIT_RADIUS)
    }

    pub fn hit_test_with_radius(&self, x: f32, y: f32, radius: f32) -> Option<(PolygonId, Hit)> {
        let mut interior = None;
        for polygon in &self.polygons {
            match polygon.hit_test_with_radius(x, y, radius) {
                Hit::Vertex(index) => return Some((polygon.id, Hit::Vertex(index))),
                Hit::Interior if interior.is_none() => interior = Some(polygon.id),
                _ => {}
            }
        }
        interior.map(|id| (id, Hit::Interior))
    }

    /// Delete one vertex, dropping the polygon if it can no longer enclose area.
    pub fn delete_point(&mut self, id: PolygonId, index: usize) -> PointRemoval {
        let Some(polygon) = self.get_mut(id) else {
            return PointRemoval::Ignored;
        };
        if polygon.remove_point(index).is_none() {
            return PointRemoval::Ignored;
        }
        let remaining = polygon.len();

        if let Some(selection) = &mut self.selection {
            if selection.polygon == id {
                selection.point = match selection.point {
                    Some(i) if i == index => None,
                    Some(i) if i > index => Some(i - 1),
                    other => other,
                };
            }
        }

        if remaining < MIN_POLYGON_VERTICES {
            self.remove(id);
            log::debug!("Polygon {} dropped below {} vertices", id, MIN_POLYGON_VERTICES);
            PointRemoval::PolygonRemoved
        } else {
            PointRemoval::Removed
        }
    }

    /// Insert edge midpoints into a polygon, keeping its selected vertex selected.
    pub fn insert_midpoints(&mut self, id: PolygonId) -> bool {
        let Some(polygon) = self.get_mut(id) else {
            return false;
        };
        if !polygon.insert_midpoints() {
            return false;
        }
        if let Some(selection) = &mut self.selection {
            if selection.polygon == id {
                selection.point = selection.point.map(|i| i * 2);
            }
        }
        true
    }

    /// Anchor a polygon drag at a location. Anchoring alone does not dirty the set.
    pub fn start_drag(&mut self, id: PolygonId, x: f32, y: f32) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.polygons[index].start_drag(x, y);
                true
            }
            None => false,
        }
    }

    /// End the drag of every polygon with an active anchor.
    pub fn end_all_drags(&mut self) {
        for polygon in self.polygons.iter_mut().filter(|p| p.is_dragging()) {
            polygon.end_drag();
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Snapshot of every polygon with derived selection flags.
    pub fn views(&self) -> Vec<PolygonView> {
        self.polygons
            .iter()
            .map(|polygon| {
                let selected_point = self.selected_point(polygon.id);
                PolygonView {
                    id: polygon.id,
                    name: polygon.name().to_string(),
                    class_type: polygon.class_type(),
                    provenance: polygon.provenance(),
                    selected: self.is_selected(polygon.id),
                    points: polygon
                        .points()
                        .iter()
                        .enumerate()
                        .map(|(i, &Point { x, y })| PointView {
                            x,
                            y,
                            selected: selected_point == Some(i),
                        })
                        .collect(),
                }
            })
            .collect()
    }
}
