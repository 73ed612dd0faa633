//! Pointer and command handling for polygon editing.
//!
//! The controller turns image-space pointer events and editing commands into
//! mutations of an [`AnnotationSet`]. It only keeps transient gesture state;
//! the selection itself lives in the set.

use crate::constants::VERTEX_HIT_RADIUS;
use crate::model::{
    AnnotationSet, ClassType, Hit, ImageSize, PointRemoval, Polygon, PolygonId, Selection,
};

/// Editing state as seen by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Nothing selected
    #[default]
    Idle,
    /// A polygon is selected
    PolygonSelected(PolygonId),
    /// A vertex is selected
    PointSelected { polygon: PolygonId, index: usize },
    /// The selected polygon is being moved
    DraggingPolygon(PolygonId),
    /// The selected vertex is being moved
    DraggingPoint { polygon: PolygonId, index: usize },
}

/// Messages the viewer forwards to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMessage {
    /// Pointer pressed at image coordinates
    Press(f32, f32),
    /// Pointer moved to image coordinates
    Move(f32, f32),
    /// Pointer released
    Release,
    /// Pointer left the drawing surface
    Leave,
    /// Delete the selected vertex, or the selected polygon
    Delete,
    /// Create a polygon of the given class centred on the image
    NewPolygon(ClassType, ImageSize),
    /// Double the vertex count of the selected polygon
    InsertMidpoints,
    /// Change the class of the selected polygon
    SetClass(ClassType),
    /// Copy the selected polygon
    Duplicate,
    /// Clear the selection
    Deselect,
}

/// The vertex or polygon being edited between press and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveEdit {
    polygon: PolygonId,
    point: Option<usize>,
    /// Set once a move has changed the geometry.
    moved: bool,
}

impl ActiveEdit {
    /// Whether the set's selection still points at this edit.
    fn matches(&self, selection: Option<Selection>) -> bool {
        selection
            == Some(Selection {
                polygon: self.polygon,
                point: self.point,
            })
    }
}

/// State machine translating pointer events into polygon edits.
///
/// Only the in-progress gesture is kept here. Resting states are read from
/// the set's selection, so edits made elsewhere (detector proposals, loads)
/// are always reflected by [`InteractionController::state`].
#[derive(Debug, Clone)]
pub struct InteractionController {
    active: Option<ActiveEdit>,
    hit_radius: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self::with_hit_radius(VERTEX_HIT_RADIUS)
    }

    /// Use a custom vertex proximity radius (image pixels).
    pub fn with_hit_radius(hit_radius: f32) -> Self {
        Self {
            active: None,
            hit_radius,
        }
    }

    /// Current editing state of `set` as seen through this controller.
    pub fn state(&self, set: &AnnotationSet) -> InteractionState {
        let selection = set.selection();

        if let Some(edit) = self.active.filter(|e| e.moved && e.matches(selection)) {
            return match edit.point {
                Some(index) => InteractionState::DraggingPoint {
                    polygon: edit.polygon,
                    index,
                },
                None => InteractionState::DraggingPolygon(edit.polygon),
            };
        }

        match selection {
            Some(Selection {
                polygon,
                point: Some(index),
            }) => InteractionState::PointSelected { polygon, index },
            Some(Selection {
                polygon,
                point: None,
            }) => InteractionState::PolygonSelected(polygon),
            None => InteractionState::Idle,
        }
    }

    pub fn hit_radius(&self) -> f32 {
        self.hit_radius
    }

    /// Whether a press has not yet been matched by a release.
    pub fn is_gesture_active(&self) -> bool {
        self.active.is_some()
    }

    /// Forget the in-progress gesture, e.g. when another image becomes active.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Dispatch a message to the matching handler.
    pub fn handle(&mut self, msg: InteractionMessage, set: &mut AnnotationSet) {
        match msg {
            InteractionMessage::Press(x, y) => self.press(set, x, y),
            InteractionMessage::Move(x, y) => self.move_to(set, x, y),
            InteractionMessage::Release => self.release(set),
            InteractionMessage::Leave => self.leave(set),
            InteractionMessage::Delete => self.delete(set),
            InteractionMessage::NewPolygon(class_type, size) => {
                self.new_polygon(set, class_type, size);
            }
            InteractionMessage::InsertMidpoints => self.insert_midpoints(set),
            InteractionMessage::SetClass(class_type) => self.set_class(set, class_type),
            InteractionMessage::Duplicate => {
                self.duplicate(set);
            }
            InteractionMessage::Deselect => self.deselect(set),
        }
    }

    /// Drop a gesture whose target was removed or deselected outside the controller.
    fn drop_stale_edit(&mut self, set: &mut AnnotationSet) {
        if self
            .active
            .is_some_and(|edit| !edit.matches(set.selection()))
        {
            log::debug!("Gesture target changed outside the controller, ending gesture");
            set.end_all_drags();
            self.active = None;
        }
    }

    // ========================================================================
    // Pointer events
    // ========================================================================

    /// Start a gesture: select whatever is under the pointer.
    pub fn press(&mut self, set: &mut AnnotationSet, x: f32, y: f32) {
        self.drop_stale_edit(set);
        if self.active.is_some() {
            log::warn!("Press while previous gesture still active - forcing release");
            self.release(set);
        }

        match set.hit_test_with_radius(x, y, self.hit_radius) {
            Some((polygon, Hit::Vertex(index))) => {
                set.select_point(polygon, index);
                self.active = Some(ActiveEdit {
                    polygon,
                    point: Some(index),
                    moved: false,
                });
                log::debug!("🔍 Selected vertex {} of polygon {}", index, polygon);
            }
            Some((polygon, Hit::Interior)) => {
                set.select_polygon(polygon);
                set.start_drag(polygon, x, y);
                self.active = Some(ActiveEdit {
                    polygon,
                    point: None,
                    moved: false,
                });
                log::debug!("🔍 Selected polygon {} at ({:.1}, {:.1})", polygon, x, y);
            }
            Some((_, Hit::Miss)) | None => {
                set.deselect_all();
                log::debug!("Click on empty area, selection cleared");
            }
        }
    }

    /// Continue a gesture. Moves without a pressed pointer are ignored.
    pub fn move_to(&mut self, set: &mut AnnotationSet, x: f32, y: f32) {
        self.drop_stale_edit(set);
        let Some(edit) = self.active.as_mut() else {
            return;
        };

        let moved = match edit.point {
            Some(index) => set
                .get_mut(edit.polygon)
                .is_some_and(|p| p.move_point(index, x, y)),
            None => set
                .get_mut(edit.polygon)
                .and_then(|p| p.update_drag(x, y))
                .is_some(),
        };
        edit.moved |= moved;
    }

    /// End the gesture. Anchors are cleared; the selection persists.
    pub fn release(&mut self, set: &mut AnnotationSet) {
        set.end_all_drags();
        if let Some(edit) = self.active.take().filter(|e| e.moved) {
            log::debug!("Polygon {} edit ended", edit.polygon);
        }
    }

    /// Pointer left the surface: terminate the gesture like a release.
    pub fn leave(&mut self, set: &mut AnnotationSet) {
        if self.active.is_some() {
            log::debug!("Pointer left surface during gesture");
        }
        self.release(set);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Delete the selected vertex (dropping a degenerate polygon), or else
    /// the selected polygon.
    pub fn delete(&mut self, set: &mut AnnotationSet) {
        let Some(selection) = set.selection() else {
            return;
        };

        match selection.point {
            Some(index) => match set.delete_point(selection.polygon, index) {
                PointRemoval::PolygonRemoved => {
                    log::info!(
                        "🗑️ Deleted vertex {}; polygon {} removed",
                        index,
                        selection.polygon
                    );
                }
                PointRemoval::Removed => {
                    log::debug!("🗑️ Deleted vertex {} of polygon {}", index, selection.polygon);
                }
                PointRemoval::Ignored => {}
            },
            None => {
                if let Some(removed) = set.remove(selection.polygon) {
                    log::info!("🗑️ Deleted polygon {}", removed.name());
                }
            }
        }

        set.end_all_drags();
        set.deselect_all();
        self.active = None;
    }

    /// Add a square polygon centred on the image, side = shorter side / 4,
    /// and select it.
    pub fn new_polygon(
        &mut self,
        set: &mut AnnotationSet,
        class_type: ClassType,
        size: ImageSize,
    ) -> PolygonId {
        let (cx, cy) = size.center();
        let half = size.min_side() / 8.0;

        let mut polygon = Polygon::new(set.next_name(class_type), class_type);
        polygon.add_point(cx - half, cy - half);
        polygon.add_point(cx + half, cy - half);
        polygon.add_point(cx + half, cy + half);
        polygon.add_point(cx - half, cy + half);

        let name = polygon.name().to_string();
        let id = set.add(polygon);
        set.end_all_drags();
        set.select_polygon(id);
        self.active = None;
        log::info!("✅ Created polygon {} (id={})", name, id);
        id
    }

    /// Insert edge midpoints into the selected polygon. No-op without a selection.
    pub fn insert_midpoints(&mut self, set: &mut AnnotationSet) {
        let Some(id) = set.selected_polygon() else {
            return;
        };
        if set.insert_midpoints(id) {
            // A remembered vertex index no longer refers to the same vertex
            self.drop_stale_edit(set);
            log::debug!(
                "Inserted midpoints into polygon {} ({} vertices)",
                id,
                set.get(id).map_or(0, |p| p.len())
            );
        }
    }

    /// Retarget the selected polygon's class; its name is kept.
    pub fn set_class(&mut self, set: &mut AnnotationSet, class_type: ClassType) {
        let Some(id) = set.selected_polygon() else {
            return;
        };
        if let Some(polygon) = set.get_mut(id) {
            polygon.set_class_type(class_type);
            log::debug!("🏷️ Polygon {} is now {}", polygon.name(), class_type);
        }
    }

    /// Copy the selected polygon and select the copy.
    pub fn duplicate(&mut self, set: &mut AnnotationSet) -> Option<PolygonId> {
        let id = set.selected_polygon()?;
        let copy = set.duplicate(id)?;
        set.end_all_drags();
        self.active = None;
        log::debug!("Duplicated polygon {} as {}", id, copy);
        Some(copy)
    }

    pub fn deselect(&mut self, set: &mut AnnotationSet) {
        set.end_all_drags();
        set.deselect_all();
        self.active = None;
    }
}
