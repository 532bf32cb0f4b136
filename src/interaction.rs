//! Pointer-driven drag and resize gestures.
//!
//! A gesture starts on pointer-down over an epic, is fed every pointer-move
//! sample, and ends on pointer-up. Each sample snaps a candidate geometry to the
//! grid and commits it through the [`Project`] when it does not collide; a
//! colliding candidate leaves the epic where it is and produces a ghost rectangle
//! at the raw pointer position instead.

use crate::epic::{Epic, EpicId};
use crate::error::PlanError;
use crate::geometry::GridSpec;
use crate::project::Project;
use eframe::egui::{pos2, vec2, Pos2, Rect, Vec2};

/// Part of an epic the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleRegion {
    Body,
    HorizontalHandle,
    VerticalHandle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging {
        id: EpicId,
        /// Pointer position relative to the epic origin when the drag started.
        grab_offset: Vec2,
    },
    ResizingHorizontal {
        id: EpicId,
        start_x: f32,
        initial_width: u32,
        initial_resources: u32,
    },
    ResizingVertical {
        id: EpicId,
        start_y: f32,
        initial_width: u32,
        initial_resources: u32,
    },
}

/// Result of feeding one pointer sample to the active gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// No gesture is active (or its epic disappeared).
    Idle,
    /// The snapped candidate equals the committed geometry.
    Unchanged,
    /// The candidate was stored.
    Committed,
    /// The candidate collided; `ghost` shows where the pointer wants the epic.
    Blocked { ghost: Rect },
}

#[derive(Debug, Clone)]
pub struct Interaction {
    gesture: Gesture,
    ghost: Option<Rect>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            ghost: None,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn active_epic(&self) -> Option<EpicId> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Dragging { id, .. }
            | Gesture::ResizingHorizontal { id, .. }
            | Gesture::ResizingVertical { id, .. } => Some(id),
        }
    }

    /// Where the last blocked sample wanted the epic, in timeline pixels.
    pub fn ghost(&self) -> Option<Rect> {
        self.ghost
    }

    /// Starts a gesture on epic `id`, replacing any gesture in progress.
    ///
    /// Returns false (and stays idle) when the epic does not exist.
    pub fn begin(
        &mut self,
        project: &Project,
        id: EpicId,
        region: HandleRegion,
        pointer: Pos2,
    ) -> bool {
        self.ghost = None;
        let Some(epic) = project.epic(id) else {
            self.gesture = Gesture::Idle;
            return false;
        };
        self.gesture = match region {
            HandleRegion::Body => Gesture::Dragging {
                id,
                grab_offset: pointer - pos2(epic.left as f32, epic.top as f32),
            },
            HandleRegion::HorizontalHandle => Gesture::ResizingHorizontal {
                id,
                start_x: pointer.x,
                initial_width: epic.width,
                initial_resources: epic.resource_count,
            },
            HandleRegion::VerticalHandle => Gesture::ResizingVertical {
                id,
                start_y: pointer.y,
                initial_width: epic.width,
                initial_resources: epic.resource_count,
            },
        };
        log::debug!("gesture started: {:?}", self.gesture);
        true
    }

    /// Feeds a pointer sample (timeline pixels) to the active gesture.
    pub fn pointer_moved(&mut self, project: &mut Project, pointer: Pos2) -> MoveOutcome {
        let Some(id) = self.active_epic() else {
            return MoveOutcome::Idle;
        };
        let Some(epic) = project.epic(id).cloned() else {
            log::debug!("epic {id} vanished mid-gesture");
            self.gesture = Gesture::Idle;
            self.ghost = None;
            return MoveOutcome::Idle;
        };
        let grid = *project.grid();
        let lock_area = project.is_lock_area_enabled();

        let (candidate, ghost) = match self.gesture {
            Gesture::Idle => return MoveOutcome::Idle,
            Gesture::Dragging { grab_offset, .. } => {
                drag_candidate(&grid, &epic, pointer, grab_offset)
            }
            Gesture::ResizingHorizontal {
                start_x,
                initial_width,
                initial_resources,
                ..
            } => {
                let raw =
                    initial_width as f32 * grid.sprint_width as f32 + (pointer.x - start_x);
                let width = snapped_cells(
                    grid.snap_to_column(raw.max(grid.sprint_width as f32)),
                    grid.sprint_width,
                );
                let resources = if lock_area {
                    preserve_area(initial_width.saturating_mul(initial_resources), width)
                } else {
                    epic.resource_count
                };
                let ghost_size = vec2(
                    raw.max(grid.sprint_width as f32),
                    grid.span_px(width, resources).1 as f32,
                );
                (
                    Candidate::Size { width, resources },
                    Rect::from_min_size(origin(&epic), ghost_size),
                )
            }
            Gesture::ResizingVertical {
                start_y,
                initial_width,
                initial_resources,
                ..
            } => {
                let raw =
                    initial_resources as f32 * grid.row_height as f32 + (pointer.y - start_y);
                let resources = snapped_cells(
                    grid.snap_to_row(raw.max(grid.row_height as f32)),
                    grid.row_height,
                );
                let width = if lock_area {
                    preserve_area(initial_width.saturating_mul(initial_resources), resources)
                } else {
                    epic.width
                };
                let ghost_size = vec2(
                    grid.span_px(width, resources).0 as f32,
                    raw.max(grid.row_height as f32),
                );
                (
                    Candidate::Size { width, resources },
                    Rect::from_min_size(origin(&epic), ghost_size),
                )
            }
        };

        let result = match candidate {
            Candidate::Position { left, top } => {
                if (left, top) == (epic.left, epic.top) {
                    self.ghost = None;
                    return MoveOutcome::Unchanged;
                }
                project.move_epic(id, left, top)
            }
            Candidate::Size { width, resources } => {
                if (width, resources) == (epic.width, epic.resource_count) {
                    self.ghost = None;
                    return MoveOutcome::Unchanged;
                }
                project.resize_epic(id, width, resources)
            }
        };

        match result {
            Ok(()) => {
                self.ghost = None;
                MoveOutcome::Committed
            }
            Err(PlanError::UnknownEpic(_)) => {
                self.gesture = Gesture::Idle;
                self.ghost = None;
                MoveOutcome::Idle
            }
            Err(err) => {
                log::debug!("epic {id} blocked: {err}");
                self.ghost = Some(ghost);
                MoveOutcome::Blocked { ghost }
            }
        }
    }

    /// Ends the gesture on pointer-up; an active gesture always persists once more.
    pub fn end(&mut self, project: &mut Project) {
        if let Some(id) = self.active_epic() {
            log::debug!("gesture on epic {id} ended");
            project.persist();
        }
        self.gesture = Gesture::Idle;
        self.ghost = None;
    }
}

enum Candidate {
    Position { left: i32, top: i32 },
    Size { width: u32, resources: u32 },
}

fn drag_candidate(
    grid: &GridSpec,
    epic: &Epic,
    pointer: Pos2,
    grab_offset: Vec2,
) -> (Candidate, Rect) {
    let raw = pointer - grab_offset;
    let (max_left, max_top) = grid.max_origin(epic.width, epic.resource_count);
    let left = grid.snap_to_column(raw.x).clamp(0, max_left);
    let top = grid.snap_to_row(raw.y).clamp(0, max_top);
    let (w, h) = grid.span_px(epic.width, epic.resource_count);
    (
        Candidate::Position { left, top },
        Rect::from_min_size(raw, vec2(w as f32, h as f32)),
    )
}

fn origin(epic: &Epic) -> Pos2 {
    pos2(epic.left as f32, epic.top as f32)
}

fn snapped_cells(px: i32, unit: i32) -> u32 {
    (px / unit).max(1) as u32
}

/// Other dimension that keeps `area` for a new `side`, rounded half up, at least one.
pub fn preserve_area(area: u32, side: u32) -> u32 {
    let side = side.max(1);
    (area.saturating_mul(2).saturating_add(side) / side.saturating_mul(2)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::ProjectDocument;
    use crate::storage::MemoryStorage;

    fn epic(id: EpicId, left: i32, top: i32, width: u32, resource_count: u32) -> Epic {
        Epic {
            width,
            resource_count,
            ..Epic::new(id, left, top, "#1a73e8")
        }
    }

    fn project_with(epics: Vec<Epic>, lock_area: bool) -> Project {
        let mut project = Project::load(GridSpec::default(), Box::new(MemoryStorage::new()));
        project.import_document(ProjectDocument {
            project_data: epics,
            page_title: "Test".into(),
            is_lock_area_enabled: lock_area,
        });
        project
    }

    fn geometry(project: &Project, id: EpicId) -> (i32, i32, u32, u32) {
        let e = project.epic(id).unwrap();
        (e.left, e.top, e.width, e.resource_count)
    }

    #[test]
    fn drag_follows_pointer_on_the_grid() {
        let mut p = project_with(vec![epic(1, 0, 0, 1, 1)], false);
        let mut gesture = Interaction::new();
        assert!(gesture.begin(&p, 1, HandleRegion::Body, pos2(30.0, 20.0)));

        assert_eq!(
            gesture.pointer_moved(&mut p, pos2(70.0, 30.0)),
            MoveOutcome::Unchanged
        );
        assert_eq!(
            gesture.pointer_moved(&mut p, pos2(280.0, 95.0)),
            MoveOutcome::Committed
        );
        assert_eq!(geometry(&p, 1), (240, 100, 1, 1));

        gesture.end(&mut p);
        assert!(!gesture.is_active());
    }

    #[test]
    fn drag_clamps_to_the_timeline_origin() {
        let mut p = project_with(vec![epic(1, 240, 100, 1, 1)], false);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 1, HandleRegion::Body, pos2(250.0, 110.0));
        gesture.pointer_moved(&mut p, pos2(-400.0, -300.0));
        assert_eq!(geometry(&p, 1), (0, 0, 1, 1));
    }

    #[test]
    fn drag_stops_at_the_far_edge_of_the_timeline() {
        let mut p = project_with(vec![epic(1, 0, 0, 2, 3)], false);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 1, HandleRegion::Body, pos2(10.0, 10.0));
        gesture.pointer_moved(&mut p, pos2(9_000.0, 9_000.0));
        assert_eq!(geometry(&p, 1), (24 * 120, 47 * 50, 2, 3));
    }

    #[test]
    fn drag_onto_occupied_cell_keeps_stored_position() {
        let mut p = project_with(vec![epic(1, 0, 0, 1, 1), epic(2, 240, 0, 1, 1)], false);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 2, HandleRegion::Body, pos2(250.0, 10.0));

        let outcome = gesture.pointer_moved(&mut p, pos2(15.0, 12.0));
        match outcome {
            MoveOutcome::Blocked { ghost } => {
                assert_eq!(ghost.min, pos2(5.0, 2.0));
                assert_eq!(ghost.size(), vec2(120.0, 50.0));
            }
            other => panic!("expected a blocked move, got {other:?}"),
        }
        assert!(gesture.ghost().is_some());

        let revision = p.revision();
        gesture.end(&mut p);
        assert_eq!(p.revision(), revision + 1);
        assert_eq!(geometry(&p, 2), (240, 0, 1, 1));
        assert!(gesture.ghost().is_none());
        assert!(p.store().is_settled());
    }

    #[test]
    fn blocked_drag_resumes_once_pointer_reaches_free_cell() {
        let mut p = project_with(vec![epic(1, 120, 0, 1, 1), epic(2, 240, 0, 1, 1)], false);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 2, HandleRegion::Body, pos2(240.0, 0.0));
        assert!(matches!(
            gesture.pointer_moved(&mut p, pos2(120.0, 0.0)),
            MoveOutcome::Blocked { .. }
        ));
        assert_eq!(
            gesture.pointer_moved(&mut p, pos2(0.0, 0.0)),
            MoveOutcome::Committed
        );
        assert_eq!(geometry(&p, 2), (0, 0, 1, 1));
        assert!(gesture.ghost().is_none());
    }

    #[test]
    fn horizontal_resize_changes_width_only() {
        let mut p = project_with(vec![epic(1, 0, 0, 1, 2)], false);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 1, HandleRegion::HorizontalHandle, pos2(118.0, 40.0));
        gesture.pointer_moved(&mut p, pos2(118.0 + 250.0, 40.0));
        assert_eq!(geometry(&p, 1), (0, 0, 3, 2));

        gesture.pointer_moved(&mut p, pos2(-500.0, 40.0));
        assert_eq!(geometry(&p, 1), (0, 0, 1, 2));
    }

    #[test]
    fn locked_horizontal_resize_preserves_area() {
        let mut p = project_with(vec![epic(1, 0, 0, 2, 2)], true);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 1, HandleRegion::HorizontalHandle, pos2(240.0, 50.0));
        gesture.pointer_moved(&mut p, pos2(480.0, 50.0));
        assert_eq!(geometry(&p, 1), (0, 0, 4, 1));
    }

    #[test]
    fn locked_vertical_resize_preserves_area() {
        let mut p = project_with(vec![epic(1, 0, 0, 4, 1)], true);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 1, HandleRegion::VerticalHandle, pos2(200.0, 50.0));
        gesture.pointer_moved(&mut p, pos2(200.0, 150.0));
        assert_eq!(geometry(&p, 1), (0, 0, 1, 3));
        gesture.pointer_moved(&mut p, pos2(200.0, 100.0));
        assert_eq!(geometry(&p, 1), (0, 0, 2, 2));
    }

    #[test]
    fn resize_into_neighbour_is_rejected() {
        let mut p = project_with(vec![epic(1, 0, 0, 1, 1), epic(2, 0, 100, 1, 1)], false);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 1, HandleRegion::VerticalHandle, pos2(60.0, 50.0));
        assert_eq!(
            gesture.pointer_moved(&mut p, pos2(60.0, 100.0)),
            MoveOutcome::Committed
        );
        let outcome = gesture.pointer_moved(&mut p, pos2(60.0, 150.0));
        assert!(matches!(outcome, MoveOutcome::Blocked { .. }));
        assert_eq!(geometry(&p, 1), (0, 0, 1, 2));
    }

    #[test]
    fn new_gesture_replaces_the_previous_one() {
        let mut p = project_with(vec![epic(1, 0, 0, 1, 1), epic(2, 240, 0, 1, 1)], false);
        let mut gesture = Interaction::new();
        gesture.begin(&p, 1, HandleRegion::Body, pos2(10.0, 10.0));
        gesture.begin(&p, 2, HandleRegion::HorizontalHandle, pos2(360.0, 10.0));
        assert_eq!(gesture.active_epic(), Some(2));
        gesture.pointer_moved(&mut p, pos2(480.0, 10.0));
        assert_eq!(geometry(&p, 1), (0, 0, 1, 1));
        assert_eq!(geometry(&p, 2), (240, 0, 2, 1));
    }

    #[test]
    fn gesture_on_missing_epic_is_a_no_op() {
        let mut p = project_with(vec![epic(1, 0, 0, 1, 1)], false);
        let mut gesture = Interaction::new();
        assert!(!gesture.begin(&p, 99, HandleRegion::Body, pos2(0.0, 0.0)));
        assert_eq!(
            gesture.pointer_moved(&mut p, pos2(300.0, 0.0)),
            MoveOutcome::Idle
        );

        gesture.begin(&p, 1, HandleRegion::Body, pos2(0.0, 0.0));
        p.delete_epic(1).unwrap();
        assert_eq!(
            gesture.pointer_moved(&mut p, pos2(300.0, 0.0)),
            MoveOutcome::Idle
        );
        assert!(!gesture.is_active());
    }

    #[test]
    fn idle_pointer_up_does_not_persist() {
        let mut p = project_with(vec![], false);
        let revision = p.revision();
        Interaction::new().end(&mut p);
        assert_eq!(p.revision(), revision);
    }

    #[test]
    fn area_rounding_matches_half_up() {
        assert_eq!(preserve_area(4, 4), 1);
        assert_eq!(preserve_area(3, 2), 2);
        assert_eq!(preserve_area(4, 3), 1);
        assert_eq!(preserve_area(1, 5), 1);
        assert_eq!(preserve_area(6, 0), 6);
        assert!(preserve_area(u32::MAX, 1) >= u32::MAX / 2);
    }
}
