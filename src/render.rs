//! Builds the visual tree of the timeline from the project and paints it.
//!
//! [`layout`] is a pure function of the project state; the app calls it every
//! frame so the picture always reflects the current store. All rectangles are in
//! timeline pixels and are translated to screen space only when painted.

use crate::constants::{
    COLOR_DELETE_HOVER, COLOR_DROP_BLOCKED, COLOR_DROP_FREE, COLOR_HANDLE, COLOR_HIGHLIGHT_LINE,
    COLOR_ROW_EVEN, COLOR_ROW_ODD, COLOR_SPRINT_BORDER, COLOR_SPRINT_LINE, COLOR_STAR_ACTIVE,
    EPIC_BUTTON_SIZE, EPIC_CORNER_RADIUS, EPIC_INNER_MARGIN, EPIC_LABEL_FONT_SIZE,
    EPIC_NAME_FONT_SIZE, HIGHLIGHT_LINE_THICKNESS, PREVIEW_ALPHA, RESIZE_HANDLE_THICKNESS,
    SPRINTS_PER_INCREMENT,
};
use crate::epic::{Epic, EpicId};
use crate::geometry::GridSpec;
use crate::interaction::HandleRegion;
use crate::project::Project;
use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};

/// Sub-region of an epic under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Body,
    HorizontalHandle,
    VerticalHandle,
    Star,
    Delete,
    Name,
}

impl Hit {
    /// The gesture a pointer-down on this region starts, if any.
    pub fn handle_region(self) -> Option<HandleRegion> {
        match self {
            Hit::Body => Some(HandleRegion::Body),
            Hit::HorizontalHandle => Some(HandleRegion::HorizontalHandle),
            Hit::VerticalHandle => Some(HandleRegion::VerticalHandle),
            Hit::Star | Hit::Delete | Hit::Name => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpicVisual {
    pub id: EpicId,
    pub body: Rect,
    pub fill: Color32,
    pub horizontal_handle: Rect,
    pub vertical_handle: Rect,
    pub star: Rect,
    pub delete: Rect,
    pub name_rect: Rect,
    pub name: String,
    pub starred: bool,
    pub duration_label: String,
    pub resource_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Vec2,
    pub rows: Vec<(Rect, Color32)>,
    /// Vertical sprint lines as `(x, heavy)`.
    pub sprint_lines: Vec<(f32, bool)>,
    pub highlight_y: f32,
    pub epics: Vec<EpicVisual>,
}

/// Lays out the timeline grid and one visual per epic, in store order.
pub fn layout(project: &Project) -> Scene {
    let grid = project.grid();
    let (content_w, content_h) = grid.timeline_px();
    let width = content_w as f32;

    let rows = (0..grid.row_count)
        .map(|row| {
            let top = grid.row_top(row) as f32;
            let rect = Rect::from_min_size(pos2(0.0, top), vec2(width, grid.row_height as f32));
            let color = if row % 2 == 0 {
                COLOR_ROW_EVEN
            } else {
                COLOR_ROW_ODD
            };
            (rect, color)
        })
        .collect();

    let sprint_lines = (1..=content_w / grid.sprint_width)
        .map(|col| {
            (
                grid.column_left(col) as f32,
                col % SPRINTS_PER_INCREMENT == 0,
            )
        })
        .collect();

    let highlight_y = (project.highlight_row() as i32 * grid.row_height) as f32
        - HIGHLIGHT_LINE_THICKNESS;

    Scene {
        size: vec2(width, content_h as f32),
        rows,
        sprint_lines,
        highlight_y,
        epics: project
            .epics()
            .iter()
            .map(|epic| epic_visual(epic, grid))
            .collect(),
    }
}

fn epic_visual(epic: &Epic, grid: &GridSpec) -> EpicVisual {
    let rect = epic.pixel_rect(grid);
    let body = Rect::from_min_size(
        pos2(rect.left as f32, rect.top as f32),
        vec2(rect.width as f32, rect.height as f32),
    );
    let t = RESIZE_HANDLE_THICKNESS;
    let horizontal_handle = Rect::from_min_max(pos2(body.max.x - t, body.min.y), body.max);
    let vertical_handle =
        Rect::from_min_max(pos2(body.min.x, body.max.y - t), pos2(body.max.x - t, body.max.y));

    let button = Vec2::splat(EPIC_BUTTON_SIZE);
    let delete = Rect::from_min_size(
        pos2(
            body.max.x - t - EPIC_BUTTON_SIZE,
            body.min.y + EPIC_INNER_MARGIN,
        ),
        button,
    );
    let star = delete.translate(vec2(-EPIC_BUTTON_SIZE - EPIC_INNER_MARGIN, 0.0));
    let name_rect = Rect::from_min_max(
        body.min + Vec2::splat(EPIC_INNER_MARGIN),
        pos2(
            (star.min.x - EPIC_INNER_MARGIN).max(body.min.x + EPIC_INNER_MARGIN),
            body.min.y + EPIC_INNER_MARGIN + EPIC_NAME_FONT_SIZE + 2.0,
        ),
    );

    EpicVisual {
        id: epic.id,
        body,
        fill: epic.fill_color(),
        horizontal_handle,
        vertical_handle,
        star,
        delete,
        name_rect,
        name: epic.name.clone(),
        starred: epic.starred,
        duration_label: format!("⏱ {}", epic.width),
        resource_label: format!("👥 {}", epic.resource_count),
    }
}

/// Finds the topmost epic region under `point` (timeline pixels).
pub fn hit_test(scene: &Scene, point: Pos2) -> Option<(EpicId, Hit)> {
    scene.epics.iter().rev().find_map(|visual| {
        if !visual.body.contains(point) {
            return None;
        }
        let hit = if visual.delete.contains(point) {
            Hit::Delete
        } else if visual.star.contains(point) {
            Hit::Star
        } else if visual.horizontal_handle.contains(point) {
            Hit::HorizontalHandle
        } else if visual.vertical_handle.contains(point) {
            Hit::VerticalHandle
        } else if visual.name_rect.contains(point) {
            Hit::Name
        } else {
            Hit::Body
        };
        Some((visual.id, hit))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Painting
// ─────────────────────────────────────────────────────────────────────────────

/// Paints `scene` with its origin at `origin` (screen space).
pub fn paint(painter: &egui::Painter, scene: &Scene, origin: Pos2, hover: Option<Pos2>) {
    let offset = origin.to_vec2();

    for (rect, color) in &scene.rows {
        painter.rect_filled(rect.translate(offset), 0.0, *color);
    }
    for &(x, heavy) in &scene.sprint_lines {
        let stroke = if heavy {
            Stroke::new(2.0, COLOR_SPRINT_BORDER)
        } else {
            Stroke::new(1.0, COLOR_SPRINT_LINE)
        };
        painter.vline(origin.x + x, origin.y..=origin.y + scene.size.y, stroke);
    }
    painter.hline(
        origin.x..=origin.x + scene.size.x,
        origin.y + scene.highlight_y + HIGHLIGHT_LINE_THICKNESS / 2.0,
        Stroke::new(HIGHLIGHT_LINE_THICKNESS, COLOR_HIGHLIGHT_LINE),
    );

    for visual in &scene.epics {
        paint_epic(painter, visual, offset, hover);
    }
}

fn paint_epic(painter: &egui::Painter, visual: &EpicVisual, offset: Vec2, hover: Option<Pos2>) {
    let rounding = egui::Rounding::same(EPIC_CORNER_RADIUS);
    let body = visual.body.translate(offset);
    painter.rect_filled(body, rounding, visual.fill);
    painter.rect_stroke(body, rounding, Stroke::new(1.0, Color32::from_black_alpha(80)));
    painter.rect_filled(visual.horizontal_handle.translate(offset), 0.0, COLOR_HANDLE);
    painter.rect_filled(visual.vertical_handle.translate(offset), 0.0, COLOR_HANDLE);

    let name_rect = visual.name_rect.translate(offset);
    let name_painter = painter.with_clip_rect(name_rect.intersect(painter.clip_rect()));
    name_painter.text(
        name_rect.left_top(),
        Align2::LEFT_TOP,
        &visual.name,
        FontId::proportional(EPIC_NAME_FONT_SIZE),
        Color32::WHITE,
    );

    let star = visual.star.translate(offset);
    let star_color = if visual.starred {
        COLOR_STAR_ACTIVE
    } else {
        Color32::from_white_alpha(180)
    };
    painter.text(
        star.center(),
        Align2::CENTER_CENTER,
        if visual.starred { "★" } else { "☆" },
        FontId::proportional(EPIC_BUTTON_SIZE - 2.0),
        star_color,
    );

    let delete = visual.delete.translate(offset);
    let delete_color = if hover.is_some_and(|p| delete.contains(p)) {
        COLOR_DELETE_HOVER
    } else {
        Color32::from_white_alpha(200)
    };
    painter.text(
        delete.center(),
        Align2::CENTER_CENTER,
        "🗑",
        FontId::proportional(EPIC_BUTTON_SIZE - 4.0),
        delete_color,
    );

    let label_font = FontId::proportional(EPIC_LABEL_FONT_SIZE);
    let bottom_left = pos2(
        body.min.x + EPIC_INNER_MARGIN,
        body.max.y - RESIZE_HANDLE_THICKNESS - 1.0,
    );
    let duration = painter.text(
        bottom_left,
        Align2::LEFT_BOTTOM,
        &visual.duration_label,
        label_font.clone(),
        Color32::WHITE,
    );
    painter.text(
        pos2(duration.max.x + EPIC_INNER_MARGIN * 2.0, bottom_left.y),
        Align2::LEFT_BOTTOM,
        &visual.resource_label,
        label_font,
        Color32::WHITE,
    );
}

/// Translucent rectangle for ghost and toolbar-drag previews.
pub fn paint_preview(painter: &egui::Painter, rect: Rect, fill: Color32) {
    let fill = fill.gamma_multiply(PREVIEW_ALPHA);
    let rounding = egui::Rounding::same(EPIC_CORNER_RADIUS);
    painter.rect_filled(rect, rounding, fill);
    painter.rect_stroke(rect, rounding, Stroke::new(1.0, fill));
}

/// Outlines the cell under a toolbar drag, green when the drop would succeed.
pub fn paint_drop_target(painter: &egui::Painter, cell: Rect, free: bool) {
    let color = if free { COLOR_DROP_FREE } else { COLOR_DROP_BLOCKED };
    painter.rect_stroke(cell, EPIC_CORNER_RADIUS, Stroke::new(2.0, color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::ProjectDocument;
    use crate::storage::MemoryStorage;

    fn project(epics: Vec<Epic>, highlight_row: u32) -> Project {
        let mut p = Project::load(GridSpec::default(), Box::new(MemoryStorage::new()));
        p.import_document(ProjectDocument {
            project_data: epics,
            ..Default::default()
        });
        p.set_highlight_row(highlight_row);
        p
    }

    fn wide_epic() -> Epic {
        Epic {
            width: 2,
            resource_count: 2,
            starred: true,
            ..Epic::new(1, 120, 50, "#9c27b0")
        }
    }

    #[test]
    fn scene_mirrors_the_store() {
        let scene = layout(&project(vec![wide_epic()], 3));
        assert_eq!(scene.size, vec2(26.0 * 120.0, 50.0 * 50.0));
        assert_eq!(scene.rows.len(), 50);
        assert_eq!(scene.highlight_y, 148.0);
        assert_eq!(scene.epics.len(), 1);

        let visual = &scene.epics[0];
        assert_eq!(visual.body, Rect::from_min_size(pos2(120.0, 50.0), vec2(240.0, 100.0)));
        assert_eq!(visual.fill, Color32::from_rgb(0x9c, 0x27, 0xb0));
        assert_eq!(visual.duration_label, "⏱ 2");
        assert_eq!(visual.resource_label, "👥 2");
        assert!(visual.starred);
    }

    #[test]
    fn heavy_border_every_sixth_sprint() {
        let scene = layout(&project(vec![], 1));
        let heavy: Vec<f32> = scene
            .sprint_lines
            .iter()
            .filter(|(_, heavy)| *heavy)
            .map(|(x, _)| *x)
            .collect();
        assert_eq!(heavy, vec![720.0, 1440.0, 2160.0, 2880.0]);
        assert!(scene.sprint_lines.iter().all(|(x, _)| *x > 0.0));
    }

    #[test]
    fn epics_past_the_grid_are_pulled_inside_the_scene() {
        let far = Epic::new(1, 30 * 120, 60 * 50, "#1a73e8");
        let scene = layout(&project(vec![far], 1));
        assert_eq!(scene.size, vec2(26.0 * 120.0, 50.0 * 50.0));
        assert_eq!(
            scene.epics[0].body,
            Rect::from_min_size(pos2(25.0 * 120.0, 49.0 * 50.0), vec2(120.0, 50.0))
        );
    }

    #[test]
    fn hit_test_finds_sub_regions() {
        let scene = layout(&project(vec![wide_epic()], 1));
        let visual = &scene.epics[0];
        assert_eq!(hit_test(&scene, visual.delete.center()), Some((1, Hit::Delete)));
        assert_eq!(hit_test(&scene, visual.star.center()), Some((1, Hit::Star)));
        assert_eq!(hit_test(&scene, pos2(357.0, 100.0)), Some((1, Hit::HorizontalHandle)));
        assert_eq!(hit_test(&scene, pos2(200.0, 147.0)), Some((1, Hit::VerticalHandle)));
        assert_eq!(hit_test(&scene, pos2(130.0, 58.0)), Some((1, Hit::Name)));
        assert_eq!(hit_test(&scene, pos2(200.0, 110.0)), Some((1, Hit::Body)));
        assert_eq!(hit_test(&scene, pos2(10.0, 10.0)), None);
    }

    #[test]
    fn only_body_and_handles_start_gestures() {
        assert_eq!(Hit::Body.handle_region(), Some(HandleRegion::Body));
        assert_eq!(
            Hit::VerticalHandle.handle_region(),
            Some(HandleRegion::VerticalHandle)
        );
        assert_eq!(Hit::Delete.handle_region(), None);
    }
}
