//! Centralized constants for grid geometry, persistence keys, UI sizing, and colors.
//!
//! The grid dimensions are fixed for a session; everything that draws or places
//! an epic reads them from here through [`crate::geometry::GridSpec::default`].

use eframe::egui::Color32;

// =============================================================================
// GRID CONSTANTS
// =============================================================================

/// Width in pixels of one sprint column.
pub const SPRINT_WIDTH: i32 = 120;

/// Height in pixels of one resource row.
pub const ROW_HEIGHT: i32 = 50;

/// Number of sprint columns on the timeline, also the auto-arrange horizon.
pub const SPRINT_COUNT: i32 = 26;

/// Number of resource rows drawn on the timeline.
pub const ROW_COUNT: i32 = 50;

/// A heavier sprint border is drawn every this many sprints.
pub const SPRINTS_PER_INCREMENT: i32 = 6;

// =============================================================================
// EPIC DEFAULTS
// =============================================================================

/// Name given to freshly created epics and to epics renamed to an empty string.
pub const DEFAULT_EPIC_NAME: &str = "New Epic";

/// Colors assigned to new epics, cycling by store length.
pub const EPIC_PALETTE: [&str; 6] = [
    "#1a73e8", "#34a853", "#6B8E23", "#009688", "#9c27b0", "#4682B4",
];

// =============================================================================
// PERSISTENCE
// =============================================================================

pub const KEY_PROJECT_DATA: &str = "projectData";
pub const KEY_PAGE_TITLE: &str = "pageTitle";
pub const KEY_HIGHLIGHT_ROW: &str = "highlightRow";
pub const KEY_LOCK_AREA: &str = "isLockAreaEnabled";

/// Title used when none is stored or the heading is edited to nothing.
pub const DEFAULT_PAGE_TITLE: &str = "My Project";

/// File name offered when exporting a project.
pub const EXPORT_FILE_NAME: &str = "projectData.gntt";

/// Extension used by the export/import dialogs.
pub const EXPORT_EXTENSION: &str = "gntt";

/// Name of the key-value file inside the application data directory.
pub const STORAGE_FILE_NAME: &str = "local_storage.json";

// =============================================================================
// WINDOW CONSTANTS
// =============================================================================

/// Initial window width when the application starts.
pub const INITIAL_WINDOW_WIDTH: f32 = 1280.0;

/// Initial window height when the application starts.
pub const INITIAL_WINDOW_HEIGHT: f32 = 720.0;

// =============================================================================
// EPIC RENDERING CONSTANTS
// =============================================================================

/// Thickness of the grab strip on the right (horizontal) and bottom (vertical) edges.
pub const RESIZE_HANDLE_THICKNESS: f32 = 8.0;

/// Corner radius for epic rectangles.
pub const EPIC_CORNER_RADIUS: f32 = 4.0;

/// Gap kept between the epic border and its contents.
pub const EPIC_INNER_MARGIN: f32 = 4.0;

/// Side length of the star and delete buttons.
pub const EPIC_BUTTON_SIZE: f32 = 16.0;

/// Font size for the epic name.
pub const EPIC_NAME_FONT_SIZE: f32 = 13.0;

/// Font size for the duration and resource labels.
pub const EPIC_LABEL_FONT_SIZE: f32 = 11.0;

/// Thickness of the highlight-row line.
pub const HIGHLIGHT_LINE_THICKNESS: f32 = 2.0;

/// Opacity applied to the ghost preview and the toolbar drag preview.
pub const PREVIEW_ALPHA: f32 = 0.5;

// =============================================================================
// TOOLBAR CONSTANTS
// =============================================================================

/// Spacing at the start of the toolbar.
pub const TOOLBAR_START_SPACING: f32 = 8.0;

/// Size of toolbar button icons.
pub const TOOLBAR_ICON_SIZE: f32 = 20.0;

/// Minimum size for toolbar buttons.
pub const TOOLBAR_BUTTON_SIZE: f32 = 32.0;

/// Font size of the editable project title.
pub const TITLE_FONT_SIZE: f32 = 24.0;

// =============================================================================
// COLORS
// =============================================================================

/// Background color for the toolbar.
pub const COLOR_TOOLBAR_BG: Color32 = Color32::from_rgb(30, 30, 30);

/// Fill for even resource rows.
pub const COLOR_ROW_EVEN: Color32 = Color32::from_rgb(245, 245, 245);

/// Fill for odd resource rows.
pub const COLOR_ROW_ODD: Color32 = Color32::from_rgb(235, 235, 235);

/// Thin line between sprint columns.
pub const COLOR_SPRINT_LINE: Color32 = Color32::from_rgb(220, 220, 220);

/// Heavier border every [`SPRINTS_PER_INCREMENT`] sprints.
pub const COLOR_SPRINT_BORDER: Color32 = Color32::from_rgb(150, 150, 150);

/// The highlighted resource row line.
pub const COLOR_HIGHLIGHT_LINE: Color32 = Color32::from_rgb(220, 40, 40);

/// Placeholder color for the default project title.
pub const COLOR_TITLE_PLACEHOLDER: Color32 = Color32::from_rgb(176, 176, 176);

/// Star color when an epic is starred.
pub const COLOR_STAR_ACTIVE: Color32 = Color32::from_rgb(255, 200, 0);

/// Resize handle tint.
pub const COLOR_HANDLE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 60);

/// Delete button color when hovered.
pub const COLOR_DELETE_HOVER: Color32 = Color32::from_rgb(255, 100, 100);

/// Fallback when a stored color string cannot be parsed.
pub const COLOR_EPIC_FALLBACK: Color32 = Color32::from_rgb(26, 115, 232);

/// Lock toggle background while area lock is on.
pub const COLOR_LOCK_ACTIVE: Color32 = Color32::from_rgb(0, 110, 60);

/// Outline of the cell a toolbar drop would land in.
pub const COLOR_DROP_FREE: Color32 = Color32::from_rgb(52, 168, 83);

pub const COLOR_DROP_BLOCKED: Color32 = Color32::from_rgb(220, 40, 40);
