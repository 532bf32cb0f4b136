//! Serialization of the project to the key-value store and to export files.
//!
//! Both paths share the `{ projectData, pageTitle, isLockAreaEnabled }` document
//! shape. Absent or `null` fields fall back to their defaults so hand-edited and
//! older files still load.

use crate::constants::{
    DEFAULT_PAGE_TITLE, KEY_HIGHLIGHT_ROW, KEY_LOCK_AREA, KEY_PAGE_TITLE, KEY_PROJECT_DATA,
};
use crate::epic::{next_epic_id, normalize_name, Epic, EpicId};
use crate::error::PlanError;
use crate::geometry::GridSpec;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The exported project triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub project_data: Vec<Epic>,
    pub page_title: String,
    pub is_lock_area_enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    project_data: Option<Vec<Epic>>,
    #[serde(default)]
    page_title: Option<String>,
    #[serde(default)]
    is_lock_area_enabled: Option<bool>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self {
            project_data: Vec::new(),
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            is_lock_area_enabled: false,
        }
    }
}

impl ProjectDocument {
    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        let raw: RawDocument = serde_json::from_str(text)?;
        Ok(Self {
            project_data: raw.project_data.unwrap_or_default(),
            page_title: normalize_title(raw.page_title.as_deref().unwrap_or_default()),
            is_lock_area_enabled: raw.is_lock_area_enabled.unwrap_or(false),
        })
    }
}

/// Trims a project title, falling back to the default when nothing is left.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_PAGE_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Forces imported epics onto the grid.
///
/// Sizes are clamped to the timeline, origins are snapped to the nearest cell
/// where the epic still fits, and repeated ids are replaced by fresh ones.
pub fn sanitize_epics(grid: &GridSpec, epics: Vec<Epic>) -> Vec<Epic> {
    let mut seen = BTreeSet::new();
    let mut last_id = epics.iter().map(|e| e.id).max();
    epics
        .into_iter()
        .map(|mut epic| {
            let width = epic.width.clamp(1, grid.sprint_count.max(1) as u32);
            let resource_count = epic.resource_count.clamp(1, grid.row_count.max(1) as u32);
            if (width, resource_count) != (epic.width, epic.resource_count) {
                log::warn!(
                    "epic {} resized from {}x{} to {width}x{resource_count}",
                    epic.id,
                    epic.width,
                    epic.resource_count
                );
            }
            epic.width = width;
            epic.resource_count = resource_count;

            let (max_left, max_top) = grid.max_origin(width, resource_count);
            let left = grid.snap_to_column(epic.left.clamp(0, max_left) as f32).min(max_left);
            let top = grid.snap_to_row(epic.top.clamp(0, max_top) as f32).min(max_top);
            if left != epic.left || top != epic.top {
                log::warn!(
                    "epic {} moved from ({}, {}) onto grid cell ({left}, {top})",
                    epic.id,
                    epic.left,
                    epic.top
                );
            }
            epic.left = left;
            epic.top = top;

            if !seen.insert(epic.id) {
                let id = next_epic_id(last_id)
                    .filter(|id| !seen.contains(id))
                    .unwrap_or_else(|| {
                        (0..=EpicId::MAX)
                            .find(|id| !seen.contains(id))
                            .unwrap_or_default()
                    });
                log::warn!("duplicate epic id {} replaced by {id}", epic.id);
                seen.insert(id);
                last_id = last_id.max(Some(id));
                epic.id = id;
            }
            epic.name = normalize_name(&epic.name);
            epic
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Export / Import files
// ─────────────────────────────────────────────────────────────────────────────

pub fn write_export(path: &Path, document: &ProjectDocument) -> Result<(), PlanError> {
    fs::write(path, document.to_json()?)?;
    log::info!(
        "exported {} epic(s) to {}",
        document.project_data.len(),
        path.display()
    );
    Ok(())
}

pub fn read_import(path: &Path) -> Result<ProjectDocument, PlanError> {
    let text = fs::read_to_string(path)?;
    let document = ProjectDocument::from_json(&text)?;
    log::info!(
        "imported {} epic(s) from {}",
        document.project_data.len(),
        path.display()
    );
    Ok(document)
}

// ─────────────────────────────────────────────────────────────────────────────
// Key-value store
// ─────────────────────────────────────────────────────────────────────────────

/// Everything kept in the key-value store between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredState {
    pub document: ProjectDocument,
    pub highlight_row: u32,
}

/// Reads the stored project. Entries that are missing or unreadable fall back to defaults.
pub fn load_state(storage: &dyn KeyValueStore) -> StoredState {
    let project_data = storage
        .get_item(KEY_PROJECT_DATA)
        .and_then(|text| match serde_json::from_str::<Option<Vec<Epic>>>(&text) {
            Ok(epics) => epics,
            Err(err) => {
                log::warn!("ignoring unreadable {KEY_PROJECT_DATA}: {err}");
                None
            }
        })
        .unwrap_or_default();
    let page_title = normalize_title(&storage.get_item(KEY_PAGE_TITLE).unwrap_or_default());
    let is_lock_area_enabled = storage
        .get_item(KEY_LOCK_AREA)
        .and_then(|text| serde_json::from_str::<bool>(&text).ok())
        .unwrap_or(false);
    let highlight_row = storage
        .get_item(KEY_HIGHLIGHT_ROW)
        .and_then(|text| text.trim().parse::<u32>().ok())
        .filter(|row| *row >= 1)
        .unwrap_or(1);

    StoredState {
        document: ProjectDocument {
            project_data,
            page_title,
            is_lock_area_enabled,
        },
        highlight_row,
    }
}

/// Writes every entry in one batch. The default title is stored as an absent entry.
pub fn save_state(storage: &mut dyn KeyValueStore, state: &StoredState) -> Result<(), PlanError> {
    let document = &state.document;
    let page_title =
        (document.page_title != DEFAULT_PAGE_TITLE).then(|| document.page_title.clone());
    storage.set_items(vec![
        (
            KEY_PROJECT_DATA,
            Some(serde_json::to_string(&document.project_data)?),
        ),
        (KEY_PAGE_TITLE, page_title),
        (KEY_LOCK_AREA, Some(document.is_lock_area_enabled.to_string())),
        (KEY_HIGHLIGHT_ROW, Some(state.highlight_row.to_string())),
    ])
}
