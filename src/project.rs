//! The project controller: sole owner of the epic store, the settings, and the
//! key-value store they persist to.
//!
//! Every successful mutation writes the full project back to storage and bumps
//! the revision counter the UI uses to request a repaint. Rejected mutations
//! return the error and leave both memory and storage untouched.

use crate::arrange;
use crate::collision;
use crate::epic::{Epic, EpicId, EpicPatch};
use crate::error::PlanError;
use crate::epic_store::EpicStore;
use crate::geometry::{GridSpec, PixelRect};
use crate::persistence::{self, normalize_title, ProjectDocument, StoredState};
use crate::storage::KeyValueStore;

pub struct Project {
    store: EpicStore,
    page_title: String,
    highlight_row: u32,
    lock_area: bool,
    storage: Box<dyn KeyValueStore>,
    revision: u64,
}

impl Project {
    /// Restores the project kept in `storage`, or starts an empty one.
    pub fn load(grid: GridSpec, storage: Box<dyn KeyValueStore>) -> Self {
        let StoredState {
            document,
            highlight_row,
        } = persistence::load_state(storage.as_ref());
        let mut store = EpicStore::new(grid);
        store.replace_all(persistence::sanitize_epics(&grid, document.project_data));
        if !store.is_settled() {
            log::warn!("stored project contains overlapping epics");
        }
        log::info!("loaded {} epic(s) from storage", store.len());
        Self {
            highlight_row: highlight_row.clamp(1, grid.row_count.max(1) as u32),
            store,
            page_title: document.page_title,
            lock_area: document.is_lock_area_enabled,
            storage,
            revision: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn epics(&self) -> &[Epic] {
        self.store.list()
    }

    pub fn epic(&self, id: EpicId) -> Option<&Epic> {
        self.store.get(id)
    }

    pub fn store(&self) -> &EpicStore {
        &self.store
    }

    pub fn grid(&self) -> &GridSpec {
        self.store.grid()
    }

    pub fn page_title(&self) -> &str {
        &self.page_title
    }

    pub fn highlight_row(&self) -> u32 {
        self.highlight_row
    }

    pub fn is_lock_area_enabled(&self) -> bool {
        self.lock_area
    }

    /// Incremented after every persisted change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Epic mutations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates an epic in the cell under the timeline point `(x, y)`.
    ///
    /// When that cell is taken the surrounding cells are tried, left column first,
    /// and the drop is refused if all of them are taken too.
    pub fn drop_epic(&mut self, x: f32, y: f32) -> Result<EpicId, PlanError> {
        let grid = *self.grid();
        let column = grid.column_at(x).max(0);
        let row = grid.row_at(y).max(0);

        let mut result = self
            .store
            .create(grid.column_left(column), grid.row_top(row));
        if matches!(result, Err(PlanError::Overlap { .. })) {
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    let (c, r) = (column + dx, row + dy);
                    if c < 0 || r < 0 {
                        continue;
                    }
                    if let Ok(id) = self.store.create(grid.column_left(c), grid.row_top(r)) {
                        result = Ok(id);
                        break 'search;
                    }
                }
            }
        }
        let id = result?;
        self.persist();
        Ok(id)
    }

    /// True if a new epic dropped at timeline point `(x, y)` would fit in the cell under it.
    pub fn cell_is_free(&self, x: f32, y: f32) -> bool {
        let grid = self.grid();
        let (width, height) = grid.span_px(1, 1);
        let cell = PixelRect::new(
            grid.column_left(grid.column_at(x)),
            grid.row_top(grid.row_at(y)),
            width,
            height,
        );
        grid.contains(&cell) && !collision::overlaps(self.epics(), grid, &cell, None)
    }

    /// Applies `patch` to epic `id` and persists on success.
    pub fn update_epic(&mut self, id: EpicId, patch: &EpicPatch) -> Result<(), PlanError> {
        self.store.update(id, patch)?;
        self.persist();
        Ok(())
    }

    pub fn move_epic(&mut self, id: EpicId, left: i32, top: i32) -> Result<(), PlanError> {
        self.update_epic(id, &EpicPatch::position(left, top))
    }

    pub fn resize_epic(
        &mut self,
        id: EpicId,
        width: u32,
        resource_count: u32,
    ) -> Result<(), PlanError> {
        self.update_epic(id, &EpicPatch::size(width, resource_count))
    }

    pub fn rename_epic(&mut self, id: EpicId, name: &str) -> Result<(), PlanError> {
        self.update_epic(id, &EpicPatch::rename(name))
    }

    pub fn toggle_star(&mut self, id: EpicId) -> Result<(), PlanError> {
        let starred = self.store.get(id).ok_or(PlanError::UnknownEpic(id))?.starred;
        self.update_epic(id, &EpicPatch::starred(!starred))
    }

    pub fn delete_epic(&mut self, id: EpicId) -> Result<(), PlanError> {
        self.store.delete(id)?;
        self.persist();
        Ok(())
    }

    /// Empties the timeline and resets the title and area lock.
    pub fn clear_timeline(&mut self) {
        self.store.clear();
        self.page_title = normalize_title("");
        self.lock_area = false;
        log::info!("timeline cleared");
        self.persist();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Batch layout
    // ─────────────────────────────────────────────────────────────────────────────

    /// Repacks every epic within `highlight_row` resource rows.
    ///
    /// Persists once, whether or not the pass succeeded: a failed pass still
    /// keeps the new priority order, with the previous positions restored.
    pub fn arrange(&mut self) -> Result<(), PlanError> {
        let grid = *self.grid();
        let result = arrange::arrange(self.store.epics_mut(), &grid, self.highlight_row);
        self.persist();
        result
    }

    /// Pulls epics up and left in their current order, within `highlight_row` rows.
    pub fn compact_vertically(&mut self) -> Result<(), PlanError> {
        let grid = *self.grid();
        arrange::compact_vertically(self.store.epics_mut(), &grid, self.highlight_row)?;
        self.persist();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn set_page_title(&mut self, title: &str) {
        let title = normalize_title(title);
        if title != self.page_title {
            self.page_title = title;
            self.persist();
        }
    }

    /// Sets the highlighted row, which is also the resource limit for arranging.
    pub fn set_highlight_row(&mut self, row: u32) {
        let row = row.clamp(1, self.grid().row_count.max(1) as u32);
        if row != self.highlight_row {
            self.highlight_row = row;
            self.persist();
        }
    }

    pub fn toggle_lock_area(&mut self) {
        self.lock_area = !self.lock_area;
        log::debug!("area lock {}", if self.lock_area { "on" } else { "off" });
        self.persist();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Import / export
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn export_document(&self) -> ProjectDocument {
        ProjectDocument {
            project_data: self.store.list().to_vec(),
            page_title: self.page_title.clone(),
            is_lock_area_enabled: self.lock_area,
        }
    }

    /// Replaces the epics, title, and lock flag in one step.
    pub fn import_document(&mut self, document: ProjectDocument) {
        let grid = *self.grid();
        self.store
            .replace_all(persistence::sanitize_epics(&grid, document.project_data));
        if !self.store.is_settled() {
            log::warn!("imported project contains overlapping epics; arrange to repair");
        }
        self.page_title = normalize_title(&document.page_title);
        self.lock_area = document.is_lock_area_enabled;
        self.persist();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────────

    /// Writes the whole project to storage and marks it for re-render.
    ///
    /// Storage failures are logged; the in-memory project stays authoritative.
    pub fn persist(&mut self) {
        let state = StoredState {
            document: self.export_document(),
            highlight_row: self.highlight_row,
        };
        if let Err(err) = persistence::save_state(self.storage.as_mut(), &state) {
            log::error!("failed to persist project: {err}");
        }
        self.revision += 1;
    }
}
