//! Epic collection with placement validation.
//!
//! The store is the single source of truth for epic geometry. Every mutation that
//! changes placement is run through the collision detector first and rejected
//! without side effects if it would overlap another epic.

use crate::collision;
use crate::epic::{next_epic_id, palette_color, Epic, EpicId, EpicPatch};
use crate::error::PlanError;
use crate::geometry::GridSpec;

/// Ordered collection of epics on a fixed grid.
#[derive(Debug, Clone)]
pub struct EpicStore {
    epics: Vec<Epic>,
    grid: GridSpec,
    last_id: Option<EpicId>,
}

impl EpicStore {
    /// Creates an empty store for the given grid.
    pub fn new(grid: GridSpec) -> Self {
        Self {
            epics: Vec::new(),
            grid,
            last_id: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Collection Access
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns all epics in store order.
    pub fn list(&self) -> &[Epic] {
        &self.epics
    }

    /// Mutable access for batch algorithms that re-establish the invariant themselves.
    pub(crate) fn epics_mut(&mut self) -> &mut Vec<Epic> {
        &mut self.epics
    }

    pub fn len(&self) -> usize {
        self.epics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epics.is_empty()
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Returns an epic by its id.
    pub fn get(&self, id: EpicId) -> Option<&Epic> {
        self.epics.iter().find(|e| e.id == id)
    }

    /// Returns the index of an epic by its id.
    pub fn index_of(&self, id: EpicId) -> Option<usize> {
        self.epics.iter().position(|e| e.id == id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adds a one-by-one epic at a grid-aligned position, colored by store length.
    pub fn create(&mut self, left: i32, top: i32) -> Result<EpicId, PlanError> {
        let id = self.fresh_id();
        let epic = Epic::new(id, left, top, palette_color(self.epics.len()));
        self.validate(&epic)?;
        self.last_id = self.last_id.max(Some(id));
        self.epics.push(epic);
        log::debug!("created epic {id} at ({left}, {top})");
        Ok(id)
    }

    /// Applies `patch` to the epic `id`. On any error the store is left untouched.
    pub fn update(&mut self, id: EpicId, patch: &EpicPatch) -> Result<&Epic, PlanError> {
        let index = self.index_of(id).ok_or(PlanError::UnknownEpic(id))?;
        let next = self.epics[index].patched(patch);
        if patch.touches_geometry() {
            self.validate(&next)?;
        }
        self.epics[index] = next;
        Ok(&self.epics[index])
    }

    /// Removes the epic `id`.
    pub fn delete(&mut self, id: EpicId) -> Result<Epic, PlanError> {
        let index = self.index_of(id).ok_or(PlanError::UnknownEpic(id))?;
        log::debug!("deleted epic {id}");
        Ok(self.epics.remove(index))
    }

    /// Replaces the whole collection, as done by file import and initial load.
    pub fn replace_all(&mut self, epics: Vec<Epic>) {
        self.last_id = epics.iter().map(|e| e.id).max();
        self.epics = epics;
    }

    /// Clears all epics.
    pub fn clear(&mut self) {
        self.epics.clear();
    }

    /// A timestamp id past every id handed out so far, or the lowest free id once those run out.
    fn fresh_id(&self) -> EpicId {
        next_epic_id(self.last_id).unwrap_or_else(|| {
            (0..=EpicId::MAX)
                .find(|id| self.get(*id).is_none())
                .unwrap_or_default()
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Checks alignment, size, and overlap of `candidate` against every other epic.
    pub fn validate(&self, candidate: &Epic) -> Result<(), PlanError> {
        if !self.grid.is_aligned(candidate.left, candidate.top) {
            return Err(PlanError::Misaligned {
                left: candidate.left,
                top: candidate.top,
            });
        }
        if candidate.width == 0 || candidate.resource_count == 0 {
            return Err(PlanError::InvalidSize {
                width: candidate.width,
                resource_count: candidate.resource_count,
            });
        }
        let rect = candidate.pixel_rect(&self.grid);
        if !self.grid.contains(&rect) {
            return Err(PlanError::OutOfBounds {
                left: candidate.left,
                top: candidate.top,
                width: candidate.width,
                resource_count: candidate.resource_count,
            });
        }
        match collision::find_overlap(&self.epics, &self.grid, &rect, Some(candidate.id)) {
            Some(blocking) => Err(PlanError::Overlap { blocking }),
            None => Ok(()),
        }
    }

    /// True if no two stored epics overlap.
    pub fn is_settled(&self) -> bool {
        collision::is_settled(&self.epics, &self.grid)
    }
}
