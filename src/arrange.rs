//! Greedy repacking of epics onto a bounded grid.
//!
//! Both passes are first-fit over an occupancy matrix of `max_resources` rows by
//! `sprint_count` columns. They are all-or-nothing: when an epic cannot be placed
//! the positions from before the pass are restored, so the store never ends up
//! with a half-arranged, overlapping layout.

use crate::epic::{Epic, EpicId};
use crate::error::PlanError;
use crate::geometry::GridSpec;
use std::cmp::Ordering;

/// Order in which `arrange` places epics: starred first, then larger area first.
pub fn arrange_order(a: &Epic, b: &Epic) -> Ordering {
    b.starred
        .cmp(&a.starred)
        .then_with(|| b.area().cmp(&a.area()))
}

/// Sorts `epics` by [`arrange_order`] and packs them column by column.
///
/// The sort is stable and is kept even when the pass fails.
pub fn arrange(epics: &mut [Epic], grid: &GridSpec, max_resources: u32) -> Result<(), PlanError> {
    epics.sort_by(arrange_order);
    pack(epics, grid, max_resources, ScanOrder::ColumnMajor)
}

/// Packs epics row by row in their current order, pulling them up and left.
pub fn compact_vertically(
    epics: &mut [Epic],
    grid: &GridSpec,
    max_resources: u32,
) -> Result<(), PlanError> {
    pack(epics, grid, max_resources, ScanOrder::RowMajor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanOrder {
    /// Columns outer, rows inner: fills each sprint top to bottom before moving right.
    ColumnMajor,
    /// Rows outer, columns inner.
    RowMajor,
}

fn pack(
    epics: &mut [Epic],
    grid: &GridSpec,
    max_resources: u32,
    order: ScanOrder,
) -> Result<(), PlanError> {
    let max_resources = max_resources.clamp(1, grid.row_count.max(1) as u32);
    let snapshot: Vec<(i32, i32)> = epics.iter().map(|e| (e.left, e.top)).collect();
    let mut occupancy = Occupancy::new(max_resources as usize, grid.sprint_count.max(0) as usize);

    for index in 0..epics.len() {
        let epic = &epics[index];
        let Some((row, col)) = occupancy.first_fit(epic, order) else {
            let id: EpicId = epic.id;
            log::warn!(
                "epic {id} ({}x{}) does not fit in {max_resources} resource row(s)",
                epic.width,
                epic.resource_count
            );
            restore(epics, &snapshot);
            return Err(PlanError::NoFit { id, max_resources });
        };
        occupancy.mark(epic, row, col);
        let epic = &mut epics[index];
        epic.left = grid.column_left(col as i32);
        epic.top = grid.row_top(row as i32);
    }
    log::info!(
        "packed {} epic(s) into {max_resources} resource row(s)",
        epics.len()
    );
    Ok(())
}

fn restore(epics: &mut [Epic], snapshot: &[(i32, i32)]) {
    for (epic, &(left, top)) in epics.iter_mut().zip(snapshot) {
        epic.left = left;
        epic.top = top;
    }
}

struct Occupancy {
    cells: Vec<Vec<bool>>,
    columns: usize,
}

impl Occupancy {
    fn new(rows: usize, columns: usize) -> Self {
        Self {
            cells: vec![vec![false; columns]; rows],
            columns,
        }
    }

    fn rows(&self) -> usize {
        self.cells.len()
    }

    fn first_fit(&self, epic: &Epic, order: ScanOrder) -> Option<(usize, usize)> {
        let (rows, columns) = (self.rows(), self.columns);
        match order {
            ScanOrder::ColumnMajor => (0..columns)
                .flat_map(|col| (0..rows).map(move |row| (row, col)))
                .find(|&(row, col)| self.fits(epic, row, col)),
            ScanOrder::RowMajor => (0..rows)
                .flat_map(|row| (0..columns).map(move |col| (row, col)))
                .find(|&(row, col)| self.fits(epic, row, col)),
        }
    }

    fn fits(&self, epic: &Epic, row: usize, col: usize) -> bool {
        let (height, width) = (epic.resource_count as usize, epic.width as usize);
        if row + height > self.rows() || col + width > self.columns {
            return false;
        }
        self.cells[row..row + height]
            .iter()
            .all(|cells| cells[col..col + width].iter().all(|taken| !taken))
    }

    fn mark(&mut self, epic: &Epic, row: usize, col: usize) {
        let (height, width) = (epic.resource_count as usize, epic.width as usize);
        for cells in &mut self.cells[row..row + height] {
            for taken in &mut cells[col..col + width] {
                *taken = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::is_settled;

    fn epic(id: EpicId, width: u32, resource_count: u32, starred: bool) -> Epic {
        Epic {
            width,
            resource_count,
            starred,
            ..Epic::new(id, 600, 600, "#1a73e8")
        }
    }

    fn positions(epics: &[Epic]) -> Vec<(EpicId, i32, i32)> {
        epics.iter().map(|e| (e.id, e.left, e.top)).collect()
    }

    #[test]
    fn two_unit_epics_fill_the_first_row() {
        let grid = GridSpec::default();
        let mut epics = vec![epic(1, 1, 1, false), epic(2, 1, 1, false)];
        arrange(&mut epics, &grid, 1).unwrap();
        assert_eq!(positions(&epics), vec![(1, 0, 0), (2, 120, 0)]);
        assert!(is_settled(&epics, &grid));
    }

    #[test]
    fn starred_then_larger_epics_go_first() {
        let grid = GridSpec::default();
        let mut epics = vec![
            epic(1, 1, 1, false),
            epic(2, 3, 1, false),
            epic(3, 1, 1, true),
            epic(4, 2, 2, false),
        ];
        arrange(&mut epics, &grid, 2).unwrap();
        let order: Vec<EpicId> = epics.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![3, 4, 2, 1]);
        // 3 takes (0,0); 4 (2x2) cannot start at column 0 so it goes to column 1;
        // 2 (3x1) first fits at column 3; 1 fills the gap under 3.
        assert_eq!(
            positions(&epics),
            vec![(3, 0, 0), (4, 120, 0), (2, 360, 0), (1, 0, 50)]
        );
        assert!(is_settled(&epics, &grid));
    }

    #[test]
    fn column_major_scan_fills_rows_before_columns() {
        let grid = GridSpec::default();
        let mut epics = vec![epic(1, 1, 1, false), epic(2, 1, 1, false)];
        arrange(&mut epics, &grid, 3).unwrap();
        assert_eq!(positions(&epics), vec![(1, 0, 0), (2, 0, 50)]);
    }

    #[test]
    fn arranging_twice_is_stable() {
        let grid = GridSpec::default();
        let mut epics = vec![
            epic(1, 2, 1, false),
            epic(2, 1, 2, true),
            epic(3, 4, 1, false),
            epic(4, 1, 1, false),
        ];
        arrange(&mut epics, &grid, 2).unwrap();
        let first = positions(&epics);
        arrange(&mut epics, &grid, 2).unwrap();
        assert_eq!(positions(&epics), first);
    }

    #[test]
    fn failed_pass_restores_positions() {
        let grid = GridSpec::default();
        let mut epics = vec![epic(1, 1, 1, false), epic(2, 1, 3, false)];
        epics[0].left = 240;
        epics[1].left = 0;
        epics[1].top = 0;
        let err = arrange(&mut epics, &grid, 2).unwrap_err();
        assert!(matches!(err, PlanError::NoFit { id: 2, max_resources: 2 }));
        // Sorted by area, positions as before the pass.
        assert_eq!(positions(&epics), vec![(2, 0, 0), (1, 240, 600)]);
    }

    #[test]
    fn too_wide_epic_never_fits() {
        let grid = GridSpec::default();
        let mut epics = vec![epic(1, 27, 1, false)];
        assert!(arrange(&mut epics, &grid, 5).is_err());
    }

    #[test]
    fn compaction_keeps_order_and_scans_rows_first() {
        let grid = GridSpec::default();
        let mut epics = vec![epic(1, 1, 1, false), epic(2, 2, 1, true), epic(3, 1, 1, false)];
        compact_vertically(&mut epics, &grid, 3).unwrap();
        assert_eq!(
            positions(&epics),
            vec![(1, 0, 0), (2, 120, 0), (3, 360, 0)]
        );
    }

    #[test]
    fn zero_resource_limit_behaves_like_one() {
        let grid = GridSpec::default();
        let mut epics = vec![epic(1, 1, 1, false), epic(2, 1, 1, false)];
        arrange(&mut epics, &grid, 0).unwrap();
        assert_eq!(positions(&epics), vec![(1, 0, 0), (2, 120, 0)]);
    }

    #[test]
    fn resource_limit_is_capped_at_the_grid_height() {
        let grid = GridSpec::default();
        let mut epics = vec![epic(1, 1, 50, false), epic(2, 1, 1, false)];
        arrange(&mut epics, &grid, u32::MAX).unwrap();
        assert_eq!(positions(&epics), vec![(1, 0, 0), (2, 120, 0)]);
    }
}
