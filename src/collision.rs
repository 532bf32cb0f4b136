//! Overlap detection between a candidate rectangle and the placed epics.
//!
//! Called on every pointer-move sample during a gesture, so it stays a plain
//! linear scan over the current store with no cached state.

use crate::epic::{Epic, EpicId};
use crate::geometry::{GridSpec, PixelRect};

/// Id of the first epic (other than `excluding`) whose rectangle intersects `candidate`.
pub fn find_overlap(
    epics: &[Epic],
    grid: &GridSpec,
    candidate: &PixelRect,
    excluding: Option<EpicId>,
) -> Option<EpicId> {
    epics
        .iter()
        .filter(|epic| Some(epic.id) != excluding)
        .find(|epic| epic.pixel_rect(grid).intersects(candidate))
        .map(|epic| epic.id)
}

/// True if `candidate` intersects any epic other than `excluding`.
pub fn overlaps(
    epics: &[Epic],
    grid: &GridSpec,
    candidate: &PixelRect,
    excluding: Option<EpicId>,
) -> bool {
    find_overlap(epics, grid, candidate, excluding).is_some()
}

/// True if no two epics in `epics` intersect.
pub fn is_settled(epics: &[Epic], grid: &GridSpec) -> bool {
    epics.iter().enumerate().all(|(i, a)| {
        let rect = a.pixel_rect(grid);
        epics[i + 1..]
            .iter()
            .all(|b| !b.pixel_rect(grid).intersects(&rect))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epic(id: EpicId, left: i32, top: i32, width: u32, resource_count: u32) -> Epic {
        Epic {
            width,
            resource_count,
            ..Epic::new(id, left, top, "#1a73e8")
        }
    }

    #[test]
    fn adjacent_rectangle_is_free_and_contained_one_collides() {
        let grid = GridSpec::default();
        let store = vec![epic(1, 0, 0, 2, 1)];
        assert!(!overlaps(
            &store,
            &grid,
            &PixelRect::new(240, 0, 120, 50),
            None
        ));
        assert!(overlaps(&store, &grid, &PixelRect::new(0, 0, 120, 50), None));
    }

    #[test]
    fn excluded_epic_is_ignored() {
        let grid = GridSpec::default();
        let store = vec![epic(1, 0, 0, 2, 1), epic(2, 0, 50, 1, 1)];
        let moving = PixelRect::new(0, 0, 240, 50);
        assert!(!overlaps(&store, &grid, &moving, Some(1)));
        assert_eq!(
            find_overlap(&store, &grid, &PixelRect::new(0, 0, 120, 100), Some(1)),
            Some(2)
        );
    }

    #[test]
    fn vertical_neighbours_do_not_collide() {
        let grid = GridSpec::default();
        let store = vec![epic(1, 120, 0, 1, 2)];
        assert!(!overlaps(
            &store,
            &grid,
            &PixelRect::new(120, 100, 120, 50),
            None
        ));
        assert!(overlaps(
            &store,
            &grid,
            &PixelRect::new(0, 50, 240, 50),
            None
        ));
    }

    #[test]
    fn settled_detects_any_pair() {
        let grid = GridSpec::default();
        assert!(is_settled(
            &[epic(1, 0, 0, 1, 1), epic(2, 120, 0, 1, 1)],
            &grid
        ));
        assert!(!is_settled(
            &[epic(1, 0, 0, 2, 1), epic(2, 120, 0, 1, 1)],
            &grid
        ));
    }
}
