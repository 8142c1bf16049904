use std::collections::HashMap;

use crate::region::Bounds;

/// Spatial index over county bounding boxes for click hit-testing.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// so a point query only has to look at one cell. Candidates may be
/// false positives; callers confirm with a point-in-polygon test.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes in lon/lat; empty boxes are skipped
    pub fn build<'a>(bounds: impl Iterator<Item = &'a Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, b) in bounds.enumerate() {
            if b.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(b.min_x, b.min_y);
            let max_cell = grid.to_cell(b.max_x, b.max_y);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Feature indices whose bounding box may contain the point, in insertion order
    pub fn query_point(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
