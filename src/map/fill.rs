/// Per-cell fill colors for the choropleth, at terminal character resolution.
/// A cell is filled when its center (in braille pixels) lies inside a polygon.
pub struct FillGrid {
    width: usize,
    height: usize,
    buckets: Vec<Option<u8>>,
}

impl FillGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buckets: vec![None; width * height],
        }
    }

    /// Color bucket at a character cell
    pub fn bucket(&self, col: usize, row: usize) -> Option<usize> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.buckets[row * self.width + col].map(usize::from)
    }

    pub fn filled_cells(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_some()).count()
    }

    /// Scanline-fill pixel-space rings with the even-odd rule
    pub fn fill_polygon(&mut self, rings: &[Vec<(f64, f64)>], bucket: u8) {
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in rings.iter().flatten() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if min_y > max_y {
            return;
        }

        // Cell row r samples pixel row 4r + 2
        let first_row = ((min_y - 2.0) / 4.0).ceil().max(0.0) as usize;
        let last_row = ((max_y - 2.0) / 4.0).floor().min(self.height as f64 - 1.0);
        if last_row < 0.0 {
            return;
        }

        let mut crossings = Vec::new();
        for row in first_row..=last_row as usize {
            let y = row as f64 * 4.0 + 2.0;
            crossings.clear();

            for ring in rings {
                if ring.len() < 3 {
                    continue;
                }
                let mut j = ring.len() - 1;
                for i in 0..ring.len() {
                    let (xi, yi) = ring[i];
                    let (xj, yj) = ring[j];
                    if (yi > y) != (yj > y) {
                        crossings.push(xi + (y - yi) * (xj - xi) / (yj - yi));
                    }
                    j = i;
                }
            }

            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                // Cell column c samples pixel column 2c + 1
                let start = ((span[0] - 1.0) / 2.0).ceil().max(0.0) as usize;
                let end = (((span[1] - 1.0) / 2.0).ceil().max(0.0) as usize).min(self.width);
                for col in start..end {
                    self.buckets[row * self.width + col] = Some(bucket);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]
    }

    #[test]
    fn test_fill_rectangle() {
        let mut grid = FillGrid::new(10, 5);
        // Covers pixel columns 0..8 and rows 0..12: cells 0..4 x 0..3
        grid.fill_polygon(&[rect(0.0, 0.0, 8.0, 12.0)], 3);
        assert_eq!(grid.bucket(0, 0), Some(3));
        assert_eq!(grid.bucket(3, 2), Some(3));
        assert_eq!(grid.bucket(4, 0), None);
        assert_eq!(grid.bucket(0, 3), None);
        assert_eq!(grid.filled_cells(), 12);
    }

    #[test]
    fn test_hole_is_not_filled() {
        let mut grid = FillGrid::new(10, 10);
        grid.fill_polygon(&[rect(0.0, 0.0, 20.0, 40.0), rect(6.0, 12.0, 14.0, 28.0)], 1);
        assert_eq!(grid.bucket(0, 0), Some(1));
        assert_eq!(grid.bucket(4, 4), None);
        assert_eq!(grid.bucket(9, 9), Some(1));
    }

    #[test]
    fn test_clipped_to_grid() {
        let mut grid = FillGrid::new(3, 2);
        grid.fill_polygon(&[rect(-50.0, -50.0, 50.0, 50.0)], 6);
        assert_eq!(grid.filled_cells(), 6);
        assert_eq!(grid.bucket(3, 0), None);
    }

    #[test]
    fn test_later_polygon_overwrites() {
        let mut grid = FillGrid::new(4, 1);
        grid.fill_polygon(&[rect(0.0, 0.0, 8.0, 4.0)], 0);
        grid.fill_polygon(&[rect(4.0, 0.0, 8.0, 4.0)], 5);
        assert_eq!(grid.bucket(0, 0), Some(0));
        assert_eq!(grid.bucket(3, 0), Some(5));
    }
}
