use crate::breakdown::{Breakdown, BreakdownDisplay};
use crate::map::{ChoroplethRenderer, Viewport};

/// Width of the breakdown panel in terminal columns
pub const SIDEBAR_WIDTH: u16 = 36;

/// Side panel state; the latest selection replaces the previous one
#[derive(Default)]
pub struct Sidebar {
    pub breakdown: Option<Breakdown>,
}

impl BreakdownDisplay for Sidebar {
    fn show(&mut self, breakdown: Breakdown) {
        self.breakdown = Some(breakdown);
    }
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub renderer: ChoroplethRenderer,
    pub sidebar: Sidebar,
    /// Index of the highlighted county
    pub selected: Option<usize>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Set once a press turns into a drag, so the release does not select
    dragged: bool,
}

/// Braille pixel size of the map for a terminal of `width` x `height` cells.
/// Accounts for the border, the sidebar and the status bar.
fn map_pixel_size(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(SIDEBAR_WIDTH as usize + 2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to braille pixel, relative to the map's inner area
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

impl App {
    pub fn new(renderer: ChoroplethRenderer, width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = map_pixel_size(width, height);

        Self {
            viewport: renderer.fit_viewport(pixel_width, pixel_height),
            renderer,
            sidebar: Sidebar::default(),
            selected: None,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            dragged: false,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = map_pixel_size(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    /// Refit the whole map, keeping the selection
    pub fn reset_view(&mut self) {
        self.viewport = self
            .renderer
            .fit_viewport(self.viewport.width, self.viewport.height);
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Geographic coordinates at the middle of the map, if it is on the projected disc
    pub fn center_coords(&self) -> Option<String> {
        let (lon, lat) = self
            .viewport
            .unproject(self.viewport.width as i32 / 2, self.viewport.height as i32 / 2)?;
        Some(format!(
            "{:.1}°{}, {:.1}°{}",
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" },
            lon.abs(),
            if lon >= 0.0 { "E" } else { "W" }
        ))
    }

    /// Left button went down
    pub fn press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Handle mouse drag by panning
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            // Cells are 2x4 braille pixels
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    /// Left button released: a press without a drag is a click
    pub fn release(&mut self, col: u16, row: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.select_at(col, row);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Select the county under a terminal cell; clicks off the map or between counties do nothing
    pub fn select_at(&mut self, col: u16, row: u16) -> bool {
        let (px, py) = cell_to_pixel(col, row);
        if col == 0
            || row == 0
            || px >= self.viewport.width as i32
            || py >= self.viewport.height as i32
        {
            return false;
        }

        // Sample the middle of the cell, which is what the fill uses
        let Some((lon, lat)) = self.viewport.unproject(px + 1, py + 2) else {
            return false;
        };
        let Some(idx) = self.renderer.region_at(lon, lat) else {
            return false;
        };

        self.selected = Some(idx);
        self.renderer.select(idx, &mut self.sidebar)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.sidebar.breakdown = None;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Palette;
    use crate::join::{merge, RawRecord};
    use crate::region::{Region, RegionKey, Ring};

    fn square(lon: f64, lat: f64, size: f64) -> Ring {
        vec![
            (lon, lat),
            (lon + size, lat),
            (lon + size, lat + size),
            (lon, lat + size),
            (lon, lat),
        ]
    }

    fn app() -> App {
        let mut regions = vec![
            Region::new(RegionKey::new("CA", "Alpha"), vec![square(-110.0, 35.0, 6.0)]),
            Region::new(RegionKey::new("CA", "Beta"), vec![square(-95.0, 35.0, 6.0)]),
        ];
        let index = merge(
            &mut regions,
            vec![RawRecord {
                group_code: "CA".into(),
                name: "Alpha".into(),
                cells: vec![("JD1".into(), Some("10".into())), ("JD2".into(), Some("5".into()))],
            }],
        );
        let renderer = ChoroplethRenderer::new(regions, index, Palette::grayscale());
        App::new(renderer, 120, 40)
    }

    /// Terminal cell showing a geographic point
    fn cell_of(app: &App, lon: f64, lat: f64) -> (u16, u16) {
        let (px, py) = app.viewport.project(lon, lat);
        ((px / 2 + 1) as u16, (py / 4 + 1) as u16)
    }

    #[test]
    fn test_map_size_excludes_sidebar() {
        let app = app();
        assert_eq!(app.viewport.width, (120 - SIDEBAR_WIDTH as usize - 2) * 2);
        assert_eq!(app.viewport.height, 37 * 4);
    }

    #[test]
    fn test_click_selects_county() {
        let mut app = app();
        let (col, row) = cell_of(&app, -107.0, 38.0);
        app.press(col, row);
        app.release(col, row);

        assert_eq!(app.selected, Some(0));
        let breakdown = app.sidebar.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.region_name, "Alpha");
        assert_eq!(breakdown.total(), 15.0);
    }

    #[test]
    fn test_click_county_without_data() {
        let mut app = app();
        let (col, row) = cell_of(&app, -92.0, 38.0);
        assert!(app.select_at(col, row));
        assert_eq!(app.selected, Some(1));
        let breakdown = app.sidebar.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.region_name, "Beta");
        assert!(breakdown.is_empty());
    }

    #[test]
    fn test_click_between_counties_keeps_selection() {
        let mut app = app();
        let (col, row) = cell_of(&app, -107.0, 38.0);
        app.select_at(col, row);

        let (col, row) = cell_of(&app, -100.0, 38.0);
        assert!(!app.select_at(col, row));
        assert_eq!(app.selected, Some(0));
    }

    #[test]
    fn test_drag_does_not_select() {
        let mut app = app();
        let (col, row) = cell_of(&app, -107.0, 38.0);
        let center = app.viewport.center_x;
        app.press(col, row);
        app.handle_drag(col + 3, row);
        app.release(col + 3, row);

        assert!(app.selected.is_none());
        assert!(app.viewport.center_x < center);
    }

    #[test]
    fn test_clear_and_reset() {
        let mut app = app();
        let (col, row) = cell_of(&app, -107.0, 38.0);
        app.select_at(col, row);
        app.clear_selection();
        assert!(app.sidebar.breakdown.is_none());

        let center = (app.viewport.center_x, app.viewport.center_y);
        app.zoom_in();
        app.pan(10, 10);
        app.reset_view();
        assert_eq!((app.viewport.center_x, app.viewport.center_y), center);
        assert_eq!(app.viewport.zoom, 1.0);
    }

    #[test]
    fn test_click_outside_map() {
        let mut app = app();
        assert!(!app.select_at(0, 0));
        assert!(!app.select_at(119, 5));
    }
}
