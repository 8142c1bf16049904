use crate::region::Bounds;

/// Albers equal-area conic projection onto a unit sphere.
/// Output y grows northward.
#[derive(Clone, Copy, Debug)]
pub struct Albers {
    n: f64,
    c: f64,
    rho0: f64,
    lon0: f64,
}

impl Albers {
    /// Build from standard parallels and origin, all in degrees
    pub fn new(parallel1: f64, parallel2: f64, origin_lon: f64, origin_lat: f64) -> Self {
        let (sin1, sin2) = (parallel1.to_radians().sin(), parallel2.to_radians().sin());
        let n = (sin1 + sin2) / 2.0;
        let c = parallel1.to_radians().cos().powi(2) + 2.0 * n * sin1;
        let rho0 = (c - 2.0 * n * origin_lat.to_radians().sin()).sqrt() / n;
        Self {
            n,
            c,
            rho0,
            lon0: origin_lon.to_radians(),
        }
    }

    /// Conterminous US parameters: parallels 29.5°N and 45.5°N, origin 96°W 37.5°N
    pub fn usa() -> Self {
        Self::new(29.5, 45.5, -96.0, 37.5)
    }

    #[inline(always)]
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let rho = (self.c - 2.0 * self.n * lat.to_radians().sin()).max(0.0).sqrt() / self.n;
        let theta = self.n * (lon.to_radians() - self.lon0);
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Inverse projection; `None` for points outside the projected disc
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dy = self.rho0 - y;
        let rho = self.n.signum() * (x * x + dy * dy).sqrt();
        let mut theta = x.atan2(dy.abs()) * dy.signum();
        if dy * self.n < 0.0 {
            theta -= std::f64::consts::PI * x.signum() * dy.signum();
        }
        let sin_lat = (self.c - rho * rho * self.n * self.n) / (2.0 * self.n);
        if !(-1.0..=1.0).contains(&sin_lat) {
            return None;
        }
        let lon = (theta / self.n + self.lon0).to_degrees();
        let lat = sin_lat.asin().to_degrees();
        Some((lon, lat))
    }
}

/// Visible map area in braille pixels over the projected plane
#[derive(Clone, Debug)]
pub struct Viewport {
    projection: Albers,
    /// Projected coordinate at the middle of the canvas
    pub center_x: f64,
    pub center_y: f64,
    /// Pixels per projected unit at zoom 1
    pub base_scale: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    const MIN_ZOOM: f64 = 0.5;
    const MAX_ZOOM: f64 = 200.0;

    /// Fit projected `bounds` into a `width` x `height` pixel canvas with a small margin
    pub fn fit(projection: Albers, bounds: &Bounds, width: usize, height: usize) -> Self {
        let base_scale = if bounds.is_empty() || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            1.0
        } else {
            let sx = width.max(1) as f64 / bounds.width();
            let sy = height.max(1) as f64 / bounds.height();
            0.95 * sx.min(sy)
        };
        let (center_x, center_y) = if bounds.is_empty() {
            (0.0, 0.0)
        } else {
            (
                (bounds.min_x + bounds.max_x) / 2.0,
                (bounds.min_y + bounds.max_y) / 2.0,
            )
        };
        Self {
            projection,
            center_x,
            center_y,
            base_scale,
            zoom: 1.0,
            width,
            height,
        }
    }

    #[inline(always)]
    fn scale(&self) -> f64 {
        self.base_scale * self.zoom
    }

    /// Project a geographic coordinate to fractional pixel coordinates
    #[inline(always)]
    pub fn to_screen(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.projection.project(lon, lat);
        let scale = self.scale();
        (
            (x - self.center_x) * scale + self.width as f64 / 2.0,
            self.height as f64 / 2.0 - (y - self.center_y) * scale,
        )
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (px, py) = self.to_screen(lon, lat);
        (px.round() as i32, py.round() as i32)
    }

    fn screen_to_plane(&self, px: f64, py: f64) -> (f64, f64) {
        let scale = self.scale();
        (
            (px - self.width as f64 / 2.0) / scale + self.center_x,
            self.center_y - (py - self.height as f64 / 2.0) / scale,
        )
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> Option<(f64, f64)> {
        let (x, y) = self.screen_to_plane(px as f64, py as f64);
        self.projection.invert(x, y)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale();
        self.center_x += dx as f64 / scale;
        self.center_y -= dy as f64 / scale;
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(Self::MAX_ZOOM);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(Self::MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor, keeping the point under (px, py) fixed on screen
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (x, y) = self.screen_to_plane(px as f64, py as f64);
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        let scale = self.scale();
        self.center_x = x - (px as f64 - self.width as f64 / 2.0) / scale;
        self.center_y = y + (py as f64 - self.height as f64 / 2.0) / scale;
    }

    /// Check if a pixel-space box overlaps the canvas
    pub fn bounds_visible(&self, bounds: &Bounds) -> bool {
        !bounds.is_empty()
            && bounds.max_x >= 0.0
            && bounds.min_x < self.width as f64
            && bounds.max_y >= 0.0
            && bounds.min_y < self.height as f64
    }
}
