use rayon::prelude::*;

use crate::braille::BrailleCanvas;
use crate::breakdown::{Breakdown, BreakdownDisplay};
use crate::classify::{ColorClassifier, Domain, Palette};
use crate::join::JurisdictionIndex;
use crate::map::fill::FillGrid;
use crate::map::geometry::stroke_path;
use crate::map::projection::{Albers, Viewport};
use crate::map::spatial::FeatureGrid;
use crate::region::{Bounds, Region};

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Hit-test grid cell size in degrees
const HIT_GRID_DEGREES: f64 = 1.0;

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_outlines: bool,
    pub show_states: bool,
    pub show_legend: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_outlines: true,
            show_states: true,
            show_legend: true,
        }
    }
}

/// One frame's worth of drawn layers, back to front
pub struct MapLayers {
    pub fill: FillGrid,
    pub outlines: BrailleCanvas,
    pub states: BrailleCanvas,
    pub selected: BrailleCanvas,
}

/// Owns the joined counties, their jurisdiction index and the color scale.
pub struct ChoroplethRenderer {
    regions: Vec<Region>,
    index: JurisdictionIndex,
    classifier: ColorClassifier,
    hit_grid: FeatureGrid,
    state_borders: Vec<LineString>,
    projection: Albers,
    projected_bounds: Bounds,
    pub settings: DisplaySettings,
}

impl ChoroplethRenderer {
    /// Takes regions that have already been joined against `index`; the
    /// color domain is computed here, once.
    pub fn new(regions: Vec<Region>, index: JurisdictionIndex, palette: Palette) -> Self {
        let domain = Domain::from_values(regions.iter().map(|r| r.aggregate_metric));
        tracing::info!(min = domain.min, max = domain.max, "color domain");

        let projection = Albers::usa();
        let hit_grid = FeatureGrid::build(regions.iter().map(|r| &r.bounds), HIT_GRID_DEGREES);
        let projected_bounds = projected_bounds(&regions, &projection);

        Self {
            regions,
            index,
            classifier: ColorClassifier::new(domain, palette),
            hit_grid,
            state_borders: Vec::new(),
            projection,
            projected_bounds,
            settings: DisplaySettings::default(),
        }
    }

    pub fn with_state_borders(mut self, lines: Vec<LineString>) -> Self {
        self.state_borders = lines;
        self
    }

    pub fn region(&self, idx: usize) -> Option<&Region> {
        self.regions.get(idx)
    }

    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    pub fn has_state_borders(&self) -> bool {
        !self.state_borders.is_empty()
    }

    /// Viewport that fits every county into a pixel canvas
    pub fn fit_viewport(&self, width: usize, height: usize) -> Viewport {
        Viewport::fit(self.projection, &self.projected_bounds, width, height)
    }

    /// Color bucket of a county
    pub fn bucket(&self, idx: usize) -> Option<usize> {
        self.regions
            .get(idx)
            .map(|r| self.classifier.classify(r.aggregate_metric))
    }

    /// Draw every county colored by its bucket, plus outlines and overlays
    pub fn draw(&self, viewport: &Viewport, selected: Option<usize>) -> MapLayers {
        let cols = viewport.width / 2;
        let rows = viewport.height / 4;
        let mut layers = MapLayers {
            fill: FillGrid::new(cols, rows),
            outlines: BrailleCanvas::new(cols, rows),
            states: BrailleCanvas::new(cols, rows),
            selected: BrailleCanvas::new(cols, rows),
        };

        // Projection is the expensive part; rasterizing into shared grids stays sequential
        let projected: Vec<(usize, Vec<Vec<(f64, f64)>>)> = self
            .regions
            .par_iter()
            .enumerate()
            .filter(|(_, region)| region.has_geometry())
            .filter_map(|(idx, region)| {
                let rings: Vec<Vec<(f64, f64)>> = region
                    .rings
                    .iter()
                    .map(|ring| ring.iter().map(|&(lon, lat)| viewport.to_screen(lon, lat)).collect())
                    .collect();
                let screen_bounds = rings
                    .iter()
                    .fold(Bounds::EMPTY, |acc, ring| acc.union(&Bounds::of_points(ring)));
                viewport.bounds_visible(&screen_bounds).then_some((idx, rings))
            })
            .collect();

        let max_jump = viewport.width.max(1) as i32;

        for (idx, rings) in &projected {
            let bucket = self.classifier.classify(self.regions[*idx].aggregate_metric);
            layers.fill.fill_polygon(rings, bucket as u8);

            if self.settings.show_outlines {
                for ring in rings {
                    stroke_path(&mut layers.outlines, ring, max_jump, false);
                }
            }

            if selected == Some(*idx) {
                for ring in rings {
                    stroke_path(&mut layers.selected, ring, max_jump, true);
                }
            }
        }

        if self.settings.show_states {
            for line in &self.state_borders {
                let points: Vec<(f64, f64)> =
                    line.iter().map(|&(lon, lat)| viewport.to_screen(lon, lat)).collect();
                stroke_path(&mut layers.states, &points, max_jump, false);
            }
        }

        layers
    }

    /// County under a geographic point
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.hit_grid
            .query_point(lon, lat)
            .iter()
            .copied()
            .find(|&idx| self.regions[idx].contains(lon, lat))
    }

    /// Look up the county's jurisdiction row and hand its breakdown to `display`.
    /// A county without a row produces an empty breakdown. Returns false for
    /// an out-of-range index.
    pub fn select<D: BreakdownDisplay + ?Sized>(&self, idx: usize, display: &mut D) -> bool {
        let Some(region) = self.regions.get(idx) else {
            return false;
        };

        let record = self.index.get(&region.key);
        if record.is_none() {
            tracing::debug!(key = %region.key, "selected county has no jurisdiction row");
        }
        display.show(Breakdown::new(region.name(), record));
        true
    }

    /// Toggle county outlines
    pub fn toggle_outlines(&mut self) {
        self.settings.show_outlines = !self.settings.show_outlines;
    }

    /// Toggle state borders
    pub fn toggle_states(&mut self) {
        self.settings.show_states = !self.settings.show_states;
    }

    /// Toggle the color legend
    pub fn toggle_legend(&mut self) {
        self.settings.show_legend = !self.settings.show_legend;
    }
}

/// Bounds of all counties in projected units, falling back to the lower 48
fn projected_bounds(regions: &[Region], projection: &Albers) -> Bounds {
    let bounds = regions
        .par_iter()
        .map(|region| {
            let mut b = Bounds::EMPTY;
            for &(lon, lat) in region.rings.iter().flatten() {
                let (x, y) = projection.project(lon, lat);
                b.extend(x, y);
            }
            b
        })
        .reduce(|| Bounds::EMPTY, |a, b| a.union(&b));

    if !bounds.is_empty() {
        return bounds;
    }

    let mut fallback = Bounds::EMPTY;
    for (lon, lat) in [(-125.0, 24.0), (-96.0, 24.0), (-66.0, 24.0), (-125.0, 50.0), (-66.0, 50.0)] {
        let (x, y) = projection.project(lon, lat);
        fallback.extend(x, y);
    }
    fallback
}
