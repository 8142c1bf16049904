use std::fmt;

/// A closed ring of (lon, lat) coordinates
pub type Ring = Vec<(f64, f64)>;

/// Composite identity shared by a county feature and its jurisdiction row.
/// Formats as `<group_code>_<name>`, matched exactly and case-sensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegionKey {
    pub group_code: String,
    pub name: String,
}

impl RegionKey {
    pub fn new(group_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group_code: group_code.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.group_code, self.name)
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// An inverted box that any point will expand
    pub const EMPTY: Bounds = Bounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a (f64, f64)>) -> Self {
        let mut bounds = Self::EMPTY;
        for &(x, y) in points {
            bounds.extend(x, y);
        }
        bounds
    }

    #[inline(always)]
    pub fn extend(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    #[inline(always)]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// One county: identity, untouched geometry and the joined metric.
#[derive(Clone, Debug)]
pub struct Region {
    pub key: RegionKey,
    /// Every ring of every polygon; holes are resolved with the even-odd rule
    pub rings: Vec<Ring>,
    pub bounds: Bounds,
    /// Sum of the county's jurisdiction values, zero until joined
    pub aggregate_metric: f64,
}

impl Region {
    pub fn new(key: RegionKey, rings: Vec<Ring>) -> Self {
        let bounds = rings
            .iter()
            .fold(Bounds::EMPTY, |acc, ring| acc.union(&Bounds::of_points(ring)));
        Self {
            key,
            rings,
            bounds,
            aggregate_metric: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn has_geometry(&self) -> bool {
        !self.bounds.is_empty()
    }

    /// Even-odd point-in-polygon test over all rings
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if !self.bounds.contains(lon, lat) {
            return false;
        }
        let mut inside = false;
        for ring in &self.rings {
            if ring.len() < 3 {
                continue;
            }
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]
    }

    #[test]
    fn test_key_format() {
        assert_eq!(RegionKey::new("06", "Alameda").to_string(), "06_Alameda");
    }

    #[test]
    fn test_contains_respects_holes() {
        let region = Region::new(
            RegionKey::new("01", "Donut"),
            vec![square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)],
        );
        assert!(region.contains(1.0, 1.0));
        assert!(!region.contains(5.0, 5.0));
        assert!(!region.contains(11.0, 5.0));
    }

    #[test]
    fn test_bounds_cover_all_parts() {
        let region = Region::new(
            RegionKey::new("01", "Islands"),
            vec![square(0.0, 0.0, 1.0), square(5.0, -3.0, 1.0)],
        );
        assert_eq!(region.bounds.min_y, -3.0);
        assert_eq!(region.bounds.max_x, 6.0);
        assert!(region.contains(5.5, -2.5));
    }

    #[test]
    fn test_region_without_geometry() {
        let region = Region::new(RegionKey::new("01", "Nowhere"), Vec::new());
        assert!(!region.has_geometry());
        assert!(!region.contains(0.0, 0.0));
        assert_eq!(region.aggregate_metric, 0.0);
    }
}
