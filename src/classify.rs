use ratatui::style::Color;

/// Number of shades in the choropleth ramp
pub const BUCKETS: usize = 7;

/// Ordered fill colors, lightest (lowest metric) first
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: [Color; BUCKETS],
}

impl Palette {
    pub fn new(colors: [Color; BUCKETS]) -> Self {
        Self { colors }
    }

    /// Light-to-dark gray ramp
    pub fn grayscale() -> Self {
        Self::new([
            Color::Rgb(0xf7, 0xf7, 0xf7),
            Color::Rgb(0xf0, 0xf0, 0xf0),
            Color::Rgb(0xd9, 0xd9, 0xd9),
            Color::Rgb(0xbd, 0xbd, 0xbd),
            Color::Rgb(0x96, 0x96, 0x96),
            Color::Rgb(0x63, 0x63, 0x63),
            Color::Rgb(0x25, 0x25, 0x25),
        ])
    }

    #[inline(always)]
    pub fn color(&self, bucket: usize) -> Color {
        self.colors[bucket.min(BUCKETS - 1)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

/// `[min, max]` of the aggregate metric over all counties
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    /// Min/max scan; an empty input gives `[0, 0]`
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return Self::new(0.0, 0.0);
        };
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self::new(min, max)
    }

    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }
}

/// Quantized step function from the domain onto the palette.
/// Splits `[min, max]` into equal-width buckets; `max` lands in the last one.
#[derive(Clone, Debug)]
pub struct ColorClassifier {
    domain: Domain,
    palette: Palette,
}

impl ColorClassifier {
    pub fn new(domain: Domain, palette: Palette) -> Self {
        Self { domain, palette }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Bucket index in `0..BUCKETS`. A degenerate domain puts everything in bucket 0.
    pub fn classify(&self, value: f64) -> usize {
        let Domain { min, max } = self.domain;
        if self.domain.is_degenerate() || value.is_nan() || value <= min {
            return 0;
        }
        if value >= max {
            return BUCKETS - 1;
        }
        // Divide before scaling so values near f64::MAX stay finite
        let step = (max - min) / BUCKETS as f64;
        let scaled = (value - min) / step;
        if !scaled.is_finite() {
            return 0;
        }
        (scaled.floor() as usize).min(BUCKETS - 1)
    }

    pub fn color(&self, value: f64) -> Color {
        self.palette.color(self.classify(value))
    }

    /// Lower edge of each bucket, followed by the domain max
    pub fn thresholds(&self) -> [f64; BUCKETS + 1] {
        let Domain { min, max } = self.domain;
        let step = (max - min) / BUCKETS as f64;
        let mut edges = [0.0; BUCKETS + 1];
        for (i, edge) in edges.iter_mut().enumerate() {
            *edge = min + step * i as f64;
        }
        edges[BUCKETS] = max;
        edges
    }
}
