use std::collections::HashMap;

use crate::region::{Region, RegionKey};

/// A jurisdiction table row before numeric coercion
#[derive(Clone, Debug, Default)]
pub struct RawRecord {
    pub group_code: String,
    pub name: String,
    /// (column, cell) pairs in table order; `None` for an empty cell
    pub cells: Vec<(String, Option<String>)>,
}

/// Per-jurisdiction values for one county, in table column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JurisdictionRecord {
    pub values: Vec<(String, f64)>,
}

impl JurisdictionRecord {
    /// Sum over every field present, whatever the field count.
    /// Saturates at `f64::MAX` so the metric stays finite.
    pub fn total(&self) -> f64 {
        self.raw_total().min(f64::MAX)
    }

    fn raw_total(&self) -> f64 {
        self.values.iter().map(|(_, v)| v).sum()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, v)| v)
    }
}

/// Parse one jurisdiction cell.
/// Empty cells count as zero. Returns `None` for anything that is not a
/// finite, non-negative number; the caller substitutes zero.
pub fn parse_cell(raw: Option<&str>) -> Option<f64> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Some(0.0),
        Some(text) => text,
    };
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        // -0.0 would print as "-0"
        .map(|v| v + 0.0)
}

/// Lookup from `<group_code>_<name>` to the county's jurisdiction values.
#[derive(Debug, Default)]
pub struct JurisdictionIndex {
    records: HashMap<String, JurisdictionRecord>,
    coerced_cells: usize,
}

impl JurisdictionIndex {
    /// Coerce and key every row. A later row with the same key replaces the earlier one.
    pub fn build(rows: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut index = Self::default();

        for row in rows {
            let key = RegionKey::new(row.group_code, row.name).to_string();
            let mut values = Vec::with_capacity(row.cells.len());

            for (column, cell) in row.cells {
                let value = match parse_cell(cell.as_deref()) {
                    Some(v) => v,
                    None => {
                        tracing::warn!(
                            key = %key,
                            column = %column,
                            cell = cell.as_deref().unwrap_or_default(),
                            "non-numeric jurisdiction value, counting it as 0"
                        );
                        index.coerced_cells += 1;
                        0.0
                    }
                };
                values.push((column, value));
            }

            let record = JurisdictionRecord { values };
            if record.raw_total().is_infinite() {
                tracing::warn!(key = %key, "jurisdiction total overflows, clamping to f64::MAX");
            }

            if index
                .records
                .insert(key.clone(), record)
                .is_some()
            {
                tracing::debug!(key = %key, "duplicate jurisdiction row replaces earlier one");
            }
        }

        index
    }

    pub fn get(&self, key: &RegionKey) -> Option<&JurisdictionRecord> {
        self.records.get(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of cells that could not be read as a number
    pub fn coerced_cells(&self) -> usize {
        self.coerced_cells
    }
}

/// Outcome counts of a join
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub matched: usize,
    pub unmatched: usize,
}

/// Set every region's aggregate metric from the index; regions without a row get 0.
pub fn annotate(regions: &mut [Region], index: &JurisdictionIndex) -> JoinStats {
    let mut stats = JoinStats::default();
    for region in regions.iter_mut() {
        match index.get(&region.key) {
            Some(record) => {
                region.aggregate_metric = record.total();
                stats.matched += 1;
            }
            None => {
                region.aggregate_metric = 0.0;
                stats.unmatched += 1;
            }
        }
    }
    stats
}

/// Build the index from all rows, then annotate the regions in a single pass.
pub fn merge(regions: &mut [Region], rows: Vec<RawRecord>) -> JurisdictionIndex {
    let index = JurisdictionIndex::build(rows);
    let stats = annotate(regions, &index);
    tracing::info!(
        records = index.len(),
        matched = stats.matched,
        unmatched = stats.unmatched,
        coerced_cells = index.coerced_cells(),
        "joined jurisdiction data onto counties"
    );
    index
}
