use crate::join::JurisdictionRecord;

/// Side panel content for one selected county
#[derive(Clone, Debug, PartialEq)]
pub struct Breakdown {
    pub region_name: String,
    /// `(jurisdiction, value)` in table order; empty when the county has no row
    pub entries: Vec<(String, f64)>,
}

impl Breakdown {
    pub fn new(region_name: &str, record: Option<&JurisdictionRecord>) -> Self {
        Self {
            region_name: region_name.to_string(),
            entries: record.map(|r| r.values.clone()).unwrap_or_default(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} - Jurisdiction Breakdown", self.region_name)
    }

    /// Saturates at `f64::MAX`, like the county metric
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum::<f64>().min(f64::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `label: value` lines
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|(label, value)| format!("{}: {}", label, format_value(*value)))
    }
}

/// Receives the breakdown of each newly selected county
pub trait BreakdownDisplay {
    fn show(&mut self, breakdown: Breakdown);
}

impl<F: FnMut(Breakdown)> BreakdownDisplay for F {
    fn show(&mut self, breakdown: Breakdown) {
        self(breakdown)
    }
}

/// Whole numbers print without decimals, everything else with two
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
