use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::data::{FeatureFields, TableColumns};

/// Terminal choropleth of US counties, shaded by summed jurisdiction population.
///
/// Click a county to list its per-jurisdiction values in the side panel.
#[derive(Parser, Debug, Clone)]
#[command(name = "county-choropleth", version, about, long_about = None)]
pub struct Args {
    /// County boundaries (GeoJSON FeatureCollection)
    #[arg(long, default_value = "us_counties.geojson")]
    pub counties: PathBuf,

    /// Jurisdiction table (CSV with a header row)
    #[arg(long, default_value = "county_data.csv")]
    pub data: PathBuf,

    /// State boundaries drawn over the counties. Without it, borders are
    /// derived from the edges shared by counties of different states.
    #[arg(long)]
    pub states: Option<PathBuf>,

    /// Feature property holding the state code
    #[arg(long, default_value = "STATEFP")]
    pub group_field: String,

    /// Feature property holding the county name
    #[arg(long, default_value = "NAME")]
    pub name_field: String,

    /// CSV column holding the state code
    #[arg(long, default_value = "state")]
    pub state_column: String,

    /// CSV column holding the county name
    #[arg(long, default_value = "county")]
    pub county_column: String,

    /// Log destination; the terminal itself is taken by the map
    #[arg(long, default_value = "county-choropleth.log")]
    pub log_file: PathBuf,

    /// Log more. Repeat for more verbosity (-v, -vv, -vvv). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn feature_fields(&self) -> FeatureFields {
        FeatureFields {
            group: self.group_field.clone(),
            name: self.name_field.clone(),
        }
    }

    pub fn table_columns(&self) -> TableColumns {
        TableColumns {
            group: self.state_column.clone(),
            name: self.county_column.clone(),
        }
    }

    /// Directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["county-choropleth"]).unwrap();
        assert_eq!(args.counties, PathBuf::from("us_counties.geojson"));
        assert_eq!(args.data, PathBuf::from("county_data.csv"));
        assert!(args.states.is_none());
        assert_eq!(args.feature_fields().group, "STATEFP");
        assert_eq!(args.table_columns().name, "county");
        assert_eq!(args.default_directive(), "warn");
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "county-choropleth",
            "--counties",
            "c.json",
            "--data",
            "d.csv",
            "--states",
            "s.json",
            "--name-field",
            "NAMELSAD",
            "--county-column",
            "name",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.states, Some(PathBuf::from("s.json")));
        assert_eq!(args.feature_fields().name, "NAMELSAD");
        assert_eq!(args.table_columns().name, "name");
        assert_eq!(args.default_directive(), "debug");
    }

    #[test]
    fn test_unknown_flag() {
        assert!(Args::try_parse_from(["county-choropleth", "--nope"]).is_err());
    }
}
