mod table;

pub use table::{load_records, parse_records, TableColumns};

use crate::error::{LoadError, LoadResult};
use crate::map::LineString;
use crate::region::{Region, RegionKey, Ring};
use geojson::{Feature, GeoJson, Geometry, JsonValue, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Feature properties that make up a county's key
#[derive(Clone, Debug)]
pub struct FeatureFields {
    pub group: String,
    pub name: String,
}

impl Default for FeatureFields {
    fn default() -> Self {
        Self {
            group: "STATEFP".to_string(),
            name: "NAME".to_string(),
        }
    }
}

/// Parse a GeoJSON file through simd-json
fn read_geojson(path: &Path) -> LoadResult<GeoJson> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_geojson(&mut bytes, path)
}

fn parse_geojson(bytes: &mut [u8], path: &Path) -> LoadResult<GeoJson> {
    simd_json::serde::from_slice::<GeoJson>(bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load county features as regions, in file order
pub fn load_regions(path: &Path, fields: &FeatureFields) -> LoadResult<Vec<Region>> {
    let geojson = read_geojson(path)?;
    let regions = regions_from_geojson(geojson, fields, path)?;
    tracing::info!(path = %path.display(), regions = regions.len(), "loaded county features");
    Ok(regions)
}

/// Parse regions from an in-memory GeoJSON document
pub fn parse_regions(text: &str, fields: &FeatureFields) -> LoadResult<Vec<Region>> {
    let source = Path::new("<memory>");
    let mut bytes = text.as_bytes().to_vec();
    regions_from_geojson(parse_geojson(&mut bytes, source)?, fields, source)
}

fn regions_from_geojson(
    geojson: GeoJson,
    fields: &FeatureFields,
    path: &Path,
) -> LoadResult<Vec<Region>> {
    let GeoJson::FeatureCollection(fc) = geojson else {
        return Err(LoadError::NotFeatureCollection {
            path: path.to_path_buf(),
        });
    };

    Ok(fc
        .features
        .into_iter()
        .map(|feature| region_from_feature(feature, fields))
        .collect())
}

fn region_from_feature(feature: Feature, fields: &FeatureFields) -> Region {
    let props = feature.properties.as_ref();
    let group = props
        .and_then(|p| p.get(&fields.group))
        .and_then(property_string);
    let name = props
        .and_then(|p| p.get(&fields.name))
        .and_then(property_string);

    if group.is_none() || name.is_none() {
        tracing::debug!(
            group = ?group,
            name = ?name,
            "feature is missing a key property; it will not match any row"
        );
    }

    let mut rings = Vec::new();
    if let Some(ref geometry) = feature.geometry {
        collect_polygon_rings(geometry, &mut rings);
    }

    Region::new(
        RegionKey::new(group.unwrap_or_default(), name.unwrap_or_default()),
        rings,
    )
}

/// Key properties may be strings ("06") or bare numbers (6)
fn property_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn collect_polygon_rings(geometry: &Geometry, rings: &mut Vec<Ring>) {
    match &geometry.value {
        Value::Polygon(polygon) => {
            rings.extend(polygon.iter().map(|ring| to_ring(ring)));
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                rings.extend(polygon.iter().map(|ring| to_ring(ring)));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygon_rings(g, rings);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) => {
            tracing::warn!("skipping point county geometry");
        }
        Value::LineString(_) | Value::MultiLineString(_) => {
            tracing::warn!("skipping line county geometry");
        }
    }
}

/// Load state outlines as polylines for the border overlay
pub fn load_state_borders(path: &Path) -> LoadResult<Vec<LineString>> {
    let geojson = read_geojson(path)?;
    let mut lines = Vec::new();
    process_geojson_lines(&geojson, |line| lines.push(line));
    tracing::info!(path = %path.display(), lines = lines.len(), "loaded state borders");
    Ok(lines)
}

/// Coordinates are matched at 1e-7 degree resolution
type Vertex = (i64, i64);

fn vertex(point: (f64, f64)) -> Vertex {
    ((point.0 * 1e7).round() as i64, (point.1 * 1e7).round() as i64)
}

fn edge_key(a: (f64, f64), b: (f64, f64)) -> (Vertex, Vertex) {
    let (a, b) = (vertex(a), vertex(b));
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// State borders as the county edges shared by counties of different group
/// codes. Coastlines and edges inside one state are left out.
pub fn state_borders_from_counties(regions: &[Region]) -> Vec<LineString> {
    // Edge -> first owner, plus the second owner once seen
    let mut owners: HashMap<(Vertex, Vertex), (usize, Option<usize>)> = HashMap::new();
    for (idx, region) in regions.iter().enumerate() {
        for ring in &region.rings {
            for seg in ring.windows(2) {
                let key = edge_key(seg[0], seg[1]);
                if key.0 == key.1 {
                    continue;
                }
                owners
                    .entry(key)
                    .and_modify(|(first, second)| {
                        if *first != idx && second.is_none() {
                            *second = Some(idx);
                        }
                    })
                    .or_insert((idx, None));
            }
        }
    }

    let mut lines = Vec::new();
    for (idx, region) in regions.iter().enumerate() {
        let group = &region.key.group_code;
        for ring in &region.rings {
            let mut current: LineString = Vec::new();
            for seg in ring.windows(2) {
                let neighbor = owners
                    .get(&edge_key(seg[0], seg[1]))
                    .and_then(|&(first, second)| if first == idx { second } else { Some(first) });
                // Each shared edge is emitted once, from the lower group code
                let border = neighbor.is_some_and(|other| {
                    let other_group = &regions[other].key.group_code;
                    group < other_group
                });

                if border {
                    if current.is_empty() {
                        current.push(seg[0]);
                    }
                    current.push(seg[1]);
                } else if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
    }

    tracing::info!(lines = lines.len(), "derived state borders from county edges");
    lines
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    match &geometry.value {
        Value::LineString(coords) => add_line(to_ring(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_ring(coords));
            }
        }
        Value::Polygon(rings) => {
            for ring in rings {
                add_line(to_ring(ring));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    add_line(to_ring(ring));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "STATEFP": "06", "NAME": "Alpine" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-120.0, 38.0], [-119.5, 38.0], [-119.5, 38.5], [-120.0, 38.5], [-120.0, 38.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "STATEFP": 6, "NAME": "Islands" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-121.0, 34.0], [-120.8, 34.0], [-120.8, 34.2], [-121.0, 34.0]]],
                        [[[-119.0, 33.0], [-118.8, 33.0], [-118.8, 33.2], [-119.0, 33.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Orphan" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_regions() {
        let regions = parse_regions(COUNTIES, &FeatureFields::default()).unwrap();
        assert_eq!(regions.len(), 3);

        assert_eq!(regions[0].key.to_string(), "06_Alpine");
        assert_eq!(regions[0].rings.len(), 1);

        // Numeric group codes keep their printed form
        assert_eq!(regions[1].key.to_string(), "6_Islands");
        assert_eq!(regions[1].rings.len(), 2);

        assert_eq!(regions[2].key.group_code, "");
        assert!(!regions[2].has_geometry());
    }

    #[test]
    fn test_custom_fields() {
        let fields = FeatureFields {
            group: "NAME".to_string(),
            name: "STATEFP".to_string(),
        };
        let regions = parse_regions(COUNTIES, &fields).unwrap();
        assert_eq!(regions[0].key.to_string(), "Alpine_06");
    }

    #[test]
    fn test_rejects_bare_geometry() {
        let err = parse_regions(
            r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#,
            &FeatureFields::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::NotFeatureCollection { .. }));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = parse_regions("{ not json", &FeatureFields::default()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_regions(Path::new("/nonexistent/counties.geojson"), &FeatureFields::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("counties.geojson"));
    }

    fn square(group: &str, name: &str, lon: f64, lat: f64) -> Region {
        Region::new(
            RegionKey::new(group, name),
            vec![vec![(lon, lat), (lon + 1.0, lat), (lon + 1.0, lat + 1.0), (lon, lat + 1.0), (lon, lat)]],
        )
    }

    #[test]
    fn test_state_borders_between_groups() {
        let regions = vec![
            square("06", "West", -120.0, 38.0),
            square("32", "East", -119.0, 38.0),
        ];
        let lines = state_borders_from_counties(&regions);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], vec![(-119.0, 38.0), (-119.0, 39.0)]);
    }

    #[test]
    fn test_no_borders_inside_a_state() {
        let regions = vec![
            square("06", "West", -120.0, 38.0),
            square("06", "East", -119.0, 38.0),
        ];
        assert!(state_borders_from_counties(&regions).is_empty());
    }

    #[test]
    fn test_shared_edges_drawn_once() {
        // Two counties of one state stacked against a neighbor state
        let regions = vec![
            square("06", "Lower", -120.0, 38.0),
            square("06", "Upper", -120.0, 39.0),
            Region::new(
                RegionKey::new("32", "Tall"),
                vec![vec![(-119.0, 38.0), (-118.0, 38.0), (-118.0, 40.0), (-119.0, 40.0), (-119.0, 39.0), (-119.0, 38.0)]],
            ),
        ];
        let lines = state_borders_from_counties(&regions);
        let points: usize = lines.iter().map(|l| l.len() - 1).sum();
        // Both unit edges along lon -119, each drawn once
        assert_eq!(points, 2);
        assert!(lines.iter().flatten().all(|&(lon, _)| lon == -119.0));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COUNTIES.as_bytes()).unwrap();

        let regions = load_regions(file.path(), &FeatureFields::default()).unwrap();
        assert_eq!(regions.len(), 3);

        let borders = load_state_borders(file.path()).unwrap();
        // One ring for the polygon, two for the multipolygon
        assert_eq!(borders.len(), 3);
    }
}
