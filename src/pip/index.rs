//! Keyed polygon index for one administrative unit's subdivisions.

use geo::{BoundingRect, Contains, Coord, Point, Polygon, Rect};
use hashbrown::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::KeySchema;
use crate::error::{Error, Result};
use crate::models::{GeoPoint, Region};
use crate::source::parse_regions;

/// Returned by [`RegionIndex::find_loc`] when no region contains the point
pub const NOT_FOUND: &str = "NotFound";

/// All polygons stored under one composite key.
///
/// A composition function that leaves attributes out can give regions with
/// different values the same key, so each polygon points at the value tuple
/// of the region it came from.
#[derive(Debug, Clone, Default)]
pub struct RegionEntry {
    records: Vec<Vec<String>>,
    polygons: Vec<(usize, Polygon<f64>)>,
    envelope: Option<Rect<f64>>,
}

impl RegionEntry {
    fn add<I>(&mut self, values: Vec<String>, polygons: I) -> usize
    where
        I: IntoIterator<Item = Polygon<f64>>,
    {
        let record = match self.records.iter().position(|existing| *existing == values) {
            Some(record) => record,
            None => {
                self.records.push(values);
                self.records.len() - 1
            }
        };

        let before = self.polygons.len();
        for polygon in polygons {
            if let Some(rect) = polygon.bounding_rect() {
                self.envelope = Some(match self.envelope {
                    Some(envelope) => merge_rects(envelope, rect),
                    None => rect,
                });
            }
            self.polygons.push((record, polygon));
        }
        self.polygons.len() - before
    }

    /// Distinct attribute value tuples under this key, in key-schema order
    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Values of the region whose polygon contains the point
    pub fn values_at(&self, point: &Point<f64>) -> Option<&[String]> {
        if let Some(envelope) = self.envelope {
            if !rect_covers(&envelope, point) {
                return None;
            }
        }
        self.polygons
            .iter()
            .find(|(_, polygon)| polygon.contains(point))
            .map(|(record, _)| self.records[*record].as_slice())
    }

    /// True if any of the polygons contains the point
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.values_at(point).is_some()
    }
}

fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

fn rect_covers(rect: &Rect<f64>, point: &Point<f64>) -> bool {
    point.x() >= rect.min().x
        && point.x() <= rect.max().x
        && point.y() >= rect.min().y
        && point.y() <= rect.max().y
}

/// Composite key -> region polygons, plus the adcodes seen while building.
///
/// Lookups scan every entry; iteration order is unspecified, so with
/// overlapping source polygons any of the matching keys may be returned.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    entries: HashMap<String, RegionEntry>,
    adcodes: Vec<String>,
}

impl RegionIndex {
    /// Build from decoded regions.
    ///
    /// Fails on the first region missing a required attribute; no partial
    /// index is returned. Regions without polygons still contribute their
    /// adcode but are not indexed.
    pub fn build(regions: Vec<Region>, schema: &KeySchema) -> Result<Self> {
        let adcode_position = schema.adcode_position();
        let mut entries: HashMap<String, RegionEntry> = HashMap::new();
        let mut adcodes = Vec::new();
        let mut seen_codes = HashSet::new();
        let mut polygon_count = 0usize;

        for region in regions {
            let mut values = Vec::with_capacity(schema.keys().len());
            for key in schema.keys() {
                let value = region
                    .attribute(key)
                    .ok_or_else(|| Error::MissingAttribute { key: key.clone() })?;
                values.push(value.as_key_part().into_owned());
            }

            if let Some(code) = adcode_position.and_then(|pos| values.get(pos)) {
                if !code.is_empty() && seen_codes.insert(code.clone()) {
                    adcodes.push(code.clone());
                }
            }

            if !region.has_geometry() {
                debug!("Skipping region {:?} without polygon geometry", values);
                continue;
            }

            let key = schema.codec().encode(&values);
            polygon_count += entries.entry(key).or_default().add(values, region.geometry);
        }

        debug!(
            "Built region index: {} keys, {} polygons, {} adcodes",
            entries.len(),
            polygon_count,
            adcodes.len()
        );

        Ok(Self { entries, adcodes })
    }

    /// Build from the bytes of a GeoJSON feature collection
    pub fn from_bytes(data: &[u8], schema: &KeySchema) -> Result<Self> {
        Self::build(parse_regions(data)?, schema)
    }

    /// Build from a GeoJSON file
    pub fn from_file<P: AsRef<Path>>(path: P, schema: &KeySchema) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| Error::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data, schema)
    }

    /// Index keyed by the value of a single attribute, e.g. `name`
    pub fn by_attribute(data: &[u8], key: &str) -> Result<Self> {
        Self::from_bytes(data, &KeySchema::single(key))
    }

    /// Composite key and attribute values of the first region containing the point
    pub fn locate_values(&self, point: &GeoPoint) -> Option<(&str, &[String])> {
        let point = point.to_point();
        self.entries.iter().find_map(|(key, entry)| {
            entry
                .values_at(&point)
                .map(|values| (key.as_str(), values))
        })
    }

    /// Composite key of the first region containing the point
    pub fn locate(&self, point: &GeoPoint) -> Option<&str> {
        self.locate_values(point).map(|(key, _)| key)
    }

    /// Composite key of the region containing (lat, lon), or [`NOT_FOUND`]
    pub fn find_loc(&self, lat: f64, lon: f64) -> &str {
        self.locate(&GeoPoint::new(lat, lon)).unwrap_or(NOT_FOUND)
    }

    /// Whether any region contains the point
    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        let point = point.to_point();
        self.entries.values().any(|entry| entry.contains(&point))
    }

    pub fn contain_loc(&self, lat: f64, lon: f64) -> bool {
        self.contains_point(&GeoPoint::new(lat, lon))
    }

    /// Adcodes of the indexed regions, first-seen order, no duplicates
    pub fn adcodes(&self) -> &[String] {
        &self.adcodes
    }

    pub fn get(&self, key: &str) -> Option<&RegionEntry> {
        self.entries.get(key)
    }

    /// Number of distinct composite keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn polygon_count(&self) -> usize {
        self.entries.values().map(RegionEntry::polygon_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pip::KeyCodec;
    use crate::testutil::{admin_feature, collection, feature_json, square};

    #[test]
    fn test_single_region_hit_and_miss() {
        let data = collection(&[feature_json(r#"{"name": "X"}"#, &square(20.0, 10.0, 1.0))]);
        let index = RegionIndex::by_attribute(data.as_bytes(), "name").unwrap();

        assert_eq!(index.find_loc(10.0, 20.0), "X");
        assert_eq!(index.find_loc(80.0, 80.0), NOT_FOUND);
        assert!(index.contain_loc(10.0, 20.0));
        assert!(!index.contain_loc(80.0, 80.0));
    }

    #[test]
    fn test_latitude_longitude_order() {
        // Region spans lon 119..121, lat 29..31
        let data = collection(&[feature_json(r#"{"name": "杭州"}"#, &square(120.0, 30.0, 1.0))]);
        let index = RegionIndex::by_attribute(data.as_bytes(), "name").unwrap();

        assert_eq!(index.find_loc(30.0, 120.0), "杭州");
        assert_eq!(index.find_loc(120.0, 30.0), NOT_FOUND);
    }

    #[test]
    fn test_composite_keys_and_adcodes() {
        let data = collection(&[
            admin_feature("道里区", "district", 230102, 126.4, 45.7, 0.1),
            admin_feature("南岗区", "district", 230103, 126.7, 45.7, 0.1),
        ]);
        let index = RegionIndex::from_bytes(data.as_bytes(), &KeySchema::default()).unwrap();

        assert_eq!(index.find_loc(45.7, 126.4), "道里区-district-230102");
        assert_eq!(index.find_loc(45.7, 126.7), "南岗区-district-230103");
        assert_eq!(index.adcodes(), ["230102", "230103"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_custom_compose_function() {
        let data = collection(&[admin_feature("哈尔滨市", "city", 230100, 127.0, 45.6, 1.0)]);
        let schema = KeySchema::new(["name", "level"]).with_codec(KeyCodec::with_compose(
            "-",
            |ks: &[String]| format!("{}-{}", ks[0], ks[1]),
        ));
        let index = RegionIndex::from_bytes(data.as_bytes(), &schema).unwrap();

        assert_eq!(index.find_loc(45.648633, 127.266759), "哈尔滨市-city");
        // adcode is not part of the key, so nothing links to children
        assert!(index.adcodes().is_empty());
    }

    #[test]
    fn test_shared_key_keeps_values_per_region() {
        let data = collection(&[
            admin_feature("新区", "district", 110000, 0.0, 0.0, 1.0),
            admin_feature("新区", "district", 230000, 10.0, 10.0, 1.0),
        ]);
        let schema = KeySchema::default().with_codec(KeyCodec::with_compose(
            "-",
            |ks: &[String]| format!("{}-{}", ks[0], ks[1]),
        ));
        let index = RegionIndex::from_bytes(data.as_bytes(), &schema).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("新区-district").unwrap().records().len(), 2);
        let (key, values) = index.locate_values(&GeoPoint::new(10.0, 10.0)).unwrap();
        assert_eq!(key, "新区-district");
        assert_eq!(values, ["新区", "district", "230000"]);
        let (_, values) = index.locate_values(&GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(values[2], "110000");
    }

    #[test]
    fn test_missing_attribute_aborts_build() {
        let data = collection(&[
            admin_feature("道里区", "district", 230102, 126.4, 45.7, 0.1),
            feature_json(r#"{"name": "南岗区", "level": "district"}"#, &square(126.7, 45.7, 0.1)),
        ]);
        let err = RegionIndex::from_bytes(data.as_bytes(), &KeySchema::default()).unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { ref key } if key == "adcode"));
    }

    #[test]
    fn test_float_adcodes_render_as_integers() {
        let data = collection(&[feature_json(
            r#"{"name": "北京市", "level": "province", "adcode": 110000.0}"#,
            &square(116.4, 39.9, 1.0),
        )]);
        let index = RegionIndex::from_bytes(data.as_bytes(), &KeySchema::default()).unwrap();
        assert_eq!(index.adcodes(), ["110000"]);
        assert_eq!(index.find_loc(39.905241, 116.397682), "北京市-province-110000");
    }

    #[test]
    fn test_empty_and_duplicate_adcodes() {
        let data = collection(&[
            feature_json(
                r#"{"name": "a", "level": "x", "adcode": ""}"#,
                &square(0.0, 0.0, 1.0),
            ),
            feature_json(
                r#"{"name": "b", "level": "x", "adcode": 7}"#,
                &square(5.0, 5.0, 1.0),
            ),
            feature_json(
                r#"{"name": "b", "level": "x", "adcode": 7}"#,
                &square(9.0, 9.0, 1.0),
            ),
        ]);
        let index = RegionIndex::from_bytes(data.as_bytes(), &KeySchema::default()).unwrap();
        assert_eq!(index.adcodes(), ["7"]);

        // both features land under one key
        assert_eq!(index.len(), 2);
        let entry = index.get("b-x-7").unwrap();
        assert_eq!(entry.polygon_count(), 2);
        assert_eq!(entry.records().len(), 1);
        assert_eq!(index.find_loc(9.0, 9.0), "b-x-7");
        assert_eq!(index.find_loc(5.0, 5.0), "b-x-7");
    }

    #[test]
    fn test_multipolygon_any_part_matches_and_holes_exclude() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "ring"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0,0],[4,0],[4,4],[0,4],[0,0]], [[1,1],[3,1],[3,3],[1,3],[1,1]]],
                        [[[10,10],[11,10],[11,11],[10,11],[10,10]]]
                    ]
                }
            }]
        }"#;
        let index = RegionIndex::by_attribute(data.as_bytes(), "name").unwrap();

        assert_eq!(index.find_loc(0.5, 0.5), "ring");
        assert_eq!(index.find_loc(10.5, 10.5), "ring");
        assert_eq!(index.find_loc(2.0, 2.0), NOT_FOUND);
        assert_eq!(index.polygon_count(), 2);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("230000_full.json");
        let data = collection(&[admin_feature("哈尔滨市", "city", 230100, 127.0, 45.6, 1.0)]);
        fs::write(&path, data).unwrap();

        let index = RegionIndex::from_file(&path, &KeySchema::default()).unwrap();
        assert_eq!(index.adcodes(), ["230100"]);

        let err = RegionIndex::from_file(dir.path().join("missing.json"), &KeySchema::default())
            .unwrap_err();
        assert!(matches!(err, Error::SourceRead { .. }));
    }

    #[test]
    fn test_empty_index() {
        let index = RegionIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.find_loc(0.0, 0.0), NOT_FOUND);
        assert!(!index.contain_loc(0.0, 0.0));
    }
}
