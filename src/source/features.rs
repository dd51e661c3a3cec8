//! Decoding of GeoJSON feature collections into regions.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, Geometry, Position, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{AttrValue, Region};

/// Decode a GeoJSON `FeatureCollection` into regions.
///
/// Polygon and MultiPolygon features keep their geometry; features with any
/// other geometry decode with an empty geometry.
pub fn parse_regions(data: &[u8]) -> Result<Vec<Region>> {
    let text = std::str::from_utf8(data).map_err(|e| Error::Parse(e.to_string()))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| Error::Parse(e.to_string()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(Error::Parse("expected a FeatureCollection".to_string()));
    };

    Ok(collection
        .features
        .into_iter()
        .map(region_from_feature)
        .collect())
}

fn region_from_feature(feature: Feature) -> Region {
    let attributes: HashMap<String, AttrValue> = feature
        .properties
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| (key.clone(), AttrValue::from_json(value)))
        .collect();

    Region::new(attributes, multi_polygon(feature.geometry))
}

fn multi_polygon(geometry: Option<Geometry>) -> MultiPolygon<f64> {
    let polygons = match geometry.map(|g| g.value) {
        Some(Value::Polygon(rings)) => polygon(&rings).into_iter().collect(),
        Some(Value::MultiPolygon(parts)) => parts.iter().filter_map(|rings| polygon(rings)).collect(),
        Some(_) => {
            debug!("Ignoring feature geometry that is not a Polygon or MultiPolygon");
            Vec::new()
        }
        None => Vec::new(),
    };
    MultiPolygon::new(polygons)
}

/// First ring is the exterior, the rest are holes
fn polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| ring_to_line_string(ring));
    let exterior = rings.next()?;
    if exterior.0.len() < 3 {
        return None;
    }
    Some(Polygon::new(exterior, rings.collect()))
}

/// Positions are `[lon, lat, ...]`
fn ring_to_line_string(ring: &[Position]) -> LineString<f64> {
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .filter(|position| position.len() >= 2)
        .map(|position| Coord {
            x: position[0],
            y: position[1],
        })
        .collect();
    LineString::new(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{collection, feature_json, square};

    #[test]
    fn test_polygon_feature() {
        let data = collection(&[feature_json(
            r#"{"name": "X", "adcode": 110000}"#,
            &square(116.0, 40.0, 1.0),
        )]);
        let regions = parse_regions(data.as_bytes()).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].attribute("name"), Some(&AttrValue::from("X")));
        assert_eq!(regions[0].attribute("adcode"), Some(&AttrValue::Code(110000)));
        assert_eq!(regions[0].geometry.0.len(), 1);
        let exterior = regions[0].geometry.0[0].exterior();
        assert_eq!(exterior.0[0], Coord { x: 115.0, y: 39.0 });
        assert_eq!(exterior.0[2], Coord { x: 117.0, y: 41.0 });
    }

    #[test]
    fn test_multipolygon_parts_and_holes() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "islands"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0,0],[4,0],[4,4],[0,4],[0,0]], [[1,1],[2,1],[2,2],[1,2],[1,1]]],
                        [[[10,10],[11,10],[11,11],[10,11],[10,10]]]
                    ]
                }
            }]
        }"#;
        let regions = parse_regions(data.as_bytes()).unwrap();
        let parts = &regions[0].geometry.0;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].interiors().len(), 1);
        assert!(parts[1].interiors().is_empty());
    }

    #[test]
    fn test_non_polygon_geometry_is_empty() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "center"},
                "geometry": {"type": "Point", "coordinates": [116.0, 40.0]}
            }]
        }"#;
        let regions = parse_regions(data.as_bytes()).unwrap();
        assert!(!regions[0].has_geometry());
    }

    #[test]
    fn test_rejects_non_collections() {
        let point = r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#;
        assert!(matches!(parse_regions(point.as_bytes()), Err(Error::Parse(_))));
        assert!(matches!(parse_regions(b"not json"), Err(Error::Parse(_))));
    }
}
