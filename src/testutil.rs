//! Inline GeoJSON fixtures for unit tests.

/// Closed square ring centred on (lon, lat), as a GeoJSON coordinate array
pub fn square(lon: f64, lat: f64, half: f64) -> String {
    format!(
        "[[[{w},{s}],[{e},{s}],[{e},{n}],[{w},{n}],[{w},{s}]]]",
        w = lon - half,
        e = lon + half,
        s = lat - half,
        n = lat + half
    )
}

/// A Polygon feature with raw JSON properties
pub fn feature_json(properties: &str, coordinates: &str) -> String {
    format!(
        r#"{{"type":"Feature","properties":{},"geometry":{{"type":"Polygon","coordinates":{}}}}}"#,
        properties, coordinates
    )
}

/// A square Polygon feature with name, level and adcode properties
pub fn admin_feature(name: &str, level: &str, adcode: i64, lon: f64, lat: f64, half: f64) -> String {
    feature_json(
        &format!(
            r#"{{"name":"{}","level":"{}","adcode":{}}}"#,
            name, level, adcode
        ),
        &square(lon, lat, half),
    )
}

pub fn collection(features: &[String]) -> String {
    format!(
        r#"{{"type":"FeatureCollection","features":[{}]}}"#,
        features.join(",")
    )
}
