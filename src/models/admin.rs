//! Administrative region types produced by boundary sources.

use geo::MultiPolygon;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// A region attribute, typed once at the boundary source.
///
/// Numeric administrative codes arrive as JSON numbers and are kept as
/// integers so they never render as `"110000.0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrValue {
    /// Integer value (administrative codes, numeric levels)
    Code(i64),
    /// Anything else, in its textual form
    Text(String),
}

impl AttrValue {
    /// Convert a GeoJSON property value.
    ///
    /// Integral numbers inside the `i64` range become [`AttrValue::Code`],
    /// including floats such as `110000.0`. Numbers outside that range and
    /// fractional numbers pass through as text in their JSON rendering, so
    /// an oversized code is still usable as a lookup key. `null` is the
    /// empty string.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => AttrValue::Text(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return AttrValue::Code(i);
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                        AttrValue::Code(f as i64)
                    }
                    _ => AttrValue::Text(n.to_string()),
                }
            }
            Value::Bool(b) => AttrValue::Text(b.to_string()),
            Value::Null => AttrValue::Text(String::new()),
            other => AttrValue::Text(other.to_string()),
        }
    }

    /// Canonical string form used inside composite keys
    pub fn as_key_part(&self) -> Cow<'_, str> {
        match self {
            AttrValue::Code(code) => Cow::Owned(code.to_string()),
            AttrValue::Text(text) => Cow::Borrowed(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AttrValue::Text(text) if text.is_empty())
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Code(code) => write!(f, "{}", code),
            AttrValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Code(value)
    }
}

/// A single administrative region with its attributes and geometry.
///
/// Geometry uses `x = longitude`, `y = latitude`, as in the source files.
#[derive(Debug, Clone)]
pub struct Region {
    pub attributes: HashMap<String, AttrValue>,
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    pub fn new(attributes: HashMap<String, AttrValue>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            attributes,
            geometry,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Whether this region carries any polygon at all
    pub fn has_geometry(&self) -> bool {
        !self.geometry.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_codes_stay_integers() {
        assert_eq!(AttrValue::from_json(&json!(110000)), AttrValue::Code(110000));
        assert_eq!(
            AttrValue::from_json(&json!(110000.0)),
            AttrValue::Code(110000)
        );
        assert_eq!(
            AttrValue::from_json(&json!(110000.0)).as_key_part(),
            "110000"
        );
    }

    #[test]
    fn test_non_integral_values_pass_through_as_text() {
        assert_eq!(
            AttrValue::from_json(&json!(1.5)),
            AttrValue::Text("1.5".to_string())
        );
        assert_eq!(
            AttrValue::from_json(&json!(u64::MAX)),
            AttrValue::Text(u64::MAX.to_string())
        );
        assert_eq!(
            AttrValue::from_json(&json!("city")),
            AttrValue::Text("city".to_string())
        );
        assert!(AttrValue::from_json(&Value::Null).is_empty());
    }

    #[test]
    fn test_region_without_polygons() {
        let region = Region::new(HashMap::new(), MultiPolygon::new(vec![]));
        assert!(!region.has_geometry());
    }
}
