//! Composite key encoding.
//!
//! A region is stored under one string built from its ordered attribute
//! values. The default composition joins the values with the delimiter, so
//! splitting on that delimiter recovers them as long as no value contains it.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

pub const DEFAULT_DELIMITER: &str = "-";

/// Caller-supplied key composition over ordered attribute values
pub type ComposeFn = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Compose a key from ordered values
pub fn encode(values: &[String], compose: &dyn Fn(&[String]) -> String) -> String {
    compose(values)
}

/// Split a composite key on the delimiter
pub fn decode<'a>(key: &'a str, delimiter: &str) -> Vec<&'a str> {
    key.split(delimiter).collect()
}

#[derive(Clone)]
pub struct KeyCodec {
    delimiter: String,
    compose: Option<ComposeFn>,
}

impl KeyCodec {
    /// Join values with `delimiter`; an empty delimiter means `-`
    pub fn new(delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        Self {
            delimiter: if delimiter.is_empty() {
                DEFAULT_DELIMITER.to_string()
            } else {
                delimiter
            },
            compose: None,
        }
    }

    /// Use a custom composition function.
    ///
    /// `decode` still splits on `delimiter`, so the function has to join with
    /// the same delimiter for keys to split back into their fields.
    pub fn with_compose<F>(delimiter: impl Into<String>, compose: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        Self {
            compose: Some(Arc::new(compose)),
            ..Self::new(delimiter)
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn encode(&self, values: &[String]) -> String {
        match &self.compose {
            Some(compose) => encode(values, compose.as_ref()),
            None => values.join(&self.delimiter),
        }
    }

    pub fn decode<'a>(&self, key: &'a str) -> Vec<&'a str> {
        decode(key, &self.delimiter)
    }

    /// Decode, requiring exactly `expected` fields
    pub fn decode_exact(&self, key: &str, expected: usize) -> Result<Vec<String>> {
        let fields = self.decode(key);
        if fields.len() != expected {
            return Err(Error::DecodeMismatch {
                expected,
                found: fields.len(),
            });
        }
        Ok(fields.into_iter().map(String::from).collect())
    }
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl fmt::Debug for KeyCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyCodec")
            .field("delimiter", &self.delimiter)
            .field("custom_compose", &self.compose.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_trip() {
        for delimiter in ["-", "|", "::"] {
            let codec = KeyCodec::new(delimiter);
            let original = values(&["道里区", "district", "230102"]);
            let key = codec.encode(&original);
            assert_eq!(codec.decode_exact(&key, 3).unwrap(), original);
        }
    }

    #[test]
    fn test_custom_compose() {
        let codec = KeyCodec::with_compose("-", |ks: &[String]| format!("{}-{}", ks[0], ks[1]));
        let key = codec.encode(&values(&["哈尔滨市", "city"]));
        assert_eq!(key, "哈尔滨市-city");
        assert_eq!(codec.decode(&key), vec!["哈尔滨市", "city"]);
    }

    #[test]
    fn test_empty_delimiter_defaults() {
        let codec = KeyCodec::new("");
        assert_eq!(codec.delimiter(), DEFAULT_DELIMITER);
        assert_eq!(codec.encode(&values(&["a", "b"])), "a-b");
    }

    #[test]
    fn test_delimiter_inside_value_mismatches() {
        let codec = KeyCodec::default();
        let key = codec.encode(&values(&["Baden-Baden", "city"]));
        assert!(matches!(
            codec.decode_exact(&key, 2),
            Err(Error::DecodeMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_free_functions() {
        let compose = |ks: &[String]| ks[0].clone();
        assert_eq!(encode(&values(&["X"]), &compose), "X");
        assert_eq!(decode("a/b/c", "/"), vec!["a", "b", "c"]);
    }
}
