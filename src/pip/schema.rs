//! Which attributes form a region's key, and which one links to children.

use super::codec::KeyCodec;

/// Attribute holding the administrative code unless configured otherwise
pub const DEFAULT_ADCODE_KEY: &str = "adcode";

/// Ordered required attributes plus the codec that joins them into a key
#[derive(Debug, Clone)]
pub struct KeySchema {
    keys: Vec<String>,
    adcode_key: String,
    codec: KeyCodec,
}

impl KeySchema {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            adcode_key: DEFAULT_ADCODE_KEY.to_string(),
            codec: KeyCodec::default(),
        }
    }

    /// A single attribute whose value is the key itself
    pub fn single(key: impl Into<String>) -> Self {
        Self::new([key.into()])
    }

    pub fn with_adcode_key(mut self, key: impl Into<String>) -> Self {
        self.adcode_key = key.into();
        self
    }

    pub fn with_codec(mut self, codec: KeyCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_delimiter(self, delimiter: impl Into<String>) -> Self {
        self.with_codec(KeyCodec::new(delimiter))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn adcode_key(&self) -> &str {
        &self.adcode_key
    }

    /// Position of the adcode attribute among the keys, if it is one
    pub fn adcode_position(&self) -> Option<usize> {
        self.keys.iter().position(|k| *k == self.adcode_key)
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }
}

impl Default for KeySchema {
    /// `name`, `level`, `adcode` joined with `-`
    fn default() -> Self {
        Self::new(["name", "level", DEFAULT_ADCODE_KEY])
    }
}
