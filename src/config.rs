use std::collections::BTreeMap;

/// Order in which placeholder keys are substituted (text) or tried (images).
///
/// Overlapping keys make the result depend on this order, so it is always deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    /// Byte-wise ascending key order.
    #[default]
    Lexicographic,
    /// Longer keys first, ties broken lexicographically.
    LongestFirst,
}

impl KeyOrder {
    pub fn arrange<'m, V>(&self, map: &'m BTreeMap<String, V>) -> Vec<(&'m str, &'m V)> {
        let mut entries: Vec<(&str, &V)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
        if *self == KeyOrder::LongestFirst {
            entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        }
        entries
    }
}

/// Configuration options for filling a template.
///
/// Use [`FillConfig::builder()`] to create a configuration instance.
/// This allows you to customize only the desired fields while falling back to sensible defaults for the rest.
///
/// # Configuration Options
///
/// | Parameter | Type | Default | Description |
/// |-----------|------|---------|-------------|
/// | `key_order` | `KeyOrder` | `Lexicographic` | Order in which keys are substituted and image keys are tried |
/// | `replace_images` | `bool` | `true` | Whether `{IMAGE:key}` placeholders are replaced at all |
/// | `temp_prefix` | `String` | `"pptx-template"` | File name prefix of temporary output files |
///
/// # Example
///
/// ```
/// use pptx_templater::{FillConfig, KeyOrder};
///
/// let config = FillConfig::builder()
///     .key_order(KeyOrder::LongestFirst)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct FillConfig {
    pub key_order: KeyOrder,
    pub replace_images: bool,
    pub temp_prefix: String,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            key_order: KeyOrder::default(),
            replace_images: true,
            temp_prefix: "pptx-template".to_string(),
        }
    }
}

impl FillConfig {
    pub fn builder() -> FillConfigBuilder {
        FillConfigBuilder::default()
    }
}

/// Builder for [`FillConfig`].
///
/// Allows setting individual configuration fields while falling back to defaults for any unspecified values
#[derive(Debug, Default)]
pub struct FillConfigBuilder {
    key_order: Option<KeyOrder>,
    replace_images: Option<bool>,
    temp_prefix: Option<String>,
}

impl FillConfigBuilder {
    pub fn key_order(mut self, value: KeyOrder) -> Self {
        self.key_order = Some(value);
        self
    }

    /// Sets whether image placeholders are replaced.
    pub fn replace_images(mut self, value: bool) -> Self {
        self.replace_images = Some(value);
        self
    }

    pub fn temp_prefix(mut self, value: impl Into<String>) -> Self {
        self.temp_prefix = Some(value.into());
        self
    }

    /// Builds the final [`FillConfig`] instance, applying default values for any fields that were not set.
    pub fn build(self) -> FillConfig {
        let defaults = FillConfig::default();
        FillConfig {
            key_order: self.key_order.unwrap_or(defaults.key_order),
            replace_images: self.replace_images.unwrap_or(defaults.replace_images),
            temp_prefix: self.temp_prefix.unwrap_or(defaults.temp_prefix),
        }
    }
}
