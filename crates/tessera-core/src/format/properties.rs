use crate::config::{ConfigMap, ConfigValue};
use crate::error::{Result, TesseraError};
use crate::format::flatten::{escape_for_properties, escape_properties_key, flatten};
use crate::format::{FormatParser, FormatSerializer};
use indexmap::IndexMap;
use java_properties::PropertiesIter;

/// Java `.properties` text.
///
/// Parsing accepts the full Java syntax (`=`, `:` or whitespace separators,
/// `\` line continuations, `#`/`!` comments, unicode escapes). Keys stay flat,
/// so `a.b=1` and `a.b.c=2` can sit side by side; nesting happens when
/// sources are merged. Values always stay strings. Input is read as UTF-8
/// rather than Latin-1.
pub struct PropertiesFormat;

impl FormatParser for PropertiesFormat {
    fn parse(&self, input: &str) -> Result<ConfigMap> {
        let mut root = IndexMap::new();
        PropertiesIter::new_with_encoding(input.as_bytes(), encoding_rs::UTF_8)
            .read_into(|key, value| {
                root.insert(key, ConfigValue::String(value));
            })
            .map_err(|e| TesseraError::parse_error_with_cause("properties", e.to_string(), e))?;

        Ok(ConfigMap::from_inner(root))
    }
}

impl FormatSerializer for PropertiesFormat {
    fn serialize(&self, config: &ConfigMap) -> Result<String> {
        let mut output = String::new();
        for (key, value) in flatten(config, "") {
            if matches!(&value, ConfigValue::Object(map) if map.is_empty()) {
                continue;
            }
            output.push_str(&escape_properties_key(&key));
            output.push('=');
            output.push_str(&escape_for_properties(&value.to_plain_string()));
            output.push('\n');
        }
        Ok(output)
    }
}
