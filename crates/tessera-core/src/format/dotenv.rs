use crate::config::{ConfigMap, ConfigValue};
use crate::error::Result;
use crate::format::FormatParser;

/// Line-delimited `KEY=VALUE` files (`.env`).
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is
/// tolerated, and the line is split at the first `=`. Keys stay flat. A value
/// wrapped in matching single or double quotes is unquoted; double-quoted
/// values also expand `\n`. Lines without `=` are ignored.
pub struct EnvFormat;

impl FormatParser for EnvFormat {
    fn parse(&self, input: &str) -> Result<ConfigMap> {
        let mut config = ConfigMap::new();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            config.insert(key, ConfigValue::String(unquote(value.trim())));
        }

        Ok(config)
    }
}

fn unquote(value: &str) -> String {
    let quoted = |q: char| value.len() >= 2 && value.starts_with(q) && value.ends_with(q);

    if quoted('"') {
        value[1..value.len() - 1].replace("\\n", "\n")
    } else if quoted('\'') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
