#![allow(dead_code)]
use tessera_core::{ConfigMap, PropertySource};

/// Helper to create a ConfigMap from a JSON string slice.
/// Panics if the JSON is invalid (intended for tests).
pub fn config_from_json(json: &str) -> ConfigMap {
    ConfigMap::from_json(json).expect("Failed to create test config from JSON")
}

/// Helper to create a named PropertySource.
pub fn source(name: &str, json_content: &str) -> PropertySource {
    PropertySource::new(name, config_from_json(json_content))
}

/// Returns a complex nested configuration fixture.
pub fn complex_config() -> ConfigMap {
    config_from_json(
        r#"{
        "server": {
            "port": 8080,
            "host": "localhost",
            "ssl": {
                "enabled": true,
                "cert": "/path/to/cert"
            }
        },
        "database": {
            "primary": {
                "url": "jdbc:postgres://local",
                "pool": 10
            }
        },
        "features": ["new-ui", "beta-api"]
    }"#,
    )
}
