//! Shape assertions for response bodies.

use serde_json::Value;

/// Checks the Spring Cloud Config `Environment` shape.
pub fn assert_spring_config_schema(json: &Value) {
    let obj = json.as_object().expect("Response should be a JSON object");

    for field in ["name", "profiles", "label", "version", "state", "propertySources"] {
        assert!(obj.contains_key(field), "Missing '{}' field", field);
    }

    assert!(obj["name"].is_string(), "'name' should be a string");
    assert!(obj["profiles"].is_array(), "'profiles' should be an array");
    assert!(
        obj["label"].is_null() || obj["label"].is_string(),
        "'label' should be null or string"
    );
    assert!(
        obj["version"].is_null() || obj["version"].is_string(),
        "'version' should be null or string"
    );

    let sources = obj["propertySources"]
        .as_array()
        .expect("'propertySources' should be an array");
    for source in sources {
        let ps = source.as_object().expect("PropertySource should be an object");
        assert!(ps["name"].is_string(), "PropertySource missing 'name'");
        assert!(ps["source"].is_object(), "PropertySource 'source' should be an object");
    }
}

/// Checks the error envelope and returns its message.
pub fn assert_error_envelope(json: &Value, status: u16, path: &str) -> String {
    assert_eq!(json["status"], status, "envelope status: {json}");
    assert_eq!(json["path"], path, "envelope path: {json}");
    assert!(json["error"].is_string(), "envelope 'error' should be a string");
    let timestamp = json["timestamp"].as_str().expect("envelope missing timestamp");
    assert!(
        chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
        "timestamp is not RFC 3339: {timestamp}"
    );
    json["message"].as_str().expect("envelope missing message").to_string()
}

pub fn assert_valid_yaml(text: &str) {
    let result: Result<serde_yaml::Value, _> = serde_yaml::from_str(text);
    assert!(result.is_ok(), "Invalid YAML: {}", text);
}

pub fn assert_valid_properties(text: &str) {
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        assert!(
            trimmed.contains('='),
            "Invalid properties line (missing '='): {}",
            line
        );
    }
}
