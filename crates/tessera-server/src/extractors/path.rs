use serde::Deserialize;
use tessera_core::{ApplicationProfile, OutputFormat};

/// Longest label accepted, in bytes.
pub const MAX_LABEL_LEN: usize = 255;

/// Extractor for `/{app}/{profile}`.
#[derive(Debug, Deserialize)]
pub struct AppProfilePath {
    pub app: String,
    pub profile: String,
}

/// Extractor for `/{app}/{profile}/{label}`.
#[derive(Debug, Deserialize)]
pub struct AppProfileLabelPath {
    pub app: String,
    pub profile: String,
    pub label: String,
}

impl AppProfilePath {
    pub fn validate(&self) -> Result<(), String> {
        if self.app.trim().is_empty() {
            return Err("Application name cannot be empty".to_string());
        }
        if self.profile.trim().is_empty() {
            return Err("Profile cannot be empty".to_string());
        }
        Ok(())
    }
}

impl AppProfileLabelPath {
    /// Decodes the label. `(_)` stands for `/` in labels such as `release(_)1.2`.
    pub fn sanitized_label(&self) -> String {
        sanitize_label(&self.label)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.app.trim().is_empty() {
            return Err("Application name cannot be empty".to_string());
        }
        if self.profile.trim().is_empty() {
            return Err("Profile cannot be empty".to_string());
        }
        if self.label.trim().is_empty() {
            return Err("Label cannot be empty".to_string());
        }
        Ok(())
    }
}

impl From<AppProfileLabelPath> for AppProfilePath {
    fn from(path: AppProfileLabelPath) -> Self {
        Self {
            app: path.app,
            profile: path.profile,
        }
    }
}

pub fn sanitize_label(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    decoded.replace("(_)", "/")
}

/// Rejects labels that could escape the working copy or are unreasonably long.
pub fn validate_label(label: &str) -> Result<(), String> {
    if label.contains("..") {
        return Err("Label cannot contain '..'".to_string());
    }
    if label.chars().any(char::is_control) {
        return Err("Label cannot contain control characters".to_string());
    }
    if label.starts_with('/') {
        return Err("Label cannot start with '/'".to_string());
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(format!("Label cannot exceed {MAX_LABEL_LEN} bytes"));
    }
    Ok(())
}

/// A rendered-document request such as `orders-prod.yml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    pub application: String,
    pub profile: String,
    pub format: OutputFormat,
}

impl DocumentName {
    /// Parses `{application}-{profile}.{ext}`; the last dash separates the
    /// profile, and a name without a dash gets the `default` profile.
    ///
    /// Returns `None` unless the extension is one of `yml`, `yaml`,
    /// `properties` or `json` and the stem is non-empty.
    pub fn parse(name: &str) -> Option<Self> {
        let (stem, extension) = name.rsplit_once('.')?;
        let format = OutputFormat::from_extension(extension)?;
        if stem.is_empty() {
            return None;
        }

        let parsed = ApplicationProfile::parse(stem);
        if parsed.application.as_str().is_empty() || parsed.profile.as_str().is_empty() {
            return None;
        }

        Some(Self {
            application: parsed.application.as_str().to_string(),
            profile: parsed.profile.as_str().to_string(),
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_name() {
        let doc = DocumentName::parse("my-app-prod.yml").unwrap();
        assert_eq!(doc.application, "my-app");
        assert_eq!(doc.profile, "prod");
        assert_eq!(doc.format, OutputFormat::Yaml);

        let doc = DocumentName::parse("orders.properties").unwrap();
        assert_eq!(doc.application, "orders");
        assert_eq!(doc.profile, "default");
        assert_eq!(doc.format, OutputFormat::Properties);
    }

    #[test]
    fn test_document_name_rejects() {
        assert!(DocumentName::parse("orders").is_none());
        assert!(DocumentName::parse("orders-dev.txt").is_none());
        assert!(DocumentName::parse(".yml").is_none());
        assert!(DocumentName::parse("-dev.json").is_none());
        assert!(DocumentName::parse("orders-.json").is_none());
    }

    #[test]
    fn test_validate_label() {
        assert!(validate_label("main").is_ok());
        assert!(validate_label("release/1.2").is_ok());
        assert!(validate_label("../etc").is_err());
        assert!(validate_label("/main").is_err());
        assert!(validate_label("ma\nin").is_err());
        assert!(validate_label(&"x".repeat(MAX_LABEL_LEN)).is_ok());
        assert!(validate_label(&"x".repeat(MAX_LABEL_LEN + 1)).is_err());
    }

    #[test]
    fn test_sanitized_label() {
        let path = AppProfileLabelPath {
            app: "orders".into(),
            profile: "dev".into(),
            label: "release(_)1.2".into(),
        };
        assert_eq!(path.sanitized_label(), "release/1.2");

        let path = AppProfileLabelPath {
            label: "feature%2Fx".into(),
            ..path
        };
        assert_eq!(path.sanitized_label(), "feature/x");
    }
}
