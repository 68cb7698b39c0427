//! Mapping file names to (application, profile) pairs.

use std::path::{Path, PathBuf};

use tessera_core::{Application, ApplicationProfile, ConfigFormat, Profile};

/// A config file as seen by the index.
///
/// `service-x-dev.yml` describes application `service-x`, profile `dev`;
/// `orders.json` describes application `orders`, profile `default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileDescriptor {
    /// Path relative to the working copy root.
    pub path: PathBuf,
    pub application: Application,
    pub profile: Profile,
    pub format: ConfigFormat,
    /// The extension as written, without the dot.
    pub extension: String,
    stem: String,
}

impl ConfigFileDescriptor {
    /// Describes `path`, or returns `None` if its extension is not a
    /// supported config format.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let extension = path.extension()?.to_str()?;
        let format = ConfigFormat::from_extension(extension)?;
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }

        let ApplicationProfile {
            application,
            profile,
        } = ApplicationProfile::parse(stem);

        Some(Self {
            path: path.to_path_buf(),
            application,
            profile,
            format,
            extension: extension.to_string(),
            stem: stem.to_string(),
        })
    }

    /// Every (application, profile) pair this file is indexed under.
    ///
    /// The first entry is the last-dash split. A stem containing a dash is
    /// also indexed whole under the default profile, so `service-x.yml`
    /// answers both `(service, x)` and `(service-x, default)`.
    pub fn aliases(&self) -> Vec<(Application, Profile)> {
        let mut keys = vec![(self.application.clone(), self.profile.clone())];
        if self.stem.contains('-') {
            keys.push((Application::new(self.stem.as_str()), Profile::default_profile()));
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_is_default_profile() {
        let d = ConfigFileDescriptor::from_path("orders.json").unwrap();

        assert_eq!(d.application.as_str(), "orders");
        assert!(d.profile.is_default());
        assert_eq!(d.format, ConfigFormat::Json);
        assert_eq!(d.aliases().len(), 1);
    }

    #[test]
    fn test_last_dash_split() {
        let d = ConfigFileDescriptor::from_path("nested/dir/service-x-dev.yaml").unwrap();

        assert_eq!(d.application.as_str(), "service-x");
        assert_eq!(d.profile.as_str(), "dev");
        assert_eq!(d.extension, "yaml");
        assert_eq!(d.path, PathBuf::from("nested/dir/service-x-dev.yaml"));
    }

    #[test]
    fn test_dashed_stem_aliases() {
        let d = ConfigFileDescriptor::from_path("service-x.yml").unwrap();
        let aliases = d.aliases();

        assert_eq!(aliases[0], (Application::new("service"), Profile::new("x")));
        assert_eq!(aliases[1], (Application::new("service-x"), Profile::default_profile()));
    }

    #[test]
    fn test_unsupported_and_hidden_files() {
        assert!(ConfigFileDescriptor::from_path("README.md").is_none());
        assert!(ConfigFileDescriptor::from_path("Makefile").is_none());
        assert!(ConfigFileDescriptor::from_path(".env").is_none());
        assert!(ConfigFileDescriptor::from_path("prod.env").is_some());
    }
}
