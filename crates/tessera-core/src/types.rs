//! Common type definitions and newtypes for Tessera.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the profile used when none is given.
pub const DEFAULT_PROFILE: &str = "default";

/// Name of the application whose files apply to every application.
pub const GENERIC_APPLICATION: &str = "application";

/// Application identifier.
///
/// Represents the name of an application whose configuration
/// is being served. This is typically the service name.
///
/// # Example
///
/// ```
/// use tessera_core::Application;
///
/// let app = Application::new("payment-service");
/// assert_eq!(app.as_str(), "payment-service");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Application(String);

impl Application {
    /// Creates a new Application identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the application name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The generic `application` name shared by all applications.
    pub fn generic() -> Self {
        Self::new(GENERIC_APPLICATION)
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Application {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Application {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Execution profile for configuration selection.
///
/// # Example
///
/// ```
/// use tessera_core::Profile;
///
/// let profiles = Profile::parse_list(" dev, ,cloud ");
/// assert_eq!(profiles, vec![Profile::new("dev"), Profile::new("cloud")]);
///
/// assert_eq!(Profile::parse_list(""), vec![Profile::default_profile()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(String);

impl Profile {
    /// Creates a new Profile with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the profile name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the default profile.
    pub fn default_profile() -> Self {
        Self::new(DEFAULT_PROFILE)
    }

    /// Returns true for the `default` profile.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_PROFILE
    }

    /// Parses a comma-separated profile list.
    ///
    /// Entries are trimmed and empty ones dropped; an empty result becomes
    /// `["default"]`. Order is preserved.
    pub fn parse_list(raw: &str) -> Vec<Profile> {
        let profiles: Vec<Profile> = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Profile::new)
            .collect();

        if profiles.is_empty() {
            vec![Profile::default_profile()]
        } else {
            profiles
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Profile {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Profile {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Configuration version or branch label.
///
/// Labels identify a branch, tag or ref. They are echoed back in responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Creates a new Label with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the label name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the main/default label.
    pub fn main() -> Self {
        Self::new("main")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An `{application}-{profile}` pair decoded from a single name.
///
/// The name is split on its **last** dash: `my-app-dev` is profile `dev` of
/// application `my-app`. A name without a dash has profile `default`.
///
/// # Example
///
/// ```
/// use tessera_core::ApplicationProfile;
///
/// let parsed = ApplicationProfile::parse("my-app-prod");
/// assert_eq!(parsed.application.as_str(), "my-app");
/// assert_eq!(parsed.profile.as_str(), "prod");
///
/// let parsed = ApplicationProfile::parse("myapp");
/// assert!(parsed.profile.is_default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationProfile {
    pub application: Application,
    pub profile: Profile,
}

impl ApplicationProfile {
    /// Splits `name` on its last dash.
    pub fn parse(name: &str) -> Self {
        match name.rsplit_once('-') {
            Some((application, profile)) => Self {
                application: Application::new(application),
                profile: Profile::new(profile),
            },
            None => Self {
                application: Application::new(name),
                profile: Profile::default_profile(),
            },
        }
    }
}
