//! Configuration query types.

use tessera_core::{Application, Label, Profile};

/// A request for configuration: application, ordered profiles, optional label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigQuery {
    application: Application,
    profiles: Vec<Profile>,
    label: Option<Label>,
}

impl ConfigQuery {
    /// Creates a query. An empty profile list becomes `["default"]`.
    ///
    /// ```
    /// use tessera_git::ConfigQuery;
    ///
    /// let query = ConfigQuery::new("myapp", vec!["dev", "local"]);
    /// assert_eq!(query.application().as_str(), "myapp");
    /// assert_eq!(query.profiles().len(), 2);
    /// ```
    pub fn new(application: impl Into<Application>, profiles: Vec<impl Into<Profile>>) -> Self {
        let mut profiles: Vec<Profile> = profiles.into_iter().map(Into::into).collect();
        if profiles.is_empty() {
            profiles.push(Profile::default_profile());
        }
        Self {
            application: application.into(),
            profiles,
            label: None,
        }
    }

    /// Builds a query from the raw path segments of a request.
    ///
    /// `profiles` is comma-separated; entries are trimmed and empty ones
    /// dropped.
    ///
    /// ```
    /// use tessera_git::ConfigQuery;
    ///
    /// let query = ConfigQuery::parse("orders", " prod, ,eu", Some("release"));
    /// assert_eq!(query.to_string(), "orders/prod,eu/release");
    /// ```
    pub fn parse(application: &str, profiles: &str, label: Option<&str>) -> Self {
        Self {
            application: Application::new(application),
            profiles: Profile::parse_list(profiles),
            label: label.map(Label::new),
        }
    }

    /// Returns a new query with the specified label.
    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.as_str().to_string()).collect()
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Returns the label, or `default` if none is set.
    pub fn effective_label<'a>(&'a self, default: &'a str) -> &'a str {
        self.label.as_ref().map(Label::as_str).unwrap_or(default)
    }
}

impl std::fmt::Display for ConfigQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.application, self.profile_names().join(","))?;
        if let Some(label) = &self.label {
            write!(f, "/{}", label)?;
        }
        Ok(())
    }
}
