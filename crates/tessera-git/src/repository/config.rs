//! Repository synchronization configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the working copy lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    /// A directory on disk that survives restarts.
    #[default]
    Local,
    /// A process-owned temporary directory, removed when the process exits.
    InMemory,
}

/// Configuration for a tracked repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// The remote URI (HTTPS, SSH or file).
    uri: String,

    /// Branch whose tip is served.
    #[serde(default = "default_branch")]
    branch: String,

    /// Directory holding the working copy in [`StorageMode::Local`].
    #[serde(default = "default_local_path")]
    local_path: PathBuf,

    #[serde(default)]
    storage: StorageMode,

    /// Token sent as the transport username.
    #[serde(default, skip_serializing)]
    auth_token: Option<String>,

    /// Interval between remote polls.
    #[serde(default = "default_poll_interval", with = "duration_secs")]
    poll_interval: Duration,

    /// Upper bound on concurrent remote fetches.
    #[serde(default = "default_fetch_concurrency")]
    fetch_concurrency: usize,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_local_path() -> PathBuf {
    PathBuf::from("./repo")
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_fetch_concurrency() -> usize {
    10
}

impl RepositoryConfig {
    /// Creates a new builder for RepositoryConfig.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn local_path(&self) -> &PathBuf {
        &self.local_path
    }

    pub fn storage(&self) -> StorageMode {
        self.storage
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }
}

/// Builder for RepositoryConfig.
#[derive(Debug, Default)]
pub struct RepositoryConfigBuilder {
    uri: Option<String>,
    branch: Option<String>,
    local_path: Option<PathBuf>,
    storage: StorageMode,
    auth_token: Option<String>,
    poll_interval: Option<Duration>,
    fetch_concurrency: Option<usize>,
}

impl RepositoryConfigBuilder {
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    pub fn storage(mut self, storage: StorageMode) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the token used as the transport username. Empty tokens are ignored.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn fetch_concurrency(mut self, limit: usize) -> Self {
        self.fetch_concurrency = Some(limit);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI or branch is missing or the fetch
    /// concurrency is zero.
    pub fn build(self) -> Result<RepositoryConfig, &'static str> {
        let uri = self.uri.filter(|u| !u.trim().is_empty()).ok_or("uri is required")?;
        let branch = self.branch.unwrap_or_else(default_branch);
        if branch.trim().is_empty() {
            return Err("branch must not be empty");
        }
        let fetch_concurrency = self.fetch_concurrency.unwrap_or_else(default_fetch_concurrency);
        if fetch_concurrency == 0 {
            return Err("fetch_concurrency must be at least 1");
        }

        Ok(RepositoryConfig {
            uri,
            branch,
            local_path: self.local_path.unwrap_or_else(default_local_path),
            storage: self.storage,
            auth_token: self.auth_token,
            poll_interval: self.poll_interval.unwrap_or_else(default_poll_interval),
            fetch_concurrency,
        })
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
