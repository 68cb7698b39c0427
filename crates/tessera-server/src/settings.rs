//! Process settings.
//!
//! Layered, later sources winning: built-in defaults, an optional file named
//! by `TESSERA_CONFIG` (default `tessera.toml`), then `TESSERA_*` environment
//! variables with `__` between sections, e.g. `TESSERA_GIT__URI`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tessera_git::{RepositoryConfig, StorageMode};
use tessera_secrets::SecretQuery;

/// Environment variable naming the settings file.
pub const CONFIG_FILE_ENV: &str = "TESSERA_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "tessera.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub git: GitSettings,
    pub secrets: SecretSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| SettingsError::Invalid(format!("invalid listen address {}:{}", self.host, self.port)))
    }
}

/// How the tracked repository is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitBackendKind {
    /// Native git transport.
    #[default]
    Git,
    /// GitHub REST tree and blob API.
    Github,
    /// A plain local directory.
    Native,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    pub backend: GitBackendKind,
    pub uri: String,
    pub branch: String,
    pub local_path: PathBuf,
    pub storage: StorageMode,
    pub auth_token: Option<String>,
    /// Seconds between polls; 0 disables polling.
    pub poll_interval_secs: u64,
    pub fetch_concurrency: usize,
    pub github: GithubSettings,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            backend: GitBackendKind::default(),
            uri: String::new(),
            branch: "main".to_string(),
            local_path: PathBuf::from("./repo"),
            storage: StorageMode::default(),
            auth_token: None,
            poll_interval_secs: 30,
            fetch_concurrency: 10,
            github: GithubSettings::default(),
        }
    }
}

impl GitSettings {
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    /// Builds the typed repository configuration.
    pub fn repository_config(&self) -> Result<RepositoryConfig, SettingsError> {
        let mut builder = RepositoryConfig::builder()
            .uri(&self.uri)
            .branch(&self.branch)
            .local_path(&self.local_path)
            .storage(self.storage)
            .fetch_concurrency(self.fetch_concurrency);

        if let Some(interval) = self.poll_interval() {
            builder = builder.poll_interval(interval);
        }
        if let Some(token) = &self.auth_token {
            builder = builder.auth_token(token);
        }

        builder
            .build()
            .map_err(|e| SettingsError::Invalid(format!("git: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    pub api_url: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
        }
    }
}

/// Which secret provider is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretProviderKind {
    #[default]
    None,
    Http,
    Env,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    pub provider: SecretProviderKind,
    /// Seconds between scheduled refreshes; 0 means manual refresh only.
    pub refresh_interval_secs: u64,
    pub app_id: String,
    pub env_name: String,
    pub path: String,
    pub http: HttpSecretSettings,
    pub env: EnvSecretSettings,
    pub file: FileSecretSettings,
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            provider: SecretProviderKind::default(),
            refresh_interval_secs: 0,
            app_id: String::new(),
            env_name: String::new(),
            path: "/".to_string(),
            http: HttpSecretSettings::default(),
            env: EnvSecretSettings::default(),
            file: FileSecretSettings::default(),
        }
    }
}

impl SecretSettings {
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn query(&self) -> SecretQuery {
        SecretQuery::new(&self.app_id, &self.env_name).with_path(&self.path)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSecretSettings {
    pub url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvSecretSettings {
    pub prefix: String,
}

impl Default for EnvSecretSettings {
    fn default() -> Self {
        Self {
            prefix: "SECRET_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSecretSettings {
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl Settings {
    /// Loads settings from the default file location and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(path)
    }

    /// Loads settings with `path` as the optional settings file.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("TESSERA")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Checks the fields the selected backends need.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.git.uri.trim().is_empty() {
            return Err(SettingsError::Invalid("git.uri is required".to_string()));
        }
        if self.git.branch.trim().is_empty() {
            return Err(SettingsError::Invalid("git.branch cannot be empty".to_string()));
        }
        match self.secrets.provider {
            SecretProviderKind::Http if self.secrets.http.url.trim().is_empty() => Err(
                SettingsError::Invalid("secrets.http.url is required for the http provider".to_string()),
            ),
            SecretProviderKind::File if self.secrets.file.path.as_os_str().is_empty() => Err(
                SettingsError::Invalid("secrets.file.path is required for the file provider".to_string()),
            ),
            _ => Ok(()),
        }
    }
}
