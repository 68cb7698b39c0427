//! # Tessera Git
//!
//! Keeps a local copy of the tracked repository in sync with its remote,
//! indexes the config files in it, and resolves application/profile queries
//! into ordered property sources.
//!
//! ## Layout
//!
//! - [`repository`]: the [`VersionControl`] capability and its clients
//!   (gix, GitHub tree API, plain directory)
//! - [`sync`]: [`RepositorySynchronizer`], repository state and polling
//! - [`index`]: [`ConfigIndex`] and its atomically swapped [`IndexHandle`]
//! - [`resolver`]: [`ConfigResolver`], discovery order and file loading
//! - [`pool`]: the bounded [`FetchPool`] used for remote fetches
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessera_git::{ConfigResolver, GixClient, RepositoryConfig, RepositorySynchronizer};
//!
//! let config = RepositoryConfig::builder()
//!     .uri("https://github.com/org/config-repo.git")
//!     .local_path("/var/lib/tessera/repo")
//!     .build()?;
//!
//! let synchronizer = Arc::new(RepositorySynchronizer::new(Arc::new(GixClient::new(&config)?)));
//! synchronizer.start().await?;
//! synchronizer.start_polling(config.poll_interval());
//!
//! let resolver = ConfigResolver::new(synchronizer);
//! let response = resolver.resolve("orders", "prod,eu", None).await?;
//! ```

pub mod error;
pub mod index;
pub mod pool;
pub mod repository;
pub mod resolver;
pub mod source;
pub mod sync;

pub use error::ConfigSourceError;
pub use index::{ConfigFileDescriptor, ConfigIndex, IndexHandle};
pub use pool::FetchPool;
pub use repository::{
    GitHubTreeClient, GixClient, NativeClient, RepositoryConfig, RepositoryConfigBuilder,
    StorageMode, VersionControl,
};
pub use resolver::ConfigResolver;
pub use source::ConfigQuery;
pub use sync::{PollConfig, PollOutcome, RepositoryState, RepositoryStatus, RepositorySynchronizer};

// Re-export tessera_core for consumers
pub use tessera_core;
