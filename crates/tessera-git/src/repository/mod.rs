//! Version-control access for the tracked repository.
//!
//! The synchronizer talks to the remote only through [`VersionControl`].
//! Three clients implement it:
//!
//! - [`GixClient`]: git over its native transport, using gix
//! - [`GitHubTreeClient`]: the GitHub REST tree/blob API, fetched through a bounded pool
//! - [`NativeClient`]: a plain local directory, fingerprinted instead of versioned

mod config;
mod gix_client;
mod github;
mod native;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ConfigSourceError;

pub use config::{RepositoryConfig, RepositoryConfigBuilder, StorageMode};
pub use gix_client::GixClient;
pub use github::{GitHubTreeClient, TreeEntry, decode_blob, parse_github_slug};
pub use native::NativeClient;

/// Capability to materialize the tracked branch into a local directory.
///
/// Implementations run their blocking work off the async executor.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Short identifier used in logs and property source names (`git`, `github`, `native`).
    fn name(&self) -> &'static str;

    /// Remote the working copy tracks.
    fn remote_url(&self) -> &str;

    /// Branch whose tip is served.
    fn branch(&self) -> &str;

    /// Directory owning the working copy.
    fn working_dir(&self) -> PathBuf;

    /// Directory that currently holds the checked-out files.
    ///
    /// Usually [`working_dir`](Self::working_dir); clients that check out into
    /// fresh snapshot directories return the latest one.
    fn content_root(&self) -> PathBuf {
        self.working_dir()
    }

    /// Returns true if a working copy from an earlier run is present.
    fn has_working_copy(&self) -> bool;

    /// Creates the working copy from the branch tip (shallow where supported).
    async fn clone_branch(&self) -> Result<(), ConfigSourceError>;

    /// Updates the working copy to the branch tip, discarding local changes.
    async fn fetch_and_checkout(&self) -> Result<(), ConfigSourceError>;

    /// Commit id currently checked out, if any.
    async fn local_head(&self) -> Result<Option<String>, ConfigSourceError>;

    /// Commit id of the branch tip on the remote. Downloads no content.
    async fn remote_head(&self) -> Result<String, ConfigSourceError>;
}
