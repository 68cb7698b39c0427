//! The config file index.
//!
//! A [`ConfigIndex`] is built from one complete scan of the working copy and
//! never mutated afterwards. Readers reach it through an [`IndexHandle`],
//! which swaps in a replacement as a single pointer store.

mod descriptor;
mod handle;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigSourceError;

pub use descriptor::ConfigFileDescriptor;
pub use handle::IndexHandle;

type Paths = Vec<PathBuf>;

/// Lookup from application/profile names to config file paths.
///
/// All paths are relative to [`root`](Self::root). Within every bucket paths
/// are ordered by directory depth, then lexicographically, without
/// duplicates.
#[derive(Debug, Clone, Default)]
pub struct ConfigIndex {
    root: PathBuf,
    by_profile_application: BTreeMap<String, BTreeMap<String, Paths>>,
    by_application: BTreeMap<String, Paths>,
    by_profile: BTreeMap<String, Paths>,
    files: usize,
}

impl ConfigIndex {
    /// An index with no files.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Scans `root` recursively and indexes every supported config file.
    ///
    /// `.git` directories are skipped and symlinked directories are not
    /// followed. This does blocking I/O.
    pub fn build(root: impl Into<PathBuf>) -> Result<Self, ConfigSourceError> {
        let root = root.into();
        let mut relative = Vec::new();
        scan(&root, &root, &mut relative)?;

        let index = Self::from_paths(root, relative);
        debug!(root = %index.root.display(), files = index.files, "config index built");
        Ok(index)
    }

    /// Runs [`build`](Self::build) on the blocking pool.
    pub async fn build_async(root: impl Into<PathBuf>) -> Result<Self, ConfigSourceError> {
        let root = root.into();
        tokio::task::spawn_blocking(move || Self::build(root))
            .await
            .map_err(|e| ConfigSourceError::git(format!("index task failed: {e}")))?
    }

    /// Indexes an explicit list of relative paths. Unsupported files are ignored.
    pub fn from_paths(root: impl Into<PathBuf>, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut index = Self::empty(root);

        for path in paths {
            let Some(descriptor) = ConfigFileDescriptor::from_path(&path) else {
                continue;
            };
            index.files += 1;

            for (application, profile) in descriptor.aliases() {
                index
                    .by_profile_application
                    .entry(profile.as_str().to_string())
                    .or_default()
                    .entry(application.as_str().to_string())
                    .or_default()
                    .push(path.clone());
                index
                    .by_application
                    .entry(application.as_str().to_string())
                    .or_default()
                    .push(path.clone());
                index
                    .by_profile
                    .entry(profile.as_str().to_string())
                    .or_default()
                    .push(path.clone());
            }
        }

        index
            .by_profile_application
            .values_mut()
            .flat_map(BTreeMap::values_mut)
            .chain(index.by_application.values_mut())
            .chain(index.by_profile.values_mut())
            .for_each(sort_bucket);

        index
    }

    /// Files for `application` under `profile`.
    pub fn files_for(&self, application: &str, profile: &str) -> &[PathBuf] {
        self.by_profile_application
            .get(profile)
            .and_then(|apps| apps.get(application))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Files for `application` under any profile.
    pub fn files_for_application(&self, application: &str) -> &[PathBuf] {
        self.by_application
            .get(application)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Files for `profile` across all applications.
    pub fn files_for_profile(&self, profile: &str) -> &[PathBuf] {
        self.by_profile
            .get(profile)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Directory the indexed paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files == 0
    }
}

fn sort_bucket(paths: &mut Paths) {
    paths.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });
    paths.dedup();
}

fn scan(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ConfigSourceError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            if entry.file_name() == ".git" {
                continue;
            }
            scan(root, &path, out)?;
        } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
            && let Ok(relative) = path.strip_prefix(root)
        {
            out.push(relative.to_path_buf());
        }
    }
    Ok(())
}
