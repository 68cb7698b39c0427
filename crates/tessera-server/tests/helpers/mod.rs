//! Test helpers for tessera-server.

#![allow(dead_code, unused_imports)]

pub mod assertions;
pub mod client;

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tessera_git::{NativeClient, RepositorySynchronizer};
use tessera_secrets::{SecretOverlay, SecretProvider, SecretQuery, StaticProvider};
use tessera_server::metrics::detached_handle;
use tessera_server::{AppState, create_router};

pub use assertions::*;
pub use client::{TestClient, TestResponse};

/// Repository served by [`client`].
pub const REPO_FILES: &[(&str, &str)] = &[
    ("application.yml", "a: 1\nserver:\n  port: 8080\n"),
    ("application-dev.yml", "b: 2\n"),
    ("service-x.yml", "a: 10\nc: 3\n"),
    ("service-x-dev.yml", "c: 30\ndb:\n  password: changeme\n  user: svc\n"),
    ("broken.json", "{\"unterminated\": "),
];

/// Secrets served by [`client`].
pub const SECRETS: &[(&str, &str)] = &[("db.password", "s3cret")];

/// A router over a synchronized directory, plus what it depends on.
pub struct TestServer {
    pub client: TestClient,
    pub synchronizer: Arc<RepositorySynchronizer>,
    pub overlay: Arc<SecretOverlay>,
    pub dir: TempDir,
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

/// Builds a server without synchronizing or loading secrets.
pub fn unstarted_with_provider(
    files: &[(&str, &str)],
    provider: Arc<dyn SecretProvider>,
) -> TestServer {
    let dir = TempDir::new().unwrap();
    write_files(dir.path(), files);

    let synchronizer = Arc::new(RepositorySynchronizer::new(Arc::new(NativeClient::new(
        dir.path(),
    ))));
    let overlay = Arc::new(SecretOverlay::new(provider, SecretQuery::new("tessera", "test")));
    let router = create_router(
        AppState::new(Arc::clone(&synchronizer), Arc::clone(&overlay)),
        detached_handle(),
    );

    TestServer {
        client: TestClient::new(router),
        synchronizer,
        overlay,
        dir,
    }
}

pub fn unstarted(files: &[(&str, &str)]) -> TestServer {
    unstarted_with_provider(files, Arc::new(StaticProvider::from_pairs(SECRETS.iter().copied())))
}

/// Builds a server, synchronizes the directory and loads the secrets.
pub async fn started(files: &[(&str, &str)]) -> TestServer {
    let server = unstarted(files);
    server.synchronizer.start().await.unwrap();
    server.overlay.refresh().await;
    server
}

/// A ready server over [`REPO_FILES`].
pub async fn client() -> TestServer {
    started(REPO_FILES).await
}

impl std::ops::Deref for TestServer {
    type Target = TestClient;

    fn deref(&self) -> &TestClient {
        &self.client
    }
}
