//! Tessera configuration server binary.

use std::sync::Arc;

use anyhow::Context;
use tessera_git::{
    GitHubTreeClient, GixClient, NativeClient, RepositorySynchronizer, VersionControl,
};
use tessera_secrets::{
    EnvSecretProvider, FileSecretProvider, HttpSecretProvider, NoopProvider, SecretOverlay,
    SecretProvider,
};
use tessera_server::metrics::{init_metrics, record_poll_outcome, record_secret_refresh};
use tessera_server::settings::{GitBackendKind, SecretProviderKind, Settings};
use tessera_server::{AppState, create_router, run_server};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "tessera_server=info,tessera_git=info,tessera_secrets=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("loading settings")?;
    let addr = settings.server.socket_addr()?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting tessera server");
    info!(
        backend = ?settings.git.backend,
        uri = %settings.git.uri,
        branch = %settings.git.branch,
        storage = ?settings.git.storage,
        "repository"
    );

    let prometheus = init_metrics().context("installing metrics recorder")?;

    let vcs = version_control(&settings)?;
    let synchronizer = Arc::new(RepositorySynchronizer::new(vcs));
    synchronizer.set_observer(record_poll_outcome);

    let overlay = Arc::new(SecretOverlay::new(
        secret_provider(&settings)?,
        settings.secrets.query(),
    ));
    overlay.set_observer(record_secret_refresh);
    info!(provider = overlay.provider_name(), "secret provider");

    // Serve immediately; resolution answers 503 until the first sync lands.
    let starter = Arc::clone(&synchronizer);
    let poll_interval = settings.git.poll_interval();
    tokio::spawn(async move {
        if let Err(e) = starter.start().await {
            error!(error = %e, "initial synchronization failed; polling will retry");
        }
        if let Some(interval) = poll_interval {
            starter.start_polling(interval);
        }
    });

    let refresher = Arc::clone(&overlay);
    let refresh_interval = settings.secrets.refresh_interval();
    tokio::spawn(async move {
        refresher.refresh().await;
        if let Some(interval) = refresh_interval {
            refresher.start_schedule(interval);
        }
    });

    let router = create_router(
        AppState::new(Arc::clone(&synchronizer), Arc::clone(&overlay)),
        prometheus,
    );
    run_server(addr, router).await.context("serving HTTP")?;

    synchronizer.stop_polling();
    overlay.stop_schedule();
    info!("stopped");
    Ok(())
}

fn version_control(settings: &Settings) -> anyhow::Result<Arc<dyn VersionControl>> {
    let config = settings.git.repository_config()?;

    let vcs: Arc<dyn VersionControl> = match settings.git.backend {
        GitBackendKind::Git => Arc::new(GixClient::new(&config)?),
        GitBackendKind::Github => {
            Arc::new(GitHubTreeClient::new(&config, &settings.git.github.api_url)?)
        },
        GitBackendKind::Native => Arc::new(NativeClient::from_config(&config)),
    };
    Ok(vcs)
}

fn secret_provider(settings: &Settings) -> anyhow::Result<Arc<dyn SecretProvider>> {
    let secrets = &settings.secrets;

    let provider: Arc<dyn SecretProvider> = match secrets.provider {
        SecretProviderKind::None => Arc::new(NoopProvider),
        SecretProviderKind::Http => Arc::new(HttpSecretProvider::new(
            &secrets.http.url,
            secrets.http.token.clone(),
        )?),
        SecretProviderKind::Env => Arc::new(EnvSecretProvider::new(&secrets.env.prefix)),
        SecretProviderKind::File => Arc::new(FileSecretProvider::new(&secrets.file.path)),
    };
    Ok(provider)
}
