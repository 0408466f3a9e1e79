use std::sync::Arc;

use anyhow::{Context, Result};
use medcab_auth::{FileTokenStore, TokenStore};
use medcab_client::ProtectedClient;
use medcab_config::AppConfig;
use medcab_session::SessionManager;
use tracing::{debug, info};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global subscriber. `RUST_LOG` overrides the `info` default.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything a front end needs, wired from one configuration.
#[derive(Clone)]
pub struct ClientServices {
    pub store: Arc<dyn TokenStore>,
    pub client: ProtectedClient,
    pub session: Arc<SessionManager>,
}

impl ClientServices {
    /// Open the token store, build the client and attach the session manager
    /// as the handler of authorization failures.
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let file_store =
            FileTokenStore::from_config(&config.storage).context("failed to open token store")?;
        debug!(path = %file_store.path().display(), "token store ready");
        let store: Arc<dyn TokenStore> = Arc::new(file_store);

        let client = ProtectedClient::new(&config.api, store.clone())
            .context("failed to build backend client")?;
        let session = Arc::new(SessionManager::new(client.clone(), config.auth.clone()));

        if !session.attach() {
            anyhow::bail!("unauthorized handler already installed");
        }

        info!(base_url = %config.api.base_url, "client services ready");

        Ok(Self {
            store,
            client,
            session,
        })
    }

    /// `initialise` followed by restoring the persisted session.
    pub async fn start(config: &AppConfig) -> Result<Self> {
        let services = Self::initialise(config).await?;
        services
            .session
            .initialize()
            .await
            .context("failed to restore persisted session")?;
        Ok(services)
    }
}
