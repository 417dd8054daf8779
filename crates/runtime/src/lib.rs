use std::sync::Arc;

use anyhow::{Context, Result};
use huddle_config::AppConfig;
use huddle_database::{initialize_database, MessageRepository};
use huddle_relay::{CompletionProvider, OpenAiCompletionProvider, RelayService};
use huddle_users::{DirectoryService, JwtManager, UserService};
use sqlx::SqlitePool;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub directory: DirectoryService,
    pub messages: MessageRepository,
    pub relay: RelayService,
    pub jwt: JwtManager,
    pub config: Arc<AppConfig>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let provider = OpenAiCompletionProvider::from_config(&config.relay)
            .context("failed to build completion client")?;
        if !provider.has_api_key() {
            warn!("no completion API key configured; relay requests will be sent without authorization");
        }

        Self::initialise_with_provider(config, Arc::new(provider)).await
    }

    /// Same as [`BackendServices::initialise`] with a caller-supplied completion provider.
    pub async fn initialise_with_provider(
        config: &AppConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        let jwt = JwtManager::from_config(&config.auth)
            .context("auth.jwt_secret is not configured; refusing to accept bearer tokens")?;

        let db_pool = initialize_database(&config.database).await?;

        let messages = MessageRepository::new(db_pool.clone());
        let relay = RelayService::new(provider, Arc::new(messages.clone()), &config.relay);
        let directory = UserService::new(db_pool.clone());

        if config.auth.internal_secret.is_none() {
            warn!("no internal secret configured; internal user routes will reject every request");
        }

        info!(
            model = %relay.model(),
            policy = ?config.relay.on_completion_failure,
            "chat relay ready"
        );

        Ok(Self {
            db_pool,
            directory,
            messages,
            relay,
            jwt,
            config: Arc::new(config.clone()),
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
