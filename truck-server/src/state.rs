//! Application state

use std::sync::Arc;

use crate::call::CallPolicy;
use crate::catalog::{CatalogStore, MemoryCatalog, PgCatalog, TimedCatalog};
use crate::config::{Config, StoreBackend};
use crate::maps::{GoogleMapsLoader, MapService};
use crate::notifier::{FunctionNotifier, NoopNotifier, OrderNotifier, ResendRelay};
use crate::orders::OrderService;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Every call bounded by the configured timeout
    pub store: Arc<dyn CatalogStore>,
    pub orders: Arc<OrderService>,
    pub maps: Arc<MapService>,
    /// Backs `/functions/send-order-email`; `None` without a Resend key
    pub relay: Option<Arc<ResendRelay>>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let store: Arc<dyn CatalogStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or("DATABASE_URL is not set")?;
                let pg = PgCatalog::connect(url).await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(pg)
            }
            StoreBackend::Memory => {
                if !config.is_development() {
                    tracing::warn!(environment = %config.environment, "In-memory store outside development");
                }
                tracing::warn!("Using in-memory store; data is lost on restart");
                Arc::new(MemoryCatalog::new())
            }
        };

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let relay = config.resend_api_key.as_ref().map(|key| {
            Arc::new(ResendRelay::new(
                client.clone(),
                config.resend_api_url.clone(),
                key.clone(),
                config.order_email_from.clone(),
                config.support_email.clone(),
            ))
        });

        let notifier: Arc<dyn OrderNotifier> = match (&config.order_email_function_url, &relay) {
            (Some(url), _) => {
                tracing::info!(url = %url, "Confirmation emails via hosted function");
                Arc::new(FunctionNotifier::new(
                    client.clone(),
                    url.clone(),
                    config.function_api_key.clone(),
                ))
            }
            (None, Some(relay)) => {
                tracing::info!("Confirmation emails via Resend");
                relay.clone()
            }
            (None, None) => {
                tracing::warn!("No email route configured; confirmations will not be sent");
                Arc::new(NoopNotifier)
            }
        };

        let policy = CallPolicy::new(config.request_timeout);
        let maps = match &config.google_maps_api_key {
            Some(key) => MapService::new(
                Arc::new(
                    GoogleMapsLoader::new(client.clone(), key.clone())
                        .with_embed_key(config.google_maps_embed_key.clone()),
                ),
                policy,
            ),
            None => MapService::unconfigured(),
        };

        Ok(Self::from_parts(config, store, notifier, maps, relay))
    }

    /// Assemble state from ready-made collaborators
    pub fn from_parts(
        config: Config,
        store: Arc<dyn CatalogStore>,
        notifier: Arc<dyn OrderNotifier>,
        maps: MapService,
        relay: Option<Arc<ResendRelay>>,
    ) -> Self {
        let policy = CallPolicy::new(config.request_timeout);
        let store: Arc<dyn CatalogStore> = Arc::new(TimedCatalog::new(store, policy));
        let orders = Arc::new(OrderService::new(store.clone(), notifier, policy));
        Self {
            config: Arc::new(config),
            store,
            orders,
            maps: Arc::new(maps),
            relay,
        }
    }
}
