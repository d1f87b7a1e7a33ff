//! Map and geocoding service
//!
//! The provider is loaded once per process. Every caller that needs the map
//! awaits the same load; a failed load is remembered and pages fall back to
//! a text description of the stop instead of an embedded map.
//!
//! Embed URLs go to browsers, so they carry the separate referrer-restricted
//! embed key and never the server key used for geocoding.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{LatLng, Location};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::call::{CallError, CallPolicy};

pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const EMBED_URL: &str = "https://www.google.com/maps/embed/v1/place";
const LOAD_CHECK_ADDRESS: &str = "Toronto, ON";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("map provider is not configured")]
    NotConfigured,

    #[error("map provider failed to load: {0}")]
    Load(String),

    #[error("no geocoding result for {0}")]
    NoResult(String),

    #[error(transparent)]
    Call(#[from] CallError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapView {
    Embed { url: String, center: LatLng },
    Unavailable { text: String },
}

#[async_trait]
pub trait MapLoader: Send + Sync {
    /// Check the provider can serve maps
    async fn load(&self) -> Result<(), MapError>;
    async fn geocode(&self, address: &str) -> Result<LatLng, MapError>;
    /// Browser-facing URL; `None` when no embed key is configured
    fn embed_url(&self, center: LatLng) -> Option<String>;
}

/// Loader for when no API key is set
pub struct UnconfiguredLoader;

#[async_trait]
impl MapLoader for UnconfiguredLoader {
    async fn load(&self) -> Result<(), MapError> {
        Err(MapError::NotConfigured)
    }

    async fn geocode(&self, _address: &str) -> Result<LatLng, MapError> {
        Err(MapError::NotConfigured)
    }

    fn embed_url(&self, _center: LatLng) -> Option<String> {
        None
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeReply {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

pub struct GoogleMapsLoader {
    client: reqwest::Client,
    api_key: String,
    embed_key: Option<String>,
    geocode_url: String,
}

impl GoogleMapsLoader {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_geocode_url(client, api_key, GEOCODE_URL)
    }

    pub fn with_geocode_url(
        client: reqwest::Client,
        api_key: impl Into<String>,
        geocode_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            embed_key: None,
            geocode_url: geocode_url.into(),
        }
    }

    pub fn with_embed_key(mut self, embed_key: Option<String>) -> Self {
        self.embed_key = embed_key;
        self
    }

    async fn request(&self, address: &str) -> Result<GeocodeReply, MapError> {
        let reply = self
            .client
            .get(&self.geocode_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(CallError::from)?
            .error_for_status()
            .map_err(CallError::from)?
            .json::<GeocodeReply>()
            .await
            .map_err(CallError::from)?;
        Ok(reply)
    }
}

#[async_trait]
impl MapLoader for GoogleMapsLoader {
    async fn load(&self) -> Result<(), MapError> {
        let reply = self.request(LOAD_CHECK_ADDRESS).await?;
        match reply.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(()),
            other => Err(MapError::Load(
                reply.error_message.unwrap_or_else(|| other.to_string()),
            )),
        }
    }

    async fn geocode(&self, address: &str) -> Result<LatLng, MapError> {
        let reply = self.request(address).await?;
        match reply.status.as_str() {
            "OK" => reply
                .results
                .into_iter()
                .next()
                .map(|r| r.geometry.location)
                .ok_or_else(|| MapError::NoResult(address.to_string())),
            "ZERO_RESULTS" => Err(MapError::NoResult(address.to_string())),
            other => Err(MapError::Load(
                reply.error_message.unwrap_or_else(|| other.to_string()),
            )),
        }
    }

    fn embed_url(&self, center: LatLng) -> Option<String> {
        let key = self.embed_key.as_deref()?;
        Some(format!(
            "{EMBED_URL}?key={key}&q={},{}&zoom=15",
            center.lat, center.lng
        ))
    }
}

pub struct MapService {
    loader: Arc<dyn MapLoader>,
    policy: CallPolicy,
    loaded: OnceCell<Result<(), MapError>>,
    load_attempts: AtomicUsize,
}

impl MapService {
    pub fn new(loader: Arc<dyn MapLoader>, policy: CallPolicy) -> Self {
        Self {
            loader,
            policy,
            loaded: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self::new(Arc::new(UnconfiguredLoader), CallPolicy::default())
    }

    /// Load the provider, at most once per process
    pub async fn load(&self) -> Result<(), MapError> {
        self.loaded
            .get_or_init(|| async {
                self.load_attempts.fetch_add(1, Ordering::SeqCst);
                let result = match self.policy.run("map load", self.loader.load()).await {
                    Ok(r) => r,
                    Err(e) => Err(e.into()),
                };
                match &result {
                    Ok(()) => tracing::info!("Map provider loaded"),
                    Err(e) => tracing::warn!(error = %e, "Map provider unavailable"),
                }
                result
            })
            .await
            .clone()
    }

    /// `None` until the first load finishes
    pub fn is_loaded(&self) -> Option<bool> {
        self.loaded.get().map(Result::is_ok)
    }

    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    pub async fn geocode(&self, address: &str) -> Result<LatLng, MapError> {
        self.load().await?;
        self.policy
            .run("geocode", self.loader.geocode(address))
            .await?
    }

    /// Embedded map centered on the stop, or a text fallback
    pub async fn render(&self, location: &Location) -> MapView {
        let center = location.coordinates();
        let url = match self.load().await {
            Ok(()) => self.loader.embed_url(center),
            Err(_) => None,
        };
        match url {
            Some(url) => MapView::Embed { url, center },
            None => MapView::Unavailable {
                text: format!("{}, {}", location.name, location.address),
            },
        }
    }
}
