//! Bundle acquisition
//!
//! A bundle reaches the pipeline through one of three paths, tried in
//! order:
//!
//! 1. short id: resolved through a [`BundleResolver`] (the server, or a
//!    local store)
//! 2. inline: the `d` parameter decoded with the bundle codec
//! 3. demo: built-in demonstration data
//!
//! An unknown, expired or undecodable reference is an expected condition:
//! it is logged and the next path is tried. Acquisition itself never
//! fails.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use vibes_core::{BundleStore, Config, Result, UsageBundle};
use vibes_store::MemoryBundleStore;

use crate::client::ApiClient;
use crate::demo::{DemoSample, demo_bundle};

/// Query parameter carrying a short id
pub const ID_PARAM: &str = "id";

/// Query parameter carrying an inline-encoded bundle
pub const DATA_PARAM: &str = "d";

/// Anything that can turn a short id into a bundle
#[async_trait]
pub trait BundleResolver: Send + Sync {
    /// Resolve `id`; unknown and expired ids yield `Ok(None)`
    async fn resolve(&self, id: &str) -> Result<Option<UsageBundle>>;
}

#[async_trait]
impl BundleResolver for MemoryBundleStore {
    async fn resolve(&self, id: &str) -> Result<Option<UsageBundle>> {
        self.get(id).await
    }
}

/// References extracted from a share link or given directly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleRequest {
    pub id: Option<String>,
    pub data: Option<String>,
}

impl BundleRequest {
    /// Request with a short id only
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            data: None,
        }
    }

    /// Request with an inline payload only
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            id: None,
            data: Some(data.into()),
        }
    }

    /// Parse a share link
    ///
    /// Accepts a full URL, a bare query string with or without the leading
    /// `?`, or a fragment-style link. Empty parameters count as absent.
    ///
    /// # Examples
    /// ```
    /// use vibes::acquisition::BundleRequest;
    ///
    /// let request = BundleRequest::from_share_link("https://vibes.example.com/?id=aB3-_x9Z");
    /// assert_eq!(request.id.as_deref(), Some("aB3-_x9Z"));
    ///
    /// let request = BundleRequest::from_share_link("?d=eJyrVg&id=");
    /// assert_eq!(request.id, None);
    /// assert_eq!(request.data.as_deref(), Some("eJyrVg"));
    /// ```
    pub fn from_share_link(link: &str) -> Self {
        let link = link.trim();
        let mut request = Self::default();
        let Some(url) = Url::parse(link)
            .ok()
            .or_else(|| query_url(link.trim_start_matches(['?', '#'])))
        else {
            return request;
        };

        request.absorb(&url);
        if let Some(fragment) = url.fragment()
            && let Some(inner) = query_url(fragment.trim_start_matches('?'))
        {
            request.absorb(&inner);
        }
        request
    }

    fn absorb(&mut self, url: &Url) {
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                ID_PARAM if self.id.is_none() => self.id = Some(value.into_owned()),
                DATA_PARAM if self.data.is_none() => self.data = Some(value.into_owned()),
                _ => {}
            }
        }
    }

    /// Whether neither reference is present
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.data.is_none()
    }
}

fn query_url(query: &str) -> Option<Url> {
    Url::parse(&format!("http://localhost/?{query}")).ok()
}

/// Path that produced a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum BundleOrigin {
    ShortId { id: String },
    Inline,
    Demo,
}

/// A bundle and the path that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredBundle {
    pub bundle: UsageBundle,
    pub origin: BundleOrigin,
}

impl AcquiredBundle {
    /// Short id to keep for re-sharing, if the bundle came from one
    pub fn bundle_id(&self) -> Option<&str> {
        match &self.origin {
            BundleOrigin::ShortId { id } => Some(id),
            _ => None,
        }
    }
}

/// Runs the id → inline → demo chain
#[derive(Clone, Default)]
pub struct Acquirer {
    resolver: Option<Arc<dyn BundleResolver>>,
    fallback: DemoSample,
}

impl Acquirer {
    /// Acquirer without short-id support
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquirer resolving short ids through the configured server, if any
    pub fn from_config(config: &Config) -> Result<Self> {
        let acquirer = Self::new();
        Ok(match ApiClient::from_config(config)? {
            Some(client) => acquirer.with_resolver(Arc::new(client)),
            None => acquirer,
        })
    }

    /// Resolve short ids through `resolver`
    pub fn with_resolver(mut self, resolver: Arc<dyn BundleResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Demo sample used when every other path fails
    pub fn with_fallback(mut self, sample: DemoSample) -> Self {
        self.fallback = sample;
        self
    }

    /// Acquire a bundle, degrading to demo data
    pub async fn acquire(&self, request: &BundleRequest) -> AcquiredBundle {
        if let Some(id) = &request.id {
            match self.by_id(id).await {
                Some(bundle) => {
                    info!(id = %id, "Loaded bundle by short id");
                    return AcquiredBundle {
                        bundle,
                        origin: BundleOrigin::ShortId { id: id.clone() },
                    };
                }
                None => warn!("Bundle {} not found or expired", id),
            }
        }

        if let Some(data) = &request.data {
            match vibes_codec::decode(data) {
                Ok(bundle) => {
                    info!("Decoded inline bundle");
                    return AcquiredBundle {
                        bundle,
                        origin: BundleOrigin::Inline,
                    };
                }
                Err(e) => warn!("Failed to decode inline bundle: {}", e),
            }
        }

        if request.is_empty() {
            info!("No bundle reference given, using demo data");
        } else {
            warn!("Falling back to demo data");
        }
        AcquiredBundle {
            bundle: demo_bundle(self.fallback),
            origin: BundleOrigin::Demo,
        }
    }

    async fn by_id(&self, id: &str) -> Option<UsageBundle> {
        if let Err(e) = vibes_codec::validate_short_id(id) {
            warn!("{}", e);
            return None;
        }
        let Some(resolver) = &self.resolver else {
            warn!("Cannot resolve short id {} without a server", id);
            return None;
        };
        match resolver.resolve(id).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("Failed to resolve short id {}: {}", id, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for Acquirer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquirer")
            .field("resolver", &self.resolver.is_some())
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vibes_core::VibesError;

    struct BrokenResolver;

    #[async_trait]
    impl BundleResolver for BrokenResolver {
        async fn resolve(&self, _: &str) -> Result<Option<UsageBundle>> {
            Err(VibesError::Store("connection reset".to_string()))
        }
    }

    fn bundle(sessions: u64) -> UsageBundle {
        let mut bundle = UsageBundle::default();
        bundle.stats.total_sessions = sessions;
        bundle
    }

    #[test]
    fn test_share_link_parsing() {
        let request =
            BundleRequest::from_share_link("https://vibes.example.com/wrapped?id=abcd1234&d=xyz");
        assert_eq!(request.id.as_deref(), Some("abcd1234"));
        assert_eq!(request.data.as_deref(), Some("xyz"));

        let request = BundleRequest::from_share_link("d=abc-_def");
        assert_eq!(request, BundleRequest::with_data("abc-_def"));

        let request = BundleRequest::from_share_link("https://vibes.example.com/#id=abcd1234");
        assert_eq!(request, BundleRequest::with_id("abcd1234"));

        assert!(BundleRequest::from_share_link("https://vibes.example.com/").is_empty());
    }

    #[tokio::test]
    async fn test_short_id_path_wins() {
        let store = MemoryBundleStore::new(10, Duration::days(1));
        store.put("abcd1234", bundle(7)).await.unwrap();
        let acquirer = Acquirer::new().with_resolver(Arc::new(store));

        let request = BundleRequest {
            id: Some("abcd1234".to_string()),
            data: Some(vibes_codec::encode(&bundle(99)).unwrap()),
        };
        let acquired = acquirer.acquire(&request).await;
        assert_eq!(acquired.bundle, bundle(7));
        assert_eq!(acquired.bundle_id(), Some("abcd1234"));
    }

    #[tokio::test]
    async fn test_missing_id_falls_through_to_inline() {
        let store = MemoryBundleStore::new(10, Duration::days(1));
        let acquirer = Acquirer::new().with_resolver(Arc::new(store));

        let request = BundleRequest {
            id: Some("zzzz9999".to_string()),
            data: Some(vibes_codec::encode(&bundle(99)).unwrap()),
        };
        let acquired = acquirer.acquire(&request).await;
        assert_eq!(acquired.origin, BundleOrigin::Inline);
        assert_eq!(acquired.bundle, bundle(99));
        assert_eq!(acquired.bundle_id(), None);
    }

    #[tokio::test]
    async fn test_failures_fall_back_to_demo() {
        let acquirer = Acquirer::new().with_resolver(Arc::new(BrokenResolver));

        let request = BundleRequest {
            id: Some("abcd1234".to_string()),
            data: Some("not-a-bundle".to_string()),
        };
        let acquired = acquirer.acquire(&request).await;
        assert_eq!(acquired.origin, BundleOrigin::Demo);
        assert_eq!(acquired.bundle, demo_bundle(DemoSample::Default));
    }

    #[tokio::test]
    async fn test_id_without_resolver_and_empty_request() {
        let acquirer = Acquirer::new().with_fallback(DemoSample::NightOwl);

        let acquired = acquirer.acquire(&BundleRequest::with_id("abcd1234")).await;
        assert_eq!(acquired.origin, BundleOrigin::Demo);
        assert_eq!(acquired.bundle, demo_bundle(DemoSample::NightOwl));

        let acquired = acquirer.acquire(&BundleRequest::default()).await;
        assert_eq!(acquired.origin, BundleOrigin::Demo);
    }
}
