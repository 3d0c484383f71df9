/*!
 * Provider fallback chain.
 *
 * Each active provider has a fixed, ordered list of backends to try. One
 * attempt of the batch translator walks the whole list and only counts as a
 * failure when every backend in it failed.
 */

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use crate::app_config::{Config, TranslationProvider};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{CloudApi, MobileWeb, OfflineEngine, Provider, WebGtx, ensure_count};
use super::request::{Interrupt, RequestContext};

const WEB_GTX_WITH_CLOUD: [TranslationProvider; 2] = [TranslationProvider::WebGtx, TranslationProvider::CloudApi];
const WEB_GTX_WITH_MOBILE: [TranslationProvider; 2] = [TranslationProvider::WebGtx, TranslationProvider::MobileWeb];
const CLOUD_API_CHAIN: [TranslationProvider; 3] = [
    TranslationProvider::CloudApi,
    TranslationProvider::WebGtx,
    TranslationProvider::MobileWeb,
];
const MOBILE_WEB_CHAIN: [TranslationProvider; 2] = [TranslationProvider::MobileWeb, TranslationProvider::WebGtx];
const OFFLINE_CHAIN: [TranslationProvider; 3] = [
    TranslationProvider::Offline,
    TranslationProvider::WebGtx,
    TranslationProvider::MobileWeb,
];

/// Ordered backends to try for `provider`, the provider itself first
pub fn fallback_chain(provider: TranslationProvider, cloud_available: bool) -> &'static [TranslationProvider] {
    match provider {
        TranslationProvider::WebGtx if cloud_available => &WEB_GTX_WITH_CLOUD,
        TranslationProvider::WebGtx => &WEB_GTX_WITH_MOBILE,
        TranslationProvider::CloudApi => &CLOUD_API_CHAIN,
        TranslationProvider::MobileWeb => &MOBILE_WEB_CHAIN,
        TranslationProvider::Offline => &OFFLINE_CHAIN,
    }
}

/// How a walk over the chain ended without a translation
#[derive(Debug)]
pub enum ChainFailure {
    /// Every backend failed; carries the last error
    Exhausted(ProviderError),
    /// The request was cancelled or ran out of time mid-walk
    Interrupted(Interrupt),
}

/// Backend instances keyed by identity
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    backends: HashMap<TranslationProvider, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every backend from the configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let target = language_utils::normalize_to_part1(&config.target_language)?;
        let translation = &config.translation;
        let mut registry = Self::new();

        let gtx = translation.resolved_provider_config(TranslationProvider::WebGtx);
        registry.register(WebGtx::new(gtx.endpoint.clone(), target.clone(), gtx.timeout()));

        let cloud = translation.resolved_provider_config(TranslationProvider::CloudApi);
        registry.register(CloudApi::new(cloud.endpoint.clone(), translation.get_api_key(), target.clone(), cloud.timeout()));

        let mobile = translation.resolved_provider_config(TranslationProvider::MobileWeb);
        registry.register(MobileWeb::new(mobile.endpoint.clone(), target.clone(), mobile.timeout()));

        let offline = translation.resolved_provider_config(TranslationProvider::Offline);
        registry.register(OfflineEngine::new(
            translation.get_binary_path(),
            offline.args.clone(),
            target,
            offline.timeout(),
        ));

        Ok(registry)
    }

    /// Add or replace the backend for its `kind()`
    pub fn register<P: Provider + 'static>(&mut self, backend: P) -> &mut Self {
        self.backends.insert(backend.kind(), Arc::new(backend));
        self
    }

    pub fn get(&self, kind: TranslationProvider) -> Option<Arc<dyn Provider>> {
        self.backends.get(&kind).cloned()
    }

    /// Whether the Cloud API backend is registered and has a key
    pub fn cloud_available(&self) -> bool {
        self.backends.get(&TranslationProvider::CloudApi)
            .map(|backend| backend.is_available())
            .unwrap_or(false)
    }

    /// Resolve the chain for `active`; unregistered backends are left out
    pub fn chain_for(&self, active: TranslationProvider) -> ProviderChain {
        let providers = fallback_chain(active, self.cloud_available())
            .iter()
            .filter_map(|kind| self.get(*kind))
            .collect();
        ProviderChain { providers }
    }
}

/// Concrete backends of one fallback chain, in order
#[derive(Debug, Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Identities in chain order
    pub fn kinds(&self) -> Vec<TranslationProvider> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Try each backend in turn until one returns exactly one string per input
    pub async fn translate(&self, texts: &[String], ctx: &RequestContext) -> Result<Vec<String>, ChainFailure> {
        let mut last_error = ProviderError::Unavailable("No translation backend registered".to_string());

        for (position, provider) in self.providers.iter().enumerate() {
            let outcome = ctx.run(provider.translate(texts))
                .await
                .map_err(ChainFailure::Interrupted)?;

            match outcome.and_then(|translated| ensure_count(texts.len(), translated)) {
                Ok(translated) => {
                    if position > 0 {
                        debug!("Fallback backend {} succeeded", provider.kind());
                    }
                    return Ok(translated);
                }
                Err(e) if e.is_unavailable() => {
                    debug!("Backend {} unavailable: {}", provider.kind(), e);
                    last_error = e;
                }
                Err(e) => {
                    if position + 1 < self.providers.len() {
                        warn!("Backend {} failed: {}. Falling back to the next backend", provider.kind(), e);
                    } else {
                        warn!("Backend {} failed: {}", provider.kind(), e);
                    }
                    last_error = e;
                }
            }
        }

        Err(ChainFailure::Exhausted(last_error))
    }
}
