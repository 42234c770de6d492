//! Resolver configuration and construction of the resolver stack.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::resolver::providers::DEFAULT_USER_AGENT;
use crate::resolver::{
    BuiltinResolver, CachingResolver, GeocodingResolver, GoogleGeocoder, NominatimGeocoder,
    PlaceCache, Resolver,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which geocoding backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProviderKind {
    /// Google Geocoding API (needs an API key).
    Google,
    /// OpenStreetMap Nominatim.
    #[default]
    Nominatim,
    /// Built-in city table, no network.
    Builtin,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Nominatim => write!(f, "nominatim"),
            Self::Builtin => write!(f, "builtin"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the google provider needs an API key (--api-key or GOOGLE_MAPS_API_KEY)")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
    /// Override the provider's endpoint URL.
    pub endpoint: Option<String>,
    /// `None` disables the on-disk cache.
    pub cache_path: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoint: None,
            cache_path: Some(PlaceCache::default_path()),
        }
    }
}

impl ResolverConfig {
    /// Build the resolver described by this config.
    ///
    /// Network providers are wrapped in a [`CachingResolver`] when a cache
    /// path is set. The built-in table is never cached.
    pub fn build(&self) -> Result<Arc<dyn Resolver>, ConfigError> {
        let resolver: Arc<dyn Resolver> = match self.provider {
            ProviderKind::Builtin => return Ok(Arc::new(BuiltinResolver)),
            ProviderKind::Google => {
                let key = self
                    .api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ConfigError::MissingApiKey)?;
                let mut g = GoogleGeocoder::new(key, self.timeout);
                if let Some(ref endpoint) = self.endpoint {
                    g = g.with_endpoint(endpoint.clone());
                }
                self.wrap(GeocodingResolver::new(g))
            }
            ProviderKind::Nominatim => {
                let mut n = NominatimGeocoder::new(&self.user_agent, self.timeout);
                if let Some(ref endpoint) = self.endpoint {
                    n = n.with_endpoint(endpoint.clone());
                }
                self.wrap(GeocodingResolver::new(n))
            }
        };
        tracing::debug!(provider = %self.provider, timeout_ms = self.timeout.as_millis() as u64, "resolver ready");
        Ok(resolver)
    }

    fn wrap<R: Resolver + 'static>(&self, inner: R) -> Arc<dyn Resolver> {
        match &self.cache_path {
            Some(path) => Arc::new(
                CachingResolver::new(inner, PlaceCache::load_from(path.clone()))
                    .with_provider(self.provider.to_string()),
            ),
            None => Arc::new(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;

    #[test]
    fn test_google_requires_key() {
        let cfg = ResolverConfig { provider: ProviderKind::Google, cache_path: None, ..Default::default() };
        assert!(matches!(cfg.build(), Err(ConfigError::MissingApiKey)));

        let blank = ResolverConfig { api_key: Some("  ".into()), ..cfg.clone() };
        assert!(matches!(blank.build(), Err(ConfigError::MissingApiKey)));

        let ok = ResolverConfig { api_key: Some("abc".into()), ..cfg };
        assert!(ok.build().is_ok());
    }

    #[test]
    fn test_builtin_resolves_offline() {
        let cfg = ResolverConfig { provider: ProviderKind::Builtin, ..Default::default() };
        let r = cfg.build().unwrap();
        assert!(r.resolve("Paris", &NoopObserver).is_ok());
    }

    #[test]
    fn test_defaults() {
        let cfg = ResolverConfig::default();
        assert_eq!(cfg.provider, ProviderKind::Nominatim);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
        assert!(cfg.user_agent.starts_with("closest-places/"));
    }
}
