//! File-backed resolution cache at ~/.closest-places/cache.json.
//!
//! TTL: 30 days. Case-insensitive keys. Only successful resolutions are
//! stored; failures always reach the inner resolver again. Entries are
//! tagged with the provider that produced them and only answer lookups
//! for that provider. Entries holding out-of-range coordinates are
//! treated as misses.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::{ResolutionError, Resolver};
use crate::geo::Coordinate;
use crate::observer::Observer;

const CACHE_TTL_MS: i64 = 30 * 24 * 3600 * 1000;

#[derive(Serialize, Deserialize, Clone, Debug)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    timestamp: i64,
    #[serde(default)]
    provider: Option<String>,
}

/// The on-disk cache map.
pub struct PlaceCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl PlaceCache {
    /// Load from the default location. A missing or unreadable file is an
    /// empty cache.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".closest-places")
            .join("cache.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable cache file");
                None
            }
        }
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Cached coordinate for `name` as produced by `provider`, unless
    /// missing, expired, or invalid.
    pub fn get(&self, name: &str, provider: Option<&str>) -> Option<Coordinate> {
        let entry = self.entries.get(&Self::key(name))?;
        if entry.provider.as_deref() != provider {
            return None;
        }
        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > CACHE_TTL_MS {
            return None;
        }
        let coordinate = Coordinate::checked(entry.lon, entry.lat);
        if coordinate.is_none() {
            tracing::warn!(place = name, lat = entry.lat, lon = entry.lon, "ignoring invalid cache entry");
        }
        coordinate
    }

    pub fn put(&mut self, name: &str, coordinate: &Coordinate, provider: Option<&str>) {
        let entry = CacheEntry {
            lat: coordinate.lat,
            lon: coordinate.lon,
            timestamp: chrono::Utc::now().timestamp_millis(),
            provider: provider.map(str::to_string),
        };
        self.entries.insert(Self::key(name), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "cannot create cache directory");
                return;
            }
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "cannot write cache");
                }
            }
            Err(e) => tracing::warn!(error = %e, "cannot serialize cache"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decorator that answers from [`PlaceCache`] before asking `inner`.
pub struct CachingResolver<R> {
    inner: R,
    cache: Mutex<PlaceCache>,
    provider: Option<String>,
}

impl<R: Resolver> CachingResolver<R> {
    pub fn new(inner: R, cache: PlaceCache) -> Self {
        Self { inner, cache: Mutex::new(cache), provider: None }
    }

    /// Record which provider filled the entries.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

impl<R: Resolver> Resolver for CachingResolver<R> {
    fn resolve(&self, name: &str, observer: &dyn Observer) -> Result<Coordinate, ResolutionError> {
        let hit = match self.cache.lock() {
            Ok(cache) => cache.get(name, self.provider.as_deref()),
            Err(_) => None,
        };
        // On a miss the inner resolver announces the lookup itself.
        if let Some(c) = hit {
            tracing::debug!(place = name, "cache hit");
            observer.resolving(name);
            observer.resolved(name, &c);
            return Ok(c);
        }

        let c = self.inner.resolve(name, observer)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(name, &c, self.provider.as_deref());
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn test_cache() -> (PlaceCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        (PlaceCache::load_from(path), dir)
    }

    struct Counting {
        calls: AtomicUsize,
    }

    impl Resolver for Counting {
        fn resolve(&self, name: &str, _observer: &dyn Observer) -> Result<Coordinate, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if name == "Atlantis" {
                Err(ResolutionError::NoResult(name.into()))
            } else {
                Ok(Coordinate::new(18.0686, 59.3293))
            }
        }
    }

    #[test]
    fn test_cache_put_get_case_insensitive() {
        let (mut cache, _dir) = test_cache();
        cache.put("Stockholm", &Coordinate::new(18.0686, 59.3293), Some("nominatim"));
        let c = cache.get("STOCKHOLM ", Some("nominatim")).unwrap();
        assert_eq!(c, Coordinate::new(18.0686, 59.3293));
        assert!(cache.get("oslo", Some("nominatim")).is_none());
    }

    #[test]
    fn test_cache_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        {
            let mut cache = PlaceCache::load_from(path.clone());
            cache.put("Tokyo", &Coordinate::new(139.6503, 35.6762), None);
        }
        let cache = PlaceCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("tokyo", None).unwrap().lat, 35.6762);
    }

    #[test]
    fn test_expired_entry_misses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, r#"{"paris": {"lat": 48.8566, "lon": 2.3522, "timestamp": 0}}"#).unwrap();
        let cache = PlaceCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("paris", None).is_none());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();
        assert!(PlaceCache::load_from(path).is_empty());
    }

    #[test]
    fn test_caching_resolver_skips_inner_on_hit() {
        let (cache, _dir) = test_cache();
        let r = CachingResolver::new(Counting { calls: AtomicUsize::new(0) }, cache);
        r.resolve("Stockholm", &NoopObserver).unwrap();
        r.resolve("stockholm", &NoopObserver).unwrap();
        assert_eq!(r.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_not_cached() {
        let (cache, _dir) = test_cache();
        let r = CachingResolver::new(Counting { calls: AtomicUsize::new(0) }, cache);
        assert!(r.resolve("Atlantis", &NoopObserver).is_err());
        assert!(r.resolve("Atlantis", &NoopObserver).is_err());
        assert_eq!(r.inner.calls.load(Ordering::SeqCst), 2);
        assert!(r.cache.lock().unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_entry_misses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let now = chrono::Utc::now().timestamp_millis();
        let json = format!(
            r#"{{"paris": {{"lat": 999.0, "lon": 2.3522, "timestamp": {now}}}, "atlantis": {{"lat": 10.0, "lon": -500.0, "timestamp": {now}}}}}"#
        );
        fs::write(&path, json).unwrap();

        let cache = PlaceCache::load_from(path);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("paris", None).is_none());
        assert!(cache.get("atlantis", None).is_none());

        // The resolver falls through to the inner lookup instead.
        let r = CachingResolver::new(Counting { calls: AtomicUsize::new(0) }, cache);
        assert_eq!(r.resolve("Paris", &NoopObserver).unwrap(), Coordinate::new(18.0686, 59.3293));
        assert!(r.resolve("Atlantis", &NoopObserver).is_err());
        assert_eq!(r.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_entries_are_scoped_to_provider() {
        let (mut cache, _dir) = test_cache();
        cache.put("Springfield", &Coordinate::new(-89.65, 39.78), Some("google"));
        assert!(cache.get("Springfield", Some("google")).is_some());
        assert!(cache.get("Springfield", Some("nominatim")).is_none());
        assert!(cache.get("Springfield", None).is_none());

        let r = CachingResolver::new(Counting { calls: AtomicUsize::new(0) }, cache).with_provider("nominatim");
        let c = r.resolve("Springfield", &NoopObserver).unwrap();
        assert_eq!(c, Coordinate::new(18.0686, 59.3293));
        assert_eq!(r.inner.calls.load(Ordering::SeqCst), 1);
        // The fresh result replaces the other provider's entry.
        assert!(r.cache.lock().unwrap().get("springfield", Some("nominatim")).is_some());
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl Observer for Events {
        fn resolving(&self, name: &str) {
            self.0.lock().unwrap().push(format!("resolving {}", name));
        }

        fn resolved(&self, name: &str, _coordinate: &Coordinate) {
            self.0.lock().unwrap().push(format!("resolved {}", name));
        }
    }

    #[test]
    fn test_cache_hit_announces_lookup() {
        let (mut cache, _dir) = test_cache();
        cache.put("Oslo", &Coordinate::new(10.7522, 59.9139), None);
        let r = CachingResolver::new(Counting { calls: AtomicUsize::new(0) }, cache);

        let events = Events::default();
        r.resolve("Oslo", &events).unwrap();
        assert_eq!(*events.0.lock().unwrap(), vec!["resolving Oslo", "resolved Oslo"]);
        assert_eq!(r.inner.calls.load(Ordering::SeqCst), 0);
    }
}
