//! Entity and code resolution used by unbuild mappers
//!
//! Stored filters only keep identifiers. Rebuilding editable state needs the
//! labels back (care sites, services) and, for hierarchical code systems,
//! whether a code is a leaf. These lookups are the only asynchronous part of a
//! field unbuild.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// A resolved entity or code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub id: String,
    pub label: String,
    /// Leaf status in the code hierarchy, when applicable
    pub is_leaf: Option<bool>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_leaf: None,
        }
    }

    pub fn with_leaf(mut self, is_leaf: bool) -> Self {
        self.is_leaf = Some(is_leaf);
        self
    }
}

/// Errors raised by resolvers
#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Resolver service error: {0}")]
    Service(String),
}

/// Looks up entities and codes referenced by stored filters
#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Resolve entities (care sites, services) by id; unknown ids are omitted
    async fn resolve_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>, ResolverError>;

    /// Resolve one code of a code system
    async fn resolve_code(
        &self,
        system: Option<&str>,
        code: &str,
    ) -> Result<Option<EntityRecord>, ResolverError>;
}

/// Resolver that knows nothing; labels fall back to ids
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEntityResolver;

impl NoOpEntityResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EntityResolver for NoOpEntityResolver {
    async fn resolve_entities(&self, _ids: &[String]) -> Result<Vec<EntityRecord>, ResolverError> {
        Ok(vec![])
    }

    async fn resolve_code(
        &self,
        _system: Option<&str>,
        _code: &str,
    ) -> Result<Option<EntityRecord>, ResolverError> {
        Ok(None)
    }
}

type CodeKey = (Option<String>, String);

/// Memoizing wrapper around another resolver
pub struct CachedEntityResolver<R> {
    inner: R,
    entities: Mutex<HashMap<String, EntityRecord>>,
    codes: Mutex<HashMap<CodeKey, Option<EntityRecord>>>,
}

impl<R: EntityResolver> CachedEntityResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            entities: Mutex::new(HashMap::new()),
            codes: Mutex::new(HashMap::new()),
        }
    }

    /// Get the wrapped resolver
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: EntityResolver> EntityResolver for CachedEntityResolver<R> {
    async fn resolve_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>, ResolverError> {
        let missing: Vec<String> = {
            let cache = self.entities.lock();
            ids.iter().filter(|id| !cache.contains_key(*id)).cloned().collect()
        };
        if !missing.is_empty() {
            let fetched = self.inner.resolve_entities(&missing).await?;
            self.entities
                .lock()
                .extend(fetched.into_iter().map(|record| (record.id.clone(), record)));
        }
        let cache = self.entities.lock();
        Ok(ids.iter().filter_map(|id| cache.get(id).cloned()).collect())
    }

    async fn resolve_code(
        &self,
        system: Option<&str>,
        code: &str,
    ) -> Result<Option<EntityRecord>, ResolverError> {
        let key = (system.map(str::to_string), code.to_string());
        if let Some(hit) = self.codes.lock().get(&key) {
            return Ok(hit.clone());
        }
        let record = self.inner.resolve_code(system, code).await?;
        self.codes.lock().insert(key, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EntityResolver for CountingResolver {
        async fn resolve_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>, ResolverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ids.iter().map(|id| EntityRecord::new(id, format!("Unit {}", id))).collect())
        }

        async fn resolve_code(
            &self,
            _system: Option<&str>,
            code: &str,
        ) -> Result<Option<EntityRecord>, ResolverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(EntityRecord::new(code, code).with_leaf(true)))
        }
    }

    #[tokio::test]
    async fn test_cache_avoids_repeated_lookups() {
        let resolver = CachedEntityResolver::new(CountingResolver::default());
        let ids = vec!["1".to_string(), "2".to_string()];
        let first = resolver.resolve_entities(&ids).await.unwrap();
        let second = resolver.resolve_entities(&ids[..1]).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second[0].label, "Unit 1");

        resolver.resolve_code(Some("cim10"), "I10").await.unwrap();
        resolver.resolve_code(Some("cim10"), "I10").await.unwrap();
        assert_eq!(resolver.inner().calls.load(Ordering::SeqCst), 2);
    }
}
