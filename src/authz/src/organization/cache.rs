//! TTL cache in front of an organization resolver
//!
//! Ancestor closures change rarely, so they are cached per department.
//! Direct memberships are passed through untouched.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use iamscope_core::{DepartmentId, Username};
use tracing::debug;

use super::OrganizationResolver;
use crate::error::Result;

/// How long an ancestor closure is trusted when no TTL is given
const DEFAULT_CLOSURE_TTL: Duration = Duration::from_secs(60);

/// Ancestor closure of one department and the instant it goes stale
#[derive(Debug, Clone)]
struct CachedClosure {
    departments: HashSet<DepartmentId>,
    expires_at: Instant,
}

impl CachedClosure {
    fn fresh(&self, now: Instant) -> Option<&HashSet<DepartmentId>> {
        (now < self.expires_at).then_some(&self.departments)
    }
}

/// Counters of the closure cache
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Departments answered from the cache
    pub hits: usize,
    /// Departments never seen before
    pub misses: usize,
    /// Departments whose cached closure had gone stale
    pub expirations: usize,
    /// Closures currently held, stale ones included
    pub entries: usize,
}

impl CacheStats {
    /// Share of lookups answered without the inner resolver
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses + self.expirations;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicUsize,
    misses: AtomicUsize,
    expirations: AtomicUsize,
}

impl Counters {
    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
    }
}

/// Caches ancestor closures of an inner resolver
///
/// Misses of one request are fetched from the inner resolver in a single
/// batched call. Departments the inner resolver does not know are not cached.
pub struct CachedOrganizationResolver<R> {
    inner: R,
    closures: DashMap<DepartmentId, CachedClosure>,
    ttl: Duration,
    counters: Counters,
}

impl<R: OrganizationResolver> CachedOrganizationResolver<R> {
    pub fn new(inner: R) -> Self {
        Self::with_ttl(inner, DEFAULT_CLOSURE_TTL)
    }

    pub fn with_ttl(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            closures: DashMap::new(),
            ttl,
            counters: Counters::default(),
        }
    }

    /// The wrapped resolver
    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            entries: self.closures.len(),
        }
    }

    /// Forget every closure and reset the counters
    pub fn clear_cache(&self) {
        self.closures.clear();
        self.counters.reset();
    }

    /// Drop closures that have gone stale
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.closures.retain(|_, closure| closure.fresh(now).is_some());
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl<R: OrganizationResolver> OrganizationResolver for CachedOrganizationResolver<R> {
    async fn ancestor_departments(
        &self,
        department_ids: &HashSet<DepartmentId>,
    ) -> Result<HashMap<DepartmentId, HashSet<DepartmentId>>> {
        let now = Instant::now();
        let mut resolved = HashMap::with_capacity(department_ids.len());
        let mut missing = HashSet::new();

        for id in department_ids {
            let cached = self
                .closures
                .get(id)
                .map(|entry| entry.fresh(now).cloned());

            let counter = match cached {
                Some(Some(closure)) => {
                    resolved.insert(id.clone(), closure);
                    &self.counters.hits
                }
                Some(None) => &self.counters.expirations,
                None => &self.counters.misses,
            };
            counter.fetch_add(1, Ordering::Relaxed);

            if !resolved.contains_key(id) {
                missing.insert(id.clone());
            }
        }

        if !missing.is_empty() {
            debug!("Resolving ancestors for {} uncached departments", missing.len());
            let fetched = self.inner.ancestor_departments(&missing).await?;
            let expires_at = Instant::now() + self.ttl;
            for (id, departments) in fetched {
                self.closures.insert(
                    id.clone(),
                    CachedClosure {
                        departments: departments.clone(),
                        expires_at,
                    },
                );
                resolved.insert(id, departments);
            }
        }

        Ok(resolved)
    }

    async fn direct_departments(
        &self,
        usernames: &HashSet<Username>,
    ) -> Result<HashMap<Username, HashSet<DepartmentId>>> {
        self.inner.direct_departments(usernames).await
    }
}
