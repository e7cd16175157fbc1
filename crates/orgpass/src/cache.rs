// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cached authorization lookup handed to request handlers.

use std::fmt;
use std::time::Duration;

use memoflight::{Clock, MemoCache};

use crate::{AuthContext, ContextResolver, ResolveError};

/// Cached, herd-suppressed access to organization authorization contexts.
///
/// Construct one instance per process (or per test) and inject it into the
/// layers that need authorization lookups. Concurrent [`context`][Self::context]
/// calls for the same organization coalesce onto a single resolver call;
/// results stay cached for the configured TTL (30 seconds by default).
///
/// # Examples
///
/// ```
/// use orgpass::{ApiKey, AuthContext, AuthzCache, ContextResolver, ResolveError, Role};
/// use std::time::Duration;
///
/// # struct Directory;
/// # impl ContextResolver for Directory {
/// #     async fn resolve(&self, org: &str) -> Result<AuthContext, ResolveError> {
/// #         Ok(AuthContext {
/// #             user_id: "user-7".to_string(),
/// #             org_id: org.to_string(),
/// #             role: Role::Member,
/// #             api_key: ApiKey::new("sk"),
/// #         })
/// #     }
/// # }
/// let authz = AuthzCache::builder(Directory)
///     .ttl(Duration::from_secs(60))
///     .build();
/// ```
pub struct AuthzCache<R> {
    resolver: R,
    contexts: MemoCache<String, AuthContext>,
}

impl<R> AuthzCache<R>
where
    R: ContextResolver,
{
    /// Creates a cache with the default TTL (30s) and slow-lookup warning
    /// threshold (5s).
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self::builder(resolver).build()
    }

    /// Creates a builder for tuning TTL, warning threshold, and clock.
    #[must_use]
    pub fn builder(resolver: R) -> AuthzCacheBuilder<R> {
        AuthzCacheBuilder {
            resolver,
            clock: Clock::new(),
            ttl: None,
            slow_fetch_warning: None,
        }
    }

    /// Returns the authorization context for the organization named `org`.
    ///
    /// Served from the cache when fresh; otherwise resolved through the
    /// [`ContextResolver`], with concurrent callers for the same organization
    /// coalesced onto one resolver call. A failed resolution is shared by
    /// every coalesced caller and is not cached - the next call retries.
    ///
    /// # Errors
    ///
    /// Returns the resolver's [`ResolveError`] - this caller's own, or the
    /// identical error of the resolution it was coalesced onto.
    pub async fn context(&self, org: &str) -> Result<AuthContext, ResolveError> {
        self.contexts
            .get_or_fetch(&org.to_owned(), || self.resolver.resolve(org))
            .await
            .map_err(|shared| match shared.source_as::<ResolveError>() {
                Some(original) => original.clone(),
                None => ResolveError::Upstream { message: shared.to_string() },
            })
    }

    /// Drops the cached context for `org`, if any.
    ///
    /// Call on logout or credential rotation; the next
    /// [`context`][Self::context] call resolves afresh. A resolution already
    /// in flight is unaffected.
    pub fn forget(&self, org: &str) {
        self.contexts.invalidate(&org.to_owned());
        tracing::debug!(org, "authorization context evicted");
    }
}

impl<R> fmt::Debug for AuthzCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthzCache").field("contexts", &self.contexts).finish_non_exhaustive()
    }
}

/// Builder for [`AuthzCache`], created through [`AuthzCache::builder`].
#[derive(Debug)]
pub struct AuthzCacheBuilder<R> {
    resolver: R,
    clock: Clock,
    ttl: Option<Duration>,
    slow_fetch_warning: Option<Duration>,
}

impl<R> AuthzCacheBuilder<R>
where
    R: ContextResolver,
{
    /// Sets the clock the cache reads time from. Tests inject a frozen clock.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Sets how long a resolved context stays fresh.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the resolver duration past which a warning event is emitted.
    #[must_use]
    pub fn slow_fetch_warning(mut self, threshold: Duration) -> Self {
        self.slow_fetch_warning = Some(threshold);
        self
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics if a zero TTL or warning threshold was configured.
    #[must_use]
    pub fn build(self) -> AuthzCache<R> {
        let mut contexts = MemoCache::builder::<String, AuthContext>(self.clock).name("orgpass.contexts");
        if let Some(ttl) = self.ttl {
            contexts = contexts.ttl(ttl);
        }
        if let Some(threshold) = self.slow_fetch_warning {
            contexts = contexts.slow_fetch_warning(threshold);
        }

        AuthzCache {
            resolver: self.resolver,
            contexts: contexts.build(),
        }
    }
}
