// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cached, herd-suppressed resolution of organization authorization contexts.
//!
//! This crate answers "who is acting, for which organization, with which API
//! key?" by delegating to a caller-supplied [`ContextResolver`] - the
//! identity/database client - and caching each organization's
//! [`AuthContext`] behind a single-flight, TTL-bounded cache. Dozens of
//! request handlers asking for the same organization within milliseconds
//! produce exactly one identity-service round trip.
//!
//! # Example
//!
//! ```
//! use orgpass::{ApiKey, AuthContext, AuthzCache, ContextResolver, ResolveError, Role};
//!
//! struct StaticDirectory;
//!
//! impl ContextResolver for StaticDirectory {
//!     async fn resolve(&self, org: &str) -> Result<AuthContext, ResolveError> {
//!         Ok(AuthContext {
//!             user_id: "user-7".to_string(),
//!             org_id: org.to_string(),
//!             role: Role::Admin,
//!             api_key: ApiKey::new("sk-not-for-logs"),
//!         })
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let authz = AuthzCache::new(StaticDirectory);
//!
//! let context = authz.context("acme").await?;
//! assert_eq!(context.role, Role::Admin);
//! # Ok::<(), ResolveError>(())
//! # });
//! ```
//!
//! # Failure behavior
//!
//! A resolver failure is shared verbatim by every caller coalesced onto the
//! same lookup and is never cached: the next caller after the failed lookup
//! settles reaches the identity service again. Each [`ResolveError`] variant
//! carries an actionable, organization-naming message rather than a generic
//! failure.

#![doc(html_logo_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/orgpass/logo.png")]
#![doc(html_favicon_url = "https://media.githubusercontent.com/media/microsoft/oxidizer/refs/heads/main/crates/orgpass/favicon.ico")]

mod cache;
mod context;
mod error;
mod resolver;

pub use cache::{AuthzCache, AuthzCacheBuilder};
pub use context::{ApiKey, AuthContext, Role, UnknownRole};
pub use error::ResolveError;
#[doc(inline)]
pub use memoflight::Clock;
pub use resolver::ContextResolver;
