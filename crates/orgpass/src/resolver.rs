// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The seam to the identity/database service.

use crate::{AuthContext, ResolveError};

/// Resolves an organization's authorization context from the source of truth.
///
/// Implementations wrap the identity/database client. The cache in front
/// guarantees at most one concurrent `resolve` per organization, but may call
/// again for the same organization once an earlier call has settled - so the
/// operation must be safe to repeat, and should enforce its own deadline
/// against the upstream; the cache imposes none.
pub trait ContextResolver: Send + Sync {
    /// Resolves the authorization context for the organization named `org`.
    fn resolve(&self, org: &str) -> impl Future<Output = Result<AuthContext, ResolveError>> + Send;
}
