// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Errors surfaced when resolving an organization's authorization context.

/// Why an organization's authorization context could not be resolved.
///
/// Every variant's message names the organization and what to do about the
/// failure; the layer rendering it to a user should never have to fall back
/// to "something went wrong". The type is `Clone` because a single failed
/// lookup is shared by every caller coalesced onto it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The organization slug is not known to the identity service.
    #[error("organization `{org}` is not provisioned; check the slug or onboard the organization first")]
    UnknownOrg {
        /// The organization slug that was looked up.
        org: String,
    },

    /// The identity service refused the lookup.
    #[error("the identity service denied access to organization `{org}`; its credentials may have been rotated")]
    Denied {
        /// The organization slug that was looked up.
        org: String,
    },

    /// The identity service did not answer within the resolver's deadline.
    #[error("the identity service did not answer in time for organization `{org}`; retry once the upstream recovers")]
    UpstreamTimeout {
        /// The organization slug that was looked up.
        org: String,
    },

    /// Any other identity-service failure.
    #[error("identity lookup failed: {message}")]
    Upstream {
        /// Description of the upstream failure.
        message: String,
    },
}
