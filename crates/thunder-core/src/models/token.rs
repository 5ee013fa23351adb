//! Token configuration records.
//!
//! Two shapes exist: the root-level [`TokenConfig`] attached directly to an
//! application, and the [`OAuthTokenConfig`] nested under an OAuth inbound
//! auth entry, which wraps per-token-type subrecords.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root-level token configuration for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token issuer URL
    #[serde(default)]
    pub issuer: String,
    /// Validity period in seconds; never negative
    #[serde(default)]
    pub validity_period: i64,
    /// Ordered user attribute (claim) names to embed
    #[serde(default)]
    pub user_attributes: Vec<String>,
}

/// Token configuration nested under an OAuth inbound-auth entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthTokenConfig {
    /// Access-token subrecord
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessTokenConfig>,
    /// Id-token subrecord
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<IdTokenConfig>,
}

/// Access-token issuance parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenConfig {
    /// Token issuer URL
    #[serde(default)]
    pub issuer: String,
    /// Validity period in seconds; never negative
    #[serde(default)]
    pub validity_period: i64,
    /// Ordered claim names
    #[serde(default)]
    pub user_attributes: Vec<String>,
}

/// Id-token issuance parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdTokenConfig {
    /// Token issuer URL
    #[serde(default)]
    pub issuer: String,
    /// Validity period in seconds; never negative
    #[serde(default)]
    pub validity_period: i64,
    /// Ordered claim names
    #[serde(default)]
    pub user_attributes: Vec<String>,
    /// Scope to ordered claim-name mapping for scope-gated claims
    #[serde(default)]
    pub scope_claims: HashMap<String, Vec<String>>,
}
