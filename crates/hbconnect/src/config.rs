//! Client configuration.

use hbconnect_net::{GqlConfig, ARWEAVE_GRAPHQL_URL, GOLDSKY_GRAPHQL_URL};
use serde::{Deserialize, Serialize};

/// Default HyperBEAM node.
pub const DEFAULT_NODE_URL: &str = "https://forward.computer";
/// Scheduler used when talking to the default node.
pub const DEFAULT_SCHEDULER_URL: &str = "https://scheduler.forward.computer";
/// Authority of the default node.
pub const DEFAULT_NODE_AUTHORITY: &str = "QWg43UIcJhkdZq6ourr1VbnkwcP762Lppd569bKWYKY";
/// Authority appended to every discovered authority list.
pub const TRUSTED_AUTHORITY: &str = "fcoN_xJeisVsPXA-trzVAuIiqO3ydLQxM-L4XbrQKzY";
/// Default GraphQL endpoint.
pub const DEFAULT_GQL_ENDPOINT: &str = GOLDSKY_GRAPHQL_URL;

/// Well-known GraphQL endpoints.
pub mod gql_urls {
    pub const GOLDSKY: &str = super::GOLDSKY_GRAPHQL_URL;
    pub const ARWEAVE: &str = super::ARWEAVE_GRAPHQL_URL;
}

/// Configuration for [`HyperBeam`](crate::HyperBeam).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the node, without a trailing slash.
    pub node_url: String,
    /// Scheduler base URL. Derived from the node when unset.
    pub scheduler_url: Option<String>,
    /// Process authority list. Discovered from the node when unset.
    pub authority: Option<String>,
    /// Signer kind token: `ans104` or `httpsig`.
    pub signer_kind: String,
    /// GraphQL query client settings.
    pub gql: GqlConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            scheduler_url: None,
            authority: None,
            signer_kind: "ans104".to_string(),
            gql: GqlConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_node_url(mut self, url: impl Into<String>) -> Self {
        self.node_url = url.into();
        self
    }

    pub fn with_scheduler_url(mut self, url: impl Into<String>) -> Self {
        self.scheduler_url = Some(url.into());
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn with_signer_kind(mut self, kind: impl Into<String>) -> Self {
        self.signer_kind = kind.into();
        self
    }

    pub fn with_gql_url(mut self, url: impl Into<String>) -> Self {
        self.gql.endpoint_url = url.into();
        self
    }

    pub fn with_gql(mut self, gql: GqlConfig) -> Self {
        self.gql = gql;
        self
    }

    /// Node URL with any trailing slash removed; empty means the default node.
    pub fn node_url(&self) -> &str {
        match self.node_url.trim_end_matches('/') {
            "" => DEFAULT_NODE_URL,
            url => url,
        }
    }

    pub fn is_default_node(&self) -> bool {
        self.node_url() == DEFAULT_NODE_URL
    }

    /// Scheduler base URL.
    pub fn scheduler_url(&self) -> &str {
        match &self.scheduler_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.is_default_node() => DEFAULT_SCHEDULER_URL,
            None => self.node_url(),
        }
    }
}
