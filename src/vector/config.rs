//! Connection settings for the Vectorize API.
//!
//! A `ConnectionConfig` is owned by the caller and handed to every operation by
//! reference. The client never stores or mutates it.

use crate::vector::{VectorizeError, VectorizeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const DEFAULT_API_ENDPOINT: &str = "https://api.cloudflare.com/client/v4";

const ENV_ACCOUNT_ID: &str = "VECTORIZE_ACCOUNT_ID";
const ENV_API_TOKEN: &str = "VECTORIZE_API_TOKEN";
const ENV_API_ENDPOINT: &str = "VECTORIZE_API_ENDPOINT";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub account_id: String,
    pub api_token: String,
    #[serde(default = "default_endpoint")]
    pub api_endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

impl ConnectionConfig {
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            api_token: api_token.into(),
            api_endpoint: default_endpoint(),
        }
    }

    pub fn with_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = api_endpoint.into();
        self
    }

    /// Loads settings from the process environment, reading a `.env` file first if present.
    ///
    /// # Environment Variables
    /// - `VECTORIZE_ACCOUNT_ID`: required
    /// - `VECTORIZE_API_TOKEN`: required
    /// - `VECTORIZE_API_ENDPOINT`: optional, defaults to the public API endpoint
    pub fn from_env() -> VectorizeResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> VectorizeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = [ENV_ACCOUNT_ID, ENV_API_TOKEN];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
            .collect();

        if !missing.is_empty() {
            return Err(VectorizeError::invalid(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let account_id = lookup(ENV_ACCOUNT_ID).unwrap_or_default();
        let api_token = lookup(ENV_API_TOKEN).unwrap_or_default();
        let mut config = Self::new(account_id.trim(), api_token.trim());
        if let Some(endpoint) = lookup(ENV_API_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            config.api_endpoint = endpoint.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VectorizeResult<()> {
        if self.account_id.trim().is_empty() {
            return Err(VectorizeError::invalid("account id must not be empty"));
        }
        // The id is spliced into the URL path as-is.
        if let Some(c) = self
            .account_id
            .chars()
            .find(|c| matches!(*c, '/' | '?' | '#' | '%') || c.is_whitespace())
        {
            return Err(VectorizeError::invalid(format!(
                "account id must not contain {:?}",
                c
            )));
        }
        if self.api_token.trim().is_empty() {
            return Err(VectorizeError::invalid("API token must not be empty"));
        }
        let parsed = Url::parse(&self.api_endpoint).map_err(|e| {
            VectorizeError::invalid(format!(
                "API endpoint '{}' is not a valid URL: {}",
                self.api_endpoint, e
            ))
        })?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(VectorizeError::invalid(format!(
                "API endpoint '{}' must use http or https",
                self.api_endpoint
            )));
        }
        Ok(())
    }

    /// Full URL for a path relative to the account's Vectorize v2 root.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/accounts/{}/vectorize/v2/{}",
            self.api_endpoint.trim_end_matches('/'),
            self.account_id,
            endpoint.trim_start_matches('/')
        )
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.api_token)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}
