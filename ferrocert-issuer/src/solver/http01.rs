//! HTTP-01 solver
//!
//! Presenting stores the key authorization in a [`ChallengeResponses`] store
//! that the process's HTTP listener answers `/.well-known/acme-challenge/`
//! requests from. The self-check fetches the same URL the ACME server will.

use super::{Solver, SolverError, SolverResult};
use crate::certificate::Certificate;
use crate::config::Http01IssuerConfig;
use async_trait::async_trait;
use ferrocert_acme::http01_path;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Token to key authorization map served over HTTP
#[derive(Debug, Clone, Default)]
pub struct ChallengeResponses {
    responses: Arc<RwLock<HashMap<String, String>>>,
}

impl ChallengeResponses {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the response for a token, replacing any previous one
    pub fn insert(&self, token: &str, key_authorization: &str) {
        self.responses
            .write()
            .insert(token.to_string(), key_authorization.to_string());
    }

    /// Remove the response for a token
    pub fn remove(&self, token: &str) -> Option<String> {
        self.responses.write().remove(token)
    }

    /// Response to serve for a token
    pub fn response_for(&self, token: &str) -> Option<String> {
        self.responses.read().get(token).cloned()
    }

    /// Answer a request path, if it is an ACME challenge path we hold
    pub fn response_for_path(&self, path: &str) -> Option<String> {
        path.strip_prefix(ferrocert_acme::HTTP01_PATH_PREFIX)
            .and_then(|token| self.response_for(token))
    }

    /// Number of stored responses
    pub fn len(&self) -> usize {
        self.responses.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.responses.read().is_empty()
    }
}

/// Solver for `http-01` challenges
#[derive(Debug, Clone)]
pub struct Http01Solver {
    responses: ChallengeResponses,
    http_client: reqwest::Client,
    self_check_base: Option<String>,
}

impl Http01Solver {
    /// Create a solver serving from `responses`
    pub fn new(responses: ChallengeResponses, config: &Http01IssuerConfig) -> SolverResult<Self> {
        Self::with_timeout(responses, config.self_check_timeout())
    }

    /// Create a solver with an explicit self-check timeout
    pub fn with_timeout(responses: ChallengeResponses, timeout: Duration) -> SolverResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            responses,
            http_client,
            self_check_base: None,
        })
    }

    /// Send self-check requests to `base` instead of `http://<domain>`
    ///
    /// For deployments where the solver cannot resolve its own public name.
    pub fn with_self_check_base(mut self, base: impl Into<String>) -> Self {
        self.self_check_base = Some(base.into().trim_end_matches('/').to_string());
        self
    }

    /// The response store this solver writes to
    pub fn responses(&self) -> &ChallengeResponses {
        &self.responses
    }

    /// URL fetched by the self-check
    pub fn check_url(&self, domain: &str, token: &str) -> String {
        match &self.self_check_base {
            Some(base) => format!("{}{}", base, http01_path(token)),
            None => format!("http://{}{}", domain, http01_path(token)),
        }
    }
}

#[async_trait]
impl Solver for Http01Solver {
    async fn present(
        &self,
        _crt: &Certificate,
        domain: &str,
        token: &str,
        key: &str,
    ) -> SolverResult<()> {
        debug!(domain = %domain, token = %token, "Serving HTTP-01 challenge response");
        self.responses.insert(token, key);
        Ok(())
    }

    async fn check(&self, domain: &str, token: &str, key: &str) -> SolverResult<bool> {
        let url = self.check_url(domain, token);
        debug!(domain = %domain, url = %url, "Running HTTP-01 self check");

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                info!(domain = %domain, error = %e, "HTTP-01 challenge not reachable yet");
                return Ok(false);
            }
            Err(e) => return Err(SolverError::Http(e)),
        };

        if !response.status().is_success() {
            info!(
                domain = %domain,
                status = response.status().as_u16(),
                "HTTP-01 self check got unexpected status"
            );
            return Ok(false);
        }

        let body = response.text().await?;
        Ok(body.trim() == key)
    }

    async fn clean_up(
        &self,
        _crt: &Certificate,
        domain: &str,
        token: &str,
        _key: &str,
    ) -> SolverResult<()> {
        if self.responses.remove(token).is_some() {
            debug!(domain = %domain, token = %token, "Removed HTTP-01 challenge response");
        }
        Ok(())
    }
}
