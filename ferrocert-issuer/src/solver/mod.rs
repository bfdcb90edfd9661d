//! Challenge solvers and the registry that maps challenge types to them
//!
//! A [`Solver`] presents the proof for one challenge type, checks that the
//! proof is observable from outside, and removes it again. Present and
//! clean-up are called again on every reconciliation pass that needs them, so
//! both must be safe to repeat; clean-up must also succeed when present was
//! never called.

mod dns01;
mod http01;

pub use dns01::{Dns01Solver, DnsProvider, TxtLookup};
pub use http01::{ChallengeResponses, Http01Solver};

use crate::certificate::Certificate;
use crate::config::AcmeIssuerConfig;
use crate::error::ConfigError;
use async_trait::async_trait;
use ferrocert_acme::ChallengeType;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Result type for solver operations
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors that can occur while solving a challenge
#[derive(Debug, Error)]
pub enum SolverError {
    /// The certificate or issuer is not set up for this solver
    #[error("Invalid solver configuration: {0}")]
    Misconfigured(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// DNS provider API call failed
    #[error("DNS provider '{provider}' failed: {message}")]
    DnsProvider { provider: String, message: String },

    /// DNS lookup failed
    #[error("DNS lookup for '{record}' failed: {message}")]
    Lookup { record: String, message: String },
}

impl SolverError {
    /// Whether fixing this needs a configuration change
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, SolverError::Misconfigured(_))
    }
}

/// Capability that solves one challenge type
#[async_trait]
pub trait Solver: Send + Sync + Debug {
    /// Make the proof observable for `domain`
    async fn present(
        &self,
        crt: &Certificate,
        domain: &str,
        token: &str,
        key: &str,
    ) -> SolverResult<()>;

    /// Whether the proof can be observed yet
    ///
    /// `Ok(false)` means "not yet"; errors are for genuine failures.
    async fn check(&self, domain: &str, token: &str, key: &str) -> SolverResult<bool>;

    /// Remove whatever `present` created
    async fn clean_up(
        &self,
        crt: &Certificate,
        domain: &str,
        token: &str,
        key: &str,
    ) -> SolverResult<()>;
}

/// One solver per supported challenge type
#[derive(Debug, Clone, Default)]
pub struct SolverRegistry {
    solvers: BTreeMap<ChallengeType, Arc<dyn Solver>>,
}

impl SolverRegistry {
    /// Start building a registry
    pub fn builder() -> SolverRegistryBuilder {
        SolverRegistryBuilder::default()
    }

    /// Solver registered for a challenge type
    pub fn get(&self, challenge_type: ChallengeType) -> Option<&Arc<dyn Solver>> {
        self.solvers.get(&challenge_type)
    }

    /// Challenge types with a registered solver
    pub fn challenge_types(&self) -> Vec<ChallengeType> {
        self.solvers.keys().copied().collect()
    }

    /// Check that the registry serves exactly the challenge types the issuer
    /// has provisioned
    pub fn validate_for(&self, issuer: &AcmeIssuerConfig) -> Result<(), ConfigError> {
        for challenge_type in ChallengeType::ALL {
            match (issuer.enables(challenge_type), self.solvers.contains_key(&challenge_type)) {
                (true, false) => {
                    return Err(ConfigError::ValidationError(format!(
                        "issuer enables {} but no solver is registered for it",
                        challenge_type
                    )));
                }
                (false, true) => {
                    return Err(ConfigError::ValidationError(format!(
                        "solver registered for {} but the issuer does not enable it",
                        challenge_type
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Builder for [`SolverRegistry`]
#[derive(Debug, Default)]
pub struct SolverRegistryBuilder {
    solvers: BTreeMap<ChallengeType, Arc<dyn Solver>>,
    duplicates: Vec<ChallengeType>,
}

impl SolverRegistryBuilder {
    /// Register the solver for a challenge type
    pub fn solver(mut self, challenge_type: ChallengeType, solver: Arc<dyn Solver>) -> Self {
        if self.solvers.insert(challenge_type, solver).is_some() {
            self.duplicates.push(challenge_type);
        }
        self
    }

    /// Register the HTTP-01 solver
    pub fn http01(self, solver: Arc<dyn Solver>) -> Self {
        self.solver(ChallengeType::Http01, solver)
    }

    /// Register the DNS-01 solver
    pub fn dns01(self, solver: Arc<dyn Solver>) -> Self {
        self.solver(ChallengeType::Dns01, solver)
    }

    /// Build the registry
    pub fn build(self) -> Result<SolverRegistry, ConfigError> {
        if let Some(challenge_type) = self.duplicates.first() {
            return Err(ConfigError::ValidationError(format!(
                "more than one solver registered for {}",
                challenge_type
            )));
        }
        Ok(SolverRegistry {
            solvers: self.solvers,
        })
    }

    /// Build the registry and check it against the issuer configuration
    pub fn build_for(self, issuer: &AcmeIssuerConfig) -> Result<SolverRegistry, ConfigError> {
        let registry = self.build()?;
        registry.validate_for(issuer)?;
        Ok(registry)
    }
}
