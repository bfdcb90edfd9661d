//! Error types for the ferrocert issuer

use crate::certificate::{ConditionUpdate, Reason};
use crate::solver::SolverError;
use ferrocert_acme::{AcmeError, ChallengeType, Status, UnsupportedChallengeType};
use thiserror::Error;

/// Message recorded when a certificate has no ACME configuration
pub const MESSAGE_MISSING_CONFIG: &str = "certificate.spec.acme must be specified";

/// Result type for prepare operations
pub type Result<T> = std::result::Result<T, PrepareError>;

/// Errors that end a prepare pass
#[derive(Debug, Error)]
pub enum PrepareError {
    /// The certificate carries no ACME configuration
    #[error("{}", MESSAGE_MISSING_CONFIG)]
    MissingConfig,

    /// The ACME client failed; the message is the client's own
    #[error(transparent)]
    Acme(#[from] AcmeError),

    /// The existing order reports a status with no recovery policy
    #[error("order '{url}' unknown status: '{status}'")]
    UnknownOrderStatus {
        /// Order URL
        url: String,
        /// Status reported by the server
        status: Status,
    },

    /// No challenge type is both configured for the domain and enabled on the issuer
    #[error(
        "error picking challenge type to use for domain '{domain}': no configured and supported challenge type found"
    )]
    NoChallengeType {
        /// Domain being validated
        domain: String,
    },

    /// The selected challenge type is missing from the authorization's offer
    #[error("challenge mechanism '{challenge_type}' not allowed for domain '{domain}'")]
    ChallengeNotOffered {
        /// Selected challenge type
        challenge_type: ChallengeType,
        /// Domain being validated
        domain: String,
    },

    /// A proof value was requested for a challenge type ferrocert cannot solve
    #[error(transparent)]
    UnsupportedChallengeType(#[from] UnsupportedChallengeType),

    /// No solver is registered for the selected challenge type
    #[error("no solver registered for challenge type {0}")]
    NoSolver(ChallengeType),

    /// A solver's present, check or clean-up failed
    #[error("{challenge_type} solver failed for domain '{domain}': {source}")]
    Solver {
        /// Domain being validated
        domain: String,
        /// Challenge type of the failing solver
        challenge_type: ChallengeType,
        /// Underlying solver error
        #[source]
        source: SolverError,
    },

    /// The server finished validating but did not accept the proof
    #[error(
        "expected acme domain authorization status for '{domain}' to be valid, but it is '{status}'"
    )]
    AuthorizationNotValid {
        /// Domain that was validated
        domain: String,
        /// Final status reported by the server
        status: Status,
    },

    /// One or more authorizations on the order failed; the order was abandoned
    #[error("Error obtaining validations for domains {domains:?}")]
    FailedAuthorizations {
        /// Domains whose authorizations failed
        domains: Vec<String>,
    },

    /// Self-checks have not passed yet for these domains
    #[error("self check failed for domains: {domains:?}")]
    SelfCheckFailed {
        /// Domains still waiting on their self-check
        domains: Vec<String>,
    },

    /// The pass was cancelled
    #[error("prepare cancelled")]
    Cancelled,
}

/// Broad classification of a [`PrepareError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Needs a configuration change before a retry can succeed
    Configuration,
    /// Remote call failed; the next reconciliation pass retries it
    Transport,
    /// The server rejected an order or an authorization
    Rejected,
    /// Self-checks have not passed yet
    Pending,
    /// The pass was cancelled
    Cancelled,
}

impl PrepareError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingConfig
            | Self::NoChallengeType { .. }
            | Self::ChallengeNotOffered { .. }
            | Self::UnsupportedChallengeType(_)
            | Self::NoSolver(_) => ErrorKind::Configuration,
            Self::Solver { source, .. } if source.is_misconfiguration() => {
                ErrorKind::Configuration
            }
            Self::Acme(_) | Self::Solver { .. } => ErrorKind::Transport,
            Self::UnknownOrderStatus { .. }
            | Self::AuthorizationNotValid { .. }
            | Self::FailedAuthorizations { .. } => ErrorKind::Rejected,
            Self::SelfCheckFailed { .. } => ErrorKind::Pending,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Check if the next reconciliation pass can be expected to make progress
    /// without anyone looking into this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Transport | ErrorKind::Pending | ErrorKind::Cancelled
        )
    }

    /// Status condition to record on the certificate for this error, if any
    ///
    /// Only a missing ACME configuration and a failed authorization set are
    /// recorded; every other error is left to the caller to surface.
    pub fn status_condition(&self) -> Option<ConditionUpdate> {
        match self {
            Self::MissingConfig => Some(ConditionUpdate::not_ready(
                Reason::InvalidConfig,
                MESSAGE_MISSING_CONFIG,
            )),
            Self::FailedAuthorizations { .. } => Some(ConditionUpdate::not_ready(
                Reason::CheckAuthorization,
                self.to_string(),
            )),
            _ => None,
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
