/// ACME challenge types and handling
use crate::order::Identifier;
use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path prefix under which HTTP-01 responses are served
pub const HTTP01_PATH_PREFIX: &str = "/.well-known/acme-challenge/";

/// Record label prefix for DNS-01 TXT records
pub const DNS01_RECORD_PREFIX: &str = "_acme-challenge";

/// ACME authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    /// Authorization URL
    #[serde(default)]
    pub url: String,

    /// Authorization identifier
    pub identifier: Identifier,

    /// Authorization status
    pub status: Status,

    /// Expiration timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,

    /// List of challenges, in the order the server offered them
    pub challenges: Vec<Challenge>,

    /// Wildcard indicator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wildcard: Option<bool>,
}

impl Authorization {
    /// Domain this authorization proves control over
    pub fn domain(&self) -> &str {
        &self.identifier.value
    }

    /// Find the offered challenge of the given type
    pub fn challenge(&self, challenge_type: ChallengeType) -> Option<&Challenge> {
        self.challenges
            .iter()
            .find(|c| c.kind() == Some(challenge_type))
    }
}

/// ACME challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge type
    #[serde(rename = "type")]
    pub challenge_type: String,

    /// Challenge URL
    pub url: String,

    /// Challenge status
    pub status: Status,

    /// Challenge token
    pub token: String,

    /// Validation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated: Option<String>,

    /// Error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl Challenge {
    /// Parsed challenge type, `None` for types this crate does not solve
    pub fn kind(&self) -> Option<ChallengeType> {
        self.challenge_type.parse().ok()
    }
}

/// Challenge types that can be solved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChallengeType {
    /// HTTP-01 challenge (port 80)
    Http01,
    /// DNS-01 challenge (DNS TXT record)
    Dns01,
}

impl ChallengeType {
    /// All supported challenge types
    pub const ALL: [ChallengeType; 2] = [ChallengeType::Http01, ChallengeType::Dns01];

    /// Wire name of the challenge type
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Http01 => "http-01",
            ChallengeType::Dns01 => "dns-01",
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a challenge type this crate does not support
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported challenge type {0}")]
pub struct UnsupportedChallengeType(pub String);

impl FromStr for ChallengeType {
    type Err = UnsupportedChallengeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http-01" => Ok(ChallengeType::Http01),
            "dns-01" => Ok(ChallengeType::Dns01),
            other => Err(UnsupportedChallengeType(other.to_string())),
        }
    }
}

/// Path where the HTTP-01 response for a token is served
pub fn http01_path(token: &str) -> String {
    format!("{}{}", HTTP01_PATH_PREFIX, token)
}

/// Name of the DNS-01 TXT record for a domain
///
/// For `*.example.com`, returns `_acme-challenge.example.com`
pub fn dns01_record_name(domain: &str) -> String {
    let domain = domain.strip_prefix("*.").unwrap_or(domain);
    format!("{}.{}", DNS01_RECORD_PREFIX, domain)
}
