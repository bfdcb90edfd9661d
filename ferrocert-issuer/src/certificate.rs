//! Certificate resource: requested domains, per-domain solver configuration,
//! and the status fields the issuer writes back

use chrono::{DateTime, Utc};
use ferrocert_acme::ChallengeType;
use serde::{Deserialize, Serialize};

/// A certificate request as stored by the resource store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Resource name, used in log output
    pub name: String,

    /// Requested certificate
    pub spec: CertificateSpec,

    /// Status written by the issuer
    #[serde(default)]
    pub status: CertificateStatus,
}

/// Requested certificate contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Common name, also requested as a domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// Subject alternative DNS names
    #[serde(default)]
    pub dns_names: Vec<String>,

    /// ACME validation configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acme: Option<AcmeCertificateConfig>,
}

/// ACME validation configuration for a certificate
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AcmeCertificateConfig {
    /// Per-domain solver entries, in declaration order
    #[serde(default)]
    pub config: Vec<DomainSolverConfig>,
}

/// Challenge mechanisms enabled for a set of domains
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainSolverConfig {
    /// Domains this entry applies to
    pub domains: Vec<String>,

    /// HTTP-01 settings; present means enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http01: Option<Http01SolverConfig>,

    /// DNS-01 settings; present means enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns01: Option<Dns01SolverConfig>,
}

impl DomainSolverConfig {
    /// Create an entry for the given domains with no mechanism enabled
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
            http01: None,
            dns01: None,
        }
    }

    /// Enable HTTP-01 for these domains
    pub fn with_http01(mut self) -> Self {
        self.http01 = Some(Http01SolverConfig::default());
        self
    }

    /// Enable DNS-01 for these domains using the named provider
    pub fn with_dns01(mut self, provider: impl Into<String>) -> Self {
        self.dns01 = Some(Dns01SolverConfig {
            provider: provider.into(),
        });
        self
    }

    /// Whether this entry names the domain
    pub fn covers(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    /// Whether this entry enables the challenge type
    pub fn enables(&self, challenge_type: ChallengeType) -> bool {
        match challenge_type {
            ChallengeType::Http01 => self.http01.is_some(),
            ChallengeType::Dns01 => self.dns01.is_some(),
        }
    }
}

/// HTTP-01 settings for a domain entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Http01SolverConfig {}

/// DNS-01 settings for a domain entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dns01SolverConfig {
    /// Name of the issuer-level DNS provider that hosts the zone
    pub provider: String,
}

/// Status written by the issuer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CertificateStatus {
    /// Status conditions, at most one per kind
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// ACME bookkeeping
    #[serde(default)]
    pub acme: AcmeStatus,
}

/// ACME bookkeeping on the certificate status
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcmeStatus {
    /// URL of the order in progress; empty when there is none
    #[serde(default)]
    pub order_url: String,
}

/// Kind of status condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConditionKind {
    Ready,
}

/// Value of a status condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Machine readable reason attached to a status condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Reason {
    #[serde(rename = "ErrInvalidConfig")]
    InvalidConfig,
    /// Reserved for callers that fail to obtain the ACME account; the
    /// prepare pass never writes it
    #[serde(rename = "ErrGetACMEAccount")]
    GetAcmeAccount,
    #[serde(rename = "ErrCheckAuthorization")]
    CheckAuthorization,
    /// Reserved for callers; the prepare pass never writes it
    #[serde(rename = "ErrObtainAuthorization")]
    ObtainAuthorization,
}

impl Reason {
    /// Reason code as written to the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::InvalidConfig => "ErrInvalidConfig",
            Reason::GetAcmeAccount => "ErrGetACMEAccount",
            Reason::CheckAuthorization => "ErrCheckAuthorization",
            Reason::ObtainAuthorization => "ErrObtainAuthorization",
        }
    }
}

/// A status condition as stored on the certificate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    pub status: ConditionStatus,
    pub reason: Reason,
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

/// A condition write computed by the issuer, applied with
/// [`Certificate::update_status_condition`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionUpdate {
    pub kind: ConditionKind,
    pub status: ConditionStatus,
    pub reason: Reason,
    pub message: String,
}

impl ConditionUpdate {
    /// `Ready=False` with the given reason
    pub fn not_ready(reason: Reason, message: impl Into<String>) -> Self {
        Self {
            kind: ConditionKind::Ready,
            status: ConditionStatus::False,
            reason,
            message: message.into(),
        }
    }
}

impl Certificate {
    /// Create a certificate request for the given DNS names
    pub fn new<I, S>(name: impl Into<String>, dns_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            spec: CertificateSpec {
                common_name: None,
                dns_names: dns_names.into_iter().map(Into::into).collect(),
                acme: None,
            },
            status: CertificateStatus::default(),
        }
    }

    /// Set the ACME validation configuration
    pub fn with_acme(mut self, config: Vec<DomainSolverConfig>) -> Self {
        self.spec.acme = Some(AcmeCertificateConfig { config });
        self
    }

    /// Set the common name
    pub fn with_common_name(mut self, common_name: impl Into<String>) -> Self {
        self.spec.common_name = Some(common_name.into());
        self
    }

    /// Requested domains: the common name first, then the DNS names, without
    /// duplicates
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = Vec::with_capacity(self.spec.dns_names.len() + 1);
        for domain in self
            .spec
            .common_name
            .iter()
            .chain(self.spec.dns_names.iter())
        {
            if !domain.is_empty() && !domains.contains(domain) {
                domains.push(domain.clone());
            }
        }
        domains
    }

    /// ACME validation configuration, if any
    pub fn acme_config(&self) -> Option<&AcmeCertificateConfig> {
        self.spec.acme.as_ref()
    }

    /// Stored order URL, `None` when no order is cached
    pub fn order_url(&self) -> Option<&str> {
        let url = self.status.acme.order_url.as_str();
        (!url.is_empty()).then_some(url)
    }

    /// Cache the URL of the order in progress
    pub fn set_order_url(&mut self, url: impl Into<String>) {
        self.status.acme.order_url = url.into();
    }

    /// Forget the cached order so the next pass creates a new one
    pub fn clear_order_url(&mut self) {
        self.status.acme.order_url.clear();
    }

    /// Current condition of the given kind
    pub fn condition(&self, kind: ConditionKind) -> Option<&Condition> {
        self.status.conditions.iter().find(|c| c.kind == kind)
    }

    /// Record a status condition, replacing any condition of the same kind
    pub fn update_status_condition(&mut self, update: ConditionUpdate) {
        self.update_status_condition_at(update, Utc::now());
    }

    /// Record a status condition as of `now`
    ///
    /// The transition time only moves when the condition's status changes.
    pub fn update_status_condition_at(&mut self, update: ConditionUpdate, now: DateTime<Utc>) {
        let mut condition = Condition {
            kind: update.kind,
            status: update.status,
            reason: update.reason,
            message: update.message,
            last_transition_time: now,
        };

        match self
            .status
            .conditions
            .iter_mut()
            .find(|c| c.kind == condition.kind)
        {
            Some(existing) => {
                if existing.status == condition.status {
                    condition.last_transition_time = existing.last_transition_time;
                }
                *existing = condition;
            }
            None => self.status.conditions.push(condition),
        }
    }
}
