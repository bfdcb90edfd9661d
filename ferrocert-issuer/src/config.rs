//! Issuer configuration and configuration file loading

use crate::error::ConfigError;
use ferrocert_acme::ChallengeType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default timeout for a single HTTP-01 self-check request
pub const DEFAULT_SELF_CHECK_TIMEOUT_SECS: u64 = 10;

/// Issuer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuerConfig {
    /// Issuer name, used in log output
    pub name: String,

    /// ACME settings
    pub acme: AcmeIssuerConfig,
}

/// ACME settings of an issuer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcmeIssuerConfig {
    /// ACME directory URL
    pub server: String,

    /// Account contact email
    pub email: String,

    /// HTTP-01 provisioning; present means enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http01: Option<Http01IssuerConfig>,

    /// DNS-01 provisioning; present means enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns01: Option<Dns01IssuerConfig>,
}

/// HTTP-01 provisioning on the issuer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Http01IssuerConfig {
    /// Timeout for a single self-check request, in seconds
    #[serde(default = "default_self_check_timeout_secs")]
    pub self_check_timeout_secs: u64,
}

impl Default for Http01IssuerConfig {
    fn default() -> Self {
        Self {
            self_check_timeout_secs: DEFAULT_SELF_CHECK_TIMEOUT_SECS,
        }
    }
}

impl Http01IssuerConfig {
    /// Self-check request timeout
    pub fn self_check_timeout(&self) -> Duration {
        Duration::from_secs(self.self_check_timeout_secs)
    }
}

fn default_self_check_timeout_secs() -> u64 {
    DEFAULT_SELF_CHECK_TIMEOUT_SECS
}

/// DNS-01 provisioning on the issuer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dns01IssuerConfig {
    /// DNS providers certificates may refer to by name
    #[serde(default)]
    pub providers: Vec<DnsProviderConfig>,
}

/// A named DNS provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DnsProviderConfig {
    pub name: String,
}

impl AcmeIssuerConfig {
    /// Create ACME settings with no challenge mechanism enabled
    pub fn new(server: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            email: email.into(),
            http01: None,
            dns01: None,
        }
    }

    /// Enable HTTP-01
    pub fn with_http01(mut self) -> Self {
        self.http01 = Some(Http01IssuerConfig::default());
        self
    }

    /// Enable DNS-01 with the given provider names
    pub fn with_dns01<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dns01 = Some(Dns01IssuerConfig {
            providers: providers
                .into_iter()
                .map(|name| DnsProviderConfig { name: name.into() })
                .collect(),
        });
        self
    }

    /// Whether the issuer has the challenge type provisioned
    pub fn enables(&self, challenge_type: ChallengeType) -> bool {
        match challenge_type {
            ChallengeType::Http01 => self.http01.is_some(),
            ChallengeType::Dns01 => self.dns01.is_some(),
        }
    }

    /// Challenge types the issuer has provisioned
    pub fn enabled_challenge_types(&self) -> Vec<ChallengeType> {
        ChallengeType::ALL
            .into_iter()
            .filter(|t| self.enables(*t))
            .collect()
    }
}

impl IssuerConfig {
    /// Parse an issuer configuration from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        ConfigLoader::new(FileFormat::Toml).parse(content)
    }

    /// Parse an issuer configuration from JSON
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        ConfigLoader::new(FileFormat::Json).parse(content)
    }

    /// Load and validate an issuer configuration file
    ///
    /// The format is picked from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config: Self = ConfigLoader::auto(path)?.load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for mistakes serde cannot catch
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.acme.server.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "issuer {:?}: acme.server must be set",
                self.name
            )));
        }

        if let Some(dns01) = &self.acme.dns01 {
            let mut seen = HashSet::new();
            for provider in &dns01.providers {
                if provider.name.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "issuer {:?}: dns01 provider without a name",
                        self.name
                    )));
                }
                if !seen.insert(provider.name.as_str()) {
                    return Err(ConfigError::ValidationError(format!(
                        "issuer {:?}: dns01 provider {:?} defined more than once",
                        self.name, provider.name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    /// Load configuration from file
    pub fn load_file<T: DeserializeOwned>(&self, path: &Path) -> Result<T, ConfigError> {
        let content = fs::read_to_string(path)?;
        self.parse(&content)
    }

    /// Parse configuration from string
    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<T, ConfigError> {
        match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e))),
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e))),
        }
    }
}
