//! DNS-01 solver
//!
//! Publishes the proof as a TXT record at `_acme-challenge.<domain>` through
//! the DNS provider the certificate names for the domain.

use super::{Solver, SolverError, SolverResult};
use crate::certificate::Certificate;
use async_trait::async_trait;
use ferrocert_acme::dns01_record_name;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

/// DNS provider API used to publish challenge records
///
/// Records are addressed by name and value so removal needs no state kept
/// from creation.
#[async_trait]
pub trait DnsProvider: Send + Sync + Debug {
    /// Provider name, as referenced from certificate and issuer configuration
    fn name(&self) -> &str;

    /// Create the TXT record; succeed if it already exists
    async fn create_txt_record(&self, record_name: &str, value: &str) -> SolverResult<()>;

    /// Delete the TXT record; succeed if it does not exist
    async fn delete_txt_record(&self, record_name: &str, value: &str) -> SolverResult<()>;
}

/// Resolver used to check that a record is publicly visible
#[async_trait]
pub trait TxtLookup: Send + Sync + Debug {
    /// TXT values currently published at `record_name`; empty if none
    async fn lookup_txt(&self, record_name: &str) -> SolverResult<Vec<String>>;
}

/// Solver for `dns-01` challenges
#[derive(Debug, Clone)]
pub struct Dns01Solver {
    providers: HashMap<String, Arc<dyn DnsProvider>>,
    lookup: Arc<dyn TxtLookup>,
}

impl Dns01Solver {
    /// Create a solver with no providers
    pub fn new(lookup: Arc<dyn TxtLookup>) -> Self {
        Self {
            providers: HashMap::new(),
            lookup,
        }
    }

    /// Register a provider under its own name
    pub fn with_provider(mut self, provider: Arc<dyn DnsProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    /// Provider the certificate configures for the domain
    fn provider_for(&self, crt: &Certificate, domain: &str) -> SolverResult<&Arc<dyn DnsProvider>> {
        let provider_name = crt
            .acme_config()
            .and_then(|acme| acme.config.iter().find(|entry| entry.covers(domain)))
            .and_then(|entry| entry.dns01.as_ref())
            .map(|dns01| dns01.provider.as_str())
            .ok_or_else(|| {
                SolverError::Misconfigured(format!(
                    "no dns01 configuration for domain '{}' on certificate '{}'",
                    domain, crt.name
                ))
            })?;

        self.providers.get(provider_name).ok_or_else(|| {
            SolverError::Misconfigured(format!("dns01 provider '{}' not found", provider_name))
        })
    }
}

#[async_trait]
impl Solver for Dns01Solver {
    async fn present(
        &self,
        crt: &Certificate,
        domain: &str,
        _token: &str,
        key: &str,
    ) -> SolverResult<()> {
        let provider = self.provider_for(crt, domain)?;
        let record = dns01_record_name(domain);

        debug!(domain = %domain, record = %record, provider = %provider.name(), "Creating DNS-01 TXT record");
        provider.create_txt_record(&record, key).await
    }

    async fn check(&self, domain: &str, _token: &str, key: &str) -> SolverResult<bool> {
        let record = dns01_record_name(domain);
        let values = self.lookup.lookup_txt(&record).await?;
        let found = values.iter().any(|v| v == key);

        if !found {
            info!(domain = %domain, record = %record, "DNS-01 record not visible yet");
        }
        Ok(found)
    }

    async fn clean_up(
        &self,
        crt: &Certificate,
        domain: &str,
        _token: &str,
        key: &str,
    ) -> SolverResult<()> {
        let provider = self.provider_for(crt, domain)?;
        let record = dns01_record_name(domain);

        debug!(domain = %domain, record = %record, provider = %provider.name(), "Deleting DNS-01 TXT record");
        provider.delete_txt_record(&record, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::DomainSolverConfig;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    /// In-memory zone shared by the fake provider and resolver
    #[derive(Debug, Default)]
    struct Zone {
        records: Mutex<HashSet<(String, String)>>,
    }

    #[derive(Debug)]
    struct FakeProvider {
        name: String,
        zone: Arc<Zone>,
    }

    #[async_trait]
    impl DnsProvider for FakeProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn create_txt_record(&self, record_name: &str, value: &str) -> SolverResult<()> {
            self.zone
                .records
                .lock()
                .insert((record_name.to_string(), value.to_string()));
            Ok(())
        }

        async fn delete_txt_record(&self, record_name: &str, value: &str) -> SolverResult<()> {
            self.zone
                .records
                .lock()
                .remove(&(record_name.to_string(), value.to_string()));
            Ok(())
        }
    }

    #[async_trait]
    impl TxtLookup for Zone {
        async fn lookup_txt(&self, record_name: &str) -> SolverResult<Vec<String>> {
            Ok(self
                .records
                .lock()
                .iter()
                .filter(|(name, _)| name == record_name)
                .map(|(_, value)| value.clone())
                .collect())
        }
    }

    fn solver_with_zone() -> (Dns01Solver, Arc<Zone>) {
        let zone = Arc::new(Zone::default());
        let solver = Dns01Solver::new(zone.clone()).with_provider(Arc::new(FakeProvider {
            name: "cloudflare".to_string(),
            zone: zone.clone(),
        }));
        (solver, zone)
    }

    fn certificate(provider: &str) -> Certificate {
        Certificate::new("wild", ["*.example.com"])
            .with_acme(vec![DomainSolverConfig::new(["*.example.com"]).with_dns01(provider)])
    }

    #[tokio::test]
    async fn test_present_check_clean_up() {
        let (solver, zone) = solver_with_zone();
        let crt = certificate("cloudflare");

        assert!(!solver.check("*.example.com", "tok", "digest").await.unwrap());

        solver.present(&crt, "*.example.com", "tok", "digest").await.unwrap();
        assert!(
            zone.records
                .lock()
                .contains(&("_acme-challenge.example.com".to_string(), "digest".to_string()))
        );
        assert!(solver.check("*.example.com", "tok", "digest").await.unwrap());

        solver.clean_up(&crt, "*.example.com", "tok", "digest").await.unwrap();
        solver.clean_up(&crt, "*.example.com", "tok", "digest").await.unwrap();
        assert!(zone.records.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_is_misconfiguration() {
        let (solver, _zone) = solver_with_zone();
        let crt = certificate("route53");

        let err = solver
            .present(&crt, "*.example.com", "tok", "digest")
            .await
            .unwrap_err();
        assert!(err.is_misconfiguration());
        assert!(err.to_string().contains("route53"));
    }

    #[tokio::test]
    async fn test_domain_without_dns01_entry_is_misconfiguration() {
        let (solver, _zone) = solver_with_zone();
        let crt = Certificate::new("web", ["example.com"])
            .with_acme(vec![DomainSolverConfig::new(["example.com"]).with_http01()]);

        let err = solver
            .clean_up(&crt, "example.com", "tok", "digest")
            .await
            .unwrap_err();
        assert!(err.is_misconfiguration());
    }
}
