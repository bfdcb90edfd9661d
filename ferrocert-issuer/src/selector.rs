//! Challenge type selection
//!
//! A challenge type is used for a domain only when the certificate enables it
//! for that domain *and* the issuer has it provisioned. Nothing falls back to
//! a mechanism the certificate did not ask for.

use crate::certificate::DomainSolverConfig;
use crate::config::AcmeIssuerConfig;
use crate::error::{PrepareError, Result};
use ferrocert_acme::{Authorization, Challenge, ChallengeType};
use tracing::debug;

/// Pick the challenge type to use for `domain`
///
/// Uses the first configuration entry that names the domain, and within it the
/// first challenge the server offered that both the entry and the issuer
/// enable. Later entries naming the same domain are never consulted, even
/// when one of them would yield a usable type.
pub fn pick_challenge_type(
    domain: &str,
    authorization: &Authorization,
    domain_configs: &[DomainSolverConfig],
    issuer: &AcmeIssuerConfig,
) -> Result<ChallengeType> {
    let entry = domain_configs
        .iter()
        .find(|entry| entry.covers(domain))
        .ok_or_else(|| PrepareError::NoChallengeType {
            domain: domain.to_string(),
        })?;

    authorization
        .challenges
        .iter()
        .filter_map(Challenge::kind)
        .find(|challenge_type| entry.enables(*challenge_type) && issuer.enables(*challenge_type))
        .ok_or_else(|| PrepareError::NoChallengeType {
            domain: domain.to_string(),
        })
}

/// The offered challenge to solve for an authorization
pub fn challenge_for_authorization<'a>(
    authorization: &'a Authorization,
    domain_configs: &[DomainSolverConfig],
    issuer: &AcmeIssuerConfig,
) -> Result<&'a Challenge> {
    let domain = authorization.domain();
    debug!(domain = %domain, "Picking challenge type");

    let challenge_type = pick_challenge_type(domain, authorization, domain_configs, issuer)?;

    let challenge = authorization.challenge(challenge_type).ok_or_else(|| {
        PrepareError::ChallengeNotOffered {
            challenge_type,
            domain: domain.to_string(),
        }
    })?;

    debug!(domain = %domain, challenge_type = %challenge_type, "Picked challenge type");
    Ok(challenge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrocert_acme::{Identifier, Status};

    fn authorization(domain: &str, offered: &[&str]) -> Authorization {
        Authorization {
            url: format!("https://acme.test/authz/{}", domain),
            identifier: Identifier::dns(domain),
            status: Status::Pending,
            expires: None,
            challenges: offered
                .iter()
                .map(|t| Challenge {
                    challenge_type: t.to_string(),
                    url: format!("https://acme.test/chall/{}/{}", domain, t),
                    status: Status::Pending,
                    token: format!("{}-token", t),
                    validated: None,
                    error: None,
                })
                .collect(),
            wildcard: None,
        }
    }

    fn issuer() -> AcmeIssuerConfig {
        AcmeIssuerConfig::new("https://acme.test/directory", "admin@example.com")
    }

    #[test]
    fn test_issuer_disabled_type_is_skipped() {
        let configs = vec![DomainSolverConfig::new(["a.com"]).with_http01()];
        let authz = authorization("a.com", &["dns-01", "http-01"]);

        let picked = pick_challenge_type("a.com", &authz, &configs, &issuer().with_http01());
        assert_eq!(picked.unwrap(), ChallengeType::Http01);
    }

    #[test]
    fn test_domain_disabled_type_is_skipped() {
        let configs = vec![DomainSolverConfig::new(["a.com"]).with_dns01("cloudflare")];
        let authz = authorization("a.com", &["http-01", "dns-01"]);
        let issuer = issuer().with_http01().with_dns01(["cloudflare"]);

        let picked = pick_challenge_type("a.com", &authz, &configs, &issuer);
        assert_eq!(picked.unwrap(), ChallengeType::Dns01);
    }

    #[test]
    fn test_server_offer_order_wins() {
        let configs = vec![
            DomainSolverConfig::new(["a.com"])
                .with_http01()
                .with_dns01("cloudflare"),
        ];
        let authz = authorization("a.com", &["tls-alpn-01", "dns-01", "http-01"]);
        let issuer = issuer().with_http01().with_dns01(["cloudflare"]);

        let picked = pick_challenge_type("a.com", &authz, &configs, &issuer);
        assert_eq!(picked.unwrap(), ChallengeType::Dns01);
    }

    #[test]
    fn test_first_matching_entry_is_used() {
        let configs = vec![
            DomainSolverConfig::new(["a.com"]).with_dns01("cloudflare"),
            DomainSolverConfig::new(["a.com"]).with_http01(),
        ];
        let authz = authorization("a.com", &["http-01"]);

        let result = pick_challenge_type("a.com", &authz, &configs, &issuer().with_http01());
        assert!(matches!(result, Err(PrepareError::NoChallengeType { .. })));
    }

    #[test]
    fn test_unconfigured_domain_fails() {
        let configs = vec![DomainSolverConfig::new(["a.com"]).with_http01()];
        let authz = authorization("b.com", &["http-01"]);

        let err = pick_challenge_type("b.com", &authz, &configs, &issuer().with_http01())
            .unwrap_err();
        assert!(err.to_string().contains("no configured and supported challenge type found"));
        assert!(err.to_string().contains("b.com"));
    }

    #[test]
    fn test_no_overlap_fails() {
        let configs = vec![DomainSolverConfig::new(["a.com"]).with_http01()];
        let authz = authorization("a.com", &["dns-01"]);

        let result = pick_challenge_type("a.com", &authz, &configs, &issuer().with_http01());
        assert!(result.is_err());
    }

    #[test]
    fn test_challenge_for_authorization() {
        let configs = vec![DomainSolverConfig::new(["a.com"]).with_http01()];
        let authz = authorization("a.com", &["dns-01", "http-01"]);

        let challenge =
            challenge_for_authorization(&authz, &configs, &issuer().with_http01()).unwrap();
        assert_eq!(challenge.challenge_type, "http-01");
        assert_eq!(challenge.token, "http-01-token");
    }
}
