// Fixture builders for ACME resources and issuer configuration

use ferrocert_acme::{Authorization, Challenge, ChallengeType, Identifier, Order, Status};
use ferrocert_issuer::{AcmeIssuerConfig, Certificate, DomainSolverConfig, IssuerConfig};

/// ACME directory URL used by fixtures
pub const TEST_SERVER: &str = "https://acme.test/directory";

/// DNS provider name enabled by [`issuer_config`]
pub const TEST_DNS_PROVIDER: &str = "mock-dns";

/// Pending challenge of the given type
pub fn challenge(challenge_type: ChallengeType, token: &str) -> Challenge {
    Challenge {
        challenge_type: challenge_type.as_str().to_string(),
        url: format!("https://acme.test/chall/{}", token),
        status: Status::Pending,
        token: token.to_string(),
        validated: None,
        error: None,
    }
}

/// Authorization for a DNS identifier
pub fn authorization(
    url: &str,
    domain: &str,
    status: Status,
    challenges: Vec<Challenge>,
) -> Authorization {
    Authorization {
        url: url.to_string(),
        identifier: Identifier::dns(domain),
        status,
        expires: None,
        challenges,
        wildcard: domain.starts_with("*.").then_some(true),
    }
}

/// Authorization offering HTTP-01 then DNS-01, at `https://acme.test/authz/<domain>`
pub fn offered_authorization(domain: &str, status: Status) -> Authorization {
    authorization(
        &format!("https://acme.test/authz/{}", domain),
        domain,
        status,
        vec![
            challenge(ChallengeType::Http01, &format!("{}-http", domain)),
            challenge(ChallengeType::Dns01, &format!("{}-dns", domain)),
        ],
    )
}

/// Order over `domains` with the given authorization URLs
pub fn order(url: &str, status: Status, domains: &[&str], authorizations: &[&str]) -> Order {
    Order {
        url: url.to_string(),
        status,
        expires: None,
        identifiers: domains.iter().map(|d| Identifier::dns(*d)).collect(),
        authorizations: authorizations.iter().map(|a| a.to_string()).collect(),
        finalize: format!("{}/finalize", url),
        certificate: None,
    }
}

/// Issuer enabling HTTP-01 and DNS-01 through [`TEST_DNS_PROVIDER`]
pub fn issuer_config() -> IssuerConfig {
    IssuerConfig {
        name: "test-issuer".to_string(),
        acme: AcmeIssuerConfig::new(TEST_SERVER, "admin@example.com")
            .with_http01()
            .with_dns01([TEST_DNS_PROVIDER]),
    }
}

/// Certificate validating every domain over HTTP-01
pub fn http01_certificate(name: &str, domains: &[&str]) -> Certificate {
    Certificate::new(name, domains.iter().copied())
        .with_acme(vec![DomainSolverConfig::new(domains.iter().copied()).with_http01()])
}

/// Certificate validating every domain over DNS-01 through [`TEST_DNS_PROVIDER`]
pub fn dns01_certificate(name: &str, domains: &[&str]) -> Certificate {
    Certificate::new(name, domains.iter().copied()).with_acme(vec![
        DomainSolverConfig::new(domains.iter().copied()).with_dns01(TEST_DNS_PROVIDER),
    ])
}
