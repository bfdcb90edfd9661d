// ferrocert - ACME domain validation for certificate controllers
//
// This library drives a certificate request through ACME domain validation:
// order reuse, authorization handling, challenge selection, and HTTP-01 and
// DNS-01 solvers.

// Re-export the issuer, which is what most callers need
pub use ferrocert_issuer::*;

// Protocol resources and the client capability
pub use ferrocert_acme as acme;

pub use ferrocert_issuer as issuer;

#[cfg(feature = "testing")]
pub use ferrocert_testing as testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::acme::{AcmeClient, Authorization, Challenge, ChallengeType, Order, Status};
    pub use crate::{
        Acme,
        Certificate,
        ChallengeResponses,
        ClientSource,
        Dns01Solver,
        DnsProvider,
        DomainSolverConfig,
        Http01Solver,
        IssuerConfig,
        PrepareError,
        Solver,
        SolverRegistry,
        TxtLookup,
    };
    pub use tokio_util::sync::CancellationToken;
}
