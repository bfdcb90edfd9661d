//! Per-pass context handed to every orchestration step

use crate::config::AcmeIssuerConfig;
use crate::error::{PrepareError, Result};
use crate::solver::SolverRegistry;
use ferrocert_acme::AcmeClient;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Everything a prepare pass depends on besides the certificate itself
#[derive(Clone, Copy)]
pub struct PrepareContext<'a> {
    /// ACME protocol client
    pub client: &'a dyn AcmeClient,
    /// ACME settings of the issuer
    pub issuer: &'a AcmeIssuerConfig,
    /// Solver per challenge type
    pub solvers: &'a SolverRegistry,
    /// Cancels the pass
    pub cancel: &'a CancellationToken,
}

impl<'a> PrepareContext<'a> {
    pub fn new(
        client: &'a dyn AcmeClient,
        issuer: &'a AcmeIssuerConfig,
        solvers: &'a SolverRegistry,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            issuer,
            solvers,
            cancel,
        }
    }

    /// Run a remote call, giving up with [`PrepareError::Cancelled`] as soon
    /// as the pass is cancelled
    pub async fn guard<T, E, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Into<PrepareError>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PrepareError::Cancelled),
            result = call => result.map_err(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrocert_acme::AcmeError;

    #[tokio::test]
    async fn test_guard_propagates_result() {
        let cancel = CancellationToken::new();
        let registry = SolverRegistry::default();
        let issuer = AcmeIssuerConfig::new("https://acme.test/directory", "a@example.com");
        let client = NoClient;
        let ctx = PrepareContext::new(&client, &issuer, &registry, &cancel);

        let ok: Result<u32> = ctx.guard(async { Ok::<_, AcmeError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32> = ctx
            .guard(async { Err(AcmeError::Transport("reset".to_string())) })
            .await;
        assert!(matches!(err, Err(PrepareError::Acme(_))));
    }

    #[tokio::test]
    async fn test_guard_stops_on_cancellation() {
        let cancel = CancellationToken::new();
        let registry = SolverRegistry::default();
        let issuer = AcmeIssuerConfig::new("https://acme.test/directory", "a@example.com");
        let client = NoClient;
        let ctx = PrepareContext::new(&client, &issuer, &registry, &cancel);

        cancel.cancel();
        let result: Result<()> = ctx
            .guard(std::future::pending::<std::result::Result<(), AcmeError>>())
            .await;
        assert!(matches!(result, Err(PrepareError::Cancelled)));
    }

    struct NoClient;

    #[async_trait::async_trait]
    impl AcmeClient for NoClient {
        async fn get_order(&self, url: &str) -> ferrocert_acme::Result<ferrocert_acme::Order> {
            Err(AcmeError::NotFound(url.to_string()))
        }

        async fn create_order(
            &self,
            _order: &ferrocert_acme::OrderCreate,
        ) -> ferrocert_acme::Result<ferrocert_acme::Order> {
            Err(AcmeError::Internal("unused".to_string()))
        }

        async fn get_authorization(
            &self,
            url: &str,
        ) -> ferrocert_acme::Result<ferrocert_acme::Authorization> {
            Err(AcmeError::NotFound(url.to_string()))
        }

        async fn accept_challenge(
            &self,
            challenge: &ferrocert_acme::Challenge,
        ) -> ferrocert_acme::Result<ferrocert_acme::Challenge> {
            Ok(challenge.clone())
        }

        async fn wait_authorization(
            &self,
            url: &str,
        ) -> ferrocert_acme::Result<ferrocert_acme::Authorization> {
            Err(AcmeError::NotFound(url.to_string()))
        }

        fn http01_challenge_response(&self, token: &str) -> ferrocert_acme::Result<String> {
            Ok(token.to_string())
        }

        fn dns01_challenge_record(&self, token: &str) -> ferrocert_acme::Result<String> {
            Ok(token.to_string())
        }
    }
}
