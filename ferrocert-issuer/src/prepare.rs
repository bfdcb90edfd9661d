//! The prepare pass: drive a certificate's domain validation one step
//! further
//!
//! A pass is stateless apart from the order URL recorded on the certificate
//! and the status condition it may set. It is meant to be called again on
//! the next reconciliation until it returns `Ok(())`, at which point every
//! authorization on the order is valid.
//!
//! Known gap: when a domain is dropped from a certificate whose order still
//! has a presented challenge for it, the pass creates a new order and never
//! cleans up the abandoned challenge.

use crate::authorization::{Partition, cleanup_authorization, fetch_authorizations, partition, solve_pending};
use crate::certificate::Certificate;
use crate::config::IssuerConfig;
use crate::context::PrepareContext;
use crate::error::{ConfigError, PrepareError, Result};
use crate::order::get_or_create_order;
use crate::solver::SolverRegistry;
use async_trait::async_trait;
use ferrocert_acme::AcmeClient;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Source of the ACME client for a pass, typically an account cache
#[async_trait]
pub trait ClientSource: Send + Sync {
    /// Client bound to the issuer's ACME account
    async fn client(&self) -> ferrocert_acme::Result<Arc<dyn AcmeClient>>;
}

#[async_trait]
impl ClientSource for Arc<dyn AcmeClient> {
    async fn client(&self) -> ferrocert_acme::Result<Arc<dyn AcmeClient>> {
        Ok(Arc::clone(self))
    }
}

/// ACME issuer: configuration, solvers and account client
pub struct Acme {
    issuer: IssuerConfig,
    solvers: SolverRegistry,
    clients: Arc<dyn ClientSource>,
}

impl Acme {
    /// Create an issuer after checking its configuration against the solvers
    pub fn new(
        issuer: IssuerConfig,
        solvers: SolverRegistry,
        clients: Arc<dyn ClientSource>,
    ) -> std::result::Result<Self, ConfigError> {
        issuer.validate()?;
        solvers.validate_for(&issuer.acme)?;

        Ok(Self {
            issuer,
            solvers,
            clients,
        })
    }

    /// Issuer configuration
    pub fn issuer(&self) -> &IssuerConfig {
        &self.issuer
    }

    /// Registered solvers
    pub fn solvers(&self) -> &SolverRegistry {
        &self.solvers
    }

    /// Run one prepare pass for `crt`
    ///
    /// Returns `Ok(())` once every authorization on the certificate's order
    /// is valid. On error the certificate's Ready condition is updated for
    /// the errors that carry one (see [`PrepareError::status_condition`]).
    pub async fn prepare(&self, crt: &mut Certificate, cancel: &CancellationToken) -> Result<()> {
        let result = self.prepare_inner(crt, cancel).await;

        if let Err(err) = &result {
            warn!(certificate = %crt.name, issuer = %self.issuer.name, error = %err, "Prepare failed");
            if let Some(update) = err.status_condition() {
                crt.update_status_condition(update);
            }
        }

        result
    }

    async fn prepare_inner(&self, crt: &mut Certificate, cancel: &CancellationToken) -> Result<()> {
        if crt.acme_config().is_none() {
            return Err(PrepareError::MissingConfig);
        }

        debug!(certificate = %crt.name, "Getting ACME client");
        let client = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PrepareError::Cancelled),
            client = self.clients.client() => client?,
        };

        let ctx = PrepareContext::new(client.as_ref(), &self.issuer.acme, &self.solvers, cancel);
        run_pass(&ctx, crt).await
    }
}

/// Order, partition and solve steps of a pass, for a certificate that has
/// ACME configuration
pub async fn run_pass(ctx: &PrepareContext<'_>, crt: &mut Certificate) -> Result<()> {
    let order = get_or_create_order(ctx, crt).await?;

    let authorizations = fetch_authorizations(ctx, &order).await?;
    let Partition {
        failed,
        pending,
        valid,
    } = partition(authorizations);

    info!(
        certificate = %crt.name,
        order_url = %order.url,
        failed = failed.len(),
        pending = pending.len(),
        valid = valid.len(),
        "Partitioned order authorizations"
    );

    for authorization in failed.iter().chain(valid.iter()) {
        cleanup_authorization(ctx, crt, authorization).await?;
    }

    if !failed.is_empty() {
        info!(
            certificate = %crt.name,
            "Found failed authorizations. Cleaning up pending authorizations and clearing order URL"
        );
        for authorization in &pending {
            cleanup_authorization(ctx, crt, authorization).await?;
        }
        crt.clear_order_url();

        return Err(PrepareError::FailedAuthorizations {
            domains: failed.iter().map(|a| a.domain().to_string()).collect(),
        });
    }

    if pending.is_empty() {
        info!(certificate = %crt.name, "No more pending authorizations. Challenge verification complete");
        return Ok(());
    }

    solve_pending(ctx, crt, &pending).await
}
