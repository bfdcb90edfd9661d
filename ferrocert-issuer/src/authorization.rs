//! Authorization coordination: fetch, partition by status, present and
//! accept pending challenges, clean up settled ones

use crate::certificate::Certificate;
use crate::context::PrepareContext;
use crate::error::{PrepareError, Result};
use crate::proof::proof_for;
use crate::selector::challenge_for_authorization;
use crate::solver::{Solver, SolverError};
use ferrocert_acme::{Authorization, Challenge, ChallengeType, Order, Status};
use std::sync::Arc;
use tracing::{debug, info};

/// Authorizations of an order split by status
///
/// Each bucket keeps the order the authorizations were fetched in.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Invalid, deactivated, revoked or unknown
    pub failed: Vec<Authorization>,
    /// Pending or processing
    pub pending: Vec<Authorization>,
    /// Valid
    pub valid: Vec<Authorization>,
}

impl Partition {
    /// Total number of authorizations
    pub fn len(&self) -> usize {
        self.failed.len() + self.pending.len() + self.valid.len()
    }

    /// Whether there are no authorizations at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch every authorization of the order, in order
///
/// The first lookup error aborts the whole batch.
pub async fn fetch_authorizations(
    ctx: &PrepareContext<'_>,
    order: &Order,
) -> Result<Vec<Authorization>> {
    let mut authorizations = Vec::with_capacity(order.authorizations.len());
    for url in &order.authorizations {
        let mut authorization = ctx.guard(ctx.client.get_authorization(url)).await?;
        if authorization.url.is_empty() {
            authorization.url = url.clone();
        }
        authorizations.push(authorization);
    }
    Ok(authorizations)
}

/// Split authorizations into failed, pending and valid
pub fn partition(authorizations: Vec<Authorization>) -> Partition {
    let mut partition = Partition::default();
    for authorization in authorizations {
        match authorization.status {
            Status::Deactivated | Status::Invalid | Status::Revoked | Status::Unknown => {
                partition.failed.push(authorization)
            }
            Status::Pending | Status::Processing => partition.pending.push(authorization),
            Status::Valid => partition.valid.push(authorization),
        }
    }
    partition
}

/// The challenge picked for an authorization, with its proof and solver
///
/// Derived the same way for present, self-check and clean-up, so every step
/// works on the same (domain, token, proof) tuple.
pub struct ChallengeAttempt<'a> {
    pub domain: &'a str,
    pub challenge: &'a Challenge,
    pub challenge_type: ChallengeType,
    pub key: String,
    pub solver: Arc<dyn Solver>,
}

impl<'a> ChallengeAttempt<'a> {
    /// Select the challenge, derive its proof and look up its solver
    pub fn resolve(
        ctx: &PrepareContext<'_>,
        crt: &Certificate,
        authorization: &'a Authorization,
    ) -> Result<Self> {
        let acme = crt.acme_config().ok_or(PrepareError::MissingConfig)?;
        let challenge = challenge_for_authorization(authorization, &acme.config, ctx.issuer)?;
        let challenge_type = challenge.challenge_type.parse::<ChallengeType>()?;
        let key = proof_for(ctx.client, challenge)?;
        let solver = ctx
            .solvers
            .get(challenge_type)
            .cloned()
            .ok_or(PrepareError::NoSolver(challenge_type))?;

        Ok(Self {
            domain: authorization.domain(),
            challenge,
            challenge_type,
            key,
            solver,
        })
    }

    /// Challenge token
    pub fn token(&self) -> &str {
        &self.challenge.token
    }

    fn solver_error(&self, source: SolverError) -> PrepareError {
        PrepareError::Solver {
            domain: self.domain.to_string(),
            challenge_type: self.challenge_type,
            source,
        }
    }

    async fn present(&self, ctx: &PrepareContext<'_>, crt: &Certificate) -> Result<()> {
        ctx.guard(async {
            self.solver
                .present(crt, self.domain, self.token(), &self.key)
                .await
                .map_err(|e| self.solver_error(e))
        })
        .await
    }

    async fn check(&self, ctx: &PrepareContext<'_>) -> Result<bool> {
        ctx.guard(async {
            self.solver
                .check(self.domain, self.token(), &self.key)
                .await
                .map_err(|e| self.solver_error(e))
        })
        .await
    }

    async fn clean_up(&self, ctx: &PrepareContext<'_>, crt: &Certificate) -> Result<()> {
        ctx.guard(async {
            self.solver
                .clean_up(crt, self.domain, self.token(), &self.key)
                .await
                .map_err(|e| self.solver_error(e))
        })
        .await
    }
}

/// Present the challenge for an authorization and run its self-check
///
/// Returns whether the self-check passed, and the challenge that was
/// presented.
pub async fn present_authorization<'a>(
    ctx: &PrepareContext<'_>,
    crt: &Certificate,
    authorization: &'a Authorization,
) -> Result<(bool, &'a Challenge)> {
    let attempt = ChallengeAttempt::resolve(ctx, crt, authorization)?;

    info!(
        domain = %attempt.domain,
        challenge_type = %attempt.challenge_type,
        "Presenting challenge"
    );
    attempt.present(ctx, crt).await?;

    debug!(domain = %attempt.domain, "Performing check to ensure challenge has propagated");
    let ready = attempt.check(ctx).await?;
    Ok((ready, attempt.challenge))
}

/// Tell the server the challenge is ready and wait for the authorization to
/// settle. Anything but a valid authorization is an error.
pub async fn accept_challenge(
    ctx: &PrepareContext<'_>,
    authorization: &Authorization,
    challenge: &Challenge,
) -> Result<()> {
    let domain = authorization.domain();

    info!(domain = %domain, "Accepting challenge");
    ctx.guard(ctx.client.accept_challenge(challenge)).await?;

    info!(domain = %domain, "Waiting for authorization");
    let settled = ctx
        .guard(ctx.client.wait_authorization(&authorization.url))
        .await?;

    if settled.status != Status::Valid {
        return Err(PrepareError::AuthorizationNotValid {
            domain: domain.to_string(),
            status: settled.status,
        });
    }

    info!(domain = %domain, "Successfully authorized domain");
    Ok(())
}

/// Remove whatever was presented for an authorization
///
/// Safe to call when nothing was presented.
pub async fn cleanup_authorization(
    ctx: &PrepareContext<'_>,
    crt: &Certificate,
    authorization: &Authorization,
) -> Result<()> {
    info!(domain = %authorization.domain(), "Cleaning up authorization");
    let attempt = ChallengeAttempt::resolve(ctx, crt, authorization)?;
    attempt.clean_up(ctx, crt).await
}

/// Present, self-check and accept every pending authorization
///
/// Present and accept failures end the pass at once. Self-check failures are
/// collected and reported together, leaving those challenges presented for
/// the next pass.
pub async fn solve_pending(
    ctx: &PrepareContext<'_>,
    crt: &Certificate,
    pending: &[Authorization],
) -> Result<()> {
    let mut failing_self_checks = Vec::new();

    for authorization in pending {
        let (self_check_passed, challenge) = present_authorization(ctx, crt, authorization).await?;

        if self_check_passed {
            info!(domain = %authorization.domain(), "Self check passed");
            accept_challenge(ctx, authorization, challenge).await?;
        } else {
            info!(domain = %authorization.domain(), "Self check failed");
            failing_self_checks.push(authorization.domain().to_string());
        }
    }

    if !failing_self_checks.is_empty() {
        return Err(PrepareError::SelfCheckFailed {
            domains: failing_self_checks,
        });
    }

    Ok(())
}
