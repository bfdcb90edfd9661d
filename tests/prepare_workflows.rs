//! Integration tests for full prepare passes.
//!
//! Each test drives `Acme::prepare` against the in-memory ACME client and a
//! recording solver.

use ferrocert::acme::{ChallengeType, Status};
use ferrocert::prelude::*;
use ferrocert::{ConditionKind, ConditionStatus, MESSAGE_MISSING_CONFIG, Reason};
use ferrocert_testing::*;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn acme(client: &MockAcmeClient, solver: &MockSolver) -> Acme {
    let config = issuer_config();
    let solvers = SolverRegistry::builder()
        .http01(Arc::new(solver.clone()))
        .dns01(Arc::new(solver.clone()))
        .build_for(&config.acme)
        .unwrap();

    Acme::new(config, solvers, Arc::new(client.clone())).unwrap()
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_single_domain_success() {
    init_tracing();
    let client = MockAcmeClient::new().with_offered(vec![ChallengeType::Http01]);
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["example.com"]);

    acme.prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap();

    let order_url = crt.order_url().unwrap().to_string();
    let order = client.order(&order_url).unwrap();
    let authz_url = &order.authorizations[0];
    let challenge_url = client.authorization(authz_url).unwrap().challenges[0].url.clone();

    assert_eq!(
        client.calls(),
        vec![
            ClientCall::GetClient,
            ClientCall::CreateOrder(vec!["example.com".to_string()]),
            ClientCall::GetAuthorization(authz_url.clone()),
            ClientCall::AcceptChallenge(challenge_url),
            ClientCall::WaitAuthorization(authz_url.clone()),
        ]
    );
    assert_eq!(client.authorization(authz_url).unwrap().status, Status::Valid);
    assert_eq!(solver.domains_for(SolverOp::Present), vec!["example.com"]);
    assert_eq!(solver.domains_for(SolverOp::Check), vec!["example.com"]);
    assert!(crt.condition(ConditionKind::Ready).is_none());
}

#[tokio::test]
async fn test_second_pass_cleans_up_valid_authorizations() {
    init_tracing();
    let client = MockAcmeClient::new();
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["example.com", "www.example.com"]);
    let cancel = CancellationToken::new();

    acme.prepare(&mut crt, &cancel).await.unwrap();
    assert_eq!(solver.presented_count(), 2);
    let first_order = crt.order_url().unwrap().to_string();

    client.clear_calls();
    acme.prepare(&mut crt, &cancel).await.unwrap();

    assert_eq!(crt.order_url(), Some(first_order.as_str()));
    assert_eq!(client.call_count(ClientOp::CreateOrder), 0);
    assert_eq!(client.call_count(ClientOp::AcceptChallenge), 0);
    assert_eq!(
        solver.domains_for(SolverOp::CleanUp),
        vec!["example.com", "www.example.com"]
    );
    assert_eq!(solver.presented_count(), 0);
}

// =============================================================================
// Failed authorizations
// =============================================================================

#[tokio::test]
async fn test_failed_authorization_abandons_order() {
    init_tracing();
    let order_url = "https://acme.test/order/existing";
    let x = offered_authorization("x.com", Status::Invalid);
    let y = offered_authorization("y.com", Status::Valid);
    let client = MockAcmeClient::new()
        .with_authorization(x.clone())
        .with_authorization(y.clone())
        .with_order(order(
            order_url,
            Status::Pending,
            &["x.com", "y.com"],
            &[x.url.as_str(), y.url.as_str()],
        ));
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["x.com", "y.com"]);
    crt.set_order_url(order_url);

    let err = acme
        .prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::FailedAuthorizations { .. }));
    assert!(err.to_string().contains("x.com"));
    assert!(!err.to_string().contains("y.com"));
    assert_eq!(solver.domains_for(SolverOp::CleanUp), vec!["x.com", "y.com"]);
    assert!(solver.domains_for(SolverOp::Present).is_empty());
    assert_eq!(crt.order_url(), None);

    let ready = crt.condition(ConditionKind::Ready).unwrap();
    assert_eq!(ready.status, ConditionStatus::False);
    assert_eq!(ready.reason, Reason::CheckAuthorization);
    assert_eq!(ready.message, err.to_string());
}

#[tokio::test]
async fn test_failed_authorization_cleans_up_pending() {
    init_tracing();
    let order_url = "https://acme.test/order/existing";
    let failed = offered_authorization("x.com", Status::Deactivated);
    let pending = offered_authorization("p.com", Status::Pending);
    let client = MockAcmeClient::new()
        .with_authorization(failed.clone())
        .with_authorization(pending.clone())
        .with_order(order(
            order_url,
            Status::Pending,
            &["x.com", "p.com"],
            &[failed.url.as_str(), pending.url.as_str()],
        ));
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["x.com", "p.com"]);
    crt.set_order_url(order_url);

    acme.prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(solver.domains_for(SolverOp::CleanUp), vec!["x.com", "p.com"]);
    assert_eq!(client.call_count(ClientOp::AcceptChallenge), 0);

    // The next pass starts over with a fresh order.
    client.clear_calls();
    acme.prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(client.call_count(ClientOp::GetOrder), 0);
    assert_eq!(client.call_count(ClientOp::CreateOrder), 1);
    assert_ne!(crt.order_url(), Some(order_url));
}

#[tokio::test]
async fn test_cleanup_error_stops_pass_and_keeps_order() {
    init_tracing();
    let order_url = "https://acme.test/order/existing";
    let x = offered_authorization("x.com", Status::Invalid);
    let y = offered_authorization("y.com", Status::Valid);
    let client = MockAcmeClient::new()
        .with_authorization(x.clone())
        .with_authorization(y.clone())
        .with_order(order(
            order_url,
            Status::Pending,
            &["x.com", "y.com"],
            &[x.url.as_str(), y.url.as_str()],
        ));
    let solver = MockSolver::new();
    solver.fail(SolverOp::CleanUp);
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["x.com", "y.com"]);
    crt.set_order_url(order_url);

    let err = acme
        .prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::Solver { ref domain, .. } if domain == "x.com"));
    assert_eq!(solver.domains_for(SolverOp::CleanUp), vec!["x.com"]);
    assert_eq!(crt.order_url(), Some(order_url));
    assert!(crt.status.conditions.is_empty());
}

// =============================================================================
// Pending self-checks
// =============================================================================

#[tokio::test]
async fn test_self_check_pending_leaves_challenge_presented() {
    init_tracing();
    let client = MockAcmeClient::new();
    let solver = MockSolver::new();
    solver.not_ready("z.com");
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["z.com"]);

    let err = acme
        .prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::SelfCheckFailed { ref domains } if domains == &["z.com"]));
    assert!(err.is_retryable());
    assert_eq!(client.call_count(ClientOp::AcceptChallenge), 0);
    assert!(solver.domains_for(SolverOp::CleanUp).is_empty());
    assert_eq!(solver.presented_count(), 1);
    assert!(crt.condition(ConditionKind::Ready).is_none());
    let order_url = crt.order_url().unwrap().to_string();

    // Once the proof propagates the same order completes.
    solver.ready("z.com");
    acme.prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(crt.order_url(), Some(order_url.as_str()));
    assert_eq!(client.call_count(ClientOp::CreateOrder), 1);
    assert_eq!(client.call_count(ClientOp::AcceptChallenge), 1);
}

// =============================================================================
// Configuration and cancellation
// =============================================================================

#[tokio::test]
async fn test_missing_acme_config_sets_condition() {
    init_tracing();
    let client = MockAcmeClient::new();
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = Certificate::new("web", ["example.com"]);

    let err = acme
        .prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::MissingConfig));
    assert!(client.calls().is_empty());

    let ready = crt.condition(ConditionKind::Ready).unwrap();
    assert_eq!(ready.status, ConditionStatus::False);
    assert_eq!(ready.reason, Reason::InvalidConfig);
    assert_eq!(ready.message, MESSAGE_MISSING_CONFIG);
}

#[tokio::test]
async fn test_domain_without_solver_config_fails() {
    init_tracing();
    let client = MockAcmeClient::new();
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = Certificate::new("web", ["a.com", "b.com"])
        .with_acme(vec![DomainSolverConfig::new(["a.com"]).with_http01()]);

    let err = acme
        .prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::NoChallengeType { ref domain } if domain == "b.com"));
    assert!(!err.is_retryable());
    assert!(crt.condition(ConditionKind::Ready).is_none());
}

#[tokio::test]
async fn test_client_error_is_returned() {
    init_tracing();
    let client = MockAcmeClient::new();
    client.fail(ClientOp::GetClient);
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["example.com"]);

    let err = acme
        .prepare(&mut crt, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::Acme(_)));
    assert_eq!(client.calls(), vec![ClientCall::GetClient]);
}

#[tokio::test]
async fn test_cancelled_pass_makes_no_calls() {
    init_tracing();
    let client = MockAcmeClient::new();
    let solver = MockSolver::new();
    let acme = acme(&client, &solver);
    let mut crt = http01_certificate("web", &["example.com"]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = acme.prepare(&mut crt, &cancel).await.unwrap_err();

    assert!(matches!(err, PrepareError::Cancelled));
    assert!(client.calls().is_empty());
    assert!(solver.calls().is_empty());
    assert_eq!(crt.order_url(), None);
}

#[test]
fn test_issuer_rejects_solver_mismatch() {
    let client = MockAcmeClient::new();
    let mut config = issuer_config();
    config.acme.dns01 = None;
    let solvers = SolverRegistry::builder()
        .http01(Arc::new(MockSolver::new()))
        .dns01(Arc::new(MockSolver::new()))
        .build()
        .unwrap();

    assert!(Acme::new(config, solvers, Arc::new(client)).is_err());
}
