// Mock ACME client and solver

use async_trait::async_trait;
use ferrocert_acme::{
    AccountThumbprint, AcmeClient, AcmeError, Authorization, Challenge, ChallengeType, Order,
    OrderCreate, Result as AcmeResult, Status,
};
use ferrocert_issuer::{Certificate, ClientSource, Solver, SolverError, SolverResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::fixtures;

/// Thumbprint the mock client derives proofs from
pub const MOCK_THUMBPRINT: &str = "mock-thumbprint";

/// A call received by [`MockAcmeClient`], with its main argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    GetClient,
    GetOrder(String),
    CreateOrder(Vec<String>),
    GetAuthorization(String),
    AcceptChallenge(String),
    WaitAuthorization(String),
}

impl ClientCall {
    /// Operation this call was made to
    pub fn op(&self) -> ClientOp {
        match self {
            ClientCall::GetClient => ClientOp::GetClient,
            ClientCall::GetOrder(_) => ClientOp::GetOrder,
            ClientCall::CreateOrder(_) => ClientOp::CreateOrder,
            ClientCall::GetAuthorization(_) => ClientOp::GetAuthorization,
            ClientCall::AcceptChallenge(_) => ClientOp::AcceptChallenge,
            ClientCall::WaitAuthorization(_) => ClientOp::WaitAuthorization,
        }
    }
}

/// Client operations, used to count calls and inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientOp {
    GetClient,
    GetOrder,
    CreateOrder,
    GetAuthorization,
    AcceptChallenge,
    WaitAuthorization,
}

#[derive(Debug, Default)]
struct ClientState {
    orders: HashMap<String, Order>,
    authorizations: HashMap<String, Authorization>,
    settle_as: HashMap<String, Status>,
    failing: HashSet<ClientOp>,
    calls: Vec<ClientCall>,
    created: usize,
}

/// In-memory ACME server stand-in
///
/// Orders created through it get one pending authorization per domain,
/// offering the configured challenge types. Waiting on an authorization
/// settles it as valid unless told otherwise with [`settle_as`](Self::settle_as).
#[derive(Debug, Clone)]
pub struct MockAcmeClient {
    state: Arc<Mutex<ClientState>>,
    offered: Vec<ChallengeType>,
    thumbprint: AccountThumbprint,
}

impl MockAcmeClient {
    /// Create a client offering HTTP-01 then DNS-01 on new orders
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClientState::default())),
            offered: vec![ChallengeType::Http01, ChallengeType::Dns01],
            thumbprint: AccountThumbprint::new(MOCK_THUMBPRINT),
        }
    }

    /// Challenge types offered on authorizations of new orders, in order
    pub fn with_offered(mut self, offered: Vec<ChallengeType>) -> Self {
        self.offered = offered;
        self
    }

    /// Add an existing order
    pub fn with_order(self, order: Order) -> Self {
        self.insert_order(order);
        self
    }

    /// Add an existing authorization
    pub fn with_authorization(self, authorization: Authorization) -> Self {
        self.insert_authorization(authorization);
        self
    }

    /// Add or replace an order
    pub fn insert_order(&self, order: Order) {
        self.state.lock().orders.insert(order.url.clone(), order);
    }

    /// Add or replace an authorization
    pub fn insert_authorization(&self, authorization: Authorization) {
        self.state
            .lock()
            .authorizations
            .insert(authorization.url.clone(), authorization);
    }

    /// Status an authorization reaches when waited on
    pub fn settle_as(&self, authorization_url: &str, status: Status) {
        self.state
            .lock()
            .settle_as
            .insert(authorization_url.to_string(), status);
    }

    /// Make every call to `op` fail with a transport error
    pub fn fail(&self, op: ClientOp) {
        self.state.lock().failing.insert(op);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ClientCall> {
        self.state.lock().calls.clone()
    }

    /// Get the number of calls to an operation
    pub fn call_count(&self, op: ClientOp) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.op() == op)
            .count()
    }

    /// Clear all recorded calls
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Current state of an order
    pub fn order(&self, url: &str) -> Option<Order> {
        self.state.lock().orders.get(url).cloned()
    }

    /// Current state of an authorization
    pub fn authorization(&self, url: &str) -> Option<Authorization> {
        self.state.lock().authorizations.get(url).cloned()
    }

    /// Thumbprint proofs are derived from
    pub fn thumbprint(&self) -> &AccountThumbprint {
        &self.thumbprint
    }

    fn record(&self, call: ClientCall) -> AcmeResult<()> {
        let op = call.op();
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(AcmeError::Transport(format!("mock {:?} failure", op)));
        }
        Ok(())
    }
}

impl Default for MockAcmeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientSource for MockAcmeClient {
    async fn client(&self) -> AcmeResult<Arc<dyn AcmeClient>> {
        self.record(ClientCall::GetClient)?;
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl AcmeClient for MockAcmeClient {
    async fn get_order(&self, url: &str) -> AcmeResult<Order> {
        self.record(ClientCall::GetOrder(url.to_string()))?;
        self.order(url)
            .ok_or_else(|| AcmeError::NotFound(format!("order {}", url)))
    }

    async fn create_order(&self, request: &OrderCreate) -> AcmeResult<Order> {
        let domains = request.domains();
        self.record(ClientCall::CreateOrder(domains.clone()))?;

        let mut state = self.state.lock();
        state.created += 1;
        let sequence = state.created;
        let order_url = format!("https://acme.test/order/{}", sequence);

        let mut authorization_urls = Vec::with_capacity(domains.len());
        for domain in &domains {
            let authorization_url = format!("{}/authz/{}", order_url, domain);
            let challenges = self
                .offered
                .iter()
                .map(|challenge_type| {
                    fixtures::challenge(
                        *challenge_type,
                        &format!("{}-{}-{}", challenge_type, sequence, domain),
                    )
                })
                .collect();
            let authorization =
                fixtures::authorization(&authorization_url, domain, Status::Pending, challenges);

            state
                .authorizations
                .insert(authorization_url.clone(), authorization);
            authorization_urls.push(authorization_url);
        }

        let order = Order {
            url: order_url.clone(),
            status: Status::Pending,
            expires: None,
            identifiers: request.identifiers.clone(),
            authorizations: authorization_urls,
            finalize: format!("{}/finalize", order_url),
            certificate: None,
        };
        state.orders.insert(order_url, order.clone());
        Ok(order)
    }

    async fn get_authorization(&self, url: &str) -> AcmeResult<Authorization> {
        self.record(ClientCall::GetAuthorization(url.to_string()))?;
        self.authorization(url)
            .ok_or_else(|| AcmeError::NotFound(format!("authorization {}", url)))
    }

    async fn accept_challenge(&self, challenge: &Challenge) -> AcmeResult<Challenge> {
        self.record(ClientCall::AcceptChallenge(challenge.url.clone()))?;
        let mut accepted = challenge.clone();
        accepted.status = Status::Processing;
        Ok(accepted)
    }

    async fn wait_authorization(&self, url: &str) -> AcmeResult<Authorization> {
        self.record(ClientCall::WaitAuthorization(url.to_string()))?;

        let mut state = self.state.lock();
        let settled = state.settle_as.get(url).copied().unwrap_or(Status::Valid);
        let authorization = state
            .authorizations
            .get_mut(url)
            .ok_or_else(|| AcmeError::NotFound(format!("authorization {}", url)))?;
        authorization.status = settled;
        Ok(authorization.clone())
    }

    fn http01_challenge_response(&self, token: &str) -> AcmeResult<String> {
        Ok(self.thumbprint.http01_response(token))
    }

    fn dns01_challenge_record(&self, token: &str) -> AcmeResult<String> {
        Ok(self.thumbprint.dns01_record(token))
    }
}

/// Solver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverOp {
    Present,
    Check,
    CleanUp,
}

/// A call received by [`MockSolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverCall {
    pub op: SolverOp,
    pub domain: String,
    pub token: String,
    pub key: String,
}

#[derive(Debug, Default)]
struct SolverState {
    calls: Vec<SolverCall>,
    presented: HashSet<(String, String)>,
    not_ready: HashSet<String>,
    failing: HashSet<SolverOp>,
}

/// Solver that records calls and tracks what is currently presented
///
/// Self-checks pass unless the domain was marked with
/// [`not_ready`](Self::not_ready).
#[derive(Debug, Clone, Default)]
pub struct MockSolver {
    state: Arc<Mutex<SolverState>>,
}

impl MockSolver {
    /// Create a new mock solver
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the self-check fail for a domain
    pub fn not_ready(&self, domain: &str) {
        self.state.lock().not_ready.insert(domain.to_string());
    }

    /// Make the self-check pass for a domain again
    pub fn ready(&self, domain: &str) {
        self.state.lock().not_ready.remove(domain);
    }

    /// Make every call to `op` fail
    pub fn fail(&self, op: SolverOp) {
        self.state.lock().failing.insert(op);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SolverCall> {
        self.state.lock().calls.clone()
    }

    /// Domains passed to `op`, in call order
    pub fn domains_for(&self, op: SolverOp) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.op == op)
            .map(|call| call.domain.clone())
            .collect()
    }

    /// Whether a (domain, token) pair is currently presented
    pub fn is_presented(&self, domain: &str, token: &str) -> bool {
        self.state
            .lock()
            .presented
            .contains(&(domain.to_string(), token.to_string()))
    }

    /// Number of currently presented challenges
    pub fn presented_count(&self) -> usize {
        self.state.lock().presented.len()
    }

    /// Clear all recorded calls
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn record(&self, op: SolverOp, domain: &str, token: &str, key: &str) -> SolverResult<()> {
        let mut state = self.state.lock();
        state.calls.push(SolverCall {
            op,
            domain: domain.to_string(),
            token: token.to_string(),
            key: key.to_string(),
        });
        if state.failing.contains(&op) {
            return Err(SolverError::DnsProvider {
                provider: "mock".to_string(),
                message: format!("{:?} failed for {}", op, domain),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Solver for MockSolver {
    async fn present(
        &self,
        _crt: &Certificate,
        domain: &str,
        token: &str,
        key: &str,
    ) -> SolverResult<()> {
        self.record(SolverOp::Present, domain, token, key)?;
        self.state
            .lock()
            .presented
            .insert((domain.to_string(), token.to_string()));
        Ok(())
    }

    async fn check(&self, domain: &str, token: &str, key: &str) -> SolverResult<bool> {
        self.record(SolverOp::Check, domain, token, key)?;
        Ok(!self.state.lock().not_ready.contains(domain))
    }

    async fn clean_up(
        &self,
        _crt: &Certificate,
        domain: &str,
        token: &str,
        key: &str,
    ) -> SolverResult<()> {
        self.record(SolverOp::CleanUp, domain, token, key)?;
        self.state
            .lock()
            .presented
            .remove(&(domain.to_string(), token.to_string()));
        Ok(())
    }
}
