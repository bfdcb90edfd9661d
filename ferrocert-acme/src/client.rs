/// ACME protocol client capability
use crate::{challenge::*, error::*, order::*};
use async_trait::async_trait;

/// Operations ferrocert needs from an ACME protocol client
///
/// Transport, request signing, nonce handling and account registration live
/// behind this trait. Errors are returned as-is to the caller; no method is
/// expected to retry on its own beyond its transport policy.
///
/// # Example
///
/// ```no_run
/// use ferrocert_acme::{AcmeClient, OrderCreate};
///
/// # async fn example(client: &dyn AcmeClient) -> ferrocert_acme::Result<()> {
/// let order = client.create_order(&OrderCreate::new(["example.com"])).await?;
/// for url in &order.authorizations {
///     let authz = client.get_authorization(url).await?;
///     println!("{} is {}", authz.domain(), authz.status);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait AcmeClient: Send + Sync {
    /// Fetch an existing order by URL
    async fn get_order(&self, url: &str) -> Result<Order>;

    /// Create a new order; the returned order carries its URL
    async fn create_order(&self, order: &OrderCreate) -> Result<Order>;

    /// Fetch an authorization by URL; the returned authorization carries its URL
    async fn get_authorization(&self, url: &str) -> Result<Authorization>;

    /// Tell the server the challenge is ready to be validated
    async fn accept_challenge(&self, challenge: &Challenge) -> Result<Challenge>;

    /// Poll the authorization until the server reports a final status
    async fn wait_authorization(&self, url: &str) -> Result<Authorization>;

    /// Body to serve for an HTTP-01 challenge token
    fn http01_challenge_response(&self, token: &str) -> Result<String>;

    /// TXT record value for a DNS-01 challenge token
    fn dns01_challenge_record(&self, token: &str) -> Result<String>;
}
