//! # ferrocert issuer
//!
//! Drives ACME domain validation for a certificate request: finds or creates
//! the order, sorts its authorizations by status, presents challenges through
//! pluggable solvers, self-checks them and asks the server to validate.
//!
//! ## Features
//!
//! - **Order Coordination** - resume the recorded order or create a new one
//! - **Authorization Coordination** - partition, present, accept and clean up
//! - **Challenge Selection** - certificate and issuer must both enable a type
//! - **Solvers** - [`Http01Solver`] and [`Dns01Solver`] behind the [`Solver`] trait
//! - **Configuration** - [`IssuerConfig`] from TOML or JSON files
//!
//! Each call to [`Acme::prepare`] is one reconciliation pass. Call it again
//! until it returns `Ok(())`.
//!
//! ## Configuration
//!
//! ```
//! use ferrocert_issuer::IssuerConfig;
//!
//! let config = IssuerConfig::from_toml_str(r#"
//!     name = "letsencrypt"
//!
//!     [acme]
//!     server = "https://acme-v02.api.letsencrypt.org/directory"
//!     email = "admin@example.com"
//!
//!     [acme.http01]
//! "#).unwrap();
//!
//! assert_eq!(config.name, "letsencrypt");
//! assert!(config.acme.http01.is_some());
//! ```
//!
//! ## Running a pass
//!
//! ```no_run
//! use ferrocert_acme::AcmeClient;
//! use ferrocert_issuer::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(client: Arc<dyn AcmeClient>, config: IssuerConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let responses = ChallengeResponses::new();
//! let http01 = Http01Solver::new(responses.clone(), &Http01IssuerConfig::default())?;
//! let solvers = SolverRegistry::builder()
//!     .http01(Arc::new(http01))
//!     .build_for(&config.acme)?;
//!
//! let acme = Acme::new(config, solvers, Arc::new(client))?;
//!
//! let mut crt = Certificate::new("web", ["example.com", "www.example.com"])
//!     .with_acme(vec![DomainSolverConfig::new(["example.com", "www.example.com"]).with_http01()]);
//!
//! match acme.prepare(&mut crt, &CancellationToken::new()).await {
//!     Ok(()) => println!("all domains validated"),
//!     Err(e) if e.is_retryable() => println!("not done yet: {}", e),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod certificate;
pub mod config;
pub mod context;
pub mod error;
pub mod order;
pub mod prepare;
pub mod proof;
pub mod selector;
pub mod solver;

pub use authorization::{Partition, partition};
pub use certificate::*;
pub use config::*;
pub use context::PrepareContext;
pub use error::*;
pub use order::get_or_create_order;
pub use prepare::{Acme, ClientSource, run_pass};
pub use proof::proof_for;
pub use selector::{challenge_for_authorization, pick_challenge_type};
pub use solver::*;
