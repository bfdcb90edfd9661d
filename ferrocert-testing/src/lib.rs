//! Testing utilities for ferrocert.
//!
//! ## Features
//!
//! - **MockAcmeClient** - in-memory ACME server stand-in with a call log and failure injection
//! - **MockSolver** - solver that records calls and tracks presented challenges
//! - **Fixtures** - builders for orders, authorizations, certificates and issuer configuration
//!
//! ## Quick Start
//!
//! ```
//! use ferrocert_issuer::{Acme, SolverRegistry};
//! use ferrocert_testing::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let client = MockAcmeClient::new();
//! let solver = MockSolver::new();
//!
//! let mut config = issuer_config();
//! config.acme.dns01 = None;
//! let solvers = SolverRegistry::builder()
//!     .http01(Arc::new(solver.clone()))
//!     .build()
//!     .unwrap();
//! let acme = Acme::new(config, solvers, Arc::new(client.clone())).unwrap();
//!
//! let mut crt = http01_certificate("web", &["example.com"]);
//! acme.prepare(&mut crt, &CancellationToken::new()).await.unwrap();
//!
//! assert_eq!(client.call_count(ClientOp::AcceptChallenge), 1);
//! assert_eq!(solver.domains_for(SolverOp::Present), vec!["example.com"]);
//! # });
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::*;
pub use mock::*;
