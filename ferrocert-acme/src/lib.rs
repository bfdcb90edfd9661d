//! # ferrocert ACME
//!
//! ACME (Automatic Certificate Management Environment) resource model and the
//! protocol client capability consumed by the ferrocert issuer.
//!
//! ## Contents
//!
//! - **Resources** - [`Order`], [`Authorization`] and [`Challenge`] as the server returns them
//! - **Status** - a single [`Status`] enum; unrecognised wire values decode as [`Status::Unknown`]
//! - **Challenge Types** - the closed [`ChallengeType`] set ferrocert can solve (HTTP-01, DNS-01)
//! - **Client Capability** - the [`AcmeClient`] trait implemented by a protocol client
//! - **Key Authorizations** - [`AccountThumbprint`] derives HTTP-01 responses and DNS-01 records
//!
//! ## Deriving proof values
//!
//! ```
//! use ferrocert_acme::AccountThumbprint;
//!
//! let thumbprint = AccountThumbprint::new("account-thumbprint");
//!
//! // Served at /.well-known/acme-challenge/<token>
//! let body = thumbprint.http01_response("token");
//! assert_eq!(body, "token.account-thumbprint");
//!
//! // Published as the TXT record _acme-challenge.<domain>
//! let txt = thumbprint.dns01_record("token");
//! assert_eq!(txt.len(), 43);
//! ```
//!
//! ## Challenge Types
//!
//! ```
//! use ferrocert_acme::{ChallengeType, dns01_record_name, http01_path};
//!
//! assert_eq!("dns-01".parse::<ChallengeType>().unwrap(), ChallengeType::Dns01);
//! assert_eq!(http01_path("abc"), "/.well-known/acme-challenge/abc");
//! assert_eq!(dns01_record_name("*.example.com"), "_acme-challenge.example.com");
//! ```

pub mod challenge;
pub mod client;
pub mod error;
pub mod key;
pub mod order;
pub mod status;

pub use challenge::*;
pub use client::*;
pub use error::*;
pub use key::*;
pub use order::*;
pub use status::*;
