/// Key authorizations (RFC 8555 section 8.1)
use crate::error::*;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::digest::{SHA256, digest};

/// Length in bytes of a P-256 affine coordinate
const P256_COORDINATE_LEN: usize = 32;

/// JWK thumbprint of the ACME account key (RFC 7638)
///
/// Client implementations use this to answer
/// [`AcmeClient::http01_challenge_response`](crate::AcmeClient::http01_challenge_response)
/// and [`AcmeClient::dns01_challenge_record`](crate::AcmeClient::dns01_challenge_record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountThumbprint(String);

impl AccountThumbprint {
    /// Wrap an already computed, base64url encoded thumbprint
    pub fn new(thumbprint: impl Into<String>) -> Self {
        Self(thumbprint.into())
    }

    /// Compute the thumbprint of an EC P-256 account key
    ///
    /// `x` and `y` are the base64url encoded affine coordinates, as they
    /// appear in the account JWK.
    pub fn from_p256(x: &str, y: &str) -> Result<Self> {
        for (name, coordinate) in [("x", x), ("y", y)] {
            let decoded = URL_SAFE_NO_PAD.decode(coordinate)?;
            if decoded.len() != P256_COORDINATE_LEN {
                return Err(AcmeError::InvalidKey(format!(
                    "P-256 coordinate {} is {} bytes, expected {}",
                    name,
                    decoded.len(),
                    P256_COORDINATE_LEN
                )));
            }
        }

        // Members in lexicographic order, no whitespace.
        let jwk = format!(r#"{{"crv":"P-256","kty":"EC","x":"{}","y":"{}"}}"#, x, y);
        Ok(Self(sha256_base64url(jwk.as_bytes())))
    }

    /// Thumbprint as base64url text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key authorization for a challenge token
    pub fn key_authorization(&self, token: &str) -> String {
        format!("{}.{}", token, self.0)
    }

    /// Response body for an HTTP-01 challenge
    pub fn http01_response(&self, token: &str) -> String {
        self.key_authorization(token)
    }

    /// TXT record value for a DNS-01 challenge
    pub fn dns01_record(&self, token: &str) -> String {
        sha256_base64url(self.key_authorization(token).as_bytes())
    }
}

fn sha256_base64url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(digest(&SHA256, data).as_ref())
}
