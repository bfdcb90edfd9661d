//! Proof values for challenges

use crate::error::Result;
use ferrocert_acme::{AcmeClient, Challenge, ChallengeType};

/// Value to present for a challenge: the HTTP-01 response body or the DNS-01
/// TXT record
///
/// Present, self-check and clean-up all derive the proof through this
/// function so an authorization sees the same value throughout.
pub fn proof_for(client: &dyn AcmeClient, challenge: &Challenge) -> Result<String> {
    let proof = match challenge.challenge_type.parse::<ChallengeType>()? {
        ChallengeType::Http01 => client.http01_challenge_response(&challenge.token)?,
        ChallengeType::Dns01 => client.dns01_challenge_record(&challenge.token)?,
    };
    Ok(proof)
}
