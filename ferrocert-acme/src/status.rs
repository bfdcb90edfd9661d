/// Status shared by ACME orders, authorizations and challenges
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource status as reported by the ACME server
///
/// Any value the server sends that is not listed here decodes as
/// [`Status::Unknown`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    /// Resource is waiting on the client
    Pending,
    /// Server is working on the resource
    Processing,
    /// Resource completed successfully
    Valid,
    /// Resource failed
    Invalid,
    /// Resource was deactivated by the client
    Deactivated,
    /// Resource was revoked by the server
    Revoked,
    /// Status not recognised
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Processing => "processing",
            Status::Valid => "valid",
            Status::Invalid => "invalid",
            Status::Deactivated => "deactivated",
            Status::Revoked => "revoked",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&Status::Deactivated).unwrap();
        assert_eq!(json, "\"deactivated\"");
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        let status: Status = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(status, Status::Unknown);
    }

    #[test]
    fn test_display_matches_wire_value() {
        assert_eq!(Status::Processing.to_string(), "processing");
        assert_eq!(Status::Unknown.to_string(), "unknown");
    }
}
