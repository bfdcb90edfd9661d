/// ACME orders and order creation requests
use crate::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order resource as returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order URL, taken from the `Location` header when the order was created
    #[serde(default)]
    pub url: String,

    /// Order status
    pub status: Status,

    /// When the server drops the order if it is still unfinished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Identifiers the order is bound to
    pub identifiers: Vec<Identifier>,

    /// One authorization URL per identifier
    pub authorizations: Vec<String>,

    /// URL the CSR is posted to once every authorization is valid
    #[serde(default)]
    pub finalize: String,

    /// Issued certificate URL, set once the order is valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

impl Order {
    /// Domain names the order is bound to, in the order the server lists them
    pub fn domains(&self) -> Vec<&str> {
        self.identifiers.iter().map(|id| id.value.as_str()).collect()
    }

    /// Whether the order is bound to exactly the given domain set
    ///
    /// Ordering is ignored; multiplicity is not.
    pub fn is_bound_to(&self, domains: &[String]) -> bool {
        let mut bound = self.domains();
        let mut wanted: Vec<&str> = domains.iter().map(String::as_str).collect();
        bound.sort_unstable();
        wanted.sort_unstable();
        bound == wanted
    }
}

/// Identifier an order or authorization is for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identifier {
    /// Always `dns` for the identifiers ferrocert requests
    #[serde(rename = "type")]
    pub id_type: String,

    /// Domain name, possibly a `*.` wildcard
    pub value: String,
}

impl Identifier {
    /// DNS identifier for a domain
    pub fn dns(domain: impl Into<String>) -> Self {
        Self {
            id_type: "dns".to_string(),
            value: domain.into(),
        }
    }
}

/// Body of a new-order request
#[derive(Debug, Clone, Serialize)]
pub struct OrderCreate {
    /// Identifiers to request
    pub identifiers: Vec<Identifier>,

    /// Requested validity start
    #[serde(rename = "notBefore", skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Requested validity end
    #[serde(rename = "notAfter", skip_serializing_if = "Option::is_none")]
    pub not_after: Option<DateTime<Utc>>,
}

impl OrderCreate {
    /// Request an order covering `domains`, in the given order
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: domains.into_iter().map(Identifier::dns).collect(),
            not_before: None,
            not_after: None,
        }
    }

    /// Request a validity start
    pub fn with_not_before(mut self, timestamp: DateTime<Utc>) -> Self {
        self.not_before = Some(timestamp);
        self
    }

    /// Request a validity end
    pub fn with_not_after(mut self, timestamp: DateTime<Utc>) -> Self {
        self.not_after = Some(timestamp);
        self
    }

    /// Domain names requested by this order
    pub fn domains(&self) -> Vec<String> {
        self.identifiers.iter().map(|id| id.value.clone()).collect()
    }
}
