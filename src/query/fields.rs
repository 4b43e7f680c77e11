use super::error::QueryError;
use std::fmt;
use std::str::FromStr;

/// Canonical filter fields, the keys of a [`FilterState`](super::FilterState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Api,
    Application,
    Plan,
    Tenant,
    Method,
    Status,
    ResponseTime,
    RemoteAddress,
    Exists,
    NotExists,
    Uri,
    Id,
    Transaction,
    Body,
    Endpoint,
    Host,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Api,
        Field::Application,
        Field::Plan,
        Field::Tenant,
        Field::Method,
        Field::Status,
        Field::ResponseTime,
        Field::RemoteAddress,
        Field::Exists,
        Field::NotExists,
        Field::Uri,
        Field::Id,
        Field::Transaction,
        Field::Body,
        Field::Endpoint,
        Field::Host,
    ];

    /// Get the canonical key of this field
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::Api => "api",
            Field::Application => "application",
            Field::Plan => "plan",
            Field::Tenant => "tenant",
            Field::Method => "method",
            Field::Status => "status",
            Field::ResponseTime => "responseTime",
            Field::RemoteAddress => "remote-address",
            Field::Exists => "_exists_",
            Field::NotExists => "!_exists_",
            Field::Uri => "uri",
            Field::Id => "id",
            Field::Transaction => "transaction",
            Field::Body => "body",
            Field::Endpoint => "endpoint",
            Field::Host => "host",
        }
    }

    /// Whether values of this field are an ordered list rather than a single string.
    pub fn is_multi_valued(&self) -> bool {
        !matches!(
            self,
            Field::Uri
                | Field::Id
                | Field::Transaction
                | Field::Body
                | Field::Endpoint
                | Field::Host
        )
    }

    /// The name this field goes by in the query grammar.
    pub fn external_token(&self) -> &'static str {
        FIELD_ALIASES
            .iter()
            .find(|(field, _)| field == self)
            .map(|(_, token)| *token)
            .unwrap_or_else(|| self.canonical_name())
    }
}

impl FromStr for Field {
    type Err = QueryError;

    /// Parse a canonical key. Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.canonical_name() == s)
            .ok_or_else(|| QueryError::UnknownField {
                token: s.to_string(),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Fields whose external token differs from their canonical key.
const FIELD_ALIASES: [(Field, &str); 2] = [
    (Field::ResponseTime, "response-time"),
    (Field::Id, "_id"),
];

/// Token accepted on decode that feeds `uri` instead of naming a field of its own.
pub const PATH_TOKEN: &str = "path";

/// What a clause's field token decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeTarget {
    Field(Field),
    /// Decode-only alias that materializes into [`Field::Uri`].
    Path,
}

/// Map an external token back to its canonical key.
///
/// Tokens missing from the alias table map to themselves.
pub fn canonical_key(external_token: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(_, token)| *token == external_token)
        .map(|(field, _)| field.canonical_name())
        .unwrap_or(external_token)
}

/// Resolve a clause token to the target it decodes into, if any.
pub fn resolve_token(token: &str) -> Option<DecodeTarget> {
    let key = canonical_key(token);
    if key == PATH_TOKEN {
        return Some(DecodeTarget::Path);
    }
    key.parse().ok().map(DecodeTarget::Field)
}
