use thiserror::Error;

/// Problems found while decoding a query string.
///
/// None of these abort decoding: the offending clause is dropped and the
/// condition is handed to an [`UnknownFieldSink`](super::UnknownFieldSink).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Unknown filter field: '{token}'")]
    UnknownField { token: String },

    #[error("Malformed clause, expected 'field:value': '{segment}'")]
    MalformedClause { segment: String },
}

impl QueryError {
    /// The token reported alongside the message.
    ///
    /// A malformed clause has no field name, so the whole trimmed segment is used.
    pub fn token(&self) -> &str {
        match self {
            QueryError::UnknownField { token } => token,
            QueryError::MalformedClause { segment } => segment,
        }
    }
}
