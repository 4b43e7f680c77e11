use super::state::FilterState;
use super::transform::encode_value;

const CLAUSE_SEPARATOR: &str = " AND ";

/// Render `state` as a query string.
///
/// Clauses follow the state's insertion order; fields without a non-empty
/// value are skipped.
pub fn encode(state: &FilterState) -> String {
    state
        .present()
        .map(|(field, value)| format!("{}:{}", field.external_token(), encode_value(field, value)))
        .collect::<Vec<_>>()
        .join(CLAUSE_SEPARATOR)
}
