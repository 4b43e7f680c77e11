use super::display_mode::DisplayMode;
use super::error::QueryError;
use super::fields::{DecodeTarget, Field, resolve_token};
use super::state::FilterState;
use super::transform::{decode_path, decode_value};
use regex::Regex;
use std::sync::LazyLock;

static AND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s+)AND(?:\s+|$)").expect("valid AND separator regex"));
static OR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s+)OR(?:\s+|$)").expect("valid OR separator regex"));
static GROUPING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[()]").expect("valid grouping regex"));

/// The API a query is scoped to, consulted by the `path` decode transform.
pub trait ApiContext {
    /// Path of the API's first virtual host, e.g. `/store`.
    fn first_virtual_host_path(&self) -> Option<&str>;
}

impl ApiContext for String {
    fn first_virtual_host_path(&self) -> Option<&str> {
        Some(self)
    }
}

/// Receiver for clauses the decoder had to drop.
pub trait UnknownFieldSink {
    fn report(&mut self, message: &str, token: &str);
}

impl<F: FnMut(&str, &str)> UnknownFieldSink for F {
    fn report(&mut self, message: &str, token: &str) {
        self(message, token)
    }
}

/// Logs dropped clauses as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl UnknownFieldSink for TracingSink {
    fn report(&mut self, message: &str, token: &str) {
        tracing::warn!(token, "{message}");
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default, Clone)]
pub struct UnknownFieldLog {
    pub reports: Vec<(String, String)>,
}

impl UnknownFieldLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.reports.iter().map(|(_, token)| token.as_str()).collect()
    }
}

impl UnknownFieldSink for UnknownFieldLog {
    fn report(&mut self, message: &str, token: &str) {
        tracing::debug!(token, "{message}");
        self.reports.push((message.to_string(), token.to_string()));
    }
}

/// One `field:value` unit of a query, after OR-splitting its right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub target: DecodeTarget,
    pub raw_values: Vec<String>,
}

impl Clause {
    /// Parse one AND-separated segment.
    ///
    /// Grouping parentheses are removed before anything else, so parentheses
    /// inside a value are lost as well.
    pub fn parse(segment: &str) -> Result<Self, QueryError> {
        let segment = GROUPING_RE.replace_all(segment, "");
        let segment = segment.trim();

        let Some((token, rest)) = segment.split_once(':') else {
            return Err(QueryError::MalformedClause {
                segment: segment.to_string(),
            });
        };
        let token = token.trim();
        let target = resolve_token(token).ok_or_else(|| QueryError::UnknownField {
            token: token.to_string(),
        })?;

        // `api:a OR api:b` repeats the field on every branch.
        let repeated = format!("{token}:");
        let raw_values = OR_RE
            .split(rest)
            .map(|branch| {
                let branch = branch.trim();
                branch.strip_prefix(&repeated).unwrap_or(branch).trim().to_string()
            })
            .collect();

        Ok(Clause { target, raw_values })
    }
}

/// Split a query string into clauses, in order. Blank segments are skipped.
pub fn parse_clauses(query: &str) -> Vec<Result<Clause, QueryError>> {
    AND_RE
        .split(query)
        .filter(|segment| !segment.trim().is_empty())
        .map(Clause::parse)
        .collect()
}

/// Merges query strings into a [`FilterState`].
#[derive(Clone, Copy, Default)]
pub struct Decoder<'a> {
    api: Option<&'a dyn ApiContext>,
}

impl<'a> Decoder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the API context used to prefix `path` clauses.
    pub fn with_api(mut self, api: &'a dyn ApiContext) -> Self {
        self.api = Some(api);
        self
    }

    /// Merge `query` into `state` and return the resulting display mode.
    ///
    /// Fields not mentioned in `query` are left alone; mentioned fields are
    /// overwritten. Unresolvable clauses are reported to `sink` and skipped.
    pub fn decode_into(
        &self,
        state: &mut FilterState,
        query: Option<&str>,
        sink: &mut dyn UnknownFieldSink,
    ) -> DisplayMode {
        let query = query.unwrap_or_default();
        for clause in parse_clauses(query) {
            let clause = match clause {
                Ok(clause) => clause,
                Err(err) => {
                    sink.report(&err.to_string(), err.token());
                    continue;
                }
            };

            match clause.target {
                DecodeTarget::Field(field) => {
                    state.set(field, decode_value(field, clause.raw_values));
                }
                DecodeTarget::Path => {
                    let api_path = self.api.and_then(|api| api.first_virtual_host_path());
                    state.set(Field::Uri, decode_path(clause.raw_values, api_path));
                }
            }
        }

        DisplayMode::resolve(state)
    }

    /// Decode `query` into a fresh state.
    pub fn decode(&self, query: &str, sink: &mut dyn UnknownFieldSink) -> FilterState {
        let mut state = FilterState::new();
        self.decode_into(&mut state, Some(query), sink);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterValue;

    fn seq(values: &[&str]) -> FilterValue {
        FilterValue::Sequence(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_clause_parse_grouped_values() {
        let clause = Clause::parse("method:(GET OR POST)").unwrap();
        assert_eq!(clause.target, DecodeTarget::Field(Field::Method));
        assert_eq!(clause.raw_values, vec!["GET", "POST"]);
    }

    #[test]
    fn test_clause_parse_repeated_field_prefix() {
        let clause = Clause::parse("api:api-1 OR api:api-2").unwrap();
        assert_eq!(clause.raw_values, vec!["api-1", "api-2"]);
    }

    #[test]
    fn test_clause_parse_splits_on_first_colon() {
        let clause = Clause::parse(r"uri:\\/a\\:b*").unwrap();
        assert_eq!(clause.target, DecodeTarget::Field(Field::Uri));
        assert_eq!(clause.raw_values, vec![r"\\/a\\:b*"]);
    }

    #[test]
    fn test_clause_parse_errors() {
        assert_eq!(
            Clause::parse("  no-colon  "),
            Err(QueryError::MalformedClause {
                segment: "no-colon".to_string()
            })
        );
        assert_eq!(
            Clause::parse("bogus:value"),
            Err(QueryError::UnknownField {
                token: "bogus".to_string()
            })
        );
    }

    #[test]
    fn test_and_requires_whole_word() {
        let clauses = parse_clauses("api:BRAND AND plan:ANDROID");
        assert_eq!(clauses.len(), 2);
        let first = clauses[0].as_ref().unwrap();
        assert_eq!(first.raw_values, vec!["BRAND"]);
    }

    #[test]
    fn test_dangling_separators_are_ignored() {
        let mut log = UnknownFieldLog::new();
        let state = Decoder::new().decode("api:a AND", &mut log);
        assert_eq!(state.get(Field::Api), Some(&seq(&["a"])));

        let state = Decoder::new().decode("AND api:a", &mut log);
        assert_eq!(state.get(Field::Api), Some(&seq(&["a"])));

        let state = Decoder::new().decode("method:(GET OR)", &mut log);
        assert_eq!(state.get(Field::Method), Some(&seq(&["GET"])));
        assert!(log.reports.is_empty());
    }

    #[test]
    fn test_decode_merges_into_existing_state() {
        let mut state = FilterState::new();
        state.set_values(Field::Plan, ["gold"]);
        state.set_values(Field::Status, ["500"]);

        let mut log = UnknownFieldLog::new();
        Decoder::new().decode_into(&mut state, Some("status:200 AND api:a"), &mut log);

        assert_eq!(state.fields(), vec![Field::Plan, Field::Status, Field::Api]);
        assert_eq!(state.get(Field::Plan), Some(&seq(&["gold"])));
        assert_eq!(state.get(Field::Status), Some(&seq(&["200"])));
        assert!(log.reports.is_empty());
    }

    #[test]
    fn test_decode_none_is_noop() {
        let mut state = FilterState::new();
        state.set_values(Field::Api, ["a"]);
        let before = state.clone();

        let mut log = UnknownFieldLog::new();
        let mode = Decoder::new().decode_into(&mut state, None, &mut log);
        assert_eq!(state, before);
        assert_eq!(mode, DisplayMode::All);

        Decoder::new().decode_into(&mut state, Some(""), &mut log);
        assert_eq!(state, before);
        assert!(log.reports.is_empty());
    }

    #[test]
    fn test_unknown_clause_does_not_stop_decoding() {
        let mut log = UnknownFieldLog::new();
        let state = Decoder::new().decode("bogus:1 AND garbage AND method:GET", &mut log);
        assert_eq!(state.fields(), vec![Field::Method]);
        assert_eq!(log.tokens(), vec!["bogus", "garbage"]);
    }

    #[test]
    fn test_path_uses_bound_api_context() {
        let api = String::from("/store");
        let mut log = UnknownFieldLog::new();
        let state = Decoder::new()
            .with_api(&api)
            .decode(r#"path:\"/pets\""#, &mut log);
        assert_eq!(
            state.get(Field::Uri),
            Some(&FilterValue::Scalar("/store/pets".to_string()))
        );
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut sink =
            |message: &str, token: &str| seen.push((message.to_string(), token.to_string()));
        Decoder::new().decode("nope:1", &mut sink);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, "nope");
        assert!(seen[0].0.contains("nope"));
    }
}
