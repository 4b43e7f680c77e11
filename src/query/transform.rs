//! Per-field value shaping in both directions.

use super::fields::Field;
use super::state::FilterValue;
use regex::Regex;
use std::sync::LazyLock;

/// Reserved characters of the search grammar. `&&` and `||` are escaped as pairs.
static RESERVED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"&&|\|\||[+\-=><!(){}\[\]^"~?:\\/]"#).expect("valid reserved chars regex")
});
static WRAPPING_WILDCARDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\*(.*)\*$").expect("valid wrapping wildcards regex"));

const ESCAPE_PREFIX: &str = r"\\";
const ESCAPED_QUOTE: &str = r#"\""#;

/// Prefix every reserved character in `value` with a backslash pair.
pub fn escape(value: &str) -> String {
    RESERVED_RE
        .replace_all(value, |caps: &regex::Captures| {
            format!("{ESCAPE_PREFIX}{}", &caps[0])
        })
        .into_owned()
}

fn strip_wildcards_and_escapes(value: &str) -> String {
    value.replace('*', "").replace(ESCAPE_PREFIX, "")
}

fn strip_escaped_quotes(value: &str) -> String {
    value.replace(ESCAPED_QUOTE, "")
}

fn first_branch(branches: Vec<String>) -> String {
    branches.into_iter().next().unwrap_or_default()
}

/// Shape the OR-branches of a clause into the value stored for `field`.
pub fn decode_value(field: Field, branches: Vec<String>) -> FilterValue {
    if field.is_multi_valued() {
        let values = branches
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        return FilterValue::Sequence(values);
    }

    let value = first_branch(branches);
    let value = match field {
        Field::Uri | Field::Endpoint => strip_wildcards_and_escapes(&value),
        Field::Body => match WRAPPING_WILDCARDS_RE.captures(&value) {
            Some(caps) => caps[1].to_string(),
            None => value,
        },
        Field::Host => strip_escaped_quotes(&value),
        _ => value,
    };
    FilterValue::Scalar(value)
}

/// Shape the branches of a `path` clause into a `uri` value.
///
/// When an API virtual-host path is bound it is prepended, joined by a single `/`.
pub fn decode_path(branches: Vec<String>, api_path: Option<&str>) -> FilterValue {
    let path = strip_escaped_quotes(&first_branch(branches));
    let value = match api_path {
        Some(base) if !base.is_empty() => {
            let base = base.trim_end_matches('/');
            if path.starts_with('/') {
                format!("{base}{path}")
            } else {
                format!("{base}/{path}")
            }
        }
        _ => path,
    };
    FilterValue::Scalar(value)
}

/// Render the value token for `field`.
///
/// Scalars are shaped per field and escaped. List elements are emitted verbatim
/// so that range literals such as `[0 TO 100]` reach the backend intact; two or
/// more elements are grouped as `(a OR b)`.
pub fn encode_value(field: Field, value: &FilterValue) -> String {
    match value {
        FilterValue::Sequence(values) => {
            let values: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|v| !v.trim().is_empty())
                .collect();
            if values.len() > 1 {
                format!("({})", values.join(" OR "))
            } else {
                values.concat()
            }
        }
        FilterValue::Scalar(value) => encode_scalar(field, value),
    }
}

fn encode_scalar(field: Field, value: &str) -> String {
    match field {
        Field::Uri => {
            let mut token = if value.starts_with('/') {
                escape(value)
            } else {
                escape(&format!("/{value}"))
            };
            if !token.ends_with('*') {
                token.push('*');
            }
            token
        }
        Field::Body => format!("*{}*", escape(value)),
        _ => escape(value),
    }
}
