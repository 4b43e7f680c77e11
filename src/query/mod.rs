//! Log search query encoding and decoding
//!
//! This module translates between a structured [`FilterState`] and the flat
//! boolean query string understood by the log search backend. The same string
//! is what ends up in a bookmarked URL, so decoding has to accept anything a
//! previous encode produced as well as hand-edited input.
//!
//! # Syntax
//!
//! ```text
//! field:value                       Single clause
//! field:(a OR b)                    Any of several values
//! clause AND clause                 All clauses must match
//! ```
//!
//! `AND` and `OR` are case-sensitive and must be surrounded by whitespace.
//! There is exactly one level of each: no nested groups.
//!
//! # Fields
//!
//! - List fields: `api`, `application`, `plan`, `tenant`, `method`, `status`,
//!   `response-time`, `remote-address`, `_exists_`, `!_exists_`
//! - Single-value fields: `uri`, `_id`, `transaction`, `body`, `endpoint`, `host`
//! - `path` is accepted on decode only and is stored as `uri`
//!
//! # Examples
//!
//! ```text
//! api:api-1 AND method:(GET OR POST)
//! uri:\\/pets* AND status:500
//! response-time:[0 TO 100] AND _exists_:endpoint
//! ```

pub mod decoder;
pub mod display_mode;
pub mod encoder;
pub mod error;
pub mod fields;
pub mod state;
pub mod transform;

pub use decoder::{
    ApiContext, Clause, Decoder, TracingSink, UnknownFieldLog, UnknownFieldSink, parse_clauses,
};
pub use display_mode::DisplayMode;
pub use encoder::encode;
pub use error::QueryError;
pub use fields::{DecodeTarget, Field};
pub use state::{FilterState, FilterValue};
pub use transform::escape;

impl FilterState {
    /// Decode `query` into a fresh state, logging dropped clauses.
    pub fn from_query(query: &str) -> Self {
        Decoder::new().decode(query, &mut TracingSink)
    }

    pub fn to_query(&self) -> String {
        encode(self)
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::resolve(self)
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        mode.apply(self);
    }
}
