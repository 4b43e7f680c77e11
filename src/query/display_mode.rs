use super::fields::Field;
use super::state::FilterState;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the log view treats calls that reached a backend endpoint.
///
/// The active mode is carried in the filter state through a sentinel field,
/// so it survives the trip through the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[default]
    All,
    OnlyBackendHits,
    WithoutBackendHits,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [
        DisplayMode::All,
        DisplayMode::OnlyBackendHits,
        DisplayMode::WithoutBackendHits,
    ];

    pub fn sentinel_field(&self) -> Option<Field> {
        match self {
            DisplayMode::All => None,
            DisplayMode::OnlyBackendHits => Some(Field::Exists),
            DisplayMode::WithoutBackendHits => Some(Field::NotExists),
        }
    }

    pub fn sentinel_literal(&self) -> &'static str {
        match self {
            DisplayMode::All => "",
            DisplayMode::OnlyBackendHits | DisplayMode::WithoutBackendHits => "endpoint",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DisplayMode::All => "all",
            DisplayMode::OnlyBackendHits => "only-backend-hits",
            DisplayMode::WithoutBackendHits => "without-backend-hits",
        }
    }

    /// The mode whose sentinel field is present in `state`, or `All`.
    ///
    /// If a hand-written query carries both sentinels, the first mode in
    /// declaration order wins.
    pub fn resolve(state: &FilterState) -> DisplayMode {
        DisplayMode::ALL
            .into_iter()
            .find(|mode| mode.sentinel_field().is_some_and(|f| state.is_present(f)))
            .unwrap_or_default()
    }

    /// Make `self` the active mode of `state`.
    ///
    /// Every other mode's sentinel field is removed first, then this mode's
    /// sentinel is set to its literal.
    pub fn apply(&self, state: &mut FilterState) {
        for other in DisplayMode::ALL.into_iter().filter(|m| m != self) {
            if let Some(field) = other.sentinel_field() {
                state.remove(field);
            }
        }
        if let Some(field) = self.sentinel_field() {
            state.set_values(field, [self.sentinel_literal()]);
        }
    }

    /// Resolve the current mode and drop the sentinels of every other mode.
    ///
    /// The active sentinel field keeps whatever values it already holds.
    pub fn normalize(state: &mut FilterState) -> DisplayMode {
        let mode = DisplayMode::resolve(state);
        for other in DisplayMode::ALL.into_iter().filter(|m| *m != mode) {
            if let Some(field) = other.sentinel_field() {
                state.remove(field);
            }
        }
        mode
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterValue;

    #[test]
    fn test_resolve_defaults_to_all() {
        let mut state = FilterState::new();
        assert_eq!(DisplayMode::resolve(&state), DisplayMode::All);

        state.set_values(Field::Exists, Vec::<String>::new());
        assert_eq!(DisplayMode::resolve(&state), DisplayMode::All);
    }

    #[test]
    fn test_resolve_sentinels() {
        let mut state = FilterState::new();
        state.set_values(Field::NotExists, ["endpoint"]);
        assert_eq!(DisplayMode::resolve(&state), DisplayMode::WithoutBackendHits);

        state.set_values(Field::Exists, ["endpoint"]);
        assert_eq!(DisplayMode::resolve(&state), DisplayMode::OnlyBackendHits);
    }

    #[test]
    fn test_apply_clears_other_sentinels() {
        let mut state = FilterState::new();
        state.set_values(Field::Api, ["a"]);
        DisplayMode::OnlyBackendHits.apply(&mut state);
        assert_eq!(
            state.get(Field::Exists),
            Some(&FilterValue::Sequence(vec!["endpoint".to_string()]))
        );

        DisplayMode::WithoutBackendHits.apply(&mut state);
        assert!(state.get(Field::Exists).is_none());
        assert!(state.is_present(Field::NotExists));

        DisplayMode::All.apply(&mut state);
        assert_eq!(state.fields(), vec![Field::Api]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut state = FilterState::new();
        state.set_values(Field::Exists, ["endpoint"]);
        state.set_values(Field::NotExists, ["endpoint"]);

        let first = DisplayMode::normalize(&mut state);
        let once = state.clone();
        let second = DisplayMode::normalize(&mut state);

        assert_eq!(first, second);
        assert_eq!(state, once);
        assert!(!state.is_present(Field::NotExists));
    }

    #[test]
    fn test_normalize_keeps_active_sentinel_values() {
        let mut state = FilterState::new();
        state.set_values(Field::Exists, ["endpoint", "response"]);
        state.set_values(Field::NotExists, ["endpoint"]);
        state.set_values(Field::Api, ["a"]);

        assert_eq!(DisplayMode::normalize(&mut state), DisplayMode::OnlyBackendHits);
        assert_eq!(
            state.get(Field::Exists),
            Some(&FilterValue::Sequence(vec![
                "endpoint".to_string(),
                "response".to_string()
            ]))
        );
        assert_eq!(state.fields(), vec![Field::Exists, Field::Api]);
    }

    #[test]
    fn test_names() {
        assert_eq!(DisplayMode::OnlyBackendHits.to_string(), "only-backend-hits");
        assert_eq!(
            serde_json::to_string(&DisplayMode::WithoutBackendHits).unwrap(),
            "\"without-backend-hits\""
        );
    }
}
