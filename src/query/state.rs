use super::fields::Field;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Value held for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl FilterValue {
    /// Build the variant `field` expects.
    ///
    /// Multi-valued fields keep every value in order; scalar fields keep the first.
    pub fn shaped(field: Field, values: Vec<String>) -> Self {
        if field.is_multi_valued() {
            FilterValue::Sequence(values)
        } else {
            FilterValue::Scalar(values.into_iter().next().unwrap_or_default())
        }
    }

    /// Reshape an arbitrary value to the variant `field` expects.
    pub fn reshape(self, field: Field) -> Self {
        match self {
            FilterValue::Scalar(value) => FilterValue::shaped(field, vec![value]),
            FilterValue::Sequence(values) => FilterValue::shaped(field, values),
        }
    }

    /// A value is present if it holds at least one non-blank string.
    pub fn is_present(&self) -> bool {
        match self {
            FilterValue::Scalar(value) => !value.trim().is_empty(),
            FilterValue::Sequence(values) => values.iter().any(|v| !v.trim().is_empty()),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Scalar(value) => f.write_str(value),
            FilterValue::Sequence(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Structured filter state, keyed by canonical field.
///
/// Entries keep the order in which their field was first set. Re-setting a
/// field replaces its value in place, so clause order in encoded output is
/// stable across edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    entries: Vec<(Field, FilterValue)>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&FilterValue> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }

    /// Set `field`, coercing `value` to the shape the field expects.
    pub fn set(&mut self, field: Field, value: FilterValue) {
        let value = value.reshape(field);
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn set_scalar(&mut self, field: Field, value: impl Into<String>) {
        self.set(field, FilterValue::Scalar(value.into()));
    }

    pub fn set_values<I, S>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.set(field, FilterValue::Sequence(values));
    }

    pub fn remove(&mut self, field: Field) -> Option<FilterValue> {
        let idx = self.entries.iter().position(|(f, _)| *f == field)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether `field` holds at least one non-empty value.
    pub fn is_present(&self, field: Field) -> bool {
        self.get(field).is_some_and(FilterValue::is_present)
    }

    /// Whether any field would be emitted by the encoder.
    pub fn has_filters(&self) -> bool {
        self.entries.iter().any(|(_, value)| value.is_present())
    }

    /// All entries in insertion order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FilterValue)> {
        self.entries.iter().map(|(field, value)| (*field, value))
    }

    /// Present entries in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (Field, &FilterValue)> {
        self.iter().filter(|(_, value)| value.is_present())
    }

    pub fn fields(&self) -> Vec<Field> {
        self.entries.iter().map(|(field, _)| *field).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FilterState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            map.serialize_entry(field.canonical_name(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StateVisitor;

        impl<'de> Visitor<'de> for StateVisitor {
            type Value = FilterState;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping canonical field keys to a string or list of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FilterState, A::Error> {
                let mut state = FilterState::new();
                while let Some(key) = access.next_key::<String>()? {
                    let field: Field = key.parse().map_err(<A::Error as de::Error>::custom)?;
                    let value: FilterValue = access.next_value()?;
                    state.set(field, value);
                }
                Ok(state)
            }
        }

        deserializer.deserialize_map(StateVisitor)
    }
}
