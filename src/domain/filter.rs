//! Filter - Listing Predicates
//!
//! Filters travel to the backend in its object form (`{"key": "name", "like": "abc"}`,
//! `{"and": [...]}`) but are held as a closed sum type on this side so every
//! consumer has to handle each operator.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single listing predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FilterRepr", into = "FilterRepr")]
pub enum Filter {
    /// Field equals the value
    Eq { key: String, value: Value },
    /// Field contains the text, case-insensitive
    Like { key: String, value: String },
    /// Field starts with the text
    StartsWith { key: String, value: String },
    /// Field ends with the text
    EndsWith { key: String, value: String },
    /// Field equals one of the values
    In { key: String, values: Vec<Value> },
    /// Field lies within the inclusive bounds
    Range {
        key: String,
        gte: Option<Value>,
        lte: Option<Value>,
    },
    /// Every nested filter matches
    And(Vec<Filter>),
    /// At least one nested filter matches
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn like(key: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Like {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn starts_with(key: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::StartsWith {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn ends_with(key: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::EndsWith {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn one_of(key: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Filter::In {
            key: key.into(),
            values: values.into_iter().collect(),
        }
    }

    pub fn range(key: impl Into<String>, gte: Option<Value>, lte: Option<Value>) -> Self {
        Filter::Range {
            key: key.into(),
            gte,
            lte,
        }
    }

    /// Key the filter applies to; `None` for compound filters
    pub fn key(&self) -> Option<&str> {
        match self {
            Filter::Eq { key, .. }
            | Filter::Like { key, .. }
            | Filter::StartsWith { key, .. }
            | Filter::EndsWith { key, .. }
            | Filter::In { key, .. }
            | Filter::Range { key, .. } => Some(key),
            Filter::And(_) | Filter::Or(_) => None,
        }
    }

    /// Evaluate the filter against a JSON row
    ///
    /// Keys are dotted paths into nested objects. A missing field never matches.
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::And(filters) => filters.iter().all(|f| f.matches(row)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(row)),
            Filter::Eq { key, value } => lookup(row, key).is_some_and(|v| values_equal(v, value)),
            Filter::In { key, values } => {
                lookup(row, key).is_some_and(|v| values.iter().any(|c| values_equal(v, c)))
            }
            Filter::Like { key, value } => lookup_text(row, key)
                .is_some_and(|text| text.to_lowercase().contains(&value.to_lowercase())),
            Filter::StartsWith { key, value } => {
                lookup_text(row, key).is_some_and(|text| text.starts_with(value.as_str()))
            }
            Filter::EndsWith { key, value } => {
                lookup_text(row, key).is_some_and(|text| text.ends_with(value.as_str()))
            }
            Filter::Range { key, gte, lte } => lookup(row, key).is_some_and(|v| {
                let above = gte
                    .as_ref()
                    .is_none_or(|min| compare(v, min).is_some_and(|o| o != Ordering::Less));
                let below = lte
                    .as_ref()
                    .is_none_or(|max| compare(v, max).is_some_and(|o| o != Ordering::Greater));
                above && below
            }),
        }
    }
}

/// Resolve a dotted key path inside a JSON value
pub(crate) fn lookup<'a>(row: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(row, |value, part| value.get(part))
}

/// Render a scalar field as text; objects, arrays and null yield `None`
pub(crate) fn lookup_text(row: &Value, key: &str) -> Option<String> {
    match lookup(row, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64() == r.as_f64(),
        _ => left == right,
    }
}

pub(crate) fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Backend object form of a filter
#[derive(Debug, Default, Serialize, Deserialize)]
struct FilterRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    eq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    like: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    starts_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ends_with: Option<String>,
    #[serde(default, rename = "in", skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    and: Option<Vec<Filter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    or: Option<Vec<Filter>>,
}

impl TryFrom<FilterRepr> for Filter {
    type Error = String;

    fn try_from(repr: FilterRepr) -> Result<Self, Self::Error> {
        let FilterRepr {
            key,
            eq,
            like,
            starts_with,
            ends_with,
            values,
            gte,
            lte,
            and,
            or,
        } = repr;

        let operators = [
            eq.is_some(),
            like.is_some(),
            starts_with.is_some(),
            ends_with.is_some(),
            values.is_some(),
            gte.is_some() || lte.is_some(),
            and.is_some(),
            or.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        if operators != 1 {
            return Err(format!(
                "filter must carry exactly one operator, found {operators}"
            ));
        }

        if let Some(filters) = and {
            return Ok(Filter::And(filters));
        }
        if let Some(filters) = or {
            return Ok(Filter::Or(filters));
        }

        let key = key.ok_or_else(|| "filter operator requires a key".to_string())?;

        let filter = if let Some(value) = eq {
            Filter::Eq { key, value }
        } else if let Some(value) = like {
            Filter::Like { key, value }
        } else if let Some(value) = starts_with {
            Filter::StartsWith { key, value }
        } else if let Some(value) = ends_with {
            Filter::EndsWith { key, value }
        } else if let Some(values) = values {
            Filter::In { key, values }
        } else {
            Filter::Range { key, gte, lte }
        };

        Ok(filter)
    }
}

impl From<Filter> for FilterRepr {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Eq { key, value } => FilterRepr {
                key: Some(key),
                eq: Some(value),
                ..Default::default()
            },
            Filter::Like { key, value } => FilterRepr {
                key: Some(key),
                like: Some(value),
                ..Default::default()
            },
            Filter::StartsWith { key, value } => FilterRepr {
                key: Some(key),
                starts_with: Some(value),
                ..Default::default()
            },
            Filter::EndsWith { key, value } => FilterRepr {
                key: Some(key),
                ends_with: Some(value),
                ..Default::default()
            },
            Filter::In { key, values } => FilterRepr {
                key: Some(key),
                values: Some(values),
                ..Default::default()
            },
            Filter::Range { key, gte, lte } => FilterRepr {
                key: Some(key),
                gte,
                lte,
                ..Default::default()
            },
            Filter::And(filters) => FilterRepr {
                and: Some(filters),
                ..Default::default()
            },
            Filter::Or(filters) => FilterRepr {
                or: Some(filters),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_like_filter() {
        let filter: Filter =
            serde_json::from_value(json!({"key": "name", "like": "abc"})).expect("decode");
        assert_eq!(filter, Filter::like("name", "abc"));
    }

    #[test]
    fn test_decode_compound_filter() {
        let filter: Filter = serde_json::from_value(json!({
            "or": [
                {"key": "state", "eq": "RUNNING"},
                {"key": "cpus", "gte": 4, "lte": 16}
            ]
        }))
        .expect("decode");

        assert_eq!(
            filter,
            Filter::Or(vec![
                Filter::eq("state", "RUNNING"),
                Filter::range("cpus", Some(json!(4)), Some(json!(16))),
            ])
        );
    }

    #[test]
    fn test_decode_rejects_ambiguous_or_empty_filter() {
        let both = serde_json::from_value::<Filter>(json!({"key": "a", "eq": 1, "like": "x"}));
        assert!(both.is_err());

        let none = serde_json::from_value::<Filter>(json!({"key": "a"}));
        assert!(none.is_err());

        let missing_key = serde_json::from_value::<Filter>(json!({"like": "x"}));
        assert!(missing_key.is_err());
    }

    #[test]
    fn test_encode_in_filter() {
        let filter = Filter::one_of("queue", [json!("normal"), json!("high")]);
        let value = serde_json::to_value(&filter).expect("encode");
        assert_eq!(value, json!({"key": "queue", "in": ["normal", "high"]}));
    }

    #[test]
    fn test_matches_scalar_operators() {
        let row = json!({
            "name": "Genomics-Pipeline",
            "cpus": 8,
            "owner": {"username": "alice"}
        });

        assert!(Filter::like("name", "pipe").matches(&row));
        assert!(Filter::starts_with("name", "Genomics").matches(&row));
        assert!(!Filter::starts_with("name", "genomics").matches(&row));
        assert!(Filter::ends_with("name", "Pipeline").matches(&row));
        assert!(Filter::eq("cpus", 8.0).matches(&row));
        assert!(Filter::eq("owner.username", "alice").matches(&row));
        assert!(!Filter::eq("missing", "alice").matches(&row));
        assert!(Filter::one_of("cpus", [json!(4), json!(8)]).matches(&row));
    }

    #[test]
    fn test_matches_range_and_compound() {
        let row = json!({"cpus": 8, "created_on": "2024-05-01T00:00:00Z"});

        assert!(Filter::range("cpus", Some(json!(8)), None).matches(&row));
        assert!(!Filter::range("cpus", None, Some(json!(4))).matches(&row));
        assert!(
            Filter::range(
                "created_on",
                Some(json!("2024-01-01T00:00:00Z")),
                Some(json!("2024-12-31T00:00:00Z"))
            )
            .matches(&row)
        );
        // mismatched types never compare
        assert!(!Filter::range("cpus", Some(json!("4")), None).matches(&row));

        let both = Filter::And(vec![
            Filter::eq("cpus", 8),
            Filter::like("created_on", "2024"),
        ]);
        assert!(both.matches(&row));

        let either = Filter::Or(vec![Filter::eq("cpus", 1), Filter::eq("cpus", 2)]);
        assert!(!either.matches(&row));
    }
}
