use chrono::DateTime;
use serde_json::Value;
use std::cmp::Ordering;

/// A condition on one top-level field of a document.
///
/// Range filters compare numbers numerically and RFC 3339 strings as instants; any other pair
/// of values is unordered and never matches a range filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    Gte { field: String, value: Value },
    Lte { field: String, value: Value },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        let (field, expected) = match self {
            Filter::Eq { field, value }
            | Filter::Gte { field, value }
            | Filter::Lte { field, value } => (field, value),
        };
        let Some(actual) = document.get(field.as_str()) else {
            return false;
        };

        match self {
            Filter::Eq { .. } => actual == expected,
            Filter::Gte { .. } => matches!(
                compare(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Filter::Lte { .. } => matches!(
                compare(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }

    pub fn matches_all(filters: &[Filter], document: &Value) -> bool {
        filters.iter().all(|filter| filter.matches(document))
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => Some(a.cmp(&b)),
                _ => Some(a.cmp(b)),
            }
        }
        _ => None,
    }
}
