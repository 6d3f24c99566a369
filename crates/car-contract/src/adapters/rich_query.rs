//! # Rich Query Matcher
//!
//! Minimal selector evaluation for world-state adapters that have no query
//! index of their own.
//!
//! Supported selector forms:
//!
//! ```text
//! {"selector": {"field": <scalar>}}              implicit equality
//! {"selector": {"field": {"$eq": <scalar>}}}     explicit equality
//! {"selector": {"$and": [{...}, {...}]}}         conjunction
//! ```
//!
//! All top-level predicates are ANDed. Records that are not JSON objects
//! never match.

use crate::errors::StateError;
use serde_json::{Map, Value};

/// Parsed selector.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    predicates: Vec<Predicate>,
}

#[derive(Clone, Debug, PartialEq)]
enum Predicate {
    Eq { field: String, value: Value },
    And(Vec<Selector>),
}

impl Selector {
    /// Parse a query string of the form `{"selector": {...}}`.
    pub fn parse(query: &str) -> Result<Self, StateError> {
        let root: Value = serde_json::from_str(query)
            .map_err(|e| StateError::InvalidQuery(format!("malformed query: {e}")))?;
        let selector = root
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| StateError::InvalidQuery("missing selector object".into()))?;
        Self::from_object(selector)
    }

    fn from_object(obj: &Map<String, Value>) -> Result<Self, StateError> {
        let mut predicates = Vec::with_capacity(obj.len());
        for (field, condition) in obj {
            if field == "$and" {
                let clauses = condition
                    .as_array()
                    .ok_or_else(|| StateError::InvalidQuery("$and expects an array".into()))?;
                let nested = clauses
                    .iter()
                    .map(|clause| {
                        clause
                            .as_object()
                            .ok_or_else(|| {
                                StateError::InvalidQuery("$and clause must be an object".into())
                            })
                            .and_then(Self::from_object)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                predicates.push(Predicate::And(nested));
            } else if field.starts_with('$') {
                return Err(StateError::InvalidQuery(format!(
                    "unsupported operator {field}"
                )));
            } else {
                predicates.push(Predicate::Eq {
                    field: field.clone(),
                    value: Self::equality_operand(field, condition)?,
                });
            }
        }
        Ok(Self { predicates })
    }

    fn equality_operand(field: &str, condition: &Value) -> Result<Value, StateError> {
        match condition {
            Value::Object(ops) => match (ops.len(), ops.get("$eq")) {
                (1, Some(value)) => Ok(value.clone()),
                _ => Err(StateError::InvalidQuery(format!(
                    "unsupported condition on {field}"
                ))),
            },
            scalar => Ok(scalar.clone()),
        }
    }

    /// True if `record` satisfies every predicate.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        let Some(obj) = record.as_object() else {
            return false;
        };
        self.predicates.iter().all(|predicate| match predicate {
            Predicate::Eq { field, value } => obj.get(field) == Some(value),
            Predicate::And(clauses) => clauses.iter().all(|clause| clause.matches(record)),
        })
    }

    /// True if the stored bytes are a JSON record satisfying the selector.
    #[must_use]
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        serde_json::from_slice::<Value>(bytes)
            .map(|record| self.matches(&record))
            .unwrap_or(false)
    }
}
