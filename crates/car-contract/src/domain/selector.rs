//! # Query Translator
//!
//! Builds rich-query selector strings for car lookups.
//!
//! Filtered queries always carry the `docType = "car"` predicate. Values are
//! embedded as JSON strings, so selector syntax inside a caller-supplied color
//! or owner is escaped rather than interpreted.

use crate::domain::entities::DocType;
use serde_json::{Map, Value};

/// Field-equality filter over car records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CarFilter {
    /// Required `color`, if any.
    pub color: Option<String>,
    /// Required `owner` user ID, if any.
    pub owner: Option<String>,
}

impl CarFilter {
    /// Cars of the given color.
    pub fn by_color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            owner: None,
        }
    }

    /// Cars owned by the given user.
    pub fn by_owner(owner: impl Into<String>) -> Self {
        Self {
            color: None,
            owner: Some(owner.into()),
        }
    }

    /// Cars of the given color owned by the given user.
    pub fn by_color_and_owner(color: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            owner: Some(owner.into()),
        }
    }

    /// Selector object for this filter.
    #[must_use]
    pub fn to_selector(&self) -> Value {
        let mut predicates = Map::new();
        predicates.insert("docType".into(), Value::from(DocType::Car.as_str()));
        if let Some(color) = &self.color {
            predicates.insert("color".into(), Value::from(color.as_str()));
        }
        if let Some(owner) = &self.owner {
            predicates.insert("owner".into(), Value::from(owner.as_str()));
        }

        let mut query = Map::new();
        query.insert("selector".into(), Value::Object(predicates));
        Value::Object(query)
    }

    /// Selector string for the query facility.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.to_selector().to_string()
    }
}

/// A query the contract can hand to the world state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetQuery {
    /// Discriminator-scoped car filter.
    Filtered(CarFilter),
    /// Caller-supplied selector, passed through unchanged.
    Raw(String),
}

impl AssetQuery {
    /// Query string for the query facility.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Filtered(filter) => filter.to_query_string(),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

impl From<CarFilter> for AssetQuery {
    fn from(filter: CarFilter) -> Self {
        Self::Filtered(filter)
    }
}
