//! Declarative request-body validation
//!
//! Payload types describe their constraints with a static rule table through
//! the [`Validate`] trait:
//!
//! ```ignore
//! impl Validate for CreateUserRequest {
//!     const RULES: &'static [FieldRules] = &[
//!         FieldRules::new("username", &[Rule::Required, Rule::Min(5), Rule::Max(20)]),
//!         FieldRules::new("repeatPassword", &[Rule::Required, Rule::EqField("password")]),
//!     ];
//! }
//! ```
//!
//! [`validate`] decodes raw bytes into the payload type and evaluates every
//! rule of every field. A field reports the tag of its first failing rule and
//! all failing fields are collected into [`Violations`], keyed by the
//! lower-cased field name.
//!
//! A body that cannot be decoded at all is a [`ValidationError::Decode`]
//! (500), never a field violation.

/// Rule evaluation against the canonical JSON form of a payload.
pub mod rules;
/// Pipeline stage and extractor for validated bodies.
pub mod stage;

use crate::api::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;

pub use stage::{validate_body, validate_stage, Valid};

/// A single field constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present, not null; strings and arrays must be non-empty.
    Required,
    /// Lower bound: character count for strings, length for arrays, value for numbers.
    Min(usize),
    /// Upper bound, same interpretation as [`Rule::Min`].
    Max(usize),
    /// Printable ASCII only (0x20..=0x7E).
    PrintAscii,
    /// `local@domain.tld` shape.
    Email,
    /// Equal to the named sibling field.
    EqField(&'static str),
    /// Required only when the named sibling field is present.
    RequiredWith(&'static str),
}

impl Rule {
    /// Machine-readable tag reported in the violation map.
    pub fn tag(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::PrintAscii => "printascii",
            Rule::Email => "email",
            Rule::EqField(_) => "eqfield",
            Rule::RequiredWith(_) => "required_with",
        }
    }
}

/// Ordered constraints for one field, named as it appears on the wire.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRules {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }
}

/// A payload type with a static rule set.
pub trait Validate: Serialize + DeserializeOwned {
    const RULES: &'static [FieldRules];
}

/// Field name (lower-cased) to violation tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Violations(BTreeMap<String, String>);

impl Violations {
    pub fn insert(&mut self, field: &str, tag: &str) {
        self.0.insert(field.to_lowercase(), tag.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The body could not be decoded into the payload type.
    #[error("{0}")]
    Decode(String),

    #[error("{} field(s) failed validation", .0.len())]
    Fields(Violations),
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        match self {
            ValidationError::Decode(msg) => {
                Envelope::empty(StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
            ValidationError::Fields(violations) => {
                let status = StatusCode::BAD_REQUEST;
                Envelope::new(
                    status,
                    status.canonical_reason().unwrap_or_default(),
                    Some(violations),
                )
                .into_response()
            }
        }
    }
}

/// Decodes `raw` into `T` and checks it against `T::RULES`.
pub fn validate<T: Validate>(raw: &[u8]) -> Result<T, ValidationError> {
    let payload: T =
        serde_json::from_slice(raw).map_err(|e| ValidationError::Decode(e.to_string()))?;
    check(&payload)?;
    Ok(payload)
}

/// Runs every rule of `T` against an already decoded payload.
pub fn check<T: Validate>(payload: &T) -> Result<(), ValidationError> {
    let value =
        serde_json::to_value(payload).map_err(|e| ValidationError::Decode(e.to_string()))?;
    let violations = rules::evaluate(T::RULES, &value);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Fields(violations))
    }
}
