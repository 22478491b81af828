//! Error types for the membership pipeline.
//!
//! Only `MembershipError` ever reaches a caller. `LookupError` is raised by
//! the user directory and contained by the service.

use std::fmt;
use thiserror::Error;

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Per-field validation failures for one or more memberships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; duplicates of the same field and message are kept once.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let error = FieldError {
            field: field.into(),
            message: message.into(),
        };
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages recorded against `field`.
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "{}", messages.join(", "))
    }
}

/// Errors raised by a `MembershipStore` implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Store error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Errors returned from membership mutations.
#[derive(Error, Debug)]
pub enum MembershipError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl MembershipError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Errors raised while resolving a user's custom attribute.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Custom field definition '{0}' not found")]
    DefinitionMissing(String),

    #[error("No value set for custom field '{0}'")]
    ValueAbsent(String),

    #[error("Directory error: {0}")]
    Directory(#[from] anyhow::Error),
}
