use crate::utils::error::Result;
use serde::Serialize;
use std::fmt;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// A single violated rule, keyed by the wire name of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Every rule violated by one value, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, reason: impl Into<String>) {
        self.0.push(FieldError::new(field, reason));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn require_non_empty_string(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "is required and cannot be empty or whitespace-only");
    }
}

pub fn require_non_empty_list<T>(errors: &mut ValidationErrors, field: &str, values: &[T]) {
    if values.is_empty() {
        errors.push(field, "must contain at least one value");
    }
}

pub fn require_present<T>(errors: &mut ValidationErrors, field: &str, value: &Option<T>) -> bool {
    if value.is_none() {
        errors.push(field, "is required");
        return false;
    }
    true
}

pub fn require_true(errors: &mut ValidationErrors, field: &str, value: bool) {
    if !value {
        errors.push(field, "is required and must be true");
    }
}

pub fn require_path(errors: &mut ValidationErrors, field: &str, path: &str) {
    if path.is_empty() {
        errors.push(field, "path cannot be empty");
    } else if path.contains('\0') {
        errors.push(field, "path contains null bytes");
    }
}

pub fn require_at_least<T: PartialOrd + fmt::Display + Copy>(
    errors: &mut ValidationErrors,
    field: &str,
    value: T,
    min: T,
) {
    if value < min {
        errors.push(field, format!("must be at least {}", min));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty_string() {
        let mut errors = ValidationErrors::new();
        require_non_empty_string(&mut errors, "label", "teaspoon");
        assert!(errors.is_empty());

        require_non_empty_string(&mut errors, "label", "   ");
        assert!(errors.contains_field("label"));
    }

    #[test]
    fn test_collects_every_violation() {
        let mut errors = ValidationErrors::new();
        require_non_empty_list::<u8>(&mut errors, "snap_amount", &[]);
        require_true(&mut errors, "enabled", false);
        require_present::<u8>(&mut errors, "measure_type", &None);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.to_string(),
            "snap_amount must contain at least one value; enabled is required and must be true; measure_type is required"
        );
    }

    #[test]
    fn test_require_path_and_minimum() {
        let mut errors = ValidationErrors::new();
        require_path(&mut errors, "store.data_dir", "./data");
        require_at_least(&mut errors, "server.port", 8080u16, 1);
        assert!(errors.clone().into_result().is_ok());

        require_path(&mut errors, "store.data_dir", "bad\0path");
        require_at_least(&mut errors, "server.port", 0u16, 1);
        assert_eq!(errors.len(), 2);
    }
}
