//! Configuration and input validation
//!
//! A fluent validator that collects every problem instead of stopping at the
//! first one, so `config validate` can report them all at once.
//!
//! # Example
//!
//! ```rust
//! use dersplan_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("version_name", "1.0.0")
//!     .semver("version_name", "1.0.0")
//!     .ordered("min_sdk", 21, "target_sdk", 35)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    fn error(
        mut self,
        field: &str,
        code: &str,
        message: String,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        self.result.add_error(ValidationError {
            field: field.to_string(),
            message,
            code: code.to_string(),
            expected,
            actual,
        });
        self
    }

    /// Validate that a field is not empty
    pub fn required(self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            return self.error(
                field,
                "REQUIRED",
                "Field is required".to_string(),
                Some("non-empty value".to_string()),
                Some("empty".to_string()),
            );
        }
        self
    }

    /// Validate against a regex pattern
    pub fn pattern(self, field: &str, value: &str, pattern: &str, description: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(value) => self,
            Ok(_) => self.error(
                field,
                "PATTERN",
                format!("Must match {}", description),
                Some(description.to_string()),
                Some(value.to_string()),
            ),
            Err(_) => self.error(
                field,
                "INTERNAL",
                "Invalid validation pattern".to_string(),
                None,
                None,
            ),
        }
    }

    /// Validate that a value parses as a semantic version
    pub fn semver(self, field: &str, value: &str) -> Self {
        match semver::Version::parse(value) {
            Ok(_) => self,
            Err(e) => self.error(
                field,
                "SEMVER",
                format!("Not a semantic version: {}", e),
                Some("MAJOR.MINOR.PATCH".to_string()),
                Some(value.to_string()),
            ),
        }
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            return self.error(
                field,
                "RANGE",
                format!("Must be between {} and {}", min, max),
                Some(format!("{} - {}", min, max)),
                Some(value.to_string()),
            );
        }
        self
    }

    /// Validate that `lower` does not exceed `upper`
    pub fn ordered<T: PartialOrd + std::fmt::Display>(
        self,
        lower_field: &str,
        lower: T,
        upper_field: &str,
        upper: T,
    ) -> Self {
        if lower > upper {
            return self.error(
                lower_field,
                "ORDER",
                format!("Must not exceed {} ({})", upper_field, upper),
                Some(format!("<= {}", upper)),
                Some(lower.to_string()),
            );
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        match f() {
            Some(message) => self.error(field, "CUSTOM", message, None, None),
            None => self,
        }
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}
