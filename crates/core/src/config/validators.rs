//! Validators for config variables.

use std::fmt;
use std::sync::Arc;

use super::{ConfigError, Result, VarValue};

type Predicate = Arc<dyn Fn(&VarValue) -> bool + Send + Sync>;

/// A predicate over a config value plus the message reported when it fails.
#[derive(Clone)]
pub struct VarValidator {
    predicate: Predicate,
    message: String,
    var_name: Option<String>,
}

impl VarValidator {
    pub fn new(
        predicate: impl Fn(&VarValue) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
            var_name: None,
        }
    }

    pub fn with_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = Some(var_name.into());
        self
    }

    pub fn set_name(&mut self, var_name: &str) {
        self.var_name = Some(var_name.to_string());
    }

    pub fn var_name(&self) -> Option<&str> {
        self.var_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Checks `value`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` carrying the variable name and
    /// this validator's message.
    pub fn check(&self, value: &VarValue) -> Result<()> {
        if (self.predicate)(value) {
            return Ok(());
        }
        Err(ConfigError::Validation {
            name: self.var_name.clone().unwrap_or_default(),
            reason: self.message.clone(),
        })
    }
}

impl fmt::Debug for VarValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarValidator")
            .field("message", &self.message)
            .field("var_name", &self.var_name)
            .finish_non_exhaustive()
    }
}

/// Integer strictly greater than zero.
pub fn number_natural() -> VarValidator {
    VarValidator::new(
        |value| value.as_int().is_some_and(|n| n > 0),
        "Must be a natural number (integer > 0)",
    )
}

/// Integer strictly less than zero.
pub fn number_int_negative() -> VarValidator {
    VarValidator::new(
        |value| value.as_int().is_some_and(|n| n < 0),
        "Must be a negative integer",
    )
}

/// Number strictly greater than zero.
pub fn number_float_positive() -> VarValidator {
    VarValidator::new(
        |value| value.as_number().is_some_and(|n| n > 0.0),
        "Must be a positive number",
    )
}

/// Number strictly less than zero.
pub fn number_float_negative() -> VarValidator {
    VarValidator::new(
        |value| value.as_number().is_some_and(|n| n < 0.0),
        "Must be a negative number",
    )
}

/// Non-empty string. Whitespace counts as content.
pub fn string_non_empty() -> VarValidator {
    VarValidator::new(
        |value| value.as_str().is_some_and(|s| !s.is_empty()),
        "Must be a valid, non-empty string",
    )
}

pub fn list_non_empty() -> VarValidator {
    VarValidator::new(
        |value| value.as_list().is_some_and(|list| !list.is_empty()),
        "Must be a non-empty list",
    )
}

/// Non-empty list whose items are all non-empty strings.
pub fn list_str_non_empty() -> VarValidator {
    VarValidator::new(
        |value| {
            value.as_list().is_some_and(|list| {
                !list.is_empty()
                    && list
                        .iter()
                        .all(|item| item.as_str().is_some_and(|s| !s.is_empty()))
            })
        },
        "Must be a non-empty list of non-empty strings",
    )
}
