use std::fmt;

use super::{ConfigError, Result, VarValidator};

/// The type a config variable is fixed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Int,
    Float,
    Str,
    Bool,
    List,
}

impl VarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::List => "list",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A config value.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<VarValue>),
}

impl VarValue {
    pub fn var_type(&self) -> VarType {
        match self {
            Self::Int(_) => VarType::Int,
            Self::Float(_) => VarType::Float,
            Self::Str(_) => VarType::Str,
            Self::Bool(_) => VarType::Bool,
            Self::List(_) => VarType::List,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the value. Integers widen to floats.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[VarValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::Bool(value) => write!(f, "{value}"),
            Self::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<VarValue>> From<Vec<T>> for VarValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A named, typed configuration variable.
#[derive(Debug, Clone)]
pub struct ConfigVar {
    name: String,
    var_type: VarType,
    value: VarValue,
    validators: Vec<VarValidator>,
    immutable: bool,
}

impl ConfigVar {
    /// Creates a variable fixed to `var_type`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::TypeMismatch` if `value` is not of `var_type`.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<VarValue>,
        var_type: VarType,
    ) -> Result<Self> {
        let name = name.into();
        let value = value.into();
        check_type(&name, &value, var_type)?;
        Ok(Self {
            name,
            var_type,
            value,
            validators: Vec::new(),
            immutable: false,
        })
    }

    /// Creates a variable whose value can never be replaced.
    pub fn immutable(
        name: impl Into<String>,
        value: impl Into<VarValue>,
        var_type: VarType,
    ) -> Result<Self> {
        let mut var = Self::new(name, value, var_type)?;
        var.immutable = true;
        Ok(var)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &VarValue {
        &self.value
    }

    pub fn var_type(&self) -> VarType {
        self.var_type
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Replaces the value. Validators are not run.
    pub fn set(&mut self, value: impl Into<VarValue>) -> Result<()> {
        if self.immutable {
            return Err(ConfigError::Immutable {
                name: self.name.clone(),
            });
        }
        let value = value.into();
        check_type(&self.name, &value, self.var_type)?;
        self.value = value;
        Ok(())
    }

    /// Attaches a validator, naming it after this variable.
    pub fn add_validator(&mut self, mut validator: VarValidator) {
        validator.set_name(&self.name);
        self.validators.push(validator);
    }

    pub fn add_validators(&mut self, validators: impl IntoIterator<Item = VarValidator>) {
        for validator in validators {
            self.add_validator(validator);
        }
    }

    pub fn with_validator(mut self, validator: VarValidator) -> Self {
        self.add_validator(validator);
        self
    }

    pub fn validators(&self) -> &[VarValidator] {
        &self.validators
    }

    /// Runs every attached validator, stopping at the first failure.
    pub fn validate(&self) -> Result<()> {
        for validator in &self.validators {
            validator.check(&self.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfigVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

fn check_type(name: &str, value: &VarValue, expected: VarType) -> Result<()> {
    let found = value.var_type();
    if found != expected {
        return Err(ConfigError::TypeMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validators;

    #[test]
    fn test_new_checks_type() {
        let result = ConfigVar::new("PORT", "8080", VarType::Int);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::TypeMismatch {
                name: "PORT".to_string(),
                expected: "int".to_string(),
                found: "str".to_string(),
            }
        );
    }

    #[test]
    fn test_set_replaces_value() {
        let mut var = ConfigVar::new("PORT", 8080i64, VarType::Int).unwrap();
        var.set(9090i64).unwrap();
        assert_eq!(var.value(), &VarValue::Int(9090));
        assert_eq!(var.to_string(), "9090");
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut var = ConfigVar::new("PORT", 8080i64, VarType::Int).unwrap();
        assert!(matches!(
            var.set(true),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert_eq!(var.value(), &VarValue::Int(8080));
    }

    #[test]
    fn test_immutable_var_rejects_set() {
        let mut var = ConfigVar::immutable("NAME", "fixed", VarType::Str).unwrap();
        assert_eq!(
            var.set("other"),
            Err(ConfigError::Immutable {
                name: "NAME".to_string()
            })
        );
        assert_eq!(var.value().as_str(), Some("fixed"));
    }

    #[test]
    fn test_adding_validator_sets_its_name() {
        let mut var = ConfigVar::new("test_var", "x", VarType::Str).unwrap();
        var.add_validator(VarValidator::new(|_| true, "Null"));
        assert_eq!(var.validators()[0].var_name(), Some("test_var"));
    }

    #[test]
    fn test_validate_reports_variable_name() {
        let var = ConfigVar::new("BATCH_SIZE", 0i64, VarType::Int)
            .unwrap()
            .with_validator(validators::number_natural());

        let err = var.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation { ref name, .. } if name == "BATCH_SIZE"));
    }

    #[test]
    fn test_validate_passes_with_all_validators() {
        let mut var = ConfigVar::new("HOSTS", vec!["a", "b"], VarType::List).unwrap();
        var.add_validators([validators::list_non_empty(), validators::list_str_non_empty()]);
        assert!(var.validate().is_ok());
    }

    #[test]
    fn test_list_display() {
        let value = VarValue::from(vec![1i64, 2]);
        assert_eq!(value.to_string(), "[1, 2]");
    }
}
