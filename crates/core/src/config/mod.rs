//! Typed configuration variables with attachable validators.
//!
//! A [`ConfigVar`] holds one value of a fixed [`VarType`]. Validators are
//! attached after construction and run on demand with
//! [`ConfigVar::validate`]; failures name the variable they belong to.

mod error;
pub mod validators;
mod var;

pub use error::{ConfigError, Result};
pub use validators::VarValidator;
pub use var::{ConfigVar, VarType, VarValue};
