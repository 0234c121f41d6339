//! String → value conversions used as argument parsers

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use super::value::Value;

type ConvertFn = dyn Fn(&str) -> Result<Value> + Send + Sync;

/// A named single-argument conversion from a command-line token to a [`Value`].
///
/// Two converters are equal when their names are equal, so a derived parser can be
/// compared against the annotation it came from.
#[derive(Clone)]
pub struct Converter {
    name: String,
    is_bool: bool,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Wrap an arbitrary conversion function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_bool: false,
            func: Arc::new(func),
        }
    }

    pub fn string() -> Self {
        Self::new("str", |s| Ok(Value::Str(s.to_string())))
    }

    pub fn int() -> Self {
        Self::new("int", |s| Ok(Value::Int(s.trim().parse::<i64>()?)))
    }

    pub fn float() -> Self {
        Self::new("float", |s| Ok(Value::Float(s.trim().parse::<f64>()?)))
    }

    pub fn path() -> Self {
        Self::new("path", |s| Ok(Value::Path(PathBuf::from(s))))
    }

    /// The boolean conversion. Options using it become flags.
    pub fn bool() -> Self {
        Self {
            name: "bool".to_string(),
            is_bool: true,
            func: Arc::new(parse_bool),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bool(&self) -> bool {
        self.is_bool
    }

    pub fn convert(&self, raw: &str) -> Result<Value> {
        (self.func)(raw)
    }
}

fn parse_bool(raw: &str) -> Result<Value> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
        other => Err(anyhow!("not a boolean: {:?}", other)),
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.is_bool == other.is_bool
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.name)
    }
}
