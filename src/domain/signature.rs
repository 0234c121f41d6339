//! Explicit signature records describing a command callable

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use super::converter::Converter;
use super::value::{Value, ValueTypeError};

/// How a parameter binds to call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamKind::PositionalOnly => "positional-only",
            ParamKind::PositionalOrKeyword => "positional-or-keyword",
            ParamKind::VarPositional => "var-positional",
            ParamKind::KeywordOnly => "keyword-only",
            ParamKind::VarKeyword => "var-keyword",
        };
        f.write_str(s)
    }
}

/// The declared type of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    /// A plain type whose conversion is known.
    Concrete(Converter),
    Any,
    NoneType,
    Union(Vec<TypeAnnotation>),
    List(Box<TypeAnnotation>),
    Tuple(Vec<TypeAnnotation>),
    Generic {
        origin: String,
        args: Vec<TypeAnnotation>,
    },
    /// Parameter declared without a type.
    Missing,
}

impl TypeAnnotation {
    pub fn string() -> Self {
        Self::Concrete(Converter::string())
    }

    pub fn int() -> Self {
        Self::Concrete(Converter::int())
    }

    pub fn float() -> Self {
        Self::Concrete(Converter::float())
    }

    pub fn bool() -> Self {
        Self::Concrete(Converter::bool())
    }

    pub fn path() -> Self {
        Self::Concrete(Converter::path())
    }

    /// `Optional[T]`, i.e. `Union[T, None]`.
    pub fn optional(inner: TypeAnnotation) -> Self {
        Self::Union(vec![inner, Self::NoneType])
    }

    /// The `T` of a two-member union with `None`, if this is one.
    pub fn optional_inner(&self) -> Option<&TypeAnnotation> {
        match self {
            Self::Union(members) if members.len() == 2 => {
                match (&members[0], &members[1]) {
                    (Self::NoneType, Self::NoneType) => None,
                    (inner, Self::NoneType) | (Self::NoneType, inner) => Some(inner),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[TypeAnnotation]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }
        match self {
            Self::Concrete(c) => write!(f, "{}", c.name()),
            Self::Any => write!(f, "Any"),
            Self::NoneType => write!(f, "None"),
            Self::Union(members) => {
                write!(f, "Union[")?;
                join(f, members)?;
                write!(f, "]")
            }
            Self::List(inner) => write!(f, "List[{}]", inner),
            Self::Tuple(members) => {
                write!(f, "Tuple[")?;
                join(f, members)?;
                write!(f, "]")
            }
            Self::Generic { origin, args } => {
                write!(f, "{}[", origin)?;
                join(f, args)?;
                write!(f, "]")
            }
            Self::Missing => write!(f, "<no annotation>"),
        }
    }
}

/// One parameter as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMetadata {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: TypeAnnotation,
    /// `None` means the parameter has no default; `Some(Value::None)` is a default of "no value".
    pub default: Option<Value>,
}

impl ParameterMetadata {
    pub fn new(name: impl Into<String>, kind: ParamKind, annotation: TypeAnnotation) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation,
            default: None,
        }
    }

    pub fn positional(name: impl Into<String>, annotation: TypeAnnotation) -> Self {
        Self::new(name, ParamKind::PositionalOrKeyword, annotation)
    }

    pub fn keyword(name: impl Into<String>, annotation: TypeAnnotation) -> Self {
        Self::new(name, ParamKind::KeywordOnly, annotation)
    }

    pub fn variadic(name: impl Into<String>, annotation: TypeAnnotation) -> Self {
        Self::new(name, ParamKind::VarPositional, annotation)
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Arguments resolved for one call: positionals in declaration order, options by storage key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Positional argument at `index`, converted to `T`.
    pub fn arg<T>(&self, index: usize) -> Result<T>
    where
        T: TryFrom<Value, Error = ValueTypeError>,
    {
        let value = self
            .positional
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("missing positional argument #{}", index))?;
        T::try_from(value).map_err(|e| anyhow!("positional argument #{}: {}", index, e))
    }

    /// Positional arguments from `index` on, each converted to `T`.
    pub fn rest<T>(&self, index: usize) -> Result<Vec<T>>
    where
        T: TryFrom<Value, Error = ValueTypeError>,
    {
        self.positional
            .iter()
            .skip(index)
            .cloned()
            .map(|v| T::try_from(v).map_err(anyhow::Error::from))
            .collect()
    }

    /// Keyword argument `name`, converted to `T`.
    pub fn kwarg<T>(&self, name: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = ValueTypeError>,
    {
        let value = self
            .keyword
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("missing keyword argument {}", name))?;
        T::try_from(value).map_err(|e| anyhow!("{}: {}", name, e))
    }
}

/// The body of a command.
pub type Callable = Arc<dyn Fn(CallArgs) -> Result<Value> + Send + Sync>;

/// A command callable together with the record that replaces signature introspection.
#[derive(Clone)]
pub struct Signature {
    pub name: String,
    pub doc: String,
    pub params: Vec<ParameterMetadata>,
    pub func: Callable,
}

impl Signature {
    pub fn new<F>(name: impl Into<String>, doc: impl Into<String>, func: F) -> Self
    where
        F: Fn(CallArgs) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: doc.into(),
            params: Vec::new(),
            func: Arc::new(func),
        }
    }

    pub fn param(mut self, param: ParameterMetadata) -> Self {
        self.params.push(param);
        self
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
