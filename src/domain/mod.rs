//! Domain layer: values, conversions and signature records
//!
//! This layer is independent of external concerns (no clap, no process exit, no I/O).

pub mod converter;
pub mod error;
pub mod signature;
pub mod value;

pub use converter::Converter;
pub use error::{ConfigError, ConfigResult};
pub use signature::{CallArgs, Callable, ParamKind, ParameterMetadata, Signature, TypeAnnotation};
pub use value::{Value, ValueTypeError};
