//! Command-line grammar derived from explicit function signature records.
//!
//! Each command is a callable plus a [`Signature`] describing its parameters. An
//! [`ActionRegistry`] combines those with per-parameter [`ParameterConfig`] overrides,
//! and a [`Dispatcher`] builds the clap grammar, parses argv into a
//! [`PreparedInvocation`] and maps the call's outcome to an exit code.
//!
//! ```no_run
//! use ::argspec::{argspec, ActionRegistry, Dispatcher, ParameterConfig};
//! use ::argspec::{ParameterMetadata, Signature, TypeAnnotation, Value};
//!
//! let greet = Signature::new("greet", "Say hello", |args| {
//!     let name: String = args.arg(0)?;
//!     println!("hello {}", name);
//!     Ok(Value::None)
//! })
//! .param(ParameterMetadata::positional("name", TypeAnnotation::string()));
//!
//! let mut registry = ActionRegistry::new();
//! registry
//!     .cli_action_with(greet, argspec([("name", ParameterConfig::help("Who to greet"))]))
//!     .unwrap();
//! let code = Dispatcher::new("hello", "Greeter", registry).parse().run();
//! std::process::exit(code);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{
    argspec, ActionDescriptor, ActionKind, ActionRegistry, ArgumentRegistration, Argspec, Arity,
    CommandModule, ParameterConfig, PreparedInvocation, Raised,
};
pub use cli::Dispatcher;
pub use domain::{
    CallArgs, ConfigError, ConfigResult, Converter, ParamKind, ParameterMetadata, Signature,
    TypeAnnotation, Value,
};
