//! Declaration-time errors (no external dependencies)

use thiserror::Error;

/// Configuration errors represent a broken command declaration.
/// They surface while actions are being registered, never while user input is parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{param}: catch-all keyword parameters are not supported")]
    VarKeyword { param: String },

    #[error("{param}: no argspec entry")]
    MissingArgspec { param: String },

    #[error("{param}: help text is required")]
    MissingHelp { param: String },

    #[error("{param}: {annotation} needs an explicit parser")]
    ExplicitParserRequired { param: String, annotation: String },

    #[error("{param}: {annotation} parameters are not implemented")]
    Unimplemented { param: String, annotation: String },

    #[error("{param}: unsupported type annotation: {annotation}")]
    UnsupportedAnnotation { param: String, annotation: String },

    #[error("{param}: invalid name {name:?}: {reason}")]
    InvalidName {
        param: String,
        name: String,
        reason: String,
    },

    #[error("{param}: positional arguments take exactly one name and no aliases")]
    PositionalAliases { param: String },

    #[error("{param}: positional arguments cannot be flags")]
    PositionalFlag { param: String },

    #[error("{action}: {name} is claimed by both {first} and {second}")]
    NameCollision {
        action: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("{action}: {name} is reserved")]
    ReservedName { action: String, name: String },

    #[error("duplicate action: {0}")]
    DuplicateAction(String),
}

/// Result type for declaration-time operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
