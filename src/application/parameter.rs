//! Parameter descriptor: one declared parameter → one command-line argument
//!
//! Rules, in order:
//! - kind decides option vs positional and the default arity
//! - names are derived from the parameter name plus declared aliases, validated and deduplicated
//! - the value parser is the explicit one, or derived from the type annotation
//! - boolean options are turned into flags whose polarity follows the default

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::trace;

use crate::application::argspec::{ActionKind, Arity, ParameterConfig};
use crate::domain::{
    ConfigError, ConfigResult, Converter, ParamKind, ParameterMetadata, TypeAnnotation, Value,
};

/// Options passed along with the names when the argument is registered.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOptions {
    pub default: Option<Value>,
    /// `None` means exactly one token (or none, for flags).
    pub arity: Option<Arity>,
    pub action: ActionKind,
    pub const_value: Option<Value>,
    /// Value placeholder in help; for positionals this is the displayed name.
    pub metavar: Option<String>,
    pub choices: Option<Vec<String>>,
    pub help: Option<String>,
    pub hidden: bool,
    pub required: bool,
}

/// The computed command-line shape of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentRegistration {
    names: Vec<String>,
    is_option: bool,
    dest: String,
    kind: ParamKind,
    parser: Converter,
    options: RegistrationOptions,
}

impl ArgumentRegistration {
    /// Compute the registration for `param` under `config`.
    ///
    /// # Errors
    /// Any declaration problem: unsupported kind or annotation, missing help,
    /// invalid names, aliases on a positional.
    pub fn build(param: &ParameterMetadata, config: &ParameterConfig) -> ConfigResult<Self> {
        let (is_option, arity) = match param.kind {
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword => {
                let arity = match config.arity {
                    Some(a) => Some(a),
                    None if param.has_default() => Some(Arity::ZeroOrOne),
                    None => None,
                };
                (false, arity)
            }
            ParamKind::VarPositional => (false, Some(config.arity.unwrap_or(Arity::ZeroOrMore))),
            ParamKind::KeywordOnly => (true, config.arity),
            ParamKind::VarKeyword => {
                return Err(ConfigError::VarKeyword {
                    param: param.name.clone(),
                })
            }
        };

        if config.help.is_none() && !config.is_suppressed() {
            return Err(ConfigError::MissingHelp {
                param: param.name.clone(),
            });
        }

        let base = bare_name(&param.name);
        validate_bare(&param.name, &base, NameForm::Parameter)?;

        let names = if is_option {
            option_names(&param.name, &base, config)?
        } else {
            if config.short.as_ref().is_some_and(|s| !s.is_empty())
                || config.long.as_ref().is_some_and(|l| !l.is_empty())
            {
                return Err(ConfigError::PositionalAliases {
                    param: param.name.clone(),
                });
            }
            vec![base.clone()]
        };

        let parser = match &config.parser {
            Some(p) => p.clone(),
            None => derive_parser(param, &param.annotation)?,
        };

        let action = config.action.unwrap_or(ActionKind::Store);
        if !is_option && action.is_flag() {
            return Err(ConfigError::PositionalFlag {
                param: param.name.clone(),
            });
        }

        let metavar = if is_option {
            config.metavar.clone()
        } else {
            Some(config.metavar.clone().unwrap_or_else(|| base.clone()))
        };

        let required = match (is_option, arity) {
            (_, Some(Arity::OneOrMore)) => true,
            (false, None) => true,
            (true, None) => !param.has_default() && action == ActionKind::Store,
            _ => false,
        };

        let mut registration = Self {
            names,
            is_option,
            dest: param.name.clone(),
            kind: param.kind,
            parser,
            options: RegistrationOptions {
                default: param.default.clone(),
                arity,
                action,
                const_value: config.const_value.clone(),
                metavar,
                choices: config.choices.clone(),
                help: config.help.clone(),
                hidden: config.is_suppressed(),
                required,
            },
        };

        if registration.is_option && registration.parser.is_bool() {
            registration.apply_bool_polarity(config);
        }

        trace!(
            param = %param.name,
            names = ?registration.names,
            "built argument registration"
        );
        Ok(registration)
    }

    /// Turn a boolean option into a flag. A default (or const) of `true` makes it
    /// normally-on: it is spelled `--no-name` and clears the value when given.
    fn apply_bool_polarity(&mut self, config: &ParameterConfig) {
        let is_true = |v: &Option<Value>| matches!(v, Some(Value::Bool(true)));
        let normally_on = is_true(&self.options.default) || is_true(&self.options.const_value);

        let names = std::mem::take(&mut self.names);
        let rewritten = names.into_iter().map(|name| {
            if is_short(&name) {
                return name;
            }
            let bare = name.trim_start_matches("--");
            let flipped = match (normally_on, bare.strip_prefix("no-")) {
                (true, None) => Some(format!("--no-{}", bare)),
                (false, Some(positive)) => Some(format!("--{}", positive)),
                _ => None,
            };
            flipped.unwrap_or(name)
        });
        self.names = dedup(rewritten);

        if normally_on {
            self.options.action = ActionKind::StoreFalse;
            if config.negative_help.is_some() {
                self.options.help = config.negative_help.clone();
            }
        } else {
            self.options.action = ActionKind::StoreTrue;
        }
        self.options.arity = None;
        self.options.required = false;
        self.options.metavar = None;
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_option(&self) -> bool {
        self.is_option
    }

    /// Storage key: the parameter name as declared.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn parser(&self) -> &Converter {
        &self.parser
    }

    pub fn options(&self) -> &RegistrationOptions {
        &self.options
    }

    /// Name used in user-facing messages: the first name that is not a `-x` short option.
    pub fn diagnostic_name(&self) -> &str {
        self.names
            .iter()
            .find(|n| !is_short(n))
            .or(self.names.first())
            .map(String::as_str)
            .unwrap_or(&self.dest)
    }

    /// Register this argument on a parser node.
    pub fn attach(&self, cmd: Command) -> Command {
        let mut arg = Arg::new(self.dest.clone());
        let opts = &self.options;

        if self.is_option {
            let shorts: Vec<char> = self
                .names
                .iter()
                .filter(|n| is_short(n))
                .filter_map(|n| n.chars().nth(1))
                .collect();
            let longs: Vec<String> = self
                .names
                .iter()
                .filter_map(|n| n.strip_prefix("--"))
                .map(str::to_string)
                .collect();
            if let Some((first, rest)) = shorts.split_first() {
                arg = arg.short(*first).visible_short_aliases(rest.to_vec());
            }
            if let Some((first, rest)) = longs.split_first() {
                arg = arg.long(first.clone()).visible_aliases(rest.to_vec());
            }
        }

        arg = match opts.action {
            ActionKind::Store => {
                arg = arg.action(ArgAction::Set);
                match (self.is_option, opts.arity) {
                    (_, None) | (_, Some(Arity::One)) => arg.num_args(1),
                    (true, Some(Arity::ZeroOrOne)) => arg.num_args(0..=1),
                    (true, Some(Arity::ZeroOrMore)) => arg.num_args(0..),
                    (false, Some(Arity::ZeroOrOne)) => arg.num_args(1),
                    (_, Some(Arity::ZeroOrMore)) | (_, Some(Arity::OneOrMore)) => {
                        arg.num_args(1..)
                    }
                }
            }
            ActionKind::StoreTrue | ActionKind::StoreConst => arg.action(ArgAction::SetTrue),
            ActionKind::StoreFalse => arg.action(ArgAction::SetFalse),
            ActionKind::Count => arg.action(ArgAction::Count),
        };

        if !opts.action.is_flag() {
            if let Some(metavar) = &opts.metavar {
                arg = arg.value_name(metavar.clone());
            }
            if let Some(choices) = &opts.choices {
                arg = arg.value_parser(PossibleValuesParser::new(choices.clone()));
            }
        }
        if let Some(help) = &opts.help {
            arg = arg.help(help.clone());
        }
        if opts.hidden {
            arg = arg.hide(true);
        }
        if opts.required {
            arg = arg.required(true);
        }

        cmd.arg(arg)
    }

    /// Read this argument back out of parsed matches, converting raw tokens.
    ///
    /// # Errors
    /// The parser's error when a token cannot be converted.
    pub fn extract(&self, matches: &ArgMatches) -> Result<Value> {
        let opts = &self.options;
        let id = self.dest.as_str();
        let fallback = || match (&opts.default, self.kind) {
            (Some(v), _) => v.clone(),
            (None, ParamKind::VarPositional) => Value::List(Vec::new()),
            (None, _) => Value::None,
        };

        match opts.action {
            ActionKind::StoreTrue | ActionKind::StoreFalse => {
                let seen = matches.value_source(id) == Some(ValueSource::CommandLine);
                Ok(match &opts.default {
                    Some(default) if !seen => default.clone(),
                    _ => Value::Bool(matches.get_flag(id)),
                })
            }
            ActionKind::StoreConst => Ok(if matches.get_flag(id) {
                opts.const_value.clone().unwrap_or(Value::Bool(true))
            } else {
                fallback()
            }),
            ActionKind::Count => {
                let count = matches.get_count(id);
                Ok(if count == 0 && opts.default.is_some() {
                    fallback()
                } else {
                    Value::Int(count.into())
                })
            }
            ActionKind::Store => {
                if matches.value_source(id) != Some(ValueSource::CommandLine) {
                    return Ok(fallback());
                }
                let raw: Vec<&String> = matches
                    .get_many::<String>(id)
                    .map(|values| values.collect())
                    .unwrap_or_default();
                if opts.arity.is_some_and(Arity::is_multiple) {
                    let converted = raw
                        .into_iter()
                        .map(|token| self.parser.convert(token))
                        .collect::<Result<Vec<_>>>()?;
                    return Ok(Value::List(converted));
                }
                match raw.first() {
                    Some(token) => self.parser.convert(token),
                    None => Ok(opts.const_value.clone().unwrap_or(Value::None)),
                }
            }
        }
    }
}

fn is_short(name: &str) -> bool {
    name.starts_with('-') && !name.starts_with("--")
}

/// Parameter name with underscores turned into hyphens.
pub fn bare_name(name: &str) -> String {
    name.replace('_', "-")
}

#[derive(Clone, Copy)]
enum NameForm {
    Parameter,
    Short,
    Long,
}

fn validate_bare(param: &str, name: &str, form: NameForm) -> ConfigResult<()> {
    let invalid = |reason: &str| ConfigError::InvalidName {
        param: param.to_string(),
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    if name.chars().any(is_non_printable) {
        return Err(invalid("contains non-printable characters"));
    }
    if name.starts_with('-') || name.starts_with('_') {
        return Err(invalid("starts with '-' or '_'"));
    }
    match form {
        NameForm::Short if name.chars().count() != 1 => {
            Err(invalid("short names are exactly one character"))
        }
        NameForm::Long if name.chars().count() < 2 => {
            Err(invalid("long names are at least two characters"))
        }
        _ => Ok(()),
    }
}

/// Control characters plus the invisible format characters (zero-width, bidi marks, BOM).
fn is_non_printable(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{00AD}'
                | '\u{200B}'..='\u{200F}'
                | '\u{2028}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{FEFF}'
        )
}

fn option_names(param: &str, base: &str, config: &ParameterConfig) -> ConfigResult<Vec<String>> {
    let mut shorts = Vec::new();
    for alias in config.short.iter().flatten() {
        validate_bare(param, alias, NameForm::Short)?;
        shorts.push(format!("-{}", alias));
    }

    let mut longs = vec![format!("--{}", base)];
    for alias in config.long.iter().flatten() {
        validate_bare(param, alias, NameForm::Long)?;
        longs.push(format!("--{}", alias));
    }

    Ok(dedup(shorts.into_iter().chain(longs)))
}

fn dedup(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

fn derive_parser(param: &ParameterMetadata, annotation: &TypeAnnotation) -> ConfigResult<Converter> {
    let explicit = || ConfigError::ExplicitParserRequired {
        param: param.name.clone(),
        annotation: annotation.to_string(),
    };
    let unimplemented = || ConfigError::Unimplemented {
        param: param.name.clone(),
        annotation: annotation.to_string(),
    };

    match annotation {
        TypeAnnotation::Concrete(converter) => Ok(converter.clone()),
        TypeAnnotation::Any => Err(explicit()),
        TypeAnnotation::Union(_) => match annotation.optional_inner() {
            Some(inner) if param.default == Some(Value::None) => derive_parser(param, inner),
            _ => Err(explicit()),
        },
        TypeAnnotation::List(_) | TypeAnnotation::Tuple(_) => Err(unimplemented()),
        TypeAnnotation::Generic { origin, .. }
            if matches!(origin.as_str(), "list" | "tuple" | "List" | "Tuple") =>
        {
            Err(unimplemented())
        }
        TypeAnnotation::Generic { .. } | TypeAnnotation::NoneType | TypeAnnotation::Missing => {
            Err(ConfigError::UnsupportedAnnotation {
                param: param.name.clone(),
                annotation: annotation.to_string(),
            })
        }
    }
}
