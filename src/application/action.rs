//! Action descriptor: one callable → one subcommand

use std::collections::{BTreeMap, BTreeSet};

use clap::error::ErrorKind;
use clap::{ArgMatches, Command};
use tracing::{debug, instrument};

use crate::application::argspec::Argspec;
use crate::application::invocation::PreparedInvocation;
use crate::application::parameter::{bare_name, ArgumentRegistration};
use crate::domain::{CallArgs, Callable, ConfigError, ConfigResult, ParamKind, Signature, Value};

/// Id of the program-wide switch that turns on full error reports.
pub const DEBUG_ID: &str = "debug";

/// Names clap claims on every subcommand.
const RESERVED_NAMES: [&str; 2] = ["-h", "--help"];

/// Argument id of clap's generated help switch.
const RESERVED_ID: &str = "help";

/// One subcommand backed by one callable.
#[derive(Clone)]
pub struct ActionDescriptor {
    name: String,
    help: String,
    func: Callable,
    arguments: Vec<ArgumentRegistration>,
}

impl ActionDescriptor {
    /// Build the descriptor for `signature`, looking up every parameter in `argspec`.
    ///
    /// Entries in `argspec` that match no parameter are ignored.
    ///
    /// # Errors
    /// A parameter without an entry, any error from [`ArgumentRegistration::build`],
    /// and name collisions between parameters.
    pub fn new(signature: Signature, argspec: &Argspec) -> ConfigResult<Self> {
        let name = bare_name(&signature.name);
        let mut arguments = Vec::with_capacity(signature.params.len());

        for param in &signature.params {
            let config = argspec
                .get(&param.name)
                .ok_or_else(|| ConfigError::MissingArgspec {
                    param: param.name.clone(),
                })?;
            arguments.push(ArgumentRegistration::build(param, config)?);
        }

        check_collisions(&name, &arguments)?;
        debug!(action = %name, arguments = arguments.len(), "described action");

        Ok(Self {
            name,
            help: signature.doc.trim().to_string(),
            func: signature.func,
            arguments,
        })
    }

    /// Subcommand name (hyphenated).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The callable's documentation text.
    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn arguments(&self) -> &[ArgumentRegistration] {
        &self.arguments
    }

    /// The subcommand node with every argument attached.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(self.name.clone());
        if let Some(summary) = self.help.lines().next().filter(|l| !l.is_empty()) {
            cmd = cmd.about(summary.to_string());
            if self.help.lines().count() > 1 {
                cmd = cmd.long_about(self.help.clone());
            }
        }
        self.arguments.iter().fold(cmd, |cmd, arg| arg.attach(cmd))
    }

    /// Add this action as a subcommand of `parent`.
    pub fn register(&self, parent: Command) -> Command {
        parent.subcommand(self.command())
    }

    /// Convert parsed matches into a ready-to-run call.
    ///
    /// `matches` are the root matches (they carry the debug switch); `root` is the command
    /// they were parsed with and is used to render usage in errors.
    ///
    /// # Errors
    /// A usage error when a token cannot be converted. Callers are expected to print it and
    /// exit, as [`clap::Error::exit`] does.
    #[instrument(level = "debug", skip_all, fields(action = %self.name))]
    pub fn postprocess(
        &self,
        matches: &ArgMatches,
        root: &mut Command,
    ) -> Result<PreparedInvocation, clap::Error> {
        let Some(sub) = matches.subcommand_matches(&self.name) else {
            return Err(root.error(
                ErrorKind::InvalidSubcommand,
                format!("{} was not selected", self.name),
            ));
        };

        let mut args = CallArgs::default();
        for arg in &self.arguments {
            let value = match arg.extract(sub) {
                Ok(value) => value,
                Err(cause) => {
                    let message = if arg.is_option() {
                        format!("invalid argument to {}: {:#}", arg.diagnostic_name(), cause)
                    } else {
                        format!("invalid {}: {:#}", arg.diagnostic_name(), cause)
                    };
                    debug!(%message, "conversion failed");
                    return Err(self.usage_error(root, message));
                }
            };

            match (arg.is_option(), arg.kind(), value) {
                (true, _, value) => {
                    args.keyword.insert(arg.dest().to_string(), value);
                }
                (false, ParamKind::VarPositional, Value::List(items)) => {
                    args.positional.extend(items)
                }
                (false, _, value) => args.positional.push(value),
            }
        }

        let traceback = matches
            .try_get_one::<bool>(DEBUG_ID)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);
        Ok(PreparedInvocation::new(
            self.name.clone(),
            self.func.clone(),
            args,
            traceback,
        ))
    }

    fn usage_error(&self, root: &mut Command, message: String) -> clap::Error {
        match root.find_subcommand_mut(&self.name) {
            Some(sub) => sub.error(ErrorKind::ValueValidation, message),
            None => root.error(ErrorKind::ValueValidation, message),
        }
    }
}

impl std::fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

fn check_collisions(action: &str, arguments: &[ArgumentRegistration]) -> ConfigResult<()> {
    let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();
    let mut dests: BTreeSet<&str> = BTreeSet::new();

    for arg in arguments {
        if arg.dest() == RESERVED_ID {
            return Err(ConfigError::ReservedName {
                action: action.to_string(),
                name: arg.dest().to_string(),
            });
        }
        if !dests.insert(arg.dest()) {
            return Err(ConfigError::NameCollision {
                action: action.to_string(),
                name: arg.dest().to_string(),
                first: arg.dest().to_string(),
                second: arg.dest().to_string(),
            });
        }
        if !arg.is_option() {
            continue;
        }
        for name in arg.names() {
            if RESERVED_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::ReservedName {
                    action: action.to_string(),
                    name: name.clone(),
                });
            }
            if let Some(first) = claimed.insert(name.as_str(), arg.dest()) {
                return Err(ConfigError::NameCollision {
                    action: action.to_string(),
                    name: name.clone(),
                    first: first.to_string(),
                    second: arg.dest().to_string(),
                });
            }
        }
    }
    Ok(())
}
