//! Dispatcher: assembles the program grammar and turns argv into one prepared invocation

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ColorChoice, Command};
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{
    ActionDescriptor, ActionRegistry, CommandModule, PreparedInvocation, DEBUG_ID,
};
use crate::domain::{CallArgs, Callable, ConfigError, ConfigResult, Value};

/// Name of the optional built-in completion subcommand.
pub const COMPLETION: &str = "completion";

/// The whole program grammar: the global `--debug` switch plus one mandatory subcommand
/// per declared action.
#[derive(Debug)]
pub struct Dispatcher {
    command: Command,
    actions: BTreeMap<String, ActionDescriptor>,
    completion: bool,
}

impl Dispatcher {
    /// Build the grammar from a frozen registry.
    pub fn new(name: impl Into<String>, about: impl Into<String>, registry: ActionRegistry) -> Self {
        let mut command = Command::new(name.into())
            .about(about.into())
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg(
                Arg::new(DEBUG_ID)
                    .long("debug")
                    .action(ArgAction::SetTrue)
                    .help("Report command failures with the full error chain and backtrace"),
            );

        let mut actions = BTreeMap::new();
        for action in registry.into_actions() {
            debug!(action = %action.name(), "registering subcommand");
            command = action.register(command);
            actions.insert(action.name().to_string(), action);
        }

        Self {
            command,
            actions,
            completion: false,
        }
    }

    /// Run each module against a fresh registry, then build the grammar.
    ///
    /// # Errors
    /// The first declaration error any module reports.
    pub fn from_modules(
        name: impl Into<String>,
        about: impl Into<String>,
        modules: &[CommandModule],
    ) -> ConfigResult<Self> {
        let mut registry = ActionRegistry::new();
        for module in modules {
            module(&mut registry)?;
        }
        Ok(Self::new(name, about, registry))
    }

    /// Add a `completion <shell>` subcommand that prints a shell completion script.
    ///
    /// # Errors
    /// An action already uses the name.
    pub fn with_completion(mut self) -> ConfigResult<Self> {
        if self.actions.contains_key(COMPLETION) {
            return Err(ConfigError::DuplicateAction(COMPLETION.to_string()));
        }
        self.command = self.command.subcommand(
            Command::new(COMPLETION)
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .help("Shell type")
                        .value_parser(value_parser!(Shell)),
                ),
        );
        self.completion = true;
        Ok(self)
    }

    pub fn with_color(mut self, color: ColorChoice) -> Self {
        self.command = self.command.color(color);
        self
    }

    /// The assembled grammar.
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.get(name)
    }

    /// Parse `argv` (program name first).
    ///
    /// # Errors
    /// Any usage error: unknown or missing subcommand, missing or unconvertible arguments.
    #[instrument(level = "debug", skip_all)]
    pub fn try_parse_from<I, T>(&self, argv: I) -> Result<PreparedInvocation, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = self.command.clone();
        let matches = cmd.try_get_matches_from_mut(argv)?;

        let Some((name, sub)) = matches.subcommand() else {
            return Err(cmd.error(ErrorKind::MissingSubcommand, "a subcommand is required"));
        };
        debug!(subcommand = %name, "parsed");

        if self.completion && name == COMPLETION {
            let shell = sub.get_one::<Shell>("shell").copied();
            return match shell {
                Some(shell) => Ok(completion_invocation(&mut cmd, shell)),
                None => Err(cmd.error(ErrorKind::MissingRequiredArgument, "missing shell")),
            };
        }

        match self.actions.get(name) {
            Some(action) => action.postprocess(&matches, &mut cmd),
            None => Err(cmd.error(
                ErrorKind::InvalidSubcommand,
                format!("unknown subcommand {}", name),
            )),
        }
    }

    /// Parse `argv`; on a usage error print it with usage and exit.
    pub fn parse_from<I, T>(&self, argv: I) -> PreparedInvocation
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.try_parse_from(argv).unwrap_or_else(|e| e.exit())
    }

    /// Parse the process arguments; on a usage error print it with usage and exit.
    pub fn parse(&self) -> PreparedInvocation {
        self.parse_from(std::env::args_os())
    }
}

fn completion_invocation(cmd: &mut Command, shell: Shell) -> PreparedInvocation {
    let bin_name = cmd.get_name().to_string();
    let mut script = Vec::new();
    generate(shell, cmd, bin_name, &mut script);

    let func: Callable = Arc::new(move |_: CallArgs| -> anyhow::Result<Value> {
        std::io::stdout().write_all(&script)?;
        Ok(Value::None)
    });
    PreparedInvocation::new(COMPLETION.to_string(), func, CallArgs::default(), false)
}
