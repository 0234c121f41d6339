//! Prepared invocation: run a resolved call once and map its outcome to an exit code

use std::backtrace::BacktraceStatus;
use std::io::{self, Write};
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{CallArgs, Callable, Value, ValueTypeError};
use crate::exitcode;

/// An error with an explicit kind label, reported as `Kind: message`.
///
/// Command bodies return it (through `anyhow`) when the one-line report should name
/// something more specific than `Error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Raised {
    pub kind: String,
    pub message: String,
}

impl Raised {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// A fully resolved call, ready to run.
pub struct PreparedInvocation {
    action: String,
    func: Callable,
    args: CallArgs,
    traceback: bool,
}

impl PreparedInvocation {
    pub fn new(action: String, func: Callable, args: CallArgs, traceback: bool) -> Self {
        Self {
            action,
            func,
            args,
            traceback,
        }
    }

    /// Subcommand this call was resolved from.
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn args(&self) -> &CallArgs {
        &self.args
    }

    /// Whether failures are reported with the full error chain and backtrace.
    ///
    /// A backtrace only shows when the process enabled capture (`RUST_LIB_BACKTRACE`)
    /// before the error was built.
    pub fn traceback(&self) -> bool {
        self.traceback
    }

    /// Run the call, reporting to standard error.
    pub fn run(self) -> i32 {
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        self.run_with(&mut handle)
    }

    /// Run the call, reporting to `err`.
    ///
    /// Return values map to exit codes: `None`, `true`, `0` and `""` → 0; `false` → 1;
    /// other numbers are rounded and clamped to 1..=127; other strings are printed and
    /// give 1; anything else is printed in debug form and gives 1. An error gives 2.
    #[instrument(level = "debug", skip_all, fields(action = %self.action))]
    pub fn run_with<W: Write>(self, err: &mut W) -> i32 {
        match (self.func)(self.args) {
            Ok(value) => {
                debug!(?value, "command returned");
                report_return(value, err)
            }
            Err(e) => {
                debug!(error = %e, "command failed");
                report_error(&e, self.traceback, err);
                exitcode::ERROR
            }
        }
    }
}

impl std::fmt::Debug for PreparedInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedInvocation")
            .field("action", &self.action)
            .field("args", &self.args)
            .field("traceback", &self.traceback)
            .finish_non_exhaustive()
    }
}

fn report_return<W: Write>(value: Value, err: &mut W) -> i32 {
    match value {
        Value::None | Value::Bool(true) | Value::Int(0) => exitcode::OK,
        Value::Float(x) if x == 0.0 => exitcode::OK,
        Value::Str(s) if s.is_empty() => exitcode::OK,
        Value::Bool(false) => exitcode::FAILURE,
        Value::Int(i) => exitcode::clamp(i as f64),
        Value::Float(x) => exitcode::clamp(x),
        Value::Str(s) => {
            let _ = writeln!(err, "{}", s);
            exitcode::FAILURE
        }
        other => {
            let _ = writeln!(err, "{:?}", other);
            exitcode::FAILURE
        }
    }
}

fn report_error<W: Write>(e: &anyhow::Error, traceback: bool, err: &mut W) {
    let _ = writeln!(err, "{}", summarize(&error_kind(e), &e.to_string()));
    if !traceback {
        return;
    }

    for cause in e.chain().skip(1) {
        let _ = writeln!(err, "  caused by: {}", cause);
    }
    let backtrace = e.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = writeln!(err, "\nStack backtrace:\n{}", backtrace);
    }
}

/// `Kind: message`, without repeating a kind the message already starts with.
pub fn summarize(kind: &str, message: &str) -> String {
    if message.is_empty() {
        kind.to_string()
    } else if message.starts_with(kind) {
        message.to_string()
    } else {
        format!("{}: {}", kind, message)
    }
}

/// Kind label for an error: the one it was raised with, or a name for common std errors.
pub fn error_kind(e: &anyhow::Error) -> String {
    if let Some(raised) = e.downcast_ref::<Raised>() {
        return raised.kind.clone();
    }
    let kind = if e.downcast_ref::<io::Error>().is_some() {
        "IoError"
    } else if e.downcast_ref::<ParseIntError>().is_some() {
        "ParseIntError"
    } else if e.downcast_ref::<ParseFloatError>().is_some() {
        "ParseFloatError"
    } else if e.downcast_ref::<ValueTypeError>().is_some() {
        "TypeError"
    } else {
        "Error"
    };
    kind.to_string()
}
