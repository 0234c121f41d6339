//! Per-parameter display and parsing overrides

use std::collections::BTreeMap;

use crate::domain::{Converter, Value};

/// How many tokens a value-taking argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Arity {
    pub fn is_multiple(self) -> bool {
        matches!(self, Arity::ZeroOrMore | Arity::OneOrMore)
    }
}

/// What happens when an argument is seen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Store the converted token(s).
    Store,
    /// Flag: `true` when present.
    StoreTrue,
    /// Flag: `false` when present.
    StoreFalse,
    /// Flag: the configured const when present.
    StoreConst,
    /// Number of occurrences.
    Count,
}

impl ActionKind {
    pub fn is_flag(self) -> bool {
        !matches!(self, ActionKind::Store)
    }
}

/// User-supplied overrides for one parameter.
///
/// Every field is optional so that [`ParameterConfig::merge`] can tell "not specified"
/// apart from an explicit value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterConfig {
    pub help: Option<String>,
    /// Help shown instead of `help` when a boolean option is displayed in its `--no-` form.
    pub negative_help: Option<String>,
    pub metavar: Option<String>,
    /// Bare single-character aliases, e.g. `"v"` for `-v`.
    pub short: Option<Vec<String>>,
    /// Bare long aliases, e.g. `"verb"` for `--verb`.
    pub long: Option<Vec<String>>,
    pub parser: Option<Converter>,
    pub action: Option<ActionKind>,
    pub arity: Option<Arity>,
    pub const_value: Option<Value>,
    pub choices: Option<Vec<String>>,
    /// Hide the parameter from help; lifts the help-text requirement.
    pub suppressed: Option<bool>,
}

/// Parameter name → config, as handed to an action.
pub type Argspec = BTreeMap<String, ParameterConfig>;

/// Collect `(name, config)` pairs into an [`Argspec`].
pub fn argspec<I, K>(entries: I) -> Argspec
where
    I: IntoIterator<Item = (K, ParameterConfig)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

impl ParameterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn help(text: impl Into<String>) -> Self {
        Self {
            help: Some(text.into()),
            ..Self::default()
        }
    }

    /// A silenced parameter: accepted but never shown.
    pub fn suppressed() -> Self {
        Self {
            suppressed: Some(true),
            ..Self::default()
        }
    }

    pub fn negative_help(mut self, text: impl Into<String>) -> Self {
        self.negative_help = Some(text.into());
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn short(mut self, alias: impl Into<String>) -> Self {
        self.short.get_or_insert_with(Vec::new).push(alias.into());
        self
    }

    pub fn long(mut self, alias: impl Into<String>) -> Self {
        self.long.get_or_insert_with(Vec::new).push(alias.into());
        self
    }

    pub fn parser(mut self, parser: Converter) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn action(mut self, action: ActionKind) -> Self {
        self.action = Some(action);
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn const_value(mut self, value: impl Into<Value>) -> Self {
        self.const_value = Some(value.into());
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.unwrap_or(false)
    }

    /// Merge overlay onto self (base): every field the overlay specifies wins,
    /// everything else is kept.
    pub fn merge(&self, overlay: &ParameterConfig) -> Self {
        Self {
            help: overlay.help.clone().or_else(|| self.help.clone()),
            negative_help: overlay
                .negative_help
                .clone()
                .or_else(|| self.negative_help.clone()),
            metavar: overlay.metavar.clone().or_else(|| self.metavar.clone()),
            short: overlay.short.clone().or_else(|| self.short.clone()),
            long: overlay.long.clone().or_else(|| self.long.clone()),
            parser: overlay.parser.clone().or_else(|| self.parser.clone()),
            action: overlay.action.or(self.action),
            arity: overlay.arity.or(self.arity),
            const_value: overlay
                .const_value
                .clone()
                .or_else(|| self.const_value.clone()),
            choices: overlay.choices.clone().or_else(|| self.choices.clone()),
            suppressed: overlay.suppressed.or(self.suppressed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let base = ParameterConfig::help("Dataset name").short("d");
        let overlay = ParameterConfig::new().metavar("NAME");
        let merged = base.merge(&overlay);
        assert_eq!(merged.help.as_deref(), Some("Dataset name"));
        assert_eq!(merged.short, Some(vec!["d".to_string()]));
        assert_eq!(merged.metavar.as_deref(), Some("NAME"));
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = ParameterConfig::help("old").long("a").long("b");
        let overlay = ParameterConfig::help("new").long("c");
        let merged = base.merge(&overlay);
        assert_eq!(merged.help.as_deref(), Some("new"));
        assert_eq!(merged.long, Some(vec!["c".to_string()]));
    }

    #[test]
    fn test_suppressed_needs_no_help() {
        let cfg = ParameterConfig::suppressed();
        assert!(cfg.is_suppressed());
        assert!(cfg.help.is_none());
    }
}
