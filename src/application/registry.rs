//! Action registry: shared per-parameter configuration plus the declared actions
//!
//! Command modules register common configs first, then declare their actions.
//! Handing the registry to the dispatcher freezes it.

use tracing::debug;

use crate::application::action::ActionDescriptor;
use crate::application::argspec::{Argspec, ParameterConfig};
use crate::domain::{ConfigError, ConfigResult, Signature};

/// A command module: registers its common configs and actions.
pub type CommandModule = fn(&mut ActionRegistry) -> ConfigResult<()>;

#[derive(Debug, Default)]
pub struct ActionRegistry {
    common: Argspec,
    actions: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register shared config for every parameter called `name`.
    ///
    /// Registering the same name again merges fields into the existing entry.
    pub fn register_common(&mut self, name: impl Into<String>, config: ParameterConfig) {
        let name = name.into();
        debug!(param = %name, "registering common config");
        let merged = match self.common.get(&name) {
            Some(existing) => existing.merge(&config),
            None => config,
        };
        self.common.insert(name, merged);
    }

    pub fn common(&self) -> &Argspec {
        &self.common
    }

    /// Build a descriptor from the shared configs, replacing whole entries named in `overrides`.
    pub fn describe(&self, signature: Signature, overrides: Argspec) -> ConfigResult<ActionDescriptor> {
        let mut argspec = self.common.clone();
        argspec.extend(overrides);
        ActionDescriptor::new(signature, &argspec)
    }

    /// Declare an action using only the shared configs.
    pub fn cli_action(&mut self, signature: Signature) -> ConfigResult<&ActionDescriptor> {
        self.cli_action_with(signature, Argspec::new())
    }

    /// Declare an action with per-parameter overrides.
    ///
    /// # Errors
    /// Any declaration error of the action, or a subcommand name already taken.
    pub fn cli_action_with(
        &mut self,
        signature: Signature,
        overrides: Argspec,
    ) -> ConfigResult<&ActionDescriptor> {
        let descriptor = self.describe(signature, overrides)?;
        if self.get(descriptor.name()).is_some() {
            return Err(ConfigError::DuplicateAction(descriptor.name().to_string()));
        }
        self.actions.push(descriptor);
        Ok(&self.actions[self.actions.len() - 1])
    }

    /// The descriptor attached to subcommand `name`.
    pub fn get(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.name() == name)
    }

    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// Freeze the registry into its actions, in declaration order.
    pub fn into_actions(self) -> Vec<ActionDescriptor> {
        self.actions
    }
}
