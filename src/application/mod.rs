//! Application layer: argument registrations, actions and invocations
//!
//! This layer turns signature records into clap grammar and parsed matches back into calls.

pub mod action;
pub mod argspec;
pub mod invocation;
pub mod parameter;
pub mod registry;

pub use action::{ActionDescriptor, DEBUG_ID};
pub use argspec::{argspec, ActionKind, Argspec, Arity, ParameterConfig};
pub use invocation::{PreparedInvocation, Raised};
pub use parameter::{ArgumentRegistration, RegistrationOptions};
pub use registry::{ActionRegistry, CommandModule};
