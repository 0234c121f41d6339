//! Tests for ActionDescriptor and ActionRegistry: declaration rules and config merging

use ::argspec::application::{argspec, ActionDescriptor, ActionRegistry, Argspec, ParameterConfig};
use ::argspec::domain::{ConfigError, ParameterMetadata, Signature, TypeAnnotation, Value};
use ::argspec::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn copy_signature() -> Signature {
    Signature::new("copy_files", "Copy files\n\nLonger description.", |_| Ok(Value::None))
        .param(ParameterMetadata::positional("src", TypeAnnotation::path()))
        .param(ParameterMetadata::keyword("force", TypeAnnotation::bool()).with_default(false))
}

fn copy_argspec() -> Argspec {
    argspec([
        ("src", ParameterConfig::help("Source")),
        ("force", ParameterConfig::help("Overwrite").short("f")),
    ])
}

// ============================================================
// ActionDescriptor
// ============================================================

#[test]
fn given_signature_when_describing_then_name_is_hyphenated() {
    let action = ActionDescriptor::new(copy_signature(), &copy_argspec()).unwrap();

    assert_eq!(action.name(), "copy-files");
    assert_eq!(action.arguments().len(), 2);
    assert_eq!(action.help(), "Copy files\n\nLonger description.");
}

#[test]
fn given_multiline_doc_when_building_command_then_summary_is_first_line() {
    let action = ActionDescriptor::new(copy_signature(), &copy_argspec()).unwrap();
    let cmd = action.command();

    assert_eq!(cmd.get_about().map(|s| s.to_string()), Some("Copy files".to_string()));
    assert!(cmd.get_long_about().is_some());
}

#[test]
fn given_parameter_without_entry_when_describing_then_missing_argspec() {
    let spec = argspec([("src", ParameterConfig::help("Source"))]);
    let err = ActionDescriptor::new(copy_signature(), &spec).unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingArgspec {
            param: "force".into()
        }
    );
}

#[test]
fn given_unused_entries_when_describing_then_ignored() {
    let mut spec = copy_argspec();
    spec.insert("unrelated".into(), ParameterConfig::help("never used"));
    assert!(ActionDescriptor::new(copy_signature(), &spec).is_ok());
}

#[test]
fn given_alias_claimed_twice_when_describing_then_collision() {
    let sig = Signature::new("pair", "Two options", |_| Ok(Value::None))
        .param(ParameterMetadata::keyword("alpha", TypeAnnotation::int()).with_default(1))
        .param(ParameterMetadata::keyword("amount", TypeAnnotation::int()).with_default(2));
    let spec = argspec([
        ("alpha", ParameterConfig::help("a").short("a")),
        ("amount", ParameterConfig::help("b").short("a")),
    ]);

    let err = ActionDescriptor::new(sig, &spec).unwrap_err();
    assert!(matches!(err, ConfigError::NameCollision { ref name, .. } if name == "-a"));
}

#[test]
fn given_help_alias_when_describing_then_reserved() {
    let sig = Signature::new("x", "X", |_| Ok(Value::None))
        .param(ParameterMetadata::keyword("hint", TypeAnnotation::string()).with_default(""));
    let spec = argspec([("hint", ParameterConfig::help("hint").short("h"))]);

    let err = ActionDescriptor::new(sig, &spec).unwrap_err();
    assert!(matches!(err, ConfigError::ReservedName { .. }));
}

#[test]
fn given_positional_named_help_when_describing_then_reserved() {
    let sig = Signature::new("show", "Show a topic", |_| Ok(Value::None))
        .param(ParameterMetadata::positional("help", TypeAnnotation::string()));
    let spec = argspec([("help", ParameterConfig::help("Topic"))]);

    let mut registry = ActionRegistry::new();
    let err = registry.cli_action_with(sig, spec).unwrap_err();

    assert_eq!(
        err,
        ConfigError::ReservedName {
            action: "show".into(),
            name: "help".into()
        }
    );
    assert!(registry.actions().is_empty());
}

// ============================================================
// ActionRegistry
// ============================================================

#[test]
fn given_common_config_when_declaring_then_used_for_matching_parameter() {
    let mut registry = ActionRegistry::new();
    registry.register_common("src", ParameterConfig::help("Source"));
    registry.register_common("force", ParameterConfig::help("Overwrite"));

    let action = registry.cli_action(copy_signature()).unwrap();
    assert_eq!(action.arguments()[1].names(), ["--force"]);
}

#[test]
fn given_common_registered_twice_when_declaring_then_fields_merge() {
    let mut registry = ActionRegistry::new();
    registry.register_common("force", ParameterConfig::help("Overwrite"));
    registry.register_common("force", ParameterConfig::new().short("f"));

    let merged = &registry.common()["force"];
    assert_eq!(merged.help.as_deref(), Some("Overwrite"));
    assert_eq!(merged.short, Some(vec!["f".to_string()]));
}

#[test]
fn given_override_when_declaring_then_entry_replaced_not_merged() {
    let mut registry = ActionRegistry::new();
    registry.register_common("src", ParameterConfig::help("Source"));
    registry.register_common("force", ParameterConfig::help("Overwrite").short("f"));

    let overrides = argspec([("force", ParameterConfig::help("Clobber"))]);
    let action = registry.cli_action_with(copy_signature(), overrides).unwrap();

    let force = &action.arguments()[1];
    assert_eq!(force.names(), ["--force"]);
    assert_eq!(force.options().help.as_deref(), Some("Clobber"));
}

#[test]
fn given_override_when_declaring_then_common_untouched() {
    let mut registry = ActionRegistry::new();
    registry.register_common("src", ParameterConfig::help("Source"));
    registry.register_common("force", ParameterConfig::help("Overwrite"));

    registry
        .cli_action_with(copy_signature(), argspec([("force", ParameterConfig::help("Clobber"))]))
        .unwrap();

    assert_eq!(registry.common()["force"].help.as_deref(), Some("Overwrite"));
}

#[test]
fn given_same_action_twice_when_declaring_then_duplicate() {
    let mut registry = ActionRegistry::new();
    registry.cli_action_with(copy_signature(), copy_argspec()).unwrap();

    let err = registry
        .cli_action_with(copy_signature(), copy_argspec())
        .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateAction("copy-files".into()));
    assert_eq!(registry.actions().len(), 1);
}

#[test]
fn given_failing_declaration_when_declaring_then_registry_unchanged() {
    let mut registry = ActionRegistry::new();
    let err = registry.cli_action(copy_signature()).unwrap_err();

    assert!(matches!(err, ConfigError::MissingArgspec { .. }));
    assert!(registry.get("copy-files").is_none());
}
