//! Integration tests for Settings loading.
//!
//! Each test uses its own environment prefix so parallel tests never see each other's
//! variables.

use clap::ColorChoice;
use rstest::rstest;

use argspec::config::{ColorMode, Settings};

#[rstest]
#[case("auto", ColorMode::Auto)]
#[case("always", ColorMode::Always)]
#[case("never", ColorMode::Never)]
fn given_color_env_when_loading_then_parsed(#[case] raw: &str, #[case] expected: ColorMode) {
    let prefix = format!("ARGSPEC_IT_{}", raw.to_uppercase());
    std::env::set_var(format!("{}_COLOR", prefix), raw);

    let settings = Settings::load_with_prefix(&prefix).expect("load settings");

    assert_eq!(settings.color, expected);
    assert_eq!(settings.log, "warn");
}

#[test]
fn given_color_mode_when_converted_then_matches_clap_choice() {
    assert_eq!(ColorChoice::from(ColorMode::Never), ColorChoice::Never);
    assert_eq!(ColorChoice::from(ColorMode::Always), ColorChoice::Always);
    assert_eq!(ColorChoice::from(ColorMode::Auto), ColorChoice::Auto);
}

#[test]
fn given_log_env_only_when_loading_then_color_keeps_default() {
    std::env::set_var("ARGSPEC_ITLOG_LOG", "argspec=trace");

    let settings = Settings::load_with_prefix("ARGSPEC_ITLOG").expect("load settings");

    assert_eq!(settings.log, "argspec=trace");
    assert_eq!(settings.color, ColorMode::Auto);
}
