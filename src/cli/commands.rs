//! Commands of the `argspec` binary: a small file toolbox declared through signature records

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use sha2::{Digest, Sha256, Sha512};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::application::{argspec, ActionRegistry, ParameterConfig, Raised};
use crate::domain::{
    CallArgs, ConfigResult, Converter, ParameterMetadata, Signature, TypeAnnotation, Value,
};

/// Register the toolbox commands.
pub fn register(registry: &mut ActionRegistry) -> ConfigResult<()> {
    registry.register_common(
        "pattern",
        ParameterConfig::help("Only consider file names matching this regular expression")
            .short("p")
            .metavar("REGEX")
            .parser(regex_converter()),
    );

    registry.cli_action_with(
        hash_file_signature(),
        argspec([
            ("path", ParameterConfig::help("File to hash")),
            (
                "algorithm",
                ParameterConfig::help("Digest algorithm")
                    .short("a")
                    .choices(["sha256", "sha512"]),
            ),
            (
                "expected",
                ParameterConfig::help("Expected hex digest; a mismatch fails the command")
                    .metavar("HEX"),
            ),
        ]),
    )?;

    registry.cli_action_with(
        list_files_signature(),
        argspec([
            (
                "directory",
                ParameterConfig::help("Directory to walk (default: current directory)")
                    .metavar("DIR"),
            ),
            (
                "recursive",
                ParameterConfig::help("Descend into subdirectories")
                    .negative_help("Only list the top level of DIR"),
            ),
            (
                "limit",
                ParameterConfig::help("Stop after this many files").short("n"),
            ),
        ]),
    )?;

    registry.cli_action_with(
        sum_signature(),
        argspec([
            ("numbers", ParameterConfig::help("Numbers to add")),
            (
                "status",
                ParameterConfig::help("Exit with the sum as status instead of 0"),
            ),
        ]),
    )?;

    Ok(())
}

/// Validates the token as a regular expression, keeps it as a string.
fn regex_converter() -> Converter {
    Converter::new("regex", |s| {
        Regex::new(s)?;
        Ok(Value::Str(s.to_string()))
    })
}

fn hash_file_signature() -> Signature {
    Signature::new(
        "hash_file",
        "Print the digest of a file\n\nWith --expected, fails unless the digest matches.",
        hash_file,
    )
    .param(ParameterMetadata::positional("path", TypeAnnotation::path()))
    .param(
        ParameterMetadata::keyword("algorithm", TypeAnnotation::string()).with_default("sha256"),
    )
    .param(
        ParameterMetadata::keyword("expected", TypeAnnotation::optional(TypeAnnotation::string()))
            .with_default(Value::None),
    )
}

#[instrument(level = "debug", skip_all)]
fn hash_file(args: CallArgs) -> Result<Value> {
    let path: PathBuf = args.arg(0)?;
    let algorithm: String = args.kwarg("algorithm")?;
    let expected: Option<String> = args.kwarg("expected")?;

    let content =
        fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
    let digest = match algorithm.as_str() {
        "sha256" => hex::encode(Sha256::digest(&content)),
        "sha512" => hex::encode(Sha512::digest(&content)),
        other => {
            return Err(Raised::new("ValueError", format!("unknown algorithm {}", other)).into())
        }
    };
    debug!(path = %path.display(), %algorithm, "hashed");
    println!("{}  {}", digest, path.display());

    match expected {
        Some(expected) if !expected.eq_ignore_ascii_case(&digest) => Ok(Value::Str(format!(
            "digest mismatch: expected {}, got {}",
            expected, digest
        ))),
        _ => Ok(Value::None),
    }
}

fn list_files_signature() -> Signature {
    Signature::new(
        "list_files",
        "List files below a directory\n\nFails when nothing matches.",
        list_files,
    )
    .param(ParameterMetadata::positional("directory", TypeAnnotation::path()).with_default(PathBuf::from(".")))
    .param(
        ParameterMetadata::keyword("pattern", TypeAnnotation::optional(TypeAnnotation::string()))
            .with_default(Value::None),
    )
    .param(ParameterMetadata::keyword("recursive", TypeAnnotation::bool()).with_default(true))
    .param(
        ParameterMetadata::keyword("limit", TypeAnnotation::optional(TypeAnnotation::int()))
            .with_default(Value::None),
    )
}

#[instrument(level = "debug", skip_all)]
fn list_files(args: CallArgs) -> Result<Value> {
    let directory: PathBuf = args.arg(0)?;
    let pattern: Option<String> = args.kwarg("pattern")?;
    let recursive: bool = args.kwarg("recursive")?;
    let limit: Option<i64> = args.kwarg("limit")?;

    let pattern = pattern.as_deref().map(Regex::new).transpose()?;
    let files = matching_files(&directory, pattern.as_ref(), recursive)?;
    let limit = limit.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(0));

    let mut listed = 0usize;
    for file in files.iter().take(limit) {
        println!("{}", file.display());
        listed += 1;
    }
    debug!(listed, total = files.len(), "listed files");
    Ok(Value::Bool(listed > 0))
}

/// Files below `root` whose name matches `pattern`, in walk order.
pub fn matching_files(root: &Path, pattern: Option<&Regex>, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(root).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if pattern.map_or(true, |re| re.is_match(&name)) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn sum_signature() -> Signature {
    Signature::new("sum", "Add numbers and print the total", sum)
        .param(ParameterMetadata::variadic("numbers", TypeAnnotation::float()))
        .param(ParameterMetadata::keyword("status", TypeAnnotation::bool()).with_default(false))
}

fn sum(args: CallArgs) -> Result<Value> {
    let numbers: Vec<f64> = args.rest(0)?;
    let status: bool = args.kwarg("status")?;
    let total: f64 = numbers.iter().sum();
    println!("{}", total);
    Ok(if status { Value::Float(total) } else { Value::None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_declares_all_commands() {
        let mut registry = ActionRegistry::new();
        register(&mut registry).unwrap();
        let names: Vec<&str> = registry.actions().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["hash-file", "list-files", "sum"]);
        assert!(registry.common().contains_key("pattern"));
    }

    #[test]
    fn test_regex_converter_rejects_invalid_pattern() {
        let conv = regex_converter();
        assert_eq!(conv.convert(r"\.rs$").unwrap(), Value::Str(r"\.rs$".into()));
        assert!(conv.convert("(").is_err());
    }

    #[test]
    fn test_matching_files_respects_depth_and_pattern() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.rs"), "").unwrap();

        let re = Regex::new(r"\.rs$").unwrap();
        let all = matching_files(dir.path(), Some(&re), true).unwrap();
        assert_eq!(all.len(), 2);

        let top = matching_files(dir.path(), Some(&re), false).unwrap();
        assert_eq!(top, vec![dir.path().join("a.rs")]);
    }

    #[test]
    fn test_sum_returns_total_only_with_status() {
        let mut args = CallArgs::default();
        args.positional = vec![Value::Float(1.5), Value::Float(2.0)];
        args.keyword.insert("status".into(), Value::Bool(false));
        assert_eq!(sum(args.clone()).unwrap(), Value::None);

        args.keyword.insert("status".into(), Value::Bool(true));
        assert_eq!(sum(args).unwrap(), Value::Float(3.5));
    }
}
