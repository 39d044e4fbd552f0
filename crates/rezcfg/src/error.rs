// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for rezcfg operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with rezcfg Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or resolving a package descriptor.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A required environment variable was not set
    #[error("Required environment variable is not set: {0}")]
    #[diagnostic(
        code(rezcfg::missing_environment_variable),
        help("Export the variable with the release repository path before resolving")
    )]
    MissingEnvironmentVariable(String),

    /// Install root was empty or relative
    #[error("Invalid install root {0:?}: expected a non-empty absolute path")]
    #[diagnostic(code(rezcfg::invalid_install_root))]
    InvalidInstallRoot(String),

    /// Release mode flag was not recognized
    #[error("Unknown release mode: {mode:?}")]
    #[diagnostic(
        code(rezcfg::unknown_release_mode),
        help("{}", release_modes_message(expected))
    )]
    UnknownReleaseMode {
        mode: String,
        expected: Vec<&'static str>,
    },

    /// No package.yaml found in directory tree
    #[error("No package.yaml found in {0:?} or any parent directory")]
    #[diagnostic(
        code(rezcfg::not_found_in_tree),
        help("Create a package.yaml file with 'rezcfg init' or specify a path with -f")
    )]
    NotFoundInTree(PathBuf),

    /// Descriptor not found at specified path
    #[error("Package descriptor not found at {0:?}")]
    #[diagnostic(code(rezcfg::not_found_at_path))]
    NotFoundAtPath(PathBuf),

    /// Invalid YAML in descriptor file
    #[error("Invalid package descriptor: {error}")]
    #[diagnostic(
        code(rezcfg::invalid_yaml),
        help("Check YAML syntax and ensure 'api: rezcfg/v0' is present")
    )]
    InvalidYaml {
        #[source]
        error: serde_yaml::Error,
        yaml_content: String,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(rezcfg::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Package version is not a semantic version
    #[error("Invalid package version {version:?}")]
    #[diagnostic(
        code(rezcfg::invalid_version),
        help("Package versions must be semantic versions, e.g. 1.2.3")
    )]
    InvalidVersion {
        version: String,
        #[source]
        error: semver::Error,
    },

    /// Requirement string could not be parsed
    #[error("Invalid requirement {0:?}")]
    #[diagnostic(
        code(rezcfg::invalid_requirement),
        help("Requirements are written as name or name-version, e.g. qt-5.15")
    )]
    InvalidRequirement(String),

    /// The same dependency was declared more than once
    #[error("Dependency declared more than once: {0}")]
    #[diagnostic(code(rezcfg::duplicate_requirement))]
    DuplicateRequirement(String),

    /// The same environment variable was set more than once
    #[error("Environment variable exported more than once: {0}")]
    #[diagnostic(
        code(rezcfg::duplicate_export),
        help("Use prepend or append to extend a variable instead of setting it twice")
    )]
    DuplicateExport(String),

    /// Build attempted without any variant
    #[error("Package {0} declares no variants")]
    #[diagnostic(
        code(rezcfg::no_variants),
        help("Declare at least one variant, e.g. [platform-linux, arch-x86_64]")
    )]
    NoVariants(String),

    /// Validation error
    #[error("Validation failed: {0}")]
    #[diagnostic(code(rezcfg::validation_failed))]
    ValidationFailed(String),

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(rezcfg::io_error))]
    Io(#[from] std::io::Error),
}

fn release_modes_message(expected: &[&'static str]) -> String {
    format!("Valid release modes are: {}", expected.join(", "))
}
