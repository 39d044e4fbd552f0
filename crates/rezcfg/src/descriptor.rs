// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Package descriptor parsing and data types for package.yaml files.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::environment::{validate_ops, EnvOp};
use crate::release::ReleaseMode;
use crate::requirement::{Requirement, Variant};
use crate::Error;

#[cfg(test)]
#[path = "./descriptor_test.rs"]
mod descriptor_test;

/// API version for descriptor files.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum ApiVersion {
    #[serde(rename = "rezcfg/v0")]
    V0,
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::V0
    }
}

/// Helper for two-stage deserialization to determine API version first.
#[derive(Deserialize)]
struct ApiVersionMapping {
    #[serde(default)]
    api: ApiVersion,
}

/// The `release:` section of a descriptor.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Release mode tag: `int` or `ext`.
    ///
    /// Kept as written so an unrecognized tag is reported when the release
    /// path is resolved rather than as a YAML error.
    pub mode: String,
}

/// Static metadata describing one buildable package.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageDescriptor {
    /// API version identifier.
    #[serde(default)]
    pub api: ApiVersion,

    pub name: String,

    /// Semantic version of the package.
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Where the package is released to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseConfig>,

    /// Runtime dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requirement>,

    /// Dependencies needed only while building this package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_build_requires: Vec<Requirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,

    /// Shell commands run before compilation, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_build_commands: Vec<String>,

    /// Environment operations applied once the package is built.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<EnvOp>,

    /// Globally unique package identifier.
    #[serde(default)]
    pub uuid: String,

    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl PackageDescriptor {
    /// Parse descriptor from YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();

        // Stage 1: Parse to get API version
        let value: serde_yaml::Value =
            serde_yaml::from_str(&yaml).map_err(|e| Error::InvalidYaml {
                error: e,
                yaml_content: yaml.clone(),
            })?;

        let with_version: ApiVersionMapping =
            serde_yaml::from_value(value.clone()).map_err(|e| Error::InvalidYaml {
                error: e,
                yaml_content: yaml.clone(),
            })?;

        // Stage 2: Deserialize based on version
        match with_version.api {
            ApiVersion::V0 => serde_yaml::from_value(value).map_err(|e| Error::InvalidYaml {
                error: e,
                yaml_content: yaml,
            }),
        }
    }

    /// Load descriptor from file path.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;

        let mut descriptor = Self::from_yaml(yaml)?;
        descriptor.source_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), name = %descriptor.name, "loaded descriptor");
        Ok(descriptor)
    }

    /// Validate descriptor after loading.
    ///
    /// Variants are not required here; see [`Self::ensure_buildable`].
    pub fn validate(&self) -> crate::Result<()> {
        if !crate::requirement::is_valid_name(&self.name) {
            return Err(Error::ValidationFailed(format!(
                "invalid package name {:?}",
                self.name
            )));
        }

        self.semver()?;

        if self.uuid.trim().is_empty() {
            return Err(Error::ValidationFailed(format!(
                "package {} has no uuid",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for req in self.requires.iter().chain(&self.private_build_requires) {
            if req.name == self.name {
                return Err(Error::ValidationFailed(format!(
                    "package {} requires itself",
                    self.name
                )));
            }
            if !seen.insert(req.name.as_str()) {
                return Err(Error::DuplicateRequirement(req.name.clone()));
            }
        }

        for (i, variant) in self.variants.iter().enumerate() {
            variant.validate()?;
            if self.variants[..i].contains(variant) {
                return Err(Error::ValidationFailed(format!(
                    "variant [{variant}] is declared more than once"
                )));
            }
        }

        if self.pre_build_commands.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::ValidationFailed(
                "pre_build_commands contains an empty command".to_string(),
            ));
        }

        validate_ops(&self.commands)
    }

    /// Check that the package can be built: it must declare a variant.
    pub fn ensure_buildable(&self) -> crate::Result<()> {
        if self.variants.is_empty() {
            return Err(Error::NoVariants(self.name.clone()));
        }
        Ok(())
    }

    /// Parsed package version.
    pub fn semver(&self) -> crate::Result<semver::Version> {
        semver::Version::parse(&self.version).map_err(|e| Error::InvalidVersion {
            version: self.version.clone(),
            error: e,
        })
    }

    /// Release mode declared in the descriptor, if any.
    pub fn release_mode(&self) -> crate::Result<Option<ReleaseMode>> {
        self.release
            .as_ref()
            .map(|r| r.mode.parse())
            .transpose()
    }

    /// Runtime and build-only requirements, runtime first.
    pub fn all_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requires.iter().chain(&self.private_build_requires)
    }
}

impl Default for PackageDescriptor {
    fn default() -> Self {
        Self {
            api: ApiVersion::default(),
            name: String::new(),
            version: String::new(),
            authors: Vec::new(),
            description: None,
            release: None,
            requires: Vec::new(),
            private_build_requires: Vec::new(),
            variants: Vec::new(),
            pre_build_commands: Vec::new(),
            commands: Vec::new(),
            uuid: String::new(),
            source_path: None,
        }
    }
}
