// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Release mode selection and release repository path resolution.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./release_test.rs"]
mod release_test;

/// Environment variable holding the internal release repository path.
pub const RELEASE_INT_VAR: &str = "SSE_REZ_REPO_RELEASE_INT";

/// Environment variable holding the external release repository path.
pub const RELEASE_EXT_VAR: &str = "SSE_REZ_REPO_RELEASE_EXT";

/// Where build artifacts are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ReleaseMode {
    #[serde(rename = "int", alias = "internal")]
    Internal,
    #[serde(rename = "ext", alias = "external")]
    External,
}

impl ReleaseMode {
    /// Every release mode, in declaration order.
    pub const ALL: [ReleaseMode; 2] = [ReleaseMode::Internal, ReleaseMode::External];

    /// Short literal tag used in descriptors (`int` or `ext`).
    pub fn tag(self) -> &'static str {
        match self {
            Self::Internal => "int",
            Self::External => "ext",
        }
    }

    /// Long form accepted in place of the tag.
    pub fn alias(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }

    /// Name of the environment variable holding this mode's repository path.
    pub fn variable(self) -> &'static str {
        match self {
            Self::Internal => RELEASE_INT_VAR,
            Self::External => RELEASE_EXT_VAR,
        }
    }

    /// All accepted literal tags, in declaration order.
    pub fn tags() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.tag()).collect()
    }
}

impl std::fmt::Display for ReleaseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ReleaseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.tag() == s || m.alias() == s)
            .ok_or_else(|| Error::UnknownReleaseMode {
                mode: s.to_string(),
                expected: Self::tags(),
            })
    }
}

/// Read-only view of a set of environment variables.
pub trait EnvSource {
    /// Look up a variable by name.
    fn var(&self, name: &str) -> Option<&str>;
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<&str> {
        (**self).var(name)
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Snapshot of the process environment taken at a single point in time.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }
}

impl EnvSource for EnvSnapshot {
    fn var(&self, name: &str) -> Option<&str> {
        self.vars.var(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Resolve the release repository path for a mode.
///
/// The variable mapped to `mode` must be present. Its value is returned as
/// set, even when empty; there is no fallback to the other mode's repository.
pub fn resolve_release_path<E: EnvSource + ?Sized>(mode: ReleaseMode, env: &E) -> Result<String> {
    let variable = mode.variable();
    tracing::debug!(%mode, variable, "looking up release repository");
    env.var(variable)
        .map(String::from)
        .ok_or_else(|| Error::MissingEnvironmentVariable(variable.to_string()))
}

/// Parse a release mode tag and resolve its path.
///
/// Unknown tags fail before the environment is consulted.
pub fn resolve_release_path_str<E: EnvSource + ?Sized>(tag: &str, env: &E) -> Result<String> {
    let mode: ReleaseMode = tag.parse()?;
    resolve_release_path(mode, env)
}

/// The resolved publish target for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseTarget {
    pub mode: ReleaseMode,
    /// Variable the path was read from.
    pub variable: String,
    pub path: String,
}

impl ReleaseTarget {
    pub fn resolve<E: EnvSource + ?Sized>(mode: ReleaseMode, env: &E) -> Result<Self> {
        let path = resolve_release_path(mode, env)?;
        Ok(Self {
            mode,
            variable: mode.variable().to_string(),
            path,
        })
    }
}
