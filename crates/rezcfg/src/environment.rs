// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Build environment construction: pre-build commands, post-build
//! environment operations and `{root}` placeholder substitution.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, PackageDescriptor, Result};

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;

const DEFAULT_SEPARATOR: &str = ":";

/// A single environment operation applied after the package is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EnvOp {
    Set(SetEnv),
    Prepend(PrependEnv),
    Append(AppendEnv),
    Comment(CommentEnv),
}

/// Set a variable, replacing any previous value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetEnv {
    pub set: String,
    pub value: String,
}

/// Add a value to the front of a path-like variable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrependEnv {
    pub prepend: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

/// Add a value to the end of a path-like variable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppendEnv {
    pub append: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentEnv {
    pub comment: String,
}

impl EnvOp {
    /// Name of the variable this operation touches, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::Set(s) => Some(&s.set),
            Self::Prepend(p) => Some(&p.prepend),
            Self::Append(a) => Some(&a.append),
            Self::Comment(_) => None,
        }
    }

    fn map_value<F: Fn(&str) -> String>(&self, f: F) -> Self {
        match self {
            Self::Set(s) => Self::Set(SetEnv {
                set: s.set.clone(),
                value: f(&s.value),
            }),
            Self::Prepend(p) => Self::Prepend(PrependEnv {
                prepend: p.prepend.clone(),
                value: f(&p.value),
                separator: p.separator.clone(),
            }),
            Self::Append(a) => Self::Append(AppendEnv {
                append: a.append.clone(),
                value: f(&a.value),
                separator: a.separator.clone(),
            }),
            Self::Comment(c) => Self::Comment(c.clone()),
        }
    }
}

fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check variable names and that no variable is `set` twice.
pub fn validate_ops(ops: &[EnvOp]) -> Result<()> {
    let mut exported = HashSet::new();
    for op in ops {
        let Some(name) = op.variable() else {
            continue;
        };
        if !is_valid_variable_name(name) {
            return Err(Error::ValidationFailed(format!(
                "invalid environment variable name {name:?}"
            )));
        }
        if let EnvOp::Set(s) = op {
            if !exported.insert(s.set.as_str()) {
                return Err(Error::DuplicateExport(s.set.clone()));
            }
        }
    }
    Ok(())
}

/// Values substituted for `{...}` placeholders.
#[derive(Debug, Clone)]
pub struct Placeholders<'a> {
    pub root: &'a str,
    pub name: &'a str,
    pub version: &'a str,
}

impl Placeholders<'_> {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "root" => Some(self.root),
            "name" => Some(self.name),
            "version" => Some(self.version),
            _ => None,
        }
    }

    /// Replace every known `{key}` in `input`.
    ///
    /// Known keys are replaced even inside `${...}`, so no known token
    /// survives. Unknown keys such as `${PATH}` are left as-is, and
    /// substituted text is never scanned again.
    pub fn expand(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find('{') {
            let (before, tail) = rest.split_at(start);
            out.push_str(before);
            let replacement = tail[1..]
                .find('}')
                .and_then(|end| Some((end, self.lookup(&tail[1..end + 1])?)));
            match replacement {
                Some((end, value)) => {
                    out.push_str(value);
                    rest = &tail[end + 2..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Commands and variables applied around building one package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildEnvironment {
    /// Shell commands run in order before compilation.
    pub pre_build_commands: Vec<String>,

    /// Post-build environment operations, in order.
    pub operations: Vec<EnvOp>,

    /// Variables set by `operations`, with their final values.
    pub exports: IndexMap<String, String>,
}

/// Check that an install root is a non-empty absolute path.
pub fn validate_install_root(install_root: &str) -> Result<()> {
    if install_root.trim().is_empty() || !Path::new(install_root).is_absolute() {
        return Err(Error::InvalidInstallRoot(install_root.to_string()));
    }
    Ok(())
}

/// Build the pre-build command sequence and post-build exports for a package
/// installed at `install_root`.
///
/// This only constructs data. Running the commands is left to the caller.
pub fn build_environment_commands(
    descriptor: &PackageDescriptor,
    install_root: &str,
) -> Result<BuildEnvironment> {
    validate_install_root(install_root)?;
    descriptor.ensure_buildable()?;
    validate_ops(&descriptor.commands)?;

    let placeholders = Placeholders {
        root: install_root,
        name: &descriptor.name,
        version: &descriptor.version,
    };

    let pre_build_commands = descriptor
        .pre_build_commands
        .iter()
        .map(|cmd| placeholders.expand(cmd))
        .collect();

    let operations: Vec<EnvOp> = descriptor
        .commands
        .iter()
        .map(|op| op.map_value(|v| placeholders.expand(v)))
        .collect();

    let exports = operations
        .iter()
        .filter_map(|op| match op {
            EnvOp::Set(s) => Some((s.set.clone(), s.value.clone())),
            _ => None,
        })
        .collect();

    tracing::debug!(
        package = %descriptor.name,
        install_root,
        "built environment commands"
    );

    Ok(BuildEnvironment {
        pre_build_commands,
        operations,
        exports,
    })
}

/// Escape a value for use inside double quotes in a POSIX shell.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render environment operations as a bash script.
pub fn generate_startup_script(ops: &[EnvOp]) -> String {
    let mut script = String::new();
    for op in ops {
        match op {
            EnvOp::Comment(c) => {
                for line in c.comment.lines() {
                    script.push_str(&format!("# {line}\n"));
                }
            }
            EnvOp::Set(s) => {
                script.push_str(&format!("export {}=\"{}\"\n", s.set, escape_value(&s.value)));
            }
            EnvOp::Prepend(p) => {
                let sep = p.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
                script.push_str(&format!(
                    "export {name}=\"{value}{sep}${{{name}}}\"\n",
                    name = p.prepend,
                    value = escape_value(&p.value),
                    sep = escape_value(sep),
                ));
            }
            EnvOp::Append(a) => {
                let sep = a.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
                script.push_str(&format!(
                    "export {name}=\"${{{name}}}{sep}{value}\"\n",
                    name = a.append,
                    value = escape_value(&a.value),
                    sep = escape_value(sep),
                ));
            }
        }
    }
    script
}

/// Render pre-build commands as a bash script that stops at the first
/// failing command.
pub fn generate_pre_build_script(commands: &[String]) -> String {
    let mut script = String::from("#!/bin/bash\nset -e\n");
    for cmd in commands {
        script.push_str(cmd);
        script.push('\n');
    }
    script
}
