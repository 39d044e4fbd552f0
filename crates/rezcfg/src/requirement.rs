// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Package requirements (`name-version`) and build variants.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg(test)]
#[path = "./requirement_test.rs"]
mod requirement_test;

/// A dependency on another package, optionally constrained to a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Requirement {
    pub name: String,
    /// Version constraint, e.g. `1.1.1` or `5.15`. `None` accepts any version.
    pub constraint: Option<String>,
}

impl Requirement {
    pub fn new<S: Into<String>>(name: S, constraint: Option<&str>) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.map(String::from),
        }
    }
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        // The version starts at the first '-' that is followed by a digit.
        let split = s
            .char_indices()
            .zip(s.chars().skip(1))
            .find(|((_, c), next)| *c == '-' && next.is_ascii_digit())
            .map(|((i, _), _)| i);

        let (name, constraint) = match split {
            Some(i) => (&s[..i], Some(&s[i + 1..])),
            None => (s, None),
        };

        if !is_valid_name(name) {
            return Err(Error::InvalidRequirement(s.to_string()));
        }
        if let Some(c) = constraint {
            if c.is_empty() || c.chars().any(char::is_whitespace) {
                return Err(Error::InvalidRequirement(s.to_string()));
            }
        }

        Ok(Self::new(name, constraint))
    }
}

impl TryFrom<String> for Requirement {
    type Error = Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

impl From<Requirement> for String {
    fn from(req: Requirement) -> Self {
        req.to_string()
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}-{c}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// One combination of platform tags a package is built for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Variant {
    pub tags: Vec<String>,
}

impl Variant {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Value of the tag with the given key, e.g. `arch` in `arch-x86_64`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.iter().find_map(|tag| {
            let (k, v) = tag.split_once('-')?;
            (k == key).then_some(v)
        })
    }

    pub fn platform(&self) -> Option<&str> {
        self.get("platform")
    }

    pub fn arch(&self) -> Option<&str> {
        self.get("arch")
    }

    pub fn os(&self) -> Option<&str> {
        self.get("os")
    }

    /// Check tags are non-empty and not repeated.
    pub fn validate(&self) -> crate::Result<()> {
        if self.tags.is_empty() {
            return Err(Error::ValidationFailed("variant has no tags".to_string()));
        }
        for (i, tag) in self.tags.iter().enumerate() {
            if tag.trim().is_empty() {
                return Err(Error::ValidationFailed(format!(
                    "variant [{self}] contains an empty tag"
                )));
            }
            if self.tags[..i].contains(tag) {
                return Err(Error::ValidationFailed(format!(
                    "variant [{self}] repeats tag {tag}"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tags.join(", "))
    }
}
