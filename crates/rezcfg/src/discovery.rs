// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Locating the package.yaml to operate on.

use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "./discovery_test.rs"]
mod discovery_test;

use crate::{PackageDescriptor, DESCRIPTOR_FILENAME};

/// Resolve starting path, preferring $PWD to preserve symlinks.
fn resolve_start_path(start_path: &Path) -> PathBuf {
    if start_path.is_absolute() {
        start_path.to_owned()
    } else {
        match std::env::var("PWD").ok() {
            Some(pwd) => PathBuf::from(pwd).join(start_path),
            None => std::env::current_dir()
                .unwrap_or_default()
                .join(start_path),
        }
    }
}

/// Find the descriptor for `start_path`.
///
/// A file path is used as-is. For a directory, `package.yaml` is looked up in
/// that directory and then in each parent until one is found.
pub fn find_descriptor<P: AsRef<Path>>(start_path: P) -> crate::Result<PathBuf> {
    let start = resolve_start_path(start_path.as_ref());

    if start.is_file() {
        return dunce::canonicalize(&start).map_err(crate::Error::from);
    }
    if !start.is_dir() {
        return Err(crate::Error::NotFoundAtPath(start));
    }

    let mut current = start.clone();
    loop {
        let candidate = current.join(DESCRIPTOR_FILENAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "found descriptor");
            return dunce::canonicalize(&candidate).map_err(crate::Error::from);
        }
        if !current.pop() {
            return Err(crate::Error::NotFoundInTree(start));
        }
    }
}

/// Find and load the descriptor for `start_path`.
pub fn discover_descriptor<P: AsRef<Path>>(start_path: P) -> crate::Result<PackageDescriptor> {
    let path = find_descriptor(start_path)?;
    PackageDescriptor::load(path)
}
