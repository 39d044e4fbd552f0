// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Resolution of a whole descriptor into a release target and build
//! environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::{build_environment_commands, BuildEnvironment};
use crate::release::{EnvSource, ReleaseMode, ReleaseTarget};
use crate::{Error, PackageDescriptor};

#[cfg(test)]
#[path = "./resolve_test.rs"]
mod resolve_test;

/// Fully-resolved build configuration for one package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedConfig {
    pub package: String,
    pub version: String,
    pub uuid: String,
    pub release: ReleaseTarget,
    /// `<release path>/<name>/<version>`
    pub install_root: String,
    pub environment: BuildEnvironment,
}

/// Compute where a package version is installed inside a release repository.
pub fn install_root(release_path: &str, name: &str, version: &str) -> String {
    Path::new(release_path)
        .join(name)
        .join(version)
        .to_string_lossy()
        .into_owned()
}

/// Resolve a descriptor against an environment.
///
/// `mode_override` takes precedence over the descriptor's `release.mode`. An
/// unrecognized mode fails before the environment is consulted.
pub fn resolve_config<E: EnvSource + ?Sized>(
    descriptor: &PackageDescriptor,
    env: &E,
    mode_override: Option<ReleaseMode>,
) -> crate::Result<ResolvedConfig> {
    descriptor.validate()?;
    descriptor.ensure_buildable()?;

    let mode = match mode_override {
        Some(mode) => mode,
        None => descriptor.release_mode()?.ok_or_else(|| {
            Error::ValidationFailed(format!(
                "package {} declares no release mode; set release.mode or pass a mode",
                descriptor.name
            ))
        })?,
    };

    let release = ReleaseTarget::resolve(mode, env)?;
    let install_root = install_root(&release.path, &descriptor.name, &descriptor.version);
    let environment = build_environment_commands(descriptor, &install_root)?;

    tracing::info!(
        package = %descriptor.name,
        version = %descriptor.version,
        %mode,
        %install_root,
        "resolved release configuration"
    );

    Ok(ResolvedConfig {
        package: descriptor.name.clone(),
        version: descriptor.version.clone(),
        uuid: descriptor.uuid.clone(),
        release,
        install_root,
        environment,
    })
}
