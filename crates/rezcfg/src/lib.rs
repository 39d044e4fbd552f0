// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! rezcfg - Package Descriptor Resolution
//!
//! This crate loads rez-style package descriptors (`package.yaml`) and
//! resolves them against the process environment into a release target and
//! the commands and variables applied around a build.
//!
//! # Overview
//!
//! The release repository is chosen by the descriptor's release mode: `int`
//! reads `SSE_REZ_REPO_RELEASE_INT` and `ext` reads
//! `SSE_REZ_REPO_RELEASE_EXT`. A missing variable is a hard error. The
//! package installs to `<release path>/<name>/<version>`, and `{root}` in
//! pre-build commands and environment operations is replaced with that path.
//!
//! # Example
//!
//! ```yaml
//! # package.yaml
//! api: rezcfg/v0
//! name: xstudio
//! version: 0.1.0
//! release:
//!   mode: ext
//! requires:
//!   - qt-5.15
//! variants:
//!   - [platform-linux, arch-x86_64, os-centos-7]
//! pre_build_commands:
//!   - source /opt/rh/devtoolset-9/enable
//! commands:
//!   - set: REZ_XSTUDIO_ROOT
//!     value: "{root}"
//! uuid: repository.xstudio
//! ```

pub mod descriptor;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod release;
pub mod requirement;
pub mod resolve;

pub use descriptor::{ApiVersion, PackageDescriptor, ReleaseConfig};
pub use discovery::{discover_descriptor, find_descriptor};
pub use environment::{
    build_environment_commands, generate_pre_build_script, generate_startup_script,
    BuildEnvironment, EnvOp,
};
pub use error::{Error, Result};
pub use manifest::{
    generate_manifest, verify_manifest, ManifestChange, ManifestChangeKind, ReleaseManifest,
};
pub use release::{
    resolve_release_path, resolve_release_path_str, EnvSnapshot, EnvSource, ReleaseMode,
    ReleaseTarget,
};
pub use requirement::{Requirement, Variant};
pub use resolve::{resolve_config, ResolvedConfig};

/// Well-known filename for package descriptors.
pub const DESCRIPTOR_FILENAME: &str = "package.yaml";

/// Well-known filename for release manifests.
pub const MANIFEST_FILENAME: &str = "package.manifest.yaml";
