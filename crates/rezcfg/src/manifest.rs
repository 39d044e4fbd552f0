// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Release manifests: a record of what a resolution produced, used to detect
//! when a descriptor or its release environment has drifted.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::release::ReleaseTarget;
use crate::{PackageDescriptor, ResolvedConfig};

#[cfg(test)]
#[path = "./manifest_test.rs"]
mod manifest_test;

/// Manifest API version.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum ManifestApiVersion {
    #[serde(rename = "rezcfg/v0/manifest")]
    V0,
}

/// Release manifest capturing the descriptor and its resolved configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReleaseManifest {
    pub api: ManifestApiVersion,
    pub generated: GenerationMetadata,
    pub descriptor: DescriptorSource,
    pub package: String,
    pub version: String,
    pub uuid: String,
    pub release: ReleaseTarget,
    pub install_root: String,
    pub pre_build_commands: Vec<String>,
    pub exports: IndexMap<String, String>,
}

/// Metadata about when and where the manifest was generated.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub timestamp: DateTime<Utc>,
    pub rezcfg_version: String,
    pub hostname: String,
}

/// Descriptor the manifest was generated from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DescriptorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub sha256: String,
}

/// Hash the descriptor's source file, or its canonical YAML form when it was
/// not loaded from disk.
pub fn descriptor_digest(descriptor: &PackageDescriptor) -> crate::Result<String> {
    let content = match &descriptor.source_path {
        Some(path) => std::fs::read(path).map_err(|e| crate::Error::ReadFailed {
            path: path.clone(),
            error: e,
        })?,
        None => serde_yaml::to_string(descriptor)
            .map_err(|e| crate::Error::ValidationFailed(format!("cannot serialize descriptor: {e}")))?
            .into_bytes(),
    };
    Ok(format!("{:x}", Sha256::digest(&content)))
}

/// Generate a manifest from a descriptor and its resolved configuration.
pub fn generate_manifest(
    descriptor: &PackageDescriptor,
    resolved: &ResolvedConfig,
) -> crate::Result<ReleaseManifest> {
    Ok(ReleaseManifest {
        api: ManifestApiVersion::V0,
        generated: GenerationMetadata {
            timestamp: Utc::now(),
            rezcfg_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
        },
        descriptor: DescriptorSource {
            path: descriptor.source_path.clone(),
            sha256: descriptor_digest(descriptor)?,
        },
        package: resolved.package.clone(),
        version: resolved.version.clone(),
        uuid: resolved.uuid.clone(),
        release: resolved.release.clone(),
        install_root: resolved.install_root.clone(),
        pre_build_commands: resolved.environment.pre_build_commands.clone(),
        exports: resolved.environment.exports.clone(),
    })
}

/// Compare a manifest with the current descriptor and resolution.
pub fn verify_manifest(
    manifest: &ReleaseManifest,
    descriptor: &PackageDescriptor,
    resolved: &ResolvedConfig,
) -> crate::Result<Vec<ManifestChange>> {
    let mut changes = Vec::new();

    let digest = descriptor_digest(descriptor)?;
    if digest != manifest.descriptor.sha256 {
        changes.push(ManifestChange::new(
            ManifestChangeKind::DescriptorChanged,
            descriptor
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| descriptor.name.clone()),
            Some(manifest.descriptor.sha256.clone()),
            Some(digest),
        ));
    }

    if manifest.version != resolved.version {
        changes.push(ManifestChange::new(
            ManifestChangeKind::VersionChanged,
            resolved.package.clone(),
            Some(manifest.version.clone()),
            Some(resolved.version.clone()),
        ));
    }

    if manifest.release != resolved.release {
        changes.push(ManifestChange::new(
            ManifestChangeKind::ReleasePathChanged,
            resolved.release.variable.clone(),
            Some(format!("{} ({})", manifest.release.path, manifest.release.mode)),
            Some(format!("{} ({})", resolved.release.path, resolved.release.mode)),
        ));
    }

    if manifest.pre_build_commands != resolved.environment.pre_build_commands {
        changes.push(ManifestChange::new(
            ManifestChangeKind::PreBuildChanged,
            "pre_build_commands".to_string(),
            Some(manifest.pre_build_commands.join("; ")),
            Some(resolved.environment.pre_build_commands.join("; ")),
        ));
    }

    for (name, expected) in &manifest.exports {
        match resolved.environment.exports.get(name) {
            None => changes.push(ManifestChange::new(
                ManifestChangeKind::ExportRemoved,
                name.clone(),
                Some(expected.clone()),
                None,
            )),
            Some(actual) if actual != expected => changes.push(ManifestChange::new(
                ManifestChangeKind::ExportChanged,
                name.clone(),
                Some(expected.clone()),
                Some(actual.clone()),
            )),
            Some(_) => {}
        }
    }

    for (name, actual) in &resolved.environment.exports {
        if !manifest.exports.contains_key(name) {
            changes.push(ManifestChange::new(
                ManifestChangeKind::ExportAdded,
                name.clone(),
                None,
                Some(actual.clone()),
            ));
        }
    }

    Ok(changes)
}

/// A single detected change between a manifest and the current resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestChange {
    pub kind: ManifestChangeKind,
    pub reference: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ManifestChange {
    fn new(
        kind: ManifestChangeKind,
        reference: String,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        Self {
            kind,
            reference,
            expected,
            actual,
        }
    }
}

/// Types of manifest mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestChangeKind {
    DescriptorChanged,
    VersionChanged,
    ReleasePathChanged,
    PreBuildChanged,
    ExportChanged,
    ExportAdded,
    ExportRemoved,
}
