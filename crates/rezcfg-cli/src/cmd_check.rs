// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Verify that the current resolution matches the release manifest.

use std::path::Path;

use clap::Args;
use miette::Result;

#[cfg(test)]
#[path = "./cmd_check_test.rs"]
mod cmd_check_test;

/// Verify the current resolution matches the release manifest
#[derive(Debug, Args)]
pub struct CmdCheck {
    #[clap(flatten)]
    descriptor: crate::DescriptorFlags,

    /// Exit with error on mismatch
    #[clap(long)]
    strict: bool,
}

pub fn read_manifest(path: &Path) -> Result<rezcfg::ReleaseManifest> {
    let yaml = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read manifest {:?}: {e}", path))?;
    serde_yaml::from_str(&yaml)
        .map_err(|e| miette::miette!("Failed to parse manifest {:?}: {e}", path))
}

impl CmdCheck {
    pub fn run(&mut self) -> Result<i32> {
        let (descriptor, resolved) = self.descriptor.resolve()?;
        let manifest_path = crate::manifest_path(&descriptor);

        if !manifest_path.exists() {
            if self.strict {
                return Err(miette::miette!("No release manifest found at {:?}", manifest_path));
            } else {
                println!("Warning: No release manifest found");
                return Ok(2);
            }
        }

        let manifest = read_manifest(&manifest_path)?;
        let changes = rezcfg::verify_manifest(&manifest, &descriptor, &resolved)?;

        if changes.is_empty() {
            println!("✓ Resolution matches release manifest");
            return Ok(0);
        }

        let header = if self.strict { "Error" } else { "Warning" };
        let report = format_report(header, &changes);
        if self.strict {
            eprint!("{report}");
            return Ok(1);
        }
        print!("{report}");

        println!("\nRun 'rezcfg record --update' to update the release manifest");
        Ok(0)
    }
}

/// Render manifest differences under a single header.
fn format_report(header: &str, changes: &[rezcfg::ManifestChange]) -> String {
    let mut report = format!("{header}: Resolution differs from release manifest:\n");
    for change in changes {
        match &change.kind {
            rezcfg::ManifestChangeKind::DescriptorChanged => {
                report.push_str(&format!("  - Descriptor '{}' was modified\n", change.reference));
            }
            rezcfg::ManifestChangeKind::ReleasePathChanged
            | rezcfg::ManifestChangeKind::ExportChanged
            | rezcfg::ManifestChangeKind::VersionChanged => {
                report.push_str(&format!("  - '{}' changed\n", change.reference));
                if let (Some(exp), Some(act)) = (&change.expected, &change.actual) {
                    report.push_str(&format!("    Expected: {exp}\n"));
                    report.push_str(&format!("    Actual:   {act}\n"));
                }
            }
            _ => {
                report.push_str(&format!("  - {:?}: {}\n", change.kind, change.reference));
            }
        }
    }
    report
}
