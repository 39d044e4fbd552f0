// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Write or update the release manifest for a package.

use clap::Args;
use miette::Result;

/// Write or update the release manifest
#[derive(Debug, Args)]
pub struct CmdRecord {
    #[clap(flatten)]
    descriptor: crate::DescriptorFlags,

    /// Update existing manifest
    #[clap(long)]
    update: bool,

    /// Force regeneration even if up-to-date
    #[clap(long)]
    force: bool,
}

impl CmdRecord {
    pub fn run(&mut self) -> Result<i32> {
        let (descriptor, resolved) = self.descriptor.resolve()?;
        let manifest_path = crate::manifest_path(&descriptor);

        if manifest_path.exists() && !self.update && !self.force {
            return Err(miette::miette!(
                "Release manifest already exists at {:?}. Use --update or --force",
                manifest_path
            ));
        }

        if manifest_path.exists() && self.update && !self.force {
            let existing = crate::cmd_check::read_manifest(&manifest_path)?;
            let changes = rezcfg::verify_manifest(&existing, &descriptor, &resolved)?;
            if changes.is_empty() {
                println!("Release manifest is up to date: {:?}", manifest_path);
                return Ok(0);
            }
        }

        let manifest = rezcfg::generate_manifest(&descriptor, &resolved)?;
        let manifest_yaml = serde_yaml::to_string(&manifest).map_err(|e| {
            miette::miette!("Failed to serialize manifest {:?}: {e}", manifest_path)
        })?;

        std::fs::write(&manifest_path, manifest_yaml)
            .map_err(|e| miette::miette!("Failed to write manifest {:?}: {e}", manifest_path))?;
        tracing::info!(path = %manifest_path.display(), "wrote release manifest");
        println!("Generated release manifest: {:?}", manifest_path);

        Ok(0)
    }
}
