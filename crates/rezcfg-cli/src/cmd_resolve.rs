// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `rezcfg resolve` command.

use clap::Args;
use miette::Result;

/// Print the resolved release path
#[derive(Debug, Args)]
pub struct CmdResolve {
    #[clap(flatten)]
    descriptor: crate::DescriptorFlags,

    /// Print the package install root instead of the repository path
    #[clap(long)]
    install_root: bool,
}

impl CmdResolve {
    pub fn run(&mut self) -> Result<i32> {
        let (_, resolved) = self.descriptor.resolve()?;

        if self.install_root {
            println!("{}", resolved.install_root);
        } else {
            println!("{}", resolved.release.path);
        }

        Ok(0)
    }
}
