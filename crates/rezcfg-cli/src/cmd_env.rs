// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `rezcfg env` command.

use clap::Args;
use miette::Result;

/// Print the build environment as a shell script
#[derive(Debug, Args)]
pub struct CmdEnv {
    #[clap(flatten)]
    descriptor: crate::DescriptorFlags,

    /// Install root to substitute for {root}, skipping release resolution
    #[clap(long, env = "REZCFG_ROOT")]
    root: Option<String>,

    /// Print the pre-build commands instead of the post-build exports
    #[clap(long)]
    pre_build: bool,
}

impl CmdEnv {
    pub fn run(&mut self) -> Result<i32> {
        let environment = match &self.root {
            Some(root) => {
                let descriptor = self.descriptor.load()?;
                rezcfg::build_environment_commands(&descriptor, root)?
            }
            None => self.descriptor.resolve()?.1.environment,
        };

        let script = if self.pre_build {
            rezcfg::generate_pre_build_script(&environment.pre_build_commands)
        } else {
            rezcfg::generate_startup_script(&environment.operations)
        };
        print!("{script}");

        Ok(0)
    }
}
