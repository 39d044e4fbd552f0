// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! rezcfg - Package Descriptor Resolution CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;
use rezcfg::{PackageDescriptor, ReleaseMode, ResolvedConfig};

mod cmd_check;
mod cmd_env;
mod cmd_init;
mod cmd_record;
mod cmd_resolve;
mod cmd_show;

use cmd_check::CmdCheck;
use cmd_env::CmdEnv;
use cmd_init::CmdInit;
use cmd_record::CmdRecord;
use cmd_resolve::CmdResolve;
use cmd_show::CmdShow;

#[derive(Parser)]
#[clap(
    name = "rezcfg",
    about = "Package Descriptor Resolution",
    version,
    long_about = "Resolve package.yaml descriptors into release paths and build environments"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// Flags selecting the descriptor and release mode.
#[derive(Parser, Clone, Debug)]
pub struct DescriptorFlags {
    /// Descriptor file, or directory to search upwards from
    #[clap(short = 'f', long, env = "REZCFG_FILE", default_value = ".")]
    pub file: PathBuf,

    /// Release mode (int or ext), overriding the descriptor
    #[clap(long = "release-as", env = "REZCFG_RELEASE_AS")]
    pub release_as: Option<String>,
}

impl DescriptorFlags {
    /// Locate and validate the descriptor.
    pub fn load(&self) -> Result<PackageDescriptor> {
        let descriptor = rezcfg::discover_descriptor(&self.file)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn mode_override(&self) -> Result<Option<ReleaseMode>> {
        Ok(self
            .release_as
            .as_deref()
            .map(str::parse::<ReleaseMode>)
            .transpose()?)
    }

    /// Load the descriptor and resolve it against the process environment.
    pub fn resolve(&self) -> Result<(PackageDescriptor, ResolvedConfig)> {
        let descriptor = self.load()?;
        let mode = self.mode_override()?;
        let env = rezcfg::EnvSnapshot::capture();
        let resolved = rezcfg::resolve_config(&descriptor, &env, mode)?;
        Ok((descriptor, resolved))
    }
}

/// Path of the release manifest that sits next to a descriptor.
pub fn manifest_path(descriptor: &PackageDescriptor) -> PathBuf {
    descriptor
        .source_path
        .as_ref()
        .and_then(|p| p.parent())
        .map(|dir| dir.join(rezcfg::MANIFEST_FILENAME))
        .unwrap_or_else(|| PathBuf::from(rezcfg::MANIFEST_FILENAME))
}

#[derive(Subcommand)]
enum Command {
    /// Create a new package.yaml file
    Init(CmdInit),

    /// Display the descriptor and its resolved configuration
    Show(CmdShow),

    /// Print the resolved release path
    Resolve(CmdResolve),

    /// Print the build environment as a shell script
    Env(CmdEnv),

    /// Write or update the release manifest
    Record(CmdRecord),

    /// Verify the current resolution matches the release manifest
    Check(CmdCheck),
}

impl Opt {
    fn run(self) -> Result<i32> {
        // Setup logging
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        // Dispatch to command
        match self.cmd {
            Command::Init(mut cmd) => cmd.run(),
            Command::Show(mut cmd) => cmd.run(),
            Command::Resolve(mut cmd) => cmd.run(),
            Command::Env(mut cmd) => cmd.run(),
            Command::Record(mut cmd) => cmd.run(),
            Command::Check(mut cmd) => cmd.run(),
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
