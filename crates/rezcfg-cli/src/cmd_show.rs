// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `rezcfg show` command.

use clap::Args;
use colored::Colorize;
use miette::Result;
use rezcfg::{EnvOp, PackageDescriptor, ResolvedConfig, Variant};

#[cfg(test)]
#[path = "./cmd_show_test.rs"]
mod cmd_show_test;

/// Display the descriptor and its resolved configuration
#[derive(Debug, Args)]
pub struct CmdShow {
    #[clap(flatten)]
    descriptor: crate::DescriptorFlags,

    /// Show requirements
    #[clap(long)]
    requires: bool,

    /// Show the resolved release and environment
    #[clap(long)]
    release: bool,

    /// Show all information
    #[clap(long)]
    all: bool,

    /// Output format: table, yaml, json
    #[clap(long, default_value = "table")]
    format: String,
}

impl CmdShow {
    pub fn run(&mut self) -> Result<i32> {
        let descriptor = self.descriptor.load()?;

        // The descriptor is still worth showing when the release
        // environment is not set up.
        let resolved = self.descriptor.mode_override().and_then(|mode| {
            let env = rezcfg::EnvSnapshot::capture();
            Ok(rezcfg::resolve_config(&descriptor, &env, mode)?)
        });
        if let Err(err) = &resolved {
            tracing::debug!("resolution failed: {err}");
        }

        let show_requires = self.requires || self.all || (!self.requires && !self.release);
        let show_release = self.release || self.all || (!self.requires && !self.release);

        match self.format.as_str() {
            "yaml" | "json" => {
                let value = serde_json::json!({
                    "descriptor": descriptor,
                    "resolved": resolved.as_ref().ok(),
                });
                if self.format == "yaml" {
                    let yaml = serde_yaml::to_string(&value)
                        .map_err(|e| miette::miette!("Failed to serialize output: {e}"))?;
                    print!("{yaml}");
                } else {
                    let json = serde_json::to_string_pretty(&value)
                        .map_err(|e| miette::miette!("Failed to serialize output: {e}"))?;
                    println!("{json}");
                }
            }
            "table" => {
                self.show_package_table(&descriptor);
                if show_requires {
                    println!();
                    self.show_requires_table(&descriptor);
                }
                if show_release {
                    println!();
                    match &resolved {
                        Ok(resolved) => self.show_release_table(resolved),
                        Err(err) => {
                            println!("{}", "Release:".bold());
                            println!();
                            println!("  {} {err}", "unresolved:".red());
                        }
                    }
                }
            }
            other => {
                return Err(miette::miette!(
                    "Unknown output format {other:?} (expected table, yaml or json)"
                ));
            }
        }

        Ok(0)
    }

    fn show_package_table(&self, descriptor: &PackageDescriptor) {
        println!(
            "{} {}",
            descriptor.name.bold().cyan(),
            descriptor.version.green()
        );
        if let Some(desc) = &descriptor.description {
            println!("  {}", desc.dimmed());
        }
        if !descriptor.authors.is_empty() {
            println!("  authors: {}", descriptor.authors.join(", "));
        }
        println!("  uuid: {}", descriptor.uuid);
        if let Some(path) = &descriptor.source_path {
            println!("  file: {}", path.display());
        }

        println!();
        println!("{}", "Variants:".bold());
        if descriptor.variants.is_empty() {
            println!("  {}", "(no variants)".dimmed());
        }
        for (i, variant) in descriptor.variants.iter().enumerate() {
            println!("  {}. [{}]", i + 1, variant.to_string().yellow());
            let summary = variant_summary(variant);
            if !summary.is_empty() {
                println!("     {}", summary.dimmed());
            }
        }
    }

    fn show_requires_table(&self, descriptor: &PackageDescriptor) {
        println!("{}", "Requires:".bold());
        println!();

        if descriptor.requires.is_empty() {
            println!("  {}", "(no requirements)".dimmed());
        }
        for (i, req) in descriptor.requires.iter().enumerate() {
            let constraint = req.constraint.as_deref().unwrap_or("*");
            println!("  {}. {} {}", i + 1, req.name.cyan(), constraint.green());
        }

        if !descriptor.private_build_requires.is_empty() {
            println!();
            println!("{}", "Private build requires:".bold());
            println!();
            for (i, req) in descriptor.private_build_requires.iter().enumerate() {
                let constraint = req.constraint.as_deref().unwrap_or("*");
                println!("  {}. {} {}", i + 1, req.name.cyan(), constraint.green());
            }
        }

        println!();
        println!(
            "Total: {} requirement(s)",
            descriptor.all_requirements().count()
        );
    }

    fn show_release_table(&self, resolved: &ResolvedConfig) {
        println!("{}", "Release:".bold());
        println!();
        println!(
            "  mode: {} (from {})",
            resolved.release.mode.to_string().yellow(),
            resolved.release.variable
        );
        println!("  repository: {}", resolved.release.path.green());
        println!("  install root: {}", resolved.install_root.green());

        let env = &resolved.environment;
        if !env.pre_build_commands.is_empty() {
            println!();
            println!("{}", "Pre-build Commands:".bold());
            println!();
            for (i, cmd) in env.pre_build_commands.iter().enumerate() {
                println!("  {}. {}", i + 1, cmd);
            }
        }

        if !env.operations.is_empty() {
            println!();
            println!("{}", "Environment Variables:".bold());
            println!();

            for (i, op) in env.operations.iter().enumerate() {
                match op {
                    EnvOp::Set(s) => {
                        println!("  {}. {} = {}", i + 1, s.set.cyan(), s.value.green());
                    }
                    EnvOp::Prepend(p) => {
                        println!(
                            "  {}. {} = {} + ${}",
                            i + 1,
                            p.prepend.cyan(),
                            p.value.green(),
                            p.prepend
                        );
                    }
                    EnvOp::Append(a) => {
                        println!(
                            "  {}. {} = ${} + {}",
                            i + 1,
                            a.append.cyan(),
                            a.append,
                            a.value.green()
                        );
                    }
                    EnvOp::Comment(c) => {
                        println!("  # {}", c.comment.dimmed());
                    }
                }
            }
        }
    }
}

/// Platform, arch and os of a variant, skipping any it does not declare.
fn variant_summary(variant: &Variant) -> String {
    [
        ("platform", variant.platform()),
        ("arch", variant.arch()),
        ("os", variant.os()),
    ]
    .into_iter()
    .filter_map(|(key, value)| Some(format!("{key}: {}", value?)))
    .collect::<Vec<_>>()
    .join(", ")
}
