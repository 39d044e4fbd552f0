// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `rezcfg init` command.

use clap::Args;
use miette::Result;
use std::path::PathBuf;

#[cfg(test)]
#[path = "./cmd_init_test.rs"]
mod cmd_init_test;

/// Create a new package.yaml file
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Directory to create file in
    #[clap(default_value = ".")]
    pub path: PathBuf,

    /// Package name (defaults to the directory name)
    #[clap(long)]
    pub name: Option<String>,

    /// Initial package version
    #[clap(long, default_value = "0.1.0")]
    pub version: String,

    /// Release mode: int or ext
    #[clap(long = "release-as", default_value = "ext")]
    pub release_as: String,

    /// Add initial requirement (name or name-version)
    #[clap(long = "require")]
    pub requires: Vec<String>,

    /// Template to use: minimal, standard
    #[clap(long, default_value = "standard")]
    pub template: String,
}

impl CmdInit {
    pub fn run(&mut self) -> Result<i32> {
        let spec_path = self.path.join(rezcfg::DESCRIPTOR_FILENAME);

        // Check if file already exists
        if spec_path.exists() {
            return Err(miette::miette!(
                "package.yaml already exists at {:?}",
                spec_path
            ));
        }

        let content = self.render()?;

        std::fs::write(&spec_path, content)
            .map_err(|e| miette::miette!("Failed to write package.yaml: {}", e))?;

        println!("Created package.yaml at {:?}", spec_path);
        println!();
        println!("Next steps:");
        println!("  1. Edit the file to add requirements and variants");
        println!("  2. Run 'rezcfg show' to preview the resolved configuration");
        println!("  3. Run 'rezcfg record' to write the release manifest");

        Ok(0)
    }

    /// Produce the descriptor text, checked to parse and validate.
    pub fn render(&self) -> Result<String> {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => dir_name(&self.path)?,
        };
        let mode: rezcfg::ReleaseMode = self.release_as.parse()?;
        for req in &self.requires {
            req.parse::<rezcfg::Requirement>()?;
        }

        let content = match self.template.as_str() {
            "minimal" => self.generate_minimal_template(&name, mode),
            _ => self.generate_standard_template(&name, mode),
        };

        let descriptor = rezcfg::PackageDescriptor::from_yaml(content.as_str())?;
        descriptor.validate()?;
        Ok(content)
    }

    fn requires_section(&self) -> String {
        if self.requires.is_empty() {
            "requires: []\n".to_string()
        } else {
            format!(
                "requires:\n{}\n",
                self.requires
                    .iter()
                    .map(|r| format!("  - {}", r))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        }
    }

    fn generate_minimal_template(&self, name: &str, mode: rezcfg::ReleaseMode) -> String {
        format!(
            "api: rezcfg/v0\n\
            name: {name}\n\
            version: {version}\n\
            release:\n  mode: {mode}\n\
            {requires}\
            variants:\n  - [platform-linux, arch-x86_64]\n\
            uuid: repository.{name}\n",
            version = self.version,
            requires = self.requires_section(),
        )
    }

    fn generate_standard_template(&self, name: &str, mode: rezcfg::ReleaseMode) -> String {
        format!(
            "# rezcfg package descriptor\n\
            \n\
            api: rezcfg/v0\n\
            \n\
            name: {name}\n\
            version: {version}\n\
            # authors:\n\
            #   - Your Studio\n\
            # description: \"What this package provides\"\n\
            \n\
            # Where to release: internal (int) reads $SSE_REZ_REPO_RELEASE_INT,\n\
            # external (ext) reads $SSE_REZ_REPO_RELEASE_EXT\n\
            release:\n  mode: {mode}\n\
            \n\
            # Runtime requirements (name or name-version)\n\
            {requires}\
            \n\
            # Requirements only needed while building\n\
            private_build_requires: []\n\
            \n\
            variants:\n  - [platform-linux, arch-x86_64]\n\
            \n\
            # Shell commands run before compilation\n\
            # pre_build_commands:\n\
            #   - source /opt/rh/devtoolset-9/enable\n\
            \n\
            # Environment operations applied after build; {{root}} is the install root\n\
            commands:\n\
            \x20 - set: {var}\n\
            \x20   value: \"{{root}}\"\n\
            \n\
            uuid: repository.{name}\n",
            version = self.version,
            requires = self.requires_section(),
            var = root_variable(name),
        )
    }
}

/// `REZ_<NAME>_ROOT` for a package name.
fn root_variable(name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("REZ_{upper}_ROOT")
}

fn dir_name(path: &std::path::Path) -> Result<String> {
    let abs = std::path::absolute(path)
        .map_err(|e| miette::miette!("Failed to resolve {:?}: {e}", path))?;
    abs.components()
        .next_back()
        .and_then(|c| c.as_os_str().to_str())
        .map(String::from)
        .filter(|n| n != "." && n != "/")
        .ok_or_else(|| miette::miette!("Cannot derive a package name from {:?}; pass --name", path))
}
