//! CLI argument parsing.
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// Automated security patching for Python, npm, and Maven dependencies.
#[derive(Parser, Debug)]
#[command(name = "depmend", version, about, long_about = None)]
pub struct Args {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Ecosystem subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Python/pip package remediation (post-install patching).
    #[command(subcommand)]
    Pip(PipCommand),

    /// npm/yarn/pnpm package remediation (lock file and package.json patching).
    #[command(subcommand)]
    Npm(NpmCommand),

    /// Maven package remediation (pre-install patching of pom.xml).
    #[command(subcommand)]
    Maven(MavenCommand),
}

#[derive(Subcommand, Debug)]
pub enum PipCommand {
    /// Remediate installed Python packages.
    Remediate(PipRemediateArgs),
}

#[derive(Subcommand, Debug)]
pub enum NpmCommand {
    /// Remediate npm packages declared in the lock file.
    Remediate(NpmRemediateArgs),
}

#[derive(Subcommand, Debug)]
pub enum MavenCommand {
    /// Remediate Maven dependencies declared in pom.xml.
    Remediate(MavenRemediateArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PipRemediateArgs {
    #[arg(long)]
    /// Path to the Python interpreter. Falls back to PYTHON_PATH env var.
    pub python_path: Option<String>,

    #[arg(long)]
    /// Preview changes without applying them. Falls back to DRY_RUN env var.
    pub dry_run: Option<bool>,

    #[arg(long)]
    /// Install vendor-aliased packages. Falls back to USE_ALIAS env var.
    pub use_alias: Option<bool>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct NpmRemediateArgs {
    #[arg(long, value_enum, default_value_t = PackageManager::Npm)]
    /// Package manager whose lock file should be patched.
    pub package_manager: PackageManager,

    #[arg(long)]
    /// Preview changes without applying them. Falls back to DRY_RUN env var.
    pub dry_run: Option<bool>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct MavenRemediateArgs {
    #[arg(long, default_value = "pom.xml")]
    /// Path to the POM file.
    pub file: PathBuf,

    #[arg(long)]
    /// Preview changes without applying them. Falls back to DRY_RUN env var.
    pub dry_run: Option<bool>,
}

/// Node package manager choice, driving the lock file name and the
/// package.json field that carries version overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Lock file this package manager maintains.
    pub fn lock_file(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package-lock.json",
            PackageManager::Yarn => "yarn.lock",
            PackageManager::Pnpm => "pnpm-lock.yaml",
        }
    }

    /// package.json field holding version overrides. pnpm nests its field
    /// under a top-level `pnpm` object.
    pub fn override_field(&self) -> &'static str {
        match self {
            PackageManager::Yarn => "resolutions",
            PackageManager::Npm | PackageManager::Pnpm => "overrides",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
