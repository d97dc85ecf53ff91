use crate::domain::{BumpDecision, Version};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "relcraft",
    version,
    about = "Derive versions and release notes from conventional commits and publish artifacts"
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        help = "Force the bump used for the next version (major, minor, patch, none)"
    )]
    pub bump: Option<BumpDecision>,

    #[command(subcommand)]
    pub command: Command,
}

/// Which version `relcraft version` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum VersionQuery {
    #[default]
    Current,
    Next,
    LatestTag,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Install project dependencies
    Sync,
    /// Print project metadata
    Meta {
        #[arg(long, help = "Use the next version instead of the current one")]
        next: bool,
        #[arg(long, help = "Print a single field: name, version or description")]
        field: Option<String>,
    },
    /// Write the version metadata file
    VersionInfo {
        #[arg(long)]
        next: bool,
    },
    /// Build the source and binary distributions
    Build {
        #[arg(long, help = "Stamp the artifacts with the next version")]
        next: bool,
    },
    /// Run the test suite
    Test,
    /// Run the test suite with a coverage gate
    Cov { threshold: Option<u32> },
    /// Run the type checker
    Typecheck,
    /// Format sources
    Fmt,
    /// Lint sources
    Lint,
    /// Lint, type check and test
    Ci,
    /// Sync, format, lint, type check and coverage
    All,
    /// Regenerate CHANGELOG.md from the full history
    Changelog,
    /// Print release notes for commits since the last release
    ChangelogUnreleased,
    /// Show the bump the unreleased commits imply
    BumpDryRun,
    /// Preview the notes of the next release
    ChangelogDryRun,
    /// Preview the next version and its release notes
    ReleaseDryRun,
    /// Build, validate and smoke test the distributions
    PackageTestpypi { version: Option<Version> },
    /// Run the full publish pipeline without uploading
    PublishTestpypiDry { version: Option<Version> },
    /// Run the full publish pipeline and upload
    PublishTestpypi {
        version: Option<Version>,
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Install the published package from the test index
    InstallFromTestpypi,
    /// Remove build outputs and tool caches
    Clean,
    /// Check that required tools are installed
    Doctor,
    /// Print a resolved version
    Version {
        #[arg(long, value_enum, default_value_t = VersionQuery::Current)]
        mode: VersionQuery,
    },
}
