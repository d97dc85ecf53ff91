//! Command workflows
//!
//! Each command loads what it needs from the [`Workspace`] and reports through
//! the `ui` formatter. Argument parsing stays in [`crate::cli::args`].

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::debug;

use crate::boundary::BoundaryWarning;
use crate::changelog::{ChangelogGenerator, ChangelogRange};
use crate::cli::args::{Cli, Command, VersionQuery};
use crate::config::{load_config, Config};
use crate::domain::{BumpDecision, TagPattern, Version, VersionSelection};
use crate::git::{Git2Repository, Repository};
use crate::metadata::{MetadataProjector, ProjectMetadata, VersionMode};
use crate::pipeline::{
    require_token, select_version, HttpPublisher, PipelineOptions, ReleasePipeline,
};
use crate::process::SystemRunner;
use crate::resolver::{BumpPolicy, VersionResolver};
use crate::tasks::{doctor, TaskRunner};
use crate::ui;

/// Project root plus loaded configuration
pub struct Workspace {
    pub config: Config,
    pub root: PathBuf,
}

impl Workspace {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config = load_config(config_path).context("Error loading config")?;
        let root = env::current_dir().context("Cannot determine working directory")?;
        Ok(Workspace { config, root })
    }

    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        Workspace {
            config,
            root: root.into(),
        }
    }

    pub fn repository(&self) -> Result<Git2Repository> {
        Ok(Git2Repository::open(&self.root)?)
    }

    pub fn metadata(&self) -> Result<ProjectMetadata> {
        Ok(ProjectMetadata::load(
            &self.root.join(&self.config.project.pyproject),
        )?)
    }

    pub fn tag_pattern(&self) -> Result<TagPattern> {
        Ok(TagPattern::new(&self.config.versioning.tag_pattern)?)
    }

    pub fn resolver<'a, R: Repository>(
        &self,
        repo: &'a R,
        metadata: &ProjectMetadata,
    ) -> Result<VersionResolver<'a, R>> {
        Ok(VersionResolver::new(repo, self.tag_pattern()?, metadata.static_version()?)
            .with_breaking_indicators(
                self.config
                    .conventional_commits
                    .breaking_change_indicators
                    .clone(),
            ))
    }

    /// Version override from the configured environment variable, if set
    pub fn env_override(&self) -> Result<Option<Version>> {
        let var = &self.config.publish.version_override_var;
        match env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(
                Version::parse(value.trim()).with_context(|| format!("Invalid {}", var))?,
            )),
            _ => Ok(None),
        }
    }
}

fn policy(bump: Option<BumpDecision>) -> BumpPolicy {
    bump.map(BumpPolicy::Fixed).unwrap_or_default()
}

fn mode(next: bool) -> VersionMode {
    if next {
        VersionMode::Next
    } else {
        VersionMode::Current
    }
}

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let ws = Workspace::load(cli.config.as_deref())?;
    let bump = policy(cli.bump);
    debug!(command = ?cli.command, root = %ws.root.display(), "dispatching");

    match cli.command {
        Command::Sync => run_task(&ws, "sync", None),
        Command::Test => run_task(&ws, "test", None),
        Command::Cov { threshold } => run_task(&ws, "cov", threshold),
        Command::Typecheck => run_task(&ws, "typecheck", None),
        Command::Fmt => run_task(&ws, "fmt", None),
        Command::Lint => run_task(&ws, "lint", None),
        Command::Ci => run_task(&ws, "ci", None),
        Command::All => run_task(&ws, "all", None),
        Command::InstallFromTestpypi => run_task(&ws, "install-from-testpypi", None),
        Command::Meta { next, field } => show_meta(&ws, field.as_deref(), mode(next), bump),
        Command::VersionInfo { next } => write_version_info(&ws, next, bump),
        Command::Build { next } => build(&ws, next, bump),
        Command::Changelog => write_changelog(&ws),
        Command::ChangelogUnreleased => preview_changelog(&ws, false, bump),
        Command::ChangelogDryRun => preview_changelog(&ws, true, bump),
        Command::BumpDryRun => bump_dry_run(&ws, bump),
        Command::ReleaseDryRun => {
            bump_dry_run(&ws, bump)?;
            println!();
            preview_changelog(&ws, true, bump)
        }
        Command::PackageTestpypi { version } => package(&ws, version),
        Command::PublishTestpypiDry { version } => publish(&ws, version, true, true),
        Command::PublishTestpypi { version, yes } => publish(&ws, version, false, yes),
        Command::Clean => clean(&ws),
        Command::Doctor => check_tools(&ws),
        Command::Version { mode } => show_version(&ws, mode, bump),
    }
}

fn run_task(ws: &Workspace, task: &str, threshold: Option<u32>) -> Result<()> {
    let runner = SystemRunner;
    let mut tasks = TaskRunner::new(&runner, &ws.config, &ws.root);
    if let Some(threshold) = threshold {
        tasks = tasks.with_coverage_threshold(threshold);
    }
    if task == "install-from-testpypi" {
        tasks = tasks.with_project_name(ws.metadata()?.name);
    }
    tasks.run(task)?;
    ui::display_success(&format!("{} finished", task));
    Ok(())
}

fn show_meta(
    ws: &Workspace,
    field: Option<&str>,
    mode: VersionMode,
    bump: BumpPolicy,
) -> Result<()> {
    let repo = ws.repository()?;
    let metadata = ws.metadata()?;
    let resolver = ws.resolver(&repo, &metadata)?;
    let projector = MetadataProjector::new(&metadata, &resolver).with_policy(bump);

    match field {
        Some(name) => println!("{}", projector.field(name, mode)?),
        None => ui::display_fields(&projector.summary(mode)?),
    }
    Ok(())
}

fn show_version(ws: &Workspace, query: VersionQuery, bump: BumpPolicy) -> Result<()> {
    let repo = ws.repository()?;
    let metadata = ws.metadata()?;
    let resolver = ws.resolver(&repo, &metadata)?;

    let version = match query {
        VersionQuery::Current => resolver.current()?,
        VersionQuery::Next => resolver.next(bump)?,
        VersionQuery::LatestTag => resolver
            .latest_tag()?
            .map(|tag| tag.version)
            .unwrap_or_else(Version::zero),
    };
    println!("{}", version);
    Ok(())
}

/// `--next` stamps the next version; otherwise the same selection a release would use
fn selection_for(
    ws: &Workspace,
    resolver: &VersionResolver<'_, Git2Repository>,
    next: bool,
    bump: BumpPolicy,
) -> Result<VersionSelection> {
    if next {
        return Ok(VersionSelection::from_override(resolver.next(bump)?));
    }
    Ok(select_version(resolver, ws.env_override()?.as_ref())?)
}

fn write_version_info(ws: &Workspace, next: bool, bump: BumpPolicy) -> Result<()> {
    let repo = ws.repository()?;
    let metadata = ws.metadata()?;
    let resolver = ws.resolver(&repo, &metadata)?;
    let selection = selection_for(ws, &resolver, next, bump)?;

    let path = ws.root.join(&ws.config.project.version_info);
    let projector = MetadataProjector::new(&metadata, &resolver);
    let info = projector.write_version_info(&path, &selection)?;
    ui::display_success(&format!("Wrote {} ({})", path.display(), info.version));
    Ok(())
}

fn build(ws: &Workspace, next: bool, bump: BumpPolicy) -> Result<()> {
    let repo = ws.repository()?;
    let metadata = ws.metadata()?;
    let resolver = ws.resolver(&repo, &metadata)?;
    let selection = selection_for(ws, &resolver, next, bump)?;
    ui::display_status(&format!("Building {}", selection));

    let runner = SystemRunner;
    let builder = crate::build::ArtifactBuilder::new(&runner, &ws.config, &metadata, &ws.root);
    let artifacts = builder.build(&selection)?;
    for artifact in artifacts.all() {
        ui::display_success(&format!("{} ({})", artifact.file_name(), artifact.kind));
    }
    Ok(())
}

fn write_changelog(ws: &Workspace) -> Result<()> {
    let repo = ws.repository()?;
    let generator =
        ChangelogGenerator::new(&repo, ws.tag_pattern()?, &ws.config.conventional_commits);
    let path = ws.root.join(&ws.config.project.changelog);
    let notes = generator.write_changelog(&path)?;
    ui::display_success(&format!(
        "Wrote {} ({} releases)",
        path.display(),
        notes.releases.len()
    ));
    Ok(())
}

/// Print unreleased notes; `hypothetical` labels them with the next version
fn preview_changelog(ws: &Workspace, hypothetical: bool, bump: BumpPolicy) -> Result<()> {
    let repo = ws.repository()?;
    let generator =
        ChangelogGenerator::new(&repo, ws.tag_pattern()?, &ws.config.conventional_commits);

    let range = if hypothetical {
        let metadata = ws.metadata()?;
        let resolver = ws.resolver(&repo, &metadata)?;
        ChangelogRange::Hypothetical(resolver.next(bump)?)
    } else {
        ChangelogRange::Unreleased
    };
    ui::display_release_notes(&generator.render(&range)?);
    Ok(())
}

fn bump_dry_run(ws: &Workspace, bump: BumpPolicy) -> Result<()> {
    let repo = ws.repository()?;
    let metadata = ws.metadata()?;
    let resolver = ws.resolver(&repo, &metadata)?;

    for tag in repo.tags()? {
        if !resolver.pattern().matches(&tag.name) {
            ui::display_boundary_warning(&BoundaryWarning::TagMismatchPattern {
                tag: tag.name,
                pattern: resolver.pattern().as_str().to_string(),
            });
        }
    }

    let latest = resolver.latest_tag()?;
    let commits = resolver.unreleased_commits()?;
    if let (Some(tag), true) = (&latest, commits.is_empty()) {
        ui::display_boundary_warning(&BoundaryWarning::NoUnreleasedCommits {
            latest_tag: tag.name.clone(),
            head: repo.head_oid()?.to_string(),
        });
    }

    let parsed = resolver.classify(&commits);
    let decision = match bump {
        BumpPolicy::Conventional => crate::resolver::decide_bump(&parsed),
        BumpPolicy::Fixed(decision) => decision,
    };
    let current = resolver.current()?;
    let next = resolver.next(bump)?;
    ui::display_bump_summary(
        latest.as_ref().map(|t| t.name.as_str()),
        &parsed,
        decision,
        &current,
        &next,
    );
    Ok(())
}

fn package(ws: &Workspace, version: Option<Version>) -> Result<()> {
    let repo = ws.repository()?;
    let metadata = ws.metadata()?;
    let resolver = ws.resolver(&repo, &metadata)?;
    let runner = SystemRunner;
    let publisher = HttpPublisher::new(&ws.config.publish)?;
    let pipeline =
        ReleasePipeline::new(&resolver, &runner, &publisher, &ws.config, &metadata, &ws.root);

    let version = match version {
        Some(v) => Some(v),
        None => ws.env_override()?,
    };
    let report = pipeline.package(version.as_ref())?;
    ui::display_pipeline_report(&report);
    Ok(())
}

fn publish(
    ws: &Workspace,
    version: Option<Version>,
    dry_run: bool,
    confirmed: bool,
) -> Result<()> {
    let token = require_token(&ws.config.publish.token_vars)?;
    let repo = ws.repository()?;
    let metadata = ws.metadata()?;
    let resolver = ws.resolver(&repo, &metadata)?;
    let runner = SystemRunner;
    let publisher = HttpPublisher::new(&ws.config.publish)?;
    let pipeline =
        ReleasePipeline::new(&resolver, &runner, &publisher, &ws.config, &metadata, &ws.root);

    let version_override = match version {
        Some(v) => Some(v),
        None => ws.env_override()?,
    };

    if !confirmed {
        let target = match &version_override {
            Some(v) => v.to_string(),
            None => "the selected version".to_string(),
        };
        if !ui::confirm_action(&format!(
            "Publish {} {} to {}?",
            metadata.name, target, ws.config.publish.publish_url
        ))? {
            println!("Publish cancelled by user.");
            return Ok(());
        }
    }

    let options = PipelineOptions {
        dry_run,
        version_override,
        token: Some(token),
    };
    let mut report = pipeline.execute(&options);
    ui::display_pipeline_report(&report);
    if let Some(error) = report.error.take() {
        return Err(error.into());
    }

    let version = report
        .selection
        .as_ref()
        .map(|s| s.version().to_string())
        .unwrap_or_default();
    if dry_run {
        ui::display_success(&format!("Dry run complete for {} {}", metadata.name, version));
    } else {
        ui::display_success(&format!("Published {} {}", metadata.name, version));
    }
    Ok(())
}

fn clean(ws: &Workspace) -> Result<()> {
    let runner = SystemRunner;
    let removed = TaskRunner::new(&runner, &ws.config, &ws.root).clean()?;
    for path in &removed {
        ui::display_status(&format!("Removed {}", path.display()));
    }
    ui::display_success("Clean");
    Ok(())
}

fn check_tools(ws: &Workspace) -> Result<()> {
    let tools = doctor(&ws.config)?;
    ui::display_tools(&tools);
    Ok(())
}
