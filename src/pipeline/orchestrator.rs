use crate::boundary::BoundaryWarning;
use crate::build::{Artifact, ArtifactBuilder, ArtifactSet};
use crate::config::Config;
use crate::domain::{SynthesisSource, Version, VersionSelection};
use crate::error::{RelcraftError, Result};
use crate::git::Repository;
use crate::metadata::ProjectMetadata;
use crate::pipeline::publisher::Publisher;
use crate::pipeline::state::{PipelineReport, PipelineState};
use crate::process::{CommandRunner, CommandSpec, Placeholders};
use crate::resolver::VersionResolver;
use chrono::Utc;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// First configured token variable that is set to a non-empty value
pub fn resolve_token(variables: &[String]) -> Option<String> {
    variables
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

/// Like [`resolve_token`], failing with `AuthMissing` when no variable is set
pub fn require_token(variables: &[String]) -> Result<String> {
    resolve_token(variables).ok_or_else(|| RelcraftError::AuthMissing {
        variables: variables.to_vec(),
    })
}

/// The release tag at HEAD, else the override, else a fresh development version
pub fn select_version<R: Repository>(
    resolver: &VersionResolver<'_, R>,
    version_override: Option<&Version>,
) -> Result<VersionSelection> {
    if let Some(tag) = resolver.head_tag()? {
        if version_override.is_some_and(|v| *v != tag.version) {
            warn!(tag = %tag.name, "HEAD is on a release tag; ignoring version override");
        }
        return Ok(VersionSelection::TagResolved {
            tag: tag.name,
            version: tag.version,
        });
    }
    Ok(match version_override {
        Some(version) => VersionSelection::from_override(version.clone()),
        None => VersionSelection::development(Utc::now()),
    })
}

/// Per-invocation publish settings
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub dry_run: bool,
    /// Used when HEAD is not on a release tag
    pub version_override: Option<Version>,
    pub token: Option<String>,
}

/// Drives build, validation, smoke test, version check and publish in order
///
/// Fail-fast and strictly sequential; nothing is rolled back.
pub struct ReleasePipeline<'a, R: Repository, C: CommandRunner, P: Publisher> {
    resolver: &'a VersionResolver<'a, R>,
    runner: &'a C,
    publisher: &'a P,
    config: &'a Config,
    metadata: &'a ProjectMetadata,
    root: PathBuf,
}

impl<'a, R: Repository, C: CommandRunner, P: Publisher> ReleasePipeline<'a, R, C, P> {
    pub fn new(
        resolver: &'a VersionResolver<'a, R>,
        runner: &'a C,
        publisher: &'a P,
        config: &'a Config,
        metadata: &'a ProjectMetadata,
        root: &Path,
    ) -> Self {
        ReleasePipeline {
            resolver,
            runner,
            publisher,
            config,
            metadata,
            root: root.to_path_buf(),
        }
    }

    pub fn select_version(&self, version_override: Option<&Version>) -> Result<VersionSelection> {
        select_version(self.resolver, version_override)
    }

    /// Run the pipeline and return the error class on abort
    pub fn run(&self, options: &PipelineOptions) -> Result<PipelineReport> {
        let mut report = self.execute(options);
        match report.error.take() {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }

    /// Run the pipeline, recording the outcome (including any abort) in the report
    pub fn execute(&self, options: &PipelineOptions) -> PipelineReport {
        let mut report = PipelineReport::new();
        if let Err(error) = self.drive(options, &mut report) {
            warn!(state = %report.final_state(), error = %error, "release pipeline aborted");
            report.abort(error);
        }
        report
    }

    fn drive(&self, options: &PipelineOptions, report: &mut PipelineReport) -> Result<()> {
        let token = options
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| RelcraftError::AuthMissing {
                variables: self.config.publish.token_vars.clone(),
            })?;

        let selection = self.select_version(options.version_override.as_ref())?;
        info!(selection = %selection, dry_run = options.dry_run, "starting release pipeline");
        report.selection = Some(selection.clone());

        let artifacts = self.prepare(&selection, report)?;

        self.confirm_version(&selection, &artifacts, options.dry_run, report)?;
        report.advance(PipelineState::VersionSelected);

        if options.dry_run {
            self.publisher.negotiate(token)?;
            info!("dry run complete; nothing uploaded");
            report.advance(PipelineState::DryRunComplete);
        } else {
            for artifact in artifacts.distributions() {
                self.publisher
                    .upload(artifact, self.metadata, &artifacts.version, token)?;
                report.uploaded.push(artifact.file_name());
            }
            report.advance(PipelineState::Published);
        }
        Ok(())
    }

    /// Build, validate and smoke test without a token or any index access
    pub fn package(&self, version_override: Option<&Version>) -> Result<PipelineReport> {
        let mut report = PipelineReport::new();
        let selection = self.select_version(version_override)?;
        report.selection = Some(selection.clone());
        self.prepare(&selection, &mut report)?;
        Ok(report)
    }

    fn prepare(
        &self,
        selection: &VersionSelection,
        report: &mut PipelineReport,
    ) -> Result<ArtifactSet> {
        let builder = ArtifactBuilder::new(self.runner, self.config, self.metadata, &self.root);
        let artifacts = builder.build(selection)?;
        report.artifacts = Some(artifacts.clone());
        report.advance(PipelineState::Built);

        for artifact in artifacts.distributions() {
            self.validate(artifact)?;
        }
        report.advance(PipelineState::Validated);

        for artifact in artifacts.distributions() {
            self.smoke_test(artifact)?;
        }
        report.advance(PipelineState::SmokeTested);
        Ok(artifacts)
    }

    fn validate(&self, artifact: &Artifact) -> Result<()> {
        let vars = placeholders(&[("artifact", artifact.path().display().to_string())]);
        let spec = CommandSpec::from_template(&self.config.validate.command, &vars)?
            .current_dir(&self.root);
        let output = self.runner.run(&spec)?;
        if !output.is_success() {
            return Err(RelcraftError::validation(format!(
                "{}: {}",
                artifact.file_name(),
                output.diagnostics()
            )));
        }
        debug!(file = %artifact.file_name(), "metadata valid");
        Ok(())
    }

    /// Install into a throwaway environment and invoke the entry point
    fn smoke_test(&self, artifact: &Artifact) -> Result<()> {
        let scratch = TempDir::new()?;
        let env_dir = scratch.path().join("venv");
        let env_bin = env_dir.join(if cfg!(windows) { "Scripts" } else { "bin" });
        let vars = placeholders(&[
            ("env", env_dir.display().to_string()),
            ("env_bin", env_bin.display().to_string()),
            ("artifact", artifact.path().display().to_string()),
            ("entry", self.config.smoke_test.entry_point.clone()),
        ]);

        for step in &self.config.smoke_test.steps {
            let spec = CommandSpec::from_template(step, &vars)?.current_dir(scratch.path());
            let output = self.runner.run(&spec)?;
            if !output.is_success() {
                return Err(RelcraftError::smoke_test(format!(
                    "{} (`{}`): {}",
                    artifact.file_name(),
                    spec,
                    output.diagnostics()
                )));
            }
        }
        debug!(file = %artifact.file_name(), "smoke test passed");
        Ok(())
    }

    fn confirm_version(
        &self,
        selection: &VersionSelection,
        artifacts: &ArtifactSet,
        dry_run: bool,
        report: &mut PipelineReport,
    ) -> Result<()> {
        let version = selection.version();
        if artifacts.version != *version || !artifacts.is_consistent() {
            return Err(RelcraftError::build(format!(
                "Artifacts are stamped {} but {} was selected",
                artifacts.version, version
            )));
        }

        if let VersionSelection::Synthesized {
            source: SynthesisSource::Timestamp,
            ..
        } = selection
        {
            report.warnings.push(BoundaryWarning::DevelopmentVersion {
                version: version.to_string(),
            });
        }

        if self.publisher.version_exists(&self.metadata.name, version)? {
            if !dry_run {
                return Err(RelcraftError::DuplicateVersion {
                    name: self.metadata.name.clone(),
                    version: version.to_string(),
                });
            }
            report.warnings.push(BoundaryWarning::VersionAlreadyPublished {
                name: self.metadata.name.clone(),
                version: version.to_string(),
            });
        }
        Ok(())
    }
}

fn placeholders(pairs: &[(&str, String)]) -> Placeholders {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
