use crate::build::artifact::{carries_version, Artifact, ArtifactKind, ArtifactSet};
use crate::config::Config;
use crate::domain::{Version, VersionSelection};
use crate::error::{RelcraftError, Result};
use crate::metadata::{ProjectMetadata, VersionInfo};
use crate::process::{CommandRunner, CommandSpec, Placeholders};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Produces distributions stamped with an explicitly supplied version
///
/// The builder never resolves versions itself; the selection is its only
/// version input.
pub struct ArtifactBuilder<'a, C: CommandRunner> {
    runner: &'a C,
    config: &'a Config,
    metadata: &'a ProjectMetadata,
    root: PathBuf,
}

impl<'a, C: CommandRunner> ArtifactBuilder<'a, C> {
    pub fn new(
        runner: &'a C,
        config: &'a Config,
        metadata: &'a ProjectMetadata,
        root: &Path,
    ) -> Self {
        ArtifactBuilder {
            runner,
            config,
            metadata,
            root: root.to_path_buf(),
        }
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.config.project.dist_dir)
    }

    pub fn version_info_path(&self) -> PathBuf {
        self.root.join(&self.config.project.version_info)
    }

    /// Remove previous build outputs
    pub fn clean(&self) -> Result<()> {
        let dist = self.dist_dir();
        if dist.exists() {
            debug!(path = %dist.display(), "removing previous outputs");
            fs::remove_dir_all(&dist)?;
        }
        Ok(())
    }

    /// Build sdist, wheel and the optional native executable
    pub fn build(&self, selection: &VersionSelection) -> Result<ArtifactSet> {
        let version = selection.version();
        info!(version = %version, "building artifacts");

        self.clean()?;
        VersionInfo::new(self.metadata, version).write(&self.version_info_path())?;

        let vars = self.placeholders(version);
        self.run_step(&self.config.build.command, &vars, version)?;
        if let Some(native) = &self.config.build.native_command {
            self.run_step(native, &vars, version)?;
        }

        self.collect(version)
    }

    fn placeholders(&self, version: &Version) -> Placeholders {
        [
            ("dist", self.dist_dir().display().to_string()),
            ("version", version.to_pep440()),
            ("name", self.metadata.name.clone()),
            ("version_info", self.version_info_path().display().to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn run_step(&self, template: &[String], vars: &Placeholders, version: &Version) -> Result<()> {
        let rendered = version.to_pep440();
        let mut spec = CommandSpec::from_template(template, vars)?
            .current_dir(&self.root)
            .env(self.config.publish.version_override_var.as_str(), rendered.as_str());
        for var in &self.config.build.version_env {
            spec = spec.env(var.as_str(), rendered.as_str());
        }

        let output = self.runner.run(&spec)?;
        if !output.is_success() {
            return Err(RelcraftError::build(format!(
                "`{}` failed: {}",
                spec,
                output.diagnostics()
            )));
        }
        Ok(())
    }

    /// Scan the output directory; every file must carry the version
    fn collect(&self, version: &Version) -> Result<ArtifactSet> {
        let dist = self.dist_dir();
        if !dist.is_dir() {
            return Err(RelcraftError::build(format!(
                "Build produced no output directory {}",
                dist.display()
            )));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dist)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut sdist = None;
        let mut wheel = None;
        let mut native = None;

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.starts_with('.') {
                continue;
            }
            if !carries_version(&name, version) {
                return Err(RelcraftError::build(format!(
                    "Artifact {} is not stamped with version {}",
                    name, version
                )));
            }

            let kind = ArtifactKind::from_file_name(&name);
            let slot = match kind {
                ArtifactKind::Sdist => &mut sdist,
                ArtifactKind::Wheel => &mut wheel,
                ArtifactKind::Native => &mut native,
            };
            if slot.is_some() {
                return Err(RelcraftError::build(format!(
                    "More than one {} produced in {}",
                    kind,
                    dist.display()
                )));
            }
            *slot = Some(Artifact::new(kind, path));
        }

        let missing = |kind: ArtifactKind| {
            RelcraftError::build(format!("No {} produced in {}", kind, dist.display()))
        };
        let set = ArtifactSet {
            version: version.clone(),
            sdist: sdist.ok_or_else(|| missing(ArtifactKind::Sdist))?,
            wheel: wheel.ok_or_else(|| missing(ArtifactKind::Wheel))?,
            native,
        };
        for artifact in set.all() {
            debug!(kind = %artifact.kind, file = %artifact.file_name(), "collected artifact");
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockRunner};
    use tempfile::TempDir;

    fn metadata() -> ProjectMetadata {
        ProjectMetadata {
            name: "ftbatch-bulk-edit".to_string(),
            description: "Bulk edit".to_string(),
            version: None,
        }
    }

    /// Fake backend writing files named after the version it was given
    fn backend(dist: PathBuf, stamp_with: Option<&'static str>) -> MockRunner {
        MockRunner::with_responder(move |spec| {
            let version = stamp_with
                .map(str::to_string)
                .or_else(|| spec.env.get("RELCRAFT_VERSION").cloned())
                .unwrap_or_default();
            fs::create_dir_all(&dist).unwrap();
            fs::write(dist.join(format!("ftbatch_bulk_edit-{}.tar.gz", version)), "sdist").unwrap();
            fs::write(
                dist.join(format!("ftbatch_bulk_edit-{}-py3-none-any.whl", version)),
                "wheel",
            )
            .unwrap();
            CommandOutput::success()
        })
    }

    #[test]
    fn test_build_exports_version_and_collects_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let metadata = metadata();
        let runner = backend(dir.path().join("dist"), None);
        let builder = ArtifactBuilder::new(&runner, &config, &metadata, dir.path());

        let selection = VersionSelection::from_override(Version::new(1, 2, 0));
        let set = builder.build(&selection).unwrap();

        assert_eq!(set.version, Version::new(1, 2, 0));
        assert_eq!(set.sdist.file_name(), "ftbatch_bulk_edit-1.2.0.tar.gz");
        assert!(set.native.is_none());

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].env.get("PDM_BUILD_SCM_VERSION").map(String::as_str), Some("1.2.0"));
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));

        let info = VersionInfo::read(&dir.path().join("build/version_info.json")).unwrap();
        assert_eq!(info.version, "1.2.0");
    }

    #[test]
    fn test_prerelease_override_builds_with_index_spelling() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let metadata = metadata();
        let runner = backend(dir.path().join("dist"), None);
        let builder = ArtifactBuilder::new(&runner, &config, &metadata, dir.path());

        let rc = Version::parse("1.0.0-rc.1").unwrap();
        let set = builder.build(&VersionSelection::from_override(rc.clone())).unwrap();

        assert_eq!(set.version, rc);
        assert_eq!(set.sdist.file_name(), "ftbatch_bulk_edit-1.0.0rc1.tar.gz");
        assert!(set.is_consistent());
        let calls = runner.calls();
        assert_eq!(calls[0].env.get("RELCRAFT_VERSION").map(String::as_str), Some("1.0.0rc1"));
    }

    #[test]
    fn test_artifact_with_wrong_version_is_build_error() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let metadata = metadata();
        let runner = backend(dir.path().join("dist"), Some("9.9.9"));
        let builder = ArtifactBuilder::new(&runner, &config, &metadata, dir.path());

        let err = builder
            .build(&VersionSelection::from_override(Version::new(1, 2, 0)))
            .unwrap_err();
        assert!(matches!(err, RelcraftError::Build(ref msg) if msg.contains("not stamped")));
    }

    #[test]
    fn test_failing_backend_carries_diagnostics() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let metadata = metadata();
        let runner = MockRunner::with_responder(|_| CommandOutput::failure(1, "invalid pyproject"));
        let builder = ArtifactBuilder::new(&runner, &config, &metadata, dir.path());

        let err = builder
            .build(&VersionSelection::from_override(Version::new(1, 0, 0)))
            .unwrap_err();
        match err {
            RelcraftError::Build(msg) => assert!(msg.contains("invalid pyproject")),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_clean_removes_stale_outputs() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("dist");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("ftbatch_bulk_edit-0.1.0.tar.gz"), "old").unwrap();

        let config = Config::default();
        let metadata = metadata();
        let runner = backend(stale.clone(), None);
        let builder = ArtifactBuilder::new(&runner, &config, &metadata, dir.path());

        let set = builder
            .build(&VersionSelection::from_override(Version::new(0, 2, 0)))
            .unwrap();
        assert!(set.is_consistent());
        assert!(!stale.join("ftbatch_bulk_edit-0.1.0.tar.gz").exists());
    }

    #[test]
    fn test_native_step_runs_after_distributions() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.native_command = Some(vec![
            "pyinstaller".to_string(),
            "--version-file".to_string(),
            "{version_info}".to_string(),
        ]);
        let metadata = metadata();
        let dist = dir.path().join("dist");
        let runner = MockRunner::with_responder(move |spec| {
            let version = spec.env.get("RELCRAFT_VERSION").cloned().unwrap_or_default();
            fs::create_dir_all(&dist).unwrap();
            if spec.program == "pyinstaller" {
                fs::write(dist.join(format!("ftbatch-bulk-edit-{}.exe", version)), "bin").unwrap();
            } else {
                fs::write(dist.join(format!("pkg-{}.tar.gz", version)), "s").unwrap();
                fs::write(dist.join(format!("pkg-{}-py3-none-any.whl", version)), "w").unwrap();
            }
            CommandOutput::success()
        });
        let builder = ArtifactBuilder::new(&runner, &config, &metadata, dir.path());

        let set = builder
            .build(&VersionSelection::from_override(Version::new(2, 0, 0)))
            .unwrap();
        assert_eq!(set.native.unwrap().file_name(), "ftbatch-bulk-edit-2.0.0.exe");
        let lines = runner.command_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("version_info.json"));
    }
}
