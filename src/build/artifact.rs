use crate::domain::Version;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Sdist,
    Wheel,
    Native,
}

impl ArtifactKind {
    /// Classify a file in the output directory by its name
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".tar.gz") {
            ArtifactKind::Sdist
        } else if name.ends_with(".whl") {
            ArtifactKind::Wheel
        } else {
            ArtifactKind::Native
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Sdist => "sdist",
            ArtifactKind::Wheel => "wheel",
            ArtifactKind::Native => "native",
        }
    }

    /// Value of the `filetype` field in a legacy upload
    pub fn upload_filetype(&self) -> &'static str {
        match self {
            ArtifactKind::Sdist => "sdist",
            ArtifactKind::Wheel => "bdist_wheel",
            ArtifactKind::Native => "bdist_dumb",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>) -> Self {
        Artifact {
            kind,
            path: path.into(),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether a file name carries the version as a whole component
///
/// Accepts the package-index spelling (`1.0.0rc1`), the tag spelling
/// (`1.0.0-rc.1`) and its wheel form where `-` becomes `_`. The version must
/// follow a `-` or `_` and be followed by the end of the name, a `-`, or a
/// `.` that starts an extension.
pub fn carries_version(file_name: &str, version: &Version) -> bool {
    let display = version.to_string();
    [version.to_pep440(), display.replace('-', "_"), display]
        .iter()
        .any(|rendered| stamped_with(file_name, rendered))
}

fn stamped_with(file_name: &str, rendered: &str) -> bool {
    file_name.match_indices(rendered).any(|(start, _)| {
        let opens = matches!(file_name[..start].chars().next_back(), Some('-' | '_'));
        let rest = &file_name[start + rendered.len()..];
        let closes = match rest.chars().next() {
            None | Some('-') => true,
            Some('.') => !rest[1..].starts_with(|c: char| c.is_ascii_digit()),
            Some(_) => false,
        };
        opens && closes
    })
}

/// The outputs of one build, all stamped with the same version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub version: Version,
    pub sdist: Artifact,
    pub wheel: Artifact,
    pub native: Option<Artifact>,
}

impl ArtifactSet {
    /// Source then binary distribution; these are validated, smoke tested and uploaded
    pub fn distributions(&self) -> [&Artifact; 2] {
        [&self.sdist, &self.wheel]
    }

    pub fn all(&self) -> Vec<&Artifact> {
        let mut all = vec![&self.sdist, &self.wheel];
        all.extend(self.native.as_ref());
        all
    }

    /// True when every artifact name carries the set's version
    pub fn is_consistent(&self) -> bool {
        self.all()
            .iter()
            .all(|a| carries_version(&a.file_name(), &self.version))
    }
}
