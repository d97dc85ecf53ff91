use crate::domain::Version;
use crate::error::Result;
use crate::metadata::ProjectMetadata;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Machine-readable version metadata consumed by the native executable stamping step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Four-part numeric version (`major.minor.patch.0`)
    pub file_version: [u64; 4],
}

impl VersionInfo {
    pub fn new(metadata: &ProjectMetadata, version: &Version) -> Self {
        VersionInfo {
            name: metadata.name.clone(),
            version: version.to_pep440(),
            description: metadata.description.clone(),
            file_version: version.file_version(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        debug!(path = %path.display(), version = %self.version, "wrote version info");
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build").join("version_info.json");
        let metadata = ProjectMetadata {
            name: "ftbatch-bulk-edit".to_string(),
            description: "Bulk edit batch recipes".to_string(),
            version: None,
        };

        let info = VersionInfo::new(&metadata, &Version::new(1, 4, 2));
        info.write(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"file_version\": [\n    1,\n    4,\n    2,\n    0\n  ]"));
        assert_eq!(VersionInfo::read(&path).unwrap(), info);
    }

    #[test]
    fn test_dev_version_keeps_numeric_triple() {
        let version = Version::parse("0.0.0.dev20300102030405042").unwrap();
        let info = VersionInfo::new(&ProjectMetadata::default(), &version);
        assert_eq!(info.version, "0.0.0.dev20300102030405042");
        assert_eq!(info.file_version, [0, 0, 0, 0]);
    }
}
