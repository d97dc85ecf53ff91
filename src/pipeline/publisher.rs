//! Package index access: existence lookup, auth negotiation and legacy upload

use crate::build::{Artifact, ArtifactKind};
use crate::config::PublishConfig;
use crate::domain::Version;
use crate::error::{RelcraftError, Result};
use crate::metadata::ProjectMetadata;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::fs;
use std::time::Duration;
use tracing::{debug, info};

/// Username the index expects alongside an API token
const TOKEN_USER: &str = "__token__";

/// Talks to the package index
pub trait Publisher {
    /// Whether `name==version` is already on the index
    fn version_exists(&self, name: &str, version: &Version) -> Result<bool>;

    /// Check credentials and connectivity without sending a payload
    fn negotiate(&self, token: &str) -> Result<()>;

    /// Upload one artifact; never retried
    fn upload(
        &self,
        artifact: &Artifact,
        metadata: &ProjectMetadata,
        version: &Version,
        token: &str,
    ) -> Result<()>;
}

fn http_error(e: reqwest::Error) -> RelcraftError {
    RelcraftError::http(format!("HTTP request failed: {}", e))
}

/// Hex-encoded SHA-256 of a file's bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Normalized project name as used in index URLs
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_sep {
                out.push('-');
            }
            last_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        }
    }
    out
}

/// Publisher for a legacy-upload index (TestPyPI by default)
pub struct HttpPublisher {
    client: Client,
    publish_url: String,
    verification_url: String,
}

impl HttpPublisher {
    pub fn new(config: &PublishConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(concat!("relcraft/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(http_error)?;
        Ok(HttpPublisher {
            client,
            publish_url: config.publish_url.clone(),
            verification_url: config.verification_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Publisher for HttpPublisher {
    fn version_exists(&self, name: &str, version: &Version) -> Result<bool> {
        let url = format!(
            "{}/{}/{}/json",
            self.verification_url,
            normalize_name(name),
            version.to_pep440()
        );
        debug!(%url, "checking index for version");
        let response = self.client.get(&url).send().map_err(http_error)?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(RelcraftError::http(format!(
                "Unexpected status {} from {}",
                status, url
            ))),
        }
    }

    fn negotiate(&self, token: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.publish_url)
            .basic_auth(TOKEN_USER, Some(token))
            .send()
            .map_err(http_error)?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RelcraftError::http(format!(
                "{} rejected the publish token ({})",
                self.publish_url,
                response.status()
            ))),
            status if status.is_server_error() => Err(RelcraftError::http(format!(
                "{} is unavailable ({})",
                self.publish_url, status
            ))),
            status => {
                debug!(%status, "publish endpoint accepted credentials");
                Ok(())
            }
        }
    }

    fn upload(
        &self,
        artifact: &Artifact,
        metadata: &ProjectMetadata,
        version: &Version,
        token: &str,
    ) -> Result<()> {
        let bytes = fs::read(artifact.path())?;
        let digest = sha256_hex(&bytes);
        let file_name = artifact.file_name();
        let pyversion = match artifact.kind {
            ArtifactKind::Sdist => "source",
            _ => "py3",
        };

        let form = Form::new()
            .text(":action", "file_upload")
            .text("protocol_version", "1")
            .text("metadata_version", "2.1")
            .text("name", metadata.name.clone())
            .text("version", version.to_pep440())
            .text("summary", metadata.description.clone())
            .text("filetype", artifact.kind.upload_filetype())
            .text("pyversion", pyversion)
            .text("sha256_digest", digest)
            .part("content", Part::bytes(bytes).file_name(file_name.clone()));

        let response = self
            .client
            .post(&self.publish_url)
            .basic_auth(TOKEN_USER, Some(token))
            .multipart(form)
            .send()
            .map_err(http_error)?;

        let status = response.status();
        if status.is_success() {
            info!(file = %file_name, "uploaded");
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && body.contains("already exists") {
            return Err(RelcraftError::DuplicateVersion {
                name: metadata.name.clone(),
                version: version.to_string(),
            });
        }
        Err(RelcraftError::http(format!(
            "Upload of {} failed with {}: {}",
            file_name,
            status,
            body.trim()
        )))
    }
}

/// In-memory index for tests
#[derive(Default)]
pub struct MockPublisher {
    existing: Vec<(String, Version)>,
    published: RefCell<Vec<(String, Version)>>,
    reject_token: bool,
    uploads: RefCell<Vec<String>>,
    negotiations: RefCell<usize>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `name==version` is already published
    pub fn with_existing(mut self, name: &str, version: Version) -> Self {
        self.existing.push((normalize_name(name), version));
        self
    }

    /// Fail every negotiation as an index rejecting the credentials would
    pub fn rejecting_token(mut self) -> Self {
        self.reject_token = true;
        self
    }

    /// File names uploaded so far
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.borrow().clone()
    }

    pub fn negotiations(&self) -> usize {
        *self.negotiations.borrow()
    }
}

impl Publisher for MockPublisher {
    fn version_exists(&self, name: &str, version: &Version) -> Result<bool> {
        let name = normalize_name(name);
        let published = self.published.borrow();
        Ok(self
            .existing
            .iter()
            .chain(published.iter())
            .any(|(n, v)| *n == name && v == version))
    }

    fn negotiate(&self, _token: &str) -> Result<()> {
        *self.negotiations.borrow_mut() += 1;
        if self.reject_token {
            return Err(RelcraftError::http("publish token rejected (403 Forbidden)"));
        }
        Ok(())
    }

    fn upload(
        &self,
        artifact: &Artifact,
        metadata: &ProjectMetadata,
        version: &Version,
        _token: &str,
    ) -> Result<()> {
        let name = normalize_name(&metadata.name);
        let file_name = artifact.file_name();
        let seeded = self.existing.iter().any(|(n, v)| *n == name && v == version);
        if seeded || self.uploads.borrow().contains(&file_name) {
            return Err(RelcraftError::DuplicateVersion {
                name: metadata.name.clone(),
                version: version.to_string(),
            });
        }
        self.uploads.borrow_mut().push(file_name);
        self.published.borrow_mut().push((name, version.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("FTBatch_Bulk.Edit"), "ftbatch-bulk-edit");
        assert_eq!(normalize_name("a--b"), "a-b");
    }

    #[test]
    fn test_mock_publisher_rejects_existing_version() {
        let publisher = MockPublisher::new().with_existing("pkg", Version::new(1, 0, 0));
        let metadata = ProjectMetadata {
            name: "pkg".to_string(),
            ..Default::default()
        };
        let artifact = Artifact::new(ArtifactKind::Sdist, "dist/pkg-1.0.0.tar.gz");

        assert!(publisher.version_exists("pkg", &Version::new(1, 0, 0)).unwrap());
        let err = publisher
            .upload(&artifact, &metadata, &Version::new(1, 0, 0), "token")
            .unwrap_err();
        assert!(matches!(err, RelcraftError::DuplicateVersion { .. }));
        assert!(publisher.uploads().is_empty());
    }

    #[test]
    fn test_mock_publisher_records_uploaded_version() {
        let publisher = MockPublisher::new();
        let metadata = ProjectMetadata {
            name: "Pkg_Name".to_string(),
            ..Default::default()
        };
        let version = Version::new(2, 0, 0);
        let sdist = Artifact::new(ArtifactKind::Sdist, "dist/pkg_name-2.0.0.tar.gz");
        let wheel = Artifact::new(ArtifactKind::Wheel, "dist/pkg_name-2.0.0-py3-none-any.whl");

        assert!(!publisher.version_exists("pkg-name", &version).unwrap());
        publisher.upload(&sdist, &metadata, &version, "token").unwrap();
        publisher.upload(&wheel, &metadata, &version, "token").unwrap();
        assert!(publisher.version_exists("pkg-name", &version).unwrap());

        let err = publisher.upload(&sdist, &metadata, &version, "token").unwrap_err();
        assert!(matches!(err, RelcraftError::DuplicateVersion { .. }));
        assert_eq!(publisher.uploads().len(), 2);
    }
}
