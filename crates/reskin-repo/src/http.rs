//! Remote fetching for `http(s)://` and `file://` repositories

use std::time::Duration;

use sha1::{Digest, Sha1};
use url::Url;

use crate::error::{RepoError, Result};

const USER_AGENT: &str = concat!("reskin/", env!("CARGO_PKG_VERSION"));

/// Blocking fetcher; a missing resource is `Ok(None)`, not an error
pub struct RemoteFetcher {
    client: reqwest::blocking::Client,
}

impl RemoteFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn fetch(&self, location: &str) -> Result<Option<Vec<u8>>> {
        let url = Url::parse(location).map_err(|e| RepoError::InvalidRepositoryUrl {
            url: location.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| RepoError::InvalidRepositoryUrl {
                        url: location.to_string(),
                        reason: "not a local path".to_string(),
                    })?;
                match std::fs::read(&path) {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            "http" | "https" => {
                tracing::debug!(url = %url, "GET");
                let response = self.client.get(url).send()?;
                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !status.is_success() {
                    return Err(RepoError::HttpError {
                        status: status.as_u16(),
                        message: format!("GET {} failed", location),
                    });
                }
                Ok(Some(response.bytes()?.to_vec()))
            }
            other => Err(RepoError::InvalidRepositoryUrl {
                url: location.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    /// Fetch `location` and check it against `location.sha1` when the
    /// remote publishes one
    pub fn fetch_verified(&self, location: &str, artifact: &str) -> Result<Option<Vec<u8>>> {
        let Some(bytes) = self.fetch(location)? else {
            return Ok(None);
        };

        if let Some(checksum) = self.fetch(&format!("{}.sha1", location))? {
            let text = String::from_utf8_lossy(&checksum);
            if let Some(expected) = text.split_whitespace().next() {
                let actual = sha1_hex(&bytes);
                if !expected.eq_ignore_ascii_case(&actual) {
                    return Err(RepoError::ChecksumMismatch {
                        artifact: artifact.to_string(),
                        expected: expected.to_string(),
                        actual,
                    });
                }
            }
        }

        Ok(Some(bytes))
    }
}

/// Lowercase hex SHA-1 digest
pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_url(path: &std::path::Path) -> String {
        Url::from_file_path(path).unwrap().to_string()
    }

    #[test]
    fn test_sha1_hex() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_file_fetch_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = RemoteFetcher::new(Duration::from_secs(5)).unwrap();
        let found = fetcher.fetch(&file_url(&dir.path().join("absent.pom"))).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_verified_fetch_checks_companion() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("demo.pom");
        std::fs::write(&file, b"abc").unwrap();
        std::fs::write(
            dir.path().join("demo.pom.sha1"),
            "a9993e364706816aba3e25717850c26c9cd0d89d  demo.pom\n",
        )
        .unwrap();

        let fetcher = RemoteFetcher::new(Duration::from_secs(5)).unwrap();
        let bytes = fetcher.fetch_verified(&file_url(&file), "demo").unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"abc"[..]));

        std::fs::write(&file, b"tampered").unwrap();
        let err = fetcher.fetch_verified(&file_url(&file), "demo").unwrap_err();
        assert!(matches!(err, RepoError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_unsupported_scheme() {
        let fetcher = RemoteFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch("ftp://example.org/x").unwrap_err();
        assert!(matches!(err, RepoError::InvalidRepositoryUrl { .. }));
    }
}
