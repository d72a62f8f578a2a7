//! Fixture upload into the storage node.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::PopulateError;
use crate::storage::api::AddResponse;

/// Options for a single population run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateOptions {
    /// Log every uploaded file's identifier and path.
    pub log_files: bool,
    /// Abort the whole run after this long. `None` waits forever.
    pub timeout: Option<Duration>,
}

/// One uploaded fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureUpload {
    /// Identifier the storage node assigned to the content.
    pub cid: String,
    /// Path relative to the fixture root, `/`-separated.
    pub path: String,
}

/// Uploads a fixture tree through the storage node's HTTP API.
#[derive(Debug, Clone)]
pub struct FixturePopulator {
    root: PathBuf,
    add_url: Url,
    client: reqwest::Client,
}

impl FixturePopulator {
    /// Populator for the storage API listening on `api_port` of this host.
    pub fn new(root: &Path, api_port: u16) -> Result<Self, PopulateError> {
        Self::with_api_addr(root, SocketAddr::from((Ipv4Addr::LOCALHOST, api_port)))
    }

    pub fn with_api_addr(root: &Path, api_addr: SocketAddr) -> Result<Self, PopulateError> {
        let add_url = Url::parse(&format!("http://{}/api/v0/add", api_addr))
            .map_err(|e| PopulateError::Client(e.to_string()))?;
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| PopulateError::Client(e.to_string()))?;

        Ok(Self {
            root: root.to_path_buf(),
            add_url,
            client,
        })
    }

    /// Upload every file under the fixture root, in traversal order.
    pub async fn populate(&self, options: PopulateOptions) -> Result<Vec<FixtureUpload>, PopulateError> {
        tracing::info!(root = %self.root.display(), "Populating storage...");

        let uploads = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, self.upload_all(options.log_files))
                .await
                .map_err(|_| PopulateError::TimedOut(limit))??,
            None => self.upload_all(options.log_files).await?,
        };

        tracing::info!(files = uploads.len(), "Populated storage with {} files", uploads.len());
        Ok(uploads)
    }

    async fn upload_all(&self, log_files: bool) -> Result<Vec<FixtureUpload>, PopulateError> {
        let files = discover_files(&self.root).await?;
        let mut uploads = Vec::with_capacity(files.len());

        for (absolute, relative) in files {
            let bytes = tokio::fs::read(&absolute)
                .await
                .map_err(|source| PopulateError::Read {
                    path: absolute.clone(),
                    source,
                })?;
            let upload = self.upload(&relative, bytes).await?;
            if log_files {
                tracing::info!(cid = %upload.cid, path = %upload.path, "  {} {}", upload.cid, upload.path);
            }
            uploads.push(upload);
        }

        Ok(uploads)
    }

    async fn upload(&self, relative: &str, bytes: Vec<u8>) -> Result<FixtureUpload, PopulateError> {
        let upload_error = |reason: String| PopulateError::Upload {
            path: relative.to_string(),
            reason,
        };

        let response = self
            .client
            .post(self.add_url.clone())
            .query(&[("path", relative)])
            .body(bytes)
            .send()
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upload_error(format!("storage API returned {}: {}", status, body)));
        }

        let added: AddResponse = response
            .json()
            .await
            .map_err(|e| upload_error(format!("invalid add response: {}", e)))?;

        Ok(FixtureUpload {
            cid: added.hash,
            path: relative.to_string(),
        })
    }
}

/// Every regular file under `root` as `(absolute, relative)`, depth-first with
/// entries sorted by name.
pub async fn discover_files(root: &Path) -> Result<Vec<(PathBuf, String)>, PopulateError> {
    let walk_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| PopulateError::Walk { path, source }
    };

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(walk_error(&dir))?;
        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(walk_error(&dir))? {
            let path = entry.path();
            // follows symlinks, so linked directories are walked too
            let metadata = tokio::fs::metadata(&path).await.map_err(walk_error(&path))?;
            children.push((path, metadata.is_dir()));
        }
        children.sort();

        // reversed so the stack pops subdirectories in name order
        let mut subdirs = Vec::new();
        for (path, is_dir) in children {
            if is_dir {
                subdirs.push(path);
            } else {
                let relative = relative_path(root, &path);
                files.push((path, relative));
            }
        }
        pending.extend(subdirs.into_iter().rev());
    }

    Ok(files)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("listings/images")).unwrap();
        fs::write(dir.path().join("README.md"), "fixtures").unwrap();
        fs::write(dir.path().join("listings/1.json"), "{}").unwrap();
        fs::write(dir.path().join("listings/images/a.png"), [0u8, 1, 2]).unwrap();
        dir
    }

    #[tokio::test]
    async fn discovers_nested_files_with_relative_paths() {
        let dir = fixture_tree();
        let files = discover_files(dir.path()).await.unwrap();
        let relative: Vec<&str> = files.iter().map(|(_, r)| r.as_str()).collect();
        assert_eq!(relative, vec!["README.md", "listings/1.json", "listings/images/a.png"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_directories_are_walked() {
        let dir = fixture_tree();
        let shared = tempfile::tempdir().unwrap();
        fs::write(shared.path().join("2.json"), "{}").unwrap();
        std::os::unix::fs::symlink(shared.path(), dir.path().join("shared")).unwrap();

        let files = discover_files(dir.path()).await.unwrap();
        let relative: Vec<&str> = files.iter().map(|(_, r)| r.as_str()).collect();
        assert_eq!(
            relative,
            vec!["README.md", "listings/1.json", "listings/images/a.png", "shared/2.json"]
        );
    }

    #[tokio::test]
    async fn missing_root_is_walk_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_files(&dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, PopulateError::Walk { .. }));
    }

    #[tokio::test]
    async fn unreachable_storage_is_upload_error() {
        let dir = fixture_tree();
        // bind then drop to get a port nobody listens on
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let populator = FixturePopulator::new(dir.path(), port).unwrap();
        let err = populator.populate(PopulateOptions::default()).await.unwrap_err();
        assert!(matches!(err, PopulateError::Upload { ref path, .. } if path == "README.md"));
    }
}
