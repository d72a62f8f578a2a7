//! Content-addressed block store.

use alloy::primitives::{hex, keccak256};
use std::io;
use std::path::{Path, PathBuf};

const CID_LEN: usize = 64;

/// Content identifier for `bytes`: lowercase hex keccak-256 digest.
pub fn content_id(bytes: &[u8]) -> String {
    hex::encode(keccak256(bytes))
}

/// Whether `cid` has the shape produced by [`content_id`].
pub fn is_valid_cid(cid: &str) -> bool {
    cid.len() == CID_LEN && cid.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Blocks stored as one file per content identifier.
#[derive(Debug, Clone)]
pub struct BlockStore {
    dir: PathBuf,
}

impl BlockStore {
    /// Open the store under `<data_dir>/blocks`, creating it if absent.
    pub async fn open(data_dir: &Path) -> io::Result<Self> {
        let dir = data_dir.join("blocks");
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Store `bytes` and return their identifier. Re-adding is a no-op.
    pub async fn put(&self, bytes: &[u8]) -> io::Result<String> {
        let cid = content_id(bytes);
        let path = self.dir.join(&cid);
        if tokio::fs::try_exists(&path).await? {
            return Ok(cid);
        }
        let tmp = self.dir.join(format!("{}.tmp", cid));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(cid)
    }

    /// Fetch a block, `None` when unknown.
    pub async fn get(&self, cid: &str) -> io::Result<Option<Vec<u8>>> {
        if !is_valid_cid(cid) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(cid)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
