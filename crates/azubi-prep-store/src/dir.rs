// SPDX-License-Identifier: Apache-2.0

use crate::backend::{StoreBackend, StoreError, StoreErrorCode};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File-per-key backend under a root directory.
///
/// Keys are percent-encoded into file names so the namespace separator
/// `:` cannot collide with literal underscores, and writes go through a
/// temp file + rename so a crashed write never leaves a torn value.
pub struct DirBackend {
    root: PathBuf,
}

const FILE_SUFFIX: &str = ".json";

impl DirBackend {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}{FILE_SUFFIX}", encode_key(key)))
    }

    async fn ensure_root(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, &e))
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' => out.push(byte as char),
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02x}"));
            }
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let mut out = Vec::with_capacity(name.len());
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let pair = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(pair, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn io_error(path: &Path, err: &std::io::Error) -> StoreError {
    let code = if err.kind() == std::io::ErrorKind::StorageFull {
        StoreErrorCode::QuotaExceeded
    } else {
        StoreErrorCode::Io
    };
    StoreError::new(code, format!("{}: {err}", path.display()))
}

#[async_trait]
impl StoreBackend for DirBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, &e)),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_root().await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| io_error(&tmp, &e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, &e))
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, &e)),
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.root, &e)),
        };
        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, &e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stem) = name.strip_suffix(FILE_SUFFIX) else {
                continue;
            };
            if let Some(key) = decode_key(stem) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
