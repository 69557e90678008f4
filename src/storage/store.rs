//! Object store trait and local filesystem backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::Result;

/// Listing entry for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Object name relative to the bucket root, `/`-separated.
    pub name: String,
    pub created: Option<DateTime<Utc>>,
}

/// Minimal bucket interface used by the jobs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human readable location of an object, for logs.
    fn uri(&self, name: &str) -> String;

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()>;

    /// Fetch an object; `Ok(None)` when it does not exist.
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// List objects whose name starts with `prefix`, sorted by name.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectMeta>>;
}

/// A directory standing in for a bucket.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        name.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |p, seg| p.join(seg))
    }

    fn walk(&self) -> std::io::Result<Vec<ObjectMeta>> {
        let mut out = Vec::new();
        if !self.root.exists() {
            return Ok(out);
        }

        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let meta = entry.metadata()?;
                if meta.is_dir() {
                    stack.push(path);
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let name = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                let created = meta
                    .created()
                    .or_else(|_| meta.modified())
                    .ok()
                    .map(DateTime::<Utc>::from);
                out.push(ObjectMeta { name, created });
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn uri(&self, name: &str) -> String {
        self.path_for(name).display().to_string()
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectMeta>> {
        let mut objects: Vec<ObjectMeta> = self
            .walk()?
            .into_iter()
            .filter(|o| o.name.starts_with(prefix))
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }
}
