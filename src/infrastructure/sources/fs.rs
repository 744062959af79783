use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::domain::ports::{TargetContent, TargetDescriptor, TargetSource};

/// Files on local disk.
///
/// Explicit file paths are always listed. Directories are walked
/// recursively, skipping hidden entries, and keep only files whose
/// extension is in `extensions` (every file when `extensions` is empty).
/// Files found under one directory are listed in sorted path order.
/// Symlinks to files are followed; symlinks to directories are not, so a
/// link cycle cannot loop the walk.
#[derive(Debug, Clone)]
pub struct FsTargetSource {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl FsTargetSource {
    pub fn new(roots: Vec<PathBuf>, extensions: &[String]) -> Self {
        Self {
            roots,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    fn wanted(&self, path: &Path) -> bool {
        self.extensions.is_empty()
            || path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }

    async fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut reader = tokio::fs::read_dir(&dir)
                .await
                .with_context(|| format!("Failed to read directory {}", dir.display()))?;

            let mut children = Vec::new();
            while let Some(entry) = reader.next_entry().await? {
                let hidden = entry.file_name().to_string_lossy().starts_with('.');
                if !hidden {
                    children.push((entry.path(), entry.file_type().await?));
                }
            }

            for (path, file_type) in children {
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    if self.wanted(&path) {
                        found.push(path);
                    }
                } else if file_type.is_symlink() {
                    match tokio::fs::metadata(&path).await {
                        Ok(meta) if meta.is_file() => {
                            if self.wanted(&path) {
                                found.push(path);
                            }
                        }
                        Ok(_) => debug!(path = %path.display(), "Skipping symlinked directory"),
                        Err(e) => debug!(path = %path.display(), error = %e, "Skipping broken symlink"),
                    }
                } else {
                    debug!(path = %path.display(), "Skipping special file");
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

#[async_trait]
impl TargetSource for FsTargetSource {
    async fn list(&self) -> Result<Vec<TargetDescriptor>> {
        let mut descriptors = Vec::new();

        for root in &self.roots {
            let metadata = tokio::fs::metadata(root)
                .await
                .with_context(|| format!("Cannot access {}", root.display()))?;

            if metadata.is_dir() {
                for path in self.walk(root).await? {
                    let display = path
                        .strip_prefix(root)
                        .unwrap_or(&path)
                        .display()
                        .to_string();
                    descriptors.push(TargetDescriptor::new(path.display().to_string(), display));
                }
            } else {
                let display = root
                    .file_name()
                    .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());
                descriptors.push(TargetDescriptor::new(root.display().to_string(), display));
            }
        }

        debug!(roots = self.roots.len(), targets = descriptors.len(), "Listed filesystem targets");
        Ok(descriptors)
    }

    async fn read(&self, id: &str, max_bytes: usize) -> Result<TargetContent> {
        let file = tokio::fs::File::open(id)
            .await
            .with_context(|| format!("Failed to open {id}"))?;
        let len = file
            .metadata()
            .await
            .with_context(|| format!("Failed to stat {id}"))?
            .len();
        let cap = u64::try_from(max_bytes).unwrap_or(u64::MAX);
        if len > cap {
            return Ok(TargetContent::Oversized {
                size_bytes: usize::try_from(len).unwrap_or(usize::MAX),
            });
        }

        // The file may grow between stat and read; never buffer past cap + 1.
        let mut buf = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
        file.take(cap.saturating_add(1))
            .read_to_end(&mut buf)
            .await
            .with_context(|| format!("Failed to read {id}"))?;
        if buf.len() > max_bytes {
            return Ok(TargetContent::Oversized {
                size_bytes: buf.len(),
            });
        }

        let content = String::from_utf8(buf).with_context(|| format!("{id} is not valid UTF-8"))?;
        Ok(TargetContent::Loaded(content))
    }
}
