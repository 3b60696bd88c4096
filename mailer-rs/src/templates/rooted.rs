//! Server-side scan rooted at a configured path

use crate::error::{MailerError, Result};
use crate::templates::rules::{is_skipped, is_template};
use crate::templates::source::TemplateSource;
use crate::templates::types::TemplateRecord;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Scans a directory on the local filesystem
///
/// Records carry a `relative_path` with the root stripped and a
/// `full_path` equal to the root joined with it.
pub struct RootedPathSource {
    root: PathBuf,
}

impl RootedPathSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk one directory, appending templates to `out`
    ///
    /// Fails only when `dir` itself cannot be listed.
    fn walk<'a>(
        &'a self,
        dir: &'a Path,
        out: &'a mut Vec<TemplateRecord>,
    ) -> BoxFuture<'a, io::Result<()>> {
        async move {
            let mut entries = Vec::new();
            let mut reader = fs::read_dir(dir).await?;
            loop {
                match reader.next_entry().await {
                    Ok(Some(entry)) => entries.push(entry),
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Unable to list {}: {}", dir.display(), e);
                        break;
                    }
                }
            }
            entries.sort_by_key(|entry| entry.file_name());

            for entry in entries {
                let name = entry.file_name().to_string_lossy().to_string();
                if is_skipped(&name) {
                    debug!("Skipping {}", entry.path().display());
                    continue;
                }

                let path = entry.path();
                let metadata = match fs::metadata(&path).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!("Unable to read {}: {}", path.display(), e);
                        continue;
                    }
                };

                if metadata.is_dir() {
                    if let Err(e) = self.walk(&path, out).await {
                        warn!("Unable to read directory {}: {}", path.display(), e);
                    }
                } else if metadata.is_file() && is_template(&name) {
                    match fs::read_to_string(&path).await {
                        Ok(content) => out.push(self.record(name, &path, content)),
                        Err(e) => warn!("Unable to read {}: {}", path.display(), e),
                    }
                }
            }

            Ok(())
        }
        .boxed()
    }

    fn record(&self, name: String, path: &Path, content: String) -> TemplateRecord {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative_path = relative
            .to_string_lossy()
            .trim_start_matches(std::path::MAIN_SEPARATOR)
            .to_string();

        TemplateRecord {
            name,
            relative_path,
            full_path: path.to_string_lossy().to_string(),
            content: Some(content),
        }
    }
}

#[async_trait]
impl TemplateSource for RootedPathSource {
    async fn scan(&self) -> Result<Vec<TemplateRecord>> {
        info!("Loading templates: {}", self.root.display());

        let mut templates = Vec::new();
        self.walk(&self.root, &mut templates)
            .await
            .map_err(|e| MailerError::source_unavailable(self.describe(), e))?;

        info!("Successfully loaded {} template files", templates.len());
        Ok(templates)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Server-side loader driven by the configured default path
///
/// An empty path means the loader is disabled: it answers with no
/// templates and never touches the filesystem.
pub struct ConfiguredTemplates {
    source: Option<RootedPathSource>,
}

impl ConfiguredTemplates {
    pub fn new(default_path: Option<&str>) -> Self {
        Self {
            source: default_path.map(RootedPathSource::new),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    /// Scan the configured path, `Ok(None)` when none is configured
    pub async fn load(&self) -> Result<Option<Vec<TemplateRecord>>> {
        match &self.source {
            Some(source) => source.scan().await.map(Some),
            None => {
                debug!("No template path configured");
                Ok(None)
            }
        }
    }
}
