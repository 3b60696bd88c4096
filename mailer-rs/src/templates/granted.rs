//! Client-initiated scan of a directory the operator grants access to
//!
//! The operator is asked for a directory through a [`DirectoryPicker`].
//! The picker hands back a [`DirectoryHandle`], and every path in the
//! resulting records is relative to that handle: `full_path` and
//! `relative_path` are the same string, unlike
//! [`RootedPathSource`](super::RootedPathSource).

use crate::error::{MailerError, Result};
use crate::templates::rules::{is_skipped, is_template};
use crate::templates::source::TemplateSource;
use crate::templates::types::TemplateRecord;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Kind of an entry inside a granted directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a granted directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl HandleEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Read access to a directory tree, addressed by `/`-separated paths
/// relative to the granted root ("" is the root itself)
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    /// Display name of the granted directory
    fn name(&self) -> String;

    /// List the children of `dir`
    async fn entries(&self, dir: &str) -> io::Result<Vec<HandleEntry>>;

    /// Read a file as text
    async fn read_text(&self, file: &str) -> io::Result<String>;
}

/// Outcome of asking the operator for a directory
pub enum PickOutcome {
    Granted(Arc<dyn DirectoryHandle>),
    Cancelled,
}

/// Interactive directory grant
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// Whether this environment can ask the operator at all
    fn is_available(&self) -> bool;

    async fn pick(&self) -> Result<PickOutcome>;
}

/// [`DirectoryHandle`] backed by a local directory
pub struct LocalDirectoryHandle {
    root: PathBuf,
}

impl LocalDirectoryHandle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirectoryHandle {
    fn name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    async fn entries(&self, dir: &str) -> io::Result<Vec<HandleEntry>> {
        let mut reader = tokio::fs::read_dir(self.resolve(dir)).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            // Symlinks are followed, entries that cannot be stat'ed are dropped
            let Ok(metadata) = tokio::fs::metadata(entry.path()).await else {
                warn!("Unable to read {}", entry.path().display());
                continue;
            };
            if metadata.is_dir() {
                entries.push(HandleEntry::directory(name));
            } else if metadata.is_file() {
                entries.push(HandleEntry::file(name));
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_text(&self, file: &str) -> io::Result<String> {
        tokio::fs::read_to_string(self.resolve(file)).await
    }
}

/// Picker for environments with no interactive operator
pub struct UnsupportedPicker;

#[async_trait]
impl DirectoryPicker for UnsupportedPicker {
    fn is_available(&self) -> bool {
        false
    }

    async fn pick(&self) -> Result<PickOutcome> {
        Err(MailerError::CapabilityUnavailable(
            "no interactive terminal to select a directory".to_string(),
        ))
    }
}

/// Picker that asks for a directory on the controlling terminal
///
/// An empty answer (or end of input) cancels the selection.
pub struct PromptPicker {
    prompt: String,
}

impl PromptPicker {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for PromptPicker {
    fn default() -> Self {
        Self::new("Template directory: ")
    }
}

#[async_trait]
impl DirectoryPicker for PromptPicker {
    fn is_available(&self) -> bool {
        io::stdin().is_terminal()
    }

    async fn pick(&self) -> Result<PickOutcome> {
        let mut stderr = tokio::io::stderr();
        stderr.write_all(self.prompt.as_bytes()).await?;
        stderr.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| MailerError::TemplateLoad(e.to_string()))?;

        let answer = line.trim();
        if answer.is_empty() {
            return Ok(PickOutcome::Cancelled);
        }

        let root = PathBuf::from(answer);
        if !tokio::fs::metadata(&root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(MailerError::source_unavailable(answer, "not a directory"));
        }

        Ok(PickOutcome::Granted(Arc::new(LocalDirectoryHandle::new(root))))
    }
}

/// Template source over an operator-granted directory
pub struct UserGrantedSource {
    picker: Arc<dyn DirectoryPicker>,
}

impl UserGrantedSource {
    pub fn new(picker: Arc<dyn DirectoryPicker>) -> Self {
        Self { picker }
    }

    /// Scan an already granted handle
    pub async fn scan_handle(&self, handle: &dyn DirectoryHandle) -> Result<Vec<TemplateRecord>> {
        let mut templates = Vec::new();
        self.walk(handle, String::new(), &mut templates)
            .await
            .map_err(|e| MailerError::source_unavailable(handle.name(), e))?;
        Ok(templates)
    }

    fn walk<'a>(
        &'a self,
        handle: &'a dyn DirectoryHandle,
        dir: String,
        out: &'a mut Vec<TemplateRecord>,
    ) -> BoxFuture<'a, io::Result<()>> {
        async move {
            for entry in handle.entries(&dir).await? {
                if is_skipped(&entry.name) {
                    debug!("Skipping {}/{}", dir, entry.name);
                    continue;
                }

                let entry_path = if dir.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{}/{}", dir, entry.name)
                };

                match entry.kind {
                    EntryKind::Directory => {
                        if let Err(e) = self.walk(handle, entry_path.clone(), out).await {
                            warn!("Unable to read directory {}: {}", entry_path, e);
                        }
                    }
                    EntryKind::File if is_template(&entry.name) => {
                        match handle.read_text(&entry_path).await {
                            Ok(content) => out.push(TemplateRecord {
                                name: entry.name,
                                relative_path: entry_path.clone(),
                                full_path: entry_path,
                                content: Some(content),
                            }),
                            Err(e) => warn!("Unable to read {}: {}", entry_path, e),
                        }
                    }
                    EntryKind::File => {}
                }
            }
            Ok(())
        }
        .boxed()
    }
}

#[async_trait]
impl TemplateSource for UserGrantedSource {
    async fn scan(&self) -> Result<Vec<TemplateRecord>> {
        if !self.picker.is_available() {
            return Err(MailerError::CapabilityUnavailable(
                "this environment cannot grant directory access".to_string(),
            ));
        }

        let handle = match self.picker.pick().await? {
            PickOutcome::Granted(handle) => handle,
            PickOutcome::Cancelled => return Err(MailerError::UserCancelled),
        };

        info!("Loading templates from granted directory {}", handle.name());
        let templates = self.scan_handle(handle.as_ref()).await?;
        info!("Successfully loaded {} template files", templates.len());
        Ok(templates)
    }

    fn describe(&self) -> String {
        "user-granted directory".to_string()
    }
}
