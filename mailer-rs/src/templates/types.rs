//! Template records produced by a scan

use serde::{Deserialize, Serialize};

/// One discovered HTML email body plus its naming/path metadata
///
/// `full_path` is the record's identity across listing, preview and send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    /// File name, always ending with the template extension
    #[serde(alias = "fileName")]
    pub name: String,
    /// Path relative to the scan root, without a leading separator
    pub relative_path: String,
    /// Path the file was read from
    pub full_path: String,
    /// File content; absent only before the file has been read
    #[serde(default, alias = "htmlContent", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl TemplateRecord {
    /// Stable key for the record
    pub fn key(&self) -> &str {
        &self.full_path
    }

    /// HTML body, empty when the content has not been read
    pub fn html(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Result of the server-rooted scan trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListing {
    pub success: bool,
    pub message: String,
    pub templates: Vec<TemplateRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateListing {
    pub fn loaded(templates: Vec<TemplateRecord>) -> Self {
        Self {
            success: true,
            message: format!("Successfully loaded {} templates", templates.len()),
            templates,
            error: None,
        }
    }

    /// No template path is configured; not an error
    pub fn unconfigured() -> Self {
        Self {
            success: true,
            message: "No template path configured".to_string(),
            templates: Vec::new(),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            message: "Loading templates failed".to_string(),
            templates: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}
