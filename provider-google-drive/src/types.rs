//! Google Drive API request and response types
//!
//! Data structures for the Google Drive API v3 `files` resource.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses to mark a file as a folder
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Google Drive API file resource (partial)
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Creation time (RFC 3339)
    #[serde(default)]
    pub created_time: Option<String>,

    /// Parent folder IDs
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// List of files
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for next page
    pub next_page_token: Option<String>,

    /// Whether the search was not exhaustive
    #[serde(default)]
    pub incomplete_search: bool,
}

/// Body of files.create for a folder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest<'a> {
    pub name: &'a str,
    pub mime_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<&'a str>,
}

impl<'a> CreateFolderRequest<'a> {
    pub fn new(name: &'a str, parent_id: Option<&'a str>) -> Self {
        Self {
            name,
            mime_type: FOLDER_MIME_TYPE,
            parents: parent_id.into_iter().collect(),
        }
    }
}

/// Google API error envelope
///
/// `{"error": {"code": 403, "message": "...", "errors": [{"reason": "..."}]}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorBody {
    /// First machine-readable reason, e.g. `storageQuotaExceeded`.
    pub fn reason(&self) -> Option<&str> {
        self.errors.iter().find_map(|detail| detail.reason.as_deref())
    }
}
