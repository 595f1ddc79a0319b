//! Google Drive API connector implementation
//!
//! Implements the `FolderStorage` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::storage::{FolderStorage, RemoteFolder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{
    ApiErrorResponse, CreateFolderRequest, DriveFile, FilesListResponse, FOLDER_MIME_TYPE,
};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Results per lookup page; only the first match is ever used
const LOOKUP_PAGE_SIZE: u32 = 10;

/// Fields to request for folder resources
const FOLDER_FIELDS: &str = "id,name,parents,createdTime";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Drive API connector
///
/// Implements `FolderStorage` for Google Drive API v3.
///
/// # Features
///
/// - Exact-name folder lookup scoped to one parent (or the Drive root)
/// - Oldest match first when duplicates exist
/// - Folder creation under a parent
/// - OAuth 2.0 bearer authentication via `HttpClient`
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::storage::FolderStorage;
///
/// let connector = GoogleDriveConnector::new(http_client, access_token);
/// let matches = connector.list_folders("Research_Project", None).await?;
/// ```
pub struct GoogleDriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,

    base_url: String,
}

impl GoogleDriveConnector {
    /// Create a new Google Drive connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with the `drive.file` scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    /// Point the connector at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    /// Build the files.list query matching live folders named `name` under
    /// `parent_id`, or under the Drive root.
    pub fn folder_query(name: &str, parent_id: Option<&str>) -> String {
        format!(
            "mimeType='{}' and name='{}' and '{}' in parents and trashed=false",
            FOLDER_MIME_TYPE,
            escape_query_value(name),
            escape_query_value(parent_id.unwrap_or("root")),
        )
    }

    fn convert_folder(drive_file: DriveFile) -> RemoteFolder {
        RemoteFolder {
            id: drive_file.id,
            name: drive_file.name,
            parent_ids: drive_file.parents,
        }
    }

    /// Map a non-2xx response to a provider error.
    fn error_from_response(response: &HttpResponse, parent_id: Option<&str>) -> GoogleDriveError {
        let status = response.status;
        let (message, reason) = match response.json::<ApiErrorResponse>() {
            Ok(envelope) => {
                let reason = envelope.error.reason().map(str::to_string);
                (envelope.error.message, reason)
            }
            Err(_) => (String::from_utf8_lossy(&response.body).into_owned(), None),
        };

        warn!(status, reason = ?reason, "Drive API request failed");

        match (status, parent_id) {
            (401, _) => GoogleDriveError::AuthenticationFailed(message),
            (404, Some(parent)) => GoogleDriveError::ParentNotFound {
                parent_id: parent.to_string(),
            },
            (429, _) => GoogleDriveError::RateLimitExceeded { message },
            (403, _) if matches!(
                reason.as_deref(),
                Some("rateLimitExceeded") | Some("userRateLimitExceeded")
            ) =>
            {
                GoogleDriveError::RateLimitExceeded { message }
            }
            _ => GoogleDriveError::ApiError {
                status_code: status,
                message: match reason {
                    Some(reason) => format!("{} ({})", message, reason),
                    None => message,
                },
            },
        }
    }
}

/// Escape a value for use inside a single-quoted Drive query string.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl FolderStorage for GoogleDriveConnector {
    #[instrument(skip(self))]
    async fn list_folders(&self, name: &str, parent_id: Option<&str>) -> Result<Vec<RemoteFolder>> {
        let query = Self::folder_query(name, parent_id);
        let url = format!(
            "{}?q={}&spaces=drive&orderBy=createdTime&pageSize={}&fields={}",
            self.files_url(),
            urlencoding::encode(&query),
            LOOKUP_PAGE_SIZE,
            urlencoding::encode(&format!("nextPageToken,files({})", FOLDER_FIELDS)),
        );

        let request = HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        // Lookups are idempotent: the transport's default retry policy applies
        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(Self::error_from_response(&response, parent_id).into());
        }

        let list: FilesListResponse = response
            .json()
            .map_err(|e| GoogleDriveError::ParseError(e.to_string()))?;

        if list.incomplete_search {
            debug!("Drive reported an incomplete search");
        }

        let folders: Vec<RemoteFolder> = list.files.into_iter().map(Self::convert_folder).collect();
        debug!(matches = folders.len(), "Folder lookup complete");
        Ok(folders)
    }

    #[instrument(skip(self))]
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<RemoteFolder> {
        let url = format!(
            "{}?fields={}",
            self.files_url(),
            urlencoding::encode(FOLDER_FIELDS)
        );

        let request = HttpRequest::new(HttpMethod::Post, url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&CreateFolderRequest::new(name, parent_id))?;

        // A retried create can leave a duplicate behind, so send exactly once
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await?;
        if !response.is_success() {
            return Err(Self::error_from_response(&response, parent_id).into());
        }

        let created: DriveFile = response
            .json()
            .map_err(|e| GoogleDriveError::ParseError(e.to_string()))?;

        let mut folder = Self::convert_folder(created);
        if folder.parent_ids.is_empty() {
            if let Some(parent) = parent_id {
                folder.parent_ids.push(parent.to_string());
            }
        }

        info!(folder_id = %folder.id, "Created folder");
        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result};
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn decoded_query(url: &str) -> HashMap<String, String> {
        url.split_once('?')
            .map(|(_, query)| query)
            .unwrap_or_default()
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), urlencoding::decode(v).unwrap().into_owned()))
            .collect()
    }

    #[test]
    fn test_folder_query_under_root() {
        assert_eq!(
            GoogleDriveConnector::folder_query("Research_Project", None),
            "mimeType='application/vnd.google-apps.folder' and name='Research_Project' \
             and 'root' in parents and trashed=false"
        );
    }

    #[test]
    fn test_folder_query_escapes_quotes() {
        let query = GoogleDriveConnector::folder_query("Bob's \\data", Some("p1"));
        assert!(query.contains(r"name='Bob\'s \\data'"));
        assert!(query.contains("'p1' in parents"));
    }

    #[tokio::test]
    async fn test_list_folders_request_shape() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request| {
                let query = decoded_query(&request.url);
                request.method == HttpMethod::Get
                    && request.url.starts_with("https://www.googleapis.com/drive/v3/files?")
                    && request.headers.get("Authorization") == Some(&"Bearer test_token".to_string())
                    && query["q"].contains("'parent-1' in parents")
                    && query["q"].contains("name='data'")
                    && query["orderBy"] == "createdTime"
                    && query["fields"] == "nextPageToken,files(id,name,parents,createdTime)"
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"files": [
                        {"id": "old", "name": "data", "parents": ["parent-1"], "createdTime": "2023-01-01T00:00:00Z"},
                        {"id": "new", "name": "data", "parents": ["parent-1"], "createdTime": "2024-01-01T00:00:00Z"}
                    ]}"#,
                ))
            });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let folders = connector.list_folders("data", Some("parent-1")).await.unwrap();

        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].id, "old");
        assert_eq!(folders[0].parent_ids, vec!["parent-1"]);
    }

    #[tokio::test]
    async fn test_list_folders_none_found() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Ok(response(200, r#"{"files": []}"#)));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        assert!(connector.list_folders("data", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_folders_unauthorized() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().returning(|_| {
            Ok(response(
                401,
                r#"{"error": {"code": 401, "message": "Invalid Credentials", "errors": [{"reason": "authError"}]}}"#,
            ))
        });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "expired");
        let err = connector.list_folders("data", None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Remote { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_list_folders_malformed_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Ok(response(200, "<html>proxy</html>")));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let err = connector.list_folders("data", None).await.unwrap_err();
        assert!(matches!(err, BridgeError::OperationFailed(_)));
    }

    #[tokio::test]
    async fn test_create_folder_sends_once() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);
        mock_http
            .expect_execute_with_retry()
            .withf(|request, policy| {
                let body: serde_json::Value =
                    serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
                request.method == HttpMethod::Post
                    && policy.max_attempts == 1
                    && body["name"] == "models"
                    && body["mimeType"] == FOLDER_MIME_TYPE
                    && body["parents"] == serde_json::json!(["root-id"])
            })
            .times(1)
            .returning(|_, _| {
                Ok(response(
                    200,
                    r#"{"id": "models-id", "name": "models", "parents": ["root-id"]}"#,
                ))
            });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let folder = connector.create_folder("models", Some("root-id")).await.unwrap();

        assert_eq!(folder.id, "models-id");
        assert_eq!(folder.parent_ids, vec!["root-id"]);
    }

    #[tokio::test]
    async fn test_create_folder_fills_missing_parents() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .returning(|_, _| Ok(response(200, r#"{"id": "d1", "name": "data"}"#)));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let folder = connector.create_folder("data", Some("root-id")).await.unwrap();
        assert_eq!(folder.parent_ids, vec!["root-id"]);
    }

    #[tokio::test]
    async fn test_create_folder_quota_exceeded() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute_with_retry().returning(|_, _| {
            Ok(response(
                403,
                r#"{"error": {"code": 403, "message": "The user's Drive storage quota has been exceeded.", "errors": [{"reason": "storageQuotaExceeded"}]}}"#,
            ))
        });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        match connector.create_folder("results", Some("root-id")).await {
            Err(BridgeError::Remote { status, message }) => {
                assert_eq!(status, 403);
                assert!(message.contains("storageQuotaExceeded"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_folder_missing_parent() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .returning(|_, _| Ok(response(404, "Not Found")));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        let err = connector.create_folder("data", Some("gone")).await.unwrap_err();
        match err {
            BridgeError::Remote { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("gone"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("Connection failed".into())));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http), "test_token");
        assert!(connector.list_folders("data", None).await.is_err());
    }

    #[test]
    fn test_with_base_url() {
        let connector = GoogleDriveConnector::new(Arc::new(MockHttpClient::new()), "t")
            .with_base_url("http://127.0.0.1:8080/drive/v3/");
        assert_eq!(connector.files_url(), "http://127.0.0.1:8080/drive/v3/files");
    }
}
