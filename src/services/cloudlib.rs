use reqwest::header::HeaderMap;

use crate::client::SwsClient;
use crate::endpoint::Operation;
use crate::error::Result;
use crate::request::Params;
use crate::response::ApiResponse;

/// Cloud library service: file uploads and file details
pub struct CloudLib<'a> {
    client: &'a mut SwsClient,
}

fn upload_fields(md5_hash: &str, mime_type: &str, size: u64, name: Option<&str>) -> Params {
    Params::new()
        .with("md5_hash", md5_hash)
        .with("mime_type", mime_type)
        .with("size", size)
        .with("name", name)
}

impl<'a> CloudLib<'a> {
    pub(crate) fn new(client: &'a mut SwsClient) -> Self {
        Self { client }
    }

    /// Create a file upload for the authenticated user.
    /// `md5_hash` is the base64 encoded MD5 of the file.
    pub async fn me_create_file_upload(
        self,
        md5_hash: &str,
        mime_type: &str,
        size: u64,
        name: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = upload_fields(md5_hash, mime_type, size, name);
        self.client
            .call(Operation::MeCreateFileUpload, &[], fields, HeaderMap::new())
            .await
    }

    /// Create a file upload on behalf of another user
    pub async fn user_create_file_upload(
        self,
        user_id: u64,
        md5_hash: &str,
        mime_type: &str,
        size: u64,
        name: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = upload_fields(md5_hash, mime_type, size, name);
        self.client
            .call(
                Operation::UserCreateFileUpload,
                &[("user_id", user_id.to_string())],
                fields,
                HeaderMap::new(),
            )
            .await
    }

    pub async fn me_get_file(self, file_id: &str) -> Result<ApiResponse> {
        self.client
            .call(
                Operation::MeGetFile,
                &[("file_id", file_id.to_string())],
                Params::new(),
                HeaderMap::new(),
            )
            .await
    }

    pub async fn user_get_file(self, user_id: u64, file_id: &str) -> Result<ApiResponse> {
        self.client
            .call(
                Operation::UserGetFile,
                &[("user_id", user_id.to_string()), ("file_id", file_id.to_string())],
                Params::new(),
                HeaderMap::new(),
            )
            .await
    }
}
