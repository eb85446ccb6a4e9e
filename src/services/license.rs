use reqwest::header::HeaderMap;

use crate::client::SwsClient;
use crate::endpoint::Operation;
use crate::error::Result;
use crate::request::Params;
use crate::response::ApiResponse;

/// License service
pub struct License<'a> {
    client: &'a mut SwsClient,
}

impl<'a> License<'a> {
    pub(crate) fn new(client: &'a mut SwsClient) -> Self {
        Self { client }
    }

    /// Licenses of the acting user, optionally filtered by application and term
    pub async fn get_licenses(
        self,
        app_name: Option<&str>,
        app_version: Option<&str>,
        term: Option<&str>,
    ) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("app_name", app_name)
            .with("app_version", app_version)
            .with("term", term);
        self.client
            .call(Operation::GetLicenses, &[], fields, HeaderMap::new())
            .await
    }
}
