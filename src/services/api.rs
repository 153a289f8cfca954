use std::sync::Arc;
use async_trait::async_trait;
use http::header::AUTHORIZATION;
use rquest::multipart::{Form, Part};
use tracing::{debug, info};
use crate::clients::HttpClient;
use crate::error::Result;
use crate::models::response::{decode_created_vendor, decode_vendor_list};
use crate::models::{ValidVendorDraft, Vendor};

pub const VENDORS_PATH: &str = "/vendors";
pub const ADMIN_VENDORS_PATH: &str = "/admin/vendors";

/// Backend operations the vendor screens rely on. Every method fails on a
/// transport error or a non-2xx status; callers decide what the user sees.
#[async_trait]
pub trait VendorApi: Send + Sync {
    /// `GET /vendors`, in server order.
    async fn list_vendors(&self) -> Result<Vec<Vendor>>;

    /// `POST /admin/vendors` as one multipart request. `token` becomes a
    /// bearer `Authorization` header when present.
    async fn create_vendor(&self, draft: &ValidVendorDraft, token: Option<&str>) -> Result<Vendor>;

    /// `DELETE /vendors/:id`.
    async fn delete_vendor(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct ApiService {
    client: Arc<HttpClient>,
}

impl ApiService {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VendorApi for ApiService {
    async fn list_vendors(&self) -> Result<Vec<Vendor>> {
        let url = self.client.url(VENDORS_PATH)?;
        debug!(url = %url, "Fetching vendors");

        let response = self.client.send(self.client.get(url)).await?;
        let body = response.bytes().await?;
        decode_vendor_list(&body)
    }

    async fn create_vendor(&self, draft: &ValidVendorDraft, token: Option<&str>) -> Result<Vendor> {
        let url = self.client.url(ADMIN_VENDORS_PATH)?;

        let logo = Part::bytes(draft.logo.bytes.clone())
            .file_name(draft.logo.file_name.clone())
            .mime_str(&draft.logo.content_type)?;

        let form = Form::new()
            .text("name", draft.name.clone())
            .text("details", draft.details.clone())
            .text("website", draft.website.clone())
            .part("vendorlogo", logo)
            .text("questions", draft.questions_json()?);

        let mut request = self.client.post(url.clone()).multipart(form);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        debug!(
            url = %url,
            vendor_name = %draft.name,
            questions = draft.questions.len(),
            authenticated = token.is_some(),
            "Creating vendor"
        );

        let response = self.client.send(request).await?;
        let body = response.bytes().await?;
        let vendor = decode_created_vendor(&body)?;

        info!(vendor_id = %vendor.id, vendor_name = %vendor.name, "Vendor created");
        Ok(vendor)
    }

    async fn delete_vendor(&self, id: &str) -> Result<()> {
        let url = self.client.url_with_segment(VENDORS_PATH, id)?;
        debug!(url = %url, vendor_id = id, "Deleting vendor");

        self.client.send(self.client.delete(url)).await?;

        info!(vendor_id = id, "Vendor deleted");
        Ok(())
    }
}
