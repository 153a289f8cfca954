use serde::de::DeserializeOwned;
use tracing::error;
use crate::error::{Error, Result};
use super::Vendor;

/// Body of `GET /vendors`.
pub type VendorListResponse = Vec<Vendor>;

/// Body of `POST /admin/vendors`.
pub type CreatedVendorResponse = Vendor;

pub fn decode_vendor_list(body: &[u8]) -> Result<VendorListResponse> {
    let vendors: VendorListResponse = decode(body, "vendor list")?;
    for vendor in &vendors {
        validate(vendor)?;
    }
    Ok(vendors)
}

pub fn decode_created_vendor(body: &[u8]) -> Result<CreatedVendorResponse> {
    let vendor: CreatedVendorResponse = decode(body, "created vendor")?;
    validate(&vendor)?;
    Ok(vendor)
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        let body_str = String::from_utf8_lossy(body);
        error!(
            error = %e,
            body = %body_str,
            "Failed to parse {} response", what
        );
        Error::Decode(format!("{}: {}", what, e))
    })
}

fn validate(vendor: &Vendor) -> Result<()> {
    if vendor.id.trim().is_empty() {
        return Err(Error::Decode(format!("vendor '{}' has an empty _id", vendor.name)));
    }
    Ok(())
}
