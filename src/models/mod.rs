mod vendor;
mod draft;
pub mod response;

pub use vendor::{Vendor, Question};
pub use draft::{VendorDraft, ValidVendorDraft, LogoFile};
pub use response::{VendorListResponse, CreatedVendorResponse};
