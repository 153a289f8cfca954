use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use crate::error::{Error, Result};
use crate::models::{LogoFile, Vendor, VendorDraft};
use crate::services::VendorApi;
use crate::storage::SessionStore;
use super::list::ListView;
use super::prompt::Notifier;

pub const ADD_SUCCESS: &str = "Vendor added successfully!";
pub const ADD_FAILURE: &str = "Failed to add vendor!";

/// The "Add Vendor" modal. The draft exists only while the modal is open.
#[derive(Clone)]
pub struct FormModal {
    api: Arc<dyn VendorApi>,
    session: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    list: ListView,
    draft: Arc<Mutex<Option<VendorDraft>>>,
    in_flight: Arc<AtomicBool>,
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FormModal {
    pub fn new(
        api: Arc<dyn VendorApi>,
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        list: ListView,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            list,
            draft: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Opens the modal with a fresh draft. Reopening keeps an existing draft.
    pub async fn open(&self) {
        let mut draft = self.draft.lock().await;
        if draft.is_none() {
            *draft = Some(VendorDraft::default());
            debug!("Vendor form opened");
        }
    }

    pub async fn cancel(&self) {
        if self.draft.lock().await.take().is_some() {
            debug!("Vendor form cancelled, draft discarded");
        }
    }

    pub async fn is_open(&self) -> bool {
        self.draft.lock().await.is_some()
    }

    pub async fn draft(&self) -> Option<VendorDraft> {
        self.draft.lock().await.clone()
    }

    /// Applies `edit` to the open draft.
    pub async fn update<T>(&self, edit: impl FnOnce(&mut VendorDraft) -> T) -> Result<T> {
        let mut draft = self.draft.lock().await;
        let draft = draft.as_mut().ok_or(Error::NoOpenForm)?;
        Ok(edit(draft))
    }

    pub async fn add_question(&self) -> Result<()> {
        self.update(VendorDraft::add_question).await
    }

    pub async fn remove_question(&self, index: usize) -> Result<bool> {
        self.update(|d| d.remove_question(index)).await
    }

    pub async fn edit_question(&self, index: usize, value: impl Into<String>) -> Result<bool> {
        let value = value.into();
        self.update(|d| d.edit_question(index, value)).await
    }

    pub async fn set_logo(&self, logo: LogoFile) -> Result<()> {
        self.update(|d| d.logo = Some(logo)).await
    }

    /// Validates and sends the draft. On success the list reloads once, a
    /// success notification is shown and the modal closes. On failure the
    /// modal stays open with the draft untouched. A second submit while one
    /// is running is refused with [`Error::SubmissionInFlight`].
    pub async fn submit(&self) -> Result<Vendor> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            warn!("Ignoring duplicate vendor submission");
            return Err(Error::SubmissionInFlight);
        };

        let payload = {
            let draft = self.draft.lock().await;
            let draft = draft.as_ref().ok_or(Error::NoOpenForm)?;
            draft.validate()
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Vendor draft failed validation");
                self.notifier.error(&format!("{} ({})", ADD_FAILURE, e));
                return Err(e.into());
            }
        };

        let token = self.session.token();
        match self.api.create_vendor(&payload, token.as_deref()).await {
            Ok(vendor) => {
                info!(vendor_id = %vendor.id, "Vendor submitted");
                self.list.load().await;
                self.notifier.success(ADD_SUCCESS);
                *self.draft.lock().await = None;
                Ok(vendor)
            }
            Err(e) => {
                error!(error = %e, network = e.is_network(), "Failed to add vendor");
                self.notifier.error(ADD_FAILURE);
                Err(e)
            }
        }
    }
}
