use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use crate::models::Vendor;
use crate::services::VendorApi;
use super::prompt::Confirm;

pub const FETCH_ERROR: &str = "Failed to fetch vendors";
pub const DELETE_ERROR: &str = "Failed to delete vendor";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this vendor?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub state: LoadState,
    pub vendors: Vec<Vendor>,
    pub error: Option<String>,
}

struct ListState {
    state: LoadState,
    vendors: Vec<Vendor>,
    error: Option<String>,
    mounted: bool,
    // Bumped on every load and on unmount so late responses can be dropped.
    generation: u64,
}

/// The vendor table. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ListView {
    api: Arc<dyn VendorApi>,
    confirm: Arc<dyn Confirm>,
    inner: Arc<Mutex<ListState>>,
}

impl ListView {
    pub fn new(api: Arc<dyn VendorApi>, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            api,
            confirm,
            inner: Arc::new(Mutex::new(ListState {
                state: LoadState::Idle,
                vendors: Vec::new(),
                error: None,
                mounted: false,
                generation: 0,
            })),
        }
    }

    /// Marks the view as shown and performs the initial load.
    pub async fn mount(&self) {
        self.inner.lock().await.mounted = true;
        self.load().await;
    }

    /// Any request still in flight will have its response discarded.
    pub async fn unmount(&self) {
        let mut inner = self.inner.lock().await;
        inner.mounted = false;
        inner.generation += 1;
        debug!("Vendor list unmounted");
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let inner = self.inner.lock().await;
        ListSnapshot {
            state: inner.state,
            vendors: inner.vendors.clone(),
            error: inner.error.clone(),
        }
    }

    /// Replaces the list with the backend's collection. Failures leave the
    /// previous rows in place and set [`FETCH_ERROR`].
    pub async fn load(&self) {
        let generation = {
            let mut inner = self.inner.lock().await;
            if !inner.mounted {
                debug!("Skipping load for unmounted vendor list");
                return;
            }
            inner.generation += 1;
            inner.state = LoadState::Loading;
            inner.generation
        };

        let result = self.api.list_vendors().await;

        let mut inner = self.inner.lock().await;
        if !inner.mounted || inner.generation != generation {
            debug!(generation, "Discarding stale vendor list response");
            return;
        }

        match result {
            Ok(vendors) => {
                info!(count = vendors.len(), "Vendors loaded");
                inner.vendors = vendors;
                inner.error = None;
                inner.state = LoadState::Loaded;
            }
            Err(e) => {
                error!(error = %e, network = e.is_network(), "Failed to fetch vendors");
                inner.error = Some(FETCH_ERROR.to_string());
                inner.state = LoadState::Errored;
            }
        }
    }

    /// Deletes `id` after the user confirms, then reloads the whole list.
    /// Returns `false` when the user declined.
    pub async fn remove(&self, id: &str) -> bool {
        if !self.confirm.confirm(DELETE_PROMPT).await {
            debug!(vendor_id = id, "Delete cancelled");
            return false;
        }

        match self.api.delete_vendor(id).await {
            Ok(()) => {
                self.load().await;
            }
            Err(e) => {
                error!(error = %e, vendor_id = id, "Failed to delete vendor");
                let mut inner = self.inner.lock().await;
                if inner.mounted {
                    inner.error = Some(DELETE_ERROR.to_string());
                    inner.state = LoadState::Errored;
                }
            }
        }
        true
    }

    pub async fn render(&self) -> String {
        let snapshot = self.snapshot().await;
        render_table(&snapshot)
    }
}

pub fn render_table(snapshot: &ListSnapshot) -> String {
    let mut out = String::new();

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "! {}", error);
    }
    if snapshot.state == LoadState::Loading {
        let _ = writeln!(out, "(loading)");
    }

    let _ = writeln!(
        out,
        "{:<4} {:<26} {:<20} {:<20} {:<30} {}",
        "#", "id", "name", "details", "website", "vendorlogo"
    );
    for (index, vendor) in snapshot.vendors.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<26} {:<20} {:<20} {:<30} {}",
            index + 1,
            vendor.id,
            vendor.name,
            vendor.details,
            vendor.website,
            vendor.logo.as_deref().unwrap_or("-"),
        );
    }
    if snapshot.vendors.is_empty() {
        let _ = writeln!(out, "(no vendors)");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::{acme, FakeApi, FixedConfirm};

    fn view(api: &Arc<FakeApi>, answer: bool) -> ListView {
        ListView::new(api.clone(), Arc::new(FixedConfirm::new(answer)))
    }

    #[tokio::test]
    async fn mount_loads_once_and_renders_rows() {
        let api = Arc::new(FakeApi::with_vendors(vec![acme()]));
        let list = view(&api, true);

        list.mount().await;

        assert_eq!(api.list_calls(), 1);
        let snapshot = list.snapshot().await;
        assert_eq!(snapshot.state, LoadState::Loaded);
        let rows: Vec<_> = render_table(&snapshot)
            .lines()
            .filter(|line| line.starts_with("1 "))
            .map(str::to_string)
            .collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("Acme"));
    }

    #[tokio::test]
    async fn fetch_failure_shows_error_and_keeps_empty_list() {
        let api = Arc::new(FakeApi::failing_list());
        let list = view(&api, true);

        list.mount().await;

        let snapshot = list.snapshot().await;
        assert_eq!(snapshot.state, LoadState::Errored);
        assert_eq!(snapshot.error.as_deref(), Some(FETCH_ERROR));
        assert!(snapshot.vendors.is_empty());
        assert!(list.render().await.contains(FETCH_ERROR));
    }

    #[tokio::test]
    async fn declined_delete_makes_no_requests() {
        let api = Arc::new(FakeApi::with_vendors(vec![acme()]));
        let confirm = Arc::new(FixedConfirm::new(false));
        let list = ListView::new(api.clone(), confirm.clone());
        list.mount().await;

        assert!(!list.remove("1").await);

        assert_eq!(confirm.asked(), [DELETE_PROMPT]);
        assert_eq!(api.delete_calls(), Vec::<String>::new());
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn confirmed_delete_deletes_then_reloads() {
        let api = Arc::new(FakeApi::with_vendors(vec![acme()]));
        let list = view(&api, true);
        list.mount().await;

        assert!(list.remove("1").await);

        assert_eq!(api.delete_calls(), vec!["1".to_string()]);
        assert_eq!(api.list_calls(), 2);
        assert_eq!(api.calls(), ["list", "delete:1", "list"]);
        assert!(list.snapshot().await.vendors.is_empty());
    }

    #[tokio::test]
    async fn failed_delete_sets_error_without_reload() {
        let api = Arc::new(FakeApi::with_vendors(vec![acme()]));
        api.fail_deletes();
        let list = view(&api, true);
        list.mount().await;

        list.remove("1").await;

        let snapshot = list.snapshot().await;
        assert_eq!(snapshot.error.as_deref(), Some(DELETE_ERROR));
        assert_eq!(snapshot.vendors.len(), 1);
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn response_after_unmount_is_discarded() {
        let api = Arc::new(FakeApi::with_vendors(vec![acme()]));
        let list = view(&api, true);
        list.mount().await;
        api.set_vendors(Vec::new());

        let gate = api.hold_lists();
        let pending = tokio::spawn({
            let list = list.clone();
            async move { list.load().await }
        });
        api.wait_for_list_calls(2).await;

        list.unmount().await;
        gate.notify_one();
        pending.await.unwrap();

        let snapshot = list.snapshot().await;
        assert_eq!(snapshot.vendors.len(), 1);
        assert_eq!(snapshot.state, LoadState::Loading);
    }

    #[tokio::test]
    async fn unmounted_view_does_not_load() {
        let api = Arc::new(FakeApi::with_vendors(vec![acme()]));
        let list = view(&api, true);

        list.load().await;

        assert_eq!(api.list_calls(), 0);
        assert_eq!(list.snapshot().await.state, LoadState::Idle);
    }
}
