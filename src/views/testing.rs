//! In-memory doubles for view tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use http::StatusCode;
use tokio::sync::Notify;
use crate::error::{Error, Result};
use crate::models::{ValidVendorDraft, Vendor};
use crate::services::VendorApi;
use super::prompt::{Confirm, Notifier};

pub fn acme() -> Vendor {
    Vendor {
        id: "1".into(),
        name: "Acme".into(),
        details: "d".into(),
        website: "http://x".into(),
        logo: None,
        questions: Vec::new(),
    }
}

fn rejected(path: &str) -> Error {
    Error::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        url: format!("http://backend.test{}", path),
    }
}

#[derive(Default)]
pub struct FakeApi {
    vendors: Mutex<Vec<Vendor>>,
    calls: Mutex<Vec<String>>,
    tokens: Mutex<Vec<Option<String>>>,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    garble_create: AtomicBool,
    fail_delete: AtomicBool,
    list_gate: Mutex<Option<Arc<Notify>>>,
    create_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn with_vendors(vendors: Vec<Vendor>) -> Self {
        Self { vendors: Mutex::new(vendors), ..Self::default() }
    }

    pub fn failing_list() -> Self {
        let api = Self::default();
        api.fail_list.store(true, Ordering::SeqCst);
        api
    }

    pub fn set_vendors(&self, vendors: Vec<Vendor>) {
        *self.vendors.lock().unwrap() = vendors;
    }

    pub fn fail_creates(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Makes creates fail the way an unexpected response body does.
    pub fn garble_creates(&self) {
        self.garble_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Parks every later `list_vendors` call until the returned handle is
    /// notified.
    pub fn hold_lists(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn hold_creates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| *c == "list").count()
    }

    pub fn create_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("create:")).count()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.strip_prefix("delete:").map(str::to_string))
            .collect()
    }

    pub fn last_token(&self) -> Option<String> {
        self.tokens.lock().unwrap().last().cloned().flatten()
    }

    pub async fn wait_for_list_calls(&self, n: usize) {
        self.wait_until(|api| api.list_calls() >= n).await
    }

    pub async fn wait_for_create_calls(&self, n: usize) {
        self.wait_until(|api| api.create_calls() >= n).await
    }

    async fn wait_until(&self, done: impl Fn(&Self) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(self) {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("fake api was never called");
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VendorApi for FakeApi {
    async fn list_vendors(&self) -> Result<Vec<Vendor>> {
        self.record("list".into());
        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(rejected("/vendors"));
        }
        Ok(self.vendors.lock().unwrap().clone())
    }

    async fn create_vendor(&self, draft: &ValidVendorDraft, token: Option<&str>) -> Result<Vendor> {
        self.record(format!("create:{}", draft.name));
        self.tokens.lock().unwrap().push(token.map(str::to_string));
        let gate = self.create_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(rejected("/admin/vendors"));
        }
        if self.garble_create.load(Ordering::SeqCst) {
            return Err(Error::Decode("created vendor: expected a map".into()));
        }

        let mut vendors = self.vendors.lock().unwrap();
        let vendor = Vendor {
            id: format!("new-{}", vendors.len() + 1),
            name: draft.name.clone(),
            details: draft.details.clone(),
            website: draft.website.clone(),
            logo: Some(format!("uploads/{}", draft.logo.file_name)),
            questions: draft.questions.clone(),
        };
        vendors.push(vendor.clone());
        Ok(vendor)
    }

    async fn delete_vendor(&self, id: &str) -> Result<()> {
        self.record(format!("delete:{}", id));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(rejected("/vendors"));
        }
        self.vendors.lock().unwrap().retain(|v| v.id != id);
        Ok(())
    }
}

pub struct FixedConfirm {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl FixedConfirm {
    pub fn new(answer: bool) -> Self {
        Self { answer, asked: Mutex::new(Vec::new()) }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for FixedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
