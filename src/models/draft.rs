use std::path::Path;
use tracing::debug;
use url::Url;
use crate::error::{DraftError, Result};
use super::Question;

/// An uploaded logo, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LogoFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self { file_name, content_type, bytes }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vendorlogo".to_string());

        debug!(
            file_name = %file_name,
            size = bytes.len(),
            "Loaded vendor logo"
        );

        Ok(Self::new(file_name, bytes))
    }
}

/// Unsaved state of the "Add Vendor" form. Always holds at least one
/// question slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorDraft {
    pub name: String,
    pub details: String,
    pub website: String,
    questions: Vec<String>,
    pub logo: Option<LogoFile>,
}

impl Default for VendorDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            details: String::new(),
            website: String::new(),
            questions: vec![String::new()],
            logo: None,
        }
    }
}

impl VendorDraft {
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn add_question(&mut self) {
        self.questions.push(String::new());
    }

    /// Removes the question at `index`. A no-op when only one question is
    /// left or the index is out of range; returns whether anything changed.
    pub fn remove_question(&mut self, index: usize) -> bool {
        if self.questions.len() <= 1 || index >= self.questions.len() {
            return false;
        }
        self.questions.remove(index);
        true
    }

    pub fn edit_question(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.questions.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Checks the draft and produces the payload that goes over the wire.
    pub fn validate(&self) -> std::result::Result<ValidVendorDraft, DraftError> {
        let name = required("name", &self.name)?;
        let details = required("details", &self.details)?;
        let website = required("website", &self.website)?;

        match Url::parse(&website) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(DraftError::InvalidWebsite(website)),
        }

        let questions = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let q = q.trim();
                if q.is_empty() {
                    Err(DraftError::EmptyQuestion(index + 1))
                } else {
                    Ok(Question { question: q.to_string() })
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let logo = self.logo.clone().ok_or(DraftError::MissingLogo)?;

        Ok(ValidVendorDraft { name, details, website, questions, logo })
    }
}

fn required(field: &'static str, value: &str) -> std::result::Result<String, DraftError> {
    let value = value.trim();
    if value.is_empty() {
        Err(DraftError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidVendorDraft {
    pub name: String,
    pub details: String,
    pub website: String,
    pub questions: Vec<Question>,
    pub logo: LogoFile,
}

impl ValidVendorDraft {
    /// The `questions` form field: `[{"question": ".."}, ..]`.
    pub fn questions_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.questions)
    }
}
