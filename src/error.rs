use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] rquest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid draft: {0}")]
    Draft(#[from] DraftError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid vendor identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("No form is open")]
    NoOpenForm,
}

impl Error {
    /// True when the request never reached the backend or never came back.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("question {0} is empty")]
    EmptyQuestion(usize),

    #[error("website must be an http(s) URL: {0}")]
    InvalidWebsite(String),

    #[error("a vendor logo is required")]
    MissingLogo,
}
