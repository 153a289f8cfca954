use rquest::{Client, Response, RequestBuilder};
use rquest_util::Emulation;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use tracing::{debug, error, warn};

/// Transport to the admin backend: one base URL, a browser emulation
/// profile and a set of headers applied to every request.
pub struct HttpClient {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        for (key, value) in config.headers.iter() {
            if let (Ok(header_name), Ok(header_value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value)
            ) {
                headers.insert(header_name, header_value);
                debug!(
                    header_key = key,
                    "Adding header"
                );
            } else {
                error!(
                    header_key = key,
                    header_value = value,
                    "Invalid header value"
                );
            }
        }

        let emulation = emulation_for(&config.emulation);
        debug!(
            emulation = ?emulation,
            base_url = %config.base_url,
            "Creating client with emulation"
        );

        let client = Client::builder()
            .emulation(emulation)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url(&config.base_url)?,
            headers,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` against the base URL, keeping any base path prefix.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Like [`HttpClient::url`], then appends `segment` percent-encoded.
    /// Blank, `.` and `..` segments are refused: `url` would drop them and
    /// the request would land on the collection instead.
    pub fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url> {
        if matches!(segment.trim(), "" | "." | "..") {
            return Err(Error::InvalidIdentifier(segment.to_string()));
        }
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.with_headers(self.client.get(url))
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.with_headers(self.client.post(url))
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.with_headers(self.client.delete(url))
    }

    fn with_headers(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in self.headers.iter() {
            request = request.header(key, value);
        }
        request
    }

    /// Sends the request and turns any non-2xx status into [`Error::Status`].
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Request failed before a response arrived");
            Error::from(e)
        })?;

        let status = response.status();
        debug!(
            status = status.as_u16(),
            url = %response.url(),
            "Response received"
        );

        if status.is_success() {
            Ok(response)
        } else {
            warn!(
                status = status.as_u16(),
                url = %response.url(),
                "Backend rejected request"
            );
            Err(Error::Status {
                status,
                url: response.url().to_string(),
            })
        }
    }
}

fn base_url(raw: &str) -> Result<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}

fn emulation_for(name: &str) -> Emulation {
    match name.to_ascii_lowercase().as_str() {
        "firefox136" => Emulation::Firefox136,
        "safari18_3" => Emulation::Safari18_3,
        "edge134" => Emulation::Edge134,
        "chrome133" => Emulation::Chrome133,
        other => {
            warn!(emulation = other, "Unknown emulation profile, using chrome133");
            Emulation::Chrome133
        }
    }
}
