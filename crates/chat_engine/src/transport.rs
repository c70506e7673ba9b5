use std::time::Duration;

use chat_logging::{chat_debug, chat_trace};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{StatusCode, Url};

use crate::decode::decode_body;
use crate::{
    FailureKind, FetchReply, PaginationHeaders, TransportError, HEADER_CHAT_TAG,
    HEADER_FIRST_MSG_ID, HEADER_LAST_MSG_ID,
};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Chat endpoint; GET queries are appended to it and POSTs go to it unchanged.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// `GET <endpoint>?<query>`.
    async fn fetch(&self, query: &str) -> Result<FetchReply, TransportError>;

    /// `POST <endpoint>` with the raw message text as body.
    async fn post(&self, body: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    endpoint: Url,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    fn url_for(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query((!query.is_empty()).then_some(query));
        url
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, TransportError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl ChatTransport for ReqwestTransport {
    async fn fetch(&self, query: &str) -> Result<FetchReply, TransportError> {
        let url = self.url_for(query);
        chat_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchReply::NotModified);
        }
        if !status.is_success() {
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let markers = pagination_headers(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = self.read_body(response).await?;
        let decoded = decode_body(&bytes, content_type.as_deref());
        chat_debug!(
            "fetched {} bytes ({}) for query {:?}",
            bytes.len(),
            decoded.encoding_label,
            query
        );

        Ok(FetchReply::Content {
            html: decoded.text,
            markers,
            encoding_label: decoded.encoding_label,
        })
    }

    async fn post(&self, body: &str) -> Result<(), TransportError> {
        chat_trace!("POST {} ({} bytes)", self.endpoint, body.len());
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ))
        }
    }
}

fn pagination_headers(headers: &HeaderMap) -> PaginationHeaders {
    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
    };
    PaginationHeaders {
        first_msg_id: text(HEADER_FIRST_MSG_ID),
        last_msg_id: text(HEADER_LAST_MSG_ID),
        chat_tag: text(HEADER_CHAT_TAG),
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> TransportError {
    TransportError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return TransportError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
