//! Blocking HTTP seam used by the track repository, the audio loader and the
//! contact form.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::HttpError;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `multipart/form-data` text fields, in order.
    Multipart(Vec<(String, String)>),
    Json(serde_json::Value),
}

pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
    fn post(&self, url: &str, body: RequestBody) -> Result<HttpResponse, HttpError>;
}

/// `reqwest` blocking client; every request asks for JSON.
pub struct ReqwestClient {
    inner: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Client for listing and form calls: `timeout` bounds the whole request.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        Self::build(Self::builder().timeout(timeout))
    }

    /// Client for audio bodies and downloads. Only connecting is bounded; a
    /// large file on a slow link may take as long as it takes.
    pub fn for_media(connect_timeout: Duration) -> Result<Self, HttpError> {
        Self::build(
            Self::builder()
                .connect_timeout(connect_timeout)
                .timeout(None::<Duration>),
        )
    }

    fn builder() -> reqwest::blocking::ClientBuilder {
        reqwest::blocking::Client::builder().user_agent(concat!("vault/", env!("CARGO_PKG_VERSION")))
    }

    fn build(builder: reqwest::blocking::ClientBuilder) -> Result<Self, HttpError> {
        let inner = builder.build().map_err(|e| HttpError::Transport {
            url: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self { inner })
    }

    fn finish(
        url: &str,
        result: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<HttpResponse, HttpError> {
        let transport = |e: reqwest::Error| HttpError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = result.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(transport)?.to_vec();
        tracing::debug!(url, status, bytes = body.len(), "http response");
        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| HttpError::InvalidUrl(url.to_string()))?;
        let result = self
            .inner
            .get(parsed)
            .header(reqwest::header::ACCEPT, "application/json")
            .send();
        Self::finish(url, result)
    }

    fn post(&self, url: &str, body: RequestBody) -> Result<HttpResponse, HttpError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| HttpError::InvalidUrl(url.to_string()))?;
        let request = self
            .inner
            .post(parsed)
            .header(reqwest::header::ACCEPT, "application/json");
        let request = match body {
            RequestBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(reqwest::blocking::multipart::Form::new(), |form, (k, v)| {
                        form.text(k, v)
                    });
                request.multipart(form)
            }
            RequestBody::Json(value) => request.json(&value),
        };
        Self::finish(url, request.send())
    }
}
