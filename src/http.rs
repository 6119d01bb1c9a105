// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A streaming response body
///
/// Transport errors that happen mid-body surface as `io::Error`.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// A fully buffered response, used for the feed document
pub struct BufferedResponse {
    pub status: u16,
    pub body: Bytes,
}

/// A streamed response, used for episode audio
pub struct HttpResponse {
    pub status: u16,
    /// Content-Length header value, if the server declared one
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

/// HTTP client abstraction so the feed loader and downloader can be tested
/// without network access
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch the entire response body
    async fn get_bytes(&self, url: &str) -> Result<BufferedResponse, reqwest::Error>;

    /// Open a response whose body is consumed chunk by chunk
    async fn get_stream(&self, url: &str) -> Result<HttpResponse, reqwest::Error>;
}

/// Default HTTP client implementation using reqwest
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client that identifies itself with [`USER_AGENT`]
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_bytes(&self, url: &str) -> Result<BufferedResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(BufferedResponse { status, body })
    }

    async fn get_stream(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;

        Ok(HttpResponse {
            status: response.status().as_u16(),
            content_length: response.content_length(),
            body: Box::pin(response.bytes_stream().map_err(io::Error::other)),
        })
    }
}
