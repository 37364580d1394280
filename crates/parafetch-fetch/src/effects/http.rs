use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::data::HeadInfo;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Status and streaming body of a GET request.
pub struct HttpResponse<E> {
    pub status: u16,
    pub body:   BoxStream<'static, Result<Bytes, E>>,
}

impl<E> std::fmt::Debug for HttpResponse<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP client abstraction.
///
/// The minimal interface the download pipeline needs: a metadata-only probe
/// and a streaming GET that reports its status instead of failing on it.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations in tests
pub trait HttpClient: Send + Sync {
    /// Transport-level error. Non-success statuses are not errors.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a GET with the given headers and return the status and body.
    ///
    /// # Errors
    ///
    /// DNS failures, refused connections, timeouts and other transport
    /// problems. A 4xx or 5xx status is returned as an `Ok` response.
    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse<Self::Error>, Self::Error>> + Send;

    /// Send a HEAD request and return the headers relevant to planning.
    ///
    /// # Errors
    ///
    /// Transport problems and non-success statuses.
    fn head(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HeadInfo, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use futures_util::StreamExt;
    use reqwest::header::{ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_LENGTH, HeaderMap};

    use super::*;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a client with default configuration.
        pub fn new() -> Result<Self, reqwest::Error> { Self::builder().build() }

        pub fn builder() -> ReqwestClientBuilder { ReqwestClientBuilder::default() }
    }

    /// Timeouts and identity of a [`ReqwestClient`].
    #[derive(Debug, Clone)]
    pub struct ReqwestClientBuilder {
        connect_timeout: Option<Duration>,
        timeout:         Option<Duration>,
        user_agent:      String,
    }

    impl Default for ReqwestClientBuilder {
        fn default() -> Self {
            Self {
                connect_timeout: Some(Duration::from_secs(30)),
                timeout:         None,
                user_agent:      concat!("parafetch/", env!("CARGO_PKG_VERSION")).to_string(),
            }
        }
    }

    impl ReqwestClientBuilder {
        #[must_use]
        pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
            self.connect_timeout = timeout;
            self
        }

        /// Deadline for a whole request, body included. A stalled range
        /// request fails its chunk once this fires.
        #[must_use]
        pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
            self.timeout = timeout;
            self
        }

        #[must_use]
        pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = user_agent.into();
            self
        }

        pub fn build(self) -> Result<ReqwestClient, reqwest::Error> {
            let mut builder = reqwest::Client::builder().user_agent(self.user_agent);
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            Ok(ReqwestClient {
                client: builder.build()?,
            })
        }
    }

    fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<HttpResponse<Self::Error>, Self::Error> {
            let mut request = self.client.get(url);

            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes_stream().map(|result| result.map(Bytes::from));

            Ok(HttpResponse {
                status,
                body: Box::pin(body),
            })
        }

        async fn head(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<HeadInfo, Self::Error> {
            let mut request = self.client.head(url);

            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?.error_for_status()?;
            let headers = response.headers();

            Ok(HeadInfo {
                content_length:      header_str(headers, CONTENT_LENGTH)
                    .and_then(|s| s.trim().parse::<u64>().ok()),
                accept_ranges:       header_str(headers, ACCEPT_RANGES),
                content_disposition: header_str(headers, CONTENT_DISPOSITION),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ReqwestClient, ReqwestClientBuilder};
