use crate::auth::Credentials;
use crate::error::{BraviaError, FailureKind, Result};
use crate::protocol::{
    ircc_envelope, Request, Response, Service, IRCC_CONTENT_TYPE, IRCC_PATH, IRCC_SOAP_ACTION,
};
use crate::report::{ErrorReporter, Reporting};
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Fixed timeout applied to every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Completed HTTP exchange
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Low-level HTTP handler for one TV
///
/// Every request goes out as a POST to `http://{host}/{path}` carrying the
/// configured credentials and bounded by the fixed timeout. Failures come
/// back as `BraviaError` values and are optionally forwarded to the
/// reporter; nothing here panics.
pub(crate) struct Transport {
    http: reqwest::Client,
    host: String,
    credentials: Credentials,
    timeout: Duration,
    reporter: Arc<dyn ErrorReporter>,
}

impl Transport {
    pub fn new(
        host: String,
        credentials: Credentials,
        timeout: Duration,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self> {
        // Session cookies from pairing are replayed on later requests
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| BraviaError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            host,
            credentials,
            timeout,
            reporter,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.host, path.trim_start_matches('/'))
    }

    /// Start a POST to `path` with credentials and timeout applied
    pub fn request(&self, path: &str) -> RequestBuilder {
        let builder = self.http.post(self.url(path)).timeout(self.timeout);
        self.credentials.apply(builder)
    }

    /// Send a prepared request and read the whole body
    pub async fn dispatch(
        &self,
        path: &str,
        builder: RequestBuilder,
        reporting: Reporting,
    ) -> Result<Reply> {
        let result = Self::exchange(builder).await;
        if let Err(error) = &result {
            self.record(path, error, reporting);
        }
        result
    }

    async fn exchange(builder: RequestBuilder) -> Result<Reply> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(Reply { status, body })
    }

    /// Send a JSON-RPC request and return the `result` sequence
    ///
    /// Protocol errors (an `error` payload) come back as `BraviaError::Api`
    /// regardless of the HTTP status.
    pub async fn call(
        &self,
        service: Service,
        request: &Request,
        reporting: Reporting,
    ) -> Result<Vec<Value>> {
        let path = service.path();
        let body = request.to_body()?;
        tracing::debug!(path = %path, method = %request.method, "Sending: {}", String::from_utf8_lossy(&body));

        let builder = self
            .request(&path)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let reply = self.dispatch(&path, builder, reporting).await?;
        tracing::debug!(path = %path, status = %reply.status, "Received: {}", String::from_utf8_lossy(&reply.body));

        let result = Response::decode(&reply.body).and_then(Response::into_result);
        if let Err(error) = &result {
            self.record(&path, error, reporting);
        }
        result
    }

    /// Send one IRCC code over the SOAP channel
    pub async fn send_ircc(&self, code: &str, reporting: Reporting) -> Result<Vec<u8>> {
        tracing::debug!(code, "Sending IRCC code");

        let builder = self
            .request(IRCC_PATH)
            .header("SOAPACTION", IRCC_SOAP_ACTION)
            .header(CONTENT_TYPE, IRCC_CONTENT_TYPE)
            .body(ircc_envelope(code));
        let reply = self.dispatch(IRCC_PATH, builder, reporting).await?;
        let reply = self.ensure_success(IRCC_PATH, reply, reporting)?;
        Ok(reply.body)
    }

    /// Turn a non-2xx reply into a transport failure
    pub fn ensure_success(&self, path: &str, reply: Reply, reporting: Reporting) -> Result<Reply> {
        if reply.status.is_success() {
            return Ok(reply);
        }
        let error = BraviaError::transport(
            FailureKind::Other,
            format!(
                "HTTP {} from {}: {}",
                reply.status,
                path,
                String::from_utf8_lossy(&reply.body)
            ),
        );
        self.record(path, &error, reporting);
        Err(error)
    }

    /// Forward a failure to the reporter, or keep it at debug level
    pub fn record(&self, path: &str, error: &BraviaError, reporting: Reporting) {
        if reporting.enabled() {
            self.reporter.report(path, error);
        } else {
            tracing::debug!(path, %error, "Suppressed request failure");
        }
    }
}
