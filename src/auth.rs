use crate::client::BraviaClient;
use crate::error::Result;
use crate::protocol::{Request, Response, Service};
use crate::report::Reporting;
use reqwest::header::{CONNECTION, CONTENT_TYPE};
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::sync::atomic::Ordering;
use uuid::Uuid;

/// Header carrying the pre-shared key
pub const PSK_HEADER: &str = "X-Auth-PSK";

/// How requests are authenticated
///
/// A TV either accepts a pre-shared key header on every request, or a
/// session cookie obtained through the legacy pin pairing exchange. Pairing
/// works whatever credentials the client was built with.
#[derive(Debug)]
pub enum Credentials {
    /// Static key configured on the TV, sent as `X-Auth-PSK`
    PreSharedKey(SecretString),

    /// Session cookie from a prior `pair` call, replayed by the cookie store
    Pairing,
}

impl Credentials {
    pub fn pre_shared_key(key: impl Into<String>) -> Self {
        Credentials::PreSharedKey(SecretString::from(key.into()))
    }

    pub(crate) fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::PreSharedKey(key) => builder.header(PSK_HEADER, key.expose_secret()),
            Credentials::Pairing => builder,
        }
    }
}

/// Identity this client registers with during pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client_id: String,
    pub nickname: String,
}

impl ClientIdentity {
    pub fn new(client_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            nickname: nickname.into(),
        }
    }

    /// Identity with a freshly generated client id
    pub fn generate(nickname: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), nickname)
    }
}

impl BraviaClient {
    /// Register with the TV and keep the session cookie it hands out
    ///
    /// Call with `pin: None` (or `"0000"`) to make the TV display a pin, then
    /// again with the displayed pin. On success later requests carry the
    /// session cookie and `is_paired` returns `true`.
    pub async fn pair(&self, pin: Option<&SecretString>, identity: &ClientIdentity) -> Result<()> {
        let path = Service::AccessControl.path();
        let request = Request::new("actRegister").with_param_list(vec![
            json!({
                "clientid": identity.client_id,
                "nickname": identity.nickname,
                "level": "private",
            }),
            json!([{ "value": "yes", "function": "WOL" }]),
        ]);

        let mut builder = self
            .transport
            .request(&path)
            .header(CONTENT_TYPE, "application/json")
            .body(request.to_body()?);
        if let Some(pin) = pin {
            builder = builder
                .basic_auth("", Some(pin.expose_secret()))
                .header(CONNECTION, "keep-alive");
        }

        let reply = self
            .transport
            .dispatch(&path, builder, Reporting::Report)
            .await?;
        let reply = self
            .transport
            .ensure_success(&path, reply, Reporting::Report)?;

        // Some firmware answers a successful registration with an empty body
        if !reply.body.iter().all(u8::is_ascii_whitespace) {
            let rejection = match Response::decode(&reply.body) {
                Ok(response) => response.api_error(),
                Err(error) => Some(error),
            };
            if let Some(error) = rejection {
                self.transport.record(&path, &error, Reporting::Report);
                return Err(error);
            }
        }

        self.paired.store(true, Ordering::SeqCst);
        tracing::info!(host = self.transport.host(), client_id = %identity.client_id, "Paired with TV");
        Ok(())
    }

    /// Whether a pairing exchange has succeeded on this client
    pub fn is_paired(&self) -> bool {
        self.paired.load(Ordering::SeqCst)
    }

    /// Whether requests carry some form of credentials
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.transport.credentials(),
            Credentials::PreSharedKey(_)
        ) || self.is_paired()
    }
}
