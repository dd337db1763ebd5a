use crate::cache::RefreshCell;
use crate::commands::CommandTable;
use crate::error::{BraviaError, Result};
use crate::protocol::{Request, Service};
use crate::report::{ErrorReporter, Reporting, TracingReporter};
use crate::schedule::{compute_schedule, Schedule};
use crate::sources::SourceCatalog;
use crate::transport::{Transport, DEFAULT_TIMEOUT};
use crate::types::{DeviceEndpoint, MacAddress};
use serde_json::{json, Value};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Client for a single Sony Bravia TV
///
/// The client talks to the TV's local REST API (`/sony/{service}`) and its
/// IRCC remote control endpoint. Remote control codes and the source list are
/// fetched lazily and cached for the lifetime of the client.
///
/// The client is `Send + Sync`; share it behind an `Arc` to use it from
/// several tasks. Concurrent cache misses trigger a single refresh.
///
/// # Example
///
/// ```no_run
/// use bravia_psk::{BraviaClient, DeviceEndpoint};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = BraviaClient::new(DeviceEndpoint::new("192.168.1.20", "0000"))?;
///
///     if client.power_status().await.is_active() {
///         client.volume_up().await?;
///         client.select_source("HDMI 1").await?;
///     }
///     Ok(())
/// }
/// ```
pub struct BraviaClient {
    pub(crate) transport: Transport,
    pub(crate) mac: Option<MacAddress>,
    pub(crate) paired: AtomicBool,
    pub(crate) commands: CommandTable,
    pub(crate) sources: RefreshCell<SourceCatalog>,
}

/// Builder for [`BraviaClient`]
pub struct BraviaClientBuilder {
    endpoint: DeviceEndpoint,
    timeout: Duration,
    reporter: Arc<dyn ErrorReporter>,
}

impl BraviaClientBuilder {
    /// Per-request timeout, 8 seconds by default
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Where reportable failures go; `TracingReporter` by default
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn build(self) -> Result<BraviaClient> {
        let DeviceEndpoint {
            host,
            credentials,
            mac,
        } = self.endpoint;

        let transport = Transport::new(host, credentials, self.timeout, self.reporter)?;

        Ok(BraviaClient {
            transport,
            mac,
            paired: AtomicBool::new(false),
            commands: RefreshCell::new(),
            sources: RefreshCell::new(),
        })
    }
}

impl BraviaClient {
    /// Create a client with default settings
    pub fn new(endpoint: DeviceEndpoint) -> Result<Self> {
        Self::builder(endpoint).build()
    }

    pub fn builder(endpoint: DeviceEndpoint) -> BraviaClientBuilder {
        BraviaClientBuilder {
            endpoint,
            timeout: DEFAULT_TIMEOUT,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Host this client talks to
    pub fn host(&self) -> &str {
        self.transport.host()
    }

    /// Hardware address used for Wake-on-LAN, if configured
    pub fn mac(&self) -> Option<MacAddress> {
        self.mac
    }

    /// Send a JSON-RPC request and return the first `result` element
    pub(crate) async fn first_result(
        &self,
        service: Service,
        request: &Request,
        reporting: Reporting,
    ) -> Result<Value> {
        let mut result = self.transport.call(service, request, reporting).await?;
        if result.is_empty() {
            return Err(BraviaError::InvalidResponse(format!(
                "Empty result for {}",
                request.method
            )));
        }
        Ok(result.swap_remove(0))
    }

    /// Send a JSON-RPC request whose result is not needed
    async fn invoke(&self, service: Service, request: Request, reporting: Reporting) -> Result<()> {
        self.transport.call(service, &request, reporting).await?;
        Ok(())
    }

    // ========== Power ==========

    /// Turn the TV on with a Wake-on-LAN packet
    ///
    /// Requires a MAC address on the endpoint.
    pub async fn turn_on(&self) -> Result<()> {
        let mac = self.mac.ok_or(BraviaError::MissingMac)?;
        crate::wol::wake(&mac).await
    }

    /// Turn the TV on through the API, for sets without Wake-on-LAN
    ///
    /// Only known to work on Android models. Does nothing if the TV is
    /// already active.
    pub async fn turn_on_command(&self) -> Result<()> {
        if self.power_status().await.is_active() {
            return Ok(());
        }
        // Sets in standby may refuse IRCC; the API call below still wakes them
        if let Err(error) = self.send_command("TvPower").await {
            tracing::debug!(%error, "TvPower command failed, falling back to setPowerStatus");
        }
        self.invoke(
            Service::System,
            Request::new("setPowerStatus").with_params(json!({ "status": true })),
            Reporting::Suppress,
        )
        .await
    }

    /// Turn the TV off with the `PowerOff` remote command
    pub async fn turn_off(&self) -> Result<bool> {
        self.send_command("PowerOff").await
    }

    /// Turn the TV off through the API (Android models)
    pub async fn turn_off_command(&self) -> Result<()> {
        self.invoke(
            Service::System,
            Request::new("setPowerStatus").with_params(json!({ "status": false })),
            Reporting::Report,
        )
        .await
    }

    // ========== Volume ==========

    pub async fn volume_up(&self) -> Result<bool> {
        self.send_command("VolumeUp").await
    }

    pub async fn volume_down(&self) -> Result<bool> {
        self.send_command("VolumeDown").await
    }

    pub async fn mute_volume(&self) -> Result<bool> {
        self.send_command("Mute").await
    }

    /// Set the speaker volume, `level` in `0.0..=1.0`
    pub async fn set_volume_level(&self, level: f64) -> Result<()> {
        // The API takes an integer percentage sent as a string
        let volume = (level.clamp(0.0, 1.0) * 100.0).round() as u8;
        self.invoke(
            Service::Audio,
            Request::new("setAudioVolume").with_params(json!({
                "target": "speaker",
                "volume": volume.to_string(),
            })),
            Reporting::Report,
        )
        .await
    }

    // ========== Playback ==========

    pub async fn media_play(&self) -> Result<bool> {
        self.send_command("Play").await
    }

    pub async fn media_pause(&self) -> Result<bool> {
        self.send_command("Pause").await
    }

    /// Pause live TV (time shift)
    pub async fn media_tvpause(&self) -> Result<bool> {
        self.send_command("TvPause").await
    }

    pub async fn media_next_track(&self) -> Result<bool> {
        self.send_command("Next").await
    }

    pub async fn media_previous_track(&self) -> Result<bool> {
        self.send_command("Prev").await
    }

    /// Play content by URI, e.g. a channel or input from the source catalog
    pub async fn play_content(&self, uri: &str) -> Result<()> {
        self.invoke(
            Service::AvContent,
            Request::new("setPlayContent").with_params(json!({ "uri": uri })),
            Reporting::Report,
        )
        .await
    }

    /// Start and end clock times for a program start and duration
    ///
    /// See [`compute_schedule`].
    pub fn playing_time(&self, start_date_time: &str, duration_sec: i64) -> Result<Schedule> {
        compute_schedule(start_date_time, duration_sec)
    }

    // ========== Apps ==========

    /// Launch the application with the given URI
    pub async fn open_app(&self, uri: &str) -> Result<()> {
        self.invoke(
            Service::AppControl,
            Request::new("setActiveApp").with_params(json!({ "uri": uri })),
            Reporting::Report,
        )
        .await
    }
}
