//! Rust library for controlling Sony Bravia TVs over the local network
//!
//! This library provides an async API for a single Bravia TV using its
//! pre-shared key (PSK) authentication. It supports:
//!
//! - Remote control commands over IRCC (volume, mute, playback, power)
//! - Power state, volume, system and network queries
//! - Source listing and input switching
//! - App listing and launching
//! - Wake-on-LAN
//! - Legacy pin pairing with a session cookie
//!
//! # Quick Start
//!
//! ```no_run
//! use bravia_psk::{BraviaClient, DeviceEndpoint, PowerStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoint = DeviceEndpoint::new("192.168.1.20", "sony")
//!         .with_mac("fc:f1:52:00:11:22".parse()?);
//!     let client = BraviaClient::new(endpoint)?;
//!
//!     if client.power_status().await == PowerStatus::Off {
//!         client.turn_on().await?;
//!     }
//!
//!     let playing = client.playing_info().await;
//!     if let Some(schedule) = playing.schedule() {
//!         println!(
//!             "{} ({} - {})",
//!             playing.program_title.unwrap_or_default(),
//!             schedule.start_time,
//!             schedule.end_time
//!         );
//!     }
//!
//!     for (title, _uri) in client.source_catalog().await.iter() {
//!         println!("Source: {title}");
//!     }
//!     client.select_source("HDMI 2").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Client**: `BraviaClient`, control operations and configuration
//! - **Status**: typed queries that degrade to "unknown" instead of failing
//! - **Commands / Sources**: lazily loaded, single-flight caches
//! - **Transport**: HTTP requests with credentials, timeout and failure reporting
//! - **Protocol**: JSON-RPC and IRCC message structures

mod auth;
mod cache;
mod client;
mod commands;
mod error;
mod protocol;
mod report;
mod schedule;
mod sources;
mod status;
mod transport;
mod types;
mod wol;

// Public exports
pub use auth::{ClientIdentity, Credentials, PSK_HEADER};
pub use client::{BraviaClient, BraviaClientBuilder};
pub use error::{BraviaError, FailureKind, Result};
pub use protocol::{ircc_envelope, Request, Response, Service};
pub use report::{ErrorReporter, TracingReporter};
pub use schedule::{compute_schedule, Schedule};
pub use sources::{SourceCatalog, BROADCAST_SOURCES, PHYSICAL_INPUTS};
pub use status::DISPLAY_OFF;
pub use transport::DEFAULT_TIMEOUT;
pub use types::{
    AppInfo, CommandEntry, DeviceEndpoint, ExternalInput, MacAddress, NetworkInfo,
    PlayingInfo, PowerStatus, SourceEntry, SystemInfo, VolumeInfo,
};
pub use wol::{magic_packet, wake, WOL_PORT};

// Re-exported so callers can build credentials without naming `secrecy`
pub use secrecy::SecretString;
