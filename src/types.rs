use crate::auth::Credentials;
use crate::error::BraviaError;
use crate::protocol::{bool_field, i64_field, str_field};
use crate::schedule::{compute_schedule, Schedule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Address and credentials of a single TV
///
/// Immutable for the lifetime of a client.
#[derive(Debug)]
pub struct DeviceEndpoint {
    /// Host name or IP address, optionally with `:port`
    pub host: String,

    /// How requests are authenticated
    pub credentials: Credentials,

    /// Hardware address, required for Wake-on-LAN
    pub mac: Option<MacAddress>,
}

impl DeviceEndpoint {
    /// Endpoint authenticated with a pre-shared key
    pub fn new(host: impl Into<String>, psk: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credentials: Credentials::pre_shared_key(psk),
            mac: None,
        }
    }

    /// Endpoint relying on the legacy pin pairing and its session cookie
    pub fn with_pairing(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credentials: Credentials::Pairing,
            mac: None,
        }
    }

    /// Set the hardware address used to wake the TV
    pub fn with_mac(mut self, mac: MacAddress) -> Self {
        self.mac = Some(mac);
        self
    }
}

/// Six byte hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = BraviaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(BraviaError::InvalidMac(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (byte, part) in bytes.iter_mut().zip(&parts) {
            if part.len() != 2 {
                return Err(BraviaError::InvalidMac(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| BraviaError::InvalidMac(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Power state reported by the TV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerStatus {
    Active,
    Standby,
    /// Powered off or unreachable
    Off,
    /// Any status string this library does not know about
    Other(String),
}

impl PowerStatus {
    pub(crate) fn from_status(status: &str) -> Self {
        match status {
            "active" => PowerStatus::Active,
            "standby" => PowerStatus::Standby,
            "off" => PowerStatus::Off,
            other => PowerStatus::Other(other.to_string()),
        }
    }

    /// Status as the TV spells it
    pub fn as_str(&self) -> &str {
        match self {
            PowerStatus::Active => "active",
            PowerStatus::Standby => "standby",
            PowerStatus::Off => "off",
            PowerStatus::Other(status) => status,
        }
    }

    pub fn is_active(&self) -> bool {
        *self == PowerStatus::Active
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote control command advertised by the TV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Human readable name, e.g. `VolumeUp`
    pub name: String,

    /// Opaque IRCC code
    pub code: String,
}

/// Tunable channel or physical input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub title: String,
    pub uri: String,
}

/// Information on the program currently shown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayingInfo {
    pub program_title: Option<String>,
    pub title: Option<String>,
    pub program_media_type: Option<String>,
    pub disp_num: Option<String>,
    pub source: Option<String>,
    pub uri: Option<String>,
    pub duration_sec: Option<i64>,
    pub start_date_time: Option<String>,
}

impl PlayingInfo {
    pub(crate) fn from_value(value: &Value) -> Self {
        Self {
            program_title: str_field(value, "programTitle"),
            title: str_field(value, "title"),
            program_media_type: str_field(value, "programMediaType"),
            disp_num: str_field(value, "dispNum"),
            source: str_field(value, "source"),
            uri: str_field(value, "uri"),
            duration_sec: i64_field(value, "durationSec"),
            start_date_time: str_field(value, "startDateTime"),
        }
    }

    /// Start and end clock times of the program, when the TV reports them
    pub fn schedule(&self) -> Option<Schedule> {
        let start = self.start_date_time.as_deref()?;
        let duration = self.duration_sec?;
        compute_schedule(start, duration).ok()
    }
}

/// Volume information for one audio target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub target: String,
    pub volume: Option<i64>,
    pub mute: Option<bool>,
    pub min_volume: Option<i64>,
    pub max_volume: Option<i64>,
}

impl VolumeInfo {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            target: str_field(value, "target")?,
            volume: i64_field(value, "volume"),
            mute: bool_field(value, "mute"),
            min_volume: i64_field(value, "minVolume"),
            max_volume: i64_field(value, "maxVolume"),
        })
    }
}

/// General information about the TV
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub name: Option<String>,
    pub model: Option<String>,
    pub mac: Option<String>,
    pub serial: Option<String>,
    pub language: Option<String>,
}

impl SystemInfo {
    pub(crate) fn from_value(value: &Value) -> Self {
        Self {
            name: str_field(value, "name"),
            model: str_field(value, "model"),
            mac: str_field(value, "mac"),
            serial: str_field(value, "serial"),
            language: str_field(value, "language"),
        }
    }
}

/// Settings of the TV's first network interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub mac: Option<String>,
    pub ip: Option<String>,
    pub gateway: Option<String>,
}

impl NetworkInfo {
    pub(crate) fn from_value(value: &Value) -> Self {
        Self {
            mac: str_field(value, "hwAddr"),
            ip: str_field(value, "ipAddrV4"),
            gateway: str_field(value, "gateway"),
        }
    }
}

/// Status of a physical input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalInput {
    pub uri: Option<String>,
    pub title: Option<String>,
    pub label: Option<String>,
    pub icon: Option<String>,
    pub connection: Option<bool>,
    pub status: Option<String>,
}

impl ExternalInput {
    pub(crate) fn from_value(value: &Value) -> Self {
        Self {
            uri: str_field(value, "uri"),
            title: str_field(value, "title"),
            label: str_field(value, "label"),
            icon: str_field(value, "icon"),
            connection: bool_field(value, "connection"),
            status: str_field(value, "status"),
        }
    }
}

/// Installed application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub title: String,
    pub uri: String,
    pub icon: Option<String>,
}

impl AppInfo {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            title: str_field(value, "title")?,
            uri: str_field(value, "uri")?,
            icon: str_field(value, "icon"),
        })
    }
}
