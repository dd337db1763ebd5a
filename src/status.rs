use crate::client::BraviaClient;
use crate::error::BraviaError;
use crate::protocol::{str_field, Request, Service};
use crate::report::Reporting;
use crate::types::{AppInfo, ExternalInput, NetworkInfo, PlayingInfo, PowerStatus, SystemInfo, VolumeInfo};
use serde_json::Value;

/// Error code for volume queries while the display is off
pub const DISPLAY_OFF: i64 = 40005;

/// Audio target whose volume is reported
const SPEAKER_TARGET: &str = "speaker";

impl BraviaClient {
    /// Get the power state: active, standby or off
    ///
    /// An unreachable TV reads as `PowerStatus::Off`; for the purpose of
    /// this library the two are indistinguishable.
    pub async fn power_status(&self) -> PowerStatus {
        let request = Request::new("getPowerStatus");
        match self
            .first_result(Service::System, &request, Reporting::Suppress)
            .await
        {
            Ok(payload) => str_field(&payload, "status")
                .map(|status| PowerStatus::from_status(&status))
                .unwrap_or(PowerStatus::Off),
            Err(_) => PowerStatus::Off,
        }
    }

    /// Get information on the program shown on the TV
    ///
    /// Fields the TV leaves out read as `None`; a failed request yields an
    /// all-`None` record.
    pub async fn playing_info(&self) -> PlayingInfo {
        let request = Request::new("getPlayingContentInfo");
        self.first_result(Service::AvContent, &request, Reporting::Suppress)
            .await
            .map(|payload| PlayingInfo::from_value(&payload))
            .unwrap_or_default()
    }

    /// Get the speaker volume
    ///
    /// Returns `None` when the TV reports no speaker target or the query
    /// fails. A TV with its display off refuses the query with error 40005,
    /// which is expected and not reported.
    pub async fn volume_info(&self) -> Option<VolumeInfo> {
        let path = Service::Audio.path();
        let request = Request::new("getVolumeInformation");

        match self
            .first_result(Service::Audio, &request, Reporting::Suppress)
            .await
        {
            Ok(payload) => payload
                .as_array()?
                .iter()
                .find(|entry| str_field(entry, "target").as_deref() == Some(SPEAKER_TARGET))
                .and_then(VolumeInfo::from_value),
            Err(error @ BraviaError::Api { .. }) => {
                if error.api_code() != Some(DISPLAY_OFF) {
                    self.transport.record(&path, &error, Reporting::Report);
                }
                None
            }
            Err(_) => None,
        }
    }

    /// Get name, model and serial information
    pub async fn system_info(&self) -> SystemInfo {
        let request = Request::new("getSystemInformation");
        self.first_result(Service::System, &request, Reporting::Report)
            .await
            .map(|payload| SystemInfo::from_value(&payload))
            .unwrap_or_default()
    }

    /// Get the settings of the first network interface
    pub async fn network_info(&self) -> NetworkInfo {
        let request = Request::new("getNetworkSettings");
        self.first_result(Service::System, &request, Reporting::Report)
            .await
            .ok()
            .and_then(|payload| payload.as_array().and_then(|ifaces| ifaces.first()).cloned())
            .map(|iface| NetworkInfo::from_value(&iface))
            .unwrap_or_default()
    }

    /// Get the connection status of the physical inputs
    pub async fn external_input_status(&self) -> Vec<ExternalInput> {
        let request = Request::new("getCurrentExternalInputsStatus");
        self.first_result(Service::AvContent, &request, Reporting::Suppress)
            .await
            .ok()
            .as_ref()
            .and_then(Value::as_array)
            .map(|inputs| inputs.iter().map(ExternalInput::from_value).collect())
            .unwrap_or_default()
    }

    /// Get the list of installed applications
    pub async fn app_list(&self) -> Vec<AppInfo> {
        let request = Request::new("getApplicationList");
        self.first_result(Service::AppControl, &request, Reporting::Report)
            .await
            .ok()
            .as_ref()
            .and_then(Value::as_array)
            .map(|apps| apps.iter().filter_map(AppInfo::from_value).collect())
            .unwrap_or_default()
    }
}
