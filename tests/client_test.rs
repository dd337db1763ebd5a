// Integration tests for `BraviaClient` using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

use bravia_psk::{
    BraviaClient, BraviaError, ClientIdentity, DeviceEndpoint, ErrorReporter, FailureKind,
    PowerStatus, SecretString,
};

const PSK: &str = "sony";
const VOLUME_UP: &str = "AAAAAQAAAAEAAAASAw==";
const MUTE: &str = "AAAAAQAAAAEAAAAUAw==";

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingReporter {
    reports: Mutex<Vec<(String, Option<i64>, Option<FailureKind>)>>,
}

impl RecordingReporter {
    fn reports(&self) -> Vec<(String, Option<i64>, Option<FailureKind>)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, path: &str, error: &BraviaError) {
        self.reports.lock().unwrap().push((
            path.to_string(),
            error.api_code(),
            error.failure_kind(),
        ));
    }
}

fn client_for(host: String, reporter: Arc<RecordingReporter>) -> BraviaClient {
    BraviaClient::builder(DeviceEndpoint::new(host, PSK))
        .timeout(Duration::from_millis(500))
        .reporter(reporter)
        .build()
        .unwrap()
}

async fn setup() -> (MockServer, BraviaClient, Arc<RecordingReporter>) {
    let server = MockServer::start().await;
    let reporter = Arc::new(RecordingReporter::default());
    let client = client_for(server.address().to_string(), reporter.clone());
    (server, client, reporter)
}

/// Host on which nothing is listening
fn dead_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

fn result(payload: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": payload, "id": 1 }))
}

fn error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "error": [code, message], "id": 1 }))
}

fn rpc(service: &str, rpc_method: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(format!("/sony/{service}")))
        .and(body_partial_json(json!({ "method": rpc_method })))
}

fn remote_controller_info() -> ResponseTemplate {
    result(json!([
        { "bundled": true, "type": "RM-J1100" },
        [
            { "name": "VolumeUp", "value": VOLUME_UP },
            { "name": "Mute", "value": MUTE },
            { "name": "PowerOff", "value": "AAAAAQAAAAEAAAAvAw==" }
        ]
    ]))
}

fn content_page(first_index: i64, len: i64) -> ResponseTemplate {
    let items: Vec<Value> = (first_index..first_index + len)
        .map(|index| {
            json!({
                "index": index,
                "title": format!("Channel {index}"),
                "uri": format!("tv:dvbt?trip=1.2.{index}"),
                "dispNum": format!("{:03}", index + 1)
            })
        })
        .collect();
    result(json!([items]))
}

// ── Protocol / transport ────────────────────────────────────────────

#[tokio::test]
async fn json_requests_carry_psk_and_envelope() {
    let (server, client, _) = setup().await;

    rpc("system", "getPowerStatus")
        .and(header("X-Auth-PSK", PSK))
        .and(body_partial_json(json!({ "params": [], "id": 1, "version": "1.0" })))
        .respond_with(result(json!([{ "status": "active" }])))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.power_status().await, PowerStatus::Active);
}

#[tokio::test]
async fn error_payload_with_http_200_is_protocol_failure() {
    let (server, client, reporter) = setup().await;

    rpc("avContent", "setPlayContent")
        .and(body_partial_json(json!({ "params": [{ "uri": "tv:dvbt?trip=1" }] })))
        .respond_with(error(7, "Illegal Argument"))
        .mount(&server)
        .await;

    let outcome = client.play_content("tv:dvbt?trip=1").await;
    assert!(matches!(outcome, Err(BraviaError::Api { code: 7, .. })));
    assert_eq!(
        reporter.reports(),
        vec![("sony/avContent".to_string(), Some(7), None)]
    );
}

#[tokio::test]
async fn unparsable_body_is_decode_failure() {
    let (server, client, reporter) = setup().await;

    rpc("system", "setPowerStatus")
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        client.turn_off_command().await,
        Err(BraviaError::Json(_))
    ));
    assert_eq!(reporter.reports().len(), 1);
}

#[tokio::test]
async fn connection_failure_is_classified_and_reported() {
    let reporter = Arc::new(RecordingReporter::default());
    let client = client_for(dead_host(), reporter.clone());

    let outcome = client.play_content("extInput:hdmi?port=1").await;
    let error = outcome.unwrap_err();
    assert_eq!(error.failure_kind(), Some(FailureKind::Connection));
    assert_eq!(
        reporter.reports(),
        vec![(
            "sony/avContent".to_string(),
            None,
            Some(FailureKind::Connection)
        )]
    );
}

#[tokio::test]
async fn slow_response_is_timeout() {
    let (server, client, reporter) = setup().await;

    rpc("appControl", "setActiveApp")
        .respond_with(result(json!([])).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let error = client.open_app("com.sony.dtv.netflix").await.unwrap_err();
    assert_eq!(error.failure_kind(), Some(FailureKind::Timeout));
    assert_eq!(reporter.reports()[0].2, Some(FailureKind::Timeout));
}

// ── Command table ───────────────────────────────────────────────────

#[tokio::test]
async fn command_codes_resolve_from_a_single_fetch() {
    let (server, client, _) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(remote_controller_info())
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.command_code("VolumeUp").await.as_deref(), Some(VOLUME_UP));
    assert_eq!(client.command_code("Mute").await.as_deref(), Some(MUTE));
    assert_eq!(client.command_code("Netflix").await, None);
    assert_eq!(client.command_code("Teletext").await, None);
    assert_eq!(client.command_code("VolumeUp").await.as_deref(), Some(VOLUME_UP));

    let names: Vec<String> = client.commands().await.into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["VolumeUp", "Mute", "PowerOff"]);
}

#[tokio::test]
async fn send_command_posts_ircc_envelope() {
    let (server, client, _) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(remote_controller_info())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sony/IRCC"))
        .and(header("X-Auth-PSK", PSK))
        .and(header(
            "SOAPACTION",
            "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"",
        ))
        .and(body_string_contains(format!("<IRCCCode>{VOLUME_UP}</IRCCCode>")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.volume_up().await.unwrap());
    // Unknown commands are a no-op, not an error
    assert!(!client.send_command("Netflix").await.unwrap());
}

#[tokio::test]
async fn ircc_http_error_is_transport_failure() {
    let (server, client, reporter) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/IRCC"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<s:Fault/>"))
        .mount(&server)
        .await;

    let error = client.send_ircc("bogus").await.unwrap_err();
    assert_eq!(error.failure_kind(), Some(FailureKind::Other));
    assert_eq!(reporter.reports().len(), 1);
}

#[tokio::test]
async fn standby_command_fetch_is_benign_and_retried() {
    let (server, client, reporter) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(error(40000, "not power-on"))
        .expect(2)
        .mount(&server)
        .await;

    assert_eq!(client.command_code("VolumeUp").await, None);
    assert_eq!(client.command_code("VolumeUp").await, None);
    assert!(reporter.reports().is_empty());
}

#[tokio::test]
async fn other_command_fetch_errors_are_reported() {
    let (server, client, reporter) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(error(403, "Forbidden"))
        .mount(&server)
        .await;

    assert_eq!(client.command_code("Mute").await, None);
    assert_eq!(
        reporter.reports(),
        vec![("sony/system".to_string(), Some(403), None)]
    );
}

#[tokio::test]
async fn invalidation_forces_one_refetch() {
    let (server, client, _) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(remote_controller_info())
        .expect(2)
        .mount(&server)
        .await;

    assert!(client.command_code("Mute").await.is_some());
    client.invalidate_commands().await;
    assert!(client.command_code("Mute").await.is_some());
    assert!(client.command_code("Mute").await.is_some());
}

#[tokio::test]
async fn concurrent_lookups_share_one_refresh() {
    let (server, client, _) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(remote_controller_info().set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(client);
    let (a, b, c) = tokio::join!(
        client.command_code("VolumeUp"),
        client.command_code("Mute"),
        client.command_code("Unknown"),
    );
    assert_eq!(a.as_deref(), Some(VOLUME_UP));
    assert_eq!(b.as_deref(), Some(MUTE));
    assert_eq!(c, None);
}

#[tokio::test]
async fn concurrent_lookups_share_one_failed_refresh() {
    let (server, client, reporter) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(error(40000, "not power-on").set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let (a, b, c) = tokio::join!(
        client.command_code("VolumeUp"),
        client.command_code("Mute"),
        client.command_code("PowerOff"),
    );
    assert_eq!((a, b, c), (None, None, None));
    assert!(reporter.reports().is_empty());
}

#[tokio::test]
async fn empty_command_list_is_fetched_again() {
    let (server, client, _) = setup().await;

    rpc("system", "getRemoteControllerInfo")
        .respond_with(result(json!([{ "bundled": true, "type": "RM-J1100" }, []])))
        .expect(2)
        .mount(&server)
        .await;

    assert_eq!(client.command_code("VolumeUp").await, None);
    assert_eq!(client.command_code("VolumeUp").await, None);
}

// ── Source catalog ──────────────────────────────────────────────────

#[tokio::test]
async fn tuner_pages_are_followed_until_empty() {
    let (server, client, _) = setup().await;

    rpc("avContent", "getSourceList")
        .and(body_partial_json(json!({ "params": [{ "scheme": "tv" }] })))
        .respond_with(result(json!([[{ "source": "tv:dvbt" }, { "source": "tv:unknown" }]])))
        .mount(&server)
        .await;
    rpc("avContent", "getSourceList")
        .and(body_partial_json(json!({ "params": [{ "scheme": "extInput" }] })))
        .respond_with(result(json!([[]])))
        .mount(&server)
        .await;

    for (start, len) in [(0, 3), (3, 2), (5, 0)] {
        rpc("avContent", "getContentList")
            .and(body_partial_json(
                json!({ "params": [{ "source": "tv:dvbt", "stIdx": start }] }),
            ))
            .respond_with(content_page(start, len))
            .expect(1)
            .mount(&server)
            .await;
    }

    let catalog = client.build_catalog().await;
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog["Channel 4"], "tv:dvbt?trip=1.2.4");

    let page_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| {
            String::from_utf8_lossy(&request.body).contains("getContentList")
        })
        .count();
    assert_eq!(page_requests, 3);
}

#[tokio::test]
async fn pagination_error_truncates_only_that_source() {
    let (server, client, _) = setup().await;

    rpc("avContent", "getSourceList")
        .and(body_partial_json(json!({ "params": [{ "scheme": "tv" }] })))
        .respond_with(result(json!([[{ "source": "tv:dvbt" }]])))
        .mount(&server)
        .await;
    rpc("avContent", "getSourceList")
        .and(body_partial_json(json!({ "params": [{ "scheme": "extInput" }] })))
        .respond_with(result(json!([[
            { "source": "extInput:hdmi" },
            { "source": "extInput:widi" }
        ]])))
        .mount(&server)
        .await;

    rpc("avContent", "getContentList")
        .and(body_partial_json(json!({ "params": [{ "source": "tv:dvbt", "stIdx": 0 }] })))
        .respond_with(content_page(0, 3))
        .mount(&server)
        .await;
    rpc("avContent", "getContentList")
        .and(body_partial_json(json!({ "params": [{ "source": "tv:dvbt", "stIdx": 3 }] })))
        .respond_with(error(500, "Internal Server Error"))
        .mount(&server)
        .await;
    rpc("avContent", "getContentList")
        .and(body_partial_json(json!({ "params": [{ "source": "extInput:hdmi" }] })))
        .respond_with(result(json!([[
            { "title": "HDMI 1", "uri": "extInput:hdmi?port=1" },
            { "title": "HDMI 2", "uri": "extInput:hdmi?port=2" }
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = client.build_catalog().await;
    let titles: Vec<&str> = catalog.keys().map(String::as_str).collect();
    assert_eq!(
        titles,
        ["Channel 0", "Channel 1", "Channel 2", "HDMI 1", "HDMI 2"]
    );
}

#[tokio::test]
async fn select_source_plays_catalog_uri() {
    let (server, client, _) = setup().await;

    rpc("avContent", "getSourceList")
        .and(body_partial_json(json!({ "params": [{ "scheme": "tv" }] })))
        .respond_with(result(json!([[]])))
        .expect(1)
        .mount(&server)
        .await;
    rpc("avContent", "getSourceList")
        .and(body_partial_json(json!({ "params": [{ "scheme": "extInput" }] })))
        .respond_with(result(json!([[{ "source": "extInput:hdmi" }]])))
        .expect(1)
        .mount(&server)
        .await;
    rpc("avContent", "getContentList")
        .respond_with(result(json!([[
            { "title": "HDMI 2", "uri": "extInput:hdmi?port=2" }
        ]])))
        .expect(1)
        .mount(&server)
        .await;
    rpc("avContent", "setPlayContent")
        .and(body_partial_json(json!({ "params": [{ "uri": "extInput:hdmi?port=2" }] })))
        .respond_with(result(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.select_source("HDMI 2").await.unwrap());
    // Served from the cached catalog
    assert!(!client.select_source("HDMI 4").await.unwrap());
}

// ── Status queries ──────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_tv_reads_as_off() {
    let reporter = Arc::new(RecordingReporter::default());
    let client = client_for(dead_host(), reporter.clone());

    assert_eq!(client.power_status().await, PowerStatus::Off);
    assert!(reporter.reports().is_empty());
}

#[tokio::test]
async fn power_query_error_reads_as_off() {
    let (server, client, reporter) = setup().await;

    rpc("system", "getPowerStatus")
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    assert_eq!(client.power_status().await, PowerStatus::Off);
    assert!(reporter.reports().is_empty());
}

#[tokio::test]
async fn volume_keeps_only_speaker_entry() {
    let (server, client, _) = setup().await;

    rpc("audio", "getVolumeInformation")
        .respond_with(result(json!([[
            { "target": "speaker", "volume": 40, "mute": false, "maxVolume": 100, "minVolume": 0 },
            { "target": "headphone", "volume": 10, "mute": false }
        ]])))
        .mount(&server)
        .await;

    let volume = client.volume_info().await.unwrap();
    assert_eq!(volume.target, "speaker");
    assert_eq!(volume.volume, Some(40));
    assert_eq!(volume.mute, Some(false));
    assert_eq!(volume.max_volume, Some(100));
}

#[tokio::test]
async fn volume_without_speaker_is_none() {
    let (server, client, _) = setup().await;

    rpc("audio", "getVolumeInformation")
        .respond_with(result(json!([[{ "target": "headphone", "volume": 10 }]])))
        .mount(&server)
        .await;

    assert_eq!(client.volume_info().await, None);
}

#[tokio::test]
async fn display_off_volume_error_is_not_reported() {
    let (server, client, reporter) = setup().await;

    rpc("audio", "getVolumeInformation")
        .respond_with(error(40005, "Display is Turned off"))
        .mount(&server)
        .await;

    assert_eq!(client.volume_info().await, None);
    assert!(reporter.reports().is_empty());
}

#[tokio::test]
async fn other_volume_errors_are_reported() {
    let (server, client, reporter) = setup().await;

    rpc("audio", "getVolumeInformation")
        .respond_with(error(40004, "Illegal State"))
        .mount(&server)
        .await;

    assert_eq!(client.volume_info().await, None);
    assert_eq!(
        reporter.reports(),
        vec![("sony/audio".to_string(), Some(40004), None)]
    );
}

#[tokio::test]
async fn playing_info_flattens_and_schedules() {
    let (server, client, _) = setup().await;

    rpc("avContent", "getPlayingContentInfo")
        .respond_with(result(json!([{
            "programTitle": "News at Ten",
            "title": "BBC One HD",
            "programMediaType": "tv",
            "dispNum": "101",
            "source": "tv:dvbt",
            "uri": "tv:dvbt?trip=9018.4164.4287",
            "durationSec": 900,
            "startDateTime": "2017-03-24T23:50:00+0100"
        }])))
        .mount(&server)
        .await;

    let info = client.playing_info().await;
    assert_eq!(info.program_title.as_deref(), Some("News at Ten"));
    assert_eq!(info.disp_num.as_deref(), Some("101"));
    assert_eq!(info.duration_sec, Some(900));

    let schedule = info.schedule().unwrap();
    assert_eq!(schedule.start_time, "23:50");
    assert_eq!(schedule.end_time, "00:05");
}

#[tokio::test]
async fn playing_info_on_external_input_has_unknown_program() {
    let (server, client, _) = setup().await;

    rpc("avContent", "getPlayingContentInfo")
        .respond_with(result(json!([{
            "title": "HDMI 1",
            "source": "extInput:hdmi",
            "uri": "extInput:hdmi?port=1"
        }])))
        .mount(&server)
        .await;

    let info = client.playing_info().await;
    assert_eq!(info.title.as_deref(), Some("HDMI 1"));
    assert_eq!(info.program_title, None);
    assert_eq!(info.duration_sec, None);
    assert_eq!(info.schedule(), None);
}

#[tokio::test]
async fn system_and_network_info() {
    let (server, client, _) = setup().await;

    rpc("system", "getSystemInformation")
        .respond_with(result(json!([{
            "product": "TV",
            "name": "BRAVIA",
            "model": "KD-55XE9005",
            "serial": "1234567",
            "macAddr": "fc:f1:52:00:11:22"
        }])))
        .mount(&server)
        .await;
    rpc("system", "getNetworkSettings")
        .respond_with(result(json!([[{
            "netif": "eth0",
            "hwAddr": "fc:f1:52:00:11:22",
            "ipAddrV4": "192.168.1.20",
            "gateway": "192.168.1.1"
        }]])))
        .mount(&server)
        .await;

    let system = client.system_info().await;
    assert_eq!(system.model.as_deref(), Some("KD-55XE9005"));
    assert_eq!(system.language, None);

    let network = client.network_info().await;
    assert_eq!(network.ip.as_deref(), Some("192.168.1.20"));
    assert_eq!(network.mac.as_deref(), Some("fc:f1:52:00:11:22"));
}

#[tokio::test]
async fn apps_and_inputs() {
    let (server, client, _) = setup().await;

    rpc("appControl", "getApplicationList")
        .respond_with(result(json!([[
            { "title": "Netflix", "uri": "com.sony.dtv.com.netflix.ninja", "icon": "http://tv/netflix.png" },
            { "title": "Broken" }
        ]])))
        .mount(&server)
        .await;
    rpc("avContent", "getCurrentExternalInputsStatus")
        .respond_with(result(json!([[
            { "uri": "extInput:hdmi?port=1", "title": "HDMI 1", "connection": true, "label": "Console" }
        ]])))
        .mount(&server)
        .await;

    let apps = client.app_list().await;
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].title, "Netflix");

    let inputs = client.external_input_status().await;
    assert_eq!(inputs[0].label.as_deref(), Some("Console"));
    assert_eq!(inputs[0].connection, Some(true));
}

#[tokio::test]
async fn volume_level_is_sent_as_percent_string() {
    let (server, client, _) = setup().await;

    rpc("audio", "setAudioVolume")
        .and(body_partial_json(
            json!({ "params": [{ "target": "speaker", "volume": "35" }] }),
        ))
        .respond_with(result(json!([0])))
        .expect(1)
        .mount(&server)
        .await;

    client.set_volume_level(0.349).await.unwrap();
}

#[tokio::test]
async fn turn_on_command_skips_active_tv() {
    let (server, client, _) = setup().await;

    rpc("system", "getPowerStatus")
        .respond_with(result(json!([{ "status": "active" }])))
        .mount(&server)
        .await;
    rpc("system", "setPowerStatus")
        .respond_with(result(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    client.turn_on_command().await.unwrap();
}

#[tokio::test]
async fn turn_on_command_falls_back_when_ircc_fails() {
    let (server, client, reporter) = setup().await;

    rpc("system", "getPowerStatus")
        .respond_with(result(json!([{ "status": "standby" }])))
        .mount(&server)
        .await;
    rpc("system", "getRemoteControllerInfo")
        .respond_with(result(json!([
            { "bundled": true, "type": "RM-J1100" },
            [{ "name": "TvPower", "value": "AAAAAQAAAAEAAAAVAw==" }]
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sony/IRCC"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    rpc("system", "setPowerStatus")
        .and(body_partial_json(json!({ "params": [{ "status": true }] })))
        .respond_with(result(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.turn_on_command().await.unwrap();
    assert_eq!(
        reporter.reports(),
        vec![("sony/IRCC".to_string(), None, Some(FailureKind::Other))]
    );
}

#[tokio::test]
async fn turn_on_without_mac_fails() {
    let (_server, client, _) = setup().await;
    assert!(matches!(client.turn_on().await, Err(BraviaError::MissingMac)));
}

// ── Pairing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn pairing_sends_pin_and_replays_cookie() {
    let server = MockServer::start().await;
    let client = BraviaClient::new(DeviceEndpoint::with_pairing(server.address().to_string()))
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/sony/accessControl"))
        .and(header("authorization", "Basic OjEyMzQ="))
        .and(body_partial_json(json!({
            "method": "actRegister",
            "params": [
                { "clientid": "bravia-test", "nickname": "Living room", "level": "private" },
                [{ "value": "yes", "function": "WOL" }]
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "auth=abc123; Path=/")
                .set_body_json(json!({ "result": [], "id": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    rpc("system", "getPowerStatus")
        .and(header("cookie", "auth=abc123"))
        .respond_with(result(json!([{ "status": "standby" }])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_paired());
    let pin = SecretString::from("1234".to_string());
    client
        .pair(Some(&pin), &ClientIdentity::new("bravia-test", "Living room"))
        .await
        .unwrap();
    assert!(client.is_paired());
    assert_eq!(client.power_status().await, PowerStatus::Standby);

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|request| !request.headers.contains_key("x-auth-psk")));
}

#[tokio::test]
async fn rejected_pairing_leaves_client_unpaired() {
    let (server, client, reporter) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/accessControl"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let outcome = client.pair(None, &ClientIdentity::generate("Living room")).await;
    assert!(matches!(
        outcome,
        Err(BraviaError::Transport { kind: FailureKind::Other, .. })
    ));
    assert!(!client.is_paired());
    assert_eq!(reporter.reports().len(), 1);
}
