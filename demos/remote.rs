//! Minimal command line remote
//!
//! ```text
//! BRAVIA_HOST=192.168.1.20 BRAVIA_PSK=sony cargo run --example remote -- status
//! cargo run --example remote -- command VolumeUp
//! cargo run --example remote -- source "HDMI 2"
//! BRAVIA_MAC=fc:f1:52:00:11:22 cargo run --example remote -- wake
//! ```

use bravia_psk::{BraviaClient, DeviceEndpoint};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let host = env::var("BRAVIA_HOST").map_err(|_| "BRAVIA_HOST is not set")?;
    let psk = env::var("BRAVIA_PSK").map_err(|_| "BRAVIA_PSK is not set")?;

    let mut endpoint = DeviceEndpoint::new(host, psk);
    if let Ok(mac) = env::var("BRAVIA_MAC") {
        endpoint = endpoint.with_mac(mac.parse()?);
    }
    let client = BraviaClient::new(endpoint)?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["status"] => {
            println!("Power:   {}", client.power_status().await);

            let system = client.system_info().await;
            println!(
                "Model:   {}",
                system.model.as_deref().unwrap_or("unknown")
            );

            if let Some(volume) = client.volume_info().await {
                println!(
                    "Volume:  {}{}",
                    volume.volume.map_or("?".to_string(), |v| v.to_string()),
                    if volume.mute == Some(true) { " (muted)" } else { "" }
                );
            }

            let playing = client.playing_info().await;
            let title = playing
                .program_title
                .as_deref()
                .or(playing.title.as_deref())
                .unwrap_or("unknown");
            match playing.schedule() {
                Some(schedule) => println!(
                    "Playing: {title} ({} - {})",
                    schedule.start_time, schedule.end_time
                ),
                None => println!("Playing: {title}"),
            }
        }
        ["commands"] => {
            for command in client.commands().await {
                println!("{:<24} {}", command.name, command.code);
            }
        }
        ["command", name] => {
            if !client.send_command(name).await? {
                eprintln!("The TV does not support {name}");
            }
        }
        ["sources"] => {
            for (title, uri) in client.source_catalog().await.iter() {
                println!("{title:<24} {uri}");
            }
        }
        ["source", title] => {
            if !client.select_source(title).await? {
                eprintln!("No source named {title}");
            }
        }
        ["apps"] => {
            for app in client.app_list().await {
                println!("{:<24} {}", app.title, app.uri);
            }
        }
        ["app", uri] => client.open_app(uri).await?,
        ["volume", level] => client.set_volume_level(level.parse::<f64>()? / 100.0).await?,
        ["wake"] => client.turn_on().await?,
        ["off"] => {
            client.turn_off().await?;
        }
        _ => {
            eprintln!("usage: remote [status|commands|command NAME|sources|source TITLE|apps|app URI|volume 0-100|wake|off]");
        }
    }

    Ok(())
}
