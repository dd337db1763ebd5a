use crate::error::Result;
use crate::types::MacAddress;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::UdpSocket;

/// Port magic packets are sent to
pub const WOL_PORT: u16 = 9;

const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

/// Build a Wake-on-LAN magic packet: six `0xFF` bytes then the address 16 times
pub fn magic_packet(mac: &MacAddress) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFF; MAGIC_PACKET_LEN];
    let octets = mac.octets();
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&octets);
    }
    packet
}

/// Broadcast a magic packet on the local network
pub async fn wake(mac: &MacAddress) -> Result<()> {
    let target = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, WOL_PORT));
    send_magic_packet(mac, target).await
}

pub(crate) async fn send_magic_packet(mac: &MacAddress, target: SocketAddr) -> Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    socket.send_to(&magic_packet(mac), target).await?;
    tracing::info!(%mac, %target, "Sent Wake-on-LAN packet");
    Ok(())
}
