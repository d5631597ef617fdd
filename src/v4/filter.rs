//! Classification of UDP datagrams as DHCPv4 traffic.

use super::message::{DecodeError, DhcpMessage};
use crate::network::UdpDatagram;

pub const DHCP_SERVER_PORT: u16 = 67;
pub const DHCP_CLIENT_PORT: u16 = 68;

/// Outcome of running a datagram through the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Dhcp(DhcpMessage),
    /// Not on the BOOTP port pair.
    NotDhcp,
    /// On the BOOTP ports but not a well-formed DHCP message.
    Malformed(DecodeError),
}

fn is_bootp_port(port: u16) -> bool {
    port == DHCP_SERVER_PORT || port == DHCP_CLIENT_PORT
}

/// True when both ports belong to the BOOTP pair, in either direction.
pub fn accepts_ports(src_port: u16, dst_port: u16) -> bool {
    is_bootp_port(src_port) && is_bootp_port(dst_port)
}

/// Runs the port check, then hands the payload to the decoder.
pub fn classify(datagram: &UdpDatagram<'_>) -> Verdict {
    if !accepts_ports(datagram.src_port, datagram.dst_port) {
        return Verdict::NotDhcp;
    }
    match DhcpMessage::parse(datagram.payload) {
        Ok(msg) => Verdict::Dhcp(msg),
        Err(e) => Verdict::Malformed(e),
    }
}
