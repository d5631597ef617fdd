//! Link and transport layer decoding.
//!
//! Frames are sliced with `etherparse` (Ethernet II, optional VLAN tags,
//! IPv4/IPv6, UDP). Anything that does not end in a UDP datagram is dropped
//! here, before the DHCP filter sees it.

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use std::fmt;
use std::net::IpAddr;

/// A UDP datagram located inside a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpDatagram<'a> {
    pub src_ip: IpAddr,
    pub dst_ip: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

impl<'a> UdpDatagram<'a> {
    pub fn source(&self) -> Endpoint {
        Endpoint(self.src_ip, self.src_port)
    }

    pub fn destination(&self) -> Endpoint {
        Endpoint(self.dst_ip, self.dst_port)
    }
}

/// `<ip>:<port>`. IPv6 addresses are written without brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint(pub IpAddr, pub u16);

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

/// Slices an Ethernet frame down to its UDP payload.
///
/// Returns `None` for frames that fail to parse, carry no IP layer, or carry a
/// transport other than UDP.
pub fn decode_udp(frame: &[u8]) -> Option<UdpDatagram<'_>> {
    let sliced = match SlicedPacket::from_ethernet(frame) {
        Ok(s) => s,
        Err(e) => {
            tracing::trace!("Failed to slice frame: {}", e);
            return None;
        }
    };

    let (src_ip, dst_ip) = match &sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => {
            let header = ipv4.header();
            (
                IpAddr::from(header.source_addr()),
                IpAddr::from(header.destination_addr()),
            )
        }
        Some(NetSlice::Ipv6(ipv6)) => {
            let header = ipv6.header();
            (
                IpAddr::from(header.source_addr()),
                IpAddr::from(header.destination_addr()),
            )
        }
        _ => return None,
    };

    match sliced.transport {
        Some(TransportSlice::Udp(udp)) => Some(UdpDatagram {
            src_ip,
            dst_ip,
            src_port: udp.source_port(),
            dst_port: udp.destination_port(),
            payload: udp.payload(),
        }),
        _ => None,
    }
}
