//! Decoding of BOOTP/DHCPv4 payloads.
//!
//! The fixed header is read at the offsets laid down by RFC 2131, followed by
//! the magic cookie and the option TLVs. Options are kept as raw `(code, data)`
//! pairs in wire order; interpretation happens in [`super::options`] and in the
//! semantic helpers on [`DhcpMessage`].

use bytes::Buf as _;
use dhcproto::v4::MessageType;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Length of the fixed BOOTP header, excluding the magic cookie.
pub const FIXED_HEADER_LEN: usize = 236;

/// Offset of the first option, right after the magic cookie.
pub const OPTIONS_OFFSET: usize = FIXED_HEADER_LEN + 4;

pub const MAGIC_COOKIE: u32 = 0x6382_5363;

/// Maximum number of hardware address bytes the `chaddr` field can carry.
const CHADDR_LEN: usize = 16;

/// Option codes the decoder itself cares about.
pub mod code {
    pub const PAD: u8 = 0;
    pub const HOSTNAME: u8 = 12;
    pub const REQUESTED_IP: u8 = 50;
    pub const MESSAGE_TYPE: u8 = 53;
    pub const END: u8 = 255;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is {0} bytes, shorter than the {OPTIONS_OFFSET}-byte BOOTP header")]
    Truncated(usize),

    #[error("bad magic cookie {0:#010x}")]
    BadMagicCookie(u32),

    #[error("hardware address length {0} exceeds the {CHADDR_LEN}-byte chaddr field")]
    HardwareLength(u8),
}

/// A single option as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    pub code: u8,
    pub data: Vec<u8>,
}

/// Decoded view over a DHCPv4 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpMessage {
    pub op: u8,
    pub htype: u8,
    pub hops: u8,
    pub xid: u32,
    pub secs: u16,
    pub flags: u16,
    pub ciaddr: Ipv4Addr,
    pub yiaddr: Ipv4Addr,
    pub siaddr: Ipv4Addr,
    pub giaddr: Ipv4Addr,
    /// The first `hlen` bytes of `chaddr`.
    pub chaddr: Vec<u8>,
    /// Options in wire order. Codes may repeat.
    pub options: Vec<RawOption>,
}

impl DhcpMessage {
    /// Parses a UDP payload as a DHCPv4 message.
    ///
    /// Fails only when the fixed header is truncated, `hlen` does not fit in
    /// `chaddr`, or the magic cookie is wrong. A malformed option list is never an error: parsing stops at the
    /// first option that does not fit and the options read so far are kept.
    pub fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < OPTIONS_OFFSET {
            return Err(DecodeError::Truncated(payload.len()));
        }

        let mut buf = &payload[..OPTIONS_OFFSET];
        let op = buf.get_u8();
        let htype = buf.get_u8();
        let hlen = buf.get_u8();
        let hops = buf.get_u8();
        let xid = buf.get_u32();
        let secs = buf.get_u16();
        let flags = buf.get_u16();
        let ciaddr = Ipv4Addr::from(buf.get_u32());
        let yiaddr = Ipv4Addr::from(buf.get_u32());
        let siaddr = Ipv4Addr::from(buf.get_u32());
        let giaddr = Ipv4Addr::from(buf.get_u32());
        if usize::from(hlen) > CHADDR_LEN {
            return Err(DecodeError::HardwareLength(hlen));
        }
        let chaddr = buf[..usize::from(hlen)].to_vec();
        // sname (64) and file (128) are not surfaced.
        buf.advance(CHADDR_LEN + 64 + 128);

        let cookie = buf.get_u32();
        if cookie != MAGIC_COOKIE {
            return Err(DecodeError::BadMagicCookie(cookie));
        }

        Ok(Self {
            op,
            htype,
            hops,
            xid,
            secs,
            flags,
            ciaddr,
            yiaddr,
            siaddr,
            giaddr,
            chaddr,
            options: parse_options(&payload[OPTIONS_OFFSET..]),
        })
    }

    /// Data of the first option carrying `code`, in wire order.
    pub fn option(&self, code: u8) -> Option<&[u8]> {
        self.options_with(code).next()
    }

    /// Data of every option carrying `code`, in wire order.
    pub fn options_with(&self, code: u8) -> impl Iterator<Item = &[u8]> {
        self.options
            .iter()
            .filter(move |opt| opt.code == code)
            .map(|opt| opt.data.as_slice())
    }

    /// Option 53. Only single-byte occurrences count; the first one wins.
    pub fn message_type(&self) -> Option<MessageType> {
        self.options_with(code::MESSAGE_TYPE)
            .find_map(|data| match data {
                &[value] => Some(MessageType::from(value)),
                _ => None,
            })
    }

    /// Option 12 as text, `None` when absent or empty.
    pub fn hostname(&self) -> Option<String> {
        self.option(code::HOSTNAME)
            .map(lossy_text)
            .filter(|name| !name.is_empty())
    }

    /// Option 50. Only four-byte occurrences count; the first one wins.
    pub fn requested_ip(&self) -> Option<Ipv4Addr> {
        self.options_with(code::REQUESTED_IP)
            .find_map(|data| match data {
                &[a, b, c, d] => Some(Ipv4Addr::new(a, b, c, d)),
                _ => None,
            })
    }

    /// Every option other than the three surfaced as dedicated fields,
    /// skipping those with no data.
    pub fn generic_options(&self) -> impl Iterator<Item = &RawOption> {
        self.options.iter().filter(|opt| {
            !matches!(
                opt.code,
                code::MESSAGE_TYPE | code::HOSTNAME | code::REQUESTED_IP
            ) && !opt.data.is_empty()
        })
    }
}

/// Walks the option TLVs until End, the end of the payload, or the first
/// option whose length runs past the payload.
fn parse_options(mut buf: &[u8]) -> Vec<RawOption> {
    let mut options = Vec::new();
    while let Some((&code, rest)) = buf.split_first() {
        match code {
            code::END => break,
            code::PAD => buf = rest,
            _ => {
                let Some((&len, rest)) = rest.split_first() else {
                    tracing::trace!(code, "option length missing, stopping");
                    break;
                };
                let len = len as usize;
                if len > rest.len() {
                    tracing::trace!(code, len, remaining = rest.len(), "option overruns payload, stopping");
                    break;
                }
                let (data, rest) = rest.split_at(len);
                options.push(RawOption {
                    code,
                    data: data.to_vec(),
                });
                buf = rest;
            }
        }
    }
    options
}

/// Best-effort text: invalid UTF-8 is replaced, trailing NULs are dropped.
pub(crate) fn lossy_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_string()
}

/// Wire name of a message type, empty for anything outside the RFC 2131 set.
pub fn message_type_name(message_type: Option<MessageType>) -> &'static str {
    match message_type {
        Some(MessageType::Discover) => "DHCPDISCOVER",
        Some(MessageType::Offer) => "DHCPOFFER",
        Some(MessageType::Request) => "DHCPREQUEST",
        Some(MessageType::Decline) => "DHCPDECLINE",
        Some(MessageType::Ack) => "DHCPACK",
        Some(MessageType::Nak) => "DHCPNAK",
        Some(MessageType::Release) => "DHCPRELEASE",
        Some(MessageType::Inform) => "DHCPINFORM",
        _ => "",
    }
}
