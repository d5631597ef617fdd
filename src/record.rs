//! logfmt records.
//!
//! One [`LogRecord`] is produced per observed DHCP packet. Field order is fixed.
//! Values containing a space or a double quote are wrapped in double quotes
//! with no escaping; consumers parse exactly this format.

use crate::network::UdpDatagram;
use crate::v4::{message_type_name, options::render_option, DhcpMessage};
use chrono::{DateTime, Utc};
use std::fmt;

/// Ordered `key=value` pairs. Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, dropping it when `value` is empty.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if !value.is_empty() {
            self.fields.push((key.into(), value));
        }
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds the record for one DHCP packet.
    pub fn from_observation(
        timestamp: &DateTime<Utc>,
        datagram: &UdpDatagram<'_>,
        msg: &DhcpMessage,
    ) -> Self {
        let mut record = Self::new();
        record
            .push("ts", format_timestamp(timestamp))
            .push("msg", message_type_name(msg.message_type()))
            .push("src", datagram.source().to_string())
            .push("dst", datagram.destination().to_string())
            .push("mac", format_mac(&msg.chaddr))
            .push("xid", format!("0x{:08x}", msg.xid))
            .push("ciaddr", msg.ciaddr.to_string())
            .push("yiaddr", msg.yiaddr.to_string());

        if let Some(ip) = msg.requested_ip() {
            record.push("requested_ip", ip.to_string());
        }
        if let Some(host) = msg.hostname() {
            record.push("hostname", host);
        }
        for opt in msg.generic_options() {
            record.push(format!("opt_{}", opt.code), render_option(opt));
        }
        record
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if needs_quotes(value) {
                write!(f, "{key}=\"{value}\"")?;
            } else {
                write!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

fn needs_quotes(value: &str) -> bool {
    value.contains(|c: char| c == ' ' || c == '"')
}

/// RFC 3339 in UTC with up to nine fractional digits, trailing zeros trimmed
/// and the fraction dropped entirely when it is zero.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = ts.timestamp_subsec_nanos();
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

/// Colon-separated lowercase hex.
pub fn format_mac(addr: &[u8]) -> String {
    addr.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
