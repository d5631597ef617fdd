//! Human-readable rendering of individual DHCP options.
//!
//! Each option code the sniffer understands maps to a [`Rendering`] strategy.
//! Codes outside the table, and data that does not have the shape the
//! strategy expects, are rendered as lowercase hex.

use super::message::{lossy_text, RawOption};
use std::net::Ipv4Addr;

/// How the data of a known option is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// One IPv4 address.
    Address,
    /// One or more IPv4 addresses.
    AddressList,
    /// One or more `(address, address)` pairs, e.g. policy filters and static routes.
    AddressPairs,
    /// Signed 32-bit seconds (time offset).
    SignedSeconds,
    /// Unsigned 32-bit seconds (lease and timer values).
    Seconds,
    U16,
    U16List,
    U8,
    Bool,
    Text,
    /// Option codes, as in the parameter request list.
    CodeList,
    Hex,
}

impl Rendering {
    /// Strategy for an option code.
    pub fn for_code(code: u8) -> Self {
        match code {
            1 | 16 | 28 | 32 | 54 | 118 => Rendering::Address,
            3..=11 | 41 | 42 | 44 | 45 | 48 | 49 | 65 | 68..=76 => Rendering::AddressList,
            21 | 33 => Rendering::AddressPairs,
            2 => Rendering::SignedSeconds,
            24 | 35 | 38 | 51 | 58 | 59 => Rendering::Seconds,
            13 | 22 | 26 | 57 => Rendering::U16,
            25 => Rendering::U16List,
            23 | 37 | 46 | 52 => Rendering::U8,
            19 | 20 | 27 | 29 | 30 | 31 | 34 | 36 | 39 => Rendering::Bool,
            14 | 15 | 17 | 18 | 40 | 47 | 56 | 60 | 64 | 66 | 67 => Rendering::Text,
            55 => Rendering::CodeList,
            _ => Rendering::Hex,
        }
    }

    /// Renders `data` with this strategy, or `None` when the data does not fit.
    fn render(self, data: &[u8]) -> Option<String> {
        match self {
            Rendering::Address => be_array::<4>(data).map(|b| Ipv4Addr::from(b).to_string()),
            Rendering::AddressList => {
                join_chunks(data, 4, |c| Ipv4Addr::new(c[0], c[1], c[2], c[3]).to_string())
            }
            Rendering::AddressPairs => join_chunks(data, 8, |c| {
                format!(
                    "{}/{}",
                    Ipv4Addr::new(c[0], c[1], c[2], c[3]),
                    Ipv4Addr::new(c[4], c[5], c[6], c[7])
                )
            }),
            Rendering::SignedSeconds => be_array::<4>(data).map(|b| i32::from_be_bytes(b).to_string()),
            Rendering::Seconds => be_array::<4>(data).map(|b| u32::from_be_bytes(b).to_string()),
            Rendering::U16 => be_array::<2>(data).map(|b| u16::from_be_bytes(b).to_string()),
            Rendering::U16List => join_chunks(data, 2, |c| u16::from_be_bytes([c[0], c[1]]).to_string()),
            Rendering::U8 => be_array::<1>(data).map(|[b]| b.to_string()),
            Rendering::Bool => be_array::<1>(data).map(|[b]| (b != 0).to_string()),
            Rendering::Text => Some(lossy_text(data)),
            Rendering::CodeList => join_chunks(data, 1, |c| c[0].to_string()),
            Rendering::Hex => Some(hex(data)),
        }
    }
}

/// Renders one option's value for the `opt_<code>` field.
pub fn render_option(opt: &RawOption) -> String {
    Rendering::for_code(opt.code)
        .render(&opt.data)
        .unwrap_or_else(|| hex(&opt.data))
}

pub fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

fn be_array<const N: usize>(data: &[u8]) -> Option<[u8; N]> {
    data.try_into().ok()
}

/// Joins fixed-size chunks with commas. Empty data or a ragged tail does not fit.
fn join_chunks(data: &[u8], size: usize, f: impl Fn(&[u8]) -> String) -> Option<String> {
    if data.is_empty() || data.len() % size != 0 {
        return None;
    }
    Some(data.chunks_exact(size).map(f).collect::<Vec<_>>().join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(code: u8, data: &[u8]) -> String {
        render_option(&RawOption {
            code,
            data: data.to_vec(),
        })
    }

    #[test]
    fn test_addresses() {
        assert_eq!(render(1, &[255, 255, 255, 0]), "255.255.255.0");
        assert_eq!(render(54, &[192, 168, 1, 1]), "192.168.1.1");
        assert_eq!(render(6, &[8, 8, 8, 8, 1, 1, 1, 1]), "8.8.8.8,1.1.1.1");
        assert_eq!(
            render(33, &[10, 0, 0, 0, 192, 168, 1, 1]),
            "10.0.0.0/192.168.1.1"
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(render(51, &[0, 1, 0x51, 0x80]), "86400");
        assert_eq!(render(2, &[0xff, 0xff, 0xf1, 0xf0]), "-3600");
        assert_eq!(render(57, &[0x05, 0xdc]), "1500");
        assert_eq!(render(25, &[0x02, 0x28, 0x05, 0xdc]), "552,1500");
        assert_eq!(render(23, &[64]), "64");
    }

    #[test]
    fn test_bool_and_text() {
        assert_eq!(render(19, &[1]), "true");
        assert_eq!(render(19, &[0]), "false");
        assert_eq!(render(15, b"example.org\0"), "example.org");
        assert_eq!(render(60, b"MSFT 5.0"), "MSFT 5.0");
    }

    #[test]
    fn test_parameter_request_list() {
        assert_eq!(render(55, &[1, 3, 6, 15, 119, 252]), "1,3,6,15,119,252");
    }

    #[test]
    fn test_unknown_code_is_hex() {
        assert_eq!(render(61, &[0x01, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]), "01aabbccddeeff");
        assert_eq!(render(224, &[0x00, 0x0f]), "000f");
    }

    #[test]
    fn test_shape_mismatch_falls_back_to_hex() {
        assert_eq!(render(1, &[255, 255, 0]), "ffff00");
        assert_eq!(render(3, &[10, 0, 0, 1, 10]), "0a0000010a");
        assert_eq!(render(51, &[0, 0, 1]), "000001");
        assert_eq!(render(19, &[1, 1]), "0101");
    }
}
