//! DHCPv4 protocol implementation
//!
//! This module contains the DHCPv4-specific pieces of the sniffer:
//! - Port-based classification of UDP traffic
//! - Decoding of the fixed header and option list
//! - Rendering of option values

pub mod filter;
pub mod message;
pub mod options;

pub use filter::{accepts_ports, classify, Verdict};
pub use message::{message_type_name, DecodeError, DhcpMessage, RawOption};
