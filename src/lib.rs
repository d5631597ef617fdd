//! # dhcpwatch - A Passive DHCPv4 Sniffer
//!
//! dhcpwatch listens on a network interface, picks out BOOTP/DHCPv4 traffic on
//! UDP ports 67 and 68, and writes one logfmt line per packet to standard
//! output. It never transmits and keeps no lease state.
//!
//! ## Pipeline
//!
//! - Frame capture on an `AF_PACKET` socket ([`socket_manager`])
//! - Ethernet/IP/UDP slicing ([`network`])
//! - DHCP classification and option decoding ([`v4`])
//! - logfmt formatting ([`record`])
//! - The capture loop itself ([`sniffer`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use dhcpwatch::{CaptureConfig, PacketSocket, Sniffer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptureConfig::new("eth0".to_string());
//!     let mut source = PacketSocket::open(&config)?;
//!     let mut sniffer = Sniffer::new(std::io::stdout());
//!     let stats = sniffer
//!         .run(&mut source, async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await;
//!     eprintln!("{stats:?}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod record;
pub mod sniffer;
pub mod socket_manager;
pub mod v4;

pub use config::{Args, CaptureConfig};
pub use error::SnifferError;
pub use record::LogRecord;
pub use sniffer::{CapturedFrame, FrameSource, Sniffer, SnifferStats};
pub use socket_manager::PacketSocket;
