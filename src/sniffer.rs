//! Capture loop
//!
//! This module ties the pipeline together:
//! - Pulling frames from a [`FrameSource`]
//! - Classifying and decoding them
//! - Writing one logfmt line per DHCP packet to the output sink

use crate::{
    error::SnifferError,
    network,
    record::LogRecord,
    v4::{self, Verdict},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{future::Future, io::Write, pin::pin};

/// A raw link-layer frame and the time it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub data: Bytes,
    pub timestamp: DateTime<Utc>,
}

impl CapturedFrame {
    pub fn new(data: Bytes, timestamp: DateTime<Utc>) -> Self {
        Self { data, timestamp }
    }
}

/// Anything that yields captured frames, one at a time.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Waits for the next frame. An error covers this read only; callers
    /// may keep reading afterwards.
    async fn next_frame(&mut self) -> Result<CapturedFrame, SnifferError>;
}

/// Counters kept for the lifetime of a [`Sniffer`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SnifferStats {
    pub frames: u64,
    pub records: u64,
    pub not_dhcp: u64,
    pub malformed: u64,
    pub read_errors: u64,
    pub write_errors: u64,
}

/// Turns frames into logfmt lines on `out`.
pub struct Sniffer<W> {
    out: W,
    stats: SnifferStats,
}

impl<W: Write> Sniffer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stats: SnifferStats::default(),
        }
    }

    pub fn stats(&self) -> SnifferStats {
        self.stats
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Runs one frame through link decoding, the DHCP filter and the
    /// formatter. `None` means the frame produced no record.
    pub fn process_frame(&mut self, frame: &CapturedFrame) -> Option<LogRecord> {
        self.stats.frames += 1;

        let Some(datagram) = network::decode_udp(&frame.data) else {
            self.stats.not_dhcp += 1;
            return None;
        };

        match v4::classify(&datagram) {
            Verdict::Dhcp(msg) => Some(LogRecord::from_observation(
                &frame.timestamp,
                &datagram,
                &msg,
            )),
            Verdict::NotDhcp => {
                self.stats.not_dhcp += 1;
                None
            }
            Verdict::Malformed(e) => {
                self.stats.malformed += 1;
                tracing::trace!(src = %datagram.source(), error = %e, "Skipping malformed DHCP payload");
                None
            }
        }
    }

    /// Writes the record as one line. Empty records write nothing.
    pub fn emit(&mut self, record: &LogRecord) {
        if record.is_empty() {
            return;
        }
        match writeln!(self.out, "{record}") {
            Ok(()) => self.stats.records += 1,
            Err(e) => {
                self.stats.write_errors += 1;
                tracing::warn!(error = %e, "write_error");
            }
        }
    }

    pub fn handle_frame(&mut self, frame: &CapturedFrame) {
        if let Some(record) = self.process_frame(frame) {
            self.emit(&record);
        }
    }

    /// Reads frames until `shutdown` resolves.
    ///
    /// `shutdown` is checked before every read and raced against it, so a
    /// blocked read does not delay the stop. Read errors are logged and the
    /// loop carries on with the next read.
    pub async fn run<S, F>(&mut self, source: &mut S, shutdown: F) -> SnifferStats
    where
        S: FrameSource,
        F: Future<Output = ()>,
    {
        let mut shutdown = pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping capture");
                    break;
                }
                result = source.next_frame() => match result {
                    Ok(frame) => self.handle_frame(&frame),
                    Err(e) => {
                        self.stats.read_errors += 1;
                        tracing::warn!(error = %e, "read_error");
                    }
                },
            }
        }
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherparse::PacketBuilder;

    fn frame(src_port: u16, dst_port: u16, payload: &[u8]) -> CapturedFrame {
        let builder = PacketBuilder::ethernet2([0xaa; 6], [0xff; 6])
            .ipv4([0, 0, 0, 0], [255, 255, 255, 255], 64)
            .udp(src_port, dst_port);
        let mut data = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut data, payload).unwrap();
        CapturedFrame::new(Bytes::from(data), Utc::now())
    }

    #[test]
    fn test_non_dhcp_ports_are_counted_and_skipped() {
        let mut sniffer = Sniffer::new(Vec::new());
        sniffer.handle_frame(&frame(53, 53, &[0u8; 300]));
        sniffer.handle_frame(&frame(67, 80, &[0u8; 300]));

        let stats = sniffer.stats();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.not_dhcp, 2);
        assert_eq!(stats.records, 0);
        assert!(sniffer.into_inner().is_empty());
    }

    #[test]
    fn test_malformed_payload_is_counted_and_skipped() {
        let mut sniffer = Sniffer::new(Vec::new());
        // Right ports, but too short and with no magic cookie.
        sniffer.handle_frame(&frame(68, 67, &[1, 1, 6, 0]));
        sniffer.handle_frame(&frame(68, 67, &[0u8; 300]));

        let stats = sniffer.stats();
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.records, 0);
        assert!(sniffer.into_inner().is_empty());
    }

    #[test]
    fn test_non_ethernet_garbage_is_skipped() {
        let mut sniffer = Sniffer::new(Vec::new());
        sniffer.handle_frame(&CapturedFrame::new(
            Bytes::from_static(&[0xde, 0xad]),
            Utc::now(),
        ));
        assert_eq!(sniffer.stats().not_dhcp, 1);
    }
}
