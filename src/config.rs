use crate::error::SnifferError;
use clap::Parser;

/// Frames larger than this are truncated by the kernel on read.
pub const DEFAULT_SNAPLEN: usize = 65536;

/// Sixteen 1 MiB blocks' worth of kernel buffering.
pub const DEFAULT_RECV_BUFFER: usize = 16 << 20;

/// Linux `IFNAMSIZ`, including the trailing NUL.
const IFNAMSIZ: usize = 16;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The network interface to capture on (e.g., 'eth0', 'enp4s0')
    #[arg(short, long, default_value = "enp4s0")]
    pub interface: String,

    /// Largest frame, in bytes, read from the capture socket
    #[arg(long, default_value_t = DEFAULT_SNAPLEN)]
    pub snaplen: usize,

    /// Kernel receive buffer size for the capture socket, in bytes
    #[arg(long, default_value_t = DEFAULT_RECV_BUFFER)]
    pub recv_buffer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub interface: String,
    pub snaplen: usize,
    pub recv_buffer_size: usize,
}

impl CaptureConfig {
    pub fn new(interface: String) -> Self {
        Self {
            interface,
            snaplen: DEFAULT_SNAPLEN,
            recv_buffer_size: DEFAULT_RECV_BUFFER,
        }
    }

    /// Checks the values the capture socket relies on.
    pub fn validate(&self) -> Result<(), SnifferError> {
        let name = &self.interface;
        if name.is_empty() || name.len() >= IFNAMSIZ {
            return Err(SnifferError::Config(format!(
                "interface name '{name}' must be 1 to {} bytes",
                IFNAMSIZ - 1
            )));
        }
        if name.contains(|c: char| c == '\0' || c == '/' || c.is_whitespace()) {
            return Err(SnifferError::Config(format!(
                "interface name '{}' contains an invalid character",
                name.escape_debug()
            )));
        }
        if self.snaplen == 0 {
            return Err(SnifferError::Config("snaplen must be positive".to_string()));
        }
        Ok(())
    }
}

impl From<Args> for CaptureConfig {
    fn from(args: Args) -> Self {
        Self {
            interface: args.interface,
            snaplen: args.snaplen,
            recv_buffer_size: args.recv_buffer,
        }
    }
}
