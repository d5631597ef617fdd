//! Raw frame capture on a Linux `AF_PACKET` socket.

use crate::{
    config::CaptureConfig,
    error::SnifferError,
    sniffer::{CapturedFrame, FrameSource},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use socket2::Socket;
use std::io::{self, Read as _};
use thiserror::Error;
use tokio::io::unix::AsyncFd;

/// Defines all possible errors for capture socket operations.
#[derive(Error, Debug)]
pub enum SocketError {
    #[error("Failed to create a packet socket")]
    CreateSocket(#[source] io::Error),

    #[error("Interface '{interface}' not found")]
    InterfaceIndex {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to bind packet socket to interface '{interface}'")]
    BindToDevice {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to set the socket receive buffer size")]
    SetRecvBuffer(#[source] io::Error),

    #[error("Failed to set socket to non-blocking mode")]
    SetNonBlocking(#[source] io::Error),

    #[error("Failed to register socket with the runtime")]
    Register(#[source] io::Error),

    #[error("Failed to read from packet socket: {0}")]
    Read(#[source] io::Error),

    #[allow(dead_code)]
    #[error("Packet capture is not implemented on this platform")]
    NotImplemented,
}

/// A packet socket bound to one interface, receiving every ethertype.
pub struct PacketSocket {
    fd: AsyncFd<Socket>,
    buf: Vec<u8>,
    interface: String,
}

impl PacketSocket {
    /// Opens a raw packet socket on the configured interface.
    ///
    /// The order of operations matters:
    /// 1. Resolves the interface index.
    /// 2. Creates an `AF_PACKET`/`SOCK_RAW` socket with protocol 0, so it
    ///    receives nothing yet.
    /// 3. Sizes the kernel receive buffer and switches on kernel timestamps.
    /// 4. Binds it to the interface index for `ETH_P_ALL`, which starts the
    ///    capture on that device only.
    /// 5. Switches to non-blocking mode and registers it with tokio.
    #[cfg(target_os = "linux")]
    pub fn open(config: &CaptureConfig) -> Result<Self, SnifferError> {
        use socket2::{Domain, Type};
        use std::{ffi::CString, os::fd::AsRawFd};

        config.validate()?;

        let ifname = CString::new(config.interface.as_str()).map_err(|e| {
            SocketError::InterfaceIndex {
                interface: config.interface.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, e),
            }
        })?;
        // Safe: `ifname` is a valid NUL-terminated string for the duration of the call.
        let ifindex = unsafe { libc::if_nametoindex(ifname.as_ptr()) };
        if ifindex == 0 {
            return Err(SocketError::InterfaceIndex {
                interface: config.interface.clone(),
                source: io::Error::last_os_error(),
            }
            .into());
        }

        let socket =
            Socket::new(Domain::PACKET, Type::RAW, None).map_err(SocketError::CreateSocket)?;

        socket
            .set_recv_buffer_size(config.recv_buffer_size)
            .map_err(SocketError::SetRecvBuffer)?;

        // The first query turns kernel timestamping on. It reports ENOENT
        // until a frame has been read.
        let _ = kernel_timestamp(&socket);

        // Bind to the device with a `sockaddr_ll`. This is a raw syscall; the
        // address struct is fully initialised and its size is passed alongside.
        let addr = bind_address(ifindex);
        let ret = unsafe {
            libc::bind(
                socket.as_raw_fd(),
                &addr as *const libc::sockaddr_ll as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(SocketError::BindToDevice {
                interface: config.interface.clone(),
                source: io::Error::last_os_error(),
            }
            .into());
        }

        socket
            .set_nonblocking(true)
            .map_err(SocketError::SetNonBlocking)?;
        // Safe: the `Socket` owns its descriptor and is moved into the
        // `AsyncFd`, which keeps it open until it is dropped.
        let fd = unsafe { AsyncFd::register(socket) }
            .map_err(|e| SocketError::Register(e.into()))?;

        tracing::debug!(
            interface = %config.interface,
            ifindex,
            snaplen = config.snaplen,
            "Packet socket bound"
        );

        Ok(Self {
            fd,
            buf: vec![0; config.snaplen],
            interface: config.interface.clone(),
        })
    }

    /// Fallback for systems without `AF_PACKET`.
    #[cfg(not(target_os = "linux"))]
    pub fn open(_config: &CaptureConfig) -> Result<Self, SnifferError> {
        Err(SocketError::NotImplemented.into())
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl FrameSource for PacketSocket {
    async fn next_frame(&mut self) -> Result<CapturedFrame, SnifferError> {
        loop {
            let mut guard = self.fd.readable().await.map_err(SocketError::Read)?;
            let buf = &mut self.buf;
            match guard.try_io(|inner| {
                let mut socket: &Socket = inner.get_ref();
                let len = socket.read(buf)?;
                Ok((len, capture_time(socket)))
            }) {
                Ok(result) => {
                    let (len, timestamp) = result.map_err(SocketError::Read)?;
                    return Ok(CapturedFrame::new(
                        Bytes::copy_from_slice(&self.buf[..len]),
                        timestamp,
                    ));
                }
                // Spurious readiness; wait again.
                Err(_would_block) => continue,
            }
        }
    }
}

/// `SIOCGSTAMPNS`: kernel receive time of the last frame read.
#[cfg(target_os = "linux")]
const SIOCGSTAMPNS: u32 = 0x8907;

/// Link-layer address that attaches the socket to `ifindex` for every ethertype.
#[cfg(target_os = "linux")]
fn bind_address(ifindex: u32) -> libc::sockaddr_ll {
    let mut addr: libc::sockaddr_ll = unsafe { std::mem::zeroed() };
    addr.sll_family = libc::AF_PACKET as libc::c_ushort;
    addr.sll_protocol = (libc::ETH_P_ALL as u16).to_be();
    addr.sll_ifindex = ifindex as libc::c_int;
    addr
}

#[cfg(target_os = "linux")]
fn kernel_timestamp(socket: &Socket) -> io::Result<libc::timespec> {
    use std::os::fd::AsRawFd;

    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    // Safe: `ts` is a live `timespec`, the layout the ioctl writes into.
    let ret = unsafe {
        libc::ioctl(
            socket.as_raw_fd(),
            SIOCGSTAMPNS as _,
            &mut ts as *mut libc::timespec,
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ts)
}

/// Capture time of the frame just read: the kernel timestamp when one is
/// available, otherwise the current wall-clock time.
#[cfg(target_os = "linux")]
fn capture_time(socket: &Socket) -> DateTime<Utc> {
    match kernel_timestamp(socket) {
        Ok(ts) => timestamp_from_timespec(&ts).unwrap_or_else(Utc::now),
        Err(e) => {
            tracing::trace!(error = %e, "No kernel timestamp, using wall clock");
            Utc::now()
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn capture_time(_socket: &Socket) -> DateTime<Utc> {
    Utc::now()
}

#[cfg(target_os = "linux")]
fn timestamp_from_timespec(ts: &libc::timespec) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(ts.tv_nsec).ok()?;
    DateTime::from_timestamp(i64::from(ts.tv_sec), nanos)
}
