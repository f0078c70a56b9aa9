//! # Transport Module
//!
//! Owns the UDP channel to the car.
//!
//! This module handles:
//! - Binding the local socket once at startup
//! - Sending one packet per datagram to the fixed vehicle address
//! - Waiting a bounded time for inbound datagrams
//!
//! Delivery is best-effort. A send that the OS accepts may still be lost,
//! and nothing here acknowledges, orders, or retransmits packets. Only
//! local send failures are reported, as [`BridgeError::Transport`].

pub mod socket_trait;

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{BridgeError, Result};
use crate::mako::protocol::format_hex;
use socket_trait::{DatagramIO, TokioUdpSocket};

/// Receive buffer size for inbound datagrams
pub const RECV_BUFFER_SIZE: usize = 1024;

/// An inbound datagram and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub source: SocketAddr,
}

impl Datagram {
    /// Payload as lowercase spaced hex
    #[must_use]
    pub fn hex(&self) -> String {
        format_hex(&self.payload)
    }
}

/// UDP link to the vehicle
///
/// Opened once per process; dropping or [`close`](VehicleLink::close)-ing it
/// releases the socket.
pub struct VehicleLink<S: DatagramIO = TokioUdpSocket> {
    socket: S,
    remote: SocketAddr,
    buffer: Vec<u8>,
}

impl<S: DatagramIO> std::fmt::Debug for VehicleLink<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleLink")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl VehicleLink<TokioUdpSocket> {
    /// Bind the local UDP port and target the vehicle
    ///
    /// # Arguments
    ///
    /// * `local_port` - Port to bind on all interfaces (0 for ephemeral)
    /// * `remote` - Vehicle address and port
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the port cannot be bound
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mako_bridge::transport::VehicleLink;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let link = VehicleLink::open(8234, "192.168.0.1:8234".parse()?).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn open(local_port: u16, remote: SocketAddr) -> Result<Self> {
        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, local_port));
        let socket = TokioUdpSocket::bind(bind_addr)
            .await
            .map_err(|e| BridgeError::Transport(format!("Failed to bind {}: {}", bind_addr, e)))?;

        match socket.local_addr() {
            Ok(local) => info!("UDP socket bound on {}, vehicle at {}", local, remote),
            Err(_) => info!("UDP socket bound, vehicle at {}", remote),
        }

        Ok(Self::with_socket(socket, remote))
    }
}

impl<S: DatagramIO> VehicleLink<S> {
    /// Wrap an already bound socket
    pub fn with_socket(socket: S, remote: SocketAddr) -> Self {
        Self {
            socket,
            remote,
            buffer: vec![0u8; RECV_BUFFER_SIZE],
        }
    }

    /// Vehicle address packets are sent to
    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Send one packet to the vehicle
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the OS rejects the datagram or writes only
    /// part of it. Acceptance does not imply delivery.
    pub async fn send(&mut self, packet: &[u8]) -> Result<()> {
        let written = self
            .socket
            .send_to(packet, self.remote)
            .await
            .map_err(|e| {
                BridgeError::Transport(format!("Failed to send to {}: {}", self.remote, e))
            })?;

        if written != packet.len() {
            return Err(BridgeError::Transport(format!(
                "Short send to {}: {} of {} bytes",
                self.remote,
                written,
                packet.len()
            )));
        }

        debug!("Sent packet: {}", format_hex(packet));
        Ok(())
    }

    /// Wait up to `wait` for one inbound datagram
    ///
    /// Returns `None` when the wait expires. Receive errors are logged and
    /// also yield `None`.
    pub async fn try_receive(&mut self, wait: Duration) -> Option<Datagram> {
        match tokio::time::timeout(wait, self.socket.recv_from(&mut self.buffer)).await {
            Ok(Ok((len, source))) => Some(Datagram {
                payload: self.buffer[..len].to_vec(),
                source,
            }),
            Ok(Err(e)) => {
                warn!("Receive failed: {}", e);
                None
            }
            Err(_) => None,
        }
    }

    /// Release the socket
    pub fn close(self) {
        info!("Closing UDP link to {}", self.remote);
    }
}
