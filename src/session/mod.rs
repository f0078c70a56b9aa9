//! # Session Module
//!
//! Drives the car: handshake, fixed-rate command streaming, and a safe
//! idle on shutdown.
//!
//! ## State Machine
//!
//! ```text
//! Unestablished --handshake--> Handshaking --armed--> Streaming
//!                                                         |
//!                                                     shutdown
//!                                                         v
//!                                      Closed <--close-- Idle
//! ```
//!
//! - **Handshake**: send `MAKO_CONNECT`, wait up to 2 s for any reply (its
//!   content is ignored, and silence is fine), then send the idle packet
//!   twice to arm the firmware.
//! - **Streaming**: every tick read the sticks, encode, send, and wait
//!   briefly for a reply that is only logged.
//! - **Shutdown**: send one idle packet, then release the socket. Repeated
//!   shutdown requests are no-ops. `Idle` and `Closed` are terminal: nothing
//!   is sent from them.
//!
//! Every send is fire-and-forget. Failures are logged and counted but never
//! retried; the next tick simply sends fresh state.

use std::future::Future;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::controller::AxisSource;
use crate::error::{BridgeError, Result};
use crate::mako::encoder::{Command, CommandEncoder};
use crate::mako::protocol::{PacketHeader, CONNECT_TOKEN};
use crate::transport::socket_trait::{DatagramIO, TokioUdpSocket};
use crate::transport::{Datagram, VehicleLink};

/// Number of idle packets that arm the firmware after `MAKO_CONNECT`
pub const ARMING_PACKET_COUNT: usize = 2;

/// Connection lifecycle, owned by [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing sent yet
    Unestablished,
    /// `MAKO_CONNECT` sent, arming not finished
    Handshaking,
    /// Armed; drive commands go out every tick
    Streaming,
    /// Idle command sent after a stop request
    Idle,
    /// Socket released
    Closed,
}

/// Running counters for status logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,
    pub packets_sent: u64,
    pub send_failures: u64,
    pub replies_received: u64,
    pub input_failures: u64,
}

/// Outcome of one streaming tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Command that was sent
    pub command: Command,
    /// Reply observed within the reply window, if any
    pub reply: Option<Datagram>,
}

/// Owns the link, the input source and the connection state.
pub struct Session<I: AxisSource, S: DatagramIO = TokioUdpSocket> {
    link: VehicleLink<S>,
    input: I,
    encoder: CommandEncoder,
    timing: SessionConfig,
    state: ConnectionState,
    stats: SessionStats,
}

impl<I: AxisSource, S: DatagramIO> std::fmt::Debug for Session<I, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("link", &self.link)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<I: AxisSource, S: DatagramIO> Session<I, S> {
    /// Create a session in the `Unestablished` state
    pub fn new(
        link: VehicleLink<S>,
        input: I,
        encoder: CommandEncoder,
        timing: SessionConfig,
    ) -> Self {
        Self {
            link,
            input,
            encoder,
            timing,
            state: ConnectionState::Unestablished,
            stats: SessionStats::default(),
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Counters so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Run the handshake and enter `Streaming`
    ///
    /// Sends `MAKO_CONNECT` once, waits up to the handshake timeout for any
    /// reply, then sends the idle packet [`ARMING_PACKET_COUNT`] times. A
    /// missing reply or a failed send is logged and the sequence carries on.
    ///
    /// Returns the reply, if one arrived. Does nothing outside
    /// `Unestablished`.
    pub async fn handshake(&mut self) -> Option<Datagram> {
        if self.state != ConnectionState::Unestablished {
            warn!("Handshake skipped in state {:?}", self.state);
            return None;
        }
        self.transition(ConnectionState::Handshaking);

        if let Err(e) = self.send_packet(CONNECT_TOKEN).await {
            warn!("MAKO_CONNECT not sent: {}", e);
        } else {
            info!("Sent MAKO_CONNECT to {}", self.link.remote());
        }

        let reply = self.link.try_receive(self.timing.handshake_timeout()).await;
        match &reply {
            Some(datagram) => info!(
                "Received handshake response from {}: {}",
                datagram.source,
                datagram.hex()
            ),
            None => info!(
                "No response to MAKO_CONNECT within {:?}; proceeding",
                self.timing.handshake_timeout()
            ),
        }
        self.observe(reply.as_ref());

        let arming = Command::IDLE.to_packet(PacketHeader::CONTROL);
        for _ in 0..ARMING_PACKET_COUNT {
            if let Err(e) = self.send_packet(&arming).await {
                warn!("Arming packet not sent: {}", e);
            }
        }
        info!("Sent arming sequence");

        self.transition(ConnectionState::Streaming);
        reply
    }

    /// Run one read-encode-send-receive cycle
    ///
    /// # Errors
    ///
    /// - `NotStreaming`: the handshake has not run or the session was shut
    ///   down; nothing is sent
    /// - Input errors: the idle packet is sent in place of a command and the
    ///   input error is returned
    /// - `Transport`: the command could not be sent; no reply is awaited
    pub async fn tick(&mut self) -> Result<TickReport> {
        if self.state != ConnectionState::Streaming {
            return Err(BridgeError::NotStreaming(self.state));
        }
        self.stats.ticks += 1;

        let reading = match self.input.read() {
            Ok(reading) => reading,
            Err(e) => {
                self.stats.input_failures += 1;
                warn!("Input unavailable ({}); sending idle command", e);
                let idle = Command::IDLE.to_packet(PacketHeader::CONTROL);
                if let Err(send_err) = self.send_packet(&idle).await {
                    warn!("Idle command not sent: {}", send_err);
                }
                return Err(e);
            }
        };

        let command = self.encoder.encode_reading(&reading);
        self.send_packet(&command.to_packet(PacketHeader::STREAM)).await?;

        let reply = self.link.try_receive(self.timing.reply_timeout()).await;
        if let Some(datagram) = &reply {
            debug!("Received packet from {}: {}", datagram.source, datagram.hex());
        }
        self.observe(reply.as_ref());

        Ok(TickReport { command, reply })
    }

    /// Handshake if needed, then stream until `shutdown` completes
    ///
    /// Cancellation is checked at the top of every cycle, so it takes effect
    /// within one tick. A stop during the handshake abandons the rest of it.
    /// Once anything has been sent, the idle packet is sent before returning.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if self.state == ConnectionState::Unestablished {
            let cancelled = tokio::select! {
                biased;

                _ = &mut shutdown => true,
                _ = self.handshake() => false,
            };
            if cancelled {
                info!("Shutdown requested during handshake");
            }
        }

        if self.state == ConnectionState::Streaming {
            let mut ticker = interval(self.timing.tick_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("Streaming commands every {:?}", self.timing.tick_interval());

            loop {
                tokio::select! {
                    biased;

                    _ = &mut shutdown => {
                        info!("Shutdown requested");
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                if let Err(e) = self.tick().await {
                    debug!("Tick {} failed: {}", self.stats.ticks, e);
                }
                self.log_status_if_due();
            }
        }

        self.shutdown().await;
    }

    /// Send the idle packet once and enter `Idle`
    ///
    /// Returns `true` if this call attempted the idle send. Later calls, and
    /// calls before any packet went out, return `false`.
    pub async fn shutdown(&mut self) -> bool {
        match self.state {
            ConnectionState::Idle | ConnectionState::Closed => false,
            ConnectionState::Unestablished => {
                self.transition(ConnectionState::Idle);
                false
            }
            ConnectionState::Handshaking | ConnectionState::Streaming => {
                let idle = Command::IDLE.to_packet(PacketHeader::CONTROL);
                match self.send_packet(&idle).await {
                    Ok(()) => info!("Sent idle command to reset the car"),
                    Err(e) => warn!("Idle command not sent: {}", e),
                }
                self.transition(ConnectionState::Idle);
                true
            }
        }
    }

    /// Shut down if still running, release the socket and return the counters
    pub async fn close(mut self) -> SessionStats {
        self.shutdown().await;
        self.transition(ConnectionState::Closed);
        info!(
            "Session closed after {} ticks: {} packets sent, {} replies",
            self.stats.ticks, self.stats.packets_sent, self.stats.replies_received
        );
        self.link.close();
        self.stats
    }

    /// Log the counters every `status_interval_ticks` ticks
    ///
    /// Failed ticks count, so the line is never skipped. Returns `true` if it
    /// logged.
    pub fn log_status_if_due(&self) -> bool {
        let ticks = self.stats.ticks;
        if ticks == 0 || ticks % self.timing.status_interval_ticks.max(1) != 0 {
            return false;
        }
        info!(
            "Sent {} packets ({} failed), {} replies, {} input failures",
            self.stats.packets_sent,
            self.stats.send_failures,
            self.stats.replies_received,
            self.stats.input_failures
        );
        true
    }

    async fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        match self.link.send(packet).await {
            Ok(()) => {
                self.stats.packets_sent += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.send_failures += 1;
                Err(e)
            }
        }
    }

    fn observe(&mut self, reply: Option<&Datagram>) {
        if reply.is_some() {
            self.stats.replies_received += 1;
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        debug!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
