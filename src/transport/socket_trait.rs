//! Trait abstraction for datagram socket operations to enable testing

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Trait for unreliable datagram I/O
#[async_trait]
pub trait DatagramIO: Send {
    /// Send one datagram to `target`, returning the number of bytes written
    async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Wait for one datagram, returning its length and sender
    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

/// Wrapper around tokio::net::UdpSocket that implements DatagramIO
#[derive(Debug)]
pub struct TokioUdpSocket {
    socket: UdpSocket,
}

impl TokioUdpSocket {
    /// Bind a non-blocking UDP socket on `addr`
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[async_trait]
impl DatagramIO for TokioUdpSocket {
    async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(data, target).await
    }

    async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock datagram socket for testing
    ///
    /// Records every sent datagram. `recv_from` pops queued replies and
    /// otherwise never completes, so callers observe their own timeout.
    #[derive(Clone)]
    pub struct MockSocket {
        pub sent: Arc<Mutex<Vec<(Vec<u8>, SocketAddr)>>>,
        pub replies: Arc<Mutex<VecDeque<(Vec<u8>, SocketAddr)>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockSocket {
        pub fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                replies: Arc::new(Mutex::new(VecDeque::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn sent_packets(&self) -> Vec<Vec<u8>> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(data, _)| data.clone())
                .collect()
        }

        pub fn push_reply(&self, data: &[u8], source: SocketAddr) {
            self.replies
                .lock()
                .unwrap()
                .push_back((data.to_vec(), source));
        }

        pub fn set_send_error(&self, error: io::ErrorKind) {
            *self.send_error.lock().unwrap() = Some(error);
        }

        pub fn clear_send_error(&self) {
            *self.send_error.lock().unwrap() = None;
        }
    }

    #[async_trait]
    impl DatagramIO for MockSocket {
        async fn send_to(&mut self, data: &[u8], target: SocketAddr) -> io::Result<usize> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent.lock().unwrap().push((data.to_vec(), target));
            Ok(data.len())
        }

        async fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some((data, source)) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok((len, source))
                }
                None => std::future::pending().await,
            }
        }
    }
}
