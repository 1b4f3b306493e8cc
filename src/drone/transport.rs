//! Trait abstraction for datagram transport to enable testing

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Trait for datagram I/O operations
#[async_trait]
pub trait DatagramIO: Send {
    /// Send one datagram
    async fn send(&mut self, data: &[u8]) -> io::Result<usize>;
}

/// Wrapper around a connected tokio::net::UdpSocket that implements DatagramIO
pub struct TokioUdpSocket {
    socket: UdpSocket,
}

impl TokioUdpSocket {
    /// Binds an ephemeral local port and connects it to `remote`.
    pub async fn connect(remote: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = if remote.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;
        Ok(Self { socket })
    }
}

#[async_trait]
impl DatagramIO for TokioUdpSocket {
    async fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        self.socket.send(data).await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock datagram transport for testing
    #[derive(Clone)]
    pub struct MockDatagram {
        pub sent: Arc<Mutex<Vec<Vec<u8>>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockDatagram {
        pub fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        /// Sent datagrams decoded as text
        pub fn sent_text(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|d| String::from_utf8_lossy(d).into_owned())
                .collect()
        }

        pub fn set_send_error(&self, error: io::ErrorKind) {
            *self.send_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl DatagramIO for MockDatagram {
        async fn send(&mut self, data: &[u8]) -> io::Result<usize> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent.lock().unwrap().push(data.to_vec());
            Ok(data.len())
        }
    }
}
