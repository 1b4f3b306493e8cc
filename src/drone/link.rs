//! # Drone Link
//!
//! The command sink seam and its AR.Drone implementation.
//!
//! [`CommandSink`] is what the rest of the program talks to; [`dispatch`]
//! maps every decoder [`Command`] to exactly one sink call. [`DroneLink`]
//! implements the sink by sending AT commands over UDP.

use async_trait::async_trait;
use std::net::SocketAddr;
use tracing::{debug, info, warn};

use super::at::AtCommand;
use super::transport::{DatagramIO, TokioUdpSocket};
use crate::controller::Command;
use crate::error::{PilotError, Result};

/// Receiver of flight commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandSink: Send {
    /// Neutral command: stop moving.
    async fn disarm(&mut self) -> Result<()>;

    /// Armed command with all four axes.
    async fn set_command(&mut self, roll: f32, pitch: f32, throttle: f32, yaw: f32) -> Result<()>;

    /// One-shot flat-trim calibration.
    async fn request_calibration(&mut self) -> Result<()>;

    /// New start toggle value (take-off when `true`, land when `false`).
    async fn request_start_toggle(&mut self, started: bool) -> Result<()>;

    /// Select signal with the raw button value.
    async fn request_select(&mut self, value: i16) -> Result<()>;
}

/// Forwards one decoder command to `sink`.
///
/// # Errors
///
/// Returns whatever error the sink reports.
pub async fn dispatch<S: CommandSink + ?Sized>(sink: &mut S, command: &Command) -> Result<()> {
    match *command {
        Command::Disarm => sink.disarm().await,
        Command::Progressive {
            roll,
            pitch,
            throttle,
            yaw,
        } => sink.set_command(roll, pitch, throttle, yaw).await,
        Command::Calibrate => sink.request_calibration().await,
        Command::StartToggle(started) => sink.request_start_toggle(started).await,
        Command::Select(value) => sink.request_select(value).await,
    }
}

/// AR.Drone AT command link.
///
/// Keeps the AT sequence counter, the latched take-off state and the last
/// progressive command so [`DroneLink::keepalive`] can repeat them.
pub struct DroneLink<T = TokioUdpSocket> {
    transport: T,
    remote: String,
    sequence: u32,
    takeoff: bool,
    last_pcmd: AtCommand,
    packets_sent: u64,
}

impl<T> std::fmt::Debug for DroneLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DroneLink")
            .field("remote", &self.remote)
            .field("sequence", &self.sequence)
            .field("takeoff", &self.takeoff)
            .finish_non_exhaustive()
    }
}

impl DroneLink<TokioUdpSocket> {
    /// Opens a UDP link to the drone's AT port.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the local socket cannot be bound or connected.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_pilot::drone::link::DroneLink;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let link = DroneLink::connect("192.168.1.1:5556".parse()?).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(remote: SocketAddr) -> Result<Self> {
        let transport = TokioUdpSocket::connect(remote).await?;
        info!("AT command link ready for {}", remote);
        Ok(Self::with_transport(transport, remote.to_string()))
    }
}

impl<T: DatagramIO> DroneLink<T> {
    /// Wraps an existing transport.
    pub fn with_transport(transport: T, remote: impl Into<String>) -> Self {
        Self {
            transport,
            remote: remote.into(),
            sequence: 0,
            takeoff: false,
            last_pcmd: AtCommand::hover(),
            packets_sent: 0,
        }
    }

    /// Sequence number of the last command sent (0 before the first).
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Total datagrams sent.
    #[must_use]
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    /// Whether take-off is currently requested.
    #[must_use]
    pub fn takeoff(&self) -> bool {
        self.takeoff
    }

    /// Resends the current `AT*REF` state and the last progressive command.
    ///
    /// # Errors
    ///
    /// Returns `Link` if a datagram cannot be sent.
    pub async fn keepalive(&mut self) -> Result<()> {
        self.send(AtCommand::Ref {
            takeoff: self.takeoff,
            emergency: false,
        })
        .await?;
        self.send(self.last_pcmd).await
    }

    /// Leaves the drone on a hover command before the link is dropped.
    ///
    /// A send failure is logged, not returned: there is nothing left to
    /// retry with.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.disarm().await {
            warn!("Failed to send final hover command: {}", e);
        }
    }

    async fn send(&mut self, command: AtCommand) -> Result<()> {
        self.sequence = self.sequence.wrapping_add(1);
        let frame = command.encode(self.sequence);

        self.transport
            .send(frame.as_bytes())
            .await
            .map_err(|e| PilotError::Link(format!("Failed to send to {}: {}", self.remote, e)))?;

        self.packets_sent += 1;
        debug!("Sent {:?}", frame.trim_end());
        Ok(())
    }

    async fn send_pcmd(&mut self, command: AtCommand) -> Result<()> {
        self.last_pcmd = command;
        self.send(command).await
    }
}

#[async_trait]
impl<T: DatagramIO> CommandSink for DroneLink<T> {
    async fn disarm(&mut self) -> Result<()> {
        self.send_pcmd(AtCommand::hover()).await
    }

    async fn set_command(&mut self, roll: f32, pitch: f32, throttle: f32, yaw: f32) -> Result<()> {
        self.send_pcmd(AtCommand::Pcmd {
            progressive: true,
            roll,
            pitch,
            gaz: throttle,
            yaw,
        })
        .await
    }

    async fn request_calibration(&mut self) -> Result<()> {
        self.send(AtCommand::FlatTrim).await?;
        info!("Flat trim request sent");
        Ok(())
    }

    async fn request_start_toggle(&mut self, started: bool) -> Result<()> {
        self.takeoff = started;
        self.send(AtCommand::Ref {
            takeoff: started,
            emergency: false,
        })
        .await?;
        info!("{} request sent", if started { "Take-off" } else { "Landing" });
        Ok(())
    }

    async fn request_select(&mut self, value: i16) -> Result<()> {
        self.send(AtCommand::Ref {
            takeoff: self.takeoff,
            emergency: value != 0,
        })
        .await?;
        info!("Emergency signal sent");
        Ok(())
    }
}
