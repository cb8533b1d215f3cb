//! Control-socket transport capability.
//!
//! The wire protocol spoken to the supplicant is deliberately opaque to this
//! crate: a host supplies implementations of these traits (the standard
//! control protocol and, where the platform has one, its peer-to-peer
//! variant) and a [`SupplicantSession`](crate::SupplicantSession) drives
//! them.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Failure modes of a synchronous control request.
#[derive(Debug)]
pub enum RequestError {
    /// No reply arrived within the deadline. The channel is treated as
    /// unreliable afterwards.
    Timeout,
    /// Any other transport failure.
    Io(io::Error),
}

/// Factory for control connections to one supplicant flavor.
///
/// A session is built over exactly one implementation; which one is a
/// construction-time choice, not a runtime switch.
#[async_trait]
pub trait ControlSocket: Send + Sync {
    /// Opens a connection to the control endpoint at `path`.
    async fn open(&self, path: &Path) -> io::Result<Box<dyn ControlHandle>>;
}

/// One open control connection. Dropping the handle closes it.
#[async_trait]
pub trait ControlHandle: Send + Sync {
    /// Sends a command and waits for its reply.
    async fn request(&mut self, cmd: &str, timeout: Duration) -> Result<Vec<u8>, RequestError>;

    /// Receives one message from the connection. An `Ok` with an empty
    /// payload signals end of stream without error.
    async fn receive(&mut self) -> io::Result<Vec<u8>>;

    /// Registers this connection with the daemon's asynchronous event
    /// stream.
    async fn attach(&mut self) -> io::Result<()>;
}
