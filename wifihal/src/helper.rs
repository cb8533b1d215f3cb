//! Privileged helper daemon client.
//!
//! Kernel module load and unload happen in a privileged helper process.
//! The protocol over its local socket is minimal: one NUL-terminated
//! command line out, NUL-terminated response frames back, each frame led by
//! a three-digit status code. A code in [200,600) ends the exchange; other
//! frames are progress chatter and are skipped.

use log::{debug, error};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::Result;
use crate::constants::timeouts;
use crate::models::HalError;

/// Command prefix the helper expects on every request line.
const COMMAND_PREFIX: &str = "hal";

/// Default helper socket path.
const DEFAULT_SOCKET: &str = "/dev/socket/hald";

/// Status codes reporting that the requested action did not take place.
const FAILURE_CODES: [u16; 3] = [400, 500, 501];

/// Client for the privileged helper daemon.
#[derive(Debug, Clone)]
pub struct HelperDaemon {
    socket_path: PathBuf,
}

impl Default for HelperDaemon {
    fn default() -> Self {
        HelperDaemon::new(DEFAULT_SOCKET)
    }
}

impl HelperDaemon {
    /// Creates a client talking to the helper socket at `socket_path`.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        HelperDaemon {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends one command and waits for a terminal status frame.
    ///
    /// # Errors
    ///
    /// `HelperUnavailable` when the socket refuses the connection (helper
    /// not running), `HelperRejected` on a failure status code,
    /// `HelperLost` if the helper closes the socket mid-response, and
    /// `HelperTimeout` if it goes silent past the idle deadline.
    pub async fn command(&self, cmd: &str) -> Result<()> {
        let mut stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e) if matches!(e.kind(), ErrorKind::ConnectionRefused | ErrorKind::NotFound) => {
                error!("error connecting to helper daemon ({e})");
                return Err(HalError::HelperUnavailable);
            }
            Err(e) => return Err(HalError::Transport(e)),
        };

        let line = format!("{COMMAND_PREFIX} {cmd}");
        debug!("helper cmd: \"{line}\"");
        let mut payload = line.into_bytes();
        payload.push(0);
        if let Err(e) = stream.write_all(&payload).await {
            error!("helper cmd error: \"{cmd}\" ({e})");
            return Err(HalError::Transport(e));
        }

        let mut buffer: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = match timeout(timeouts::helper_idle_timeout(), stream.read(&mut chunk)).await
            {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    error!("error reading helper response ({e})");
                    return Err(HalError::Transport(e));
                }
                Err(_) => {
                    error!("helper daemon response timed out");
                    return Err(HalError::HelperTimeout);
                }
            };
            if read == 0 {
                error!("lost connection to helper daemon - did it crash?");
                return Err(HalError::HelperLost);
            }
            buffer.extend_from_slice(&chunk[..read]);

            let mut consumed = 0;
            for i in 0..buffer.len() {
                if buffer[i] != 0 {
                    continue;
                }
                if let Some(code) = parse_status_code(&buffer[consumed..i])
                    && (200..600).contains(&code)
                {
                    debug!("helper response code: {code}");
                    return classify_code(code);
                }
                consumed = i + 1;
            }
            buffer.drain(..consumed);
        }
    }
}

/// Extracts the leading three-digit status code of a response frame.
fn parse_status_code(frame: &[u8]) -> Option<u16> {
    let digits = frame.get(..3)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut code = 0u16;
    for &d in digits {
        code = code * 10 + u16::from(d - b'0');
    }
    Some(code)
}

fn classify_code(code: u16) -> Result<()> {
    if FAILURE_CODES.contains(&code) {
        Err(HalError::HelperRejected(code))
    } else {
        Ok(())
    }
}
