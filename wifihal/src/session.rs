//! Supplicant session: dual control/monitor connections, synchronous
//! commands, and cancellable event delivery.

use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::constants::{events, retries, timeouts};
use crate::daemon::daemon_status;
use crate::models::HalError;
use crate::profile::SupplicantProfile;
use crate::properties::PropertyStore;
use crate::transport::{ControlHandle, ControlSocket, RequestError};

/// Runtime connection state for one supplicant profile.
///
/// A session owns one control connection (synchronous request/reply), one
/// monitor connection (asynchronous events), and a cancellation token that
/// lets a command timeout or a disconnect unblock a pending event wait.
/// The three are created together at [`connect`](SupplicantSession::connect)
/// and released together at [`disconnect`](SupplicantSession::disconnect);
/// no partially connected state is ever observable.
///
/// [`command`](SupplicantSession::command) and
/// [`wait_for_event`](SupplicantSession::wait_for_event) are designed to run
/// concurrently from two tasks against the same session: the control and
/// monitor connections are independently locked, so the command path never
/// contends with a blocked event reader.
pub struct SupplicantSession {
    profile: SupplicantProfile,
    socket: Arc<dyn ControlSocket>,
    properties: Arc<dyn PropertyStore>,
    ifname: StdMutex<String>,
    control: Mutex<Option<Box<dyn ControlHandle>>>,
    monitor: Mutex<Option<Box<dyn ControlHandle>>>,
    cancel: StdMutex<Option<CancellationToken>>,
}

impl SupplicantSession {
    /// Creates a disconnected session for `profile` over the given
    /// control-socket implementation.
    pub fn new(
        profile: SupplicantProfile,
        socket: Arc<dyn ControlSocket>,
        properties: Arc<dyn PropertyStore>,
    ) -> Self {
        let ifname = profile.default_ifname.clone();
        SupplicantSession {
            profile,
            socket,
            properties,
            ifname: StdMutex::new(ifname),
            control: Mutex::new(None),
            monitor: Mutex::new(None),
            cancel: StdMutex::new(None),
        }
    }

    /// The profile this session is bound to.
    pub fn profile(&self) -> &SupplicantProfile {
        &self.profile
    }

    /// The interface name currently in effect (re-resolved from the
    /// profile's interface property on every connect).
    pub fn ifname(&self) -> String {
        self.ifname
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether the session holds a live connection.
    pub async fn is_connected(&self) -> bool {
        self.control.lock().await.is_some()
    }

    /// Connects to the supplicant's control endpoint.
    ///
    /// Opens the control connection (retrying while the daemon finishes
    /// setting up its socket), opens and attaches the monitor connection,
    /// and installs a fresh cancellation token. On any failure everything
    /// acquired so far is released before returning.
    ///
    /// # Errors
    ///
    /// `DaemonNotRunning` if the daemon's status property does not read
    /// "running"; `AlreadyConnected` if the session was not disconnected
    /// first; `ConnectFailed` / `AttachFailed` on transport setup failures.
    pub async fn connect(&self) -> Result<()> {
        if !daemon_status(&self.profile, &*self.properties).is_some_and(|s| s.is_running()) {
            error!(
                "{}: {} not running, cannot connect",
                self.ifname(),
                self.profile.daemon_name
            );
            return Err(HalError::DaemonNotRunning);
        }

        let mut control_slot = self.control.lock().await;
        let mut monitor_slot = self.monitor.lock().await;
        if control_slot.is_some() {
            return Err(HalError::AlreadyConnected);
        }

        // The interface name may have been overridden since construction.
        let ifname = self
            .properties
            .get(&self.profile.ifname_property)
            .unwrap_or_else(|| self.profile.default_ifname.clone());
        let endpoint = self.profile.control_endpoint(&ifname);
        *self.ifname.lock().unwrap_or_else(|e| e.into_inner()) = ifname.clone();

        info!("{ifname}: connect to {}", self.profile.daemon_name);

        let mut control = None;
        for _ in 0..retries::CONNECT_MAX_ATTEMPTS {
            match self.socket.open(&endpoint).await {
                Ok(handle) => {
                    debug!("{ifname}: control connection to {} open", endpoint.display());
                    control = Some(handle);
                    break;
                }
                Err(e) => {
                    debug!(
                        "{ifname}: control open failed ({e}), waiting {}ms",
                        timeouts::CONNECT_RETRY_DELAY_MS
                    );
                    sleep(timeouts::connect_retry_delay()).await;
                }
            }
        }
        let Some(control) = control else {
            error!(
                "{ifname}: unable to open connection to supplicant on \"{}\"",
                endpoint.display()
            );
            return Err(HalError::ConnectFailed);
        };

        let mut monitor = match self.socket.open(&endpoint).await {
            Ok(handle) => handle,
            Err(e) => {
                error!("{ifname}: monitor open failed: {e}");
                drop(control);
                return Err(HalError::ConnectFailed);
            }
        };
        if let Err(e) = monitor.attach().await {
            error!("{ifname}: monitor attach failed: {e}");
            drop(monitor);
            drop(control);
            return Err(HalError::AttachFailed);
        }

        *control_slot = Some(control);
        *monitor_slot = Some(monitor);
        *self.cancel.lock().unwrap_or_else(|e| e.into_inner()) = Some(CancellationToken::new());

        debug!("{ifname}: connected to {}", self.profile.daemon_name);
        Ok(())
    }

    /// Issues a synchronous command and returns the supplicant's reply.
    ///
    /// The command is dropped, not queued, if the session is disconnected.
    /// A timeout additionally unblocks any concurrent
    /// [`wait_for_event`](SupplicantSession::wait_for_event) on this
    /// session; the connection is left in place and the caller decides
    /// whether to retry or disconnect.
    ///
    /// # Errors
    ///
    /// `NotConnected`, `Timeout`, `Transport` on I/O failure, or
    /// `RequestRejected` when the reply carries the supplicant's `FAIL`
    /// marker.
    pub async fn command(&self, cmd: &str) -> Result<String> {
        let ifname = self.ifname();
        let mut guard = self.control.lock().await;
        let Some(handle) = guard.as_mut() else {
            warn!("{ifname}: not connected to supplicant - \"{cmd}\" command dropped");
            return Err(HalError::NotConnected);
        };

        debug!("{ifname}: issue cmd '{cmd}'");
        let mut reply = match handle.request(cmd, timeouts::request_timeout()).await {
            Ok(reply) => reply,
            Err(RequestError::Timeout) => {
                debug!("{ifname}: cmd '{cmd}' timed out");
                // Unblock the monitor side; the channel is suspect now.
                if let Some(token) = self.cancel_token() {
                    token.cancel();
                }
                return Err(HalError::Timeout);
            }
            Err(RequestError::Io(e)) => {
                debug!("{ifname}: cmd '{cmd}' failed (ctrl socket: {e})");
                return Err(HalError::Transport(e));
            }
        };

        if reply.starts_with(b"FAIL") {
            debug!("{ifname}: cmd '{cmd}' rejected (supplicant replied FAIL)");
            return Err(HalError::RequestRejected);
        }
        if cmd.as_bytes().starts_with(b"PING") {
            // PING replies are sentinel-terminated at the reported length.
            if let Some(nul) = reply.iter().position(|&b| b == 0) {
                reply.truncate(nul);
            }
        }
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }

    /// Blocks until the next asynchronous event and returns its payload.
    ///
    /// A numeric priority prefix of the form `<N>` is stripped before the
    /// event is returned. Local failure cases are folded into fabricated
    /// `CTRL-EVENT-TERMINATING` events so an event-pump loop can treat
    /// every shutdown path uniformly: "connection closed" when the session
    /// is disconnected, "recv error" when the receive fails, and
    /// "signal 0 received" when the daemon's socket reaches end of stream.
    ///
    /// # Errors
    ///
    /// `Cancelled` once a concurrent command timeout or a disconnect fires
    /// the session's cancellation token; the token stays fired until the
    /// session is reconnected.
    pub async fn wait_for_event(&self) -> Result<String> {
        let ifname = self.ifname();
        let mut guard = self.monitor.lock().await;
        let Some(handle) = guard.as_mut() else {
            debug!("{ifname}: connection closed");
            return Ok(events::TERMINATING_CLOSED.to_string());
        };
        let Some(token) = self.cancel_token() else {
            debug!("{ifname}: connection closed");
            return Ok(events::TERMINATING_CLOSED.to_string());
        };

        let received = tokio::select! {
            biased;
            received = handle.receive() => received,
            _ = token.cancelled() => {
                debug!("{ifname}: received cancellation, terminate event wait");
                return Err(HalError::Cancelled);
            }
        };

        match received {
            Err(e) => {
                debug!("{ifname}: event receive failed: {e}");
                Ok(events::TERMINATING_RECV_ERROR.to_string())
            }
            Ok(payload) if payload.is_empty() => {
                debug!("{ifname}: received EOF on supplicant socket");
                Ok(events::TERMINATING_EOF.to_string())
            }
            Ok(payload) => {
                let event = String::from_utf8_lossy(&payload).into_owned();
                debug!("{ifname}: evt \"{event}\"");
                Ok(strip_priority_prefix(event))
            }
        }
    }

    /// Tears down the connection. Idempotent.
    ///
    /// Cancels any pending event wait, releases both connections and the
    /// cancellation token, then waits up to five seconds for an externally
    /// requested daemon stop to be confirmed through the status property.
    /// No stop request is issued here; the wait is a courtesy and the
    /// session is fully disconnected regardless of its outcome.
    pub async fn disconnect(&self) {
        let ifname = self.ifname();
        debug!("{ifname}: close ctrl & monitor connections");

        if let Some(token) = self.cancel.lock().unwrap_or_else(|e| e.into_inner()).take() {
            token.cancel();
        }
        self.control.lock().await.take();
        self.monitor.lock().await.take();

        for _ in 0..retries::DISCONNECT_CONFIRM_MAX_POLLS {
            if daemon_status(&self.profile, &*self.properties).is_some_and(|s| s.is_stopped()) {
                return;
            }
            sleep(timeouts::property_poll_interval()).await;
        }
    }

    fn cancel_token(&self) -> Option<CancellationToken> {
        self.cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Strips the `<N>` message-level prefix from an event line.
///
/// Events arrive as `<N>CTRL-EVENT-XXX` where `N` is the numeric message
/// level. The level is of no use to callers, so everything through the
/// first `>` is dropped; lines without a leading `<` pass through as-is.
fn strip_priority_prefix(event: String) -> String {
    if event.starts_with('<')
        && let Some(pos) = event.find('>')
    {
        return event[pos + 1..].to_string();
    }
    event
}
