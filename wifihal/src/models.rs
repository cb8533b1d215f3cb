use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Logical Wi-Fi operating modes, each backed by its own supplicant profile.
///
/// Every call into the HAL names its mode explicitly; there is no ambient
/// "current mode" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WifiMode {
    /// Ordinary client (infrastructure) mode.
    Station,
    /// Access-point / tethering mode.
    Hotspot,
    /// Peer-to-peer (Wi-Fi Direct) mode.
    Direct,
}

impl WifiMode {
    /// All modes, in table order.
    pub const ALL: [WifiMode; 3] = [WifiMode::Station, WifiMode::Hotspot, WifiMode::Direct];

    pub(crate) fn index(self) -> usize {
        match self {
            WifiMode::Station => 0,
            WifiMode::Hotspot => 1,
            WifiMode::Direct => 2,
        }
    }
}

impl Display for WifiMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WifiMode::Station => write!(f, "station"),
            WifiMode::Hotspot => write!(f, "hotspot"),
            WifiMode::Direct => write!(f, "direct"),
        }
    }
}

/// Supplicant daemon lifecycle state as reported through its status property.
///
/// The session only ever reads this state; the init system owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonStatus {
    /// Daemon is not running.
    Stopped,
    /// Daemon is up and serving its control socket.
    Running,
    /// Any other (transitional or unknown) property value.
    Other(String),
}

impl DaemonStatus {
    /// Parses a raw status property value.
    pub fn parse(value: &str) -> Self {
        match value {
            "stopped" => DaemonStatus::Stopped,
            "running" => DaemonStatus::Running,
            other => DaemonStatus::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, DaemonStatus::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, DaemonStatus::Stopped)
    }
}

impl Display for DaemonStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonStatus::Stopped => write!(f, "stopped"),
            DaemonStatus::Running => write!(f, "running"),
            DaemonStatus::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Driver module state machine, observed and written through a property.
///
/// Transitions: `unloaded` -> `ok` (module inserted, radio not detected)
/// -> `running` (radio detected, driver ready) -> `ok` -> ...; `error` on a
/// failed load or unload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Unloaded,
    Ok,
    Running,
    Error,
}

impl DriverStatus {
    /// The raw property value for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            DriverStatus::Unloaded => "unloaded",
            DriverStatus::Ok => "ok",
            DriverStatus::Running => "running",
            DriverStatus::Error => "error",
        }
    }

    /// Parses a raw property value; unknown values read as `Unloaded`.
    pub fn parse(value: &str) -> Self {
        match value {
            "ok" => DriverStatus::Ok,
            "running" => DriverStatus::Running,
            "error" => DriverStatus::Error,
            _ => DriverStatus::Unloaded,
        }
    }
}

impl Display for DriverStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A DHCP lease as returned by the host's DHCP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpLease {
    pub address: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub dns1: Option<Ipv4Addr>,
    pub dns2: Option<Ipv4Addr>,
    pub server: Ipv4Addr,
    pub lease_seconds: u32,
}

/// Errors that can occur during driver, daemon, and supplicant operations.
#[derive(Debug, Error)]
pub enum HalError {
    /// The supplicant daemon's status property does not read "running".
    #[error("supplicant not running")]
    DaemonNotRunning,

    /// The session already holds a live connection; disconnect first.
    #[error("already connected to supplicant")]
    AlreadyConnected,

    /// Opening the control connection failed after all retries.
    #[error("unable to open control connection to supplicant")]
    ConnectFailed,

    /// Attaching the monitor connection to the event stream failed.
    #[error("unable to attach monitor connection to event stream")]
    AttachFailed,

    /// A command was issued with no live control connection. The command is
    /// dropped, not queued.
    #[error("not connected to supplicant")]
    NotConnected,

    /// The control request timed out. Any concurrent event wait on this
    /// session is unblocked as a side effect.
    #[error("command timed out")]
    Timeout,

    /// The supplicant replied with its failure marker.
    #[error("supplicant rejected command")]
    RequestRejected,

    /// Generic control transport I/O failure.
    #[error("control transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// An event wait was interrupted by a command timeout or disconnect.
    #[error("event wait cancelled")]
    Cancelled,

    /// The network interface did not come up within the retry budget.
    #[error("interface setup failed: {0}")]
    InterfaceSetupFailed(String),

    /// The daemon transitioned back to stopped right after being started.
    #[error("supplicant crashed during startup")]
    DaemonCrashed,

    /// The daemon never reached "running" within the poll budget.
    #[error("timed out waiting for supplicant to start")]
    DaemonStartTimeout,

    /// The daemon never reached "stopped" within the poll budget.
    #[error("timed out waiting for supplicant to stop")]
    DaemonStopTimeout,

    /// The privileged helper daemon's socket refused the connection.
    #[error("helper daemon not running")]
    HelperUnavailable,

    /// The helper daemon answered with a failure status code.
    #[error("helper daemon rejected command (code {0})")]
    HelperRejected(u16),

    /// The helper daemon went silent past the idle deadline.
    #[error("helper daemon response timed out")]
    HelperTimeout,

    /// The helper daemon closed its socket mid-response.
    #[error("lost connection to helper daemon")]
    HelperLost,

    /// The DHCP client reported a failure.
    #[error("DHCP request failed: {0}")]
    Dhcp(String),

    /// A local filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
