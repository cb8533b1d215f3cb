//! A Rust library for controlling a Wi-Fi driver and its supplicant daemons.
//!
//! This crate is the hardware-abstraction shim between a host networking
//! service and a vendor wireless stack. It covers three mechanisms:
//!
//! - Kernel module load/unload through a privileged helper daemon
//! - Daemon lifecycle observation by polling system properties
//! - Supplicant control: synchronous commands and asynchronous events over
//!   a pair of control-socket connections
//!
//! Three logical modes are supported (station, hotspot, and peer-to-peer
//! "direct"), each bound to its own [`SupplicantProfile`] and
//! [`SupplicantSession`]. Every call names its mode explicitly.
//!
//! # Example
//!
//! ```no_run
//! use wifihal::{Collaborators, WifiHal, WifiMode};
//!
//! # async fn example(collab: Collaborators) -> wifihal::Result<()> {
//! let hal = WifiHal::new(collab);
//!
//! hal.load_driver(WifiMode::Station).await?;
//! hal.start_supplicant(WifiMode::Station).await?;
//! hal.connect_to_supplicant(WifiMode::Station).await?;
//!
//! // Event pump, typically its own task:
//! loop {
//!     let event = hal.wait_for_event(WifiMode::Station).await?;
//!     println!("{event}");
//!     if event.starts_with("CTRL-EVENT-TERMINATING") {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! [`SupplicantSession::command`] and [`SupplicantSession::wait_for_event`]
//! are meant to run concurrently from two tasks against the same session.
//! A blocked event wait is released by a command timeout or a disconnect;
//! the control and monitor connections never contend with each other.
//!
//! # Error Handling
//!
//! All operations return `Result<T, HalError>`. Failures are always
//! returned, never raised as a panic, and are not retried internally except
//! where a bounded retry is part of the documented behavior (control-socket
//! open, interface bring-up, lifecycle polling).
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade. Add a logging
//! implementation like `env_logger` to see output.

// Internal implementation modules
mod daemon;
mod driver;

// Public API modules
pub mod constants;
pub mod hal;
pub mod helper;
pub mod models;
pub mod netif;
pub mod profile;
pub mod properties;
pub mod session;
pub mod transport;

// Re-exported public API
pub use hal::{Collaborators, WifiHal};
pub use helper::HelperDaemon;
pub use models::{DaemonStatus, DhcpLease, DriverStatus, HalError, WifiMode};
pub use netif::{DhcpClient, InterfaceControl, set_interface};
pub use profile::SupplicantProfile;
pub use properties::{MemoryPropertyStore, PropertyStore};
pub use session::SupplicantSession;
pub use transport::{ControlHandle, ControlSocket, RequestError};

/// A specialized `Result` type for HAL operations.
pub type Result<T> = std::result::Result<T, HalError>;
