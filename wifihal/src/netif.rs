//! Network interface and DHCP collaborators.

use async_trait::async_trait;
use log::{debug, error, warn};
use std::io;
use tokio::time::sleep;

use crate::Result;
use crate::constants::{retries, timeouts};
use crate::models::{DhcpLease, HalError};

/// Low-level interface configuration hooks provided by the host.
pub trait InterfaceControl: Send + Sync {
    /// Marks the interface administratively up.
    fn bring_up(&self, name: &str) -> io::Result<()>;

    /// Marks the interface administratively down.
    fn bring_down(&self, name: &str) -> io::Result<()>;

    /// Switches the interface into infrastructure (managed) mode.
    fn set_infra_mode(&self, name: &str) -> io::Result<()>;
}

/// Host DHCP client.
#[async_trait]
pub trait DhcpClient: Send + Sync {
    /// Runs a lease acquisition on `interface`.
    async fn request_lease(&self, interface: &str) -> Result<DhcpLease>;
}

/// Brings an interface up or down.
///
/// Bringing up retries while the driver finishes registering the interface,
/// then switches it into infrastructure mode; a mode failure is logged but
/// does not fail the call. Bringing down is best-effort and never fails the
/// caller.
pub async fn set_interface(ctl: &dyn InterfaceControl, name: &str, up: bool) -> Result<()> {
    if !up {
        if let Err(e) = ctl.bring_down(name) {
            warn!("{name}: interface down failed: {e}");
        } else {
            debug!("{name}: interface is down");
        }
        return Ok(());
    }

    let mut attempts = 0;
    loop {
        match ctl.bring_up(name) {
            Ok(()) => break,
            Err(e) => {
                attempts += 1;
                if attempts >= retries::IFACE_UP_MAX_ATTEMPTS {
                    error!("{name}: interface did not come up: {e}");
                    return Err(HalError::InterfaceSetupFailed(name.to_string()));
                }
                debug!(
                    "{name}: interface not ready ({e}), waiting {}ms",
                    timeouts::IFACE_RETRY_DELAY_MS
                );
                sleep(timeouts::iface_retry_delay()).await;
            }
        }
    }
    debug!("{name}: interface is up");

    if let Err(e) = ctl.set_infra_mode(name) {
        warn!("{name}: failed to set infrastructure mode: {e}");
    }
    Ok(())
}
