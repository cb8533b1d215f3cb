//! Mode-indexed facade over driver, daemon, and session operations.

use std::path::PathBuf;
use std::sync::Arc;

use crate::Result;
use crate::daemon;
use crate::driver;
use crate::helper::HelperDaemon;
use crate::models::{DhcpLease, WifiMode};
use crate::netif::{DhcpClient, InterfaceControl, set_interface};
use crate::profile::SupplicantProfile;
use crate::properties::PropertyStore;
use crate::session::SupplicantSession;
use crate::transport::ControlSocket;

/// Default kernel module list consulted by [`WifiHal::is_driver_loaded`].
const DEFAULT_MODULE_LIST: &str = "/proc/modules";

/// Host-provided capabilities the HAL is assembled from.
pub struct Collaborators {
    pub properties: Arc<dyn PropertyStore>,
    pub interfaces: Arc<dyn InterfaceControl>,
    pub dhcp: Arc<dyn DhcpClient>,
    /// Standard control-socket implementation, used by station mode.
    pub control: Arc<dyn ControlSocket>,
    /// Peer-to-peer control-socket variant, used by hotspot and direct
    /// modes.
    pub p2p_control: Arc<dyn ControlSocket>,
    pub helper: HelperDaemon,
}

/// High-level interface to the Wi-Fi driver and its supplicant daemons.
///
/// Owns one [`SupplicantSession`] per [`WifiMode`]. There is no ambient
/// "current mode": every method takes its mode explicitly, and the three
/// sessions are independent.
pub struct WifiHal {
    sessions: [SupplicantSession; 3],
    properties: Arc<dyn PropertyStore>,
    interfaces: Arc<dyn InterfaceControl>,
    dhcp: Arc<dyn DhcpClient>,
    helper: HelperDaemon,
    module_list: PathBuf,
}

impl WifiHal {
    /// Creates a HAL over the three standard profiles.
    pub fn new(collab: Collaborators) -> Self {
        Self::with_profiles(
            collab,
            SupplicantProfile::station(),
            SupplicantProfile::hotspot(),
            SupplicantProfile::direct(),
        )
    }

    /// Creates a HAL over custom profiles.
    pub fn with_profiles(
        collab: Collaborators,
        station: SupplicantProfile,
        hotspot: SupplicantProfile,
        direct: SupplicantProfile,
    ) -> Self {
        let sessions = [
            SupplicantSession::new(station, collab.control.clone(), collab.properties.clone()),
            SupplicantSession::new(hotspot, collab.p2p_control.clone(), collab.properties.clone()),
            SupplicantSession::new(direct, collab.p2p_control.clone(), collab.properties.clone()),
        ];
        WifiHal {
            sessions,
            properties: collab.properties,
            interfaces: collab.interfaces,
            dhcp: collab.dhcp,
            helper: collab.helper,
            module_list: DEFAULT_MODULE_LIST.into(),
        }
    }

    /// Overrides the kernel module list path.
    pub fn with_module_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_list = path.into();
        self
    }

    /// The session backing `mode`.
    pub fn session(&self, mode: WifiMode) -> &SupplicantSession {
        &self.sessions[mode.index()]
    }

    fn profile(&self, mode: WifiMode) -> &SupplicantProfile {
        self.session(mode).profile()
    }

    /// Loads the driver module for `mode` through the privileged helper.
    pub async fn load_driver(&self, mode: WifiMode) -> Result<()> {
        driver::load_driver(self.profile(mode), &self.helper, &*self.properties).await
    }

    /// Unloads the driver module for `mode`.
    pub async fn unload_driver(&self, mode: WifiMode) -> Result<()> {
        driver::unload_driver(self.profile(mode), &self.helper, &*self.properties).await
    }

    /// Whether the driver module for `mode` is loaded and running. Only
    /// profiles that track driver status can be probed; others read as not
    /// loaded.
    pub async fn is_driver_loaded(&self, mode: WifiMode) -> bool {
        driver::is_driver_loaded(self.profile(mode), &*self.properties, &self.module_list).await
    }

    /// Starts the supplicant daemon for `mode`. Direct mode loads its
    /// driver first.
    pub async fn start_supplicant(&self, mode: WifiMode) -> Result<()> {
        if mode == WifiMode::Direct {
            self.load_driver(mode).await?;
        }
        daemon::start_supplicant(self.profile(mode), &*self.properties, &*self.interfaces).await
    }

    /// Stops the supplicant daemon for `mode`.
    pub async fn stop_supplicant(&self, mode: WifiMode) -> Result<()> {
        daemon::stop_supplicant(self.profile(mode), &*self.properties).await
    }

    /// Connects the session for `mode` to its supplicant.
    pub async fn connect_to_supplicant(&self, mode: WifiMode) -> Result<()> {
        self.session(mode).connect().await
    }

    /// Issues a synchronous supplicant command on `mode`.
    pub async fn command(&self, mode: WifiMode, cmd: &str) -> Result<String> {
        self.session(mode).command(cmd).await
    }

    /// Blocks until the next supplicant event on `mode`.
    pub async fn wait_for_event(&self, mode: WifiMode) -> Result<String> {
        self.session(mode).wait_for_event().await
    }

    /// Tears down the session for `mode`. Direct mode also unloads its
    /// driver.
    pub async fn close_supplicant_connection(&self, mode: WifiMode) -> Result<()> {
        self.session(mode).disconnect().await;
        if mode == WifiMode::Direct {
            self.unload_driver(mode).await?;
        }
        Ok(())
    }

    /// Brings the interface for `mode` up or down.
    pub async fn set_interface(&self, mode: WifiMode, up: bool) -> Result<()> {
        let ifname = self.session(mode).ifname();
        set_interface(&*self.interfaces, &ifname, up).await
    }

    /// Runs a DHCP lease acquisition on the interface for `mode`.
    pub async fn request_dhcp_lease(&self, mode: WifiMode) -> Result<DhcpLease> {
        let ifname = self.session(mode).ifname();
        self.dhcp.request_lease(&ifname).await
    }
}
