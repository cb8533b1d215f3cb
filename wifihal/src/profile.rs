//! Static per-mode supplicant configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration record binding one Wi-Fi mode to its supplicant daemon.
///
/// Profiles are immutable after construction; one exists per logical mode.
/// The crate ships the three vendor defaults ([`SupplicantProfile::station`],
/// [`SupplicantProfile::hotspot`], [`SupplicantProfile::direct`]); hosts may
/// also deserialize their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplicantProfile {
    /// Interface name used when `ifname_property` is unset.
    pub default_ifname: String,
    /// Property key that may override the interface name.
    pub ifname_property: String,
    /// Directory holding the supplicant's per-interface control endpoints.
    pub socket_dir: PathBuf,
    /// Daemon service name, as known to the init system.
    pub daemon_name: String,
    /// Property key holding the daemon's lifecycle status.
    pub daemon_status_property: String,
    /// Pristine config shipped with the system image.
    pub config_template: PathBuf,
    /// Live config file the daemon reads.
    pub config_file: PathBuf,
    /// Daemon start command with `{daemon}`, `{interface}` and `{config}`
    /// placeholders.
    pub start_command: String,
    /// Filename prefix of client-side sockets, used for stale cleanup.
    pub socket_prefix: String,
    /// Directory scanned for stale client sockets.
    pub client_socket_dir: PathBuf,
    /// Module argument passed to the privileged helper on load/unload.
    pub driver_module: String,
    /// Property tracking driver state, where the mode maintains one.
    pub driver_status_property: Option<String>,
    /// Kernel module name to look for in the module list.
    pub module_tag: Option<String>,
}

impl SupplicantProfile {
    /// The station-mode (client) profile.
    pub fn station() -> Self {
        SupplicantProfile {
            default_ifname: "wlan0".into(),
            ifname_property: "wifi.interface".into(),
            socket_dir: "/data/misc/wifi/wpa_supplicant".into(),
            daemon_name: "wpa_supplicant".into(),
            daemon_status_property: "init.svc.wpa_supplicant".into(),
            config_template: "/system/etc/wifi/wpa_supplicant.conf".into(),
            config_file: "/data/misc/wifi/wpa_supplicant.conf".into(),
            start_command: "{daemon}:-Dwext -i{interface} -c{config} -dd".into(),
            socket_prefix: "wpa_ctrl_".into(),
            client_socket_dir: "/data/misc/wifi/sockets".into(),
            driver_module: "wifi".into(),
            driver_status_property: Some("wlan.driver.status".into()),
            module_tag: Some("wlan".into()),
        }
    }

    /// The hotspot (access-point) profile.
    pub fn hotspot() -> Self {
        SupplicantProfile {
            default_ifname: "ap0".into(),
            ifname_property: "wifi.tethering.interface".into(),
            socket_dir: "/data/misc/wifi/p2p_supplicant".into(),
            daemon_name: "p2p_supplicant".into(),
            daemon_status_property: "init.svc.p2p_supplicant".into(),
            config_template: "/system/etc/wifi/p2p_supplicant.conf".into(),
            config_file: "/data/misc/wifi/p2p_supplicant.conf".into(),
            start_command: "{daemon}:-Dnl80211 -i{interface} -c{config} -dd".into(),
            socket_prefix: "p2p_ctrl".into(),
            client_socket_dir: "/data/misc/wifi/sockets".into(),
            driver_module: "hotspot".into(),
            driver_status_property: None,
            module_tag: None,
        }
    }

    /// The peer-to-peer (Wi-Fi Direct) profile.
    pub fn direct() -> Self {
        SupplicantProfile {
            default_ifname: "p2p0".into(),
            ifname_property: "wifi.direct.interface".into(),
            socket_dir: "/data/misc/wifi/p2p_supplicant".into(),
            daemon_name: "p2p_supplicant".into(),
            daemon_status_property: "init.svc.p2p_supplicant".into(),
            config_template: "/system/etc/wifi/p2p_supplicant.conf".into(),
            config_file: "/data/misc/wifi/p2p_supplicant.conf".into(),
            start_command: "{daemon}:-Dnl80211 -i{interface} -c{config} -dd".into(),
            socket_prefix: "p2p_ctrl".into(),
            client_socket_dir: "/data/misc/wifi/sockets".into(),
            driver_module: "p2p".into(),
            driver_status_property: None,
            module_tag: None,
        }
    }

    /// Renders the daemon start command for a resolved interface name.
    pub fn render_start_command(&self, interface: &str) -> String {
        self.start_command
            .replace("{daemon}", &self.daemon_name)
            .replace("{interface}", interface)
            .replace("{config}", &self.config_file.to_string_lossy())
    }

    /// Control endpoint path for a resolved interface name.
    pub fn control_endpoint(&self, interface: &str) -> PathBuf {
        self.socket_dir.join(interface)
    }
}
