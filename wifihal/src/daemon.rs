//! Supplicant daemon lifecycle: config bootstrap, start, stop.

use log::{debug, error, info, warn};
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::time::sleep;

use crate::Result;
use crate::constants::{properties as prop_keys, retries, timeouts};
use crate::models::{DaemonStatus, HalError};
use crate::netif::{InterfaceControl, set_interface};
use crate::profile::SupplicantProfile;
use crate::properties::PropertyStore;

/// Live config files are readable by the daemon's group only.
const CONFIG_FILE_MODE: u32 = 0o660;

/// Reads the daemon's lifecycle status property.
pub(crate) fn daemon_status(
    profile: &SupplicantProfile,
    props: &dyn PropertyStore,
) -> Option<DaemonStatus> {
    props
        .get(&profile.daemon_status_property)
        .map(|value| DaemonStatus::parse(&value))
}

/// Starts the supplicant daemon for `profile`.
///
/// Succeeds without side effects if the daemon already reports "running".
/// Otherwise: makes sure the daemon's config file exists, brings the
/// interface up, clears stale client sockets, asks init to start the
/// daemon, and polls the status property until it reports "running".
///
/// # Errors
///
/// `DaemonCrashed` if the status property transitions to a freshly written
/// "stopped" after the start request (started but died immediately);
/// `DaemonStartTimeout` if the poll budget runs out.
pub(crate) async fn start_supplicant(
    profile: &SupplicantProfile,
    props: &dyn PropertyStore,
    interfaces: &dyn InterfaceControl,
) -> Result<()> {
    if daemon_status(profile, props).is_some_and(|s| s.is_running()) {
        return Ok(());
    }

    let ifname = props
        .get(&profile.ifname_property)
        .unwrap_or_else(|| profile.default_ifname.clone());

    if let Err(e) = ensure_config_file(&profile.config_file, &profile.config_template).await {
        error!("{ifname}: {} will not be enabled: {e}", profile.daemon_name);
        return Err(e);
    }

    set_interface(interfaces, &ifname, true).await?;

    debug!(
        "{ifname}: clear out stale sockets with prefix \"{}\" in {}",
        profile.socket_prefix,
        profile.client_socket_dir.display()
    );
    cleanup_stale_sockets(&profile.client_socket_dir, &profile.socket_prefix);

    info!("{ifname}: start {}", profile.daemon_name);
    // Snapshot the status generation so a stopped -> running -> stopped
    // bounce is distinguishable from a daemon that never left stopped.
    let serial = props.serial(&profile.daemon_status_property);

    let command = profile.render_start_command(&ifname);
    debug!("{ifname}: supplicant start command: \"{command}\"");
    props.set(prop_keys::CTL_START, &command);

    for _ in 0..retries::DAEMON_START_MAX_POLLS {
        if let Some(status) = daemon_status(profile, props) {
            if status.is_running() {
                return Ok(());
            }
            if status.is_stopped() && props.serial(&profile.daemon_status_property) != serial {
                error!("{ifname}: {} stopped right after starting", profile.daemon_name);
                return Err(HalError::DaemonCrashed);
            }
        }
        sleep(timeouts::property_poll_interval()).await;
    }
    Err(HalError::DaemonStartTimeout)
}

/// Stops the supplicant daemon for `profile`.
///
/// Succeeds without side effects if the daemon already reports "stopped";
/// otherwise asks init to stop it and polls for confirmation.
pub(crate) async fn stop_supplicant(
    profile: &SupplicantProfile,
    props: &dyn PropertyStore,
) -> Result<()> {
    info!("stop {}", profile.daemon_name);

    if daemon_status(profile, props).is_some_and(|s| s.is_stopped()) {
        return Ok(());
    }

    props.set(prop_keys::CTL_STOP, &profile.daemon_name);

    for _ in 0..retries::DAEMON_STOP_MAX_POLLS {
        if daemon_status(profile, props).is_some_and(|s| s.is_stopped()) {
            return Ok(());
        }
        sleep(timeouts::property_poll_interval()).await;
    }
    Err(HalError::DaemonStopTimeout)
}

/// Makes sure the live config file exists, seeding it from the template.
///
/// A partially written file is removed rather than left behind.
pub(crate) async fn ensure_config_file(config: &Path, template: &Path) -> Result<()> {
    match tokio::fs::metadata(config).await {
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            error!("cannot access \"{}\": {e}", config.display());
            return Err(e.into());
        }
    }

    if let Err(e) = tokio::fs::copy(template, config).await {
        error!(
            "cannot create \"{}\" from \"{}\": {e}",
            config.display(),
            template.display()
        );
        let _ = tokio::fs::remove_file(config).await;
        return Err(e.into());
    }

    let perms = std::fs::Permissions::from_mode(CONFIG_FILE_MODE);
    if let Err(e) = tokio::fs::set_permissions(config, perms).await {
        error!("error changing permissions of {}: {e}", config.display());
        let _ = tokio::fs::remove_file(config).await;
        return Err(e.into());
    }
    Ok(())
}

/// Deletes client socket files left over from earlier runs.
///
/// Clients that crashed without an orderly shutdown leave their local
/// endpoints behind; anything in `dir` whose name starts with `prefix` is
/// removed. Missing directories and individual unlink failures are not
/// errors.
pub(crate) fn cleanup_stale_sockets(dir: &Path, prefix: &str) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(prefix)
            && let Err(e) = std::fs::remove_file(entry.path())
        {
            warn!("failed to remove stale socket {}: {e}", entry.path().display());
        }
    }
}
