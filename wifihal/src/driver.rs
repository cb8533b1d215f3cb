//! Driver module load/unload through the privileged helper.

use log::{debug, warn};
use std::path::Path;

use crate::Result;
use crate::helper::HelperDaemon;
use crate::models::DriverStatus;
use crate::profile::SupplicantProfile;
use crate::properties::PropertyStore;

/// Loads the driver module for `profile`.
///
/// Profiles that track driver state have their status property moved to
/// "running" on success and "error" on failure.
pub(crate) async fn load_driver(
    profile: &SupplicantProfile,
    helper: &HelperDaemon,
    props: &dyn PropertyStore,
) -> Result<()> {
    let result = helper.command(&format!("load {}", profile.driver_module)).await;
    if let Some(key) = &profile.driver_status_property {
        let status = if result.is_ok() {
            DriverStatus::Running
        } else {
            DriverStatus::Error
        };
        props.set(key, status.as_str());
    }
    result
}

/// Unloads the driver module for `profile`.
///
/// On success the module is still inserted but the radio is gone, so
/// tracked profiles move to "ok" rather than "unloaded".
pub(crate) async fn unload_driver(
    profile: &SupplicantProfile,
    helper: &HelperDaemon,
    props: &dyn PropertyStore,
) -> Result<()> {
    let result = helper
        .command(&format!("unload {}", profile.driver_module))
        .await;
    if let Some(key) = &profile.driver_status_property {
        let status = if result.is_ok() {
            DriverStatus::Ok
        } else {
            DriverStatus::Error
        };
        props.set(key, status.as_str());
    }
    result
}

/// Whether the driver module for `profile` is loaded and running.
///
/// Requires both the status property to read "running" and the module tag
/// to appear in the kernel module list; a "running" property left over
/// from a crash or manual shutdown is reset to "unloaded". Profiles without
/// driver bookkeeping always read as not loaded.
pub(crate) async fn is_driver_loaded(
    profile: &SupplicantProfile,
    props: &dyn PropertyStore,
    module_list: &Path,
) -> bool {
    let (Some(key), Some(tag)) = (&profile.driver_status_property, &profile.module_tag) else {
        return false;
    };

    let status = match props.get(key) {
        Some(value) => DriverStatus::parse(&value),
        None => return false,
    };
    if status != DriverStatus::Running {
        debug!("{tag}: {key} reads \"{status}\"");
        return false;
    }

    // A "running" property can outlive the module; trust the module list.
    let modules = match tokio::fs::read_to_string(module_list).await {
        Ok(contents) => contents,
        Err(e) => {
            warn!("could not open {}: {e}", module_list.display());
            props.set(key, DriverStatus::Unloaded.as_str());
            return false;
        }
    };
    if modules.lines().any(|line| line.starts_with(tag.as_str())) {
        return true;
    }
    props.set(key, DriverStatus::Unloaded.as_str());
    debug!("{tag}: module not present, {key} reset to \"unloaded\"");
    false
}
