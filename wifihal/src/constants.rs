//! Retry budgets, delays, and protocol markers.
//!
//! The retry counts and intervals reproduce the vendor HAL's documented
//! budgets: 20 attempts at 300ms for interface and control-socket setup,
//! 200/50 attempts at 100ms for daemon start/stop polling.

/// Retry count constants.
pub mod retries {
    /// Attempts to open the supplicant control socket during connect.
    pub const CONNECT_MAX_ATTEMPTS: u32 = 20;
    /// Attempts to bring a network interface up.
    pub const IFACE_UP_MAX_ATTEMPTS: u32 = 20;
    /// Status property polls while waiting for the daemon to start (~20s).
    pub const DAEMON_START_MAX_POLLS: u32 = 200;
    /// Status property polls while waiting for the daemon to stop (~5s).
    pub const DAEMON_STOP_MAX_POLLS: u32 = 50;
    /// Status property polls after disconnect, waiting for an externally
    /// requested stop to land (~5s).
    pub const DISCONNECT_CONFIRM_MAX_POLLS: u32 = 50;
}

/// Timeout and delay constants.
pub mod timeouts {
    use std::time::Duration;

    pub const CONNECT_RETRY_DELAY_MS: u64 = 300;
    pub const IFACE_RETRY_DELAY_MS: u64 = 300;
    pub const PROPERTY_POLL_INTERVAL_MS: u64 = 100;
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const HELPER_IDLE_TIMEOUT_SECS: u64 = 10;

    pub fn connect_retry_delay() -> Duration {
        Duration::from_millis(CONNECT_RETRY_DELAY_MS)
    }

    pub fn iface_retry_delay() -> Duration {
        Duration::from_millis(IFACE_RETRY_DELAY_MS)
    }

    pub fn property_poll_interval() -> Duration {
        Duration::from_millis(PROPERTY_POLL_INTERVAL_MS)
    }

    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }

    pub fn helper_idle_timeout() -> Duration {
        Duration::from_secs(HELPER_IDLE_TIMEOUT_SECS)
    }
}

/// Supplicant event markers and property keys.
pub mod events {
    /// Event name the supplicant emits when it is going down. The session
    /// also fabricates events with this prefix on local failures so an
    /// event-pump loop can treat every shutdown path uniformly.
    pub const TERMINATING: &str = "CTRL-EVENT-TERMINATING";

    pub const TERMINATING_CLOSED: &str = "CTRL-EVENT-TERMINATING - connection closed";
    pub const TERMINATING_RECV_ERROR: &str = "CTRL-EVENT-TERMINATING - recv error";
    pub const TERMINATING_EOF: &str = "CTRL-EVENT-TERMINATING - signal 0 received";
}

/// Property keys owned by the init system.
pub mod properties {
    /// Writing a rendered daemon command here asks init to start it.
    pub const CTL_START: &str = "ctl.start";
    /// Writing a daemon name here asks init to stop it.
    pub const CTL_STOP: &str = "ctl.stop";
}
