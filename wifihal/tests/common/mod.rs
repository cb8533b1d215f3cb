//! Shared fakes for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;
use tokio::sync::mpsc;

use wifihal::{
    Collaborators, ControlHandle, ControlSocket, DhcpClient, DhcpLease, HelperDaemon,
    InterfaceControl, PropertyStore, RequestError, SupplicantProfile,
};

/// Scripted outcome for one control request.
pub enum Reply {
    Payload(&'static [u8]),
    Timeout,
    Error,
}

struct SocketState {
    /// Scripted outcomes for `open`, consumed front-first; an exhausted
    /// script means success.
    open_script: Mutex<VecDeque<bool>>,
    fail_attach: AtomicBool,
    live_handles: AtomicUsize,
    opened_paths: Mutex<Vec<PathBuf>>,
    commands: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Reply>>,
    event_tx: mpsc::UnboundedSender<io::Result<Vec<u8>>>,
    event_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<io::Result<Vec<u8>>>>,
}

/// In-memory control-socket implementation with scripted failures.
///
/// Counts live handles (decremented on drop) so tests can assert that
/// teardown paths release everything they acquired.
#[derive(Clone)]
pub struct FakeControlSocket {
    state: Arc<SocketState>,
}

impl Default for FakeControlSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeControlSocket {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        FakeControlSocket {
            state: Arc::new(SocketState {
                open_script: Mutex::new(VecDeque::new()),
                fail_attach: AtomicBool::new(false),
                live_handles: AtomicUsize::new(0),
                opened_paths: Mutex::new(Vec::new()),
                commands: Mutex::new(Vec::new()),
                replies: Mutex::new(VecDeque::new()),
                event_tx,
                event_rx: tokio::sync::Mutex::new(event_rx),
            }),
        }
    }

    pub fn script_opens(&self, outcomes: &[bool]) {
        self.state
            .open_script
            .lock()
            .unwrap()
            .extend(outcomes.iter().copied());
    }

    pub fn fail_attach(&self) {
        self.state.fail_attach.store(true, Ordering::SeqCst);
    }

    pub fn push_reply(&self, reply: Reply) {
        self.state.replies.lock().unwrap().push_back(reply);
    }

    pub fn send_event(&self, event: &[u8]) {
        let _ = self.state.event_tx.send(Ok(event.to_vec()));
    }

    pub fn send_event_error(&self) {
        let _ = self.state.event_tx.send(Err(io::Error::other("recv failed")));
    }

    pub fn send_eof(&self) {
        let _ = self.state.event_tx.send(Ok(Vec::new()));
    }

    pub fn live_handles(&self) -> usize {
        self.state.live_handles.load(Ordering::SeqCst)
    }

    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.state.opened_paths.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControlSocket for FakeControlSocket {
    async fn open(&self, path: &Path) -> io::Result<Box<dyn ControlHandle>> {
        self.state
            .opened_paths
            .lock()
            .unwrap()
            .push(path.to_path_buf());
        let ok = self
            .state
            .open_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(true);
        if !ok {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "no such socket",
            ));
        }
        self.state.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeHandle {
            state: self.state.clone(),
        }))
    }
}

struct FakeHandle {
    state: Arc<SocketState>,
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.state.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ControlHandle for FakeHandle {
    async fn request(&mut self, cmd: &str, _timeout: Duration) -> Result<Vec<u8>, RequestError> {
        self.state.commands.lock().unwrap().push(cmd.to_string());
        let scripted = self.state.replies.lock().unwrap().pop_front();
        match scripted {
            Some(Reply::Payload(bytes)) => Ok(bytes.to_vec()),
            Some(Reply::Timeout) => Err(RequestError::Timeout),
            Some(Reply::Error) => Err(RequestError::Io(io::Error::other("ctrl socket failed"))),
            None => Ok(b"OK\n".to_vec()),
        }
    }

    async fn receive(&mut self) -> io::Result<Vec<u8>> {
        let mut rx = self.state.event_rx.lock().await;
        match rx.recv().await {
            Some(result) => result,
            None => Ok(Vec::new()),
        }
    }

    async fn attach(&mut self) -> io::Result<()> {
        if self.state.fail_attach.load(Ordering::SeqCst) {
            return Err(io::Error::other("attach refused"));
        }
        Ok(())
    }
}

/// Property store that reacts to init control writes, so daemon lifecycle
/// transitions can be scripted.
#[derive(Default)]
pub struct ScriptedPropertyStore {
    inner: wifihal::MemoryPropertyStore,
    on_start: Mutex<Vec<(String, String)>>,
    on_stop: Mutex<Vec<(String, String)>>,
}

impl ScriptedPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `key = value` as soon as a start request is issued.
    pub fn when_started(&self, key: &str, value: &str) {
        self.on_start
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
    }

    /// Applies `key = value` as soon as a stop request is issued.
    pub fn when_stopped(&self, key: &str, value: &str) {
        self.on_stop
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
    }
}

impl PropertyStore for ScriptedPropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) {
        self.inner.set(key, value);
        if key == "ctl.start" {
            for (k, v) in self.on_start.lock().unwrap().drain(..) {
                self.inner.set(&k, &v);
            }
        }
        if key == "ctl.stop" {
            for (k, v) in self.on_stop.lock().unwrap().drain(..) {
                self.inner.set(&k, &v);
            }
        }
    }

    fn serial(&self, key: &str) -> Option<u64> {
        self.inner.serial(key)
    }
}

/// Interface control fake with a scripted number of bring-up failures.
#[derive(Default)]
pub struct FakeInterfaces {
    pub up_failures: AtomicUsize,
    pub up_calls: AtomicUsize,
    pub down_calls: AtomicUsize,
    pub infra_calls: AtomicUsize,
}

impl InterfaceControl for FakeInterfaces {
    fn bring_up(&self, _name: &str) -> io::Result<()> {
        self.up_calls.fetch_add(1, Ordering::SeqCst);
        if self.up_failures.load(Ordering::SeqCst) > 0 {
            self.up_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(io::Error::other("not ready"));
        }
        Ok(())
    }

    fn bring_down(&self, _name: &str) -> io::Result<()> {
        self.down_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_infra_mode(&self, _name: &str) -> io::Result<()> {
        self.infra_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// DHCP fake handing out one fixed lease.
pub struct FakeDhcp;

#[async_trait]
impl DhcpClient for FakeDhcp {
    async fn request_lease(&self, _interface: &str) -> wifihal::Result<DhcpLease> {
        Ok(DhcpLease {
            address: [192, 168, 1, 50].into(),
            gateway: [192, 168, 1, 1].into(),
            netmask: [255, 255, 255, 0].into(),
            dns1: Some([8, 8, 8, 8].into()),
            dns2: None,
            server: [192, 168, 1, 1].into(),
            lease_seconds: 3600,
        })
    }
}

/// Serves one helper-daemon exchange at `path`, answering every command
/// with `response`. Returns a handle to the raw bytes the server read.
pub fn serve_helper_once(path: &Path, response: &'static [u8]) -> Arc<Mutex<Vec<u8>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let captured = received.clone();
    let listener = UnixListener::bind(path).unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut cmd = [0u8; 256];
        let n = stream.read(&mut cmd).await.unwrap();
        captured.lock().unwrap().extend_from_slice(&cmd[..n]);
        stream.write_all(response).await.unwrap();
        // Keep the socket open until the client is done.
        let mut rest = [0u8; 16];
        let _ = stream.read(&mut rest).await;
    });
    received
}

/// A station-like profile rooted in a test directory.
pub fn test_profile(dir: &Path) -> SupplicantProfile {
    SupplicantProfile {
        default_ifname: "wlan0".into(),
        ifname_property: "wifi.interface".into(),
        socket_dir: dir.join("wpa_supplicant"),
        daemon_name: "wpa_supplicant".into(),
        daemon_status_property: "init.svc.wpa_supplicant".into(),
        config_template: dir.join("wpa_supplicant.conf.template"),
        config_file: dir.join("wpa_supplicant.conf"),
        start_command: "{daemon}:-Dwext -i{interface} -c{config} -dd".into(),
        socket_prefix: "wpa_ctrl_".into(),
        client_socket_dir: dir.join("sockets"),
        driver_module: "wifi".into(),
        driver_status_property: Some("wlan.driver.status".into()),
        module_tag: Some("wlan".into()),
    }
}

/// Collaborator bundle over the standard fakes.
pub fn collaborators(
    properties: Arc<dyn PropertyStore>,
    control: &FakeControlSocket,
    p2p_control: &FakeControlSocket,
    interfaces: Arc<FakeInterfaces>,
    helper_socket: &Path,
) -> Collaborators {
    Collaborators {
        properties,
        interfaces,
        dhcp: Arc::new(FakeDhcp),
        control: Arc::new(control.clone()),
        p2p_control: Arc::new(p2p_control.clone()),
        helper: HelperDaemon::new(helper_socket),
    }
}
