/*!
 * Linux Network Binding Implementation
 * Interface discovery through sysfs, SSID lookup through `iw`,
 * and a process-wide binding applied to sockets with SO_BINDTODEVICE
 */

use super::traits::*;
use super::types::*;
use arc_swap::ArcSwapOption;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default location of the network class directory
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/net";

/// Default `iw` executable, resolved through PATH
pub const DEFAULT_IW_PATH: &str = "iw";

const ARPHRD_ETHER: &str = "1";
const ARPHRD_LOOPBACK: &str = "772";

/// Interface the process is currently bound to.
///
/// Linux has no process-wide bind call, so the binding is recorded here and
/// applied to every socket created through [`super::socket`].
static PROCESS_BINDING: ArcSwapOption<NetworkHandle> = ArcSwapOption::const_empty();

/// Network the process is currently bound to, if any
pub fn process_binding() -> Option<NetworkHandle> {
    PROCESS_BINDING.load_full().map(|handle| (*handle).clone())
}

/// Linux platform services rooted at a sysfs network directory
#[derive(Debug, Clone)]
pub struct LinuxPlatform {
    sysfs_root: PathBuf,
    iw_path: PathBuf,
}

impl LinuxPlatform {
    pub fn new() -> Self {
        Self::with_paths(DEFAULT_SYSFS_ROOT, DEFAULT_IW_PATH)
    }

    pub fn with_paths(sysfs_root: impl Into<PathBuf>, iw_path: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            iw_path: iw_path.into(),
        }
    }

    /// Check if this implementation is usable on the current host
    pub fn is_supported(&self) -> bool {
        cfg!(target_os = "linux") && self.sysfs_root.is_dir()
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformServices for LinuxPlatform {
    fn connectivity(&self) -> Option<Arc<dyn ConnectivityProvider>> {
        if !self.sysfs_root.is_dir() {
            return None;
        }
        Some(Arc::new(LinuxConnectivity::new(self.sysfs_root.clone())))
    }

    fn wifi_info(&self) -> Option<Arc<dyn WifiInfoProvider>> {
        if !self.sysfs_root.is_dir() {
            return None;
        }
        Some(Arc::new(LinuxWifiInfo::new(
            self.sysfs_root.clone(),
            self.iw_path.clone(),
        )))
    }

    fn platform(&self) -> PlatformType {
        PlatformType::LinuxSysfs
    }
}

/// Connectivity provider backed by sysfs
#[derive(Debug, Clone)]
pub struct LinuxConnectivity {
    sysfs_root: PathBuf,
}

impl LinuxConnectivity {
    pub fn new(sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
        }
    }

    #[cfg(target_os = "linux")]
    fn bind_interface(&self, handle: NetworkHandle) -> bool {
        use nix::net::if_::if_nametoindex;
        use socket2::{Domain, Socket, Type};

        match if_nametoindex(handle.interface()) {
            Ok(index) if index == handle.id() => {}
            Ok(index) => {
                warn!(network = %handle, index, "Interface index changed, refusing to bind");
                return false;
            }
            Err(e) => {
                warn!(network = %handle, error = %e, "Interface no longer exists");
                return false;
            }
        }

        // The kernel checks device binding permissions per socket, so probe once here.
        let probe = Socket::new(Domain::IPV4, Type::DGRAM, None)
            .and_then(|socket| socket.bind_device(Some(handle.interface().as_bytes())));
        if let Err(e) = probe {
            warn!(network = %handle, error = %e, "Cannot attach sockets to interface");
            return false;
        }

        info!(network = %handle, "Recorded process binding");
        PROCESS_BINDING.store(Some(Arc::new(handle)));
        true
    }

    #[cfg(not(target_os = "linux"))]
    fn bind_interface(&self, handle: NetworkHandle) -> bool {
        warn!(network = %handle, "Device binding not available on this platform");
        false
    }
}

impl ConnectivityProvider for LinuxConnectivity {
    fn list_networks(&self) -> PlatformResult<Vec<NetworkHandle>> {
        active_interfaces(&self.sysfs_root)
    }

    fn capabilities_of(&self, handle: &NetworkHandle) -> Option<NetworkCapabilitySet> {
        let dir = self.sysfs_root.join(handle.interface());
        let index = read_attr(&dir, "ifindex")?.parse::<u32>().ok()?;
        if index != handle.id() {
            debug!(network = %handle, index, "Stale network handle");
            return None;
        }
        Some(classify_interface(&dir))
    }

    fn bind_process(&self, handle: Option<NetworkHandle>) -> bool {
        match handle {
            Some(handle) => self.bind_interface(handle),
            None => {
                if let Some(previous) = PROCESS_BINDING.swap(None) {
                    debug!(network = %previous, "Dropped process binding");
                }
                true
            }
        }
    }
}

/// Wi-Fi info provider that asks `iw` about each wireless interface
#[derive(Debug, Clone)]
pub struct LinuxWifiInfo {
    sysfs_root: PathBuf,
    iw_path: PathBuf,
}

impl LinuxWifiInfo {
    pub fn new(sysfs_root: impl Into<PathBuf>, iw_path: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            iw_path: iw_path.into(),
        }
    }

    fn link_output(&self, interface: &str) -> PlatformResult<String> {
        let output = Command::new(&self.iw_path)
            .args(["dev", interface, "link"])
            .output()
            .map_err(|e| {
                PlatformError::CommandFailed(format!(
                    "failed to run `{} dev {} link`: {}",
                    self.iw_path.display(),
                    interface,
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlatformError::CommandFailed(format!(
                "iw exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl WifiInfoProvider for LinuxWifiInfo {
    /// Name reported for the first associated wireless interface
    ///
    /// Interfaces are asked in ifindex order, the order the binder picks
    /// from. An interface whose query fails is skipped; the error is only
    /// returned when no interface could be queried at all.
    fn current_network_name(&self) -> PlatformResult<Option<String>> {
        let mut first_error = None;
        let mut queried = false;

        for handle in active_interfaces(&self.sysfs_root)? {
            let dir = self.sysfs_root.join(handle.interface());
            if !classify_interface(&dir).has_transport(Transports::WIFI) {
                continue;
            }
            match self.link_output(handle.interface()) {
                Ok(output) => {
                    queried = true;
                    if let Some(ssid) = parse_iw_link(&output) {
                        return Ok(Some(ssid));
                    }
                }
                Err(e) => {
                    debug!(network = %handle, error = %e, "Link query failed, trying next interface");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if !queried => Err(e),
            _ => Ok(None),
        }
    }
}

/// Up, non-loopback interfaces ordered by interface index
pub fn active_interfaces(sysfs_root: &Path) -> PlatformResult<Vec<NetworkHandle>> {
    let mut handles = Vec::new();

    for entry in fs::read_dir(sysfs_root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let dir = entry.path();

        if read_attr(&dir, "operstate").as_deref() != Some("up") {
            continue;
        }
        if read_attr(&dir, "type").as_deref() == Some(ARPHRD_LOOPBACK) {
            continue;
        }
        let Some(index) = read_attr(&dir, "ifindex").and_then(|v| v.parse::<u32>().ok()) else {
            debug!(interface = %name, "Skipping interface without ifindex");
            continue;
        };

        handles.push(NetworkHandle::new(index, name));
    }

    handles.sort_by_key(NetworkHandle::id);
    Ok(handles)
}

/// Derive transport flags from an interface's sysfs directory
pub fn classify_interface(dir: &Path) -> Transports {
    let mut transports = Transports::empty();

    if dir.join("wireless").is_dir() || dir.join("phy80211").exists() {
        transports |= Transports::WIFI;
    }
    if dir.join("tun_flags").exists() {
        transports |= Transports::VPN;
    }

    match uevent_devtype(dir).as_deref() {
        Some("wlan") => transports |= Transports::WIFI,
        Some("wwan") => transports |= Transports::CELLULAR,
        Some("bluetooth") => transports |= Transports::BLUETOOTH,
        Some("wireguard") => transports |= Transports::VPN,
        _ => {}
    }

    if transports.is_empty() && read_attr(dir, "type").as_deref() == Some(ARPHRD_ETHER) {
        transports |= Transports::ETHERNET;
    }
    transports
}

/// Extract the SSID from `iw dev <iface> link` output
pub fn parse_iw_link(output: &str) -> Option<String> {
    if output.trim_start().starts_with("Not connected") {
        return None;
    }

    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("SSID:"))
        .map(|ssid| unescape_iw(ssid.trim()))
        .filter(|ssid| !ssid.is_empty())
}

/// Decode the `\xNN` escapes iw uses for non-printable SSID bytes
fn unescape_iw(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
            let decoded = raw
                .get(i + 2..i + 4)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn read_attr(dir: &Path, attr: &str) -> Option<String> {
    fs::read_to_string(dir.join(attr))
        .ok()
        .map(|value| value.trim().to_string())
}

fn uevent_devtype(dir: &Path) -> Option<String> {
    let uevent = fs::read_to_string(dir.join("uevent")).ok()?;
    uevent
        .lines()
        .find_map(|line| line.strip_prefix("DEVTYPE="))
        .map(|value| value.trim().to_string())
}
