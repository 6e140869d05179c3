/*!
 * Network Binding Traits
 * Platform-agnostic abstractions over the OS connectivity subsystem
 */

use super::types::*;
use std::sync::Arc;

/// Access to the platform services a binder needs
///
/// Either service may be absent, in which case the getter returns `None`.
pub trait PlatformServices: Send + Sync {
    /// Connectivity service used to enumerate and bind networks
    fn connectivity(&self) -> Option<Arc<dyn ConnectivityProvider>>;

    /// Wi-Fi subsystem used to read the associated network name
    fn wifi_info(&self) -> Option<Arc<dyn WifiInfoProvider>>;

    /// Get the platform type
    fn platform(&self) -> PlatformType;
}

/// Network enumeration and process binding
pub trait ConnectivityProvider: Send + Sync {
    /// List all currently known networks, in system order
    fn list_networks(&self) -> PlatformResult<Vec<NetworkHandle>>;

    /// Transport flags of a network, `None` if the network is gone
    fn capabilities_of(&self, handle: &NetworkHandle) -> Option<NetworkCapabilitySet>;

    /// Bind the whole process to `handle`, or unbind it with `None`
    fn bind_process(&self, handle: Option<NetworkHandle>) -> bool;
}

/// Wireless association info
pub trait WifiInfoProvider: Send + Sync {
    /// Raw name of the currently associated network, as reported by the platform
    fn current_network_name(&self) -> PlatformResult<Option<String>>;
}
