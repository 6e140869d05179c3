/*!
 * Simulation Network Binding
 * In-memory platform used for tests and hosts without a native backend
 */

use super::traits::*;
use super::types::*;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
struct SimulationState {
    networks: RwLock<Vec<(NetworkHandle, Transports)>>,
    ssid: RwLock<Option<String>>,
    ssid_error: RwLock<Option<PlatformError>>,
    bound: RwLock<Option<NetworkHandle>>,
    latency: RwLock<Duration>,
    bind_succeeds: AtomicBool,
    connectivity_available: AtomicBool,
    wifi_available: AtomicBool,
    bind_calls: AtomicUsize,
    binds_in_flight: AtomicUsize,
    max_binds_in_flight: AtomicUsize,
}

/// Simulated connectivity and Wi-Fi subsystems
///
/// Clones share state, so a test can keep one handle and inspect what the
/// binder did through another.
#[derive(Debug, Clone)]
pub struct SimulationPlatform {
    state: Arc<SimulationState>,
}

impl SimulationPlatform {
    pub fn new() -> Self {
        info!("Network binding initialized (simulation mode)");
        Self {
            state: Arc::new(SimulationState {
                networks: RwLock::new(Vec::new()),
                ssid: RwLock::new(None),
                ssid_error: RwLock::new(None),
                bound: RwLock::new(None),
                latency: RwLock::new(Duration::ZERO),
                bind_succeeds: AtomicBool::new(true),
                connectivity_available: AtomicBool::new(true),
                wifi_available: AtomicBool::new(true),
                bind_calls: AtomicUsize::new(0),
                binds_in_flight: AtomicUsize::new(0),
                max_binds_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Add a network at the end of the enumeration order
    pub fn with_network(self, handle: NetworkHandle, transports: Transports) -> Self {
        self.add_network(handle, transports);
        self
    }

    /// Set the raw name reported by the Wi-Fi subsystem
    pub fn with_ssid(self, ssid: impl Into<String>) -> Self {
        self.set_ssid(Some(ssid.into()));
        self
    }

    pub fn add_network(&self, handle: NetworkHandle, transports: Transports) {
        self.state.networks.write().push((handle, transports));
    }

    pub fn remove_network(&self, handle: &NetworkHandle) {
        self.state.networks.write().retain(|(h, _)| h != handle);
    }

    pub fn set_ssid(&self, ssid: Option<String>) {
        *self.state.ssid.write() = ssid;
    }

    /// Make the next name lookups fail with `error`
    pub fn set_ssid_error(&self, error: Option<PlatformError>) {
        *self.state.ssid_error.write() = error;
    }

    pub fn set_bind_succeeds(&self, succeeds: bool) {
        self.state.bind_succeeds.store(succeeds, Ordering::SeqCst);
    }

    pub fn set_connectivity_available(&self, available: bool) {
        self.state
            .connectivity_available
            .store(available, Ordering::SeqCst);
    }

    pub fn set_wifi_available(&self, available: bool) {
        self.state.wifi_available.store(available, Ordering::SeqCst);
    }

    /// Delay every enumeration and bind call, like a slow system service
    pub fn set_latency(&self, latency: Duration) {
        *self.state.latency.write() = latency;
    }

    fn simulate_latency(&self) {
        let latency = *self.state.latency.read();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
    }

    /// Network the simulated process is bound to
    pub fn bound_network(&self) -> Option<NetworkHandle> {
        self.state.bound.read().clone()
    }

    /// Number of bind/unbind calls issued so far
    pub fn bind_calls(&self) -> usize {
        self.state.bind_calls.load(Ordering::SeqCst)
    }

    /// Highest number of bind/unbind calls ever running at the same time
    pub fn max_concurrent_binds(&self) -> usize {
        self.state.max_binds_in_flight.load(Ordering::SeqCst)
    }

    fn apply_binding(&self, handle: Option<NetworkHandle>) -> bool {
        let mut bound = self.state.bound.write();
        match handle {
            Some(handle) => {
                if !self.state.bind_succeeds.load(Ordering::SeqCst) {
                    return false;
                }
                *bound = Some(handle);
                true
            }
            // Unbinding reports whether there was anything to release.
            None => bound.take().is_some(),
        }
    }
}

impl Default for SimulationPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformServices for SimulationPlatform {
    fn connectivity(&self) -> Option<Arc<dyn ConnectivityProvider>> {
        self.state
            .connectivity_available
            .load(Ordering::SeqCst)
            .then(|| Arc::new(self.clone()) as Arc<dyn ConnectivityProvider>)
    }

    fn wifi_info(&self) -> Option<Arc<dyn WifiInfoProvider>> {
        self.state
            .wifi_available
            .load(Ordering::SeqCst)
            .then(|| Arc::new(self.clone()) as Arc<dyn WifiInfoProvider>)
    }

    fn platform(&self) -> PlatformType {
        PlatformType::Simulation
    }
}

impl ConnectivityProvider for SimulationPlatform {
    fn list_networks(&self) -> PlatformResult<Vec<NetworkHandle>> {
        self.simulate_latency();
        Ok(self
            .state
            .networks
            .read()
            .iter()
            .map(|(handle, _)| handle.clone())
            .collect())
    }

    fn capabilities_of(&self, handle: &NetworkHandle) -> Option<NetworkCapabilitySet> {
        self.state
            .networks
            .read()
            .iter()
            .find(|(h, _)| h == handle)
            .map(|(_, transports)| *transports)
    }

    fn bind_process(&self, handle: Option<NetworkHandle>) -> bool {
        let in_flight = self.state.binds_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .max_binds_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        self.simulate_latency();
        self.state.bind_calls.fetch_add(1, Ordering::SeqCst);
        let applied = self.apply_binding(handle);

        self.state.binds_in_flight.fetch_sub(1, Ordering::SeqCst);
        applied
    }
}

impl WifiInfoProvider for SimulationPlatform {
    fn current_network_name(&self) -> PlatformResult<Option<String>> {
        if let Some(error) = self.state.ssid_error.read().clone() {
            return Err(error);
        }
        Ok(self.state.ssid.read().clone())
    }
}
