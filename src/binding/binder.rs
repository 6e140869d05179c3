/*!
 * Network Binder
 * Select the active Wi-Fi network and pin the process to it
 */

use super::ssid::resolve_current_wifi_name;
use super::traits::*;
use super::types::*;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Core bind/clear logic over injected platform services
///
/// Holds no state besides the lock that serializes bind and clear; the
/// binding itself lives in the platform.
pub struct NetworkBinder {
    services: Arc<dyn PlatformServices>,
    serial: Mutex<()>,
}

impl NetworkBinder {
    pub fn new(services: Arc<dyn PlatformServices>) -> Self {
        Self {
            services,
            serial: Mutex::new(()),
        }
    }

    pub fn platform(&self) -> PlatformType {
        self.services.platform()
    }

    /// Bind the process to the first active Wi-Fi network
    ///
    /// When `request.expected_name` is set and the current name is known,
    /// the two must match exactly or no binding is attempted.
    pub fn bind(&self, request: &BindingRequest) -> BinderResult<BindingResult> {
        self.bind_committed(request, || true)
    }

    /// Bind like [`bind`](Self::bind), but let `commit` veto the new binding
    ///
    /// `commit` runs after the platform accepted the binding and before the
    /// lock is released. When it returns `false` the binding is dropped again
    /// and the result reports `success: false`.
    #[instrument(skip(self, request, commit), fields(expected = ?request.expected_name))]
    pub fn bind_committed<C>(&self, request: &BindingRequest, commit: C) -> BinderResult<BindingResult>
    where
        C: FnOnce() -> bool,
    {
        let _guard = self.serial.lock();

        let connectivity = self
            .services
            .connectivity()
            .ok_or(BindingError::ServiceUnavailable)?;

        let wifi_network = Self::select_wifi_network(connectivity.as_ref())?;
        debug!(network = %wifi_network, "Selected Wi-Fi network");

        let current = resolve_current_wifi_name(self.services.as_ref());

        if let (Some(expected), Some(observed)) = (&request.expected_name, &current) {
            if expected != observed {
                debug!(%expected, %observed, "Associated network does not match");
                return Err(BindingError::NameMismatch {
                    expected: expected.clone(),
                    observed: observed.clone(),
                });
            }
        }

        if !connectivity.bind_process(Some(wifi_network.clone())) {
            return Err(BindingError::BindFailed);
        }

        if !commit() {
            let released = connectivity.bind_process(None);
            warn!(network = %wifi_network, released, "Binding abandoned by caller, released");
            return Ok(BindingResult {
                success: false,
                observed_name: current,
            });
        }

        info!(network = %wifi_network, ssid = ?current, "Process bound to Wi-Fi network");
        Ok(BindingResult::bound(current))
    }

    /// Remove any process binding
    ///
    /// A `false` result from the platform is reported, not raised.
    #[instrument(skip(self))]
    pub fn clear_binding(&self) -> BinderResult<BindingResult> {
        let _guard = self.serial.lock();

        let connectivity = self
            .services
            .connectivity()
            .ok_or(BindingError::ServiceUnavailable)?;

        let ok = connectivity.bind_process(None);
        info!(ok, "Process binding cleared");
        Ok(BindingResult::cleared(ok))
    }

    /// Current Wi-Fi name, `None` when unknown
    pub fn current_wifi_name(&self) -> Option<String> {
        resolve_current_wifi_name(self.services.as_ref())
    }

    fn select_wifi_network(
        connectivity: &dyn ConnectivityProvider,
    ) -> BinderResult<NetworkHandle> {
        let networks = connectivity.list_networks().map_err(|e| {
            warn!(error = %e, "Failed to enumerate networks");
            BindingError::ServiceUnavailable
        })?;

        networks
            .into_iter()
            .find(|network| {
                connectivity
                    .capabilities_of(network)
                    .is_some_and(|caps| caps.has_transport(Transports::WIFI))
            })
            .ok_or(BindingError::NoWifiNetwork)
    }
}
