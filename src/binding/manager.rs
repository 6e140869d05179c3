/*!
 * Network Binding Manager
 * Platform-aware entry point for binding the process to Wi-Fi
 */

use super::binder::NetworkBinder;
use super::linux::LinuxPlatform;
use super::simulation::SimulationPlatform;
use super::traits::*;
use super::types::*;
use crate::config::BinderConfig;
use std::sync::Arc;
use tracing::info;

/// Unified binding manager that selects the appropriate platform implementation
#[derive(Clone)]
pub struct BindingManager {
    provider: BindingProviderImpl,
    binder: Arc<NetworkBinder>,
}

/// Platform-specific provider implementations
#[derive(Clone)]
enum BindingProviderImpl {
    Linux(LinuxPlatform),
    Simulation(SimulationPlatform),
}

impl BindingProviderImpl {
    fn services(&self) -> Arc<dyn PlatformServices> {
        match self {
            BindingProviderImpl::Linux(p) => Arc::new(p.clone()),
            BindingProviderImpl::Simulation(p) => Arc::new(p.clone()),
        }
    }
}

impl BindingManager {
    /// Create a new manager, auto-detecting the best implementation
    pub fn new() -> Self {
        Self::from_config(&BinderConfig::default())
    }

    /// Create a manager using the paths and overrides in `config`
    pub fn from_config(config: &BinderConfig) -> Self {
        let provider = Self::select_provider(config);
        let platform_name = match &provider {
            BindingProviderImpl::Linux(_) => "Linux (sysfs + SO_BINDTODEVICE)",
            BindingProviderImpl::Simulation(_) => "Simulation",
        };
        info!(platform = platform_name, "Network binding manager initialized");
        Self::with_provider(provider)
    }

    /// Use a caller-prepared simulation platform
    pub fn with_simulation(platform: SimulationPlatform) -> Self {
        Self::with_provider(BindingProviderImpl::Simulation(platform))
    }

    fn with_provider(provider: BindingProviderImpl) -> Self {
        let binder = Arc::new(NetworkBinder::new(provider.services()));
        Self { provider, binder }
    }

    fn select_provider(config: &BinderConfig) -> BindingProviderImpl {
        if !config.force_simulation {
            let linux = LinuxPlatform::with_paths(&config.sysfs_root, &config.iw_path);
            if linux.is_supported() {
                return BindingProviderImpl::Linux(linux);
            }
        }

        // Fallback to simulation mode
        BindingProviderImpl::Simulation(SimulationPlatform::new())
    }

    /// Get the current platform type
    pub fn platform(&self) -> PlatformType {
        self.binder.platform()
    }

    /// Check if binding affects real OS traffic
    pub fn has_native_binding(&self) -> bool {
        matches!(self.provider, BindingProviderImpl::Linux(_))
    }

    /// Simulation backend, when selected
    pub fn simulation(&self) -> Option<&SimulationPlatform> {
        match &self.provider {
            BindingProviderImpl::Simulation(p) => Some(p),
            BindingProviderImpl::Linux(_) => None,
        }
    }

    /// Bind the process to the active Wi-Fi network
    pub fn bind(&self, request: &BindingRequest) -> BinderResult<BindingResult> {
        self.binder.bind(request)
    }

    /// Bind, keeping the binding only if `commit` agrees
    pub fn bind_committed<C>(&self, request: &BindingRequest, commit: C) -> BinderResult<BindingResult>
    where
        C: FnOnce() -> bool,
    {
        self.binder.bind_committed(request, commit)
    }

    /// Release any process binding
    pub fn clear_binding(&self) -> BinderResult<BindingResult> {
        self.binder.clear_binding()
    }

    /// Current Wi-Fi name, `None` when unknown
    pub fn current_wifi_name(&self) -> Option<String> {
        self.binder.current_wifi_name()
    }
}

impl Default for BindingManager {
    fn default() -> Self {
        Self::new()
    }
}
