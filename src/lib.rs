/*!
 * Wi-Fi Binder Library
 * Bind the current process's traffic to the active Wi-Fi network
 */

pub mod binding;
pub mod bridge;
pub mod config;
pub mod monitoring;

// Re-exports
pub use binding::{
    BindAttempt, BinderResult, BindingError, BindingManager, BindingRequest, BindingResult,
    BindingService, NetworkBinder, NetworkHandle, PlatformType, SimulationPlatform, Transports,
};
pub use bridge::{serve, WifiBindingBridge};
pub use config::BinderConfig;
pub use monitoring::init_tracing;
