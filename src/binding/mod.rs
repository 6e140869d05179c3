/*!
 * Process Network Binding Module
 * Pin the process to the active Wi-Fi network, with platform-specific backends
 */

mod binder;
pub mod linux;
mod manager;
mod service;
mod simulation;
pub mod socket;
mod ssid;
mod traits;
mod types;

pub use binder::NetworkBinder;
pub use linux::{process_binding, LinuxPlatform};
pub use manager::BindingManager;
pub use service::{BindAttempt, BindingService, DEFAULT_THROTTLE};
pub use simulation::SimulationPlatform;
pub use ssid::{normalize_ssid, resolve_current_wifi_name, UNKNOWN_SSID};
pub use traits::*;
pub use types::*;
