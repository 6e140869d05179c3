/*!
 * Network Binding Types
 * Platform-agnostic types for process network binding
 */

use bitflags::bitflags;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for binder operations
pub type BinderResult<T> = Result<T, BindingError>;

/// Result type for platform backend operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors surfaced to the caller of a bind or clear operation
///
/// The display strings double as the bridge rejection messages.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum BindingError {
    #[error("connectivity service unavailable")]
    #[diagnostic(
        code(binding::service_unavailable),
        help("The platform connectivity service could not be reached.")
    )]
    ServiceUnavailable,

    #[error("no Wi-Fi network found")]
    #[diagnostic(
        code(binding::no_wifi_network),
        help("No active network advertises the Wi-Fi transport. Check that Wi-Fi is on and associated.")
    )]
    NoWifiNetwork,

    #[error("current SSID differs from expected: {observed}")]
    #[diagnostic(
        code(binding::name_mismatch),
        help("The device is associated with a different network than requested.")
    )]
    NameMismatch { expected: String, observed: String },

    #[error("failed to bind process to Wi-Fi network")]
    #[diagnostic(
        code(binding::bind_failed),
        help("The platform refused the binding. The interface may have gone away or permissions are missing.")
    )]
    BindFailed,
}

/// Errors raised inside a platform backend
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PlatformError {
    #[error("Command failed: {0}")]
    #[diagnostic(
        code(platform::command_failed),
        help("Make sure the wireless tools are installed and on PATH.")
    )]
    CommandFailed(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(platform::io))]
    IoError(String),
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        PlatformError::IoError(err.to_string())
    }
}

bitflags! {
    /// Transport kinds advertised by a network.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Transports: u8 {
        const WIFI = 1 << 0;
        const CELLULAR = 1 << 1;
        const ETHERNET = 1 << 2;
        const BLUETOOTH = 1 << 3;
        const VPN = 1 << 4;
    }
}

/// Capability set attached to a network handle
pub type NetworkCapabilitySet = Transports;

impl Transports {
    pub fn has_transport(&self, transport: Transports) -> bool {
        self.contains(transport)
    }
}

/// Opaque reference to an OS-level network
///
/// Resolved fresh on every bind and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkHandle {
    id: u32,
    interface: String,
}

impl NetworkHandle {
    pub fn new(id: u32, interface: impl Into<String>) -> Self {
        Self {
            id,
            interface: interface.into(),
        }
    }

    /// OS identifier (interface index on Linux)
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl std::fmt::Display for NetworkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}#{}", self.interface, self.id)
    }
}

/// Input of a bind operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRequest {
    /// Network name the caller expects to be associated with
    pub expected_name: Option<String>,
}

impl BindingRequest {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn expecting(name: impl Into<String>) -> Self {
        Self {
            expected_name: Some(name.into()),
        }
    }
}

/// Output of a bind or clear operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingResult {
    pub success: bool,
    /// Resolved network name, `None` when unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_name: Option<String>,
}

impl BindingResult {
    pub fn bound(observed_name: Option<String>) -> Self {
        Self {
            success: true,
            observed_name,
        }
    }

    pub fn cleared(success: bool) -> Self {
        Self {
            success,
            observed_name: None,
        }
    }
}

/// Platform implementation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    /// Linux sysfs enumeration with socket device binding
    LinuxSysfs,
    /// In-memory simulation
    Simulation,
}
