/*!
 * Bridge Types
 * JSON shapes exchanged with the host application
 */

use crate::binding::{BindingError, BindingResult};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Plugin name the host registers the bridge under
pub const PLUGIN_NAME: &str = "WifiBinding";

pub const METHOD_BIND_TO_WIFI: &str = "bindToWifi";
pub const METHOD_CLEAR_BINDING: &str = "clearBinding";

/// Bridge-level failures, converted into rejections
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum BridgeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] BindingError),

    #[error("invalid request: {0}")]
    #[diagnostic(code(bridge::invalid_request))]
    InvalidRequest(String),

    #[error("method not implemented: {0}")]
    #[diagnostic(code(bridge::unknown_method))]
    UnknownMethod(String),

    #[error("operation timed out")]
    #[diagnostic(
        code(bridge::timeout),
        help("The platform did not answer in time. Raise WIFI_BIND_CALL_TIMEOUT_MS if this persists.")
    )]
    Timeout,

    #[error("internal error: {0}")]
    #[diagnostic(code(bridge::internal))]
    Internal(String),
}

/// `bindToWifi` parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindToWifiRequest {
    #[serde(default)]
    pub ssid: Option<String>,
}

/// `bindToWifi` resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindToWifiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
}

impl From<BindingResult> for BindToWifiResponse {
    fn from(result: BindingResult) -> Self {
        Self {
            ok: result.success,
            ssid: result.observed_name,
        }
    }
}

/// `clearBinding` resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearBindingResponse {
    pub ok: bool,
}

impl From<BindingResult> for ClearBindingResponse {
    fn from(result: BindingResult) -> Self {
        Self { ok: result.success }
    }
}

/// One call from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeCall {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Reply to one call, echoing its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeReply {
    pub id: Value,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Resolved { data: Value },
    Rejected { message: String },
}

impl CallOutcome {
    pub fn rejected(error: &BridgeError) -> Self {
        CallOutcome::Rejected {
            message: error.to_string(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CallOutcome::Resolved { .. })
    }
}
