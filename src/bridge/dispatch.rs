/*!
 * Bridge Dispatch
 * Route host calls to the binding manager under a bounded timeout
 */

use super::types::*;
use crate::binding::{BinderResult, BindingManager, BindingRequest};
use crate::monitoring::{call_span, generate_trace_id};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn, Instrument};

/// Host-facing `WifiBinding` plugin
#[derive(Clone)]
pub struct WifiBindingBridge {
    manager: BindingManager,
    call_timeout: Duration,
}

impl WifiBindingBridge {
    pub fn new(manager: BindingManager, call_timeout: Duration) -> Self {
        Self {
            manager,
            call_timeout,
        }
    }

    pub fn manager(&self) -> &BindingManager {
        &self.manager
    }

    /// Handle one call and build the reply
    pub async fn handle(&self, call: BridgeCall) -> BridgeReply {
        let trace_id = generate_trace_id();
        let span = call_span(&call.method, &trace_id);

        let outcome = match self.dispatch(&call.method, call.params).instrument(span).await {
            Ok(data) => CallOutcome::Resolved { data },
            Err(e) => {
                debug!(method = %call.method, error = %e, "Call rejected");
                CallOutcome::rejected(&e)
            }
        };

        BridgeReply {
            id: call.id,
            outcome,
        }
    }

    /// Run a named method with JSON parameters
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        match method {
            METHOD_BIND_TO_WIFI => {
                let params: BindToWifiRequest = parse_params(params)?;
                let request = BindingRequest {
                    expected_name: params.ssid,
                };
                let result = self
                    .run_blocking(move |m, call| m.bind_committed(&request, || call.commit()))
                    .await?;
                to_data(BindToWifiResponse::from(result))
            }
            METHOD_CLEAR_BINDING => {
                let result = self.run_blocking(|m, _| m.clear_binding()).await?;
                to_data(ClearBindingResponse::from(result))
            }
            other => Err(BridgeError::UnknownMethod(other.to_string())),
        }
    }

    /// Run `op` on the blocking pool, giving up after `call_timeout`
    ///
    /// An operation that commits before the deadline is always waited for.
    /// One that has not committed by then is abandoned and must undo itself.
    async fn run_blocking<F, T>(&self, op: F) -> Result<T, BridgeError>
    where
        F: FnOnce(&BindingManager, &PendingCall) -> BinderResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let manager = self.manager.clone();
        let call = PendingCall::default();
        let worker = call.clone();
        let mut task = tokio::task::spawn_blocking(move || op(&manager, &worker));

        let waited = tokio::time::timeout(self.call_timeout, &mut task).await;
        let joined = match waited {
            Ok(joined) => joined,
            Err(_) if call.abandon() => {
                warn!(timeout_ms = self.call_timeout.as_millis() as u64, "Binding call timed out");
                return Err(BridgeError::Timeout);
            }
            Err(_) => {
                debug!("Call committed at the deadline, waiting for its result");
                task.await
            }
        };

        match joined {
            Ok(result) => result.map_err(BridgeError::from),
            Err(e) => {
                warn!(error = %e, "Binding task failed");
                Err(BridgeError::Internal(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum CallState {
    #[default]
    Pending,
    Committed,
    Abandoned,
}

/// Agreement between a blocking call and the caller waiting on it
///
/// Exactly one side wins: either the call commits and its result is
/// delivered, or the caller abandons it and the call rolls back.
#[derive(Debug, Clone, Default)]
struct PendingCall(Arc<Mutex<CallState>>);

impl PendingCall {
    /// Blocking side: `false` if the caller already gave up
    fn commit(&self) -> bool {
        let mut state = self.0.lock();
        if *state == CallState::Abandoned {
            return false;
        }
        *state = CallState::Committed;
        true
    }

    /// Waiting side: `false` if the call already committed
    fn abandon(&self) -> bool {
        let mut state = self.0.lock();
        if *state == CallState::Committed {
            return false;
        }
        *state = CallState::Abandoned;
        true
    }
}

fn parse_params<T>(params: Value) -> Result<T, BridgeError>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|e| BridgeError::InvalidRequest(e.to_string()))
}

fn to_data<T: Serialize>(response: T) -> Result<Value, BridgeError> {
    serde_json::to_value(response).map_err(|e| BridgeError::Internal(e.to_string()))
}
