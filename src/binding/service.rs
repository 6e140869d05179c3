/*!
 * Binding Service
 * Host-side wrapper that throttles repeated bind attempts
 */

use super::manager::BindingManager;
use super::types::*;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default window during which repeated bind attempts are skipped
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(4000);

/// Outcome of a throttled bind attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAttempt {
    /// Skipped because a previous attempt started within the throttle window
    Throttled,
    Completed(BindingResult),
    Failed(BindingError),
}

impl BindAttempt {
    pub fn is_bound(&self) -> bool {
        matches!(self, BindAttempt::Completed(result) if result.success)
    }
}

/// Throttling facade over [`BindingManager`]
///
/// Hosts tend to call bind on every connectivity change; attempts that start
/// within `throttle` of the previous one are dropped.
pub struct BindingService {
    manager: BindingManager,
    throttle: Duration,
    last_attempt: Mutex<Option<Instant>>,
}

impl BindingService {
    pub fn new(manager: BindingManager, throttle: Duration) -> Self {
        Self {
            manager,
            throttle,
            last_attempt: Mutex::new(None),
        }
    }

    /// Service with the default 4 s window
    pub fn with_default_throttle(manager: BindingManager) -> Self {
        Self::new(manager, DEFAULT_THROTTLE)
    }

    pub fn manager(&self) -> &BindingManager {
        &self.manager
    }

    /// Bind to Wi-Fi unless an attempt was made recently
    pub fn bind_to_wifi(&self, ssid: Option<&str>) -> BindAttempt {
        self.bind_to_wifi_at(ssid, Instant::now())
    }

    fn bind_to_wifi_at(&self, ssid: Option<&str>, now: Instant) -> BindAttempt {
        {
            let mut last = self.last_attempt.lock();
            if let Some(previous) = *last {
                if now.saturating_duration_since(previous) < self.throttle {
                    debug!("Bind attempt throttled");
                    return BindAttempt::Throttled;
                }
            }
            *last = Some(now);
        }

        let request = BindingRequest {
            expected_name: ssid.filter(|s| !s.is_empty()).map(str::to_string),
        };
        match self.manager.bind(&request) {
            Ok(result) => BindAttempt::Completed(result),
            Err(e) => {
                warn!(error = %e, "Wi-Fi bind attempt failed");
                BindAttempt::Failed(e)
            }
        }
    }

    /// Release the binding; never throttled
    pub fn clear_binding(&self) -> BinderResult<BindingResult> {
        self.manager.clear_binding().inspect_err(|e| {
            warn!(error = %e, "Clearing process binding failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::simulation::SimulationPlatform;
    use pretty_assertions::assert_eq;

    fn service(throttle: Duration) -> (BindingService, SimulationPlatform) {
        let sim = SimulationPlatform::new()
            .with_network(NetworkHandle::new(3, "wlan0"), Transports::WIFI)
            .with_ssid("Home");
        let service = BindingService::new(BindingManager::with_simulation(sim.clone()), throttle);
        (service, sim)
    }

    #[test]
    fn test_attempts_inside_window_are_throttled() {
        let (service, sim) = service(Duration::from_secs(4));
        let start = Instant::now();

        assert!(service.bind_to_wifi_at(Some("Home"), start).is_bound());
        assert_eq!(
            service.bind_to_wifi_at(Some("Home"), start + Duration::from_secs(3)),
            BindAttempt::Throttled
        );
        assert!(service
            .bind_to_wifi_at(Some("Home"), start + Duration::from_secs(4))
            .is_bound());
        assert_eq!(sim.bind_calls(), 2);
    }

    #[test]
    fn test_failed_attempt_still_starts_window() {
        let (service, sim) = service(Duration::from_secs(4));
        let start = Instant::now();

        assert_eq!(
            service.bind_to_wifi_at(Some("Office"), start),
            BindAttempt::Failed(BindingError::NameMismatch {
                expected: "Office".to_string(),
                observed: "Home".to_string(),
            })
        );
        assert_eq!(
            service.bind_to_wifi_at(None, start + Duration::from_millis(10)),
            BindAttempt::Throttled
        );
        assert_eq!(sim.bind_calls(), 0);
    }

    #[test]
    fn test_empty_ssid_means_any() {
        let (service, _sim) = service(Duration::ZERO);
        assert!(service.bind_to_wifi(Some("")).is_bound());
    }

    #[test]
    fn test_default_window() {
        let sim = SimulationPlatform::new()
            .with_network(NetworkHandle::new(3, "wlan0"), Transports::WIFI);
        let service = BindingService::with_default_throttle(BindingManager::with_simulation(sim));
        let start = Instant::now();

        assert!(service.bind_to_wifi_at(None, start).is_bound());
        assert_eq!(
            service.bind_to_wifi_at(None, start + Duration::from_millis(3999)),
            BindAttempt::Throttled
        );
    }

    #[test]
    fn test_clear_is_not_throttled() {
        let (service, _sim) = service(Duration::from_secs(60));
        assert!(service.bind_to_wifi(None).is_bound());
        assert_eq!(service.clear_binding(), Ok(BindingResult::cleared(true)));
        assert_eq!(service.clear_binding(), Ok(BindingResult::cleared(false)));
    }
}
