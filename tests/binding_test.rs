/*!
 * Process Network Binding Tests
 * End-to-end behavior of bind and clear against the simulation platform
 */

use pretty_assertions::assert_eq;
use wifi_binder::binding::*;
use wifi_binder::BinderConfig;

fn wlan() -> NetworkHandle {
    NetworkHandle::new(3, "wlan0")
}

fn manager_with(sim: &SimulationPlatform) -> BindingManager {
    BindingManager::with_simulation(sim.clone())
}

#[test]
fn test_bind_without_expected_name_ignores_resolved_name() {
    for ssid in [None, Some("Home"), Some("<unknown ssid>"), Some("\"Guest\"")] {
        let sim = SimulationPlatform::new().with_network(wlan(), Transports::WIFI);
        sim.set_ssid(ssid.map(str::to_string));

        let result = manager_with(&sim).bind(&BindingRequest::any()).unwrap();
        assert!(result.success, "bind failed for ssid {:?}", ssid);
        assert_eq!(sim.bound_network(), Some(wlan()));
    }
}

#[test]
fn test_no_wifi_regardless_of_expected_name() {
    let sim = SimulationPlatform::new()
        .with_network(NetworkHandle::new(1, "eth0"), Transports::ETHERNET)
        .with_network(NetworkHandle::new(2, "wwan0"), Transports::CELLULAR)
        .with_network(NetworkHandle::new(5, "tun0"), Transports::VPN)
        .with_ssid("Home");
    let manager = manager_with(&sim);

    for request in [BindingRequest::any(), BindingRequest::expecting("Home")] {
        assert_eq!(manager.bind(&request), Err(BindingError::NoWifiNetwork));
    }
    assert_eq!(sim.bind_calls(), 0);
}

#[test]
fn test_mismatch_does_not_touch_binding() {
    let sim = SimulationPlatform::new()
        .with_network(wlan(), Transports::WIFI)
        .with_ssid("Office");

    let result = manager_with(&sim).bind(&BindingRequest::expecting("Home"));

    match result {
        Err(BindingError::NameMismatch { observed, .. }) => assert_eq!(observed, "Office"),
        other => panic!("expected mismatch, got {:?}", other),
    }
    assert_eq!(sim.bind_calls(), 0);
    assert_eq!(sim.bound_network(), None);
}

#[test]
fn test_unknown_name_proceeds_to_bind() {
    let sim = SimulationPlatform::new().with_network(wlan(), Transports::WIFI);
    let manager = manager_with(&sim);

    let result = manager.bind(&BindingRequest::expecting("Home")).unwrap();
    assert_eq!(result, BindingResult::bound(None));
    assert_eq!(sim.bind_calls(), 1);

    sim.set_ssid_error(Some(PlatformError::CommandFailed("iw missing".into())));
    assert!(manager.bind(&BindingRequest::expecting("Home")).is_ok());

    sim.set_wifi_available(false);
    assert!(manager.bind(&BindingRequest::expecting("Home")).is_ok());
    assert_eq!(sim.bind_calls(), 3);
}

#[test]
fn test_wifi_with_other_transports_counts() {
    let sim = SimulationPlatform::new()
        .with_network(NetworkHandle::new(1, "eth0"), Transports::ETHERNET)
        .with_network(wlan(), Transports::WIFI | Transports::VPN);

    assert!(manager_with(&sim).bind(&BindingRequest::any()).is_ok());
    assert_eq!(sim.bound_network(), Some(wlan()));
}

#[test]
fn test_new_bind_replaces_previous() {
    let sim = SimulationPlatform::new()
        .with_network(NetworkHandle::new(7, "wlan1"), Transports::WIFI)
        .with_network(wlan(), Transports::WIFI);
    let manager = manager_with(&sim);

    manager.bind(&BindingRequest::any()).unwrap();
    assert_eq!(sim.bound_network(), Some(NetworkHandle::new(7, "wlan1")));

    sim.remove_network(&NetworkHandle::new(7, "wlan1"));
    manager.bind(&BindingRequest::any()).unwrap();
    assert_eq!(sim.bound_network(), Some(wlan()));
}

#[test]
fn test_bind_refused_by_platform() {
    let sim = SimulationPlatform::new().with_network(wlan(), Transports::WIFI);
    sim.set_bind_succeeds(false);

    assert_eq!(
        manager_with(&sim).bind(&BindingRequest::any()),
        Err(BindingError::BindFailed)
    );
}

#[test]
fn test_clear_never_raises_selection_errors() {
    let sim = SimulationPlatform::new().with_ssid("Office");
    let manager = manager_with(&sim);

    // No Wi-Fi network and a mismatching name are irrelevant to clearing.
    assert_eq!(manager.clear_binding(), Ok(BindingResult::cleared(false)));
    assert_eq!(manager.clear_binding(), Ok(BindingResult::cleared(false)));

    sim.set_connectivity_available(false);
    assert_eq!(manager.clear_binding(), Err(BindingError::ServiceUnavailable));
    assert_eq!(
        manager.bind(&BindingRequest::any()),
        Err(BindingError::ServiceUnavailable)
    );
}

#[test]
fn test_current_wifi_name_normalized() {
    let sim = SimulationPlatform::new().with_ssid("\"Guest\"");
    let manager = manager_with(&sim);
    assert_eq!(manager.current_wifi_name(), Some("Guest".to_string()));

    sim.set_ssid(Some("<Unknown SSID>".to_string()));
    assert_eq!(manager.current_wifi_name(), None);
}

#[test]
fn test_concurrent_binds_are_serialized() {
    let sim = SimulationPlatform::new()
        .with_network(wlan(), Transports::WIFI)
        .with_ssid("Home");
    sim.set_latency(std::time::Duration::from_millis(20));
    let manager = manager_with(&sim);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                if i % 2 == 0 {
                    manager.bind(&BindingRequest::expecting("Home")).map(|r| r.success)
                } else {
                    manager.clear_binding().map(|_| true)
                }
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(true));
    }
    assert_eq!(sim.bind_calls(), 8);
    assert_eq!(sim.max_concurrent_binds(), 1);
}

#[test]
fn test_manager_platform_detection() {
    let manager = BindingManager::from_config(&BinderConfig::default());
    assert!(matches!(
        manager.platform(),
        PlatformType::LinuxSysfs | PlatformType::Simulation
    ));
    assert_eq!(manager.has_native_binding(), manager.simulation().is_none());
}

#[test]
fn test_throttled_service() {
    let sim = SimulationPlatform::new()
        .with_network(wlan(), Transports::WIFI)
        .with_ssid("Home");
    let service = BindingService::new(manager_with(&sim), std::time::Duration::from_secs(60));

    assert!(service.bind_to_wifi(Some("Home")).is_bound());
    assert_eq!(service.bind_to_wifi(Some("Home")), BindAttempt::Throttled);
    assert!(service.clear_binding().unwrap().success);
    assert_eq!(sim.bind_calls(), 2);
}
