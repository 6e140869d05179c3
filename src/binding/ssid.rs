/*!
 * SSID Resolution
 * Best-effort lookup of the currently associated network name
 */

use super::traits::PlatformServices;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Sentinel reported by the platform when the name is hidden or unavailable
pub const UNKNOWN_SSID: &str = "<unknown ssid>";

/// Normalize a raw platform name
///
/// Strips one pair of surrounding double quotes and maps the unknown
/// sentinel to `None`. A lone `"` cannot be unquoted and is unknown too.
pub fn normalize_ssid(raw: &str) -> Option<String> {
    if raw == "\"" {
        return None;
    }

    let name = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };

    if name.eq_ignore_ascii_case(UNKNOWN_SSID) {
        return None;
    }
    Some(name.to_string())
}

/// Resolve the current Wi-Fi name, `None` meaning unknown
///
/// Never fails: a missing service, a backend error or a panic inside the
/// provider all yield `None`.
pub fn resolve_current_wifi_name(services: &dyn PlatformServices) -> Option<String> {
    let Some(wifi) = services.wifi_info() else {
        debug!("Wi-Fi info service unavailable, name unknown");
        return None;
    };

    let raw = match catch_unwind(AssertUnwindSafe(|| wifi.current_network_name())) {
        Ok(Ok(Some(raw))) => raw,
        Ok(Ok(None)) => {
            debug!("No current connection info");
            return None;
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Wi-Fi name lookup failed, treating as unknown");
            return None;
        }
        Err(_) => {
            warn!("Wi-Fi name lookup panicked, treating as unknown");
            return None;
        }
    };

    normalize_ssid(&raw)
}
