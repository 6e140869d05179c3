/*!
 * Wi-Fi Binder - Bridge Entry Point
 *
 * Reads `WifiBinding` plugin calls as JSON lines on stdin and answers on
 * stdout. Logs go to stderr.
 */

use anyhow::Context;
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;

use wifi_binder::{init_tracing, serve, BinderConfig, BindingManager, WifiBindingBridge};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(BinderConfig::trace_json_from_env());
    let config = BinderConfig::from_env();

    info!(
        sysfs_root = %config.sysfs_root.display(),
        call_timeout_ms = config.call_timeout.as_millis() as u64,
        "Wi-Fi binder starting"
    );

    let manager = BindingManager::from_config(&config);
    info!(platform = ?manager.platform(), native = manager.has_native_binding(), "Platform selected");

    let bridge = WifiBindingBridge::new(manager, config.call_timeout);
    let handled = serve(&bridge, BufReader::new(stdin()), stdout())
        .await
        .context("bridge I/O failed")?;

    info!(handled, "Wi-Fi binder exiting");
    Ok(())
}
