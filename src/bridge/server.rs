/*!
 * Line-Delimited Bridge Server
 * One JSON call per input line, one JSON reply per output line
 */

use super::dispatch::WifiBindingBridge;
use super::types::*;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Serve calls until the reader reaches end of input
///
/// Calls are handled one at a time, in arrival order.
pub async fn serve<R, W>(bridge: &WifiBindingBridge, reader: R, mut writer: W) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<BridgeCall>(line) {
            Ok(call) => bridge.handle(call).await,
            Err(e) => {
                debug!(error = %e, "Malformed call");
                BridgeReply {
                    id: Value::Null,
                    outcome: CallOutcome::rejected(&BridgeError::InvalidRequest(e.to_string())),
                }
            }
        };

        let mut encoded = serde_json::to_vec(&reply)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(handled, "Bridge input closed");
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingManager, NetworkHandle, SimulationPlatform, Transports};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_serve_lines() {
        let sim = SimulationPlatform::new()
            .with_network(NetworkHandle::new(3, "wlan0"), Transports::WIFI)
            .with_ssid("Home");
        let bridge = WifiBindingBridge::new(
            BindingManager::with_simulation(sim),
            Duration::from_secs(5),
        );

        let input = concat!(
            r#"{"id":1,"method":"bindToWifi","params":{"ssid":"Home"}}"#,
            "\n\n",
            "not json\n",
            r#"{"id":2,"method":"clearBinding"}"#,
            "\n",
        );
        let mut output = Vec::new();

        let handled = serve(&bridge, input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(handled, 3);

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            replies[0],
            json!({ "id": 1, "status": "resolved", "data": { "ok": true, "ssid": "Home" } })
        );
        assert_eq!(replies[1]["status"], "rejected");
        assert_eq!(replies[1]["id"], Value::Null);
        assert_eq!(
            replies[2],
            json!({ "id": 2, "status": "resolved", "data": { "ok": true } })
        );
    }
}
