//! `adb` process implementation of the [`Bridge`] trait.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::types::{ConnectionStatus, Device};

use super::commands::BridgeCommand;
use super::Bridge;

/// Default timeout for a single bridge invocation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bridge implementation that shells out to the `adb` executable.
pub struct AdbBridge {
    adb_path: PathBuf,
    timeout: Duration,
}

impl AdbBridge {
    /// Create a bridge, discovering the `adb` executable from the SDK
    /// environment or falling back to `PATH`.
    pub fn new() -> Self {
        Self {
            adb_path: discover_adb(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a bridge with an explicit executable path.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            adb_path: path.as_ref().to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn adb_path(&self) -> &Path {
        &self.adb_path
    }

    /// Health probe: the bridge's version banner, first line only.
    pub async fn version(&self) -> Result<String> {
        let out = self.run(&BridgeCommand::Version.to_args_for(None)).await?;
        Ok(out.lines().next().unwrap_or_default().to_string())
    }

    /// Run one bridge invocation to completion under the timeout.
    async fn run(&self, args: &[String]) -> Result<String> {
        debug!(adb = %self.adb_path.display(), ?args, "bridge exec");

        let output = timeout(
            self.timeout,
            Command::new(&self.adb_path)
                .args(args)
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .map_err(|_| {
            CoreError::BridgeUnavailable(format!(
                "'{}' timed out after {:?}",
                self.adb_path.display(),
                self.timeout
            ))
        })?
        .map_err(|e| {
            CoreError::BridgeUnavailable(format!("'{}': {}", self.adb_path.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge for AdbBridge {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>>> + Send {
        async move {
            let out = self
                .run(&BridgeCommand::Devices { long: true }.to_args_for(None))
                .await?;
            Ok(parse_devices_output(&out))
        }
    }

    fn get_log(
        &self,
        device_id: &str,
        lines: u32,
        filter: Option<&'static str>,
    ) -> impl Future<Output = Result<String>> + Send {
        let cmd = BridgeCommand::Logcat { lines, filter };
        async move { self.run(&cmd.to_args_for(Some(device_id))).await }
    }

    fn clear_log(&self, device_id: &str) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.run(&BridgeCommand::ClearLog.to_args_for(Some(device_id)))
                .await?;
            Ok(())
        }
    }
}

/// Find the `adb` executable: SDK platform-tools first, then `PATH`.
fn discover_adb() -> PathBuf {
    let exe = if cfg!(windows) { "adb.exe" } else { "adb" };

    for var in ["ANDROID_HOME", "ANDROID_SDK_ROOT"] {
        if let Ok(sdk) = std::env::var(var) {
            let candidate = Path::new(&sdk).join("platform-tools").join(exe);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    PathBuf::from(exe)
}

/// Map a non-zero bridge exit to the error taxonomy by inspecting stderr.
fn classify_failure(stderr: &str) -> CoreError {
    let lower = stderr.to_lowercase();
    if lower.contains("not found") || lower.contains("offline") || lower.contains("no devices") {
        CoreError::DeviceDisconnected(stderr.to_string())
    } else if lower.contains("cannot connect") || lower.contains("daemon") {
        CoreError::BridgeUnavailable(stderr.to_string())
    } else {
        CoreError::CommandFailed(stderr.to_string())
    }
}

/// Parse `devices -l` output, preserving bridge-reported order.
///
/// Expected shape: a banner line, then one `<serial> <state> [k:v ...]`
/// row per device.
fn parse_devices_output(out: &str) -> Vec<Device> {
    out.lines()
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?;
            let state = parts.next()?;
            let model = parts
                .find_map(|tok| tok.strip_prefix("model:"))
                .map(str::to_string);
            Some(Device {
                id: id.to_string(),
                status: ConnectionStatus::from(state),
                model,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "List of devices attached\n\
        emulator-5554          device product:sdk_gphone64 model:sdk_gphone64_x86_64 device:emu64x transport_id:1\n\
        0A281FDD40091U         unauthorized usb:1-2 transport_id:2\n\
        192.168.1.20:5555      offline transport_id:3\n";

    #[test]
    fn test_parse_devices_output() {
        let devices = parse_devices_output(SAMPLE);
        assert_eq!(devices.len(), 3);

        assert_eq!(devices[0].id, "emulator-5554");
        assert_eq!(devices[0].status, ConnectionStatus::Ready);
        assert_eq!(devices[0].model.as_deref(), Some("sdk_gphone64_x86_64"));

        assert_eq!(devices[1].status, ConnectionStatus::Unauthorized);
        assert_eq!(devices[1].model, None);

        assert_eq!(devices[2].id, "192.168.1.20:5555");
        assert_eq!(devices[2].status, ConnectionStatus::Offline);
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_devices_output("List of devices attached\n").is_empty());
        assert!(parse_devices_output("").is_empty());
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("error: device 'emulator-5554' not found"),
            CoreError::DeviceDisconnected(_)
        ));
        assert!(matches!(
            classify_failure("cannot connect to daemon at tcp:5037"),
            CoreError::BridgeUnavailable(_)
        ));
        assert!(matches!(
            classify_failure("error: unknown command wibble"),
            CoreError::CommandFailed(_)
        ));
    }
}
