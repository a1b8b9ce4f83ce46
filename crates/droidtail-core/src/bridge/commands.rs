//! Typed argument construction for bridge invocations.

/// A bridge command, independent of the executable path and target device.
#[derive(Debug, Clone)]
pub enum BridgeCommand {
    Version,
    Devices { long: bool },
    /// Dump a bounded snapshot of the device log (`-d`), newest `lines`
    /// entries, optionally restricted by a `*:<LEVEL>` filterspec.
    Logcat {
        lines: u32,
        filter: Option<&'static str>,
    },
    /// Clear the device-side log buffer.
    ClearLog,
}

impl BridgeCommand {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            BridgeCommand::Version => vec!["version".into()],
            BridgeCommand::Devices { long } => {
                let mut args = vec!["devices".into()];
                if *long {
                    args.push("-l".into());
                }
                args
            }
            BridgeCommand::Logcat { lines, filter } => {
                let mut args = vec![
                    "logcat".into(),
                    "-d".into(),
                    "-v".into(),
                    "time".into(),
                    "-t".into(),
                    lines.to_string(),
                ];
                if let Some(spec) = filter {
                    args.push((*spec).into());
                }
                args
            }
            BridgeCommand::ClearLog => vec!["logcat".into(), "-c".into()],
        }
    }

    /// Full argument list, prefixed with `-s <id>` when targeting a device.
    pub fn to_args_for(&self, device_id: Option<&str>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(id) = device_id {
            args.push("-s".into());
            args.push(id.to_string());
        }
        args.extend(self.to_args());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devices_args() {
        assert_eq!(
            BridgeCommand::Devices { long: true }.to_args(),
            vec!["devices", "-l"]
        );
    }

    #[test]
    fn test_logcat_with_filter() {
        let args = BridgeCommand::Logcat {
            lines: 200,
            filter: Some("*:E"),
        }
        .to_args();
        assert_eq!(args, vec!["logcat", "-d", "-v", "time", "-t", "200", "*:E"]);
    }

    #[test]
    fn test_logcat_without_filter() {
        let args = BridgeCommand::Logcat {
            lines: 100,
            filter: None,
        }
        .to_args();
        assert_eq!(args, vec!["logcat", "-d", "-v", "time", "-t", "100"]);
    }

    #[test]
    fn test_device_targeting() {
        let args = BridgeCommand::ClearLog.to_args_for(Some("emulator-5554"));
        assert_eq!(args, vec!["-s", "emulator-5554", "logcat", "-c"]);
    }
}
