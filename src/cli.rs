use anyhow::Result;

use crate::config::{DEFAULT_MONITOR_INTERVAL, SCAN_HISTORY_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Status,
    Devices,
    History { limit: u32 },
    Alerts,
    Rename { mac: String, name: String },
    MarkRead { alert_id: i64 },
    MarkAllRead,
    Watch { interval: u64 },
    Help,
    Version,
}

/// A parsed invocation: the command plus global overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliInvocation {
    pub command: CliCommand,
    pub backend_url: Option<String>,
    pub demo: bool,
}

pub fn version_text() -> String {
    format!("nexus-console {}", env!("CARGO_PKG_VERSION"))
}

pub fn usage_text() -> String {
    format!(
        "{version}
NEXUS Console - Operator console for the NEXUS discovery engine

Usage:
  nexus-console [status]
  nexus-console devices
  nexus-console history [--limit <N>]
  nexus-console alerts
  nexus-console rename --mac <MAC> --name <NAME>
  nexus-console mark-read <ID>
  nexus-console mark-read --all
  nexus-console watch [--interval <SECONDS>]
  nexus-console --help
  nexus-console --version

Options:
      --backend <URL>       Backend base URL (default: NEXUS_CONSOLE_BACKEND or http://127.0.0.1:8787)
      --demo                Use the built-in demo backend instead of a live engine
      --limit <N>           History: number of scans to show (default: {default_limit})
      --interval <SECONDS>  Watch: monitoring interval (default: {default_interval})
      --mac <MAC>           Rename: device hardware address
      --name <NAME>         Rename: custom display name
      --all                 Mark-read: mark every unread alert
  -h, --help                Show this help text
  -V, --version             Show version",
        version = version_text(),
        default_limit = SCAN_HISTORY_LIMIT,
        default_interval = DEFAULT_MONITOR_INTERVAL,
    )
}

fn parse_u32_arg(flag: &str, raw: &str) -> Result<u32> {
    raw.parse::<u32>().ok().filter(|v| *v > 0).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid value for {}: '{}'. Expected a positive integer.\n\n{}",
            flag,
            raw,
            usage_text()
        )
    })
}

fn parse_u64_arg(flag: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid value for {}: '{}'. Expected a positive integer.\n\n{}",
            flag,
            raw,
            usage_text()
        )
    })
}

pub fn parse_cli_args<I, S>(args: I) -> Result<CliInvocation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = args.into_iter();
    let _program_name = iter.next();

    let mut command: Option<String> = None;
    let mut limit: Option<u32> = None;
    let mut interval: Option<u64> = None;
    let mut mac: Option<String> = None;
    let mut name: Option<String> = None;
    let mut all = false;
    let mut alert_id: Option<i64> = None;
    let mut backend_url: Option<String> = None;
    let mut demo = false;

    while let Some(arg) = iter.next() {
        let arg = arg.as_ref();
        match arg {
            "-h" | "--help" => {
                return Ok(CliInvocation {
                    command: CliCommand::Help,
                    backend_url: None,
                    demo: false,
                });
            }
            "-V" | "--version" => {
                return Ok(CliInvocation {
                    command: CliCommand::Version,
                    backend_url: None,
                    demo: false,
                });
            }
            "status" | "devices" | "history" | "alerts" | "rename" | "mark-read" | "watch" => {
                if command.as_deref().is_some_and(|existing| existing != arg) {
                    return Err(anyhow::anyhow!(
                        "Multiple commands provided. Use only one command.\n\n{}",
                        usage_text()
                    ));
                }
                command = Some(arg.to_string());
            }
            "--demo" => demo = true,
            "--all" => all = true,
            "--backend" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("Missing value for --backend.\n\n{}", usage_text())
                })?;
                backend_url = Some(value.as_ref().to_string());
            }
            "--limit" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("Missing value for --limit.\n\n{}", usage_text())
                })?;
                limit = Some(parse_u32_arg("--limit", value.as_ref())?);
            }
            "--interval" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("Missing value for --interval.\n\n{}", usage_text())
                })?;
                interval = Some(parse_u64_arg("--interval", value.as_ref())?);
            }
            "--mac" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("Missing value for --mac.\n\n{}", usage_text())
                })?;
                mac = Some(value.as_ref().to_string());
            }
            "--name" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("Missing value for --name.\n\n{}", usage_text())
                })?;
                name = Some(value.as_ref().to_string());
            }
            _ if arg.starts_with("--backend=") => {
                let value = arg.split_once('=').map(|(_, v)| v).unwrap_or_default();
                if value.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Missing value for --backend.\n\n{}",
                        usage_text()
                    ));
                }
                backend_url = Some(value.to_string());
            }
            _ if arg.starts_with("--limit=") => {
                let value = arg.split_once('=').map(|(_, v)| v).unwrap_or_default();
                if value.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Missing value for --limit.\n\n{}",
                        usage_text()
                    ));
                }
                limit = Some(parse_u32_arg("--limit", value)?);
            }
            _ if arg.starts_with("--interval=") => {
                let value = arg.split_once('=').map(|(_, v)| v).unwrap_or_default();
                if value.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Missing value for --interval.\n\n{}",
                        usage_text()
                    ));
                }
                interval = Some(parse_u64_arg("--interval", value)?);
            }
            _ if arg.starts_with("--mac=") => {
                let value = arg.split_once('=').map(|(_, v)| v).unwrap_or_default();
                if value.is_empty() {
                    return Err(anyhow::anyhow!("Missing value for --mac.\n\n{}", usage_text()));
                }
                mac = Some(value.to_string());
            }
            _ if arg.starts_with("--name=") => {
                let value = arg.split_once('=').map(|(_, v)| v).unwrap_or_default();
                if value.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Missing value for --name.\n\n{}",
                        usage_text()
                    ));
                }
                name = Some(value.to_string());
            }
            _ if command.as_deref() == Some("mark-read") && arg.parse::<i64>().is_ok() => {
                if alert_id.is_some() {
                    return Err(anyhow::anyhow!(
                        "Multiple alert IDs provided. Use only one.\n\n{}",
                        usage_text()
                    ));
                }
                alert_id = arg.parse::<i64>().ok();
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown argument: {arg}\n\n{}",
                    usage_text()
                ));
            }
        }
    }

    let reject_if = |condition: bool, message: &str| -> Result<()> {
        if condition {
            Err(anyhow::anyhow!("{}\n\n{}", message, usage_text()))
        } else {
            Ok(())
        }
    };

    let command = match command.as_deref().unwrap_or("status") {
        "status" | "devices" | "alerts" => {
            reject_if(
                limit.is_some() || interval.is_some() || mac.is_some() || name.is_some() || all,
                "--limit/--interval/--mac/--name/--all are not valid with this command.",
            )?;
            match command.as_deref().unwrap_or("status") {
                "devices" => CliCommand::Devices,
                "alerts" => CliCommand::Alerts,
                _ => CliCommand::Status,
            }
        }
        "history" => {
            reject_if(
                interval.is_some() || mac.is_some() || name.is_some() || all,
                "--interval/--mac/--name/--all are not valid with history.",
            )?;
            CliCommand::History {
                limit: limit.unwrap_or(SCAN_HISTORY_LIMIT),
            }
        }
        "rename" => {
            reject_if(
                limit.is_some() || interval.is_some() || all,
                "--limit/--interval/--all are not valid with rename.",
            )?;
            let mac = mac.ok_or_else(|| {
                anyhow::anyhow!("rename requires --mac <MAC>.\n\n{}", usage_text())
            })?;
            let name = name.ok_or_else(|| {
                anyhow::anyhow!("rename requires --name <NAME>.\n\n{}", usage_text())
            })?;
            CliCommand::Rename { mac, name }
        }
        "mark-read" => {
            reject_if(
                limit.is_some() || interval.is_some() || mac.is_some() || name.is_some(),
                "--limit/--interval/--mac/--name are not valid with mark-read.",
            )?;
            match (alert_id, all) {
                (Some(_), true) => {
                    return Err(anyhow::anyhow!(
                        "Provide either an alert ID or --all, not both.\n\n{}",
                        usage_text()
                    ));
                }
                (Some(id), false) => CliCommand::MarkRead { alert_id: id },
                (None, true) => CliCommand::MarkAllRead,
                (None, false) => {
                    return Err(anyhow::anyhow!(
                        "mark-read requires an alert ID or --all.\n\n{}",
                        usage_text()
                    ));
                }
            }
        }
        "watch" => {
            reject_if(
                limit.is_some() || mac.is_some() || name.is_some() || all,
                "--limit/--mac/--name/--all are not valid with watch.",
            )?;
            CliCommand::Watch {
                interval: interval.unwrap_or(DEFAULT_MONITOR_INTERVAL),
            }
        }
        _ => unreachable!(),
    };

    Ok(CliInvocation {
        command,
        backend_url,
        demo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_help_flag() {
        let args = ["nexus-console", "--help"];
        let parsed = parse_cli_args(args).expect("help args should parse");
        assert_eq!(parsed.command, CliCommand::Help);
    }

    #[test]
    fn parse_version_flag() {
        let args = ["nexus-console", "-V"];
        let parsed = parse_cli_args(args).expect("version args should parse");
        assert_eq!(parsed.command, CliCommand::Version);
    }

    #[test]
    fn parse_default_status_command() {
        let args = ["nexus-console"];
        let parsed = parse_cli_args(args).expect("default args should parse");
        assert_eq!(parsed.command, CliCommand::Status);
        assert!(!parsed.demo);
        assert!(parsed.backend_url.is_none());
    }

    #[test]
    fn parse_history_with_limit() {
        let args = ["nexus-console", "history", "--limit", "10"];
        let parsed = parse_cli_args(args).expect("history should parse");
        assert_eq!(parsed.command, CliCommand::History { limit: 10 });
    }

    #[test]
    fn parse_history_defaults_limit() {
        let args = ["nexus-console", "history"];
        let parsed = parse_cli_args(args).expect("history should parse");
        assert_eq!(
            parsed.command,
            CliCommand::History {
                limit: SCAN_HISTORY_LIMIT
            }
        );
    }

    #[test]
    fn parse_rename_requires_mac_and_name() {
        let args = ["nexus-console", "rename", "--mac", "AA:BB:CC:DD:EE:01"];
        let err = parse_cli_args(args).expect_err("rename without --name should fail");
        assert!(err.to_string().contains("rename requires --name"));

        let args = [
            "nexus-console",
            "rename",
            "--mac=AA:BB:CC:DD:EE:01",
            "--name=nas",
        ];
        let parsed = parse_cli_args(args).expect("rename should parse");
        assert_eq!(
            parsed.command,
            CliCommand::Rename {
                mac: "AA:BB:CC:DD:EE:01".to_string(),
                name: "nas".to_string()
            }
        );
    }

    #[test]
    fn parse_mark_read_with_id() {
        let args = ["nexus-console", "mark-read", "42"];
        let parsed = parse_cli_args(args).expect("mark-read should parse");
        assert_eq!(parsed.command, CliCommand::MarkRead { alert_id: 42 });
    }

    #[test]
    fn parse_mark_read_all() {
        let args = ["nexus-console", "mark-read", "--all"];
        let parsed = parse_cli_args(args).expect("mark-read --all should parse");
        assert_eq!(parsed.command, CliCommand::MarkAllRead);
    }

    #[test]
    fn parse_mark_read_rejects_id_with_all() {
        let args = ["nexus-console", "mark-read", "42", "--all"];
        let err = parse_cli_args(args).expect_err("id plus --all should fail");
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn parse_mark_read_requires_target() {
        let args = ["nexus-console", "mark-read"];
        let err = parse_cli_args(args).expect_err("bare mark-read should fail");
        assert!(err.to_string().contains("requires an alert ID or --all"));
    }

    #[test]
    fn parse_watch_with_interval() {
        let args = ["nexus-console", "watch", "--interval=30"];
        let parsed = parse_cli_args(args).expect("watch should parse");
        assert_eq!(parsed.command, CliCommand::Watch { interval: 30 });
    }

    #[test]
    fn parse_global_flags_apply_to_any_command() {
        let args = [
            "nexus-console",
            "devices",
            "--backend",
            "http://10.0.0.2:9000",
            "--demo",
        ];
        let parsed = parse_cli_args(args).expect("devices should parse");
        assert_eq!(parsed.command, CliCommand::Devices);
        assert_eq!(
            parsed.backend_url.as_deref(),
            Some("http://10.0.0.2:9000")
        );
        assert!(parsed.demo);
    }

    #[test]
    fn parse_status_rejects_command_specific_flags() {
        let args = ["nexus-console", "status", "--limit", "5"];
        let err = parse_cli_args(args).expect_err("status should reject --limit");
        assert!(err.to_string().contains("not valid with this command"));
    }

    #[test]
    fn parse_unknown_argument_errors() {
        let args = ["nexus-console", "--unknown"];
        let err = parse_cli_args(args).expect_err("unknown flag should fail");
        assert!(err.to_string().contains("Unknown argument"));
    }
}
