use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{usage_text, version_text, CliCommand};
use crate::command_handlers::{
    handle_alerts, handle_devices, handle_history, handle_mark_all_read, handle_mark_read,
    handle_rename, handle_status, handle_watch,
};
use crate::config::DEFAULT_BACKEND_URL;
use crate::models::{AlertRecord, DeviceRecord, NetworkStats, ScanRecord};
use crate::remote::{DemoBoundary, HttpBoundary, RemoteBoundary};
use crate::settings::ConsoleSettings;
use crate::sync::SyncConfig;

pub type OutputHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Execution context shared by every entrypoint: backend selection, the
/// settings loaded once at startup, output sink, and cancellation.
#[derive(Clone)]
pub struct AppContext {
    backend_url: String,
    settings: ConsoleSettings,
    demo_override: bool,
    sync_config: SyncConfig,
    output_hook: OutputHook,
    cancel_flag: Arc<AtomicBool>,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AppContext {
    pub fn from_env() -> Self {
        let settings = match ConsoleSettings::default_path() {
            Ok(path) => ConsoleSettings::load(&path).unwrap_or_else(|err| {
                tracing::warn!("Failed to load settings, using defaults: {}", err);
                ConsoleSettings::default()
            }),
            Err(err) => {
                tracing::warn!("No settings directory available: {}", err);
                ConsoleSettings::default()
            }
        };

        Self {
            backend_url: std::env::var("NEXUS_CONSOLE_BACKEND")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            settings,
            demo_override: false,
            sync_config: SyncConfig::default(),
            output_hook: Arc::new(|line| println!("{}", line)),
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_backend_url(mut self, backend_url: String) -> Self {
        self.backend_url = backend_url;
        self
    }

    pub fn with_settings(mut self, settings: ConsoleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_demo(mut self, demo: bool) -> Self {
        self.demo_override = demo;
        self
    }

    pub fn with_sync_config(mut self, sync_config: SyncConfig) -> Self {
        self.sync_config = sync_config;
        self
    }

    pub fn with_output_hook(mut self, output_hook: OutputHook) -> Self {
        self.output_hook = output_hook;
        self
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn sync_config(&self) -> &SyncConfig {
        &self.sync_config
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_override || self.settings.demo_mode
    }

    /// Select the backend boundary for this invocation.
    pub fn boundary(&self) -> Result<Arc<dyn RemoteBoundary>> {
        if self.demo_mode() {
            tracing::info!("Using built-in demo backend");
            return Ok(Arc::new(DemoBoundary::new()));
        }
        let boundary = HttpBoundary::new(self.backend_url.clone())
            .with_context(|| format!("Failed to build HTTP client for {}", self.backend_url))?;
        Ok(Arc::new(boundary))
    }

    pub fn emit_line(&self, line: &str) {
        (self.output_hook)(line);
    }

    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Outcome of a `watch` run
#[derive(Debug, Serialize, Deserialize)]
pub struct WatchSummary {
    pub completed: bool,
    pub cancelled: bool,
    pub scan_count: u32,
    pub events_seen: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum AppCommandResult {
    HelpText(String),
    VersionText(String),
    Stats(NetworkStats),
    Devices(Vec<DeviceRecord>),
    History(Vec<ScanRecord>),
    Alerts(Vec<AlertRecord>),
    Renamed { mac: String, name: String },
    MarkedRead { unread_remaining: usize },
    Watch(WatchSummary),
}

/// Run the app by parsing CLI-style args and dispatching the command.
pub async fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let invocation = crate::cli::parse_cli_args(args)?;
    let mut context = AppContext::from_env().with_demo(invocation.demo);
    if let Some(backend_url) = invocation.backend_url {
        context = context.with_backend_url(backend_url);
    }
    execute_command_with_context(invocation.command, &context).await
}

/// Run with Ctrl+C cancellation wired into the provided context. Intended
/// for CLI-style entrypoints.
pub async fn run_with_ctrl_c<I, S>(args: I, context: &AppContext) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cancel_context = context.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_context.cancel();
            tracing::info!("Cancellation requested (Ctrl+C). Winding down...");
        }
    });

    let invocation = crate::cli::parse_cli_args(args)?;
    let mut context = context.clone().with_demo(context.demo_mode() || invocation.demo);
    if let Some(backend_url) = invocation.backend_url {
        context = context.with_backend_url(backend_url);
    }
    let run_result = execute_command_with_context(invocation.command, &context).await;
    signal_task.abort();
    run_result
}

/// Execute a pre-parsed command with an explicit execution context.
pub async fn execute_command_with_context(
    command: CliCommand,
    context: &AppContext,
) -> Result<()> {
    let result = execute_command_typed(command, context).await?;
    emit_command_result(&result, context)
}

/// Execute a pre-parsed command and return a strongly-typed result payload.
pub async fn execute_command_typed(
    command: CliCommand,
    context: &AppContext,
) -> Result<AppCommandResult> {
    match command {
        CliCommand::Help => Ok(AppCommandResult::HelpText(usage_text())),
        CliCommand::Version => Ok(AppCommandResult::VersionText(version_text())),
        CliCommand::Status => Ok(AppCommandResult::Stats(handle_status(context).await?)),
        CliCommand::Devices => Ok(AppCommandResult::Devices(handle_devices(context).await?)),
        CliCommand::History { limit } => Ok(AppCommandResult::History(
            handle_history(limit, context).await?,
        )),
        CliCommand::Alerts => Ok(AppCommandResult::Alerts(handle_alerts(context).await?)),
        CliCommand::Rename { mac, name } => {
            let (mac, name) = handle_rename(&mac, &name, context).await?;
            Ok(AppCommandResult::Renamed { mac, name })
        }
        CliCommand::MarkRead { alert_id } => Ok(AppCommandResult::MarkedRead {
            unread_remaining: handle_mark_read(alert_id, context).await?,
        }),
        CliCommand::MarkAllRead => Ok(AppCommandResult::MarkedRead {
            unread_remaining: handle_mark_all_read(context).await?,
        }),
        CliCommand::Watch { interval } => {
            Ok(AppCommandResult::Watch(handle_watch(interval, context).await?))
        }
    }
}

fn emit_command_result(result: &AppCommandResult, context: &AppContext) -> Result<()> {
    match result {
        AppCommandResult::HelpText(text) | AppCommandResult::VersionText(text) => {
            context.emit_line(text);
            Ok(())
        }
        other => {
            let output = serde_json::to_string_pretty(other)
                .context("Failed to serialize command result")?;
            context.emit_line(&output);
            Ok(())
        }
    }
}
