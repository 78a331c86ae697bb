//! NEXUS Console - Operator console for the NEXUS discovery engine
//!
//! Talks to a running discovery engine over its console API and keeps a
//! consistent local view of stats, scan history, devices, and alerts.
//! `watch` follows a live monitoring session from start to completion.

use nexus_console::app::{run_with_ctrl_c, AppContext};

#[tokio::main]
async fn main() {
    if let Err(e) = nexus_console::logging::init_logging() {
        eprintln!("[WARN] Failed to initialize structured logging: {}", e);
    }

    let context = AppContext::from_env();
    match run_with_ctrl_c(std::env::args(), &context).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            std::process::exit(1);
        }
    }
}
