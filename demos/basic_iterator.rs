//! # Example: basic_iterator
//!
//! A serial iterator hosted until Ctrl-C / SIGTERM.
//!
//! Demonstrates how to:
//! - Implement [`Activity`] with start and stop hooks.
//! - Attach the built-in [`LogWriter`] to both observer channels.
//! - Run the service under [`ServiceHost`].
//!
//! ## Flow
//! ```text
//! ServiceHost::run()
//!     ├─► on_iteration_start(1)
//!     ├─► arm clock (first tick after 5s, then every minute)
//!     ├─► per tick: pause ─► execute_activity ─► resume
//!     └─► signal ─► stop ─► on_scheduled_stop
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example basic_iterator
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use itervisor::{Activity, ActivityError, IterationController, LogWriter, ServiceConfig, ServiceHost};
use tracing_subscriber::EnvFilter;

/// Counts iterations and fails every third one.
#[derive(Default)]
struct Heartbeat {
    beats: AtomicU64,
}

#[async_trait]
impl Activity for Heartbeat {
    async fn on_iteration_start(&self, period_minutes: u32) -> Result<(), ActivityError> {
        println!("[heartbeat] beating every {period_minutes} minute(s)");
        Ok(())
    }

    async fn execute_activity(&self) -> Result<(), ActivityError> {
        let beat = self.beats.fetch_add(1, Ordering::SeqCst) + 1;
        if beat % 3 == 0 {
            return Err(ActivityError::fail(format!("beat {beat} skipped")));
        }
        println!("[heartbeat] beat {beat}");
        Ok(())
    }

    async fn on_scheduled_stop(&self) -> Result<(), ActivityError> {
        println!("[heartbeat] stopped after {} beats", self.beats.load(Ordering::SeqCst));
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ServiceConfig::new("heartbeat").with_period_minutes(1);
    let ctrl = IterationController::builder(cfg, Arc::new(Heartbeat::default()))
        // errors are logged and swallowed, so the iterator keeps ticking
        .with_log_writer(LogWriter::handling())
        .build()?;

    ServiceHost::new(ctrl).run().await?;
    Ok(())
}
