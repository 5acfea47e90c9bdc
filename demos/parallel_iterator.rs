//! # Example: parallel_iterator
//!
//! An iterator with parallel execution enabled, driven by hand.
//!
//! Demonstrates how to:
//! - Observe lifecycle messages and failures with [`MessageFn`] / [`ErrorFn`].
//! - Pause and resume the clock from outside.
//! - Run the iteration body on demand with `execute_immediate`.
//!
//! ## Run
//! ```bash
//! cargo run --example parallel_iterator
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use itervisor::{ActivityError, ActivityFn, ErrorFn, IterationController, MessageFn, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let runs = Arc::new(AtomicU32::new(0));
    let runs_in = Arc::clone(&runs);
    let sync = ActivityFn::arc(move || {
        let runs = Arc::clone(&runs_in);
        async move {
            let run = runs.fetch_add(1, Ordering::SeqCst) + 1;
            println!("[sync] run {run} begins");
            tokio::time::sleep(Duration::from_millis(500)).await;
            if run == 2 {
                return Err(ActivityError::fail("remote unavailable"));
            }
            println!("[sync] run {run} done");
            Ok(())
        }
    });

    let cfg = ServiceConfig::new("sync").with_parallel_execution(true);
    let ctrl = IterationController::builder(cfg, sync)
        .with_message_observer(MessageFn::arc(|m| {
            println!("  <{}> {}", m.kind.as_label(), m.text);
        }))
        .with_error_observer(ErrorFn::arc(|ev| {
            println!("  <error> {}: {}", ev.context, ev.error);
            ev.mark_handled();
        }))
        .build()?;

    ctrl.start(1).await?;
    ctrl.execute_immediate().await?;

    // first scheduled tick fires after 5s
    tokio::time::sleep(Duration::from_secs(6)).await;

    ctrl.pause()?;
    println!("state: {}", ctrl.state());
    ctrl.execute_immediate().await?;
    ctrl.resume()?;
    println!("state: {}", ctrl.state());

    ctrl.stop().await?;
    println!("state: {} after {} runs", ctrl.state(), runs.load(Ordering::SeqCst));
    Ok(())
}
