// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod procs;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::Settings;
use crate::engine::{check_once_outcome, LifecycleManager};
use crate::errors::Result;
use crate::exec::{Aria2Launcher, DownloadInvocation};
use crate::fs::RealFileSystem;
use crate::procs::SysinfoProcessLister;
use crate::watch::NotifyWatchBackend;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the real filesystem, aria2c launcher and process lister
/// - the lifecycle manager (start-up, initial dispatch, watcher)
/// - Ctrl-C handling and the shutdown sequence
pub async fn run(args: &CliArgs, settings: Settings) -> Result<()> {
    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let launcher = Arc::new(Aria2Launcher::new(&settings.executable));
    let manager = LifecycleManager::new(
        settings,
        Arc::new(RealFileSystem),
        launcher,
        Box::new(SysinfoProcessLister::default()),
    )?;

    console::banner(manager.dispatcher().target().file_name());

    if args.once {
        let outcome = manager.run_once().await?;
        debug!(?outcome, "one-shot run finished");
        return check_once_outcome(outcome);
    }

    let app = manager.start(NotifyWatchBackend::new()).await?;
    let file_name = app.dispatcher().target().file_name().to_string();
    console::ok(format!("Monitoring {file_name} for changes..."));
    console::warn("Press Ctrl+C to stop the monitor (this will also close the text editor).");

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }

    console::info("Stopping download monitor...");
    let report = app.stop().await;
    info!(?report, "shutdown complete");
    console::ok("Cleanup complete. Goodbye!");
    Ok(())
}

/// Simple dry-run output: print resolved settings and the command line.
fn print_dry_run(settings: &Settings) {
    println!("ariawatch dry-run");
    println!("  links_file       = {}", settings.links_file.display());
    println!("  download_dir     = {}", settings.download_dir.display());
    println!("  debounce_window  = {:?}", settings.debounce_window);
    println!("  shutdown_timeout = {:?}", settings.shutdown_timeout);
    println!("  open_editor      = {}", settings.open_editor);
    println!("  close_editors    = {}", settings.close_editors_on_exit);
    if settings.close_editors_on_exit {
        println!("  editors          = {:?}", settings.editors);
    }
    println!("  log_file         = {}", settings.log_file.display());
    println!();

    let invocation = DownloadInvocation::aria2(
        settings.executable.clone().into(),
        &settings.download_dir,
        &settings.links_file,
    );
    println!("command: {}", invocation.display());

    debug!("dry-run complete (no execution)");
}
