// src/main.rs

use ariawatch::{cli, config, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("ariawatch error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let settings = config::load_settings(&args)?;
    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::init_logging(args.log_level, settings.log_level, &settings.log_file)?;
    run(&args, settings).await?;
    Ok(())
}
