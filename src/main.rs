use anyhow::Result;
use clap::Parser;
use lapsecam::{
    storage, CameraRegistry, CaptureRunner, HttpFrameFetcher, LapsecamConfig, LapsecamError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "lapsecam")]
#[command(about = "Periodic still-image capture from network cameras")]
#[command(version)]
#[command(long_about = "Polls one or more network cameras over HTTP at a fixed interval and \
stores every captured frame as a timestamped JPEG file, one directory per camera. Runs \
unattended until interrupted.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "lapsecam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the capture loop")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - prepare storage but don't start the loop
    #[arg(long, help = "Prepare capture directories and exit without fetching any frames")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args);

    info!("Starting lapsecam v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    // Load and validate configuration
    let config = match LapsecamConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    config.validate().map_err(LapsecamError::from)?;

    let registry = CameraRegistry::from_config(&config.cameras);

    // Missing storage is fatal, the loop must not start without it
    storage::ensure_directories(&registry).await?;

    if args.dry_run {
        info!("Dry run mode - capture directories prepared, loop not started");
        println!("✓ Dry run completed successfully - capture directories prepared");
        return Ok(());
    }

    let fetcher =
        HttpFrameFetcher::new(Duration::from_secs(config.capture.timeout_seconds))?;

    let roster = registry
        .iter()
        .map(|camera| format!("{} ({})", camera.name, camera.address))
        .collect::<Vec<_>>()
        .join(", ");
    info!("Starting image capture for {}", roster);
    info!("Interval: {} seconds", config.capture.interval_seconds);
    info!("Press Ctrl+C to stop");

    let cancellation_token = CancellationToken::new();
    setup_signal_handlers(cancellation_token.clone());

    let mut runner = CaptureRunner::new(
        registry,
        Arc::new(fetcher),
        &config.capture,
        cancellation_token,
    );
    runner.run().await;

    info!("Lapsecam shutdown complete");
    Ok(())
}

/// Cancel the capture loop on SIGINT or SIGTERM.
fn setup_signal_handlers(cancellation_token: CancellationToken) {
    // Handle SIGTERM (systemd stop) - Unix only
    #[cfg(unix)]
    {
        let token = cancellation_token.clone();
        tokio::spawn(async move {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to register SIGTERM handler");
            if sigterm.recv().await.is_some() {
                info!("Received SIGTERM signal");
                token.cancel();
            }
        });
    }

    // Handle SIGINT (Ctrl+C) - Cross-platform
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received SIGINT signal (Ctrl+C)");
            cancellation_token.cancel();
        }
    });
}

fn init_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };

    // Create environment filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lapsecam={}", log_level)));

    // Configure format based on options
    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("pretty") => fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some("compact") | None => fmt::layer()
            .compact()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .compact()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    let rendered = toml::to_string_pretty(&LapsecamConfig::default())
        .map_err(LapsecamError::from)?;

    println!("# Lapsecam configuration file");
    println!("# Default values for all available options");
    println!();
    println!("{}", rendered);
    Ok(())
}
