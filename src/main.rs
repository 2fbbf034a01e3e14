//! trace-router: deterministic packet-path simulator
//!
//! Main entry point: loads the topology configuration, compiles it into an
//! immutable snapshot, and serves the trace API over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! trace-router
//!
//! # Run with custom configuration
//! trace-router -c /path/to/config.json
//!
//! # Run with environment overrides
//! TRACE_ROUTER_LOG_LEVEL=debug trace-router
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use trace_router::api::ApiServer;
use trace_router::config::{load_config_with_env, LogConfig};
use trace_router::engine::Simulator;

/// Command-line arguments
struct Args {
    /// Configuration file path
    config_path: PathBuf,
    /// Generate default configuration
    generate_config: bool,
    /// Check configuration only
    check_config: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config_path = PathBuf::from("/etc/trace-router/config.json");
        let mut generate_config = false;
        let mut check_config = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" | "--config" => {
                    if let Some(path) = args.next() {
                        config_path = PathBuf::from(path);
                    }
                }
                "-g" | "--generate-config" => {
                    generate_config = true;
                }
                "--check" => {
                    check_config = true;
                }
                "-h" | "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "-v" | "--version" => {
                    println!("trace-router v{}", trace_router::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {arg}");
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        Self {
            config_path,
            generate_config,
            check_config,
        }
    }
}

fn print_help() {
    println!(
        r#"trace-router v{}

Deterministic packet-path simulator with hop-by-hop decision traces.

USAGE:
    trace-router [OPTIONS]

OPTIONS:
    -c, --config <PATH>     Configuration file path [default: /etc/trace-router/config.json]
    -g, --generate-config   Generate default configuration and exit
    --check                 Check configuration and exit
    -h, --help              Print help information
    -v, --version           Print version information

ENVIRONMENT:
    TRACE_ROUTER_LISTEN_ADDR    Override listen address
    TRACE_ROUTER_LOG_LEVEL      Override log level (trace, debug, info, warn, error)

API:
    POST /trace     Simulate one packet, returns the decision trace
    GET  /healthz   Liveness probe
"#,
        trace_router::VERSION
    );
}

/// Initialize logging
fn init_logging(config: &LogConfig) {
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().expect("static directive"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.target);

    if config.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Instant::now();

    let args = Args::parse();

    if args.generate_config {
        trace_router::config::create_default_config(&args.config_path)?;
        println!("Generated default configuration at {:?}", args.config_path);
        return Ok(());
    }

    // Load and normalize configuration; any malformed table is fatal here,
    // before the service accepts traffic.
    let config = load_config_with_env(&args.config_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load configuration from {:?}: {}",
            args.config_path,
            e
        )
    })?;

    if args.check_config {
        println!("Configuration is valid");
        return Ok(());
    }

    init_logging(&config.log);

    info!("trace-router v{}", trace_router::VERSION);
    info!("Configuration loaded from {:?}", args.config_path);

    // Compile the immutable topology snapshot shared by all requests.
    let snapshot = Arc::new(config.compile()?);
    info!(
        "Topology: {} name records, {} routes, {} firewall rules (default {})",
        snapshot.records.len(),
        snapshot.routes.len(),
        snapshot.firewall.len(),
        snapshot.firewall.default_action()
    );

    let simulator = Arc::new(Simulator::new(snapshot));
    let server = ApiServer::new(config.listen.clone(), simulator);
    let shutdown = server.shutdown_sender();

    info!(
        "Startup complete in {:.2}ms",
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    let result = tokio::select! {
        result = server.run() => result,
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, initiating shutdown...");
            let _ = shutdown.send(());
            Ok(())
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM, initiating shutdown...");
            let _ = shutdown.send(());
            Ok(())
        }
    };

    info!("Served {} trace requests", server.requests_served());
    info!("Shutdown complete");

    result.map_err(|e| anyhow::anyhow!("API server error: {}", e))
}

/// Wait for SIGTERM signal
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    // On non-Unix platforms, just wait forever
    std::future::pending::<()>().await;
}
