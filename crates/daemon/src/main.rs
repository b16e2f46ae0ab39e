// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ded` — the Decision Engine supervisor binary.
//!
//! Normal invocation boots the supervisor: validates the environment,
//! connects to the broker, binds the administrative socket, and serves
//! RPCs until `stop` or a signal tears it down. The same binary also
//! re-execs itself under the hidden `--source-worker`/`--channel-worker`
//! subcommands (see [`de_daemon::worker_entry`]) to run one source's
//! produce loop or one channel's task manager in its own process.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use de_bus::{Bus, BrokerUrl, Exchange, RedisBus};
use de_dataspace::{DataSpace, InMemoryDataSpace};
use de_daemon::{config::GlobalConfig, env, metrics, worker_entry, LifecycleError, Listener, Supervisor};
use tokio::net::UnixListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How often the accept-loop task runs `service_actions` housekeeping.
const SERVICE_ACTIONS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "ded", about = "Decision Engine supervisor")]
struct Cli {
    /// Administrative RPC port, retained for parity with the global
    /// config's `port` field; the transport itself is a Unix socket
    /// (see DESIGN.md), so this only affects what `show_de_config`
    /// reports.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=65535))]
    port: Option<u16>,

    /// Path to the global supervisor config. Defaults to `DE_CONFIG_PATH`
    /// or the test-etc fallback.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable the metrics HTTP endpoint precondition check.
    #[arg(long)]
    no_webserver: bool,

    /// Hidden: run as a single source worker's produce loop, reading its
    /// handoff config from the given path. Set only by the supervisor's
    /// own self-re-exec.
    #[arg(long, hide = true)]
    source_worker: Option<PathBuf>,

    /// Hidden: run as a single channel worker's task manager, reading its
    /// handoff config from the given path.
    #[arg(long, hide = true)]
    channel_worker: Option<PathBuf>,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(path) = &cli.source_worker {
        init_logging();
        return match worker_entry::run_source_worker(path).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(%err, "source worker exited with an error");
                ExitCode::FAILURE
            }
        };
    }
    if let Some(path) = &cli.channel_worker {
        init_logging();
        return match worker_entry::run_channel_worker(path).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(%err, "channel worker exited with an error");
                ExitCode::FAILURE
            }
        };
    }

    init_logging();
    match run_supervisor(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ded: fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run_supervisor(cli: Cli) -> Result<(), LifecycleError> {
    refuse_root()?;

    let config_path = cli.config.unwrap_or_else(env::config_path);
    let mut global = GlobalConfig::load(&config_path)?;
    if let Some(port) = cli.port {
        global.port = port;
    }
    let metrics_enabled = !cli.no_webserver;
    if metrics_enabled {
        let dir = env::metrics_dir().ok_or(LifecycleError::MetricsDirMissing)?;
        metrics::check_metrics_dir(&dir)?;
    }

    let broker_url = BrokerUrl::parse(&global.broker_url)?;
    let bus: Arc<dyn Bus> = Arc::new(RedisBus::connect(&broker_url, Exchange::new(&global.exchange)).await?);
    bus.ping().await?;

    let dataspace: Arc<dyn DataSpace> = Arc::new(InMemoryDataSpace::new());
    let self_exe = std::env::current_exe()?;
    let worker_config_dir = std::env::temp_dir().join("decisionengine-workers");

    let supervisor =
        Arc::new(Supervisor::new(global.clone(), bus, dataspace, self_exe, worker_config_dir));

    let socket_path = socket_path();
    if socket_path.exists() {
        let _ = std::fs::remove_file(&socket_path);
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let unix_listener = UnixListener::bind(&socket_path)
        .map_err(|source| LifecycleError::BindFailed { path: socket_path.clone(), source })?;
    info!(path = %socket_path.display(), "administrative socket bound");

    let reload_supervisor = Arc::clone(&supervisor);
    let mut hangup = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
        .map_err(LifecycleError::Io)?;
    tokio::spawn(async move {
        loop {
            hangup.recv().await;
            info!("SIGHUP received, reloading configuration");
            reload_supervisor.reload().await;
        }
    });

    let housekeeping_supervisor = Arc::clone(&supervisor);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SERVICE_ACTIONS_INTERVAL);
        loop {
            tick.tick().await;
            housekeeping_supervisor.service_actions().await;
        }
    });

    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(LifecycleError::Io)?;
    let listener = Listener::new(unix_listener, Arc::clone(&supervisor));
    tokio::select! {
        () = listener.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("received interrupt, shutting down");
        }
        _ = terminate.recv() => {
            info!("received SIGTERM, shutting down");
        }
    }

    supervisor.stop().await;
    if let Err(err) = std::fs::remove_file(&socket_path) {
        warn!(%err, "failed to remove administrative socket on shutdown");
    }
    Ok(())
}

fn socket_path() -> PathBuf {
    std::env::var("DE_SOCKET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("test-etc/decisionengine.sock"))
}

/// Refuses to run as the superuser, the direct analogue of the Python
/// `os.geteuid() == 0` guard in the original's `main()`.
fn refuse_root() -> Result<(), LifecycleError> {
    if nix::unistd::geteuid().is_root() {
        return Err(LifecycleError::RunningAsRoot);
    }
    Ok(())
}
