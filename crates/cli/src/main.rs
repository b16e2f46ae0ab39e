// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dectl` — the administrative CLI client. Dials the supervisor's Unix
//! socket, sends one [`de_wire::Request`], and renders the
//! [`de_wire::Response`] to standard output.

mod client;
mod exit_error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use de_wire::{ConfigTarget, Request, Response, StopState, TableFormat};

use client::SupervisorClient;
use exit_error::ExitError;

fn default_socket() -> PathBuf {
    std::env::var("DE_SOCKET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("test-etc/decisionengine.sock"))
}

#[derive(Parser)]
#[command(name = "dectl", about = "Administrative client for the Decision Engine supervisor")]
struct Cli {
    /// Path to the supervisor's administrative Unix socket.
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Liveness check.
    Ping,
    /// Block until every channel leaves the given state (or timeout elapses).
    BlockWhile {
        /// One of BOOT, ACTIVE, STEADY, OFFLINE, SHUTTINGDOWN, SHUTDOWN, ERROR.
        state: String,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Dump a channel's resolved config, or "all" for every channel.
    ShowConfig { target: String },
    /// Dump the global supervisor config.
    ShowDeConfig,
    /// Render the data-space contents of one product.
    PrintProduct {
        product: String,
        #[arg(long)]
        format: Option<String>,
    },
    /// List every known product and its producing module.
    PrintProducts,
    /// Full supervisor status.
    Status,
    /// Per-queue backlog depths.
    QueueStatus,
    /// Workflow dependency graph for every running channel.
    ProductDependencies,
    /// Start a channel by name.
    StartChannel { name: String },
    /// Start every configured channel.
    StartChannels,
    /// Stop a channel, waiting indefinitely for a clean exit.
    StopChannel { name: String },
    /// Stop a channel, force-killing it after a timeout.
    KillChannel {
        name: String,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Stop every running channel.
    StopChannels,
    /// Full supervisor shutdown.
    Stop,
    /// The supervisor's own log level.
    GetLogLevel,
    /// The log level of one channel.
    GetChannelLogLevel { name: String },
    /// Change the log level of one channel.
    SetChannelLogLevel { name: String, level: String },
    /// (Re)start the reaper.
    ReaperStart {
        #[arg(long)]
        delay_secs: Option<u64>,
    },
    /// Stop the reaper.
    ReaperStop,
    /// Reaper status.
    ReaperStatus,
    /// Query the data space for one product's history.
    QueryTool {
        product: String,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        start_time: Option<String>,
    },
    /// Serialized internal metrics.
    Metrics,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = SupervisorClient::new(cli.socket.unwrap_or_else(default_socket));
    match run(&client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.code.clamp(1, 255) as u8)
        }
    }
}

async fn run(client: &SupervisorClient, command: Command) -> Result<(), ExitError> {
    let request = to_request(command);
    let response = client.send(&request).await.map_err(|err| ExitError::new(1, err.to_string()))?;
    render(response)
}

fn to_request(command: Command) -> Request {
    match command {
        Command::Ping => Request::Ping,
        Command::BlockWhile { state, timeout_secs } => Request::BlockWhile { state, timeout_secs },
        Command::ShowConfig { target } => Request::ShowConfig {
            target: if target.eq_ignore_ascii_case("all") {
                ConfigTarget::All
            } else {
                ConfigTarget::Channel(target)
            },
        },
        Command::ShowDeConfig => Request::ShowDeConfig,
        Command::PrintProduct { product, format } => Request::PrintProduct {
            product,
            columns: None,
            query: None,
            types: false,
            format: format.as_deref().map(TableFormat::parse),
        },
        Command::PrintProducts => Request::PrintProducts,
        Command::Status => Request::Status,
        Command::QueueStatus => Request::QueueStatus,
        Command::ProductDependencies => Request::ProductDependencies,
        Command::StartChannel { name } => Request::StartChannel { name },
        Command::StartChannels => Request::StartChannels,
        Command::StopChannel { name } => Request::StopChannel { name },
        Command::KillChannel { name, timeout_secs } => Request::KillChannel { name, timeout_secs },
        Command::StopChannels => Request::StopChannels,
        Command::Stop => Request::Stop,
        Command::GetLogLevel => Request::GetLogLevel,
        Command::GetChannelLogLevel { name } => Request::GetChannelLogLevel { name },
        Command::SetChannelLogLevel { name, level } => Request::SetChannelLogLevel { name, level },
        Command::ReaperStart { delay_secs } => Request::ReaperStart { delay_secs },
        Command::ReaperStop => Request::ReaperStop,
        Command::ReaperStatus => Request::ReaperStatus,
        Command::QueryTool { product, format, start_time } => {
            Request::QueryTool { product, format: format.as_deref().map(TableFormat::parse), start_time }
        }
        Command::Metrics => Request::Metrics,
    }
}

fn render(response: Response) -> Result<(), ExitError> {
    match response {
        Response::Ok => {
            println!("OK");
            Ok(())
        }
        Response::Pong => {
            println!("pong");
            Ok(())
        }
        Response::Text { body } => {
            println!("{body}");
            Ok(())
        }
        Response::StopResult { state, message } => {
            println!("{message}");
            if state == StopState::NotFound {
                return Err(ExitError::new(1, message));
            }
            Ok(())
        }
        Response::Error { message } => Err(ExitError::new(1, format!("ERROR, {message}"))),
    }
}
