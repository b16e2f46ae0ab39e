// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The administrative RPC listener: one `UnixListener` accept loop,
//! one spawned task per connection, dispatching each decoded
//! [`de_wire::Request`] to a [`Supervisor`] method and writing back
//! the resulting [`de_wire::Response`].

use std::sync::Arc;
use std::time::Duration;

use de_core::ChannelState;
use de_wire::{read_request, write_response, ProtocolError, Request, Response};
use tokio::net::UnixListener;
use tracing::{debug, error, warn};

use crate::supervisor::Supervisor;

pub struct Listener {
    socket: UnixListener,
    supervisor: Arc<Supervisor>,
}

impl Listener {
    pub fn new(socket: UnixListener, supervisor: Arc<Supervisor>) -> Self {
        Self { socket, supervisor }
    }

    /// Accept connections until the socket itself fails; a bad client
    /// connection never brings down the loop.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _addr)) => {
                    let supervisor = Arc::clone(&self.supervisor);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, &supervisor).await {
                            log_connection_error(err);
                        }
                    });
                }
                Err(err) => error!(%err, "failed to accept a connection on the administrative socket"),
            }
        }
    }
}

fn log_connection_error(err: ProtocolError) {
    match err {
        ProtocolError::Io(io_err) if io_err.kind() == std::io::ErrorKind::UnexpectedEof => {
            debug!("client disconnected before sending a complete request");
        }
        other => warn!(err = %other, "administrative connection failed"),
    }
}

async fn handle_connection(
    mut stream: tokio::net::UnixStream,
    supervisor: &Supervisor,
) -> Result<(), ProtocolError> {
    let request = read_request(&mut stream).await?;
    let response = dispatch(supervisor, request).await;
    write_response(&mut stream, &response).await
}

async fn dispatch(supervisor: &Supervisor, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::BlockWhile { state, timeout_secs } => match ChannelState::parse(&state) {
            Some(state) => {
                let timeout = timeout_secs.map(Duration::from_secs);
                Response::text(supervisor.block_while(state, timeout).await)
            }
            None => Response::error(format!("invalid channel state {state:?}")),
        },

        Request::ShowConfig { target } => Response::text(supervisor.show_config(target)),

        Request::ShowDeConfig => Response::text(supervisor.show_de_config()),

        Request::PrintProduct { product, format, .. } => {
            Response::text(supervisor.print_product(&product, format.unwrap_or_default()).await)
        }

        Request::PrintProducts => Response::text(supervisor.print_products()),

        Request::Status => Response::text(supervisor.status()),

        Request::QueueStatus => Response::text(supervisor.queue_status()),

        Request::ProductDependencies => Response::text(supervisor.product_dependencies()),

        Request::StartChannel { name } => ok_or_error(supervisor.start_channel(&name).await),

        Request::StartChannels => ok_or_error(supervisor.start_channels().await),

        Request::StopChannel { name } => {
            let (state, message) = supervisor.stop_channel(&name).await;
            Response::StopResult { state, message }
        }

        Request::KillChannel { name, timeout_secs } => {
            let timeout = timeout_secs.map(Duration::from_secs);
            let (state, message) = supervisor.kill_channel(&name, timeout).await;
            Response::StopResult { state, message }
        }

        Request::StopChannels => ok_or_error(supervisor.stop_channels().await),

        Request::RmChannel { name, timeout_secs } => {
            let timeout = timeout_secs.map(Duration::from_secs);
            let (state, message) = supervisor.rm_channel_rpc(&name, timeout).await;
            Response::StopResult { state, message }
        }

        Request::Stop => ok_or_error(supervisor.stop().await),

        Request::GetLogLevel => Response::text(supervisor.get_log_level()),

        Request::GetChannelLogLevel { name } => Response::text(supervisor.get_channel_log_level(&name)),

        Request::SetChannelLogLevel { name, level } => {
            ok_or_error(supervisor.set_channel_log_level(&name, &level))
        }

        Request::ReaperStart { delay_secs } => {
            ok_or_error(supervisor.reaper_start(delay_secs.map(Duration::from_secs)))
        }

        Request::ReaperStop => ok_or_error(supervisor.reaper_stop()),

        Request::ReaperStatus => Response::text(supervisor.reaper_status()),

        Request::QueryTool { product, format, start_time } => {
            let format = format.unwrap_or_default();
            Response::text(supervisor.query_tool(&product, format, start_time.as_deref()).await)
        }

        Request::Metrics => Response::text(supervisor.metrics()),
    }
}

/// Most administrative methods render their own `"ERROR, ..."` text on
/// failure; turn that convention into a proper `Response::Error` so
/// clients can branch on `Response::is_ok` instead of string-sniffing.
fn ok_or_error(message: String) -> Response {
    if let Some(reason) = message.strip_prefix("ERROR, ") {
        Response::error(reason)
    } else {
        Response::text(message)
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
